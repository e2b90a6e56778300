//! Grouping of vendor bills with the company bills they cover

pub mod grouper;
pub mod index;
pub mod rows;

pub use grouper::*;
pub use index::*;
pub use rows::*;
