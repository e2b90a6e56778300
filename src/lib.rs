//! # Billing Core
//!
//! Bill grouping and reconciliation for an oil-trading back office.
//!
//! ## Features
//!
//! - **Bill grouping**: Vendor bills nested with the company bills they cover, plus orphan company bills
//! - **Reconciliation**: Company total, vendor amount, difference, and match status per vendor bill
//! - **Legacy coverage**: Vendor bills linked through purchase orders instead of bill IDs
//! - **Lenient row parsing**: Malformed amounts degrade to zero instead of failing
//! - **Diagnostics**: Dangling coverage references and company bills covered twice
//! - **Storage abstraction**: Trait-based bill source with an in-memory implementation
//!
//! ## Quick Start
//!
//! ```rust
//! use billing_core::{group_bills, Bill};
//! use bigdecimal::BigDecimal;
//!
//! let bills = vec![
//!     Bill::company(1, "CB-001", BigDecimal::from(100), Some(50)),
//!     Bill::vendor(2, "VB-001", BigDecimal::from(100)).covering_company_bills(vec![1]),
//! ];
//!
//! let grouping = group_bills(&bills);
//! assert!(grouping.grouped_bills[0].reconciliation.is_matched);
//! assert!(grouping.orphan_bills.is_empty());
//! ```

pub mod config;
pub mod grouping;
pub mod reconciliation;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::*;
pub use grouping::*;
pub use reconciliation::ReconciliationEngine;
pub use traits::*;
pub use types::*;
