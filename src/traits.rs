//! Traits for storage abstraction

use async_trait::async_trait;

use crate::types::*;

/// Storage abstraction for bills
///
/// Lets the reconciliation engine work against any bill source (REST API
/// client, database, in-memory) by implementing these methods. Listing must
/// preserve the source's ordering since grouping output follows input order.
#[async_trait]
pub trait BillStorage: Send + Sync {
    /// Save a bill, replacing an existing bill with the same id
    async fn save_bill(&mut self, bill: &Bill) -> BillingResult<()>;

    /// Get a bill by ID
    async fn get_bill(&self, bill_id: i64) -> BillingResult<Option<Bill>>;

    /// List bills in source order, optionally filtered by type
    async fn list_bills(&self, bill_type: Option<BillType>) -> BillingResult<Vec<Bill>>;

    /// Update an existing bill
    async fn update_bill(&mut self, bill: &Bill) -> BillingResult<()>;

    /// Delete a bill
    async fn delete_bill(&mut self, bill_id: i64) -> BillingResult<()>;
}
