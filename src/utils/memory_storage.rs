//! In-memory storage implementation for testing

use async_trait::async_trait;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::traits::*;
use crate::types::*;

/// In-memory bill storage for testing and development
///
/// Bills are kept in insertion order; saving a bill whose id already exists
/// replaces it in place.
#[derive(Debug, Clone, Default)]
pub struct MemoryBillStorage {
    bills: Arc<RwLock<Vec<Bill>>>,
}

impl MemoryBillStorage {
    /// Create an empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a storage pre-loaded with bills
    pub fn with_bills(bills: Vec<Bill>) -> Self {
        Self {
            bills: Arc::new(RwLock::new(bills)),
        }
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) -> BillingResult<()> {
        self.write()?.clear();
        Ok(())
    }

    fn read(&self) -> BillingResult<RwLockReadGuard<'_, Vec<Bill>>> {
        self.bills
            .read()
            .map_err(|e| BillingError::Storage(format!("bill store poisoned: {e}")))
    }

    fn write(&self) -> BillingResult<RwLockWriteGuard<'_, Vec<Bill>>> {
        self.bills
            .write()
            .map_err(|e| BillingError::Storage(format!("bill store poisoned: {e}")))
    }
}

#[async_trait]
impl BillStorage for MemoryBillStorage {
    async fn save_bill(&mut self, bill: &Bill) -> BillingResult<()> {
        let mut bills = self.write()?;
        match bills.iter_mut().find(|existing| existing.id == bill.id) {
            Some(existing) => *existing = bill.clone(),
            None => bills.push(bill.clone()),
        }
        Ok(())
    }

    async fn get_bill(&self, bill_id: i64) -> BillingResult<Option<Bill>> {
        Ok(self.read()?.iter().find(|bill| bill.id == bill_id).cloned())
    }

    async fn list_bills(&self, bill_type: Option<BillType>) -> BillingResult<Vec<Bill>> {
        let bills = self.read()?;
        let filtered: Vec<Bill> = bills
            .iter()
            .filter(|bill| bill_type.is_none_or(|t| bill.bill_type() == t))
            .cloned()
            .collect();
        Ok(filtered)
    }

    async fn update_bill(&mut self, bill: &Bill) -> BillingResult<()> {
        let mut bills = self.write()?;
        match bills.iter_mut().find(|existing| existing.id == bill.id) {
            Some(existing) => {
                *existing = bill.clone();
                Ok(())
            }
            None => Err(BillingError::BillNotFound(bill.id)),
        }
    }

    async fn delete_bill(&mut self, bill_id: i64) -> BillingResult<()> {
        let mut bills = self.write()?;
        match bills.iter().position(|bill| bill.id == bill_id) {
            Some(position) => {
                bills.remove(position);
                Ok(())
            }
            None => Err(BillingError::BillNotFound(bill_id)),
        }
    }
}
