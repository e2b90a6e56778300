//! Lookup indices over company bills

use std::collections::HashMap;

use crate::types::*;

/// Company bills keyed by id and by originating purchase order
///
/// When two company bills share a key the later one in input order wins.
#[derive(Debug, Default)]
pub struct CompanyBillIndex<'a> {
    by_id: HashMap<i64, &'a Bill>,
    by_purchase_order: HashMap<i64, &'a Bill>,
}

impl<'a> CompanyBillIndex<'a> {
    /// Index the given bills, skipping anything that is not a company bill
    pub fn build<I>(bills: I) -> Self
    where
        I: IntoIterator<Item = &'a Bill>,
    {
        let mut index = Self::default();
        for bill in bills.into_iter().filter(|b| b.is_company()) {
            index.by_id.insert(bill.id, bill);
            if let Some(purchase_order_id) = bill.purchase_order_id() {
                index.by_purchase_order.insert(purchase_order_id, bill);
            }
        }
        index
    }

    /// Look up a single reference
    pub fn get(&self, kind: ReferenceKind, id: i64) -> Option<&'a Bill> {
        let index = match kind {
            ReferenceKind::CompanyBill => &self.by_id,
            ReferenceKind::PurchaseOrder => &self.by_purchase_order,
        };
        index.get(&id).copied()
    }

    /// Resolve every reference of a linkage, dropping the dangling ones
    pub fn resolve(&self, linkage: Linkage<'_>) -> Vec<&'a Bill> {
        let (kind, ids) = match linkage {
            Linkage::CompanyBills(ids) => (ReferenceKind::CompanyBill, ids),
            Linkage::PurchaseOrders(ids) => (ReferenceKind::PurchaseOrder, ids),
            Linkage::Unlinked => return Vec::new(),
        };
        ids.iter().filter_map(|&id| self.get(kind, id)).collect()
    }
}
