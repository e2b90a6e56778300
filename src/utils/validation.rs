//! Validation and diagnostics for bill coverage links

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::grouping::{BillGrouping, CompanyBillIndex};
use crate::types::*;

/// A coverage reference on a vendor bill that resolves to no company bill
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingReference {
    pub vendor_bill_id: i64,
    pub kind: ReferenceKind,
    pub missing_id: i64,
}

/// A company bill covered by more than one vendor bill
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverCoverage {
    pub company_bill_id: i64,
    /// Vendor bills covering it, in grouping order
    pub vendor_bill_ids: Vec<i64>,
}

/// List every coverage reference that does not resolve, in input order
pub fn dangling_references(bills: &[Bill]) -> Vec<DanglingReference> {
    let index = CompanyBillIndex::build(bills);
    let mut dangling = Vec::new();

    for vendor_bill in bills.iter().filter(|bill| bill.is_vendor()) {
        let (kind, ids) = match vendor_bill.linkage() {
            Linkage::CompanyBills(ids) => (ReferenceKind::CompanyBill, ids),
            Linkage::PurchaseOrders(ids) => (ReferenceKind::PurchaseOrder, ids),
            Linkage::Unlinked => continue,
        };
        dangling.extend(
            ids.iter()
                .filter(|&&id| index.get(kind, id).is_none())
                .map(|&missing_id| DanglingReference {
                    vendor_bill_id: vendor_bill.id,
                    kind,
                    missing_id,
                }),
        );
    }

    dangling
}

/// List company bills attached to more than one vendor bill
pub fn over_covered_company_bills(grouping: &BillGrouping) -> Vec<OverCoverage> {
    let mut owners: HashMap<i64, Vec<i64>> = HashMap::new();
    let mut order = Vec::new();

    for grouped in &grouping.grouped_bills {
        for child in &grouped.child_bills {
            let vendors = owners.entry(child.id).or_insert_with(|| {
                order.push(child.id);
                Vec::new()
            });
            if !vendors.contains(&grouped.bill.id) {
                vendors.push(grouped.bill.id);
            }
        }
    }

    order
        .into_iter()
        .filter_map(|company_bill_id| {
            let vendor_bill_ids = owners.remove(&company_bill_id)?;
            (vendor_bill_ids.len() > 1).then_some(OverCoverage {
                company_bill_id,
                vendor_bill_ids,
            })
        })
        .collect()
}

/// Validate a request to link company bills to a vendor bill.
///
/// The list must be non-empty, free of duplicates, and name only existing
/// company bills from `bills`.
pub fn validate_company_bill_links(bills: &[Bill], company_bill_ids: &[i64]) -> BillingResult<()> {
    if company_bill_ids.is_empty() {
        return Err(BillingError::Validation(
            "At least one company bill must be linked".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for &id in company_bill_ids {
        if !seen.insert(id) {
            return Err(BillingError::Validation(format!(
                "Company bill {id} is listed more than once"
            )));
        }

        match bills.iter().find(|bill| bill.id == id) {
            Some(bill) if bill.is_company() => {}
            Some(bill) => {
                return Err(BillingError::Validation(format!(
                    "Bill {id} is a {} bill, only company bills can be linked",
                    bill.bill_type()
                )));
            }
            None => {
                return Err(BillingError::Validation(format!(
                    "Company bill {id} does not exist"
                )));
            }
        }
    }

    Ok(())
}
