//! Vendor bill grouping and reconciliation

use bigdecimal::BigDecimal;
use serde::Serialize;
use std::collections::HashSet;

use crate::config::ReconciliationConfig;
use crate::grouping::CompanyBillIndex;
use crate::types::*;

/// Comparison of a vendor bill against the company bills it covers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reconciliation {
    /// Sum of the linked company bills' invoice amounts
    pub company_total: BigDecimal,
    /// The vendor bill's own invoice amount
    pub vendor_amount: BigDecimal,
    /// `vendor_amount - company_total`
    pub difference: BigDecimal,
    pub is_matched: bool,
    /// References the vendor bill declares, whether they resolve or not
    #[serde(rename = "coveredPOs")]
    pub covered_pos: usize,
    pub linked_bills: usize,
    /// Declared references that did not resolve to a company bill
    pub missing_bills: usize,
}

impl Reconciliation {
    /// Reconcile a vendor bill against its resolved children
    pub fn compute(vendor_bill: &Bill, child_bills: &[Bill], tolerance: &BigDecimal) -> Self {
        let company_total: BigDecimal = child_bills.iter().map(Bill::amount_or_zero).sum();
        let vendor_amount = vendor_bill.amount_or_zero();
        let difference = &vendor_amount - &company_total;
        let is_matched = difference.abs() < *tolerance;

        let covered_pos = vendor_bill.linkage().declared_count();
        let linked_bills = child_bills.len();

        Self {
            company_total,
            vendor_amount,
            difference,
            is_matched,
            covered_pos,
            linked_bills,
            missing_bills: covered_pos.saturating_sub(linked_bills),
        }
    }
}

/// A vendor bill together with the company bills it covers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedVendorBill {
    #[serde(flatten)]
    pub bill: Bill,
    #[serde(rename = "childBills")]
    pub child_bills: Vec<Bill>,
    pub reconciliation: Reconciliation,
}

/// Result of grouping a bill snapshot
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillGrouping {
    /// One entry per vendor bill, in input order
    pub grouped_bills: Vec<GroupedVendorBill>,
    /// Company bills no vendor bill covers, in input order
    pub orphan_bills: Vec<Bill>,
}

impl BillGrouping {
    /// Aggregate figures over the whole grouping
    pub fn summary(&self) -> GroupingSummary {
        let matched = self
            .grouped_bills
            .iter()
            .filter(|g| g.reconciliation.is_matched)
            .count();

        GroupingSummary {
            vendor_bills: self.grouped_bills.len(),
            matched,
            unmatched: self.grouped_bills.len() - matched,
            orphan_bills: self.orphan_bills.len(),
            total_vendor_amount: self
                .grouped_bills
                .iter()
                .map(|g| &g.reconciliation.vendor_amount)
                .sum(),
            total_company_amount: self
                .grouped_bills
                .iter()
                .map(|g| &g.reconciliation.company_total)
                .sum(),
            orphan_amount: self.orphan_bills.iter().map(Bill::amount_or_zero).sum(),
            missing_references: self
                .grouped_bills
                .iter()
                .map(|g| g.reconciliation.missing_bills)
                .sum(),
        }
    }

    /// Find a grouped vendor bill by id
    pub fn vendor_bill(&self, id: i64) -> Option<&GroupedVendorBill> {
        self.grouped_bills.iter().find(|g| g.bill.id == id)
    }

    /// Serialize into the JSON shape consumed by the bill table
    pub fn to_json(&self) -> BillingResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Aggregate figures for a grouping
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupingSummary {
    pub vendor_bills: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub orphan_bills: usize,
    pub total_vendor_amount: BigDecimal,
    /// Sum of company totals; a company bill covered twice is counted twice
    pub total_company_amount: BigDecimal,
    pub orphan_amount: BigDecimal,
    pub missing_references: usize,
}

/// Groups vendor bills with the company bills they cover
#[derive(Debug, Clone, Default)]
pub struct BillGrouper {
    config: ReconciliationConfig,
}

impl BillGrouper {
    pub fn new(config: ReconciliationConfig) -> Self {
        Self { config }
    }

    /// Group a bill snapshot.
    ///
    /// Every company bill ends up either under at least one vendor bill or in
    /// `orphan_bills`. A company bill covered by several vendor bills is
    /// attached to each of them.
    pub fn group(&self, bills: &[Bill]) -> BillGrouping {
        let (vendor_bills, company_bills): (Vec<&Bill>, Vec<&Bill>) =
            bills.iter().partition(|bill| bill.is_vendor());

        let index = CompanyBillIndex::build(company_bills.iter().copied());
        let mut linked_company_bill_ids = HashSet::new();
        let mut grouped_bills = Vec::with_capacity(vendor_bills.len());

        for vendor_bill in vendor_bills {
            let child_bills: Vec<Bill> = index
                .resolve(vendor_bill.linkage())
                .into_iter()
                .cloned()
                .collect();

            for child in &child_bills {
                if !linked_company_bill_ids.insert(child.id) {
                    tracing::warn!(
                        "Company bill {} covered more than once (again by vendor bill {})",
                        child.id,
                        vendor_bill.id
                    );
                }
            }

            let reconciliation =
                Reconciliation::compute(vendor_bill, &child_bills, &self.config.match_tolerance);

            grouped_bills.push(GroupedVendorBill {
                bill: vendor_bill.clone(),
                child_bills,
                reconciliation,
            });
        }

        let orphan_bills: Vec<Bill> = company_bills
            .into_iter()
            .filter(|bill| !linked_company_bill_ids.contains(&bill.id))
            .cloned()
            .collect();

        tracing::debug!(
            "Grouped {} vendor bills, {} company bills linked, {} orphans",
            grouped_bills.len(),
            linked_company_bill_ids.len(),
            orphan_bills.len()
        );

        BillGrouping {
            grouped_bills,
            orphan_bills,
        }
    }
}

/// Group bills with the default one-cent match tolerance
pub fn group_bills(bills: &[Bill]) -> BillGrouping {
    BillGrouper::default().group(bills)
}
