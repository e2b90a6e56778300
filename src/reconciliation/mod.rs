//! Reconciliation engine over a bill store
//!
//! Loads the current bill snapshot from a [`BillStorage`] backend and runs the
//! grouping on it. Every query works on a fresh snapshot; no derived state is
//! kept between calls.

use crate::config::ReconciliationConfig;
use crate::grouping::{BillGrouper, BillGrouping, GroupedVendorBill, GroupingSummary};
use crate::traits::*;
use crate::types::*;
use crate::utils::validation::validate_company_bill_links;

/// Reconciles vendor bills against company bills held in storage
pub struct ReconciliationEngine<S: BillStorage> {
    storage: S,
    grouper: BillGrouper,
}

impl<S: BillStorage> ReconciliationEngine<S> {
    /// Create an engine with the default match tolerance
    pub fn new(storage: S) -> Self {
        Self::with_config(storage, ReconciliationConfig::default())
    }

    /// Create an engine with custom reconciliation settings
    pub fn with_config(storage: S, config: ReconciliationConfig) -> Self {
        Self {
            storage,
            grouper: BillGrouper::new(config),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Group the current bill snapshot
    pub async fn grouped_bills(&self) -> BillingResult<BillGrouping> {
        let bills = self.storage.list_bills(None).await?;
        Ok(self.grouper.group(&bills))
    }

    /// Grouped view of a single vendor bill
    pub async fn vendor_reconciliation(&self, vendor_bill_id: i64) -> BillingResult<GroupedVendorBill> {
        self.grouped_bills()
            .await?
            .grouped_bills
            .into_iter()
            .find(|grouped| grouped.bill.id == vendor_bill_id)
            .ok_or(BillingError::BillNotFound(vendor_bill_id))
    }

    /// Company bills not covered by any vendor bill
    pub async fn orphan_bills(&self) -> BillingResult<Vec<Bill>> {
        Ok(self.grouped_bills().await?.orphan_bills)
    }

    /// Aggregate figures for the current snapshot
    pub async fn summary(&self) -> BillingResult<GroupingSummary> {
        Ok(self.grouped_bills().await?.summary())
    }

    /// Link company bills to a vendor bill using direct bill IDs.
    ///
    /// Replaces any previous company bill coverage of the vendor bill. Legacy
    /// purchase order coverage is left untouched but no longer applies once
    /// company bill IDs are set.
    pub async fn link_company_bills(
        &mut self,
        vendor_bill_id: i64,
        company_bill_ids: Vec<i64>,
    ) -> BillingResult<GroupedVendorBill> {
        let mut vendor_bill = self
            .storage
            .get_bill(vendor_bill_id)
            .await?
            .filter(Bill::is_vendor)
            .ok_or(BillingError::BillNotFound(vendor_bill_id))?;

        let bills = self.storage.list_bills(None).await?;
        validate_company_bill_links(&bills, &company_bill_ids)?;

        if let BillKind::Vendor {
            covers_company_bills,
            ..
        } = &mut vendor_bill.kind
        {
            *covers_company_bills = Some(company_bill_ids);
        }
        self.storage.update_bill(&vendor_bill).await?;

        tracing::info!(
            "Linked vendor bill {} to {} company bills",
            vendor_bill_id,
            vendor_bill.linkage().declared_count()
        );

        self.vendor_reconciliation(vendor_bill_id).await
    }
}
