//! Core types and data structures for bill grouping

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two kinds of bills the ERP produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillType {
    /// Issued internally from a purchase order
    Company,
    /// Received from an external vendor, possibly consolidating company bills
    Vendor,
}

impl fmt::Display for BillType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BillType::Company => write!(f, "company"),
            BillType::Vendor => write!(f, "vendor"),
        }
    }
}

/// Payment state of a bill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Unpaid,
    Partial,
    Paid,
    Overdue,
}

impl FromStr for PaymentStatus {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unpaid" => Ok(PaymentStatus::Unpaid),
            "partial" => Ok(PaymentStatus::Partial),
            "paid" => Ok(PaymentStatus::Paid),
            "overdue" => Ok(PaymentStatus::Overdue),
            other => Err(BillingError::Validation(format!(
                "Unknown payment status: {other}"
            ))),
        }
    }
}

/// Type-specific part of a bill, keyed by `bill_type`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "bill_type", rename_all = "lowercase")]
pub enum BillKind {
    Company {
        /// Legacy link to the purchase order the bill was generated from
        #[serde(default, deserialize_with = "lenient::integer")]
        purchase_order_id: Option<i64>,
    },
    Vendor {
        /// Company bills consolidated by this vendor bill
        #[serde(default, deserialize_with = "lenient::id_list")]
        covers_company_bills: Option<Vec<i64>>,
        /// Legacy coverage expressed as purchase orders
        #[serde(default, deserialize_with = "lenient::id_list")]
        covers_purchase_orders: Option<Vec<i64>>,
    },
}

impl BillKind {
    pub fn bill_type(&self) -> BillType {
        match self {
            BillKind::Company { .. } => BillType::Company,
            BillKind::Vendor { .. } => BillType::Vendor,
        }
    }

    /// Resolve which coverage list applies.
    ///
    /// A non-empty `covers_company_bills` always wins over
    /// `covers_purchase_orders`. Company bills never cover anything.
    pub fn linkage(&self) -> Linkage<'_> {
        match self {
            BillKind::Company { .. } => Linkage::Unlinked,
            BillKind::Vendor {
                covers_company_bills,
                covers_purchase_orders,
            } => match (covers_company_bills.as_deref(), covers_purchase_orders.as_deref()) {
                (Some(ids), _) if !ids.is_empty() => Linkage::CompanyBills(ids),
                (_, Some(ids)) if !ids.is_empty() => Linkage::PurchaseOrders(ids),
                _ => Linkage::Unlinked,
            },
        }
    }
}

/// How a vendor bill points at the company bills it covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Linkage<'a> {
    /// New workflow: direct company bill IDs
    CompanyBills(&'a [i64]),
    /// Legacy workflow: purchase order IDs
    PurchaseOrders(&'a [i64]),
    Unlinked,
}

impl Linkage<'_> {
    /// Number of references the vendor bill declares, resolvable or not
    pub fn declared_count(&self) -> usize {
        match self {
            Linkage::CompanyBills(ids) | Linkage::PurchaseOrders(ids) => ids.len(),
            Linkage::Unlinked => 0,
        }
    }

    pub fn reference_kind(&self) -> Option<ReferenceKind> {
        match self {
            Linkage::CompanyBills(_) => Some(ReferenceKind::CompanyBill),
            Linkage::PurchaseOrders(_) => Some(ReferenceKind::PurchaseOrder),
            Linkage::Unlinked => None,
        }
    }
}

/// What a coverage reference points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    CompanyBill,
    PurchaseOrder,
}

/// A bill row as returned by the bill listing endpoint
///
/// Only `id` and `bill_type` are required. Every other field is read
/// leniently: values that are missing or cannot be interpreted become `None`
/// instead of failing the row, and integers may arrive as numeric strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    #[serde(deserialize_with = "lenient::id")]
    pub id: i64,
    #[serde(default, deserialize_with = "lenient::string")]
    pub invoice_number: Option<String>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub invoice_amount: Option<BigDecimal>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub paid_amount: Option<BigDecimal>,
    #[serde(default, deserialize_with = "lenient::payment_status")]
    pub payment_status: Option<PaymentStatus>,
    #[serde(default, deserialize_with = "lenient::date")]
    pub bill_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::date")]
    pub due_date: Option<NaiveDate>,
    #[serde(flatten)]
    pub kind: BillKind,
}

impl Bill {
    fn with_kind(
        id: i64,
        invoice_number: impl Into<String>,
        invoice_amount: BigDecimal,
        kind: BillKind,
    ) -> Self {
        Self {
            id,
            invoice_number: Some(invoice_number.into()),
            invoice_amount: Some(invoice_amount),
            paid_amount: None,
            payment_status: Some(PaymentStatus::Unpaid),
            bill_date: None,
            due_date: None,
            kind,
        }
    }

    /// Create a company bill
    pub fn company(
        id: i64,
        invoice_number: impl Into<String>,
        invoice_amount: BigDecimal,
        purchase_order_id: Option<i64>,
    ) -> Self {
        Self::with_kind(
            id,
            invoice_number,
            invoice_amount,
            BillKind::Company { purchase_order_id },
        )
    }

    /// Create a vendor bill with no coverage
    pub fn vendor(id: i64, invoice_number: impl Into<String>, invoice_amount: BigDecimal) -> Self {
        Self::with_kind(
            id,
            invoice_number,
            invoice_amount,
            BillKind::Vendor {
                covers_company_bills: None,
                covers_purchase_orders: None,
            },
        )
    }

    /// Set the covered company bills. No effect on company bills.
    pub fn covering_company_bills(mut self, ids: Vec<i64>) -> Self {
        if let BillKind::Vendor {
            covers_company_bills,
            ..
        } = &mut self.kind
        {
            *covers_company_bills = Some(ids);
        }
        self
    }

    /// Set the covered purchase orders. No effect on company bills.
    pub fn covering_purchase_orders(mut self, ids: Vec<i64>) -> Self {
        if let BillKind::Vendor {
            covers_purchase_orders,
            ..
        } = &mut self.kind
        {
            *covers_purchase_orders = Some(ids);
        }
        self
    }

    pub fn with_paid_amount(mut self, paid_amount: BigDecimal) -> Self {
        self.paid_amount = Some(paid_amount);
        self
    }

    pub fn with_payment_status(mut self, status: PaymentStatus) -> Self {
        self.payment_status = Some(status);
        self
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn bill_type(&self) -> BillType {
        self.kind.bill_type()
    }

    pub fn is_vendor(&self) -> bool {
        self.bill_type() == BillType::Vendor
    }

    pub fn is_company(&self) -> bool {
        self.bill_type() == BillType::Company
    }

    /// Purchase order a company bill was generated from
    pub fn purchase_order_id(&self) -> Option<i64> {
        match self.kind {
            BillKind::Company { purchase_order_id } => purchase_order_id,
            BillKind::Vendor { .. } => None,
        }
    }

    pub fn linkage(&self) -> Linkage<'_> {
        self.kind.linkage()
    }

    /// Invoice amount, with a missing value counted as zero
    pub fn amount_or_zero(&self) -> BigDecimal {
        self.invoice_amount
            .clone()
            .unwrap_or_else(|| BigDecimal::from(0))
    }

    /// Paid amount, with a missing value counted as zero
    pub fn paid_or_zero(&self) -> BigDecimal {
        self.paid_amount
            .clone()
            .unwrap_or_else(|| BigDecimal::from(0))
    }

    /// Amount still owed on the bill
    pub fn outstanding_amount(&self) -> BigDecimal {
        self.amount_or_zero() - self.paid_or_zero()
    }

    /// Whether the bill is overdue as of the given date
    pub fn is_overdue(&self, as_of: NaiveDate) -> bool {
        match self.payment_status {
            Some(PaymentStatus::Overdue) => true,
            Some(PaymentStatus::Paid) => false,
            _ => self.due_date.is_some_and(|due| due < as_of),
        }
    }
}

/// Field readers that never fail on malformed values
mod lenient {
    use super::*;
    use serde::Deserializer;
    use serde_json::Value;

    pub(super) fn amount<'de, D>(deserializer: D) -> Result<Option<BigDecimal>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.as_ref().and_then(parse_amount))
    }

    pub(super) fn id<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        parse_integer(&value)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid bill id {value}")))
    }

    pub(super) fn integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.as_ref().and_then(parse_integer))
    }

    /// Unreadable elements are dropped; a non-array value becomes `None`
    pub(super) fn id_list<'de, D>(deserializer: D) -> Result<Option<Vec<i64>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::Array(items)) => Some(items.iter().filter_map(parse_integer).collect()),
            _ => None,
        })
    }

    pub(super) fn string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::String(s)) => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
    }

    pub(super) fn payment_status<'de, D>(
        deserializer: D,
    ) -> Result<Option<PaymentStatus>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::String(s)) => s.parse().ok(),
            _ => None,
        })
    }

    pub(super) fn date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            // Accepts both "2024-03-01" and "2024-03-01T10:00:00Z"
            Some(Value::String(s)) => s
                .get(..10)
                .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()),
            _ => None,
        })
    }
}

/// Largest decimal exponent accepted in either direction for an amount
pub const MAX_AMOUNT_EXPONENT: i64 = 64;

/// Largest number of significant digits accepted for an amount
pub const MAX_AMOUNT_DIGITS: u64 = 64;

/// Interpret a JSON value as a monetary amount.
///
/// Numbers and numeric strings are accepted; anything else yields `None`.
/// Values with an exponent or digit count beyond [`MAX_AMOUNT_EXPONENT`] /
/// [`MAX_AMOUNT_DIGITS`] are rejected as well.
pub fn parse_amount(value: &serde_json::Value) -> Option<BigDecimal> {
    let amount = match value {
        serde_json::Value::Number(n) => BigDecimal::from_str(&n.to_string()).ok()?,
        serde_json::Value::String(s) => BigDecimal::from_str(s.trim()).ok()?,
        _ => return None,
    };

    let (_, scale) = amount.as_bigint_and_exponent();
    if scale.abs() > MAX_AMOUNT_EXPONENT || amount.digits() > MAX_AMOUNT_DIGITS {
        tracing::warn!("Ignoring out-of-range amount {}", value);
        return None;
    }
    Some(amount)
}

/// Interpret a JSON value as an integer id.
///
/// Integral numbers and numeric strings are accepted; anything else yields
/// `None`.
pub fn parse_integer(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Errors that can occur while loading, linking, or grouping bills
#[derive(Debug, thiserror::Error)]
pub enum BillingError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Bill not found: {0}")]
    BillNotFound(i64),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for billing operations
pub type BillingResult<T> = Result<T, BillingError>;
