//! Reading raw bill rows from the bill listing endpoint

use serde::Deserialize;
use serde_json::Value;

use crate::grouping::{BillGrouper, BillGrouping};
use crate::types::*;

/// Parse a JSON array of bill rows.
///
/// Rows that cannot be read as a bill (no readable id, missing or unknown
/// `bill_type`) are skipped with a warning.
/// Anything other than an array is rejected.
pub fn parse_bills(rows: &Value) -> BillingResult<Vec<Bill>> {
    let rows = rows.as_array().ok_or_else(|| {
        BillingError::InvalidInput(format!(
            "expected an array of bills, got {}",
            value_kind(rows)
        ))
    })?;

    let mut bills = Vec::with_capacity(rows.len());
    for (position, row) in rows.iter().enumerate() {
        match Bill::deserialize(row) {
            Ok(bill) => bills.push(bill),
            Err(e) => {
                tracing::warn!("Skipping bill row {} (id {}): {}", position, row["id"], e);
            }
        }
    }

    if bills.len() < rows.len() {
        tracing::debug!("Parsed {} of {} bill rows", bills.len(), rows.len());
    }

    Ok(bills)
}

/// Parse and group a JSON array of bill rows with the given grouper
pub fn group_bill_rows(grouper: &BillGrouper, rows: &Value) -> BillingResult<BillGrouping> {
    let bills = parse_bills(rows)?;
    Ok(grouper.group(&bills))
}

/// Parse and group a JSON array of bill rows with default settings
pub fn group_bills_json(rows: &Value) -> BillingResult<BillGrouping> {
    group_bill_rows(&BillGrouper::default(), rows)
}

/// Parse and group a JSON document holding an array of bill rows
pub fn group_bills_from_str(json: &str) -> BillingResult<BillGrouping> {
    let rows: Value = serde_json::from_str(json)
        .map_err(|e| BillingError::InvalidInput(format!("malformed bill JSON: {e}")))?;
    group_bills_json(&rows)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
