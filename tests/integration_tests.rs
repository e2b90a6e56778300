//! Integration tests for billing-core

use billing_core::{
    group_bills, group_bills_from_str, group_bills_json, parse_bills,
    utils::{dangling_references, over_covered_company_bills, MemoryBillStorage},
    Bill, BillStorage, BillType, BillingError, ReconciliationConfig, ReconciliationEngine,
};
use bigdecimal::BigDecimal;
use serde_json::json;
use std::collections::HashMap;
use std::str::FromStr;

fn dec(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).unwrap()
}

/// Snapshot shaped like the bill listing endpoint's response
fn bill_rows() -> serde_json::Value {
    json!([
        { "id": 101, "bill_type": "company", "invoice_number": "CB-101", "invoice_amount": "12500.00",
          "paid_amount": "0.00", "payment_status": "unpaid", "purchase_order_id": 7001,
          "bill_date": "2024-02-01", "due_date": "2024-03-01" },
        { "id": 102, "bill_type": "company", "invoice_number": "CB-102", "invoice_amount": "7499.99",
          "paid_amount": "7499.99", "payment_status": "paid", "purchase_order_id": 7002 },
        { "id": 103, "bill_type": "company", "invoice_number": "CB-103", "invoice_amount": 3000,
          "payment_status": "overdue", "purchase_order_id": 7003 },
        { "id": 104, "bill_type": "company", "invoice_number": "CB-104", "invoice_amount": null,
          "purchase_order_id": null },
        { "id": 201, "bill_type": "vendor", "invoice_number": "VND-88", "invoice_amount": "19999.99",
          "covers_company_bills": [101, 102], "covers_purchase_orders": [7003] },
        { "id": 202, "bill_type": "vendor", "invoice_number": "VND-89", "invoice_amount": 3500,
          "covers_purchase_orders": [7003, 7999] },
        { "id": 203, "bill_type": "vendor", "invoice_number": "VND-90", "invoice_amount": "250.00",
          "covers_company_bills": [], "covers_purchase_orders": [] },
        { "id": 204, "invoice_number": "??", "invoice_amount": 1 }
    ])
}

#[test]
fn test_scenario_matched_vendor_bill() {
    let grouping = group_bills_json(&json!([
        { "id": 1, "bill_type": "company", "invoice_amount": 100, "purchase_order_id": 50 },
        { "id": 2, "bill_type": "vendor", "invoice_amount": 100, "covers_company_bills": [1] }
    ]))
    .unwrap();

    let json = grouping.to_json().unwrap();
    assert_eq!(json["groupedBills"].as_array().unwrap().len(), 1);
    assert_eq!(json["groupedBills"][0]["id"], 2);
    assert_eq!(json["groupedBills"][0]["childBills"][0]["id"], 1);

    let reconciliation = &grouping.grouped_bills[0].reconciliation;
    assert_eq!(reconciliation.company_total, BigDecimal::from(100));
    assert_eq!(reconciliation.vendor_amount, BigDecimal::from(100));
    assert_eq!(reconciliation.difference, BigDecimal::from(0));
    assert!(reconciliation.is_matched);
    assert_eq!(reconciliation.covered_pos, 1);
    assert_eq!(reconciliation.linked_bills, 1);
    assert_eq!(reconciliation.missing_bills, 0);
    assert!(grouping.orphan_bills.is_empty());
}

#[test]
fn test_scenario_orphan_company_bill() {
    let grouping =
        group_bills_from_str(r#"[{"id": 3, "bill_type": "company", "invoice_amount": 50}]"#).unwrap();

    assert!(grouping.grouped_bills.is_empty());
    assert_eq!(grouping.orphan_bills.len(), 1);
    assert_eq!(grouping.orphan_bills[0].id, 3);
}

#[test]
fn test_scenario_dangling_company_bill_reference() {
    let grouping = group_bills_json(&json!([
        { "id": 1, "bill_type": "company", "invoice_amount": 20 },
        { "id": 2, "bill_type": "vendor", "invoice_amount": 20, "covers_company_bills": [1, 555, 556] }
    ]))
    .unwrap();

    let grouped = &grouping.grouped_bills[0];
    assert_eq!(grouped.child_bills.len(), 1);
    assert_eq!(grouped.reconciliation.covered_pos, 3);
    assert_eq!(grouped.reconciliation.linked_bills, 1);
    assert_eq!(grouped.reconciliation.missing_bills, 2);
    assert!(grouped.reconciliation.is_matched);
}

#[test]
fn test_scenario_missing_vendor_amount() {
    let grouping = group_bills_json(&json!([
        { "id": 2, "bill_type": "vendor", "covers_purchase_orders": [9] }
    ]))
    .unwrap();

    let reconciliation = &grouping.grouped_bills[0].reconciliation;
    assert_eq!(reconciliation.vendor_amount, BigDecimal::from(0));
    assert_eq!(reconciliation.difference, BigDecimal::from(0));
    assert_eq!(reconciliation.missing_bills, 1);
}

#[test]
fn test_invalid_input_fails_fast() {
    let result = group_bills_json(&json!({ "data": bill_rows() }));
    assert!(matches!(result, Err(BillingError::InvalidInput(_))));
}

#[test]
fn test_full_snapshot_grouping() {
    let rows = bill_rows();
    let bills = parse_bills(&rows).unwrap();

    // Row 204 has no bill_type
    assert_eq!(bills.len(), 7);

    let grouping = group_bills(&bills);
    let by_id: HashMap<i64, _> = grouping
        .grouped_bills
        .iter()
        .map(|g| (g.bill.id, g))
        .collect();

    // Direct bill IDs win over the purchase order list
    let vnd_88 = by_id[&201];
    let children: Vec<i64> = vnd_88.child_bills.iter().map(|b| b.id).collect();
    assert_eq!(children, vec![101, 102]);
    assert_eq!(vnd_88.reconciliation.company_total, dec("19999.99"));
    assert!(vnd_88.reconciliation.is_matched);

    // Legacy purchase order coverage with one unknown order
    let vnd_89 = by_id[&202];
    let children: Vec<i64> = vnd_89.child_bills.iter().map(|b| b.id).collect();
    assert_eq!(children, vec![103]);
    assert_eq!(vnd_89.reconciliation.difference, dec("500"));
    assert_eq!(vnd_89.reconciliation.missing_bills, 1);

    // Empty coverage lists
    let vnd_90 = by_id[&203];
    assert!(vnd_90.child_bills.is_empty());
    assert_eq!(vnd_90.reconciliation.difference, dec("250"));

    let orphan_ids: Vec<i64> = grouping.orphan_bills.iter().map(|b| b.id).collect();
    assert_eq!(orphan_ids, vec![104]);

    let summary = grouping.summary();
    assert_eq!(summary.vendor_bills, 3);
    assert_eq!(summary.matched, 1);
    assert_eq!(summary.orphan_amount, BigDecimal::from(0));
    assert_eq!(summary.missing_references, 1);

    assert_eq!(dangling_references(&bills).len(), 1);
    assert!(over_covered_company_bills(&grouping).is_empty());
}

#[test]
fn test_every_company_bill_placed_exactly_once() {
    let bills = parse_bills(&bill_rows()).unwrap();
    let grouping = group_bills(&bills);

    let vendor_count = bills.iter().filter(|b| b.bill_type() == BillType::Vendor).count();
    assert_eq!(grouping.grouped_bills.len(), vendor_count);
    assert!(grouping.grouped_bills.iter().all(|g| g.bill.is_vendor()));

    for company in bills.iter().filter(|b| b.is_company()) {
        let as_child = grouping
            .grouped_bills
            .iter()
            .any(|g| g.child_bills.iter().any(|c| c.id == company.id));
        let as_orphan = grouping.orphan_bills.iter().any(|o| o.id == company.id);
        assert!(as_child != as_orphan, "company bill {} misplaced", company.id);
    }
}

#[test]
fn test_grouping_is_repeatable() {
    let bills = parse_bills(&bill_rows()).unwrap();
    let first = group_bills(&bills).to_json().unwrap();
    let second = group_bills(&bills).to_json().unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_engine_link_workflow() {
    let bills = parse_bills(&bill_rows()).unwrap();
    let mut storage = MemoryBillStorage::with_bills(bills);
    storage
        .save_bill(&Bill::vendor(205, "VND-91", dec("0")))
        .await
        .unwrap();

    let mut engine =
        ReconciliationEngine::with_config(storage, ReconciliationConfig::new(dec("0.01")));

    let before = engine.summary().await.unwrap();
    assert_eq!(before.vendor_bills, 4);
    assert_eq!(before.orphan_bills, 1);

    let grouped = engine.link_company_bills(205, vec![104]).await.unwrap();
    assert_eq!(grouped.child_bills[0].id, 104);
    assert!(grouped.reconciliation.is_matched);

    let after = engine.summary().await.unwrap();
    assert_eq!(after.orphan_bills, 0);
    assert_eq!(after.matched, 2);

    let stored = engine.storage().get_bill(205).await.unwrap().unwrap();
    assert_eq!(stored.linkage().declared_count(), 1);
}
