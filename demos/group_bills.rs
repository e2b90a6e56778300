//! Group a bill listing and print the reconciliation view
//!
//! Usage: cargo run --example group_bills [bills.json]

use billing_core::utils::{dangling_references, over_covered_company_bills};
use billing_core::{parse_bills, BillGrouper, ReconciliationConfig};
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_target(true)
        .with_level(true)
        .init();

    println!("🧾 Billing Core - Bill Grouping Example\n");

    let rows = match std::env::args().nth(1) {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => sample_rows(),
    };

    let bills = parse_bills(&rows)?;
    let grouper = BillGrouper::new(ReconciliationConfig::from_env());
    let grouping = grouper.group(&bills);

    println!("📊 Vendor bills");
    for grouped in &grouping.grouped_bills {
        let r = &grouped.reconciliation;
        println!(
            "  {} {} vendor={} company={} diff={} linked={}/{}",
            if r.is_matched { "✓" } else { "✗" },
            grouped.bill.invoice_number.as_deref().unwrap_or("-"),
            r.vendor_amount,
            r.company_total,
            r.difference,
            r.linked_bills,
            r.covered_pos
        );
        for child in &grouped.child_bills {
            println!(
                "      └ {} {}",
                child.invoice_number.as_deref().unwrap_or("-"),
                child.amount_or_zero()
            );
        }
    }

    println!("\n📎 Orphan company bills");
    for orphan in &grouping.orphan_bills {
        println!(
            "  {} {}",
            orphan.invoice_number.as_deref().unwrap_or("-"),
            orphan.amount_or_zero()
        );
    }

    for dangling in dangling_references(&bills) {
        println!(
            "  ⚠ vendor bill {} references missing {:?} {}",
            dangling.vendor_bill_id, dangling.kind, dangling.missing_id
        );
    }
    for over in over_covered_company_bills(&grouping) {
        println!(
            "  ⚠ company bill {} covered by vendor bills {:?}",
            over.company_bill_id, over.vendor_bill_ids
        );
    }

    println!("\n📈 Summary");
    println!("{}", serde_json::to_string_pretty(&grouping.summary())?);

    Ok(())
}

fn sample_rows() -> serde_json::Value {
    json!([
        { "id": 1, "bill_type": "company", "invoice_number": "CB-001", "invoice_amount": "4200.00", "purchase_order_id": 900 },
        { "id": 2, "bill_type": "company", "invoice_number": "CB-002", "invoice_amount": "1800.00", "purchase_order_id": 901 },
        { "id": 3, "bill_type": "company", "invoice_number": "CB-003", "invoice_amount": "950.50" },
        { "id": 10, "bill_type": "vendor", "invoice_number": "VND-17", "invoice_amount": "6000.00", "covers_company_bills": [1, 2] },
        { "id": 11, "bill_type": "vendor", "invoice_number": "VND-18", "invoice_amount": "1000.00", "covers_purchase_orders": [902] }
    ])
}
