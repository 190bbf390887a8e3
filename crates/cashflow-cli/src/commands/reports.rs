//! Summary report command

use anyhow::Result;
use cashflow_core::db::Database;
use cashflow_core::TransactionFilter;

use super::truncate;

pub fn cmd_summary(db: &Database, filter: &TransactionFilter, json: bool) -> Result<()> {
    let summary = db.transaction_summary(filter)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!();
    println!("📊 Transaction Summary");
    println!("   ─────────────────────────────");
    println!("   Transactions: {}", summary.total_count);
    println!("   Total:        ${}", summary.total_amount);
    println!("   Average:      ${}", summary.average_amount);

    if summary.total_count == 0 {
        println!();
        println!("   No transactions match these filters.");
        return Ok(());
    }

    println!();
    println!("   By type:");
    for row in &summary.by_type {
        println!(
            "     {:<20} {:>5} │ ${:>14}",
            row.transaction_type_name, row.count, row.total
        );
    }

    println!();
    println!("   Top categories:");
    for row in &summary.by_category {
        println!(
            "     {:<20} {:>5} │ ${:>14}  ({})",
            truncate(&row.category_name, 20),
            row.count,
            row.total,
            row.transaction_type_name
        );
    }

    Ok(())
}
