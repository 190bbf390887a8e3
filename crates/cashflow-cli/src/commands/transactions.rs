//! Transaction command implementations

use anyhow::{Context, Result};
use cashflow_core::db::Database;
use cashflow_core::models::{NewTransaction, Transaction};
use cashflow_core::{PaginationSettings, TransactionFilter, TransactionOrdering, TransactionQuery};

use super::truncate;

/// Amounts are unsigned magnitudes; the type column carries the direction
pub(crate) fn format_amount(tx: &Transaction) -> String {
    format!("${}", tx.amount)
}

pub fn cmd_transactions_list(
    db: &Database,
    filter: &TransactionFilter,
    ordering: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<()> {
    let ordering: TransactionOrdering = match ordering {
        Some(value) => value.parse()?,
        None => TransactionOrdering::default(),
    };
    let query = TransactionQuery {
        filter: filter.clone(),
        ordering,
        limit: Some(limit),
        offset,
    };
    let page = db.list_transactions(&query, PaginationSettings::default())?;

    if page.transactions.is_empty() {
        println!("No transactions found. Record one with:");
        println!("  cashflow transactions add --date 2024-01-15 --status 1 --type 1 --category 1 --subcategory 1 --amount 100.00");
        return Ok(());
    }

    println!();
    println!(
        "📝 Transactions ({}-{} of {})",
        page.offset + 1,
        page.offset + page.transactions.len() as i64,
        page.total
    );
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in &page.transactions {
        println!(
            "   [{}] {} │ {:>18} │ {:<8} │ {} / {} │ {}",
            tx.id,
            tx.transaction_date,
            format_amount(tx),
            truncate(&tx.transaction_type_name, 8),
            tx.category_name,
            tx.subcategory_name,
            truncate(&tx.comment, 30)
        );
    }

    Ok(())
}

pub fn cmd_transactions_show(db: &Database, id: i64) -> Result<()> {
    let tx = db
        .get_transaction(id)?
        .ok_or_else(|| anyhow::anyhow!("Transaction {} not found", id))?;

    println!();
    println!("🧾 Transaction {}", tx.id);
    println!("   Date:        {}", tx.transaction_date);
    println!("   Amount:      {}", format_amount(&tx));
    println!("   Status:      {}", tx.status_name);
    println!("   Type:        {}", tx.transaction_type_name);
    println!("   Category:    {}", tx.category_name);
    println!("   Subcategory: {}", tx.subcategory_name);
    if !tx.comment.is_empty() {
        println!("   Comment:     {}", tx.comment);
    }
    println!("   Recorded:    {}", tx.created_at.format("%Y-%m-%d %H:%M:%S UTC"));

    Ok(())
}

pub fn cmd_transactions_add(db: &Database, new: &NewTransaction) -> Result<()> {
    let tx = db
        .create_transaction(new)
        .context("Failed to record transaction")?;

    println!("✅ Recorded transaction {}:", tx.id);
    println!(
        "   {} │ {} │ {} │ {} / {}",
        tx.transaction_date,
        format_amount(&tx),
        tx.transaction_type_name,
        tx.category_name,
        tx.subcategory_name
    );

    Ok(())
}

pub fn cmd_transactions_delete(db: &Database, id: i64) -> Result<()> {
    db.delete_transaction(id)
        .with_context(|| format!("Failed to delete transaction {}", id))?;

    println!("✅ Deleted transaction {}", id);

    Ok(())
}
