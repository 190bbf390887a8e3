//! Classification listing commands (statuses, types, categories, subcategories)

use anyhow::Result;
use cashflow_core::db::Database;
use cashflow_core::{ClassificationFilter, ClassificationKind};

use super::truncate;

pub fn cmd_statuses(db: &Database, search: Option<&str>) -> Result<()> {
    let filter = ClassificationFilter::new(ClassificationKind::Status).search(search);
    let statuses = db.list_statuses(&filter)?;

    if statuses.is_empty() {
        println!("No statuses found. Load the defaults with: cashflow seed");
        return Ok(());
    }

    println!();
    println!("🏷️  Statuses");
    for status in statuses {
        println!(
            "   [{:>3}] {:<20} {}",
            status.id,
            status.name,
            truncate(&status.description, 50)
        );
    }

    Ok(())
}

pub fn cmd_types(db: &Database, search: Option<&str>) -> Result<()> {
    let filter = ClassificationFilter::new(ClassificationKind::TransactionType).search(search);
    let types = db.list_transaction_types(&filter)?;

    if types.is_empty() {
        println!("No transaction types found. Load the defaults with: cashflow seed");
        return Ok(());
    }

    println!();
    println!("↔️  Transaction Types");
    for transaction_type in types {
        println!(
            "   [{:>3}] {:<20} {}",
            transaction_type.id,
            transaction_type.name,
            truncate(&transaction_type.description, 50)
        );
    }

    Ok(())
}

pub fn cmd_categories(
    db: &Database,
    transaction_type: Option<i64>,
    search: Option<&str>,
) -> Result<()> {
    let filter = ClassificationFilter::new(ClassificationKind::Category)
        .transaction_type(transaction_type)
        .search(search);
    let categories = db.list_categories(&filter)?;

    if categories.is_empty() {
        println!("No categories found.");
        return Ok(());
    }

    println!();
    println!("📂 Categories");
    for category in categories {
        println!(
            "   [{:>3}] {:<24} ({})",
            category.id, category.name, category.transaction_type_name
        );
    }

    Ok(())
}

pub fn cmd_subcategories(
    db: &Database,
    category: Option<i64>,
    search: Option<&str>,
) -> Result<()> {
    let filter = ClassificationFilter::new(ClassificationKind::Subcategory)
        .category(category)
        .search(search);
    let subcategories = db.list_subcategories(&filter)?;

    if subcategories.is_empty() {
        println!("No subcategories found.");
        return Ok(());
    }

    println!();
    println!("📁 Subcategories");
    for subcategory in subcategories {
        println!(
            "   [{:>3}] {:<28} {} › {}",
            subcategory.id,
            subcategory.name,
            subcategory.transaction_type_name,
            subcategory.category_name
        );
    }

    Ok(())
}
