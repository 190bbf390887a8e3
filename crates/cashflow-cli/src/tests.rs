//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::io::Write;

use chrono::NaiveDate;
use clap::Parser;
use rust_decimal::Decimal;

use cashflow_core::db::Database;
use cashflow_core::models::NewTransaction;
use cashflow_core::{
    ClassificationFilter, ClassificationKind, TransactionFilter, TransactionQuery,
};

use crate::cli::{Cli, Commands, FilterArgs, TransactionsAction};
use crate::commands::{self, truncate};

fn setup_test_db() -> Database {
    Database::in_memory().unwrap()
}

/// Seeded database without sample transactions
fn setup_seeded_db() -> Database {
    let db = setup_test_db();
    commands::cmd_seed(&db, false, false).unwrap();
    db
}

/// A valid transaction against the seeded tree (Income → Sales → Online Sales)
fn seeded_sale(db: &Database, amount: Decimal) -> NewTransaction {
    let status = db
        .list_statuses(&ClassificationFilter::new(ClassificationKind::Status).name(Some("Business")))
        .unwrap()
        .remove(0);
    let subcategory = db
        .list_subcategories(
            &ClassificationFilter::new(ClassificationKind::Subcategory).name(Some("Online Sales")),
        )
        .unwrap()
        .remove(0);

    NewTransaction {
        transaction_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        status_id: status.id,
        transaction_type_id: subcategory.transaction_type_id,
        category_id: subcategory.category_id,
        subcategory_id: subcategory.id,
        amount,
        comment: Some("Shop order".into()),
    }
}

// ========== Seed Command Tests ==========

#[test]
fn test_cmd_seed_without_transactions() {
    let db = setup_seeded_db();

    let data = db.reference_data().unwrap();
    assert_eq!(data.statuses.len(), 5);
    assert_eq!(data.transaction_types.len(), 2);
    assert_eq!(db.count_transactions().unwrap(), 0);
}

#[test]
fn test_cmd_seed_is_idempotent() {
    let db = setup_seeded_db();
    let before = db.reference_data().unwrap();

    commands::cmd_seed(&db, false, false).unwrap();

    let after = db.reference_data().unwrap();
    assert_eq!(before.categories.len(), after.categories.len());
    assert_eq!(before.subcategories.len(), after.subcategories.len());
}

#[test]
fn test_cmd_seed_clear_removes_transactions() {
    let db = setup_seeded_db();
    db.create_transaction(&seeded_sale(&db, Decimal::new(1000, 2)))
        .unwrap();

    commands::cmd_seed(&db, true, false).unwrap();

    assert_eq!(db.count_transactions().unwrap(), 0);
    assert_eq!(db.reference_data().unwrap().statuses.len(), 5);
}

// ========== Transaction Command Tests ==========

#[test]
fn test_cmd_transactions_add_and_show() {
    let db = setup_seeded_db();
    let new = seeded_sale(&db, Decimal::new(5_000_000, 2));

    commands::cmd_transactions_add(&db, &new).unwrap();
    assert_eq!(db.count_transactions().unwrap(), 1);

    let page = db
        .list_transactions(&TransactionQuery::default(), Default::default())
        .unwrap();
    let id = page.transactions[0].id;
    assert!(commands::cmd_transactions_show(&db, id).is_ok());
}

#[test]
fn test_cmd_transactions_add_inconsistent() {
    let db = setup_seeded_db();
    let mut new = seeded_sale(&db, Decimal::new(100, 2));
    let expense = db
        .list_transaction_types(
            &ClassificationFilter::new(ClassificationKind::TransactionType).name(Some("Expense")),
        )
        .unwrap()
        .remove(0);
    new.transaction_type_id = expense.id;

    let result = commands::cmd_transactions_add(&db, &new);
    assert!(result.is_err());
    assert_eq!(db.count_transactions().unwrap(), 0);
}

#[test]
fn test_cmd_transactions_show_not_found() {
    let db = setup_test_db();
    let result = commands::cmd_transactions_show(&db, 99999);
    assert!(result.is_err());
}

#[test]
fn test_cmd_transactions_delete() {
    let db = setup_seeded_db();
    let tx = db
        .create_transaction(&seeded_sale(&db, Decimal::new(100, 2)))
        .unwrap();

    commands::cmd_transactions_delete(&db, tx.id).unwrap();
    assert!(db.get_transaction(tx.id).unwrap().is_none());

    assert!(commands::cmd_transactions_delete(&db, tx.id).is_err());
}

#[test]
fn test_cmd_transactions_list() {
    let db = setup_seeded_db();
    db.create_transaction(&seeded_sale(&db, Decimal::new(100, 2)))
        .unwrap();

    let filter = TransactionFilter::new();
    assert!(commands::cmd_transactions_list(&db, &filter, None, 20, 0).is_ok());
    assert!(commands::cmd_transactions_list(&db, &filter, Some("-amount"), 20, 0).is_ok());
}

#[test]
fn test_cmd_transactions_list_empty() {
    let db = setup_test_db();
    let result = commands::cmd_transactions_list(&db, &TransactionFilter::new(), None, 20, 0);
    assert!(result.is_ok());
}

#[test]
fn test_cmd_transactions_list_bad_ordering() {
    let db = setup_test_db();
    let result =
        commands::cmd_transactions_list(&db, &TransactionFilter::new(), Some("comment"), 20, 0);
    assert!(result.is_err());
}

#[test]
fn test_cmd_transactions_list_rejects_bad_paging() {
    let db = setup_seeded_db();
    let filter = TransactionFilter::new();

    assert!(commands::cmd_transactions_list(&db, &filter, None, 0, 0).is_err());
    assert!(commands::cmd_transactions_list(&db, &filter, None, -3, 0).is_err());
    assert!(commands::cmd_transactions_list(&db, &filter, None, 20, -1).is_err());
}

#[test]
fn test_amount_display_ignores_type_name() {
    let db = setup_seeded_db();
    let tx = db
        .create_transaction(&seeded_sale(&db, Decimal::new(12_345, 2)))
        .unwrap();

    let mut renamed = tx.clone();
    renamed.transaction_type_name = "Revenue".into();

    assert_eq!(commands::transactions::format_amount(&tx), "$123.45");
    assert_eq!(
        commands::transactions::format_amount(&renamed),
        commands::transactions::format_amount(&tx)
    );
}

// ========== Classification Command Tests ==========

#[test]
fn test_cmd_classification_listings() {
    let db = setup_seeded_db();

    assert!(commands::cmd_statuses(&db, None).is_ok());
    assert!(commands::cmd_types(&db, Some("inc")).is_ok());
    assert!(commands::cmd_categories(&db, None, None).is_ok());
    assert!(commands::cmd_subcategories(&db, None, Some("online")).is_ok());
}

#[test]
fn test_cmd_classification_listings_empty() {
    let db = setup_test_db();

    assert!(commands::cmd_statuses(&db, None).is_ok());
    assert!(commands::cmd_types(&db, None).is_ok());
    assert!(commands::cmd_categories(&db, Some(1), None).is_ok());
    assert!(commands::cmd_subcategories(&db, Some(1), None).is_ok());
}

// ========== Summary Command Tests ==========

#[test]
fn test_cmd_summary() {
    let db = setup_seeded_db();
    let new = seeded_sale(&db, Decimal::new(10_000, 2));
    db.create_transaction(&new).unwrap();

    let filter = TransactionFilter::new().category(Some(new.category_id));
    assert!(commands::cmd_summary(&db, &filter, false).is_ok());
    assert!(commands::cmd_summary(&db, &filter, true).is_ok());
}

#[test]
fn test_cmd_summary_no_matches() {
    let db = setup_test_db();
    assert!(commands::cmd_summary(&db, &TransactionFilter::new(), false).is_ok());
}

// ========== Argument Parsing Tests ==========

#[test]
fn test_filter_args_to_filter() {
    let args = FilterArgs {
        from: NaiveDate::from_ymd_opt(2024, 1, 1),
        category: Some(3),
        min: Some(Decimal::new(10, 0)),
        search: Some("rent".into()),
        ..Default::default()
    };

    let filter = args.to_filter();
    assert_eq!(filter.date_from, NaiveDate::from_ymd_opt(2024, 1, 1));
    assert_eq!(filter.date_to, None);
    assert_eq!(filter.category, Some(3));
    assert_eq!(filter.amount_min, Some(Decimal::new(10, 0)));
    assert_eq!(filter.search.as_deref(), Some("rent"));
}

#[test]
fn test_parse_summary_args() {
    let cli = Cli::try_parse_from([
        "cashflow",
        "--no-encrypt",
        "summary",
        "--type",
        "1",
        "--from",
        "2024-01-01",
        "--min",
        "12.50",
        "--json",
    ])
    .unwrap();

    assert!(cli.no_encrypt);
    match cli.command {
        Commands::Summary { filter, json } => {
            assert!(json);
            assert_eq!(filter.transaction_type, Some(1));
            assert_eq!(filter.min, Some(Decimal::new(1250, 2)));
        }
        _ => panic!("expected summary command"),
    }
}

#[test]
fn test_parse_transactions_list_descending_ordering() {
    let cli = Cli::try_parse_from([
        "cashflow",
        "transactions",
        "list",
        "--ordering",
        "-amount",
        "--limit",
        "5",
    ])
    .unwrap();

    match cli.command {
        Commands::Transactions {
            action: Some(TransactionsAction::List {
                ordering, limit, ..
            }),
        } => {
            assert_eq!(ordering.as_deref(), Some("-amount"));
            assert_eq!(limit, 5);
        }
        _ => panic!("expected transactions list command"),
    }
}

#[test]
fn test_parse_rejects_bad_date() {
    let result = Cli::try_parse_from(["cashflow", "summary", "--from", "15/01/2024"]);
    assert!(result.is_err());
}

// ========== Config Tests ==========

#[test]
fn test_load_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[server]\nport = 9000\n\n[pagination]\ndefault_limit = 25").unwrap();

    let config = commands::load_config(Some(file.path())).unwrap();
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.pagination.default_limit, 25);
}

#[test]
fn test_load_config_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = commands::load_config(Some(&dir.path().join("missing.toml")));
    assert!(result.is_err());
}

#[test]
fn test_open_db_unencrypted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cli.db");

    commands::cmd_init(&path, true).unwrap();
    assert!(path.exists());

    let db = commands::open_db(&path, true).unwrap();
    assert!(db.reference_data().unwrap().statuses.is_empty());
}

// ========== Utility Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("a long comment here", 10), "a long ...");
    assert_eq!(truncate("café crème brûlée", 8), "café ...");
}
