//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `load_config` - Resolve the configuration file
//! - `cmd_init` - Initialize the database
//! - `cmd_seed` - Load standard classifications and sample transactions

use std::path::Path;

use anyhow::{Context, Result};
use cashflow_core::{db::Database, Config, SeedOptions};

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path must be valid UTF-8")?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

/// Load config from an explicit path, the default override, or embedded defaults
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    Config::load(path).context("Failed to load configuration")
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let db = open_db(db_path, no_encrypt)?;
    let data = db.reference_data().context("Failed to read database")?;

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }
    println!(
        "   {} statuses, {} transaction types, {} categories, {} subcategories",
        data.statuses.len(),
        data.transaction_types.len(),
        data.categories.len(),
        data.subcategories.len()
    );

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Load standard categories: cashflow seed");
    println!("  2. Start web UI: cashflow serve");

    Ok(())
}

pub fn cmd_seed(db: &Database, clear: bool, sample_transactions: bool) -> Result<()> {
    if clear {
        println!("🗑️  Clearing existing data...");
    }
    println!("🌱 Seeding classifications...");

    let options = SeedOptions {
        clear,
        sample_transactions,
        ..Default::default()
    };
    let report = db.seed(&options).context("Failed to seed database")?;

    if clear {
        println!(
            "   Removed {} existing transactions",
            report.cleared_transactions
        );
    }
    println!("   Statuses created: {}", report.statuses);
    println!("   Transaction types created: {}", report.transaction_types);
    println!("   Categories created: {}", report.categories);
    println!("   Subcategories created: {}", report.subcategories);
    if sample_transactions {
        println!("   Sample transactions created: {}", report.transactions);
    }

    println!("✅ Seeding complete");

    Ok(())
}
