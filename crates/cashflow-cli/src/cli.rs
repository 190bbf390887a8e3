//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;

use cashflow_core::TransactionFilter;

/// CashFlow - Classify and summarize business and personal cash flow
#[derive(Parser)]
#[command(name = "cashflow")]
#[command(about = "Self-hosted cash-flow bookkeeping", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "cashflow.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set CASHFLOW_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    /// Config file (defaults to ~/.local/share/cashflow/config.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Load the standard statuses, types and categories
    Seed {
        /// Delete all existing transactions and classifications first
        #[arg(long)]
        clear: bool,

        /// Only create classification rows, no sample transactions
        #[arg(long)]
        no_transactions: bool,
    },

    /// Start the web server
    Serve {
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Directory of static front-end files to serve at /
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Count, total and average of matching transactions
    Summary {
        #[command(flatten)]
        filter: FilterArgs,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// List and manage transactions
    Transactions {
        #[command(subcommand)]
        action: Option<TransactionsAction>,
    },

    /// List statuses
    Statuses {
        /// Case-insensitive search in name and description
        #[arg(short, long)]
        search: Option<String>,
    },

    /// List transaction types
    Types {
        /// Case-insensitive search in name and description
        #[arg(short, long)]
        search: Option<String>,
    },

    /// List categories
    Categories {
        /// Only categories of this transaction type id
        #[arg(short = 't', long = "type")]
        transaction_type: Option<i64>,

        /// Case-insensitive search in name and description
        #[arg(short, long)]
        search: Option<String>,
    },

    /// List subcategories
    Subcategories {
        /// Only subcategories of this category id
        #[arg(short, long)]
        category: Option<i64>,

        /// Case-insensitive search in name, description and category name
        #[arg(short, long)]
        search: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum TransactionsAction {
    /// List transactions, newest first
    List {
        #[command(flatten)]
        filter: FilterArgs,

        /// Sort field: transaction_date, amount or created (prefix '-' for descending)
        #[arg(long, allow_hyphen_values = true)]
        ordering: Option<String>,

        /// Number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: i64,

        /// Number of matching transactions to skip
        #[arg(long, default_value = "0")]
        offset: i64,
    },

    /// Show a single transaction
    Show {
        /// Transaction ID
        id: i64,
    },

    /// Record a transaction
    Add {
        /// Transaction date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,

        /// Status ID
        #[arg(long)]
        status: i64,

        /// Transaction type ID
        #[arg(long = "type")]
        transaction_type: i64,

        /// Category ID (must belong to the transaction type)
        #[arg(long)]
        category: i64,

        /// Subcategory ID (must belong to the category)
        #[arg(long)]
        subcategory: i64,

        /// Amount, at most two decimal places (e.g. 150.00)
        #[arg(long)]
        amount: Decimal,

        /// Free-text comment
        #[arg(long)]
        comment: Option<String>,
    },

    /// Delete a transaction
    Delete {
        /// Transaction ID
        id: i64,
    },
}

/// Transaction filter flags shared by `summary` and `transactions list`
#[derive(Args, Debug, Default, Clone)]
pub struct FilterArgs {
    /// Earliest transaction date, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Latest transaction date, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Status ID
    #[arg(long)]
    pub status: Option<i64>,

    /// Transaction type ID
    #[arg(long = "type")]
    pub transaction_type: Option<i64>,

    /// Category ID
    #[arg(long)]
    pub category: Option<i64>,

    /// Subcategory ID
    #[arg(long)]
    pub subcategory: Option<i64>,

    /// Minimum amount, inclusive
    #[arg(long)]
    pub min: Option<Decimal>,

    /// Maximum amount, inclusive
    #[arg(long)]
    pub max: Option<Decimal>,

    /// Case-insensitive search in comment, category and subcategory names
    #[arg(short, long)]
    pub search: Option<String>,
}

impl FilterArgs {
    pub fn to_filter(&self) -> TransactionFilter {
        TransactionFilter::new()
            .date_range(self.from, self.to)
            .status(self.status)
            .transaction_type(self.transaction_type)
            .category(self.category)
            .subcategory(self.subcategory)
            .amount_range(self.min, self.max)
            .search(self.search.as_deref())
    }
}
