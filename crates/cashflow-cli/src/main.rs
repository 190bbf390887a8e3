//! CashFlow CLI - Cash-flow bookkeeping
//!
//! Usage:
//!   cashflow init                      Initialize database
//!   cashflow seed                      Load standard classifications and samples
//!   cashflow transactions list         List recent transactions
//!   cashflow summary --category 3      Totals for a filtered set
//!   cashflow serve --port 3000         Start web server

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::load_config(cli.config.as_deref())?;
    tracing::debug!(
        db = %cli.db.display(),
        pagination_max = config.pagination.max_limit,
        "Configuration loaded"
    );

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Seed {
            clear,
            no_transactions,
        } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_seed(&db, clear, !no_transactions)
        }
        Commands::Serve {
            port,
            host,
            static_dir,
        } => {
            let mut settings = config.server.clone();
            if let Some(port) = port {
                settings.port = port;
            }
            if let Some(host) = host {
                settings.host = host;
            }
            if static_dir.is_some() {
                settings.static_dir = static_dir;
            }
            commands::cmd_serve(&cli.db, cli.no_encrypt, &settings, config.pagination).await
        }
        Commands::Summary { filter, json } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_summary(&db, &filter.to_filter(), json)
        }
        Commands::Transactions { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None => commands::cmd_transactions_list(
                    &db,
                    &FilterArgs::default().to_filter(),
                    None,
                    20,
                    0,
                ),
                Some(TransactionsAction::List {
                    filter,
                    ordering,
                    limit,
                    offset,
                }) => commands::cmd_transactions_list(
                    &db,
                    &filter.to_filter(),
                    ordering.as_deref(),
                    limit,
                    offset,
                ),
                Some(TransactionsAction::Show { id }) => commands::cmd_transactions_show(&db, id),
                Some(TransactionsAction::Add {
                    date,
                    status,
                    transaction_type,
                    category,
                    subcategory,
                    amount,
                    comment,
                }) => commands::cmd_transactions_add(
                    &db,
                    &cashflow_core::models::NewTransaction {
                        transaction_date: date,
                        status_id: status,
                        transaction_type_id: transaction_type,
                        category_id: category,
                        subcategory_id: subcategory,
                        amount,
                        comment,
                    },
                ),
                Some(TransactionsAction::Delete { id }) => {
                    commands::cmd_transactions_delete(&db, id)
                }
            }
        }
        Commands::Statuses { search } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_statuses(&db, search.as_deref())
        }
        Commands::Types { search } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_types(&db, search.as_deref())
        }
        Commands::Categories {
            transaction_type,
            search,
        } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_categories(&db, transaction_type, search.as_deref())
        }
        Commands::Subcategories { category, search } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_subcategories(&db, category, search.as_deref())
        }
    }
}
