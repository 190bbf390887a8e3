//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};
use cashflow_core::{PaginationSettings, ServerSettings};

use super::open_db;

pub async fn cmd_serve(
    db_path: &Path,
    no_encrypt: bool,
    settings: &ServerSettings,
    pagination: PaginationSettings,
) -> Result<()> {
    println!("🚀 Starting CashFlow web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", settings.host, settings.port);
    if let Some(dir) = &settings.static_dir {
        println!("   Static files: {}", dir.display());
    }
    if !settings.allowed_origins.is_empty() {
        println!(
            "   CORS origins: {}",
            settings.allowed_origins.join(", ")
        );
    }
    if no_encrypt {
        println!("   ⚠️  Encryption DISABLED (--no-encrypt)");
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path, no_encrypt)?;

    let config = cashflow_server::ServerConfig::from_settings(settings, pagination);

    let static_dir = match &settings.static_dir {
        Some(dir) => Some(
            dir.to_str()
                .context("static_dir path must be valid UTF-8")?,
        ),
        None => None,
    };
    cashflow_server::serve_with_config(db, &settings.host, settings.port, static_dir, config)
        .await?;

    Ok(())
}
