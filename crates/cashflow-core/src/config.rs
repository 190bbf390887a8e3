//! Configuration file support
//!
//! Config is loaded with a two-layer resolution:
//! 1. An explicit path, or the override in the data dir
//!    (~/.local/share/cashflow/config.toml)
//! 2. Embedded defaults (compiled into binary)
//!
//! Missing keys in an override file keep their default values.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/cashflow.toml");

/// Web server settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub static_dir: Option<PathBuf>,
    pub allowed_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            static_dir: None,
            allowed_origins: vec![],
        }
    }
}

/// Listing page sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationSettings {
    pub default_limit: i64,
    pub max_limit: i64,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            default_limit: 50,
            max_limit: 1000,
        }
    }
}

impl PaginationSettings {
    /// Resolve a requested page size: default when absent, clamped to the maximum
    pub fn resolve_limit(&self, requested: Option<i64>) -> i64 {
        requested.unwrap_or(self.default_limit).min(self.max_limit)
    }
}

/// Full application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub server: ServerSettings,
    pub pagination: PaginationSettings,
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("cashflow").join("config.toml"))
}

impl Config {
    /// Load configuration (explicit path, then default override, then embedded)
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// override silently falls back to the embedded config.
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let content = match override_path {
            Some(path) => fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("Failed to read {}: {}", path.display(), e))
            })?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => fs::read_to_string(&path).map_err(|e| {
                    Error::Config(format!("Failed to read {}: {}", path.display(), e))
                })?,
                None => DEFAULT_CONFIG.to_string(),
            },
        };

        Self::parse(&content)
    }

    /// Parse config from TOML content on top of the defaults
    pub fn parse(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

        let mut config = Config::default();

        if let Some(server) = raw.server {
            if let Some(host) = server.host {
                config.server.host = host;
            }
            if let Some(port) = server.port {
                config.server.port = port;
            }
            if let Some(dir) = server.static_dir {
                config.server.static_dir = Some(dir);
            }
            if let Some(origins) = server.allowed_origins {
                config.server.allowed_origins = origins;
            }
        }

        if let Some(pagination) = raw.pagination {
            if let Some(limit) = pagination.default_limit {
                config.pagination.default_limit = limit;
            }
            if let Some(max) = pagination.max_limit {
                config.pagination.max_limit = max;
            }
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let p = &self.pagination;
        if p.max_limit < 1 {
            return Err(Error::Config("pagination.max_limit must be at least 1".into()));
        }
        if p.default_limit < 1 || p.default_limit > p.max_limit {
            return Err(Error::Config(format!(
                "pagination.default_limit must be between 1 and {}",
                p.max_limit
            )));
        }
        Ok(())
    }
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    server: Option<RawServer>,
    pagination: Option<RawPagination>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawServer {
    host: Option<String>,
    port: Option<u16>,
    static_dir: Option<PathBuf>,
    allowed_origins: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPagination {
    default_limit: Option<i64>,
    max_limit: Option<i64>,
}
