//! TOML configuration parsing and validation.
//!
//! ```toml
//! [db]
//! path = "./data/search.sqlite"
//! max_connections = 5
//!
//! [search]
//! default_limit = 100
//! strip_punctuation = false
//! ```
//!
//! Only `db.path` is required. See [`load_config`] for validation rules.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_limit")]
    pub default_limit: i64,
    #[serde(default)]
    pub strip_punctuation: bool,
}

fn default_limit() -> i64 {
    100
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            strip_punctuation: false,
        }
    }
}

impl Config {
    /// A config that needs no file. The db path is unused by
    /// [`SearchDb::open_in_memory`](crate::db::SearchDb::open_in_memory).
    pub fn in_memory() -> Self {
        Self {
            db: DbConfig {
                path: PathBuf::from(":memory:"),
                max_connections: 1,
            },
            search: SearchConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;

    if config.db.max_connections == 0 {
        anyhow::bail!("db.max_connections must be >= 1");
    }

    if config.search.default_limit < 1 {
        anyhow::bail!("search.default_limit must be >= 1");
    }

    Ok(config)
}
