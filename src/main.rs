//! # Shelf Index CLI (`shelf`)
//!
//! Maintenance and inspection tool for the on-device search index.
//!
//! ## Usage
//!
//! ```bash
//! shelf --config ./config/shelf.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `shelf init` | Create the database file and schema |
//! | `shelf index <items.json>` | Upsert a JSON array of items |
//! | `shelf remove <account> <scope> [item]` | Remove one item, or a whole scope |
//! | `shelf search <account> <scope> "<query>"` | Search a scope |
//! | `shelf ids <account> <scope>` | List every indexed item id in a scope |
//! | `shelf rebuild <account> <scope> <items.json>` | Replace a scope from a snapshot |
//! | `shelf check [account scope]` | Report table health and staleness |
//! | `shelf stats` | Per-scope item counts and rebuild state |
//! | `shelf reset` | Drop and recreate the whole schema |
//!
//! Log verbosity follows `RUST_LOG` (default `shelf_index=info`); logs go to
//! stderr.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shelf_index::{cli, config};

/// Shelf Index: an offline full-text index for inventory and project records.
#[derive(Parser)]
#[command(
    name = "shelf",
    about = "Shelf Index: an offline full-text index for inventory and project records",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/shelf.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Idempotent; running it multiple times is safe.
    Init,

    /// Index every item in a JSON array file.
    Index {
        /// Path to a JSON array of items (camelCase keys).
        items: PathBuf,
    },

    /// Remove one item, or every item in a scope when no item id is given.
    Remove {
        account: String,
        scope: String,
        item: Option<String>,
    },

    /// Search a scope. Any query token may match.
    Search {
        account: String,
        scope: String,
        query: String,

        /// Maximum number of results. Defaults to `search.default_limit`.
        #[arg(long)]
        limit: Option<i64>,
    },

    /// List every indexed item id in a scope.
    Ids { account: String, scope: String },

    /// Replace a scope's index from a full snapshot.
    Rebuild {
        account: String,
        scope: String,
        /// Path to a JSON array holding the scope's complete item list.
        items: PathBuf,

        /// Only rebuild when the scope is missing, stale, or corrupted.
        #[arg(long)]
        if_needed: bool,
    },

    /// Report table health, and a scope's rebuild verdict when given.
    Check {
        account: Option<String>,
        scope: Option<String>,
    },

    /// Show per-scope statistics.
    Stats,

    /// Drop and recreate the whole index. Every scope must be rebuilt after.
    Reset,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shelf_index=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Cli::parse();
    let cfg = config::load_config(&args.config)?;

    match args.command {
        Commands::Init => {
            cli::run_init(&cfg).await?;
        }
        Commands::Index { items } => {
            cli::run_index(&cfg, &items).await?;
        }
        Commands::Remove {
            account,
            scope,
            item,
        } => {
            cli::run_remove(&cfg, &account, &scope, item.as_deref()).await?;
        }
        Commands::Search {
            account,
            scope,
            query,
            limit,
        } => {
            cli::run_search(&cfg, &account, &scope, &query, limit).await?;
        }
        Commands::Ids { account, scope } => {
            cli::run_ids(&cfg, &account, &scope).await?;
        }
        Commands::Rebuild {
            account,
            scope,
            items,
            if_needed,
        } => {
            cli::run_rebuild(&cfg, &account, &scope, &items, if_needed).await?;
        }
        Commands::Check { account, scope } => {
            let target = match (&account, &scope) {
                (Some(a), Some(s)) => Some((a.as_str(), s.as_str())),
                (None, None) => None,
                _ => anyhow::bail!("check takes both <account> and <scope>, or neither"),
            };
            cli::run_check(&cfg, target).await?;
        }
        Commands::Stats => {
            cli::run_stats(&cfg).await?;
        }
        Commands::Reset => {
            cli::run_reset(&cfg).await?;
        }
    }

    Ok(())
}
