//! # Shelf Index
//!
//! **A rebuildable, on-device full-text index for inventory and project records.**
//!
//! Shelf Index mirrors the searchable fields of records held in a remote
//! canonical store into a local SQLite FTS5 index, so keyword and SKU lookups
//! answer instantly and offline. The index is never authoritative: losing it
//! is always safe, and any scope can be regenerated from a snapshot.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌─────────────┐   ┌───────────────────┐
//! │ SearchIndex  │──▶│  Indexer    │──▶│ search_items      │
//! │  (facade)    │   │  Rebuild    │   │   ─triggers─▶ FTS5│
//! └──────┬───────┘   └─────────────┘   │ index_state       │
//!        │                             └─────────┬─────────┘
//!        └──────────▶ Query engine ◀─────────────┘
//! ```
//!
//! ## Data Flow
//!
//! 1. Calling code builds a [`SearchableItem`] after every create or update
//!    of a record and hands it to [`SearchIndex::index`].
//! 2. A [`TextExtractor`] picks the searchable fields; [`normalize`] turns
//!    them into lowercase, whitespace-collapsed text.
//! 3. The text is upserted into `search_items`; triggers mirror it into the
//!    FTS5 shadow table.
//! 4. [`search::search`] ORs the query tokens, ranks by BM25 within the
//!    (account, scope) partition, and returns identifiers only.
//! 5. On cold start, [`rebuild::rebuild_if_needed`] compares the stored
//!    [`rebuild::INDEX_VERSION`] and table health, and replaces the scope from
//!    a fresh snapshot when stale.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`models`] | Core data types: `SearchableItem`, `IndexedRecord`, `IndexState`, `SearchResult` |
//! | [`normalize`] | Text normalization and field combination |
//! | [`extract`] | `TextExtractor` trait and the default field policy |
//! | [`db`] | SQLite handle, schema creation, health check, reset |
//! | [`indexer`] | Upsert and removal of items and scopes |
//! | [`search`] | OR-token keyword search and id listing |
//! | [`rebuild`] | Staleness verdicts and atomic scope rebuilds |
//! | [`stats`] | Per-scope item counts and state |
//! | [`index`] | `SearchIndex` facade |
//! | [`cli`] | Command implementations for the `shelf` binary |

pub mod cli;
pub mod config;
pub mod db;
pub mod extract;
pub mod index;
pub mod indexer;
pub mod models;
pub mod normalize;
pub mod rebuild;
pub mod search;
pub mod stats;

pub use db::{SearchDb, TableHealth};
pub use extract::{DefaultExtractor, TextExtractor};
pub use index::SearchIndex;
pub use models::{IndexState, IndexedRecord, ScopeStats, SearchResult, SearchableItem};
pub use normalize::{combine_fields, normalize};
