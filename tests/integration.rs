//! End-to-end runs of the `shelf` binary against a throwaway workspace.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

const ITEMS: &str = r#"[
  {"id": "i1", "accountId": "a", "scopeId": "p1", "name": "Brass Floor Lamp", "sku": "BFL-001", "updatedAtMs": 1700000000000},
  {"id": "i2", "accountId": "a", "scopeId": "p1", "name": "Oak Coffee Table", "vendor": "Acme", "updatedAtMs": 1700000005000},
  {"id": "i3", "accountId": "a", "scopeId": "p1", "name": "Velvet Sofa", "notes": "brass feet", "updatedAtMs": 1700000009000}
]"#;

const SNAPSHOT: &str = r#"[
  {"id": "i2", "accountId": "a", "scopeId": "p1", "name": "Oak Coffee Table"}
]"#;

/// A temp directory holding `shelf.toml`, `items.json`, and `snapshot.json`.
/// The database lives at `<root>/data/search.sqlite`.
struct Workspace {
    tmp: TempDir,
    config: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();

        fs::write(root.join("items.json"), ITEMS).unwrap();
        fs::write(root.join("snapshot.json"), SNAPSHOT).unwrap();

        let config = root.join("shelf.toml");
        fs::write(
            &config,
            format!(
                "[db]\npath = \"{}\"\n\n[search]\ndefault_limit = 50\n",
                root.join("data/search.sqlite").display()
            ),
        )
        .unwrap();

        Self { tmp, config }
    }

    fn path(&self, name: &str) -> String {
        self.tmp.path().join(name).display().to_string()
    }

    fn shelf(&self, args: &[&str]) -> Output {
        shelf(&self.config, args)
    }
}

struct Output {
    stdout: String,
    stderr: String,
    success: bool,
}

fn shelf(config: &Path, args: &[&str]) -> Output {
    let output = Command::new(env!("CARGO_BIN_EXE_shelf"))
        .arg("--config")
        .arg(config)
        .args(args)
        .output()
        .expect("failed to launch shelf");

    Output {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        success: output.status.success(),
    }
}

#[test]
fn test_init_creates_database_and_is_idempotent() {
    let ws = Workspace::new();

    let out = ws.shelf(&["init"]);
    assert!(out.success, "init failed: {}", out.stderr);
    assert!(out.stdout.contains("Search index initialized."));
    assert!(ws.tmp.path().join("data/search.sqlite").exists());

    assert!(ws.shelf(&["init"]).success);
}

#[test]
fn test_index_and_search() {
    let ws = Workspace::new();

    let out = ws.shelf(&["index", &ws.path("items.json")]);
    assert!(out.success, "index failed: {}", out.stderr);
    assert!(out.stdout.contains("indexed: 3"));

    let out = ws.shelf(&["search", "a", "p1", "brass"]);
    assert!(out.success);
    // most recently updated first, one `item_id  updated_at` line each
    assert_eq!(
        out.stdout.lines().collect::<Vec<_>>(),
        vec!["i3  2023-11-14T22:13:29Z", "i1  2023-11-14T22:13:20Z"]
    );
}

#[test]
fn test_reindex_keeps_one_row_per_item() {
    let ws = Workspace::new();
    let items = ws.path("items.json");

    ws.shelf(&["index", &items]);
    ws.shelf(&["index", &items]);

    let out = ws.shelf(&["ids", "a", "p1"]);
    assert_eq!(out.stdout.lines().collect::<Vec<_>>(), vec!["i1", "i2", "i3"]);
}

#[test]
fn test_search_by_sku() {
    let ws = Workspace::new();
    ws.shelf(&["index", &ws.path("items.json")]);

    let out = ws.shelf(&["search", "a", "p1", "BFL-001"]);
    assert!(out.success);
    assert!(out.stdout.starts_with("i1  "), "got: {}", out.stdout);
}

#[test]
fn test_search_without_hits() {
    let ws = Workspace::new();
    ws.shelf(&["index", &ws.path("items.json")]);

    let blank = ws.shelf(&["search", "a", "p1", ""]);
    assert!(blank.success);
    assert_eq!(blank.stdout.trim(), "No results.");

    let other_scope = ws.shelf(&["search", "a", "p2", "brass"]);
    assert!(other_scope.success);
    assert_eq!(other_scope.stdout.trim(), "No results.");
}

#[test]
fn test_search_limit() {
    let ws = Workspace::new();
    ws.shelf(&["index", &ws.path("items.json")]);

    let out = ws.shelf(&["search", "a", "p1", "brass", "--limit", "1"]);
    assert!(out.success);
    assert_eq!(out.stdout.lines().count(), 1);
}

#[test]
fn test_remove_item_and_scope() {
    let ws = Workspace::new();
    ws.shelf(&["index", &ws.path("items.json")]);

    let out = ws.shelf(&["remove", "a", "p1", "i1"]);
    assert!(out.success);
    assert!(out.stdout.contains("removed: i1"));

    let out = ws.shelf(&["remove", "a", "p1", "i1"]);
    assert!(out.stdout.contains("not indexed: i1"));

    let out = ws.shelf(&["remove", "a", "p1"]);
    assert!(out.success);
    assert!(out.stdout.contains("removed 2 items from a/p1"));

    assert!(ws.shelf(&["ids", "a", "p1"]).stdout.trim().is_empty());
}

#[test]
fn test_rebuild_replaces_scope() {
    let ws = Workspace::new();
    ws.shelf(&["index", &ws.path("items.json")]);

    let out = ws.shelf(&["rebuild", "a", "p1", &ws.path("snapshot.json")]);
    assert!(out.success, "rebuild failed: {}", out.stderr);
    assert!(out.stdout.contains("rebuilt: 1 items"));

    assert_eq!(ws.shelf(&["ids", "a", "p1"]).stdout.trim(), "i2");
}

#[test]
fn test_rebuild_if_needed_runs_once() {
    let ws = Workspace::new();
    let items = ws.path("items.json");

    let out = ws.shelf(&["rebuild", "a", "p1", &items, "--if-needed"]);
    assert!(out.success);
    assert!(out.stdout.contains("rebuilt: 3 items"));

    let out = ws.shelf(&["rebuild", "a", "p1", &items, "--if-needed"]);
    assert!(out.success);
    assert!(out.stdout.contains("up to date"));
}

#[test]
fn test_check() {
    let ws = Workspace::new();
    ws.shelf(&["init"]);

    let out = ws.shelf(&["check", "a", "p1"]);
    assert!(out.success);
    assert!(out.stdout.contains("tables: ok"));
    assert!(out.stdout.contains("a/p1: rebuild required"));

    let out = ws.shelf(&["check", "a"]);
    assert!(!out.success);
    assert!(out.stderr.contains("both"));
}

#[test]
fn test_stats_and_reset() {
    let ws = Workspace::new();
    ws.shelf(&["rebuild", "a", "p1", &ws.path("items.json")]);

    let out = ws.shelf(&["stats"]);
    assert!(out.success);
    assert!(out.stdout.contains("a/p1  items: 3"));
    assert!(out.stdout.contains("v1 rebuilt"));

    let out = ws.shelf(&["reset"]);
    assert!(out.success);
    assert!(out.stdout.contains("Search index reset."));

    assert!(ws.shelf(&["stats"]).stdout.contains("No indexed scopes."));
}

#[test]
fn test_missing_config() {
    let tmp = TempDir::new().unwrap();
    let out = shelf(&tmp.path().join("nope.toml"), &["init"]);
    assert!(!out.success);
    assert!(out.stderr.contains("Failed to read config file"));
}

#[test]
fn test_bad_items_file() {
    let ws = Workspace::new();
    fs::write(ws.tmp.path().join("bad.json"), "{ not json").unwrap();

    let out = ws.shelf(&["index", &ws.path("bad.json")]);
    assert!(!out.success);
    assert!(out.stderr.contains("Failed to parse items file"));
}
