//! Shared helpers for integration tests.

#![allow(dead_code)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};

/// The catalog shipped with the crate.
pub fn bundled_catalog_json() -> serde_json::Value {
    let raw = include_str!("../../data/catalog.json");
    serde_json::from_str(raw).unwrap()
}

/// Write a copy of the bundled catalog with `edit` applied into `dir`.
pub fn write_catalog(dir: &Path, edit: impl FnOnce(&mut serde_json::Value)) -> PathBuf {
    let mut catalog = bundled_catalog_json();
    edit(&mut catalog);
    let path = dir.join("catalog.json");
    std::fs::write(&path, serde_json::to_string_pretty(&catalog).unwrap()).unwrap();
    path
}

/// Mutable handle to an item in a catalog JSON document.
pub fn item_mut<'a>(catalog: &'a mut serde_json::Value, id: &str) -> &'a mut serde_json::Value {
    catalog["items"]
        .as_array_mut()
        .unwrap()
        .iter_mut()
        .find(|i| i["id"] == id)
        .unwrap()
}

/// The binary, run inside `dir` with no inherited cropwise settings.
#[allow(deprecated)]
pub fn cropwise_in(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("cropwise").unwrap();
    cmd.current_dir(dir)
        .env_remove("CROPWISE_CATALOG")
        .env_remove("CROPWISE_RECORD")
        .env_remove("CROPWISE_CONFIG")
        .env_remove("LOG_FORMAT")
        .env("RUST_LOG", "warn");
    cmd
}
