// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::Manifest;
use crate::config::validate::validate;
use crate::errors::Result;

/// Load a manifest from a given path without semantic validation.
///
/// This only performs TOML deserialization; use [`load_and_validate`] for
/// the full checks (dependency references, DAG acyclicity, pool sanity).
pub fn load_from_path(path: impl AsRef<Path>) -> Result<Manifest> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let manifest: Manifest = toml::from_str(&contents)?;

    Ok(manifest)
}

/// Load a manifest from path and run validation.
///
/// This is the recommended entry point for the rest of the application:
/// the graph builder and executor may assume a well-formed, acyclic action
/// set afterwards.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Manifest> {
    let manifest = load_from_path(&path)?;
    validate(&manifest)?;
    Ok(manifest)
}

/// Helper to resolve a default manifest path.
///
/// Currently this just returns `Dagrun.toml` in the current working
/// directory; it exists so discovery (env var, parent directories) can be
/// added in one place later.
pub fn default_manifest_path() -> PathBuf {
    PathBuf::from("Dagrun.toml")
}
