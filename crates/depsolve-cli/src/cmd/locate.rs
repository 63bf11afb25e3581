//! Locate command

use anyhow::{Context, Result};
use depsolve_core::locate;
use std::path::Path;

/// Print the raw metadata object stored under `key` in `index`.
pub fn locate_package(index: &Path, key: &str) -> Result<()> {
    let text = std::fs::read_to_string(index)
        .with_context(|| format!("Failed to read {}", index.display()))?;
    let metadata =
        locate(&text, key).with_context(|| format!("No metadata for '{key}' in {}", index.display()))?;
    println!("{metadata}");
    Ok(())
}
