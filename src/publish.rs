//! Build-time publishing of the enriched feed to a static JSON file

use std::fs;
use std::path::Path;

use crate::{error::AppResult, models::EnrichedItem};

/// Writes the feed as pretty-printed JSON, replacing any previous file
///
/// The parent directory is created when missing.
pub fn write_feed(path: &Path, items: &[EnrichedItem]) -> AppResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            fs::create_dir_all(parent)?;
            tracing::info!(dir = %parent.display(), "Created output directory");
        }
    }

    let json = serde_json::to_string_pretty(items)?;
    fs::write(path, json)?;

    tracing::info!(path = %path.display(), items = items.len(), "Wrote feed");
    Ok(())
}

/// Reads a feed previously written by [`write_feed`]
pub fn read_feed(path: &Path) -> AppResult<Vec<EnrichedItem>> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}
