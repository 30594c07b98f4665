//! Initial directory scan.
//!
//! Lists the watched directory once (no recursion) and produces a synthetic
//! `Created` event for every eligible file already present.

use melodex_common::paths::classify;
use std::path::Path;
use tracing::{info, warn};
use walkdir::WalkDir;

use super::events::CatalogEvent;

/// Produce `Created` events for the eligible files directly inside `root`.
///
/// A directory that cannot be listed yields no events; the failure is
/// logged and is not fatal.
pub fn initial_scan(root: &Path) -> Vec<CatalogEvent> {
    let mut events = Vec::new();
    let mut listed = 0usize;

    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                warn!(dir = %root.display(), error = %e, "Failed to list music directory");
                return Vec::new();
            }
            Err(e) => {
                warn!(dir = %root.display(), error = %e, "Skipping unreadable directory entry");
                continue;
            }
        };

        listed += 1;
        if !entry.file_type().is_file() {
            continue;
        }

        if classify(entry.path()).eligible {
            events.push(CatalogEvent::created(entry.into_path()));
        }
    }

    info!(
        dir = %root.display(),
        listed,
        eligible = events.len(),
        "Scanned existing music files"
    );
    events
}
