//! Walks a photo directory and builds the time-ordered inventory.

use crate::config::ScanConfig;
use crate::error::{PhotoGpsError, Result};
use crate::gateway::MetadataGateway;
use crate::models::{Inventory, PhotoRecord};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Collects every file under `root` with a readable creation time.
///
/// Subdirectories are only entered when `options.recursive` is set, and then
/// at every depth. Files without a creation time are left out silently.
pub fn scan(
    root: &Path,
    options: &ScanConfig,
    gateway: &dyn MetadataGateway,
) -> Result<Inventory> {
    if !root.is_dir() {
        return Err(PhotoGpsError::InvalidPhotoPath(root.to_path_buf()));
    }
    let exclude_set = build_globset(&options.exclude)?;
    let max_depth = if options.recursive { usize::MAX } else { 1 };

    let mut records = Vec::new();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0 || should_descend(e.path(), options.include_hidden, &exclude_set)
        })
    {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                warn!(error = %err, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        match gateway.read_creation_time(path) {
            Ok(Some(created)) => records.push(PhotoRecord::new(path, created)),
            Ok(None) => debug!(path = %path.display(), "no creation time"),
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => warn!(path = %path.display(), error = %err, "could not read creation time"),
        }
    }

    Ok(Inventory::from_records(records))
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        builder.add(Glob::new(pat)?);
    }
    Ok(builder.build()?)
}

fn should_descend(path: &Path, include_hidden: bool, excludes: &GlobSet) -> bool {
    if is_excluded(path, excludes) {
        return false;
    }
    if !include_hidden && is_hidden(path) {
        return false;
    }
    true
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

fn is_excluded(path: &Path, excludes: &GlobSet) -> bool {
    path.file_name()
        .map(|name| excludes.is_match(Path::new(name)))
        .unwrap_or(false)
}
