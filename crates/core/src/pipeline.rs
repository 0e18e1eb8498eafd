//! Inventory, classify, match and copy, in that order.

use crate::config::AppConfig;
use crate::error::{PhotoGpsError, Result};
use crate::gateway::MetadataGateway;
use crate::models::MatchResult;
use crate::timestamp::format_timestamp;
use crate::{classifier, matcher, scanner};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, Serialize)]
pub struct PropagationSummary {
    pub root: PathBuf,
    pub scanned: usize,
    pub tagged: usize,
    pub untagged: usize,
    pub matched: usize,
    pub updated: usize,
    pub failed: usize,
    pub dry_run: bool,
    pub backups_removed: bool,
    pub matches: Vec<MatchResult>,
}

/// Drives one propagation run over a directory.
///
/// Progress lines go to `out`; diagnostics go through `tracing`.
pub struct PropagationRunner<'a> {
    gateway: &'a dyn MetadataGateway,
    config: &'a AppConfig,
}

impl<'a> PropagationRunner<'a> {
    pub fn new(gateway: &'a dyn MetadataGateway, config: &'a AppConfig) -> Self {
        Self { gateway, config }
    }

    pub fn run(&self, root: &Path, out: &mut dyn Write) -> Result<PropagationSummary> {
        if !root.is_dir() {
            return Err(PhotoGpsError::InvalidPhotoPath(root.to_path_buf()));
        }
        self.gateway.probe()?;

        let dry_run = self.config.safety.dry_run;
        let mut summary = PropagationSummary {
            root: root.to_path_buf(),
            dry_run,
            ..PropagationSummary::default()
        };

        info!(root = %root.display(), recursive = self.config.scan.recursive, "starting scan phase");
        writeln!(out, "Getting photo timestamps in '{}' ...", root.display())?;
        let inventory = scanner::scan(root, &self.config.scan, self.gateway)?;
        if inventory.is_empty() {
            return Err(PhotoGpsError::NoPhotosFound(root.to_path_buf()));
        }
        summary.scanned = inventory.len();
        info!("Scan complete. Found {} photos with a creation time.", summary.scanned);

        writeln!(out, "Getting photos with GPS tags...")?;
        let partition = classifier::classify(&inventory, self.gateway)?;
        summary.tagged = partition.tagged.len();
        summary.untagged = partition.untagged.len();
        info!(
            tagged = summary.tagged,
            untagged = summary.untagged,
            "classification complete"
        );

        writeln!(out, "Adding GPS tags to the other photos...")?;
        for photo in &partition.untagged {
            let result = matcher::match_photo(&partition.tagged, photo);
            write!(
                out,
                "{} ({}) -> ",
                photo.path.display(),
                format_timestamp(photo.created)
            )?;

            match &result.matched {
                None => writeln!(out)?,
                Some(source) => {
                    writeln!(out, "{}", source.display())?;
                    summary.matched += 1;
                    if dry_run {
                        debug!(path = %photo.path.display(), "dry run, copy skipped");
                    } else {
                        match self.gateway.copy_location_tag(source, &photo.path) {
                            Ok(lines) => {
                                for line in lines {
                                    writeln!(out, "{line}")?;
                                }
                                summary.updated += 1;
                            }
                            Err(err) if err.is_fatal() => return Err(err),
                            Err(err) => {
                                warn!(
                                    source = %source.display(),
                                    target = %photo.path.display(),
                                    error = %err,
                                    "copying location tags failed"
                                );
                                writeln!(out, "Error: {err}")?;
                                summary.failed += 1;
                            }
                        }
                    }
                }
            }
            summary.matches.push(result);
        }

        if dry_run {
            writeln!(out, "{} photo(s) would be processed.", summary.matched)?;
            return Ok(summary);
        }
        writeln!(out, "{} photo(s) processed.", summary.updated)?;
        if summary.failed > 0 {
            writeln!(out, "{} photo(s) failed.", summary.failed)?;
        }

        if self.config.safety.delete_originals {
            info!("removing tool backups");
            for line in self.gateway.strip_original_backups(root)? {
                writeln!(out, "{line}")?;
            }
            summary.backups_removed = true;
        } else {
            writeln!(
                out,
                "To delete originals, use: {}",
                self.gateway.strip_command(root)
            )?;
        }

        Ok(summary)
    }
}
