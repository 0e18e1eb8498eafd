//! Nearest-in-time lookup among tagged photos.

use crate::models::{MatchResult, PhotoRecord};

/// Returns the tagged photo whose creation time is closest to `target`.
///
/// Scans in slice order and only replaces the running best on a strictly
/// smaller difference, so the first photo at the minimal distance wins.
/// `None` only when `tagged` is empty.
pub fn find_closest(tagged: &[PhotoRecord], target: i64) -> Option<&PhotoRecord> {
    let mut best: Option<(&PhotoRecord, u64)> = None;
    for record in tagged {
        let diff = target.abs_diff(record.created);
        match best {
            Some((_, min)) if diff >= min => {}
            _ => best = Some((record, diff)),
        }
    }
    best.map(|(record, _)| record)
}

pub fn match_photo(tagged: &[PhotoRecord], photo: &PhotoRecord) -> MatchResult {
    let closest = find_closest(tagged, photo.created);
    MatchResult {
        untagged: photo.path.clone(),
        matched: closest.map(|r| r.path.clone()),
        delta: closest.map(|r| photo.created.abs_diff(r.created)),
    }
}
