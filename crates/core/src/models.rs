use serde::Serialize;
use std::path::PathBuf;

/// A file with a known creation time, in epoch seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoRecord {
    pub path: PathBuf,
    pub created: i64,
}

impl PhotoRecord {
    pub fn new(path: impl Into<PathBuf>, created: i64) -> Self {
        Self {
            path: path.into(),
            created,
        }
    }
}

/// Photos ordered by ascending creation time; equal times keep encounter order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    records: Vec<PhotoRecord>,
}

impl Inventory {
    /// Builds an inventory from records in encounter order.
    ///
    /// Later duplicates of an already seen path are dropped so paths stay unique.
    pub fn from_records(records: Vec<PhotoRecord>) -> Self {
        let mut seen = std::collections::HashSet::new();
        let mut records: Vec<PhotoRecord> = records
            .into_iter()
            .filter(|r| seen.insert(r.path.clone()))
            .collect();
        records.sort_by_key(|r| r.created);
        Self { records }
    }

    pub fn records(&self) -> &[PhotoRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PhotoRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a Inventory {
    type Item = &'a PhotoRecord;
    type IntoIter = std::slice::Iter<'a, PhotoRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Disjoint split of an inventory by presence of location tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub tagged: Vec<PhotoRecord>,
    pub untagged: Vec<PhotoRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub untagged: PathBuf,
    pub matched: Option<PathBuf>,
    pub delta: Option<u64>,
}
