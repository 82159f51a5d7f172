// s3-restore/src/restore/types.rs
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionKind {
    Object,
    DeleteMarker,
}

/// One entry of a version listing: either a stored object version or a delete marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRecord {
    pub key: String,
    pub version_id: String,
    pub is_latest: bool,
    pub last_modified: DateTime<Utc>,
    pub kind: VersionKind,
}

/// A version chosen for restoration.
///
/// For copy restores `version_id` is the historical object version to copy back;
/// for marker removal it is the delete marker's own version id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestorableEntry {
    pub key: String,
    pub version_id: String,
    pub last_modified: DateTime<Utc>,
}

impl From<&VersionRecord> for RestorableEntry {
    fn from(record: &VersionRecord) -> Self {
        RestorableEntry {
            key: record.key.clone(),
            version_id: record.version_id.clone(),
            last_modified: record.last_modified,
        }
    }
}

/// Historical object versions and live delete markers under a bucket/prefix.
#[derive(Debug, Clone, Default)]
pub struct VersionListing {
    /// Object versions that are not the current head of their key.
    pub versions: Vec<VersionRecord>,
    /// Delete markers that are the current head of their key.
    pub delete_markers: Vec<VersionRecord>,
}

/// Entries to restore, ordered and unique by object key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestorePlan {
    entries: BTreeMap<String, RestorableEntry>,
}

impl RestorePlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry; returns false and leaves the plan untouched if the key is already planned.
    pub fn insert(&mut self, entry: RestorableEntry) -> bool {
        if self.entries.contains_key(&entry.key) {
            return false;
        }
        self.entries.insert(entry.key.clone(), entry);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RestorableEntry> {
        self.entries.values()
    }
}
