// s3-restore/src/storage/memory.rs
//! In-memory versioned bucket used by the restore tests.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use std::sync::Mutex;

use super::{CopyRequest, PageMarker, VersionPage, VersionStore};
use crate::errors::{AppError, Result};
use crate::restore::types::{VersionKind, VersionRecord};

#[derive(Default)]
struct State {
    records: Vec<(String, VersionRecord)>,
    generated: u64,
    list_calls: usize,
    copies: Vec<CopyRequest>,
    deletes: Vec<(String, String, String)>,
    failing_keys: HashSet<String>,
    listing_error: Option<String>,
}

pub struct MemoryVersionStore {
    page_size: usize,
    state: Mutex<State>,
}

impl MemoryVersionStore {
    pub fn new(page_size: usize) -> Self {
        MemoryVersionStore {
            page_size: page_size.max(1),
            state: Mutex::new(State::default()),
        }
    }

    /// Writes a new object version that becomes the key's head.
    pub fn put(&self, bucket: &str, key: &str, version_id: &str, at: DateTime<Utc>) -> &Self {
        self.push(bucket, key, version_id, at, VersionKind::Object);
        self
    }

    /// Places a delete marker on top of the key.
    pub fn delete(&self, bucket: &str, key: &str, version_id: &str, at: DateTime<Utc>) -> &Self {
        self.push(bucket, key, version_id, at, VersionKind::DeleteMarker);
        self
    }

    pub fn fail_mutations_for(&self, key: &str) -> &Self {
        self.lock().failing_keys.insert(key.to_string());
        self
    }

    pub fn fail_listing(&self, message: &str) -> &Self {
        self.lock().listing_error = Some(message.to_string());
        self
    }

    pub fn copies(&self) -> Vec<CopyRequest> {
        self.lock().copies.clone()
    }

    pub fn deletes(&self) -> Vec<(String, String, String)> {
        self.lock().deletes.clone()
    }

    /// Mutating calls issued, successful or not.
    pub fn mutation_count(&self) -> usize {
        let state = self.lock();
        state.copies.len() + state.deletes.len()
    }

    pub fn list_calls(&self) -> usize {
        self.lock().list_calls
    }

    /// The current head of `key`, if any.
    pub fn head(&self, bucket: &str, key: &str) -> Option<VersionRecord> {
        self.lock()
            .records
            .iter()
            .find(|(b, r)| b == bucket && r.key == key && r.is_latest)
            .map(|(_, r)| r.clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn push(&self, bucket: &str, key: &str, version_id: &str, at: DateTime<Utc>, kind: VersionKind) {
        push_record(&mut self.lock(), bucket, key, version_id, at, kind);
    }
}

fn push_record(
    state: &mut State,
    bucket: &str,
    key: &str,
    version_id: &str,
    at: DateTime<Utc>,
    kind: VersionKind,
) {
    for (b, r) in state.records.iter_mut() {
        if b == bucket && r.key == key {
            r.is_latest = false;
        }
    }
    state.records.push((
        bucket.to_string(),
        VersionRecord {
            key: key.to_string(),
            version_id: version_id.to_string(),
            is_latest: true,
            last_modified: at,
            kind,
        },
    ));
}

fn next_timestamp(state: &State) -> DateTime<Utc> {
    state
        .records
        .iter()
        .map(|(_, r)| r.last_modified)
        .max()
        .unwrap_or_else(Utc::now)
        + Duration::seconds(1)
}

#[async_trait]
impl VersionStore for MemoryVersionStore {
    async fn list_versions_page(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        marker: Option<&PageMarker>,
    ) -> Result<VersionPage> {
        let mut state = self.lock();
        state.list_calls += 1;
        if let Some(message) = &state.listing_error {
            return Err(AppError::Listing(message.clone()));
        }

        // S3 order: key ascending, newest version first.
        let mut listed: Vec<&VersionRecord> = state
            .records
            .iter()
            .filter(|(b, r)| b == bucket && prefix.is_none_or(|p| r.key.starts_with(p)))
            .map(|(_, r)| r)
            .collect();
        listed.sort_by(|a, b| {
            a.key
                .cmp(&b.key)
                .then(b.last_modified.cmp(&a.last_modified))
                .then(a.version_id.cmp(&b.version_id))
        });

        let start = match marker {
            Some(m) => listed
                .iter()
                .position(|r| {
                    Some(&r.key) == m.key_marker.as_ref()
                        && Some(&r.version_id) == m.version_id_marker.as_ref()
                })
                .map(|i| i + 1)
                .unwrap_or(listed.len()),
            None => 0,
        };
        let end = (start + self.page_size).min(listed.len());
        let page = &listed[start..end];

        let next = if end < listed.len() {
            page.last().map(|r| PageMarker {
                key_marker: Some(r.key.clone()),
                version_id_marker: Some(r.version_id.clone()),
            })
        } else {
            None
        };

        Ok(VersionPage {
            versions: page
                .iter()
                .filter(|r| r.kind == VersionKind::Object)
                .map(|r| (*r).clone())
                .collect(),
            delete_markers: page
                .iter()
                .filter(|r| r.kind == VersionKind::DeleteMarker)
                .map(|r| (*r).clone())
                .collect(),
            next,
        })
    }

    async fn copy_version(&self, request: &CopyRequest) -> Result<()> {
        let mut state = self.lock();
        state.copies.push(request.clone());
        if state.failing_keys.contains(&request.src_key) {
            return Err(AppError::S3Sdk(format!("AccessDenied on {}", request.src_key)));
        }

        let found = state.records.iter().any(|(b, r)| {
            b == &request.src_bucket
                && r.key == request.src_key
                && r.version_id == request.version_id
                && r.kind == VersionKind::Object
        });
        if !found {
            return Err(AppError::S3Sdk(format!(
                "NoSuchVersion: {}/{}?versionId={}",
                request.src_bucket, request.src_key, request.version_id
            )));
        }

        state.generated += 1;
        let version_id = format!("copy-{}", state.generated);
        let at = next_timestamp(&state);
        push_record(
            &mut state,
            &request.dst_bucket,
            &request.dst_key,
            &version_id,
            at,
            VersionKind::Object,
        );
        Ok(())
    }

    async fn delete_version(&self, bucket: &str, key: &str, version_id: &str) -> Result<()> {
        let mut state = self.lock();
        state
            .deletes
            .push((bucket.to_string(), key.to_string(), version_id.to_string()));
        if state.failing_keys.contains(key) {
            return Err(AppError::S3Sdk(format!("AccessDenied on {}", key)));
        }

        let Some(index) = state
            .records
            .iter()
            .position(|(b, r)| b == bucket && r.key == key && r.version_id == version_id)
        else {
            return Err(AppError::S3Sdk(format!("NoSuchVersion: {}/{}?versionId={}", bucket, key, version_id)));
        };
        let (_, removed) = state.records.remove(index);

        if removed.is_latest {
            let newest = state
                .records
                .iter_mut()
                .filter(|(b, r)| b == bucket && r.key == key)
                .max_by_key(|(_, r)| r.last_modified);
            if let Some((_, r)) = newest {
                r.is_latest = true;
            }
        }
        Ok(())
    }
}
