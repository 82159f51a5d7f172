// s3-restore/src/restore/executor.rs
use tracing::{error, info};

use super::types::{RestorableEntry, RestorePlan};
use crate::storage::{CopyRequest, VersionStore};

/// Where restored copies are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyDestination {
    pub bucket: Option<String>,
    pub prefix: Option<String>,
}

impl CopyDestination {
    pub fn bucket<'a>(&'a self, src_bucket: &'a str) -> &'a str {
        self.bucket.as_deref().unwrap_or(src_bucket)
    }

    pub fn key(&self, key: &str) -> String {
        match self.prefix.as_deref().map(|p| p.trim_end_matches('/')) {
            Some(prefix) if !prefix.is_empty() => format!("{}/{}", prefix, key),
            _ => key.to_string(),
        }
    }
}

/// Outcome counts of one plan execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionSummary {
    pub planned: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub dry_run: usize,
}

impl ExecutionSummary {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Applied => self.succeeded += 1,
            Outcome::Failed => self.failed += 1,
            Outcome::DryRun => self.dry_run += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Applied,
    Failed,
    DryRun,
}

/// Copies one historical version on top of the deleted key (or into the destination).
async fn copy_versioned_object(
    store: &dyn VersionStore,
    src_bucket: &str,
    entry: &RestorableEntry,
    destination: &CopyDestination,
    dryrun: bool,
) -> Outcome {
    let request = CopyRequest {
        src_bucket: src_bucket.to_string(),
        src_key: entry.key.clone(),
        version_id: entry.version_id.clone(),
        dst_bucket: destination.bucket(src_bucket).to_string(),
        dst_key: destination.key(&entry.key),
    };

    info!(
        src_obj = %format!("{}/{}?versionId={}", request.src_bucket, request.src_key, request.version_id),
        dst_obj = %format!("{}/{}", request.dst_bucket, request.dst_key),
        dryrun,
        "Attempting to copy object"
    );
    if dryrun {
        return Outcome::DryRun;
    }

    match store.copy_version(&request).await {
        Ok(()) => Outcome::Applied,
        Err(e) => {
            error!(key = %entry.key, version_id = %entry.version_id, "Failed copying the object, reason: {}", e);
            Outcome::Failed
        }
    }
}

/// Deletes the delete marker version itself, which un-deletes the object.
async fn remove_delete_marker(
    store: &dyn VersionStore,
    bucket: &str,
    entry: &RestorableEntry,
    dryrun: bool,
) -> Outcome {
    info!(key = %entry.key, version_id = %entry.version_id, dryrun, "Attempting to remove delete marker of the object");
    if dryrun {
        return Outcome::DryRun;
    }

    match store.delete_version(bucket, &entry.key, &entry.version_id).await {
        Ok(()) => Outcome::Applied,
        Err(e) => {
            error!(key = %entry.key, version_id = %entry.version_id, "Failed removing the delete marker, reason: {}", e);
            Outcome::Failed
        }
    }
}

/// Copies every planned version, one entry at a time. A failed entry does not stop the rest.
pub async fn execute_copy_plan(
    store: &dyn VersionStore,
    src_bucket: &str,
    plan: &RestorePlan,
    destination: &CopyDestination,
    dryrun: bool,
) -> ExecutionSummary {
    let mut summary = ExecutionSummary {
        planned: plan.len(),
        ..Default::default()
    };
    for entry in plan.iter() {
        let outcome = copy_versioned_object(store, src_bucket, entry, destination, dryrun).await;
        summary.record(outcome);
    }
    summary
}

/// Removes every planned delete marker, one entry at a time. A failed entry does not stop the rest.
pub async fn execute_marker_removal(
    store: &dyn VersionStore,
    bucket: &str,
    plan: &RestorePlan,
    dryrun: bool,
) -> ExecutionSummary {
    let mut summary = ExecutionSummary {
        planned: plan.len(),
        ..Default::default()
    };
    for entry in plan.iter() {
        let outcome = remove_delete_marker(store, bucket, entry, dryrun).await;
        summary.record(outcome);
    }
    summary
}
