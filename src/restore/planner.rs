// s3-restore/src/restore/planner.rs
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use super::types::{RestorableEntry, RestorePlan, VersionListing, VersionRecord};

/// Picks, per key, the most recently modified historical version.
///
/// Only a strictly newer timestamp replaces a candidate, so on ties the version
/// listed first wins.
fn latest_historical_versions(versions: &[VersionRecord]) -> HashMap<&str, &VersionRecord> {
    versions
        .iter()
        .filter(|v| !v.is_latest)
        .fold(HashMap::<&str, &VersionRecord>::new(), |mut best, version| {
            best.entry(version.key.as_str())
                .and_modify(|current| {
                    if version.last_modified > current.last_modified {
                        *current = version;
                    }
                })
                .or_insert(version);
            best
        })
}

/// Plans a copy restore: for each live delete marker at or after `since`, the
/// version that was live right before the deletion.
///
/// Keys without any earlier object version are logged and skipped.
pub fn plan_copy_restore(listing: &VersionListing, since: Option<DateTime<Utc>>) -> RestorePlan {
    let candidates = latest_historical_versions(&listing.versions);
    let mut plan = RestorePlan::new();

    for marker in listing.delete_markers.iter().filter(|m| m.is_latest) {
        if since.is_some_and(|cutoff| marker.last_modified < cutoff) {
            debug!(key = %marker.key, deleted_at = %marker.last_modified, "Delete marker predates cutoff, leaving it");
            continue;
        }
        match candidates.get(marker.key.as_str()) {
            Some(version) => {
                plan.insert(RestorableEntry::from(*version));
            }
            None => {
                warn!(key = %marker.key, "Did not find a version to restore");
            }
        }
    }
    plan
}

/// Plans a marker removal restricted to keys that still have an earlier object version.
pub fn plan_marker_removal(listing: &VersionListing) -> RestorePlan {
    let with_history: HashSet<&str> = listing
        .versions
        .iter()
        .map(|v| v.key.as_str())
        .collect();
    let mut plan = RestorePlan::new();

    for marker in listing.delete_markers.iter().filter(|m| m.is_latest) {
        if with_history.contains(marker.key.as_str()) {
            plan.insert(RestorableEntry::from(marker));
        } else {
            warn!(key = %marker.key, "No earlier version behind delete marker, leaving it");
        }
    }
    plan
}

/// Plans removal of every live delete marker, with no further filtering.
pub fn plan_all_markers(listing: &VersionListing) -> RestorePlan {
    let mut plan = RestorePlan::new();
    for marker in listing.delete_markers.iter().filter(|m| m.is_latest) {
        plan.insert(RestorableEntry::from(marker));
    }
    plan
}
