// s3-restore/src/restore/lister.rs
use tracing::{debug, info};

use super::types::VersionListing;
use crate::errors::Result;
use crate::storage::VersionStore;

/// Lists every version under `bucket`/`prefix`, following all pages.
///
/// Keeps only the versions that matter for a restore: object versions that are
/// no longer the head of their key, and delete markers that are.
pub async fn list_object_versions(
    store: &dyn VersionStore,
    bucket: &str,
    prefix: Option<&str>,
) -> Result<VersionListing> {
    info!(bucket, prefix = prefix.unwrap_or(""), "Listing object versions in bucket");

    let mut listing = VersionListing::default();
    let mut marker = None;
    let mut pages = 0usize;
    loop {
        let page = store
            .list_versions_page(bucket, prefix, marker.as_ref())
            .await?;
        pages += 1;

        listing
            .versions
            .extend(page.versions.into_iter().filter(|v| !v.is_latest));
        listing
            .delete_markers
            .extend(page.delete_markers.into_iter().filter(|m| m.is_latest));

        match page.next {
            Some(next) => marker = Some(next),
            None => break,
        }
    }
    debug!(pages, "Version listing exhausted");

    if listing.versions.is_empty() {
        info!("There are no objects with previous versions");
    } else {
        info!(count = listing.versions.len(), "Found objects with previous versions");
    }
    if listing.delete_markers.is_empty() {
        info!("There are no objects with delete markers");
    } else {
        info!(count = listing.delete_markers.len(), "Found objects with delete markers");
    }

    Ok(listing)
}
