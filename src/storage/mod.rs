// s3-restore/src/storage/mod.rs
pub(crate) mod s3_client;
#[cfg(test)]
pub(crate) mod memory;

use async_trait::async_trait;

use crate::errors::Result;
use crate::restore::types::VersionRecord;

pub use s3_client::S3VersionStore;

/// Continuation point of a paginated version listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMarker {
    pub key_marker: Option<String>,
    pub version_id_marker: Option<String>,
}

/// One page of a version listing, unfiltered.
#[derive(Debug, Clone, Default)]
pub struct VersionPage {
    pub versions: Vec<VersionRecord>,
    pub delete_markers: Vec<VersionRecord>,
    /// `None` once the listing is exhausted.
    pub next: Option<PageMarker>,
}

/// A server-side copy of one explicit object version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyRequest {
    pub src_bucket: String,
    pub src_key: String,
    pub version_id: String,
    pub dst_bucket: String,
    pub dst_key: String,
}

/// The storage backend capabilities a restore run needs.
#[async_trait]
pub trait VersionStore: Send + Sync {
    async fn list_versions_page(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        marker: Option<&PageMarker>,
    ) -> Result<VersionPage>;

    async fn copy_version(&self, request: &CopyRequest) -> Result<()>;

    /// Deletes one exact version; on a delete marker this un-deletes the object.
    async fn delete_version(&self, bucket: &str, key: &str, version_id: &str) -> Result<()>;
}
