// s3-restore/src/storage/s3_client.rs
use async_trait::async_trait;
use aws_sdk_s3 as s3;
use chrono::{DateTime, Utc};
use s3::config::Region;
use s3::error::DisplayErrorContext;
use tracing::{debug, warn};

use super::{CopyRequest, PageMarker, VersionPage, VersionStore};
use crate::config::StorageConfig;
use crate::errors::{AppError, Result};
use crate::restore::types::{VersionKind, VersionRecord};

/// Version id S3 reports for objects written before versioning was enabled.
const NULL_VERSION_ID: &str = "null";

/// `VersionStore` backed by an AWS S3 (or S3-compatible) endpoint.
pub struct S3VersionStore {
    client: s3::Client,
}

impl S3VersionStore {
    /// Builds the client session once; it is shared read-only by every call of the run.
    pub async fn connect(storage: &StorageConfig) -> Self {
        let mut loader = aws_config::defaults(s3::config::BehaviorVersion::latest())
            .region(Region::new(storage.region.clone()));
        if let Some(endpoint) = &storage.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        if let Some(profile) = &storage.profile {
            loader = loader.profile_name(profile);
        }
        let sdk_config = loader.load().await;

        // Custom endpoints (MinIO, Spaces, ...) rarely support virtual-hosted buckets.
        let s3_config = s3::config::Builder::from(&sdk_config)
            .force_path_style(storage.endpoint_url.is_some())
            .build();

        debug!(region = %storage.region, endpoint = ?storage.endpoint_url, "S3 client configured");
        S3VersionStore {
            client: s3::Client::from_conf(s3_config),
        }
    }
}

#[async_trait]
impl VersionStore for S3VersionStore {
    async fn list_versions_page(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        marker: Option<&PageMarker>,
    ) -> Result<VersionPage> {
        let resp = self
            .client
            .list_object_versions()
            .bucket(bucket)
            .set_prefix(prefix.map(str::to_string))
            .set_key_marker(marker.and_then(|m| m.key_marker.clone()))
            .set_version_id_marker(marker.and_then(|m| m.version_id_marker.clone()))
            .send()
            .await
            .map_err(|e| AppError::Listing(DisplayErrorContext(e).to_string()))?;

        let versions = resp
            .versions()
            .iter()
            .filter_map(|v| {
                to_record(
                    v.key(),
                    v.version_id(),
                    v.is_latest(),
                    v.last_modified(),
                    VersionKind::Object,
                )
            })
            .collect();

        let delete_markers = resp
            .delete_markers()
            .iter()
            .filter_map(|m| {
                to_record(
                    m.key(),
                    m.version_id(),
                    m.is_latest(),
                    m.last_modified(),
                    VersionKind::DeleteMarker,
                )
            })
            .collect();

        let next = if resp.is_truncated().unwrap_or(false) {
            let next = PageMarker {
                key_marker: resp.next_key_marker().map(str::to_string),
                version_id_marker: resp.next_version_id_marker().map(str::to_string),
            };
            if next.key_marker.is_none() && next.version_id_marker.is_none() {
                warn!(bucket, "Listing is truncated but carries no continuation markers, stopping");
                None
            } else {
                Some(next)
            }
        } else {
            None
        };

        Ok(VersionPage {
            versions,
            delete_markers,
            next,
        })
    }

    async fn copy_version(&self, request: &CopyRequest) -> Result<()> {
        self.client
            .copy_object()
            .copy_source(copy_source(
                &request.src_bucket,
                &request.src_key,
                &request.version_id,
            ))
            .bucket(&request.dst_bucket)
            .key(&request.dst_key)
            .send()
            .await
            .map_err(AppError::s3)?;
        Ok(())
    }

    async fn delete_version(&self, bucket: &str, key: &str, version_id: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .version_id(version_id)
            .send()
            .await
            .map_err(AppError::s3)?;
        Ok(())
    }
}

fn to_record(
    key: Option<&str>,
    version_id: Option<&str>,
    is_latest: Option<bool>,
    last_modified: Option<&aws_smithy_types::DateTime>,
    kind: VersionKind,
) -> Option<VersionRecord> {
    let Some(key) = key else {
        warn!(?kind, "Skipping listed version without a key");
        return None;
    };
    let Some(last_modified) = last_modified.and_then(to_chrono) else {
        warn!(key, ?kind, "Skipping listed version without a usable LastModified");
        return None;
    };
    Some(VersionRecord {
        key: key.to_string(),
        version_id: version_id.unwrap_or(NULL_VERSION_ID).to_string(),
        is_latest: is_latest.unwrap_or(false),
        last_modified,
        kind,
    })
}

pub(crate) fn to_chrono(dt: &aws_smithy_types::DateTime) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(dt.secs(), dt.subsec_nanos())
}

/// Builds the `x-amz-copy-source` value: `bucket/key?versionId=id`, URL-encoded with `/` kept.
pub(crate) fn copy_source(bucket: &str, key: &str, version_id: &str) -> String {
    format!(
        "{}/{}?versionId={}",
        bucket,
        encode_path(key),
        encode_path(version_id)
    )
}

fn encode_path(value: &str) -> String {
    // form encoding turns spaces into '+', and a literal '+' is already %2B
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
        .replace("%2F", "/")
}
