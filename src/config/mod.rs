// s3-restore/src/config/mod.rs
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::cli::{Cli, Commands};
use crate::errors::{AppError, Result};
use crate::restore::executor::CopyDestination;

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_CONFIG_FILE: &str = ".s3-restore.json";
const SINCE_FORMAT: &str = "%Y-%m-%d";

// Structs for deserializing the config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JsonCopyOptions {
    pub dst_bucket: Option<String>,
    pub dst_prefix: Option<String>,
    pub since: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawJsonConfig {
    pub bucket: Option<String>,
    pub prefix: Option<String>,
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
    pub profile: Option<String>,
    pub dryrun: Option<bool>,
    pub copy: Option<JsonCopyOptions>,
}

// Application's internal configuration structs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub region: String,
    pub endpoint_url: Option<String>,
    pub profile: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketTarget {
    pub bucket: String,
    pub prefix: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyConfig {
    pub destination: CopyDestination,
    /// Delete markers older than this are left alone; `None` restores everything.
    pub since: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerRemovalConfig {
    pub only_with_history: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationConfig {
    Copy(CopyConfig),
    RemoveMarkers(MarkerRemovalConfig),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub target: BucketTarget,
    pub dryrun: bool,
    pub operation: OperationConfig,
}

impl RawJsonConfig {
    /// Reads the config file named on the command line, or the default one if present.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from_json(path),
            None => match default_config_path() {
                Some(path) if path.is_file() => Self::load_from_json(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn load_from_json(config_path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(config_path).map_err(|source| AppError::ConfigRead {
            path: config_path.to_path_buf(),
            source,
        })?;
        let raw: RawJsonConfig = serde_json::from_str(&config_content).map_err(|source| AppError::ConfigParse {
            path: config_path.to_path_buf(),
            source,
        })?;
        info!(path = %config_path.display(), "Using config file");
        Ok(raw)
    }
}

fn default_config_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(DEFAULT_CONFIG_FILE))
}

impl AppConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let raw = RawJsonConfig::load(cli.config.as_deref())?;
        Self::resolve(cli, raw)
    }

    /// Merges command line (and env) values over the config file, then built-in defaults.
    pub fn resolve(cli: &Cli, raw: RawJsonConfig) -> Result<Self> {
        let bucket = first_set(&cli.bucket, &raw.bucket).ok_or_else(|| {
            AppError::Config(
                "bucket must be set with --bucket, S3_RESTORE_BUCKET or in the config file".to_string(),
            )
        })?;
        let mut target = parse_bucket_target(&bucket)?;
        if let Some(prefix) = first_set(&cli.prefix, &raw.prefix) {
            target.prefix = Some(prefix);
        }

        let storage = StorageConfig {
            region: first_set(&cli.region, &raw.region).unwrap_or_else(|| DEFAULT_REGION.to_string()),
            endpoint_url: first_set(&cli.endpoint_url, &raw.endpoint_url),
            profile: first_set(&cli.profile, &raw.profile),
        };

        let operation = match &cli.command {
            Commands::Copy(args) => {
                let file = raw.copy.clone().unwrap_or_default();
                let mut destination = CopyDestination::default();
                if let Some(dst) = first_set(&args.dst_bucket, &file.dst_bucket) {
                    let dst = parse_bucket_target(&dst)?;
                    destination.bucket = Some(dst.bucket);
                    destination.prefix = dst.prefix;
                }
                if let Some(prefix) = first_set(&args.dst_prefix, &file.dst_prefix) {
                    destination.prefix = Some(prefix);
                }
                let since = match first_set(&args.since, &file.since) {
                    Some(value) => parse_since(&value)?,
                    None => None,
                };
                OperationConfig::Copy(CopyConfig { destination, since })
            }
            Commands::Del(args) => OperationConfig::RemoveMarkers(MarkerRemovalConfig {
                only_with_history: args.only_with_history,
            }),
        };

        Ok(AppConfig {
            storage,
            target,
            dryrun: resolve_dryrun(cli, &raw),
            operation,
        })
    }
}

/// `--dryrun` / `--no-dryrun` win over the config file, which wins over the default (off).
fn resolve_dryrun(cli: &Cli, raw: &RawJsonConfig) -> bool {
    if cli.dryrun {
        true
    } else if cli.no_dryrun {
        false
    } else {
        raw.dryrun.unwrap_or(false)
    }
}

/// First non-blank value, command line before config file.
fn first_set(cli: &Option<String>, file: &Option<String>) -> Option<String> {
    cli.iter()
        .chain(file.iter())
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Parses a `YYYY-MM-DD` cutoff into midnight UTC. A blank value means no cutoff.
pub fn parse_since(value: &str) -> Result<Option<DateTime<Utc>>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    let date = NaiveDate::parse_from_str(value, SINCE_FORMAT).map_err(|source| AppError::InvalidSince {
        value: value.to_string(),
        source,
    })?;
    Ok(Some(date.and_time(NaiveTime::MIN).and_utc()))
}

/// Accepts `bucket`, `bucket/prefix` or `s3://bucket/prefix`.
///
/// The prefix is taken verbatim: keys may hold spaces, `#`, `?` or `%`, none of which are URL syntax here.
pub fn parse_bucket_target(value: &str) -> Result<BucketTarget> {
    let path = match value.strip_prefix("s3://") {
        Some(path) => path,
        None if value.contains("://") => {
            return Err(AppError::InvalidInput(format!("S3 URI must start with s3://: {}", value)));
        }
        None => value,
    };
    let (bucket, prefix) = path.split_once('/').unwrap_or((path, ""));

    if bucket.is_empty() {
        return Err(AppError::Config(format!("Bucket name cannot be empty: '{}'", value)));
    }
    Ok(BucketTarget {
        bucket: bucket.to_string(),
        prefix: Some(prefix.to_string()).filter(|p| !p.is_empty()),
    })
}
