// s3-restore/src/cli.rs
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// Restores deleted objects of an S3 version enabled bucket.
#[derive(Parser, Debug)]
#[command(name = "s3-restore")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// JSON config file (default is $HOME/.s3-restore.json)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// S3 bucket to restore the objects from, as a name or s3://bucket/prefix
    #[arg(long, global = true, env = "S3_RESTORE_BUCKET")]
    pub bucket: Option<String>,

    /// S3 prefix to look for deleted objects under
    #[arg(long, global = true, env = "S3_RESTORE_PREFIX")]
    pub prefix: Option<String>,

    /// AWS region where the bucket is located [default: us-east-1]
    #[arg(long, global = true, env = "S3_RESTORE_REGION")]
    pub region: Option<String>,

    /// Custom endpoint for S3-compatible stores
    #[arg(long, global = true, env = "S3_RESTORE_ENDPOINT_URL")]
    pub endpoint_url: Option<String>,

    /// Named profile from the AWS shared config files
    #[arg(long, global = true)]
    pub profile: Option<String>,

    /// Only print the actions that would be performed
    #[arg(long, global = true, overrides_with = "no_dryrun")]
    pub dryrun: bool,

    /// Perform the actions even if the config file enables dryrun
    #[arg(long, global = true, overrides_with = "dryrun")]
    pub no_dryrun: bool,

    /// Increase log verbosity
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Restores the deleted objects by copying them from their previous versions
    Copy(CopyArgs),

    /// Restores the deleted objects by removing the delete markers
    Del(DelArgs),
}

#[derive(Args, Debug, Default)]
pub struct CopyArgs {
    /// Another destination bucket to copy the objects to, as a name or s3://bucket/prefix
    #[arg(long, alias = "dstBucket")]
    pub dst_bucket: Option<String>,

    /// Destination prefix for the restored copies
    #[arg(long, alias = "dstPrefix")]
    pub dst_prefix: Option<String>,

    /// Only restore objects deleted on or after this date
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub since: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct DelArgs {
    /// Only remove markers of keys that still have an earlier object version
    #[arg(long)]
    pub only_with_history: bool,
}
