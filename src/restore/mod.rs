pub(crate) mod types;
pub(crate) mod lister;
pub(crate) mod planner;
pub(crate) mod executor;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::{AppConfig, CopyConfig, MarkerRemovalConfig, OperationConfig};
use crate::storage::VersionStore;
use executor::ExecutionSummary;
use types::RestorePlan;

/// What a restore run planned and how executing it went.
#[derive(Debug, Clone)]
pub struct RestoreReport {
    pub plan: RestorePlan,
    pub summary: ExecutionSummary,
}

/// Public entry point for a restore run: list, plan, then execute, each phase to completion.
pub async fn run_restore_flow(app_config: &AppConfig, store: &dyn VersionStore) -> Result<RestoreReport> {
    let report = match &app_config.operation {
        OperationConfig::Copy(copy_config) => run_copy_flow(app_config, copy_config, store).await?,
        OperationConfig::RemoveMarkers(removal_config) => {
            run_marker_removal_flow(app_config, removal_config, store).await?
        }
    };

    let summary = &report.summary;
    info!(
        planned = summary.planned,
        succeeded = summary.succeeded,
        failed = summary.failed,
        dry_run = summary.dry_run,
        "Restore run finished"
    );
    Ok(report)
}

async fn run_copy_flow(
    app_config: &AppConfig,
    copy_config: &CopyConfig,
    store: &dyn VersionStore,
) -> Result<RestoreReport> {
    info!("Restoring objects by copying previous versions of the objects");
    if copy_config.since.is_none() {
        info!("No since value given, restoring deletions of any age");
    }

    let target = &app_config.target;
    let listing = lister::list_object_versions(store, &target.bucket, target.prefix.as_deref())
        .await
        .with_context(|| format!("Failed to list object versions in bucket {}", target.bucket))?;

    let plan = planner::plan_copy_restore(&listing, copy_config.since);
    if plan.is_empty() {
        info!("No deleted objects to restore by copy");
    } else {
        info!(count = plan.len(), "Objects planned for restore by copy");
    }

    let summary = executor::execute_copy_plan(
        store,
        &target.bucket,
        &plan,
        &copy_config.destination,
        app_config.dryrun,
    )
    .await;
    Ok(RestoreReport { plan, summary })
}

async fn run_marker_removal_flow(
    app_config: &AppConfig,
    removal_config: &MarkerRemovalConfig,
    store: &dyn VersionStore,
) -> Result<RestoreReport> {
    info!("Restoring objects by removing delete markers");

    let target = &app_config.target;
    let listing = lister::list_object_versions(store, &target.bucket, target.prefix.as_deref())
        .await
        .with_context(|| format!("Failed to list object versions in bucket {}", target.bucket))?;

    let plan = if removal_config.only_with_history {
        planner::plan_marker_removal(&listing)
    } else {
        planner::plan_all_markers(&listing)
    };
    if plan.is_empty() {
        info!("No delete markers to remove");
    } else {
        info!(count = plan.len(), "Delete markers planned for removal");
    }

    let summary = executor::execute_marker_removal(store, &target.bucket, &plan, app_config.dryrun).await;
    Ok(RestoreReport { plan, summary })
}
