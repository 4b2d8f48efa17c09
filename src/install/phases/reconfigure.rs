//! Reconfigure: extraction pipeline with staging, results kept for Install

use log::info;

use super::super::core::SetupContext;
use super::super::detection::Detection;
use super::super::error::SetupError;
use super::super::file_ops::{FileDirectory, check_status};
use super::super::settings::ReconciliationReport;
use super::super::versions::ExtractMode;
use super::{gather, minimal_loa};

/// Extract, reconcile and stage. Nothing is written to the store.
///
/// A failed metadata copy is reported after the reconciliation so the
/// operator still sees the gathered settings.
pub fn run(ctx: &SetupContext, detection: &Detection) -> Result<ReconciliationReport, SetupError> {
    let gathered = gather(ctx, detection, ExtractMode::Stage)?;

    minimal_loa(&gathered.report)?;
    gathered.report.ensure_persistable()?;

    if let Some(copy) = &gathered.metadata_copy {
        check_status(
            copy.status,
            ctx.files().path(FileDirectory::Config, &copy.filename),
        )?;
    }

    info!(
        "Staged {} settings for install",
        gathered.report.entries.iter().filter(|e| e.value.is_some()).count()
    );
    Ok(gathered.report)
}
