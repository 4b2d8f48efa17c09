//! Check: read-only extraction and reconciliation report

use log::{info, warn};

use super::super::core::SetupContext;
use super::super::detection::Detection;
use super::super::error::SetupError;
use super::super::settings::ReconciliationReport;
use super::super::versions::ExtractMode;
use super::fix::{self, Repair};
use super::{gather, gather_with, minimal_loa};

/// Validate the current installation without writing anything.
///
/// Hard-required gaps, unreadable artifacts and unresolvable store paths fail;
/// soft gaps and repairable store states are only reported. With
/// `fix_pending` the store is read as Fix will leave it.
pub fn run(
    ctx: &SetupContext,
    detection: &Detection,
    fix_pending: bool,
) -> Result<ReconciliationReport, SetupError> {
    info!("Check: {}", detection.describe());
    for missing in &detection.missing {
        warn!("Missing assembly {missing}");
    }

    let repairs = fix::diagnose(ctx)?;
    for repair in &repairs {
        if fix_pending {
            warn!("Repairable store state: {repair} (repaired by the fix phase)");
        } else {
            warn!("Repairable store state: {repair} (run with --fix)");
        }
    }

    let repointed = repairs
        .iter()
        .find_map(Repair::repointed_registration)
        .filter(|_| fix_pending);
    let gathered = match repointed {
        Some(name) => {
            info!("Reading the store through registration {name}");
            let registry = ctx.registry().pinned_to(name);
            gather_with(ctx, &registry, detection, ExtractMode::ReadOnly)?
        }
        None => gather(ctx, detection, ExtractMode::ReadOnly)?,
    };

    let loa_repaired = fix_pending
        && repairs
            .iter()
            .any(|r| matches!(r, Repair::MissingMinimalLoa { .. }));
    match minimal_loa(&gathered.report) {
        Err(e) if loa_repaired => warn!("{e} (repaired by the fix phase)"),
        other => {
            other?;
        }
    }
    gathered.report.ensure_persistable()?;

    info!(
        "Check found {} settings, {} gaps",
        gathered.report.entries.len(),
        gathered.report.gaps.len()
    );
    Ok(gathered.report)
}
