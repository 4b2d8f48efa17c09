//! Setup orchestration: the flag driven phase sequence
//!
//! Phases always run in [`Phase::ORDER`]. A phase whose flag is not set is
//! skipped, and the first failing phase ends the run with its status code.

use std::fmt;

use log::{error, info, warn};

use super::core::{InstallProgress, SetupContext};
use super::detection::{Detection, detect_installation};
use super::error::{STATUS_OK, SetupError};
use super::flags::SetupFlags;
use super::phases;
use super::settings::ReconciliationReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Check,
    Backup,
    Reconfigure,
    Fix,
    Uninstall,
    Install,
}

impl Phase {
    /// Execution order, independent of flag values
    pub const ORDER: [Phase; 6] = [
        Phase::Check,
        Phase::Backup,
        Phase::Reconfigure,
        Phase::Fix,
        Phase::Uninstall,
        Phase::Install,
    ];

    pub fn flag(self) -> SetupFlags {
        match self {
            Phase::Check => SetupFlags::CHECK,
            Phase::Backup => SetupFlags::BACKUP,
            Phase::Reconfigure => SetupFlags::RECONFIGURE,
            Phase::Fix => SetupFlags::FIX,
            Phase::Uninstall => SetupFlags::UNINSTALL,
            Phase::Install => SetupFlags::INSTALL,
        }
    }

    /// Step name used in the progress journal
    pub fn step(self) -> &'static str {
        match self {
            Phase::Check => "check",
            Phase::Backup => "backup",
            Phase::Reconfigure => "reconfigure",
            Phase::Fix => "fix",
            Phase::Uninstall => "uninstall",
            Phase::Install => "install",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.step())
    }
}

/// Phases a run executes: the requested ones plus an enforced Backup
pub fn effective_flags(requested: SetupFlags, enforce_backup: bool) -> SetupFlags {
    if enforce_backup
        && requested.intersects(SetupFlags::mutating())
        && !requested.contains(SetupFlags::BACKUP)
    {
        warn!("Backup not requested, running it before the mutating phases anyway");
        return requested | SetupFlags::BACKUP;
    }
    requested
}

/// State carried from phase to phase within one run
struct SetupRun {
    flags: SetupFlags,
    detection: Detection,
    staged: Option<ReconciliationReport>,
}

impl SetupRun {
    fn execute(&mut self, phase: Phase, ctx: &mut SetupContext) -> Result<String, SetupError> {
        match phase {
            Phase::Check => {
                let fix_pending = self.flags.contains(SetupFlags::FIX);
                let report = phases::check::run(ctx, &self.detection, fix_pending)?;
                Ok(format!(
                    "{}, {} gaps",
                    self.detection.describe(),
                    report.gaps.len()
                ))
            }
            Phase::Backup => {
                let manifest = phases::backup::run(ctx, &self.detection)?;
                Ok(format!("{} files saved", manifest.files.len()))
            }
            Phase::Reconfigure => {
                let report = phases::reconfigure::run(ctx, &self.detection)?;
                let count = report.entries.len();
                self.staged = Some(report);
                Ok(format!("{count} settings staged"))
            }
            Phase::Fix => {
                let repairs = phases::fix::run(ctx)?;
                Ok(format!("{} repairs applied", repairs.len()))
            }
            Phase::Uninstall => {
                let summary = phases::uninstall::run(ctx, &self.detection)?;
                self.detection = detect_installation(ctx.files());
                Ok(match summary.version {
                    Some(version) => format!("version {version} removed"),
                    None => "nothing installed".to_string(),
                })
            }
            Phase::Install => {
                phases::install::run(ctx, self.staged.take(), &self.detection)?;
                Ok("installed".to_string())
            }
        }
    }
}

/// Run the requested phases and return the status code of the run.
///
/// 0 on success, otherwise the code of the first failing phase.
pub fn run_setup(flags: SetupFlags, ctx: &mut SetupContext) -> i32 {
    let effective = effective_flags(flags, ctx.enforce_backup());
    if effective.is_empty() {
        info!("No phases requested");
        return STATUS_OK;
    }
    info!("Setup run: {effective}");

    let mut run = SetupRun {
        flags: effective,
        detection: detect_installation(ctx.files()),
        staged: None,
    };

    let phases: Vec<Phase> = Phase::ORDER
        .into_iter()
        .filter(|phase| effective.contains(phase.flag()))
        .collect();
    let total = phases.len() as f32;

    for (index, phase) in phases.into_iter().enumerate() {
        ctx.report(InstallProgress::new(
            phase.step(),
            index as f32 / total,
            format!("{phase} started"),
        ));

        match run.execute(phase, ctx) {
            Ok(message) => ctx.report(InstallProgress::complete(phase.step(), message)),
            Err(e) => {
                let status = e.status_code();
                error!("Phase {phase} failed with status {status}: {e}");
                ctx.report(InstallProgress::error(phase.step(), e.to_string()));
                return status;
            }
        }
    }

    info!("Setup completed");
    STATUS_OK
}
