//! Phase handlers run by the orchestrator, one module per phase

pub mod backup;
pub mod check;
pub mod fix;
pub mod install;
pub mod reconfigure;
pub mod uninstall;

use log::{debug, error, info, warn};
use url::Url;

use super::constants::internal_names;
use super::core::SetupContext;
use super::detection::Detection;
use super::error::SetupError;
use super::settings::{ReconciliationReport, reconcile};
use super::store::RegistryConfiguration;
use super::versions::{self, ExtractContext, ExtractMode, MetadataCopy};

/// Reconciled settings of the target release plus the staged metadata copy
#[derive(Debug, Clone)]
pub struct Gathered {
    pub report: ReconciliationReport,
    pub metadata_copy: Option<MetadataCopy>,
}

/// Run the detected release's extractors into a target registry and reconcile
pub(crate) fn gather(
    ctx: &SetupContext,
    detection: &Detection,
    mode: ExtractMode,
) -> Result<Gathered, SetupError> {
    gather_with(ctx, ctx.registry(), detection, mode)
}

/// [`gather`] with store reads resolved through `registry`
pub(crate) fn gather_with(
    ctx: &SetupContext,
    registry: &RegistryConfiguration,
    detection: &Detection,
    mode: ExtractMode,
) -> Result<Gathered, SetupError> {
    let target = versions::target();
    let mut settings = ctx.setting_registry(target)?;
    let mut metadata_copy = None;

    match detection.version {
        Some(installed) => {
            info!(
                "Extracting configuration of version {} for target {}",
                installed.version, target.version
            );
            let extract_ctx = ExtractContext {
                files: ctx.files(),
                store: ctx.store(),
                registry,
                mode,
            };
            for extractor in installed.extractors() {
                debug!("Running extractor {}", extractor.name());
                let extraction = extractor.extract(&extract_ctx, &mut settings)?;
                if extraction.metadata_copy.is_some() {
                    metadata_copy = extraction.metadata_copy;
                }
            }
        }
        None => info!("Nothing installed, using expected values only"),
    }

    let report = reconcile(&settings);
    log_report(&report);
    Ok(Gathered {
        report,
        metadata_copy,
    })
}

fn log_report(report: &ReconciliationReport) {
    info!("Reconciled settings:\n{report}");

    for entry in report.entries.iter().filter(|e| e.differs()) {
        info!(
            "Setting {} keeps value '{}' (version default '{}')",
            entry.name,
            entry.value.as_deref().unwrap_or_default(),
            entry.expected.as_deref().unwrap_or_default()
        );
    }
    for gap in &report.gaps {
        match (&gap.value, gap.hard) {
            (_, true) => {
                error!("Configuration gap: {} ({}) is required", gap.setting, gap.display_name)
            }
            (Some(value), false) => warn!(
                "Configuration gap: {} ({}) not found in the installed release, using '{value}'",
                gap.setting, gap.display_name
            ),
            (None, false) => {
                warn!("Configuration gap: {} ({}) has no value", gap.setting, gap.display_name)
            }
        }
    }
}

/// Reconciled minimal LoA, which must be a URI when present
pub(crate) fn minimal_loa(report: &ReconciliationReport) -> Result<Option<Url>, SetupError> {
    report
        .value(internal_names::MINIMAL_LOA)
        .map(|value| {
            Url::parse(value).map_err(|e| SetupError::InvalidValue {
                key: internal_names::MINIMAL_LOA.to_string(),
                value: value.to_string(),
                reason: e.to_string(),
            })
        })
        .transpose()
}
