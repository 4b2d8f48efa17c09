//! Install: base installation of the target release, then the metadata follow-on.
//!
//! The base step copies the component files, renders the Sustainsys
//! configuration and writes the reconciled settings to the store. The
//! metadata copy only runs after the base step succeeded.

use log::{info, warn};

use super::super::constants::internal_names;
use super::super::core::{InstallProgress, SetupContext};
use super::super::detection::Detection;
use super::super::error::SetupError;
use super::super::file_ops::{FileDirectory, check_status};
use super::super::settings::{ReconciliationReport, Requirement};
use super::super::store::StoreValue;
use super::super::versions::{self, ExtractMode, PluginVersion, sustainsys};
use super::{gather, minimal_loa};

pub const BASE_STEP: &str = "install-base";
pub const METADATA_STEP: &str = "install-metadata";

/// Settings to install: the staged ones, or a fresh read-only pass
fn settings_for_install(
    ctx: &SetupContext,
    staged: Option<ReconciliationReport>,
    detection: &Detection,
) -> Result<ReconciliationReport, SetupError> {
    match staged {
        Some(report) => Ok(report),
        None => {
            info!("No staged settings, reading the current configuration");
            Ok(gather(ctx, detection, ExtractMode::ReadOnly)?.report)
        }
    }
}

fn write_store(ctx: &mut SetupContext, report: &ReconciliationReport) -> Result<usize, SetupError> {
    let registry = ctx.registry().clone();
    let loa = minimal_loa(report)?;
    let mut written = 0;

    for entry in &report.entries {
        let Some(value) = &entry.value else {
            continue;
        };
        if entry.requirement == Requirement::Optional && value.trim().is_empty() {
            continue;
        }

        let value = match (&loa, entry.name == internal_names::MINIMAL_LOA) {
            (Some(url), true) => StoreValue::from(url),
            _ => StoreValue::from(value.as_str()),
        };
        registry.write(ctx.store_mut(), entry.section.key(), entry.name, value)?;
        written += 1;
    }
    Ok(written)
}

/// Step (a). Any failure keeps the status of the failing operation.
fn install_base(
    ctx: &mut SetupContext,
    target: &PluginVersion,
    report: &ReconciliationReport,
) -> Result<(), SetupError> {
    for component in target.components {
        component.install(ctx.files())?;
    }

    for component in target.components.iter().filter(|c| c.config_generated) {
        if let Some(filename) = component.config_filename {
            let contents = sustainsys::render_config(report)?;
            let rc = ctx
                .files()
                .write_file(FileDirectory::AdfsDir, filename, &contents);
            check_status(rc, ctx.files().path(FileDirectory::AdfsDir, filename))?;
            info!("Wrote {filename}");
        }
    }

    let written = write_store(ctx, report)?;
    info!("Wrote {written} settings to the store");
    Ok(())
}

/// Step (b): stage the IdP metadata file for the host process
fn install_metadata(ctx: &SetupContext, report: &ReconciliationReport) -> Result<(), SetupError> {
    let filename = report
        .value(internal_names::IDP_METADATA_FILENAME)
        .ok_or_else(|| SetupError::ConfigurationGap {
            setting: internal_names::IDP_METADATA_FILENAME.to_string(),
        })?;

    let rc = ctx
        .files()
        .copy_file(FileDirectory::Config, FileDirectory::AdfsDir, filename);
    check_status(rc, ctx.files().path(FileDirectory::Config, filename))
}

pub fn run(
    ctx: &mut SetupContext,
    staged: Option<ReconciliationReport>,
    detection: &Detection,
) -> Result<(), SetupError> {
    let target = versions::target();
    info!("Installing version {}", target.version);

    let report = settings_for_install(ctx, staged, detection)?;
    report.ensure_persistable()?;
    for gap in report.gaps.iter().filter(|g| !g.hard) {
        match &gap.value {
            Some(value) => warn!(
                "Installing {} with '{value}', not found in the installed release",
                gap.setting
            ),
            None => warn!("Installing without a value for {}", gap.setting),
        }
    }

    ctx.report(InstallProgress::new(BASE_STEP, 0.0, "Base installation started"));
    if let Err(e) = install_base(ctx, target, &report) {
        ctx.report(InstallProgress::error(BASE_STEP, e.to_string()));
        return Err(e);
    }
    ctx.report(InstallProgress::complete(BASE_STEP, "Base installation complete"));

    if target.uses_metadata() {
        ctx.report(InstallProgress::new(METADATA_STEP, 0.0, "Copying IdP metadata"));
        if let Err(e) = install_metadata(ctx, &report) {
            ctx.report(InstallProgress::error(METADATA_STEP, e.to_string()));
            return Err(e);
        }
        ctx.report(InstallProgress::complete(METADATA_STEP, "IdP metadata in place"));
    }

    Ok(())
}
