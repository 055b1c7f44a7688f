use super::CliError;
use anyhow::Context;
use specbin_core::common::config::{RebinSettings, RebinSettingsFile, load_rebin_settings};
use specbin_core::domain::{InterpolationMode, SpecbinError, WavelengthUnit};
use std::fs;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber. `RUST_LOG` wins unless `--verbose` is set.
pub(super) fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    // A second init in the same process keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub(super) fn compute_error(error: impl Into<SpecbinError>) -> CliError {
    CliError::Compute(error.into())
}

pub(super) fn parse_unit(value: Option<&str>) -> Result<Option<WavelengthUnit>, CliError> {
    value
        .map(|value| value.parse::<WavelengthUnit>().map_err(compute_error))
        .transpose()
}

pub(super) fn parse_mode(value: Option<&str>) -> Result<Option<InterpolationMode>, CliError> {
    value
        .map(|value| value.parse::<InterpolationMode>().map_err(compute_error))
        .transpose()
}

/// Settings file values overlaid with command-line flags.
pub(super) fn resolve_settings(
    config: Option<&Path>,
    overrides: RebinSettingsFile,
) -> Result<RebinSettings, CliError> {
    let from_file = match config {
        Some(path) => load_rebin_settings(path).map_err(compute_error)?,
        None => RebinSettingsFile::default(),
    };
    from_file
        .merged_with(overrides)
        .into_settings()
        .map_err(compute_error)
}

pub(super) fn ensure_parent_dir(path: &Path) -> Result<(), CliError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}
