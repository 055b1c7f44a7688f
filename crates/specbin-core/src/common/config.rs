//! JSON rebinning settings.
//!
//! Every field of a settings file is optional so that command-line flags can
//! fill the gaps; [`RebinSettingsFile::into_settings`] insists on a resolving
//! power once all layers are merged.

use crate::domain::{InterpolationMode, SpecbinError, WavelengthUnit};
use crate::numerics::RebinError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RebinSettings {
    pub resolution: f64,
    pub unit: WavelengthUnit,
    pub mode: InterpolationMode,
    pub extrapolation_temperature: f64,
}

impl RebinSettings {
    pub fn new(resolution: f64) -> Self {
        Self {
            resolution,
            unit: WavelengthUnit::default(),
            mode: InterpolationMode::default(),
            extrapolation_temperature: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RebinSettingsFile {
    #[serde(default)]
    pub resolution: Option<f64>,
    #[serde(default)]
    pub unit: Option<WavelengthUnit>,
    #[serde(default)]
    pub mode: Option<InterpolationMode>,
    #[serde(default)]
    pub extrapolation_temperature: Option<f64>,
}

impl RebinSettingsFile {
    /// Fields set in `overrides` win over fields set in `self`.
    pub fn merged_with(self, overrides: RebinSettingsFile) -> Self {
        Self {
            resolution: overrides.resolution.or(self.resolution),
            unit: overrides.unit.or(self.unit),
            mode: overrides.mode.or(self.mode),
            extrapolation_temperature: overrides
                .extrapolation_temperature
                .or(self.extrapolation_temperature),
        }
    }

    pub fn into_settings(self) -> Result<RebinSettings, SettingsError> {
        let resolution = self
            .resolution
            .ok_or(SettingsError::MissingField { field: "resolution" })?;

        Ok(RebinSettings {
            resolution,
            unit: self.unit.unwrap_or_default(),
            mode: self.mode.unwrap_or_default(),
            extrapolation_temperature: self.extrapolation_temperature.unwrap_or(0.0),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read rebin settings '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse rebin settings '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid rebin settings '{path}': {source}")]
    Invalid { path: PathBuf, source: RebinError },
    #[error("rebin settings are missing required field '{field}'")]
    MissingField { field: &'static str },
}

impl From<SettingsError> for SpecbinError {
    fn from(error: SettingsError) -> Self {
        match error {
            SettingsError::Read { .. } => {
                SpecbinError::io_system("IO.SETTINGS_READ", error.to_string())
            }
            SettingsError::Parse { .. } => {
                SpecbinError::input_validation("INPUT.SETTINGS_PARSE", error.to_string())
            }
            SettingsError::Invalid { ref source, .. } => {
                SpecbinError::input_validation(source.placeholder(), error.to_string())
            }
            SettingsError::MissingField { .. } => {
                SpecbinError::input_validation("INPUT.SETTINGS_MISSING", error.to_string())
            }
        }
    }
}

pub fn load_rebin_settings(
    settings_path: impl AsRef<Path>,
) -> Result<RebinSettingsFile, SettingsError> {
    let settings_path = settings_path.as_ref();
    let source = fs::read_to_string(settings_path).map_err(|source| SettingsError::Read {
        path: settings_path.to_path_buf(),
        source,
    })?;
    let raw: RawSettingsFile =
        serde_json::from_str(&source).map_err(|source| SettingsError::Parse {
            path: settings_path.to_path_buf(),
            source,
        })?;

    let invalid = |source: RebinError| SettingsError::Invalid {
        path: settings_path.to_path_buf(),
        source,
    };
    Ok(RebinSettingsFile {
        resolution: raw.resolution,
        unit: raw.unit.as_deref().map(str::parse).transpose().map_err(invalid)?,
        mode: raw.mode.as_deref().map(str::parse).transpose().map_err(invalid)?,
        extrapolation_temperature: raw.extrapolation_temperature,
    })
}

/// On-disk shape of a settings file. Unit and mode stay strings until
/// [`load_rebin_settings`] parses them, so a bad name reports the same error
/// as the command line.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawSettingsFile {
    #[serde(default)]
    resolution: Option<f64>,
    #[serde(default)]
    unit: Option<String>,
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    extrapolation_temperature: Option<f64>,
}
