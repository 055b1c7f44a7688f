pub mod errors;

pub use errors::{SpecbinError, SpecbinErrorCategory};

use crate::common::constants::{CM_TO_MICRON, MICRON_TO_CM};
use crate::numerics::{FluxMode, RebinError, validate_sampled_series};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum WavelengthUnit {
    #[default]
    Cm,
    Micron,
}

impl WavelengthUnit {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cm => "cm",
            Self::Micron => "micron",
        }
    }

    pub fn to_centimeters(self, wavelength: f64) -> f64 {
        match self {
            Self::Cm => wavelength,
            Self::Micron => wavelength * MICRON_TO_CM,
        }
    }

    pub fn from_centimeters(self, wavelength: f64) -> f64 {
        match self {
            Self::Cm => wavelength,
            Self::Micron => wavelength * CM_TO_MICRON,
        }
    }
}

impl FromStr for WavelengthUnit {
    type Err = RebinError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cm" | "centimeter" => Ok(Self::Cm),
            "micron" | "um" => Ok(Self::Micron),
            _ => Err(RebinError::UnknownUnit {
                unit: value.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for WavelengthUnit {
    type Error = RebinError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl Display for WavelengthUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum InterpolationMode {
    Linear,
    #[default]
    Log,
    Gaussian,
}

impl InterpolationMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Log => "log",
            Self::Gaussian => "gaussian",
        }
    }

    /// Interpolation law for the flux-conserving modes; `None` for the
    /// Gaussian convolution.
    pub const fn flux_mode(self) -> Option<FluxMode> {
        match self {
            Self::Linear => Some(FluxMode::Linear),
            Self::Log => Some(FluxMode::Log),
            Self::Gaussian => None,
        }
    }
}

impl FromStr for InterpolationMode {
    type Err = RebinError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(Self::Linear),
            "log" => Ok(Self::Log),
            "gaussian" => Ok(Self::Gaussian),
            _ => Err(RebinError::UnknownMode {
                mode: value.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for InterpolationMode {
    type Error = RebinError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl Display for InterpolationMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

/// Sampled spectrum: at least two strictly ascending, finite wavelengths with
/// one finite flux value each.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    wavelengths: Vec<f64>,
    flux: Vec<f64>,
}

impl Spectrum {
    pub fn new(wavelengths: Vec<f64>, flux: Vec<f64>) -> Result<Self, RebinError> {
        validate_sampled_series(&wavelengths, &flux)?;
        Ok(Self { wavelengths, flux })
    }

    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    pub fn flux(&self) -> &[f64] {
        &self.flux
    }

    pub fn len(&self) -> usize {
        self.wavelengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wavelengths.is_empty()
    }

    pub fn into_parts(self) -> (Vec<f64>, Vec<f64>) {
        (self.wavelengths, self.flux)
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.wavelengths
            .iter()
            .copied()
            .zip(self.flux.iter().copied())
    }
}
