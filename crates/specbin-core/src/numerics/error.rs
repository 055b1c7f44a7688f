use crate::domain::SpecbinError;

/// Coarse classification of [`RebinError`] variants.
///
/// Every kernel failure falls into exactly one of these kinds; callers that
/// only care about the class of failure match on the kind instead of the
/// detailed variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RebinErrorKind {
    InvalidParameter,
    EmptyInput,
    InvalidMode,
    NonMonotonicGrid,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RebinError {
    #[error("rebinning requires at least 2 wavelength points, got {actual}")]
    InsufficientPoints { actual: usize },
    #[error("unknown interpolation mode '{mode}', expected 'linear', 'log' or 'gaussian'")]
    UnknownMode { mode: String },
    #[error("unknown wavelength unit '{unit}', expected 'cm' or 'micron'")]
    UnknownUnit { unit: String },
    #[error("resolving power must be finite and > 0, got {value}")]
    InvalidResolution { value: f64 },
    #[error("geometric grid start must be finite and > 0, got {value}")]
    InvalidGridStart { value: f64 },
    #[error(
        "resolving power {resolution} yields {points} grid point(s) on [{start}, {end}], at least 2 are required"
    )]
    GridTooCoarse {
        resolution: f64,
        start: f64,
        end: f64,
        points: usize,
    },
    #[error("{field} length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("{field} entry must be finite at index {index}, got {value}")]
    NonFiniteValue {
        field: &'static str,
        index: usize,
        value: f64,
    },
    #[error(
        "{field} must be strictly increasing, index {index} has {current} after {previous}"
    )]
    NonIncreasingGrid {
        field: &'static str,
        index: usize,
        previous: f64,
        current: f64,
    },
    #[error("blackbody temperature must be finite and >= 0, got {value}")]
    InvalidTemperature { value: f64 },
    #[error("blackbody interval must have positive width, got [{lower}, {upper}]")]
    DegenerateInterval { lower: f64, upper: f64 },
    #[error("logarithmic interpolation requires non-negative flux, index {index} has {value}")]
    NegativeLogFlux { index: usize, value: f64 },
    #[error("resampling produced a non-finite flux at output index {index}: {value}")]
    NonFiniteResult { index: usize, value: f64 },
}

impl RebinError {
    pub const fn kind(&self) -> RebinErrorKind {
        match self {
            Self::InsufficientPoints { .. } => RebinErrorKind::EmptyInput,
            Self::UnknownMode { .. } => RebinErrorKind::InvalidMode,
            Self::NonIncreasingGrid { .. } => RebinErrorKind::NonMonotonicGrid,
            Self::UnknownUnit { .. }
            | Self::InvalidResolution { .. }
            | Self::InvalidGridStart { .. }
            | Self::GridTooCoarse { .. }
            | Self::LengthMismatch { .. }
            | Self::NonFiniteValue { .. }
            | Self::InvalidTemperature { .. }
            | Self::DegenerateInterval { .. }
            | Self::NegativeLogFlux { .. }
            | Self::NonFiniteResult { .. } => RebinErrorKind::InvalidParameter,
        }
    }

    pub const fn placeholder(&self) -> &'static str {
        match self {
            Self::InsufficientPoints { .. } => "INPUT.REBIN_EMPTY",
            Self::UnknownMode { .. } => "INPUT.REBIN_MODE",
            Self::UnknownUnit { .. } => "INPUT.REBIN_UNIT",
            Self::InvalidResolution { .. } => "INPUT.REBIN_RESOLUTION",
            Self::InvalidGridStart { .. } | Self::GridTooCoarse { .. } => "INPUT.REBIN_GRID",
            Self::LengthMismatch { .. } => "INPUT.REBIN_LENGTH",
            Self::NonFiniteValue { .. } => "INPUT.REBIN_NON_FINITE",
            Self::NonIncreasingGrid { .. } => "INPUT.REBIN_NON_MONOTONIC",
            Self::InvalidTemperature { .. } => "INPUT.REBIN_TEMPERATURE",
            Self::DegenerateInterval { .. } => "INPUT.REBIN_INTERVAL",
            Self::NegativeLogFlux { .. } => "INPUT.REBIN_LOG_FLUX",
            Self::NonFiniteResult { .. } => "RUN.REBIN_NON_FINITE",
        }
    }
}

impl From<RebinError> for SpecbinError {
    fn from(error: RebinError) -> Self {
        match error {
            RebinError::NonFiniteResult { .. } => {
                SpecbinError::computation(error.placeholder(), error.to_string())
            }
            _ => SpecbinError::input_validation(error.placeholder(), error.to_string()),
        }
    }
}
