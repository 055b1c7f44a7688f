//! Physical constants and fixed conventions of the RT opacity tooling.
//!
//! CGS values follow the CODATA 2018 exact definitions.

/// Boltzmann constant [erg / K].
pub const K_B_CGS: f64 = 1.380_649e-16;
/// Planck constant [erg s].
pub const H_CGS: f64 = 6.626_070_15e-27;
/// Speed of light [cm / s].
pub const C_CGS: f64 = 2.997_924_58e10;

/// Rounded speed of light [m / s] used when sizing Doppler overlaps.
pub const C_DOPPLER_MKS: f64 = 3.0e8;

pub const MICRON_TO_CM: f64 = 1.0e-4;
pub const CM_TO_MICRON: f64 = 1.0e4;

/// Terms of the polylog series are summed for n in `1..PLANCK_SERIES_TERMS`.
pub const PLANCK_SERIES_TERMS: u32 = 200;

/// Gaussian contributions beyond this many half widths are dropped.
pub const GAUSSIAN_TRUNCATION_HWHM: f64 = 5.0;

/// Maximum line-of-sight velocity [m / s] the RT code Doppler shifts to.
pub const DEFAULT_DOPPLER_V_MAX: f64 = 11_463.5;
/// Extra wavelength blocks appended on top of the computed Doppler overlap.
pub const OVERLAP_SAFETY_MARGIN: usize = 20;
