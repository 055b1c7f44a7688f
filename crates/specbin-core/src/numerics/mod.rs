pub mod convolution;
pub mod error;
pub mod grid;
pub mod planck;
pub mod resample;

pub use convolution::{GaussianConvolutionInput, convolve_gaussian, gaussian_pdf};
pub use error::{RebinError, RebinErrorKind};
pub use grid::{bin_interfaces, clamp_outer_interfaces, geometric_grid};
pub use planck::{
    blackbody_extrapolation_table, planck_interval_average, planck_interval_integral,
    planck_wavelength,
};
pub use resample::{FluxMode, ResampleInput, resample_flux_conserving};

pub(crate) fn validate_grid(field: &'static str, grid: &[f64]) -> Result<(), RebinError> {
    for (index, value) in grid.iter().copied().enumerate() {
        if !value.is_finite() {
            return Err(RebinError::NonFiniteValue {
                field,
                index,
                value,
            });
        }

        if index > 0 {
            let previous = grid[index - 1];
            if value <= previous {
                return Err(RebinError::NonIncreasingGrid {
                    field,
                    index,
                    previous,
                    current: value,
                });
            }
        }
    }

    Ok(())
}

pub(crate) fn validate_values(field: &'static str, values: &[f64]) -> Result<(), RebinError> {
    match values
        .iter()
        .copied()
        .enumerate()
        .find(|(_, value)| !value.is_finite())
    {
        Some((index, value)) => Err(RebinError::NonFiniteValue {
            field,
            index,
            value,
        }),
        None => Ok(()),
    }
}

pub(crate) fn validate_sampled_series(wavelengths: &[f64], flux: &[f64]) -> Result<(), RebinError> {
    if wavelengths.len() < 2 {
        return Err(RebinError::InsufficientPoints {
            actual: wavelengths.len(),
        });
    }
    if flux.len() != wavelengths.len() {
        return Err(RebinError::LengthMismatch {
            field: "flux",
            expected: wavelengths.len(),
            actual: flux.len(),
        });
    }

    validate_grid("wavelength grid", wavelengths)?;
    validate_values("flux", flux)
}

/// Index of the grid entry closest to `target`; ties resolve to the lower index.
pub fn nearest_index(grid: &[f64], target: f64) -> Option<usize> {
    grid.iter()
        .copied()
        .enumerate()
        .min_by(|(lhs_index, lhs), (rhs_index, rhs)| {
            (lhs - target)
                .abs()
                .total_cmp(&(rhs - target).abs())
                .then_with(|| lhs_index.cmp(rhs_index))
        })
        .map(|(index, _)| index)
}

pub fn relative_difference(lhs: f64, rhs: f64, relative_floor: f64) -> f64 {
    let scale = lhs.abs().max(rhs.abs()).max(relative_floor);
    (lhs - rhs).abs() / scale
}

pub fn within_tolerance(
    lhs: f64,
    rhs: f64,
    abs_tol: f64,
    rel_tol: f64,
    relative_floor: f64,
) -> bool {
    let abs_diff = (lhs - rhs).abs();
    abs_diff <= abs_tol || relative_difference(lhs, rhs, relative_floor) <= rel_tol
}
