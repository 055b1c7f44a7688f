use super::{RebinError, validate_grid, validate_sampled_series};
use crate::common::constants::GAUSSIAN_TRUNCATION_HWHM;
use std::f64::consts::{LN_2, PI};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianConvolutionInput<'a> {
    pub wavelengths: &'a [f64],
    pub flux: &'a [f64],
    pub new_wavelengths: &'a [f64],
    pub resolution: f64,
}

impl<'a> GaussianConvolutionInput<'a> {
    pub fn new(
        wavelengths: &'a [f64],
        flux: &'a [f64],
        new_wavelengths: &'a [f64],
        resolution: f64,
    ) -> Self {
        Self {
            wavelengths,
            flux,
            new_wavelengths,
            resolution,
        }
    }
}

/// Normalized Gaussian with half width at half maximum `hwhm`.
pub fn gaussian_pdf(x: f64, center: f64, hwhm: f64) -> f64 {
    let scaled = (x - center) / hwhm;
    (LN_2 / PI).sqrt() / hwhm * (-LN_2 * scaled * scaled).exp()
}

/// Smooth the source spectrum with a Gaussian line-spread function of FWHM
/// `lambda / R`, evaluated at each of `new_wavelengths`.
///
/// Each source point is weighted by its local grid width. Source points more
/// than five half widths from the target are ignored, so the result is not
/// strictly energy conserving.
pub fn convolve_gaussian(input: GaussianConvolutionInput<'_>) -> Result<Vec<f64>, RebinError> {
    validate_sampled_series(input.wavelengths, input.flux)?;
    if !input.resolution.is_finite() || input.resolution <= 0.0 {
        return Err(RebinError::InvalidResolution {
            value: input.resolution,
        });
    }
    if input.new_wavelengths.is_empty() {
        return Err(RebinError::InsufficientPoints { actual: 0 });
    }
    validate_grid("new wavelength grid", input.new_wavelengths)?;
    if input.new_wavelengths[0] <= 0.0 {
        return Err(RebinError::InvalidGridStart {
            value: input.new_wavelengths[0],
        });
    }

    let widths = local_widths(input.wavelengths);
    debug!(
        source_points = input.wavelengths.len(),
        target_points = input.new_wavelengths.len(),
        resolution = input.resolution,
        "convolving spectrum with gaussian kernel"
    );

    let convolved = input
        .new_wavelengths
        .iter()
        .copied()
        .map(|target| {
            let hwhm = target / (2.0 * input.resolution);
            let cutoff = GAUSSIAN_TRUNCATION_HWHM * hwhm;
            let start = input
                .wavelengths
                .partition_point(|wavelength| wavelength - target < -cutoff);

            let mut value = 0.0;
            for index in start..input.wavelengths.len() {
                let wavelength = input.wavelengths[index];
                if wavelength - target > cutoff {
                    break;
                }
                value += input.flux[index] * gaussian_pdf(target, wavelength, hwhm) * widths[index];
            }
            value
        })
        .collect();

    Ok(convolved)
}

/// Width represented by each grid point: half the distance between its
/// neighbours, one-sided at the two ends.
fn local_widths(grid: &[f64]) -> Vec<f64> {
    let last = grid.len() - 1;
    (0..grid.len())
        .map(|index| match index {
            0 => grid[1] - grid[0],
            _ if index == last => grid[last] - grid[last - 1],
            _ => (grid[index + 1] - grid[index - 1]) / 2.0,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{GaussianConvolutionInput, convolve_gaussian, gaussian_pdf, local_widths};
    use crate::numerics::RebinError;

    fn uniform_grid(start: f64, step: f64, count: usize) -> Vec<f64> {
        (0..count).map(|index| start + step * index as f64).collect()
    }

    fn measured_fwhm(grid: &[f64], values: &[f64]) -> f64 {
        let peak = values.iter().copied().fold(f64::MIN, f64::max);
        let half = peak / 2.0;
        let first = values
            .iter()
            .position(|value| *value >= half)
            .expect("profile rises above half maximum");
        let last = values
            .iter()
            .rposition(|value| *value >= half)
            .expect("profile falls below half maximum");

        let crossing = |inside: usize, outside: usize| {
            let t = (half - values[outside]) / (values[inside] - values[outside]);
            grid[outside] + t * (grid[inside] - grid[outside])
        };
        crossing(last, last + 1) - crossing(first, first - 1)
    }

    #[test]
    fn pdf_is_normalized_with_requested_half_width() {
        let hwhm = 0.3;
        let grid = uniform_grid(-5.0, 1.0e-3, 10_001);
        let area: f64 = grid.iter().map(|x| gaussian_pdf(*x, 0.0, hwhm) * 1.0e-3).sum();
        assert!((area - 1.0).abs() < 1.0e-6, "area={area}");

        let peak = gaussian_pdf(0.0, 0.0, hwhm);
        let at_half_width = gaussian_pdf(hwhm, 0.0, hwhm);
        assert!((at_half_width / peak - 0.5).abs() < 1.0e-12);
    }

    #[test]
    fn local_widths_use_one_sided_differences_at_edges() {
        assert_eq!(local_widths(&[1.0, 2.0, 4.0, 8.0]), vec![1.0, 1.5, 3.0, 4.0]);
    }

    #[test]
    fn constant_flux_is_preserved_away_from_edges() {
        let grid = uniform_grid(1.0, 1.0e-4, 10_001);
        let flux = vec![3.0; grid.len()];
        let targets = [1.3, 1.5, 1.7];

        let result =
            convolve_gaussian(GaussianConvolutionInput::new(&grid, &flux, &targets, 100.0))
                .expect("convolution");
        for value in result {
            assert!((value - 3.0).abs() < 1.0e-6, "value={value}");
        }
    }

    #[test]
    fn spike_profile_width_scales_with_wavelength_over_resolution() {
        let grid = uniform_grid(0.9, 1.0e-5, 20_001);
        let mut flux = vec![0.0; grid.len()];
        flux[10_000] = 1.0;
        let targets = uniform_grid(0.95, 1.0e-4, 1_001);

        for resolution in [100.0, 200.0] {
            let profile =
                convolve_gaussian(GaussianConvolutionInput::new(&grid, &flux, &targets, resolution))
                    .expect("convolution");
            let fwhm = measured_fwhm(&targets, &profile);
            let expected = grid[10_000] / resolution;
            let rel = (fwhm - expected).abs() / expected;
            assert!(rel < 0.02, "R={resolution} fwhm={fwhm} expected={expected}");
        }
    }

    #[test]
    fn contributions_beyond_five_half_widths_are_dropped() {
        let grid = [0.9, 1.0, 1.1];
        let flux = [0.0, 1.0, 0.0];
        let resolution = 100.0;
        let target = 1.04;
        let hwhm = target / (2.0 * resolution);
        assert!(target - grid[1] > 5.0 * hwhm);

        let result =
            convolve_gaussian(GaussianConvolutionInput::new(&grid, &flux, &[target], resolution))
                .expect("convolution");
        assert_eq!(result, vec![0.0]);
    }

    #[test]
    fn convolution_rejects_invalid_inputs() {
        let error = convolve_gaussian(GaussianConvolutionInput::new(
            &[1.0, 2.0],
            &[1.0, 1.0],
            &[1.5],
            0.0,
        ))
        .expect_err("zero resolution should fail");
        assert_eq!(error, RebinError::InvalidResolution { value: 0.0 });

        let error = convolve_gaussian(GaussianConvolutionInput::new(
            &[1.0],
            &[1.0],
            &[1.5],
            10.0,
        ))
        .expect_err("single point should fail");
        assert_eq!(error, RebinError::InsufficientPoints { actual: 1 });
    }
}
