//! Resolution-driven rebinning of a sampled spectrum.
//!
//! The new grid is geometric with constant resolving power `R`, starting at
//! the first source wavelength and stopping below the last one. Flux is
//! carried over by the flux-conserving resampler (linear or log mode) or by
//! the Gaussian convolution.

use crate::common::config::RebinSettings;
use crate::domain::{InterpolationMode, Spectrum, WavelengthUnit};
use crate::numerics::{
    GaussianConvolutionInput, RebinError, ResampleInput, bin_interfaces, clamp_outer_interfaces,
    convolve_gaussian, geometric_grid, resample_flux_conserving, validate_sampled_series,
};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RebinInput<'a> {
    pub wavelengths: &'a [f64],
    pub flux: &'a [f64],
    pub resolution: f64,
    pub unit: WavelengthUnit,
    pub mode: InterpolationMode,
    pub extrapolation_temperature: f64,
}

impl<'a> RebinInput<'a> {
    pub fn new(wavelengths: &'a [f64], flux: &'a [f64], resolution: f64) -> Self {
        Self {
            wavelengths,
            flux,
            resolution,
            unit: WavelengthUnit::default(),
            mode: InterpolationMode::default(),
            extrapolation_temperature: 0.0,
        }
    }

    pub fn from_settings(spectrum: &'a Spectrum, settings: &RebinSettings) -> Self {
        Self::new(spectrum.wavelengths(), spectrum.flux(), settings.resolution)
            .with_unit(settings.unit)
            .with_mode(settings.mode)
            .with_extrapolation_temperature(settings.extrapolation_temperature)
    }

    pub fn with_unit(mut self, unit: WavelengthUnit) -> Self {
        self.unit = unit;
        self
    }

    pub fn with_mode(mut self, mode: InterpolationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_extrapolation_temperature(mut self, temperature: f64) -> Self {
        self.extrapolation_temperature = temperature;
        self
    }
}

/// Rebin a spectrum onto the geometric grid of resolving power `R`.
///
/// Wavelengths of the result are expressed in the input unit. With a zero
/// extrapolation temperature the outer bin edges are pulled inside the
/// source domain, so every output bin is fully covered by source data.
pub fn rebin_to_resolution(input: RebinInput<'_>) -> Result<Spectrum, RebinError> {
    if input.wavelengths.len() < 2 {
        return Err(RebinError::InsufficientPoints {
            actual: input.wavelengths.len(),
        });
    }
    if !input.resolution.is_finite() || input.resolution <= 0.0 {
        return Err(RebinError::InvalidResolution {
            value: input.resolution,
        });
    }

    let wavelengths: Vec<f64> = input
        .wavelengths
        .iter()
        .map(|wavelength| input.unit.to_centimeters(*wavelength))
        .collect();
    validate_sampled_series(&wavelengths, input.flux)?;
    let start = wavelengths[0];
    let end = wavelengths[wavelengths.len() - 1];

    let grid = geometric_grid(start, end, input.resolution)?;
    if grid.len() < 2 {
        return Err(RebinError::GridTooCoarse {
            resolution: input.resolution,
            start,
            end,
            points: grid.len(),
        });
    }
    debug!(
        source_points = wavelengths.len(),
        target_points = grid.len(),
        resolution = input.resolution,
        unit = %input.unit,
        mode = %input.mode,
        "rebinning spectrum to constant resolving power"
    );

    let flux = match input.mode.flux_mode() {
        Some(flux_mode) => {
            let mut interfaces = bin_interfaces(&grid)?;
            if input.extrapolation_temperature == 0.0 {
                interfaces = clamp_outer_interfaces(&interfaces, start, end)?;
            }
            resample_flux_conserving(
                ResampleInput::new(&wavelengths, input.flux, &grid, flux_mode)
                    .with_interfaces(&interfaces)
                    .with_extrapolation_temperature(input.extrapolation_temperature),
            )?
        }
        None => convolve_gaussian(GaussianConvolutionInput::new(
            &wavelengths,
            input.flux,
            &grid,
            input.resolution,
        ))?,
    };

    let grid = grid
        .into_iter()
        .map(|wavelength| input.unit.from_centimeters(wavelength))
        .collect();
    Spectrum::new(grid, flux)
}

pub fn rebin_spectrum(spectrum: &Spectrum, settings: &RebinSettings) -> Result<Spectrum, RebinError> {
    rebin_to_resolution(RebinInput::from_settings(spectrum, settings))
}

#[cfg(test)]
mod tests {
    use super::{RebinInput, rebin_spectrum, rebin_to_resolution};
    use crate::common::config::RebinSettings;
    use crate::domain::{InterpolationMode, Spectrum, WavelengthUnit};
    use crate::numerics::{RebinError, RebinErrorKind, geometric_grid, planck_interval_integral};
    use std::f64::consts::PI;

    const OLD_GRID_CM: [f64; 4] = [1.0e-4, 2.0e-4, 3.0e-4, 4.0e-4];

    fn assert_close(actual: f64, expected: f64, rel_tol: f64) {
        let scale = expected.abs().max(1.0e-300);
        assert!(
            (actual - expected).abs() / scale <= rel_tol,
            "actual={actual} expected={expected}"
        );
    }

    #[test]
    fn constant_spectrum_rebins_to_the_constant_in_every_mode() {
        let flux = [1.0; 4];
        for mode in [InterpolationMode::Linear, InterpolationMode::Log] {
            let rebinned = rebin_to_resolution(
                RebinInput::new(&OLD_GRID_CM, &flux, 2.0).with_mode(mode),
            )
            .expect("rebin");

            let expected_grid = [1.0e-4, 1.5e-4, 2.25e-4, 3.375e-4];
            assert_eq!(rebinned.len(), expected_grid.len());
            for (actual, expected) in rebinned.wavelengths().iter().zip(expected_grid) {
                assert_close(*actual, expected, 1.0e-12);
            }
            for value in rebinned.flux() {
                assert_close(*value, 1.0, 1.0e-12);
            }
        }

        let irregular = [1.0, 1.1, 1.7, 2.05, 3.3, 3.4, 5.0];
        let flux = [2.5; 7];
        for resolution in [3.0, 17.0, 250.0] {
            let rebinned = rebin_to_resolution(
                RebinInput::new(&irregular, &flux, resolution).with_mode(InterpolationMode::Linear),
            )
            .expect("rebin");
            for value in rebinned.flux() {
                assert_close(*value, 2.5, 1.0e-10);
            }
        }
    }

    #[test]
    fn rebinning_a_geometric_grid_at_its_own_resolution_is_nearly_idempotent() {
        let resolution = 100.0;
        let old_grid = geometric_grid(1.0, 2.0, resolution).expect("grid");
        let flux: Vec<f64> = old_grid.iter().map(|x| 1.0 + 0.5 * (3.0 * x).sin()).collect();

        for mode in [InterpolationMode::Linear, InterpolationMode::Log] {
            let rebinned = rebin_to_resolution(
                RebinInput::new(&old_grid, &flux, resolution).with_mode(mode),
            )
            .expect("rebin");
            assert_eq!(rebinned.len(), old_grid.len() - 1);
            assert_eq!(rebinned.wavelengths(), &old_grid[..old_grid.len() - 1]);

            let interior = 1..rebinned.len() - 1;
            for index in interior {
                assert_close(rebinned.flux()[index], flux[index], 1.0e-3);
            }
        }
    }

    #[test]
    fn micron_and_centimeter_inputs_agree_after_conversion() {
        let microns = [1.0, 2.0, 3.0, 4.0];
        let flux = [1.0, 2.0, 3.0, 4.0];

        let in_microns = rebin_to_resolution(
            RebinInput::new(&microns, &flux, 5.0)
                .with_unit(WavelengthUnit::Micron)
                .with_mode(InterpolationMode::Linear),
        )
        .expect("micron rebin");
        let in_cm = rebin_to_resolution(
            RebinInput::new(&OLD_GRID_CM, &flux, 5.0).with_mode(InterpolationMode::Linear),
        )
        .expect("cm rebin");

        assert_eq!(in_microns.len(), in_cm.len());
        for (micron, cm) in in_microns.wavelengths().iter().zip(in_cm.wavelengths()) {
            assert_close(micron * 1.0e-4, *cm, 1.0e-12);
        }
        for (lhs, rhs) in in_microns.flux().iter().zip(in_cm.flux()) {
            assert_close(*lhs, *rhs, 1.0e-12);
        }
    }

    #[test]
    fn gaussian_mode_smooths_onto_the_same_grid() {
        let grid = geometric_grid(1.0, 1.5, 2_000.0).expect("grid");
        let flux = vec![4.0; grid.len()];
        let rebinned = rebin_to_resolution(
            RebinInput::new(&grid, &flux, 50.0).with_mode(InterpolationMode::Gaussian),
        )
        .expect("gaussian rebin");

        let expected_grid = geometric_grid(1.0, grid[grid.len() - 1], 50.0).expect("grid");
        assert_eq!(rebinned.wavelengths(), expected_grid.as_slice());
        let middle = rebinned.len() / 2;
        assert_close(rebinned.flux()[middle], 4.0, 1.0e-3);
    }

    #[test]
    fn extrapolation_fills_out_of_domain_bins_with_blackbody_values() {
        let flux = [1.0; 4];
        let without = rebin_to_resolution(
            RebinInput::new(&OLD_GRID_CM, &flux, 2.0).with_mode(InterpolationMode::Linear),
        )
        .expect("rebin");
        assert!(without.flux().iter().all(|value| *value > 0.0));

        let temperature = 3_000.0;
        let with = rebin_to_resolution(
            RebinInput::new(&OLD_GRID_CM, &flux, 2.0)
                .with_mode(InterpolationMode::Linear)
                .with_extrapolation_temperature(temperature),
        )
        .expect("rebin");

        // First bin spans [0.75e-4, 1.25e-4] and leaves the source domain.
        let (lower, upper) = (0.75e-4, 1.25e-4);
        let expected = PI * planck_interval_integral(temperature, lower, upper).expect("integral")
            / (upper - lower);
        assert_close(with.flux()[0], expected, 1.0e-9);
        assert!(with.flux()[0] > 0.0);
        assert_close(with.flux()[1], 1.0, 1.0e-12);
    }

    #[test]
    fn settings_drive_the_rebin() {
        let spectrum = Spectrum::new(vec![1.0, 2.0, 3.0, 4.0], vec![1.0; 4]).expect("spectrum");
        let mut settings = RebinSettings::new(2.0);
        settings.unit = WavelengthUnit::Micron;
        settings.mode = InterpolationMode::Linear;

        let rebinned = rebin_spectrum(&spectrum, &settings).expect("rebin");
        assert_eq!(rebinned.len(), 4);
        assert_close(rebinned.wavelengths()[3], 3.375, 1.0e-12);
    }

    #[test]
    fn invalid_requests_map_to_their_error_kinds() {
        let flux = [1.0; 4];
        for resolution in [0.0, -3.0, f64::NAN] {
            let error = rebin_to_resolution(RebinInput::new(&OLD_GRID_CM, &flux, resolution))
                .expect_err("resolution must be positive");
            assert_eq!(error.kind(), RebinErrorKind::InvalidParameter);
        }

        let error = rebin_to_resolution(RebinInput::new(&[1.0e-4], &[1.0], 10.0))
            .expect_err("single point should fail");
        assert_eq!(error.kind(), RebinErrorKind::EmptyInput);

        let error = "bogus"
            .parse::<InterpolationMode>()
            .expect_err("unknown mode should fail");
        assert_eq!(error.kind(), RebinErrorKind::InvalidMode);

        let error = rebin_to_resolution(RebinInput::new(&[3.0, 2.0, 1.0], &[1.0; 3], 10.0))
            .expect_err("descending grid should fail");
        assert_eq!(error.kind(), RebinErrorKind::NonMonotonicGrid);

        let error = rebin_to_resolution(RebinInput::new(&[1.0, 1.01], &[1.0; 2], 0.5))
            .expect_err("single grid point should fail");
        assert!(matches!(error, RebinError::GridTooCoarse { points: 1, .. }));
    }
}
