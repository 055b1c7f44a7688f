use super::planck::blackbody_extrapolation_table;
use super::{RebinError, bin_interfaces, validate_grid, validate_sampled_series};
use tracing::debug;

/// Interpolation law of the flux-conserving resampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FluxMode {
    /// Conserves the integral of the flux over each bin.
    Linear,
    /// Conserves the wavelength-weighted geometric mean; suited to opacities
    /// and other multiplicative quantities.
    Log,
}

impl FluxMode {
    const fn identity(self) -> f64 {
        match self {
            Self::Linear => 0.0,
            Self::Log => 1.0,
        }
    }

    fn interpolate(self, lower: (f64, f64), upper: (f64, f64), wavelength: f64) -> f64 {
        let (x0, f0) = lower;
        let (x1, f1) = upper;
        let span = x1 - x0;
        match self {
            Self::Linear => (f0 * (x1 - wavelength) + f1 * (wavelength - x0)) / span,
            Self::Log => (f0.powf(x1 - wavelength) * f1.powf(wavelength - x0)).powf(1.0 / span),
        }
    }

    fn accumulate(self, accumulated: f64, lower: (f64, f64), upper: (f64, f64)) -> f64 {
        let (x0, f0) = lower;
        let (x1, f1) = upper;
        match self {
            Self::Linear => accumulated + (f0 + f1) / 2.0 * (x1 - x0),
            Self::Log => accumulated * (f0 * f1).powf(0.5 * (x1 - x0)),
        }
    }

    fn normalize(self, accumulated: f64, width: f64) -> f64 {
        match self {
            Self::Linear => accumulated / width,
            Self::Log => accumulated.powf(1.0 / width),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResampleInput<'a> {
    pub wavelengths: &'a [f64],
    pub flux: &'a [f64],
    pub new_wavelengths: &'a [f64],
    /// Bin edges for `new_wavelengths`; derived with [`bin_interfaces`] when absent.
    pub interfaces: Option<&'a [f64]>,
    pub mode: FluxMode,
    /// Blackbody temperature [K] for bins outside the source domain; `0.0`
    /// leaves them at zero.
    pub extrapolation_temperature: f64,
}

impl<'a> ResampleInput<'a> {
    pub fn new(
        wavelengths: &'a [f64],
        flux: &'a [f64],
        new_wavelengths: &'a [f64],
        mode: FluxMode,
    ) -> Self {
        Self {
            wavelengths,
            flux,
            new_wavelengths,
            interfaces: None,
            mode,
            extrapolation_temperature: 0.0,
        }
    }

    pub fn with_interfaces(mut self, interfaces: &'a [f64]) -> Self {
        self.interfaces = Some(interfaces);
        self
    }

    pub fn with_extrapolation_temperature(mut self, temperature: f64) -> Self {
        self.extrapolation_temperature = temperature;
        self
    }
}

/// Energy-conserving conversion of a sampled spectrum onto a new grid.
///
/// Phase one interpolates the source flux at every bin edge that lies inside
/// the source domain. Phase two integrates the piecewise source spectrum
/// between the edges of each bin and normalizes by the bin width. Bins with an
/// edge outside the source domain take the blackbody extrapolation value.
pub fn resample_flux_conserving(input: ResampleInput<'_>) -> Result<Vec<f64>, RebinError> {
    validate_sampled_series(input.wavelengths, input.flux)?;
    if input.new_wavelengths.is_empty() {
        return Err(RebinError::InsufficientPoints { actual: 0 });
    }
    validate_grid("new wavelength grid", input.new_wavelengths)?;

    let interfaces = match input.interfaces {
        Some(interfaces) => {
            if interfaces.len() != input.new_wavelengths.len() + 1 {
                return Err(RebinError::LengthMismatch {
                    field: "bin interface grid",
                    expected: input.new_wavelengths.len() + 1,
                    actual: interfaces.len(),
                });
            }
            validate_grid("bin interface grid", interfaces)?;
            interfaces.to_vec()
        }
        None => bin_interfaces(input.new_wavelengths)?,
    };

    if input.mode == FluxMode::Log {
        if let Some((index, value)) = input
            .flux
            .iter()
            .copied()
            .enumerate()
            .find(|(_, value)| *value < 0.0)
        {
            return Err(RebinError::NegativeLogFlux { index, value });
        }
    }

    let extrapolation = blackbody_extrapolation_table(&interfaces, input.extrapolation_temperature)?;
    let edge_flux = interface_flux(input.wavelengths, input.flux, &interfaces, input.mode);
    debug!(
        source_points = input.wavelengths.len(),
        target_points = input.new_wavelengths.len(),
        covered_edges = edge_flux.iter().filter(|value| value.is_some()).count(),
        mode = ?input.mode,
        "resampling spectrum"
    );

    let new_flux: Vec<f64> = (0..input.new_wavelengths.len())
        .map(|index| match (edge_flux[index], edge_flux[index + 1]) {
            (Some(lower_flux), Some(upper_flux)) => accumulate_bin(
                input.mode,
                input.wavelengths,
                input.flux,
                (interfaces[index], lower_flux),
                (interfaces[index + 1], upper_flux),
            ),
            _ => extrapolation[index],
        })
        .collect();

    if let Some((index, value)) = new_flux
        .iter()
        .copied()
        .enumerate()
        .find(|(_, value)| !value.is_finite())
    {
        return Err(RebinError::NonFiniteResult { index, value });
    }

    Ok(new_flux)
}

/// Source flux interpolated at each bin edge, `None` outside the source domain.
///
/// Inputs must already be validated: at least two strictly increasing
/// wavelengths with matching flux.
pub(crate) fn interface_flux(
    wavelengths: &[f64],
    flux: &[f64],
    interfaces: &[f64],
    mode: FluxMode,
) -> Vec<Option<f64>> {
    let first = wavelengths[0];
    let last = wavelengths[wavelengths.len() - 1];

    interfaces
        .iter()
        .copied()
        .map(|edge| {
            if edge < first || edge > last {
                return None;
            }

            let lower = wavelengths
                .partition_point(|wavelength| *wavelength < edge)
                .saturating_sub(1);
            let upper = lower + 1;
            Some(mode.interpolate(
                (wavelengths[lower], flux[lower]),
                (wavelengths[upper], flux[upper]),
                edge,
            ))
        })
        .collect()
}

fn accumulate_bin(
    mode: FluxMode,
    wavelengths: &[f64],
    flux: &[f64],
    lower_edge: (f64, f64),
    upper_edge: (f64, f64),
) -> f64 {
    let start = wavelengths.partition_point(|wavelength| *wavelength < lower_edge.0);
    let interior = wavelengths[start..]
        .iter()
        .copied()
        .zip(flux[start..].iter().copied())
        .take_while(|(wavelength, _)| *wavelength < upper_edge.0);

    let mut previous = lower_edge;
    let mut accumulated = mode.identity();
    for node in interior.chain(std::iter::once(upper_edge)) {
        accumulated = mode.accumulate(accumulated, previous, node);
        previous = node;
    }

    mode.normalize(accumulated, upper_edge.0 - lower_edge.0)
}
