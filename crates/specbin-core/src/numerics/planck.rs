use super::{RebinError, validate_grid};
use crate::common::constants::{C_CGS, H_CGS, K_B_CGS, PLANCK_SERIES_TERMS};
use std::f64::consts::PI;

/// Planck spectral radiance `B_lambda(T)` [erg s^-1 cm^-2 cm^-1 sr^-1] at a
/// wavelength given in cm.
pub fn planck_wavelength(wavelength: f64, temperature: f64) -> f64 {
    let exponent = H_CGS * C_CGS / (wavelength * K_B_CGS * temperature);
    2.0 * H_CGS * C_CGS * C_CGS / wavelength.powi(5) / exponent.exp_m1()
}

/// Integral of `B_lambda(T)` over `[lower, upper]` (cm).
///
/// Uses the series `int_y^inf x^3 / (e^x - 1) dx = sum_n e^(-n y) (y^3/n +
/// 3 y^2/n^2 + 6 y/n^3 + 6/n^4)` with `y = h c / (lambda k T)`.
pub fn planck_interval_integral(
    temperature: f64,
    lower: f64,
    upper: f64,
) -> Result<f64, RebinError> {
    validate_interval(temperature, lower, upper)?;

    let prefactor = 2.0 * (K_B_CGS / H_CGS).powi(3) * K_B_CGS * temperature.powi(4)
        / (C_CGS * C_CGS);
    let y_top = H_CGS * C_CGS / (upper * K_B_CGS * temperature);
    let y_bottom = H_CGS * C_CGS / (lower * K_B_CGS * temperature);

    let mut series = 0.0;
    for n in 1..PLANCK_SERIES_TERMS {
        let n = f64::from(n);
        series += tail_term(y_top, n) - tail_term(y_bottom, n);
    }

    Ok(prefactor * series)
}

/// [`planck_interval_integral`] divided by the interval width.
pub fn planck_interval_average(
    temperature: f64,
    lower: f64,
    upper: f64,
) -> Result<f64, RebinError> {
    Ok(planck_interval_integral(temperature, lower, upper)? / (upper - lower))
}

/// Per-bin blackbody surface flux (`pi` times the interval-averaged
/// radiance) for every bin delimited by `interfaces`.
///
/// A temperature of exactly zero disables extrapolation and yields zeros.
pub fn blackbody_extrapolation_table(
    interfaces: &[f64],
    temperature: f64,
) -> Result<Vec<f64>, RebinError> {
    if !temperature.is_finite() || temperature < 0.0 {
        return Err(RebinError::InvalidTemperature { value: temperature });
    }

    let bin_count = interfaces.len().saturating_sub(1);
    if temperature == 0.0 {
        return Ok(vec![0.0; bin_count]);
    }

    validate_grid("bin interface grid", interfaces)?;
    interfaces
        .windows(2)
        .map(|edges| Ok(PI * planck_interval_average(temperature, edges[0], edges[1])?))
        .collect()
}

fn tail_term(y: f64, n: f64) -> f64 {
    (-n * y).exp() * (y.powi(3) / n + 3.0 * y * y / (n * n) + 6.0 * y / n.powi(3) + 6.0 / n.powi(4))
}

fn validate_interval(temperature: f64, lower: f64, upper: f64) -> Result<(), RebinError> {
    if !temperature.is_finite() || temperature <= 0.0 {
        return Err(RebinError::InvalidTemperature { value: temperature });
    }
    if !lower.is_finite() || !upper.is_finite() || lower <= 0.0 || upper <= lower {
        return Err(RebinError::DegenerateInterval { lower, upper });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        blackbody_extrapolation_table, planck_interval_average, planck_interval_integral,
        planck_wavelength,
    };
    use crate::numerics::RebinError;
    use std::f64::consts::PI;

    #[test]
    fn narrow_interval_average_matches_point_radiance() {
        let temperature = 5_000.0;
        let center = 1.0e-4;
        let width = 1.0e-8;
        let average =
            planck_interval_average(temperature, center - width / 2.0, center + width / 2.0)
                .expect("average");
        let expected = planck_wavelength(center, temperature);
        let rel = (average - expected).abs() / expected;
        assert!(rel < 1.0e-6, "average={average:e} expected={expected:e} rel={rel:e}");

        let integral =
            planck_interval_integral(temperature, center - width / 2.0, center + width / 2.0)
                .expect("integral");
        let rel = (integral - expected * width).abs() / (expected * width);
        assert!(rel < 1.0e-6, "integral={integral:e} rel={rel:e}");
    }

    #[test]
    fn wide_interval_matches_stefan_boltzmann_fraction() {
        // Almost the whole spectrum: 1 nm to 10 m at 6000 K.
        let temperature = 6_000.0;
        let integral = planck_interval_integral(temperature, 1.0e-7, 1.0e3).expect("integral");
        let sigma = 5.670_374_419e-5;
        let expected = sigma * temperature.powi(4) / PI;
        let rel = (integral - expected).abs() / expected;
        assert!(rel < 1.0e-4, "integral={integral:e} expected={expected:e}");
    }

    #[test]
    fn interval_rejects_degenerate_inputs() {
        assert_eq!(
            planck_interval_average(1_000.0, 2.0e-4, 2.0e-4),
            Err(RebinError::DegenerateInterval {
                lower: 2.0e-4,
                upper: 2.0e-4,
            })
        );
        assert_eq!(
            planck_interval_integral(0.0, 1.0e-4, 2.0e-4),
            Err(RebinError::InvalidTemperature { value: 0.0 })
        );
    }

    #[test]
    fn extrapolation_table_is_zero_when_disabled() {
        let table = blackbody_extrapolation_table(&[1.0e-4, 2.0e-4, 3.0e-4], 0.0).expect("table");
        assert_eq!(table, vec![0.0, 0.0]);
    }

    #[test]
    fn extrapolation_table_scales_average_by_pi() {
        let interfaces = [1.0e-4, 1.1e-4, 1.3e-4];
        let table = blackbody_extrapolation_table(&interfaces, 3_000.0).expect("table");
        assert_eq!(table.len(), 2);
        for (index, value) in table.iter().enumerate() {
            let average =
                planck_interval_average(3_000.0, interfaces[index], interfaces[index + 1])
                    .expect("average");
            assert!(*value > 0.0);
            assert!((value - PI * average).abs() <= 1.0e-12 * value.abs());
        }
    }

    #[test]
    fn extrapolation_table_rejects_negative_temperature() {
        assert_eq!(
            blackbody_extrapolation_table(&[1.0, 2.0], -10.0),
            Err(RebinError::InvalidTemperature { value: -10.0 })
        );
    }
}
