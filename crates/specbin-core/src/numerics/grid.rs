use super::{RebinError, validate_grid};

/// Geometric wavelength grid of constant resolving power `resolution`.
///
/// Starts at `start` and multiplies by `(R + 1) / R` while the point stays
/// strictly below `end`, so the last point is always `< end`.
pub fn geometric_grid(start: f64, end: f64, resolution: f64) -> Result<Vec<f64>, RebinError> {
    let step = (resolution + 1.0) / resolution;
    // Past 2^53 the step rounds to exactly 1 and the grid would never end.
    if !resolution.is_finite() || resolution <= 0.0 || step <= 1.0 {
        return Err(RebinError::InvalidResolution { value: resolution });
    }
    if !start.is_finite() || start <= 0.0 {
        return Err(RebinError::InvalidGridStart { value: start });
    }
    if !end.is_finite() {
        return Err(RebinError::NonFiniteValue {
            field: "grid end",
            index: 0,
            value: end,
        });
    }

    let mut grid = Vec::new();
    let mut point = start;
    while point < end {
        grid.push(point);
        point *= step;
    }

    Ok(grid)
}

/// Bin edges around each grid point: midpoints between neighbours, with the
/// two outer edges mirrored by half of the adjacent spacing.
pub fn bin_interfaces(grid: &[f64]) -> Result<Vec<f64>, RebinError> {
    if grid.len() < 2 {
        return Err(RebinError::InsufficientPoints { actual: grid.len() });
    }
    validate_grid("new wavelength grid", grid)?;

    let last = grid.len() - 1;
    let mut interfaces = Vec::with_capacity(grid.len() + 1);
    interfaces.push(grid[0] - (grid[1] - grid[0]) / 2.0);
    interfaces.extend(grid.windows(2).map(|pair| (pair[1] + pair[0]) / 2.0));
    interfaces.push(grid[last] + (grid[last] - grid[last - 1]) / 2.0);

    validate_grid("bin interface grid", &interfaces)?;
    Ok(interfaces)
}

/// Pull the outermost bin edges back inside `[domain_start, domain_end]`.
///
/// Only the first and last edge move; the result is still checked for strict
/// monotonicity because a grid point sitting on the domain boundary would
/// collapse its outer bin.
pub fn clamp_outer_interfaces(
    interfaces: &[f64],
    domain_start: f64,
    domain_end: f64,
) -> Result<Vec<f64>, RebinError> {
    let mut clamped = interfaces.to_vec();
    if let Some(first) = clamped.first_mut() {
        *first = first.max(domain_start);
    }
    if let Some(last) = clamped.last_mut() {
        *last = last.min(domain_end);
    }

    validate_grid("bin interface grid", &clamped)?;
    Ok(clamped)
}
