use super::{
    OpacityFormatError, OpacityTable, PressureRow, WavelengthBlock, read_opacity_table,
    write_opacity_table,
};
use crate::domain::{InterpolationMode, SpecbinError, WavelengthUnit};
use crate::numerics::RebinError;
use crate::rebin::{RebinInput, rebin_to_resolution};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum OpacityRebinError {
    #[error("pressure row {pressure_index}, temperature column {temperature_index}: {source}")]
    Rebin {
        pressure_index: usize,
        temperature_index: usize,
        #[source]
        source: RebinError,
    },
    #[error("opacity scale factor must be finite, got {value}")]
    InvalidScale { value: f64 },
    #[error(transparent)]
    Table(#[from] OpacityFormatError),
}

impl From<OpacityRebinError> for SpecbinError {
    fn from(error: OpacityRebinError) -> Self {
        match error {
            OpacityRebinError::Table(source) => source.into(),
            OpacityRebinError::Rebin { ref source, .. } => {
                let converted = SpecbinError::from(source.clone());
                SpecbinError::new(converted.category(), converted.placeholder(), error.to_string())
            }
            OpacityRebinError::InvalidScale { .. } => {
                SpecbinError::input_validation("INPUT.OPACITY_SCALE", error.to_string())
            }
        }
    }
}

/// Rebin every (pressure, temperature) series of `table` onto the geometric
/// grid of resolving power `resolution`. Wavelengths are taken as cm.
pub fn rebin_opacity_table(
    table: &OpacityTable,
    resolution: f64,
    mode: InterpolationMode,
) -> Result<OpacityTable, OpacityRebinError> {
    let Some(template) = table.blocks().first() else {
        return Err(OpacityFormatError::NoBlocks.into());
    };
    let wavelengths = table.wavelengths();
    let temperature_count = table.header().temperatures().len();

    let mut new_wavelengths = Vec::new();
    // series[p][t][w]
    let mut series = Vec::with_capacity(template.rows().len());
    for pressure_index in 0..template.rows().len() {
        let mut columns = Vec::with_capacity(temperature_count);
        for temperature_index in 0..temperature_count {
            let opacities = table.series(pressure_index, temperature_index);
            let rebinned = rebin_to_resolution(
                RebinInput::new(&wavelengths, &opacities, resolution)
                    .with_unit(WavelengthUnit::Cm)
                    .with_mode(mode),
            )
            .map_err(|source| OpacityRebinError::Rebin {
                pressure_index,
                temperature_index,
                source,
            })?;

            let (grid, flux) = rebinned.into_parts();
            if new_wavelengths.is_empty() {
                new_wavelengths = grid;
            }
            columns.push(flux);
        }
        debug!(pressure_index, "rebinned pressure row");
        series.push(columns);
    }

    let blocks = new_wavelengths
        .iter()
        .enumerate()
        .map(|(wavelength_index, wavelength)| {
            let rows = template
                .rows()
                .iter()
                .zip(&series)
                .map(|(row, columns)| PressureRow {
                    pressure: row.pressure,
                    opacities: columns
                        .iter()
                        .map(|column| column[wavelength_index])
                        .collect(),
                })
                .collect();
            WavelengthBlock::from_rows(*wavelength, rows)
        })
        .collect();

    Ok(table.with_blocks(blocks))
}

/// Multiply every opacity by `scale`; pressures and wavelength lines are
/// left untouched.
pub fn rescale_opacity_table(
    table: &OpacityTable,
    scale: f64,
) -> Result<OpacityTable, OpacityRebinError> {
    if !scale.is_finite() {
        return Err(OpacityRebinError::InvalidScale { value: scale });
    }

    let blocks = table
        .blocks()
        .iter()
        .map(|block| {
            let rows = block
                .rows()
                .iter()
                .map(|row| PressureRow {
                    pressure: row.pressure,
                    opacities: row.opacities.iter().map(|value| value * scale).collect(),
                })
                .collect();
            block.with_rows(rows)
        })
        .collect();
    Ok(table.with_blocks(blocks))
}

pub fn rebin_opacity_file(
    input: &Path,
    output: &Path,
    resolution: f64,
    mode: InterpolationMode,
) -> Result<OpacityTable, OpacityRebinError> {
    let table = read_opacity_table(input)?;
    info!(
        input = %input.display(),
        wavelengths = table.len(),
        pressures = table.header().pressures().len(),
        temperatures = table.header().temperatures().len(),
        resolution,
        mode = %mode,
        "rebinning opacity table"
    );
    let rebinned = rebin_opacity_table(&table, resolution, mode)?;
    write_opacity_table(output, &rebinned)?;
    Ok(rebinned)
}

pub fn rescale_opacity_file(
    input: &Path,
    output: &Path,
    scale: f64,
) -> Result<OpacityTable, OpacityRebinError> {
    let table = read_opacity_table(input)?;
    let rescaled = rescale_opacity_table(&table, scale)?;
    write_opacity_table(output, &rescaled)?;
    Ok(rescaled)
}
