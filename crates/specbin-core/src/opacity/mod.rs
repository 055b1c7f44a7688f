//! Opacity tables in the radiative-transfer text layout.
//!
//! Line 1 lists the temperature axis and line 2 the pressure axis. Each
//! wavelength block follows as a line holding only the wavelength and one row
//! per pressure: `pressure opacity(T_1) ... opacity(T_N)`.
//!
//! Blocks keep their raw lines so that splitting and stitching reproduce the
//! source text byte for byte.

pub mod chunking;
pub mod overlap;
pub mod rebin;

pub use chunking::{
    ChunkingError, chunk_opacity_file, chunk_path, resolve_blocks_per_chunk, split_table,
};
pub use overlap::{
    OverlapError, OverlapReport, add_overlap, add_overlap_to_files, discover_chunks,
    overlap_block_count,
};
pub use rebin::{
    OpacityRebinError, rebin_opacity_file, rebin_opacity_table, rescale_opacity_file,
    rescale_opacity_table,
};

use crate::domain::SpecbinError;
use crate::io::{format_scientific, parse_number, write_text};
use std::fs;
use std::path::{Path, PathBuf};

pub const WAVELENGTH_DIGITS: usize = 9;
pub const OPACITY_DIGITS: usize = 6;

#[derive(Debug, thiserror::Error)]
pub enum OpacityFormatError {
    #[error("failed to read opacity table '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write opacity table '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("line {line}: missing {axis} axis header")]
    MissingHeader { line: usize, axis: &'static str },
    #[error("line {line}: '{token}' is not a number")]
    InvalidNumber { line: usize, token: String },
    #[error("line {line}: expected a wavelength line with 1 value, found {found}")]
    WavelengthLine { line: usize, found: usize },
    #[error("line {line}: expected a pressure row with {expected} values, found {found}")]
    RowWidth {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: wavelength block ends after {found} of {expected} pressure rows")]
    TruncatedBlock {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: wavelength {current} does not follow {previous}")]
    NonIncreasingWavelength {
        line: usize,
        previous: f64,
        current: f64,
    },
    #[error("opacity table has no wavelength blocks")]
    NoBlocks,
}

impl From<OpacityFormatError> for SpecbinError {
    fn from(error: OpacityFormatError) -> Self {
        match error {
            OpacityFormatError::Read { .. } => {
                SpecbinError::io_system("IO.OPACITY_READ", error.to_string())
            }
            OpacityFormatError::Write { .. } => {
                SpecbinError::io_system("IO.OPACITY_WRITE", error.to_string())
            }
            _ => SpecbinError::input_validation("INPUT.OPACITY_FORMAT", error.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpacityHeader {
    temperature_line: String,
    pressure_line: String,
    temperatures: Vec<f64>,
    pressures: Vec<f64>,
}

impl OpacityHeader {
    pub fn temperatures(&self) -> &[f64] {
        &self.temperatures
    }

    pub fn pressures(&self) -> &[f64] {
        &self.pressures
    }

    pub fn lines(&self) -> [&str; 2] {
        [&self.temperature_line, &self.pressure_line]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PressureRow {
    pub pressure: f64,
    pub opacities: Vec<f64>,
}

impl PressureRow {
    fn render(&self) -> String {
        std::iter::once(self.pressure)
            .chain(self.opacities.iter().copied())
            .map(|value| format_scientific(value, OPACITY_DIGITS))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WavelengthBlock {
    wavelength: f64,
    lines: Vec<String>,
    rows: Vec<PressureRow>,
}

impl WavelengthBlock {
    /// Block with freshly formatted lines.
    pub fn from_rows(wavelength: f64, rows: Vec<PressureRow>) -> Self {
        let lines = std::iter::once(format_scientific(wavelength, WAVELENGTH_DIGITS))
            .chain(rows.iter().map(PressureRow::render))
            .collect();
        Self {
            wavelength,
            lines,
            rows,
        }
    }

    /// Same wavelength line, new pressure rows.
    pub fn with_rows(&self, rows: Vec<PressureRow>) -> Self {
        let lines = self
            .lines
            .iter()
            .take(1)
            .cloned()
            .chain(rows.iter().map(PressureRow::render))
            .collect();
        Self {
            wavelength: self.wavelength,
            lines,
            rows,
        }
    }

    pub fn wavelength(&self) -> f64 {
        self.wavelength
    }

    pub fn rows(&self) -> &[PressureRow] {
        &self.rows
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpacityTable {
    header: OpacityHeader,
    blocks: Vec<WavelengthBlock>,
}

impl OpacityTable {
    pub fn new(header: OpacityHeader, blocks: Vec<WavelengthBlock>) -> Self {
        Self { header, blocks }
    }

    pub fn parse(source: &str) -> Result<Self, OpacityFormatError> {
        let mut lines = source
            .lines()
            .enumerate()
            .map(|(index, raw)| (index + 1, raw.trim_end()))
            .filter(|(_, raw)| !raw.trim().is_empty());

        let (temperature_number, temperature_line) = lines
            .next()
            .ok_or(OpacityFormatError::MissingHeader {
                line: 1,
                axis: "temperature",
            })?;
        let temperatures = parse_values(temperature_number, temperature_line)?;
        if temperatures.is_empty() {
            return Err(OpacityFormatError::MissingHeader {
                line: temperature_number,
                axis: "temperature",
            });
        }

        let (pressure_number, pressure_line) =
            lines.next().ok_or(OpacityFormatError::MissingHeader {
                line: temperature_number + 1,
                axis: "pressure",
            })?;
        let pressures = parse_values(pressure_number, pressure_line)?;
        if pressures.is_empty() {
            return Err(OpacityFormatError::MissingHeader {
                line: pressure_number,
                axis: "pressure",
            });
        }

        let row_width = temperatures.len() + 1;
        let mut blocks: Vec<WavelengthBlock> = Vec::new();

        while let Some((line, raw)) = lines.next() {
            let values = parse_values(line, raw)?;
            if values.len() != 1 {
                return Err(OpacityFormatError::WavelengthLine {
                    line,
                    found: values.len(),
                });
            }
            let wavelength = values[0];
            if let Some(previous) = blocks.last().map(WavelengthBlock::wavelength) {
                if wavelength <= previous {
                    return Err(OpacityFormatError::NonIncreasingWavelength {
                        line,
                        previous,
                        current: wavelength,
                    });
                }
            }

            let mut block_lines = vec![raw.to_string()];
            let mut rows = Vec::with_capacity(pressures.len());
            let mut last_line = line;
            while rows.len() < pressures.len() {
                let Some((row_line, row_raw)) = lines.next() else {
                    return Err(OpacityFormatError::TruncatedBlock {
                        line: last_line,
                        expected: pressures.len(),
                        found: rows.len(),
                    });
                };
                let values = parse_values(row_line, row_raw)?;
                if values.len() != row_width {
                    return Err(OpacityFormatError::RowWidth {
                        line: row_line,
                        expected: row_width,
                        found: values.len(),
                    });
                }
                rows.push(PressureRow {
                    pressure: values[0],
                    opacities: values[1..].to_vec(),
                });
                block_lines.push(row_raw.to_string());
                last_line = row_line;
            }

            blocks.push(WavelengthBlock {
                wavelength,
                lines: block_lines,
                rows,
            });
        }

        if blocks.is_empty() {
            return Err(OpacityFormatError::NoBlocks);
        }

        Ok(Self {
            header: OpacityHeader {
                temperature_line: temperature_line.to_string(),
                pressure_line: pressure_line.to_string(),
                temperatures,
                pressures,
            },
            blocks,
        })
    }

    pub fn header(&self) -> &OpacityHeader {
        &self.header
    }

    pub fn blocks(&self) -> &[WavelengthBlock] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn wavelengths(&self) -> Vec<f64> {
        self.blocks.iter().map(WavelengthBlock::wavelength).collect()
    }

    /// Opacity across wavelength at one (pressure, temperature) node.
    pub fn series(&self, pressure_index: usize, temperature_index: usize) -> Vec<f64> {
        self.blocks
            .iter()
            .map(|block| block.rows[pressure_index].opacities[temperature_index])
            .collect()
    }

    pub fn with_blocks(&self, blocks: Vec<WavelengthBlock>) -> Self {
        Self {
            header: self.header.clone(),
            blocks,
        }
    }

    pub fn push_blocks(&mut self, blocks: impl IntoIterator<Item = WavelengthBlock>) {
        self.blocks.extend(blocks);
    }

    pub fn render(&self) -> String {
        let mut rendered = String::new();
        for line in self
            .header
            .lines()
            .into_iter()
            .chain(self.blocks.iter().flat_map(|block| block.lines.iter().map(String::as_str)))
        {
            rendered.push_str(line);
            rendered.push('\n');
        }
        rendered
    }
}

pub fn read_opacity_table(path: impl AsRef<Path>) -> Result<OpacityTable, OpacityFormatError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| OpacityFormatError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    OpacityTable::parse(&source)
}

pub fn write_opacity_table(
    path: impl AsRef<Path>,
    table: &OpacityTable,
) -> Result<(), OpacityFormatError> {
    let path = path.as_ref();
    write_text(path, &table.render()).map_err(|source| OpacityFormatError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_values(line: usize, raw: &str) -> Result<Vec<f64>, OpacityFormatError> {
    raw.split_whitespace()
        .map(|token| {
            parse_number(token).ok_or_else(|| OpacityFormatError::InvalidNumber {
                line,
                token: token.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{
        OpacityFormatError, OpacityTable, PressureRow, WavelengthBlock, read_opacity_table,
        write_opacity_table,
    };
    use crate::domain::SpecbinError;
    use tempfile::TempDir;

    /// Two temperatures, two pressures; opacity = wavelength index + 1 scaled
    /// by pressure and temperature position.
    pub(crate) fn sample_table_text(wavelengths: &[f64]) -> String {
        let mut text = String::from("500.000 600.000 \n1.000000E-01 1.000000E+00\n");
        for (index, wavelength) in wavelengths.iter().enumerate() {
            text.push_str(&format!("{wavelength:.9E}\n"));
            for (pressure_index, pressure) in ["1.000000E-01", "1.000000E+00"].iter().enumerate() {
                let base = (index + 1) as f64 * 10f64.powi(pressure_index as i32);
                text.push_str(&format!("{pressure} {:.6E} {:.6E}\n", base, 2.0 * base));
            }
        }
        text
    }

    #[test]
    fn parser_reads_axes_and_blocks() {
        let table = OpacityTable::parse(&sample_table_text(&[1.0e-4, 2.0e-4, 3.0e-4]))
            .expect("table should parse");

        assert_eq!(table.header().temperatures(), &[500.0, 600.0]);
        assert_eq!(table.header().pressures(), &[0.1, 1.0]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.wavelengths(), vec![1.0e-4, 2.0e-4, 3.0e-4]);
        assert_eq!(table.series(1, 1), vec![20.0, 40.0, 60.0]);
        assert_eq!(table.blocks()[0].rows()[0].pressure, 0.1);
    }

    #[test]
    fn render_reproduces_source_lines() {
        let text = sample_table_text(&[1.0e-4, 2.0e-4]);
        let table = OpacityTable::parse(&text).expect("table should parse");
        let expected: String = text.lines().map(|line| format!("{}\n", line.trim_end())).collect();
        assert_eq!(table.render(), expected);

        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("opacCO.dat");
        write_opacity_table(&path, &table).expect("write should succeed");
        assert_eq!(read_opacity_table(&path).expect("reread"), table);
    }

    #[test]
    fn formatted_blocks_reparse_to_the_same_numbers() {
        let block = WavelengthBlock::from_rows(
            1.5e-4,
            vec![PressureRow {
                pressure: 0.1,
                opacities: vec![3.25e-22, 0.0],
            }],
        );
        assert_eq!(
            block.lines(),
            &["1.500000000E-04", "1.000000E-01 3.250000E-22 0.000000E+00"]
        );

        let text = format!("500 600\n0.1\n{}\n", block.lines().join("\n"));
        let table = OpacityTable::parse(&text).expect("formatted table should parse");
        assert_eq!(table.blocks()[0].rows(), block.rows());
        assert_eq!(table.blocks()[0].wavelength(), 1.5e-4);
    }

    #[test]
    fn malformed_tables_report_line_numbers() {
        let text = "500 600\n0.1 1.0\n1.0e-4\n0.1 1.0 2.0\n0.1 1.0\n";
        let error = OpacityTable::parse(text).expect_err("short row should fail");
        assert!(matches!(
            error,
            OpacityFormatError::RowWidth {
                line: 5,
                expected: 3,
                found: 2
            }
        ));

        let text = "500 600\n0.1 1.0\n1.0e-4 2.0\n";
        let error = OpacityTable::parse(text).expect_err("wide wavelength line should fail");
        assert!(matches!(
            error,
            OpacityFormatError::WavelengthLine { line: 3, found: 2 }
        ));

        let text = "500 600\n0.1 1.0\n1.0e-4\n0.1 1.0 2.0\n";
        let error = OpacityTable::parse(text).expect_err("missing pressure row should fail");
        assert!(matches!(
            error,
            OpacityFormatError::TruncatedBlock {
                line: 4,
                expected: 2,
                found: 1
            }
        ));

        let text = "500 600\n0.1\n2.0e-4\n0.1 1.0 2.0\n1.0e-4\n0.1 1.0 2.0\n";
        let error = OpacityTable::parse(text).expect_err("descending wavelengths should fail");
        assert!(matches!(
            error,
            OpacityFormatError::NonIncreasingWavelength { line: 5, .. }
        ));

        let error = OpacityTable::parse("500 x\n").expect_err("bad header");
        let error: SpecbinError = error.into();
        assert_eq!(error.diagnostic_line(), "ERROR: [INPUT.OPACITY_FORMAT] line 1: 'x' is not a number");

        assert!(matches!(
            OpacityTable::parse("500\n0.1\n"),
            Err(OpacityFormatError::NoBlocks)
        ));
    }
}
