//! Two-column spectrum files: `wavelength flux` per line.

use super::format::{format_scientific, parse_number, write_text};
use crate::domain::{Spectrum, SpecbinError};
use crate::numerics::RebinError;
use std::fs;
use std::path::{Path, PathBuf};

const WAVELENGTH_DIGITS: usize = 9;
const FLUX_DIGITS: usize = 6;

#[derive(Debug, thiserror::Error)]
pub enum SpectrumFileError {
    #[error("failed to read spectrum '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write spectrum '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("line {line}: expected 2 columns (wavelength flux), found {found}")]
    ColumnCount { line: usize, found: usize },
    #[error("line {line}: '{token}' is not a number")]
    InvalidNumber { line: usize, token: String },
    #[error(transparent)]
    Invalid(#[from] RebinError),
}

impl From<SpectrumFileError> for SpecbinError {
    fn from(error: SpectrumFileError) -> Self {
        match error {
            SpectrumFileError::Invalid(source) => source.into(),
            SpectrumFileError::Read { .. } => {
                SpecbinError::io_system("IO.SPECTRUM_READ", error.to_string())
            }
            SpectrumFileError::Write { .. } => {
                SpecbinError::io_system("IO.SPECTRUM_WRITE", error.to_string())
            }
            SpectrumFileError::ColumnCount { .. } | SpectrumFileError::InvalidNumber { .. } => {
                SpecbinError::input_validation("INPUT.SPECTRUM_FORMAT", error.to_string())
            }
        }
    }
}

/// Parse spectrum text. Blank lines and `#` comments are skipped; line
/// numbers in errors are 1-based.
pub fn parse_spectrum(source: &str) -> Result<Spectrum, SpectrumFileError> {
    let mut wavelengths = Vec::new();
    let mut flux = Vec::new();

    for (index, raw) in source.lines().enumerate() {
        let line = index + 1;
        let content = raw.split('#').next().unwrap_or_default().trim();
        if content.is_empty() {
            continue;
        }

        let tokens: Vec<&str> = content.split_whitespace().collect();
        if tokens.len() != 2 {
            return Err(SpectrumFileError::ColumnCount {
                line,
                found: tokens.len(),
            });
        }

        let mut values = [0.0; 2];
        for (slot, token) in values.iter_mut().zip(&tokens) {
            *slot = parse_number(token).ok_or_else(|| SpectrumFileError::InvalidNumber {
                line,
                token: (*token).to_string(),
            })?;
        }
        wavelengths.push(values[0]);
        flux.push(values[1]);
    }

    Ok(Spectrum::new(wavelengths, flux)?)
}

pub fn read_spectrum(path: impl AsRef<Path>) -> Result<Spectrum, SpectrumFileError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| SpectrumFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_spectrum(&source)
}

pub fn render_spectrum(spectrum: &Spectrum) -> String {
    spectrum
        .points()
        .map(|(wavelength, flux)| {
            format!(
                "{} {}\n",
                format_scientific(wavelength, WAVELENGTH_DIGITS),
                format_scientific(flux, FLUX_DIGITS)
            )
        })
        .collect()
}

pub fn write_spectrum(path: impl AsRef<Path>, spectrum: &Spectrum) -> Result<(), SpectrumFileError> {
    let path = path.as_ref();
    write_text(path, &render_spectrum(spectrum)).map_err(|source| SpectrumFileError::Write {
        path: path.to_path_buf(),
        source,
    })
}
