//! Doppler overlap between consecutive wavelength chunks.
//!
//! A radiative-transfer run on chunk `i` Doppler-shifts wavelengths by up to
//! `v_max / c`, so each chunk borrows the leading blocks of chunk `i + 1`.

use super::{OpacityFormatError, OpacityTable, read_opacity_table, write_opacity_table};
use crate::common::constants::{C_DOPPLER_MKS, OVERLAP_SAFETY_MARGIN};
use crate::domain::SpecbinError;
use crate::numerics::nearest_index;
use globset::Glob;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum OverlapError {
    #[error("maximum Doppler velocity must be finite and > 0, got {value}")]
    InvalidVelocity { value: f64 },
    #[error(
        "chunk {chunk} needs {required} wavelength(s) from the next chunk, which only has {available}; choose a larger chunk size"
    )]
    OverlapTooLarge {
        chunk: usize,
        required: usize,
        available: usize,
    },
    #[error("no chunk files '{stem}<index>.dat' found in '{dir}'")]
    NoChunks { dir: PathBuf, stem: String },
    #[error("chunk files '{first}' and '{second}' both name index {index}")]
    DuplicateChunk {
        index: usize,
        first: PathBuf,
        second: PathBuf,
    },
    #[error("chunk files in '{dir}' skip index {missing}")]
    MissingChunk { dir: PathBuf, missing: usize },
    #[error("failed to list '{dir}': {source}")]
    ListDirectory {
        dir: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid glob pattern '{pattern}': {source}")]
    InvalidGlob {
        pattern: String,
        source: globset::Error,
    },
    #[error(transparent)]
    Table(#[from] OpacityFormatError),
}

impl From<OverlapError> for SpecbinError {
    fn from(error: OverlapError) -> Self {
        match error {
            OverlapError::Table(source) => source.into(),
            OverlapError::ListDirectory { .. } => {
                SpecbinError::io_system("IO.OVERLAP_LIST", error.to_string())
            }
            OverlapError::InvalidGlob { .. } => {
                SpecbinError::internal("RUN.OVERLAP_GLOB", error.to_string())
            }
            _ => SpecbinError::input_validation("INPUT.OVERLAP", error.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlapReport {
    pub chunks: Vec<PathBuf>,
    /// Blocks appended to each chunk; the last chunk always gets 0.
    pub appended: Vec<usize>,
}

/// Blocks of the next chunk that cover `current_max * (1 + 2 v_max / c)`,
/// plus a safety margin.
pub fn overlap_block_count(current_max: f64, next_wavelengths: &[f64], v_max: f64) -> Option<usize> {
    let delta = 2.0 * current_max * v_max / C_DOPPLER_MKS;
    nearest_index(next_wavelengths, current_max + delta).map(|index| index + OVERLAP_SAFETY_MARGIN)
}

/// Append the overlap blocks in place; counts are measured on the chunks as
/// they were before any block was appended.
pub fn add_overlap(chunks: &mut [OpacityTable], v_max: f64) -> Result<Vec<usize>, OverlapError> {
    if !v_max.is_finite() || v_max <= 0.0 {
        return Err(OverlapError::InvalidVelocity { value: v_max });
    }

    let originals: Vec<OpacityTable> = chunks.to_vec();
    let mut appended = vec![0; chunks.len()];
    for (index, pair) in originals.windows(2).enumerate() {
        let (current, next) = (&pair[0], &pair[1]);
        let current_max = current
            .wavelengths()
            .into_iter()
            .fold(f64::NEG_INFINITY, f64::max);
        let next_wavelengths = next.wavelengths();
        let required = overlap_block_count(current_max, &next_wavelengths, v_max).unwrap_or(0);
        if required > next.len() {
            return Err(OverlapError::OverlapTooLarge {
                chunk: index,
                required,
                available: next.len(),
            });
        }

        debug!(chunk = index, blocks = required, "appending overlap");
        chunks[index].push_blocks(next.blocks()[..required].iter().cloned());
        appended[index] = required;
    }
    Ok(appended)
}

/// Chunk files `<stem><index>.dat` in `dir`, ordered by index. Indices must
/// run contiguously from 0.
pub fn discover_chunks(dir: &Path, stem: &str) -> Result<Vec<PathBuf>, OverlapError> {
    let pattern = format!("{}[0-9]*.dat", globset::escape(stem));
    let matcher = Glob::new(&pattern)
        .map_err(|source| OverlapError::InvalidGlob {
            pattern: pattern.clone(),
            source,
        })?
        .compile_matcher();
    let entries = fs::read_dir(dir).map_err(|source| OverlapError::ListDirectory {
        dir: dir.to_path_buf(),
        source,
    })?;

    let mut indexed: BTreeMap<usize, PathBuf> = BTreeMap::new();
    for entry in entries {
        let entry = entry.map_err(|source| OverlapError::ListDirectory {
            dir: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        if !matcher.is_match(name) {
            continue;
        }

        // The glob pins the stem and a leading digit; the rest must be digits too.
        let suffix = &name[stem.len()..name.len() - ".dat".len()];
        if !suffix.chars().all(|character| character.is_ascii_digit()) {
            continue;
        }
        let Ok(index) = suffix.parse::<usize>() else {
            continue;
        };
        if let Some(first) = indexed.get(&index) {
            return Err(OverlapError::DuplicateChunk {
                index,
                first: first.clone(),
                second: path,
            });
        }
        indexed.insert(index, path);
    }

    if indexed.is_empty() {
        return Err(OverlapError::NoChunks {
            dir: dir.to_path_buf(),
            stem: stem.to_string(),
        });
    }
    if let Some(missing) = (0..indexed.len()).find(|index| !indexed.contains_key(index)) {
        return Err(OverlapError::MissingChunk {
            dir: dir.to_path_buf(),
            missing,
        });
    }

    Ok(indexed.into_values().collect())
}

pub fn add_overlap_to_files(dir: &Path, stem: &str, v_max: f64) -> Result<OverlapReport, OverlapError> {
    let chunks = discover_chunks(dir, stem)?;
    let mut tables = chunks
        .iter()
        .map(read_opacity_table)
        .collect::<Result<Vec<_>, _>>()?;
    info!(
        dir = %dir.display(),
        stem,
        chunks = chunks.len(),
        v_max,
        "adding Doppler overlap"
    );

    let appended = add_overlap(&mut tables, v_max)?;
    for ((path, table), count) in chunks.iter().zip(&tables).zip(&appended) {
        if *count > 0 {
            write_opacity_table(path, table)?;
        }
    }

    Ok(OverlapReport { chunks, appended })
}
