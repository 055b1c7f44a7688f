use super::{OpacityFormatError, OpacityTable, read_opacity_table, write_opacity_table};
use crate::domain::SpecbinError;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum ChunkingError {
    #[error("either a chunk count or a number of wavelengths per chunk is required")]
    MissingChunkSize,
    #[error("chunk count must be > 0")]
    ZeroChunks,
    #[error("{chunks} chunk(s) over {total} wavelength(s) leaves no wavelengths per chunk")]
    EmptyChunks { total: usize, chunks: usize },
    #[error("wavelengths per chunk must be > 0")]
    ZeroBlocksPerChunk,
    #[error("input path '{path}' has no file stem")]
    InvalidPath { path: PathBuf },
    #[error(transparent)]
    Table(#[from] OpacityFormatError),
}

impl From<ChunkingError> for SpecbinError {
    fn from(error: ChunkingError) -> Self {
        match error {
            ChunkingError::Table(source) => source.into(),
            _ => SpecbinError::input_validation("INPUT.CHUNK_SIZE", error.to_string()),
        }
    }
}

/// Number of wavelength blocks per chunk.
///
/// An explicit size wins over a chunk count; a count `n` yields
/// `round(total / n)` with ties to even.
pub fn resolve_blocks_per_chunk(
    total: usize,
    chunks: Option<usize>,
    blocks_per_chunk: Option<usize>,
) -> Result<usize, ChunkingError> {
    match (chunks, blocks_per_chunk) {
        (Some(_), Some(size)) => {
            warn!(
                blocks_per_chunk = size,
                "both a chunk count and wavelengths per chunk were given, using wavelengths per chunk"
            );
            positive_size(size)
        }
        (None, Some(size)) => positive_size(size),
        (Some(0), None) => Err(ChunkingError::ZeroChunks),
        (Some(chunks), None) => {
            let size = (total as f64 / chunks as f64).round_ties_even() as usize;
            if size == 0 {
                return Err(ChunkingError::EmptyChunks { total, chunks });
            }
            Ok(size)
        }
        (None, None) => Err(ChunkingError::MissingChunkSize),
    }
}

fn positive_size(size: usize) -> Result<usize, ChunkingError> {
    if size == 0 {
        return Err(ChunkingError::ZeroBlocksPerChunk);
    }
    Ok(size)
}

/// Consecutive chunks of `blocks_per_chunk` blocks; the last holds the rest.
pub fn split_table(table: &OpacityTable, blocks_per_chunk: usize) -> Vec<OpacityTable> {
    table
        .blocks()
        .chunks(blocks_per_chunk.max(1))
        .map(|blocks| table.with_blocks(blocks.to_vec()))
        .collect()
}

/// `<dir>/<stem><index>.dat` next to `input`.
pub fn chunk_path(input: &Path, index: usize) -> Result<PathBuf, ChunkingError> {
    let stem = input
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| ChunkingError::InvalidPath {
            path: input.to_path_buf(),
        })?;
    Ok(input.with_file_name(format!("{stem}{index}.dat")))
}

pub fn chunk_opacity_file(
    input: &Path,
    chunks: Option<usize>,
    blocks_per_chunk: Option<usize>,
) -> Result<Vec<PathBuf>, ChunkingError> {
    let table = read_opacity_table(input)?;
    let size = resolve_blocks_per_chunk(table.len(), chunks, blocks_per_chunk)?;
    let parts = split_table(&table, size);
    info!(
        input = %input.display(),
        wavelengths = table.len(),
        blocks_per_chunk = size,
        chunks = parts.len(),
        "splitting opacity table"
    );

    let mut written = Vec::with_capacity(parts.len());
    for (index, part) in parts.iter().enumerate() {
        let path = chunk_path(input, index)?;
        write_opacity_table(&path, part)?;
        written.push(path);
    }
    Ok(written)
}
