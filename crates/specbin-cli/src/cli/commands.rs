use super::CliError;
use super::helpers::*;
use specbin_core::common::config::RebinSettingsFile;
use specbin_core::common::constants::DEFAULT_DOPPLER_V_MAX;
use specbin_core::io::{read_spectrum, write_spectrum};
use specbin_core::opacity::{
    add_overlap_to_files, chunk_opacity_file, rebin_opacity_file, rescale_opacity_file,
};
use specbin_core::rebin::rebin_spectrum;
use std::path::PathBuf;
use tracing::info;

#[derive(clap::Args)]
pub(super) struct RebinArgs {
    /// Two-column spectrum file (wavelength flux)
    #[arg(long)]
    input: PathBuf,

    /// Output spectrum path
    #[arg(long)]
    output: PathBuf,

    /// Resolving power R = lambda / delta lambda
    #[arg(long, allow_negative_numbers = true)]
    resolution: Option<f64>,

    /// Wavelength unit of the input: cm or micron
    #[arg(long)]
    unit: Option<String>,

    /// Interpolation mode: linear, log or gaussian
    #[arg(long)]
    mode: Option<String>,

    /// Blackbody temperature [K] for bins outside the input range; 0 disables
    #[arg(long = "bb-temperature", allow_negative_numbers = true)]
    bb_temperature: Option<f64>,

    /// JSON settings file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(clap::Args)]
pub(super) struct RebinOpacityArgs {
    /// Opacity table to rebin
    #[arg(long)]
    input: PathBuf,

    /// Output table path
    #[arg(long)]
    output: PathBuf,

    /// Resolving power R = lambda / delta lambda
    #[arg(long, allow_negative_numbers = true)]
    resolution: f64,

    /// Interpolation mode: linear, log or gaussian
    #[arg(long, default_value = "log")]
    mode: String,
}

#[derive(clap::Args)]
pub(super) struct ChunkArgs {
    /// Opacity table to split; chunks are written next to it
    #[arg(long)]
    input: PathBuf,

    /// Number of roughly equal chunks
    #[arg(long)]
    chunks: Option<usize>,

    /// Wavelengths per chunk; wins over --chunks
    #[arg(long)]
    wavelengths_per_chunk: Option<usize>,
}

#[derive(clap::Args)]
pub(super) struct OverlapArgs {
    /// Chunk file stem, e.g. opacFe for opacFe0.dat, opacFe1.dat, ...
    #[arg(long)]
    base: String,

    /// Directory holding the chunk files
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    /// Maximum Doppler velocity [m/s]
    #[arg(long, default_value_t = DEFAULT_DOPPLER_V_MAX, allow_negative_numbers = true)]
    v_max: f64,
}

#[derive(clap::Args)]
pub(super) struct RescaleArgs {
    /// Opacity table to rescale
    #[arg(long)]
    input: PathBuf,

    /// Output table path
    #[arg(long)]
    output: PathBuf,

    /// Factor applied to every opacity
    #[arg(long, allow_negative_numbers = true)]
    scale: f64,
}

pub(super) fn run_rebin_command(args: RebinArgs) -> Result<i32, CliError> {
    let overrides = RebinSettingsFile {
        resolution: args.resolution,
        unit: parse_unit(args.unit.as_deref())?,
        mode: parse_mode(args.mode.as_deref())?,
        extrapolation_temperature: args.bb_temperature,
    };
    let settings = resolve_settings(args.config.as_deref(), overrides)?;

    let spectrum = read_spectrum(&args.input).map_err(compute_error)?;
    info!(
        input = %args.input.display(),
        points = spectrum.len(),
        resolution = settings.resolution,
        unit = %settings.unit,
        mode = %settings.mode,
        "rebinning spectrum"
    );
    let rebinned = rebin_spectrum(&spectrum, &settings).map_err(compute_error)?;

    ensure_parent_dir(&args.output)?;
    write_spectrum(&args.output, &rebinned).map_err(compute_error)?;
    println!(
        "Rebinned {} points onto {} points at R={} ({} mode): {}",
        spectrum.len(),
        rebinned.len(),
        settings.resolution,
        settings.mode,
        args.output.display()
    );
    Ok(0)
}

pub(super) fn run_rebin_opacity_command(args: RebinOpacityArgs) -> Result<i32, CliError> {
    let mode = parse_mode(Some(args.mode.as_str()))?.unwrap_or_default();
    ensure_parent_dir(&args.output)?;
    let table =
        rebin_opacity_file(&args.input, &args.output, args.resolution, mode).map_err(compute_error)?;
    println!(
        "Rebinned opacity table onto {} wavelengths at R={}: {}",
        table.len(),
        args.resolution,
        args.output.display()
    );
    Ok(0)
}

pub(super) fn run_chunk_command(args: ChunkArgs) -> Result<i32, CliError> {
    let written = chunk_opacity_file(&args.input, args.chunks, args.wavelengths_per_chunk)
        .map_err(compute_error)?;
    for path in &written {
        println!("{}", path.display());
    }
    println!("Wrote {} chunk(s).", written.len());
    Ok(0)
}

pub(super) fn run_overlap_command(args: OverlapArgs) -> Result<i32, CliError> {
    let report = add_overlap_to_files(&args.dir, &args.base, args.v_max).map_err(compute_error)?;
    for (path, appended) in report.chunks.iter().zip(&report.appended) {
        println!("{}: +{} wavelength(s)", path.display(), appended);
    }
    Ok(0)
}

pub(super) fn run_rescale_command(args: RescaleArgs) -> Result<i32, CliError> {
    ensure_parent_dir(&args.output)?;
    let table = rescale_opacity_file(&args.input, &args.output, args.scale).map_err(compute_error)?;
    println!(
        "Rescaled {} wavelength block(s) by {}: {}",
        table.len(),
        args.scale,
        args.output.display()
    );
    Ok(0)
}
