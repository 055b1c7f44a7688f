mod commands;
mod helpers;

use clap::Parser;
use specbin_core::domain::SpecbinError;

pub fn run_from_env() -> i32 {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match run(args) {
        Ok(code) => code,
        Err(error) => {
            let diagnostic = error.as_specbin_error();
            eprintln!("{}", diagnostic.diagnostic_line());
            eprintln!("{}", diagnostic.fatal_exit_line());
            diagnostic.exit_code()
        }
    }
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once("specbin".to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();

    match Cli::try_parse_from(&full_args) {
        Ok(cli) => {
            helpers::init_logging(cli.verbose);
            dispatch_parsed(cli.command)
        }
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

#[derive(Parser)]
#[command(
    name = "specbin",
    version,
    about = "Rebin spectra and opacity tables to a constant resolving power"
)]
struct Cli {
    /// Log debug details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Rebin a two-column spectrum file
    Rebin(commands::RebinArgs),
    /// Rebin every pressure-temperature series of an opacity table
    RebinOpacity(commands::RebinOpacityArgs),
    /// Split an opacity table into wavelength chunks
    Chunk(commands::ChunkArgs),
    /// Append Doppler overlap from each chunk to the previous one
    Overlap(commands::OverlapArgs),
    /// Multiply every opacity in a table by a constant
    Rescale(commands::RescaleArgs),
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Rebin(args) => commands::run_rebin_command(args),
        CliCommand::RebinOpacity(args) => commands::run_rebin_opacity_command(args),
        CliCommand::Chunk(args) => commands::run_chunk_command(args),
        CliCommand::Overlap(args) => commands::run_overlap_command(args),
        CliCommand::Rescale(args) => commands::run_rescale_command(args),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Compute(SpecbinError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    fn as_specbin_error(&self) -> SpecbinError {
        match self {
            Self::Usage(message) => {
                SpecbinError::input_validation("INPUT.CLI_USAGE", message.trim_end().to_string())
            }
            Self::Compute(error) => error.clone(),
            Self::Internal(error) => SpecbinError::io_system("IO.CLI", format!("{error:#}")),
        }
    }
}
