mod commands;
mod helpers;

use clap::Parser;
use wfc_core::{WfcError, WfcErrorCategory};

pub fn run_from_env() -> i32 {
    let args = std::env::args().skip(1).collect::<Vec<_>>();

    match run(args) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("{}", error.diagnostic_line());
            eprintln!("{}", error.fatal_exit_line());
            error.exit_code()
        }
    }
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once("wfc-rs".to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();
    parse_and_dispatch(full_args)
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => {
            helpers::init_tracing(cli.verbose);
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
    name = "wfc-rs",
    version,
    about = "Inspect band energies and orbital coefficients in SIESTA, ABACUS and HamNet output"
)]
struct Cli {
    /// Log debug diagnostics to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Print the format, dimensions and k-points of a source
    Info(commands::InfoArgs),
    /// Print band energies in eV
    Energies(commands::EnergiesArgs),
    /// Print the orbital coefficients of one band
    Coeff(commands::CoeffArgs),
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Info(args) => commands::run_info_command(args),
        CliCommand::Energies(args) => commands::run_energies_command(args),
        CliCommand::Coeff(args) => commands::run_coeff_command(args),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Source(#[from] WfcError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    pub fn placeholder(&self) -> &'static str {
        match self {
            Self::Usage(_) => "INPUT.CLI_USAGE",
            Self::Source(error) => error.placeholder(),
            Self::Internal(_) => "INTERNAL.CLI",
        }
    }

    pub fn category(&self) -> WfcErrorCategory {
        match self {
            Self::Usage(_) => WfcErrorCategory::InputValidationError,
            Self::Source(error) => error.category(),
            Self::Internal(_) => WfcErrorCategory::InternalError,
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.category().exit_code()
    }

    pub fn fatal_exit_line(&self) -> String {
        self.category().fatal_exit_line()
    }

    pub fn diagnostic_line(&self) -> String {
        match self {
            Self::Internal(error) => format!("ERROR: [{}] {error:#}", self.placeholder()),
            other => format!("ERROR: [{}] {}", other.placeholder(), other),
        }
    }
}
