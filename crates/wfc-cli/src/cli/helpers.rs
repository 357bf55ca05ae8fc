use super::CliError;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use wfc_core::modules::serialization::write_text_artifact;
use wfc_core::{SourceConfig, SourceFormat, WfcError};

/// Where the wavefunction data lives: a JSON config file or explicit flags.
#[derive(clap::Args, Debug, Clone)]
#[command(group(clap::ArgGroup::new("source").required(true).args(["config", "path"])))]
pub(super) struct SourceArgs {
    /// JSON source description (`format`, `path`, optional `gammaOnly`)
    #[arg(long, conflicts_with_all = ["path", "format", "gamma"])]
    pub(super) config: Option<PathBuf>,

    /// WFSX file, or ABACUS / HamNet output directory
    #[arg(long)]
    pub(super) path: Option<PathBuf>,

    /// Source layout: wfsx (alias siesta), abacus or hamnet
    #[arg(long, default_value = "wfsx", value_parser = parse_source_format)]
    pub(super) format: SourceFormat,

    /// Treat ABACUS coefficients as real (gamma-point only) vectors
    #[arg(long)]
    pub(super) gamma: bool,
}

impl SourceArgs {
    pub(super) fn resolve(&self) -> Result<SourceConfig, CliError> {
        if let Some(config) = &self.config {
            return Ok(SourceConfig::from_json_path(config)?);
        }
        let path = self
            .path
            .clone()
            .ok_or_else(|| CliError::Usage("either --config or --path is required".to_string()))?;
        Ok(SourceConfig::new(self.format, path).with_gamma_only(self.gamma))
    }
}

fn parse_source_format(token: &str) -> Result<SourceFormat, String> {
    SourceFormat::from_token(token).ok_or_else(|| {
        format!(
            "unknown source format '{}' (expected wfsx, abacus or hamnet)",
            token
        )
    })
}

/// Writes to `output` when given, otherwise prints to stdout.
pub(super) fn emit_text(output: Option<&Path>, content: &str) -> Result<(), CliError> {
    match output {
        Some(path) => write_text_artifact(path, content).map_err(|source| {
            CliError::Source(WfcError::io(
                format!("failed to write '{}'", path.display()),
                source,
            ))
        }),
        None => {
            print!("{}", content);
            Ok(())
        }
    }
}

/// Installs a stderr subscriber once; `RUST_LOG` wins over the default level.
pub(super) fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .try_init();
}
