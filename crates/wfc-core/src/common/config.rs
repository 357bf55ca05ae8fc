//! Source description shared by the library entry point and the CLI.
//!
//! A source is a format plus a path: a `.WFSX` file for SIESTA, a directory
//! for ABACUS (`kpoints` + `LOWF_K_<n>.dat`) or HamNet (`wfc.npy` +
//! `eigen.npy`). The gamma flag is only consulted for ABACUS, whose files do
//! not record it.

use crate::domain::{SourceFormat, WfcError, WfcResult};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    pub format: SourceFormat,
    pub path: PathBuf,
    #[serde(default, rename = "gammaOnly", alias = "gamma_only")]
    pub gamma_only: bool,
}

impl SourceConfig {
    pub fn new(format: SourceFormat, path: impl Into<PathBuf>) -> Self {
        Self {
            format,
            path: path.into(),
            gamma_only: false,
        }
    }

    pub fn with_gamma_only(mut self, gamma_only: bool) -> Self {
        self.gamma_only = gamma_only;
        self
    }

    pub fn from_json_str(content: &str) -> WfcResult<Self> {
        serde_json::from_str(content).map_err(|source| WfcError::invalid_config(source.to_string()))
    }

    /// Loads a JSON config; a relative `path` inside it resolves against the
    /// config file's directory.
    pub fn from_json_path(path: &Path) -> WfcResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| {
            WfcError::io(
                format!("failed to read source config '{}'", path.display()),
                source,
            )
        })?;
        let mut config = Self::from_json_str(&content).map_err(|error| match error {
            WfcError::InvalidConfig { reason } => {
                WfcError::invalid_config(format!("'{}': {}", path.display(), reason))
            }
            other => other,
        })?;

        if config.path.is_relative() {
            if let Some(parent) = path.parent() {
                config.path = parent.join(&config.path);
            }
        }
        Ok(config)
    }
}
