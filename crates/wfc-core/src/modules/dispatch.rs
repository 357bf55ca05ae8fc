use super::abacus::AbacusStore;
use super::hamnet::HamnetStore;
use super::traits::WavefunctionSource;
use super::wfsx::WfsxStore;
use crate::common::SourceConfig;
use crate::domain::{SourceFormat, WfcResult};

/// Opens the backend named by `config.format`.
pub fn open_source(config: &SourceConfig) -> WfcResult<Box<dyn WavefunctionSource>> {
    tracing::debug!(
        format = %config.format,
        path = %config.path.display(),
        gamma_only = config.gamma_only,
        "opening wavefunction source"
    );
    let source: Box<dyn WavefunctionSource> = match config.format {
        SourceFormat::Wfsx => Box::new(WfsxStore::open(&config.path)?),
        SourceFormat::Abacus => Box::new(AbacusStore::open(&config.path, config.gamma_only)?),
        SourceFormat::Hamnet => Box::new(HamnetStore::open(&config.path)?),
    };
    Ok(source)
}
