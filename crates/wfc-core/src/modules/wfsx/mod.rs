//! SIESTA `.WFSX` reader.
//!
//! Opening a store decodes the header and walks every k-point block once,
//! remembering each band's energy and the byte offset of its coefficient
//! record. Coefficients are decoded only when a band is requested, by seeking
//! straight to that record.

mod decode;
mod header;
mod index;
mod record;

#[cfg(test)]
mod fixtures;

pub use header::{OrbitalMeta, WfsxHeader};
pub use index::{BandIndex, BandRecord};
pub use record::{Record, RecordReader, SkippedRecord};

use crate::domain::{
    BandSelector, CoefficientVector, SourceFormat, SourceSummary, StoreDimensions, WfcError,
    WfcResult,
};
use crate::modules::traits::WavefunctionSource;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

#[derive(Debug)]
pub struct WfsxStore<R = BufReader<File>> {
    reader: RecordReader<R>,
    header: WfsxHeader,
    index: BandIndex,
}

impl WfsxStore<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> WfcResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| {
            WfcError::io(format!("failed to open '{}'", path.display()), source)
        })?;
        let store = Self::from_reader(BufReader::new(file))?;
        tracing::info!(
            path = %path.display(),
            spins = store.index.dimensions().spin_count,
            kpoints = store.index.dimensions().kpoint_count,
            bands = store.index.dimensions().band_count,
            orbitals = store.header.orbital_count,
            gamma_only = store.header.gamma_only,
            "opened WFSX store"
        );
        Ok(store)
    }
}

impl<R: Read + Seek> WfsxStore<R> {
    pub fn from_reader(inner: R) -> WfcResult<Self> {
        let mut reader = RecordReader::new(inner)?;
        let header = header::decode_header(&mut reader)?;
        let index = index::build_band_index(&mut reader, &header)?;
        tracing::debug!(
            bytes = reader.stream_len(),
            bands = index.band_count(),
            "indexed WFSX stream"
        );
        Ok(Self {
            reader,
            header,
            index,
        })
    }

    pub fn header(&self) -> &WfsxHeader {
        &self.header
    }

    pub fn dimensions(&self) -> StoreDimensions {
        self.index.dimensions()
    }

    pub fn kpoint_vectors(&self) -> &[[f64; 3]] {
        self.index.kpoint_vectors()
    }

    /// Cached energy of one band; never touches the stream.
    pub fn band_energy(&self, selector: BandSelector) -> WfcResult<f64> {
        Ok(self.index.record(selector)?.energy)
    }

    pub fn band_energies(&self, spin: usize, kpoint: usize) -> WfcResult<Vec<f64>> {
        self.index.energies(spin, kpoint)
    }

    /// Byte offset of the band's coefficient record.
    pub fn payload_offset(&self, selector: BandSelector) -> WfcResult<u64> {
        Ok(self.index.record(selector)?.payload_offset)
    }

    pub fn read_band_coefficients(
        &mut self,
        selector: BandSelector,
    ) -> WfcResult<CoefficientVector> {
        let record = self.index.record(selector)?;
        decode::decode_coefficients(
            &mut self.reader,
            record.payload_offset,
            self.header.orbital_count,
            self.header.gamma_only,
        )
    }

    pub fn summary(&self) -> SourceSummary {
        SourceSummary {
            format: SourceFormat::Wfsx,
            gamma_only: self.header.gamma_only,
            dimensions: self.dimensions(),
            kpoint_vectors: self.kpoint_vectors().to_vec(),
        }
    }

    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }
}

impl<R: Read + Seek> WavefunctionSource for WfsxStore<R> {
    fn format(&self) -> SourceFormat {
        SourceFormat::Wfsx
    }

    fn dimensions(&self) -> StoreDimensions {
        WfsxStore::dimensions(self)
    }

    fn is_gamma_only(&self) -> bool {
        self.header.gamma_only
    }

    fn kpoint_vectors(&self) -> Vec<[f64; 3]> {
        WfsxStore::kpoint_vectors(self).to_vec()
    }

    fn band_energy(&mut self, selector: BandSelector) -> WfcResult<f64> {
        WfsxStore::band_energy(self, selector)
    }

    fn band_energies(&mut self, spin: usize, kpoint: usize) -> WfcResult<Vec<f64>> {
        WfsxStore::band_energies(self, spin, kpoint)
    }

    fn read_band_coefficients(&mut self, selector: BandSelector) -> WfcResult<CoefficientVector> {
        WfsxStore::read_band_coefficients(self, selector)
    }

    fn summary(&self) -> SourceSummary {
        WfsxStore::summary(self)
    }
}
