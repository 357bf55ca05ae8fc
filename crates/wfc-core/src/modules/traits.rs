use crate::domain::{
    BandSelector, CoefficientVector, SourceFormat, SourceSummary, StoreDimensions, WfcResult,
};

/// Read-only access to band energies and orbital coefficients, regardless of
/// the on-disk layout backing it.
///
/// Queries take `&mut self`: file-backed stores move a cursor or swap a cached
/// k-point block while answering.
pub trait WavefunctionSource {
    fn format(&self) -> SourceFormat;

    fn dimensions(&self) -> StoreDimensions;

    fn is_gamma_only(&self) -> bool;

    fn kpoint_vectors(&self) -> Vec<[f64; 3]>;

    fn band_energy(&mut self, selector: BandSelector) -> WfcResult<f64>;

    fn read_band_coefficients(&mut self, selector: BandSelector) -> WfcResult<CoefficientVector>;

    fn band_energies(&mut self, spin: usize, kpoint: usize) -> WfcResult<Vec<f64>> {
        let band_count = self.dimensions().band_count;
        let mut energies = Vec::with_capacity(band_count);
        for band in 1..=band_count {
            energies.push(self.band_energy(BandSelector::new(spin, kpoint, band))?);
        }
        Ok(energies)
    }

    fn summary(&self) -> SourceSummary {
        SourceSummary {
            format: self.format(),
            gamma_only: self.is_gamma_only(),
            dimensions: self.dimensions(),
            kpoint_vectors: self.kpoint_vectors(),
        }
    }
}
