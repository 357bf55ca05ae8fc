//! HamNet exact-diagonalization output: `wfc.npy` holds one row of orbital
//! coefficients per band and `eigen.npy` the matching energies. Always a
//! single gamma-point, single-spin calculation.

mod npy;

use crate::domain::{
    BandSelector, CoefficientVector, IndexDimension, SourceFormat, StoreDimensions, WfcError,
    WfcResult,
};
use crate::modules::traits::WavefunctionSource;
use npy::{NpyArray, NpyDtype};
use std::fs;
use std::path::{Path, PathBuf};

pub const WFC_FILE_NAME: &str = "wfc.npy";
pub const EIGEN_FILE_NAME: &str = "eigen.npy";

#[derive(Debug, Clone)]
pub struct HamnetStore {
    directory: PathBuf,
    coefficients: NpyArray,
    energies: Vec<f64>,
    band_count: usize,
    orbital_count: usize,
}

impl HamnetStore {
    pub fn open(directory: impl AsRef<Path>) -> WfcResult<Self> {
        let directory = directory.as_ref().to_path_buf();
        let coefficients = npy::parse_npy(WFC_FILE_NAME, &read_artifact(&directory, WFC_FILE_NAME)?)?;
        let eigen = npy::parse_npy(EIGEN_FILE_NAME, &read_artifact(&directory, EIGEN_FILE_NAME)?)?;

        let [band_count, orbital_count] = coefficients.shape[..] else {
            return Err(WfcError::malformed_header(format!(
                "{} must be two-dimensional, found shape {:?}",
                WFC_FILE_NAME, coefficients.shape
            )));
        };

        let energies = eigen.to_f64s(EIGEN_FILE_NAME)?;
        if energies.len() != band_count {
            return Err(WfcError::malformed_header(format!(
                "{} holds {} energies but {} holds {} bands",
                EIGEN_FILE_NAME,
                energies.len(),
                WFC_FILE_NAME,
                band_count
            )));
        }

        tracing::info!(
            path = %directory.display(),
            bands = band_count,
            orbitals = orbital_count,
            complex = coefficients.dtype == NpyDtype::Complex64,
            "opened HamNet store"
        );
        Ok(Self {
            directory,
            coefficients,
            energies,
            band_count,
            orbital_count,
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn dimensions(&self) -> StoreDimensions {
        StoreDimensions {
            spin_count: 1,
            kpoint_count: 1,
            band_count: self.band_count,
            orbital_count: self.orbital_count,
        }
    }

    pub fn band_energy(&self, selector: BandSelector) -> WfcResult<f64> {
        Ok(self.energies[self.band_row(selector)?])
    }

    pub fn read_band_coefficients(&self, selector: BandSelector) -> WfcResult<CoefficientVector> {
        let row = self.band_row(selector)?;
        Ok(self.coefficients.coefficient_row(row, self.orbital_count))
    }

    fn band_row(&self, selector: BandSelector) -> WfcResult<usize> {
        StoreDimensions::check_dimension(IndexDimension::Spin, selector.spin, 1)?;
        StoreDimensions::check_dimension(IndexDimension::KPoint, selector.kpoint, 1)?;
        StoreDimensions::check_dimension(IndexDimension::Band, selector.band, self.band_count)
    }
}

fn read_artifact(directory: &Path, name: &str) -> WfcResult<Vec<u8>> {
    let path = directory.join(name);
    fs::read(&path).map_err(|source| {
        WfcError::io(
            format!("failed to read HamNet array '{}'", path.display()),
            source,
        )
    })
}

impl WavefunctionSource for HamnetStore {
    fn format(&self) -> SourceFormat {
        SourceFormat::Hamnet
    }

    fn dimensions(&self) -> StoreDimensions {
        HamnetStore::dimensions(self)
    }

    /// Real-valued arrays only; `<c8` rows come back complex.
    fn is_gamma_only(&self) -> bool {
        self.coefficients.dtype != NpyDtype::Complex64
    }

    fn kpoint_vectors(&self) -> Vec<[f64; 3]> {
        vec![[0.0; 3]]
    }

    fn band_energy(&mut self, selector: BandSelector) -> WfcResult<f64> {
        HamnetStore::band_energy(self, selector)
    }

    fn read_band_coefficients(&mut self, selector: BandSelector) -> WfcResult<CoefficientVector> {
        HamnetStore::read_band_coefficients(self, selector)
    }
}
