//! ABACUS LCAO wavefunction reader.
//!
//! A run directory holds a `kpoints` table plus one `LOWF_K_<n>.dat` text
//! file per k-point. Only one spin channel is supported. A single k-point
//! block is kept in memory and swapped when a query targets another k-point.

mod parser;

use crate::common::constants::RY2EV;
use crate::domain::{
    BandSelector, CoefficientVector, IndexDimension, SourceFormat, StoreDimensions, WfcError,
    WfcResult,
};
use crate::modules::traits::WavefunctionSource;
use parser::{KPOINTS_FILE_NAME, LowfBlock, lowf_file_name};
use std::io::{Error, ErrorKind};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
struct KpointBlock {
    /// 0-based k-point this block belongs to.
    kpoint: usize,
    energies_ev: Vec<f64>,
    occupations: Vec<f64>,
    coefficients: Vec<CoefficientVector>,
}

#[derive(Debug, Clone)]
pub struct AbacusStore {
    directory: PathBuf,
    gamma_only: bool,
    kpoint_vectors: Vec<[f64; 3]>,
    band_count: usize,
    orbital_count: usize,
    current: KpointBlock,
}

impl AbacusStore {
    pub fn open(directory: impl AsRef<Path>, gamma_only: bool) -> WfcResult<Self> {
        let directory = directory.as_ref().to_path_buf();
        if !directory.is_dir() {
            return Err(WfcError::io(
                format!("ABACUS source '{}'", directory.display()),
                Error::new(ErrorKind::NotFound, "not a directory"),
            ));
        }

        let kpoints_path = directory.join(KPOINTS_FILE_NAME);
        let kpoint_vectors =
            parser::parse_kpoints_source(&parser::read_input_source(&kpoints_path, "k-point table")?)?;

        let first = load_lowf(&directory, 0, gamma_only)?;
        let band_count = first.band_count;
        let orbital_count = first.orbital_count;
        let store = Self {
            directory,
            gamma_only,
            kpoint_vectors,
            band_count,
            orbital_count,
            current: into_kpoint_block(0, first),
        };

        tracing::info!(
            path = %store.directory.display(),
            kpoints = store.kpoint_vectors.len(),
            bands = band_count,
            orbitals = orbital_count,
            gamma_only,
            "opened ABACUS store"
        );
        Ok(store)
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn dimensions(&self) -> StoreDimensions {
        StoreDimensions {
            spin_count: 1,
            kpoint_count: self.kpoint_vectors.len(),
            band_count: self.band_count,
            orbital_count: self.orbital_count,
        }
    }

    /// 1-based k-point whose block is currently in memory.
    pub fn loaded_kpoint(&self) -> usize {
        self.current.kpoint + 1
    }

    pub fn band_energy(&mut self, selector: BandSelector) -> WfcResult<f64> {
        let band = self.select(selector)?;
        Ok(self.current.energies_ev[band])
    }

    pub fn band_occupation(&mut self, selector: BandSelector) -> WfcResult<f64> {
        let band = self.select(selector)?;
        Ok(self.current.occupations[band])
    }

    pub fn read_band_coefficients(
        &mut self,
        selector: BandSelector,
    ) -> WfcResult<CoefficientVector> {
        let band = self.select(selector)?;
        Ok(self.current.coefficients[band].clone())
    }

    /// Validates the selector, swaps in its k-point block if needed and
    /// returns the 0-based band.
    fn select(&mut self, selector: BandSelector) -> WfcResult<usize> {
        StoreDimensions::check_dimension(IndexDimension::Spin, selector.spin, 1)?;
        let kpoint = StoreDimensions::check_dimension(
            IndexDimension::KPoint,
            selector.kpoint,
            self.kpoint_vectors.len(),
        )?;
        let band =
            StoreDimensions::check_dimension(IndexDimension::Band, selector.band, self.band_count)?;

        if kpoint != self.current.kpoint {
            self.load_kpoint(kpoint)?;
        }
        Ok(band)
    }

    fn load_kpoint(&mut self, kpoint: usize) -> WfcResult<()> {
        let block = load_lowf(&self.directory, kpoint, self.gamma_only)?;
        if block.band_count != self.band_count {
            return Err(WfcError::BandCountMismatch {
                kpoint: kpoint + 1,
                spin: 1,
                expected: self.band_count as u32,
                actual: block.band_count as u32,
            });
        }
        if block.orbital_count != self.orbital_count {
            return Err(WfcError::malformed_header(format!(
                "{} declares {} orbitals, expected {}",
                lowf_file_name(kpoint + 1),
                block.orbital_count,
                self.orbital_count
            )));
        }

        tracing::debug!(
            from = self.current.kpoint + 1,
            to = kpoint + 1,
            "swapping ABACUS k-point block"
        );
        self.current = into_kpoint_block(kpoint, block);
        Ok(())
    }
}

fn load_lowf(directory: &Path, kpoint: usize, gamma_only: bool) -> WfcResult<LowfBlock> {
    let name = lowf_file_name(kpoint + 1);
    let source = parser::read_input_source(&directory.join(&name), "wavefunction file")?;
    parser::parse_lowf_source(&name, &source, gamma_only)
}

fn into_kpoint_block(kpoint: usize, block: LowfBlock) -> KpointBlock {
    KpointBlock {
        kpoint,
        energies_ev: block
            .energies_ry
            .into_iter()
            .map(|energy| energy * RY2EV)
            .collect(),
        occupations: block.occupations,
        coefficients: block.coefficients,
    }
}

impl WavefunctionSource for AbacusStore {
    fn format(&self) -> SourceFormat {
        SourceFormat::Abacus
    }

    fn dimensions(&self) -> StoreDimensions {
        AbacusStore::dimensions(self)
    }

    fn is_gamma_only(&self) -> bool {
        self.gamma_only
    }

    fn kpoint_vectors(&self) -> Vec<[f64; 3]> {
        self.kpoint_vectors.clone()
    }

    fn band_energy(&mut self, selector: BandSelector) -> WfcResult<f64> {
        AbacusStore::band_energy(self, selector)
    }

    fn read_band_coefficients(&mut self, selector: BandSelector) -> WfcResult<CoefficientVector> {
        AbacusStore::read_band_coefficients(self, selector)
    }
}
