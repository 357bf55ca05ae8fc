pub mod errors;

pub use errors::{WfcError, WfcErrorCategory, WfcResult};

use num_complex::Complex32;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// SIESTA `.WFSX` Fortran unformatted stream.
    Wfsx,
    /// ABACUS `kpoints` + `LOWF_K_<n>.dat` text files.
    Abacus,
    /// HamNet `wfc.npy` / `eigen.npy` dense arrays.
    Hamnet,
}

impl SourceFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wfsx => "wfsx",
            Self::Abacus => "abacus",
            Self::Hamnet => "hamnet",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "wfsx" | "siesta" => Some(Self::Wfsx),
            "abacus" => Some(Self::Abacus),
            "hamnet" => Some(Self::Hamnet),
            _ => None,
        }
    }
}

impl Display for SourceFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexDimension {
    Spin,
    KPoint,
    Band,
}

impl IndexDimension {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Spin => "spin",
            Self::KPoint => "k-point",
            Self::Band => "band",
        }
    }
}

impl Display for IndexDimension {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

/// 1-based (spin, k-point, band) triple as used by every public query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BandSelector {
    pub spin: usize,
    pub kpoint: usize,
    pub band: usize,
}

impl BandSelector {
    pub const fn new(spin: usize, kpoint: usize, band: usize) -> Self {
        Self {
            spin,
            kpoint,
            band,
        }
    }
}

impl Display for BandSelector {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "spin={} kpoint={} band={}",
            self.spin, self.kpoint, self.band
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StoreDimensions {
    pub spin_count: usize,
    pub kpoint_count: usize,
    pub band_count: usize,
    pub orbital_count: usize,
}

impl StoreDimensions {
    pub fn check_dimension(
        dimension: IndexDimension,
        index: usize,
        upper: usize,
    ) -> WfcResult<usize> {
        if index == 0 || index > upper {
            return Err(WfcError::IndexOutOfRange {
                dimension,
                index,
                upper,
            });
        }
        Ok(index - 1)
    }

    /// Validates a selector and returns its slot in a spin-major flat table.
    pub fn flat_index(&self, selector: BandSelector) -> WfcResult<usize> {
        let spin = Self::check_dimension(IndexDimension::Spin, selector.spin, self.spin_count)?;
        let kpoint =
            Self::check_dimension(IndexDimension::KPoint, selector.kpoint, self.kpoint_count)?;
        let band = Self::check_dimension(IndexDimension::Band, selector.band, self.band_count)?;
        Ok((spin * self.kpoint_count + kpoint) * self.band_count + band)
    }
}

/// Coefficients of one band over the orbital basis.
#[derive(Debug, Clone, PartialEq)]
pub enum CoefficientVector {
    Real(Vec<f32>),
    Complex(Vec<Complex32>),
}

impl CoefficientVector {
    pub fn len(&self) -> usize {
        match self {
            Self::Real(values) => values.len(),
            Self::Complex(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_real(&self) -> bool {
        matches!(self, Self::Real(_))
    }

    pub fn as_real(&self) -> Option<&[f32]> {
        match self {
            Self::Real(values) => Some(values),
            Self::Complex(_) => None,
        }
    }

    pub fn as_complex(&self) -> Option<&[Complex32]> {
        match self {
            Self::Real(_) => None,
            Self::Complex(values) => Some(values),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceSummary {
    pub format: SourceFormat,
    pub gamma_only: bool,
    #[serde(flatten)]
    pub dimensions: StoreDimensions,
    pub kpoint_vectors: Vec<[f64; 3]>,
}
