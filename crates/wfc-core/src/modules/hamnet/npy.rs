//! Minimal `.npy` loader for little-endian float arrays.
//!
//! Layout: `\x93NUMPY` | major | minor | header_len (u16 for v1, u32 for
//! v2/v3) | python-dict header | raw C-order data.

use crate::domain::{CoefficientVector, WfcError, WfcResult};
use byteorder::{ByteOrder, LittleEndian};
use num_complex::Complex32;

const NUMPY_MAGIC: &[u8; 6] = b"\x93NUMPY";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum NpyDtype {
    F32,
    F64,
    Complex64,
}

impl NpyDtype {
    fn from_descr(descr: &str) -> Option<Self> {
        match descr {
            "<f4" => Some(Self::F32),
            "<f8" => Some(Self::F64),
            "<c8" => Some(Self::Complex64),
            _ => None,
        }
    }

    pub(super) const fn element_size(self) -> usize {
        match self {
            Self::F32 => 4,
            Self::F64 | Self::Complex64 => 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct NpyArray {
    pub(super) dtype: NpyDtype,
    pub(super) shape: Vec<usize>,
    data: Vec<u8>,
}

impl NpyArray {
    pub(super) fn element_count(&self) -> usize {
        self.shape.iter().product()
    }

    /// Real values widened to f64; complex arrays are rejected.
    pub(super) fn to_f64s(&self, artifact_name: &str) -> WfcResult<Vec<f64>> {
        let count = self.element_count();
        match self.dtype {
            NpyDtype::F32 => {
                let mut values = vec![0.0_f32; count];
                LittleEndian::read_f32_into(&self.data, &mut values);
                Ok(values.into_iter().map(f64::from).collect())
            }
            NpyDtype::F64 => {
                let mut values = vec![0.0_f64; count];
                LittleEndian::read_f64_into(&self.data, &mut values);
                Ok(values)
            }
            NpyDtype::Complex64 => Err(WfcError::malformed_header(format!(
                "{} must hold real values",
                artifact_name
            ))),
        }
    }

    /// One C-order row of `width` elements: real dtypes narrowed to f32,
    /// `<c8` paired into complex values.
    pub(super) fn coefficient_row(&self, row: usize, width: usize) -> CoefficientVector {
        let size = self.dtype.element_size();
        let bytes = &self.data[row * width * size..(row + 1) * width * size];
        match self.dtype {
            NpyDtype::F32 => {
                let mut values = vec![0.0_f32; width];
                LittleEndian::read_f32_into(bytes, &mut values);
                CoefficientVector::Real(values)
            }
            NpyDtype::F64 => CoefficientVector::Real(
                bytes
                    .chunks_exact(8)
                    .map(|chunk| LittleEndian::read_f64(chunk) as f32)
                    .collect(),
            ),
            NpyDtype::Complex64 => CoefficientVector::Complex(
                bytes
                    .chunks_exact(8)
                    .map(|chunk| {
                        Complex32::new(
                            LittleEndian::read_f32(&chunk[..4]),
                            LittleEndian::read_f32(&chunk[4..]),
                        )
                    })
                    .collect(),
            ),
        }
    }
}

pub(super) fn parse_npy(artifact_name: &str, bytes: &[u8]) -> WfcResult<NpyArray> {
    if bytes.len() < 10 || &bytes[..6] != NUMPY_MAGIC {
        return Err(npy_error(artifact_name, "missing \\x93NUMPY magic"));
    }

    let major = bytes[6];
    let (header_len, header_start) = match major {
        1 => (usize::from(LittleEndian::read_u16(&bytes[8..10])), 10),
        2 | 3 => {
            if bytes.len() < 12 {
                return Err(npy_error(artifact_name, "header length is cut short"));
            }
            (LittleEndian::read_u32(&bytes[8..12]) as usize, 12)
        }
        other => {
            return Err(npy_error(
                artifact_name,
                format!("unsupported format version {}.{}", other, bytes[7]),
            ));
        }
    };

    let data_start = header_start + header_len;
    if bytes.len() < data_start {
        return Err(npy_error(artifact_name, "header is cut short"));
    }
    let header = std::str::from_utf8(&bytes[header_start..data_start])
        .map_err(|error| npy_error(artifact_name, format!("header is not UTF-8: {}", error)))?
        .trim();

    let descr = quoted_value(header, "descr")
        .ok_or_else(|| npy_error(artifact_name, "header has no 'descr'"))?;
    let dtype = NpyDtype::from_descr(descr)
        .ok_or_else(|| npy_error(artifact_name, format!("unsupported dtype '{}'", descr)))?;

    if fortran_order(header) {
        return Err(npy_error(artifact_name, "Fortran-ordered arrays are not supported"));
    }
    let shape = parse_shape(header).map_err(|reason| npy_error(artifact_name, reason))?;

    let declared = shape
        .iter()
        .try_fold(dtype.element_size(), |bytes, &dim| bytes.checked_mul(dim))
        .ok_or_else(|| npy_error(artifact_name, format!("shape {:?} overflows", shape)))?;
    let available = bytes.len() - data_start;
    if available < declared {
        return Err(WfcError::TruncatedRecord {
            offset: data_start as u64,
            declared: declared as u64,
            available: available as u64,
        });
    }

    Ok(NpyArray {
        dtype,
        shape,
        data: bytes[data_start..data_start + declared].to_vec(),
    })
}

fn quoted_value<'a>(header: &'a str, key: &str) -> Option<&'a str> {
    let after_key = &header[header.find(&format!("'{}'", key))? + key.len() + 2..];
    let open = after_key.find('\'')? + 1;
    let close = after_key[open..].find('\'')?;
    Some(&after_key[open..open + close])
}

fn fortran_order(header: &str) -> bool {
    header
        .find("'fortran_order'")
        .map(|start| {
            header[start + "'fortran_order'".len()..]
                .trim_start_matches([':', ' '])
                .starts_with("True")
        })
        .unwrap_or(false)
}

fn parse_shape(header: &str) -> Result<Vec<usize>, String> {
    let start = header.find("'shape'").ok_or("header has no 'shape'")?;
    let after = &header[start..];
    let open = after.find('(').ok_or("shape is not a tuple")?;
    let close = after.find(')').ok_or("shape tuple is unterminated")?;
    after[open + 1..close]
        .split(',')
        .map(str::trim)
        .filter(|dim| !dim.is_empty())
        .map(|dim| {
            dim.parse::<usize>()
                .map_err(|_| format!("invalid shape dimension '{}'", dim))
        })
        .collect()
}

fn npy_error(artifact_name: &str, reason: impl AsRef<str>) -> WfcError {
    WfcError::malformed_header(format!("{}: {}", artifact_name, reason.as_ref()))
}
