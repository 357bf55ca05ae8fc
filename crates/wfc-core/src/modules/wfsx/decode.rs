use super::record::RecordReader;
use crate::domain::{CoefficientVector, WfcResult};
use num_complex::Complex32;
use std::io::{Read, Seek};

/// Reads the coefficient record at `offset` and shapes it for the basis.
///
/// Gamma-only stores hold one `f32` per orbital. Otherwise each orbital is an
/// interleaved `(re, im)` pair.
pub fn decode_coefficients<R: Read + Seek>(
    reader: &mut RecordReader<R>,
    offset: u64,
    orbital_count: usize,
    gamma_only: bool,
) -> WfcResult<CoefficientVector> {
    let record = reader.read_record(Some(offset))?;
    if gamma_only {
        return Ok(CoefficientVector::Real(
            record.f32s(orbital_count, "real coefficient")?,
        ));
    }

    let scalars = record.f32s(2 * orbital_count, "complex coefficient")?;
    Ok(CoefficientVector::Complex(
        scalars
            .chunks_exact(2)
            .map(|pair| Complex32::new(pair[0], pair[1]))
            .collect(),
    ))
}
