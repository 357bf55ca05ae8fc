use super::header::WfsxHeader;
use super::record::RecordReader;
use crate::common::constants::RECORD_FRAMING_BYTES;
use crate::domain::{BandSelector, StoreDimensions, WfcError, WfcResult};
use std::io::{Read, Seek};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BandRecord {
    pub energy: f64,
    /// Start of the coefficient record (its leading length marker).
    pub payload_offset: u64,
}

/// Random-access table over every (spin, k-point, band) of a WFSX stream.
#[derive(Debug, Clone, PartialEq)]
pub struct BandIndex {
    dimensions: StoreDimensions,
    records: Vec<BandRecord>,
    kpoint_vectors: Vec<[f64; 3]>,
}

impl BandIndex {
    pub fn dimensions(&self) -> StoreDimensions {
        self.dimensions
    }

    pub fn band_count(&self) -> usize {
        self.dimensions.band_count
    }

    pub fn record(&self, selector: BandSelector) -> WfcResult<BandRecord> {
        let slot = self.dimensions.flat_index(selector)?;
        Ok(self.records[slot])
    }

    pub fn kpoint_vectors(&self) -> &[[f64; 3]] {
        &self.kpoint_vectors
    }

    pub fn energies(&self, spin: usize, kpoint: usize) -> WfcResult<Vec<f64>> {
        let first = self.dimensions.flat_index(BandSelector::new(spin, kpoint, 1))?;
        Ok(self.records[first..first + self.dimensions.band_count]
            .iter()
            .map(|record| record.energy)
            .collect())
    }
}

/// Smallest (k-point, spin) preamble: k-vector record (index + 3 doubles),
/// skipped spin record, band-count record.
const MIN_BLOCK_PREAMBLE_BYTES: u64 =
    (4 + 24 + RECORD_FRAMING_BYTES) + RECORD_FRAMING_BYTES + (4 + RECORD_FRAMING_BYTES);
/// Skipped band-index record plus the energy record of one band.
const MIN_BAND_RECORD_BYTES: u64 = RECORD_FRAMING_BYTES + (8 + RECORD_FRAMING_BYTES);

/// Fails with `TruncatedRecord` when `required` bytes cannot fit in what is
/// left of the stream.
fn ensure_remaining<R: Read + Seek>(reader: &RecordReader<R>, required: u64) -> WfcResult<()> {
    let available = reader.stream_len().saturating_sub(reader.position());
    if required > available {
        return Err(WfcError::TruncatedRecord {
            offset: reader.position(),
            declared: required,
            available,
        });
    }
    Ok(())
}

/// Walks every (k-point, spin) block once, k-point outer and spin inner,
/// recording energies and payload offsets without decoding coefficients.
pub fn build_band_index<R: Read + Seek>(
    reader: &mut RecordReader<R>,
    header: &WfsxHeader,
) -> WfcResult<BandIndex> {
    let nk = header.kpoint_count;
    let ns = header.spin_count;
    let payload_bytes = header.coefficient_payload_bytes() as u64;
    let block_count = (nk as u64).saturating_mul(ns as u64);
    let per_band = MIN_BAND_RECORD_BYTES.saturating_add(payload_bytes + RECORD_FRAMING_BYTES);

    // Declared counts are bounded by the stream before any table is sized.
    ensure_remaining(reader, block_count.saturating_mul(MIN_BLOCK_PREAMBLE_BYTES))?;
    let mut kpoint_vectors = vec![[0.0_f64; 3]; nk];
    let mut band_count: Option<u32> = None;
    let mut records: Vec<BandRecord> = Vec::new();

    for ik in 0..nk {
        for is in 0..ns {
            // Later spins overwrite the vector of the same k-point unchecked.
            let kvec = reader
                .read_record(None)?
                .f64s_at(4, 3, "k-point vector")?;
            kpoint_vectors[ik] = [kvec[0], kvec[1], kvec[2]];

            reader.skip_record(None)?;

            let declared = reader.read_record(None)?.i32_scalar("band count")?;
            let declared = u32::try_from(declared).map_err(|_| {
                WfcError::malformed_header(format!(
                    "band count at k-point {}, spin {} is negative ({})",
                    ik + 1,
                    is + 1,
                    declared
                ))
            })?;

            let nb = match band_count {
                None => {
                    band_count = Some(declared);
                    let band_bytes = u64::from(declared).saturating_mul(per_band);
                    let later_blocks = block_count - 1;
                    ensure_remaining(
                        reader,
                        band_bytes.saturating_add(later_blocks.saturating_mul(
                            MIN_BLOCK_PREAMBLE_BYTES.saturating_add(band_bytes),
                        )),
                    )?;
                    let nb = declared as usize;
                    records = vec![BandRecord::default(); block_count as usize * nb];
                    nb
                }
                Some(expected) if expected == declared => expected as usize,
                Some(expected) => {
                    return Err(WfcError::BandCountMismatch {
                        kpoint: ik + 1,
                        spin: is + 1,
                        expected,
                        actual: declared,
                    });
                }
            };

            let block = (is * nk + ik) * nb;
            for ib in 0..nb {
                reader.skip_record(None)?;
                let energy = reader.read_record(None)?.f64s(1, "band energy")?[0];

                let payload = reader.skip_record(None)?;
                if payload.payload_len < payload_bytes {
                    return Err(WfcError::malformed_header(format!(
                        "coefficient record at byte {} holds {} bytes but the header implies {}",
                        payload.start, payload.payload_len, payload_bytes
                    )));
                }

                records[block + ib] = BandRecord {
                    energy,
                    payload_offset: payload.start,
                };
            }
        }
        tracing::trace!(kpoint = ik + 1, "indexed k-point block");
    }

    let trailing = reader.stream_len() - reader.position();
    if trailing > 0 {
        tracing::debug!(trailing, "ignoring bytes after the last WFSX block");
    }

    let dimensions = StoreDimensions {
        spin_count: ns,
        kpoint_count: nk,
        band_count: band_count.unwrap_or(0) as usize,
        orbital_count: header.orbital_count,
    };
    Ok(BandIndex {
        dimensions,
        records,
        kpoint_vectors,
    })
}
