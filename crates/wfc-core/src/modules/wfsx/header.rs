use super::record::RecordReader;
use crate::common::constants::{
    COEFFICIENT_SCALAR_BYTES, MAX_SPIN_COUNT, ORBITAL_LABEL_BYTES, ORBITAL_ROW_BYTES,
};
use crate::domain::{WfcError, WfcResult};
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read, Seek};

/// One row of the WFSX orbital table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrbitalMeta {
    pub atom_index: i32,
    pub species_label: [u8; ORBITAL_LABEL_BYTES],
    pub orbital_index: i32,
    pub config_index: i32,
    pub symmetry_label: [u8; ORBITAL_LABEL_BYTES],
}

impl OrbitalMeta {
    pub fn species(&self) -> String {
        label_text(&self.species_label)
    }

    pub fn symmetry(&self) -> String {
        label_text(&self.symmetry_label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WfsxHeader {
    pub kpoint_count: usize,
    pub gamma_only: bool,
    /// Spin multiplicity after clamping.
    pub spin_count: usize,
    /// Value as written in the file, before clamping.
    pub declared_spin_count: i32,
    pub orbital_count: usize,
    pub orbitals: Vec<OrbitalMeta>,
}

impl WfsxHeader {
    /// Bytes of one coefficient payload as the header describes it.
    pub fn coefficient_payload_bytes(&self) -> usize {
        let scalars = if self.gamma_only {
            self.orbital_count
        } else {
            2 * self.orbital_count
        };
        scalars * COEFFICIENT_SCALAR_BYTES
    }
}

/// Consumes the four leading header records starting at byte 0 and leaves the
/// reader positioned at the first k-point block.
pub fn decode_header<R: Read + Seek>(reader: &mut RecordReader<R>) -> WfcResult<WfsxHeader> {
    let counts = reader.read_record(Some(0))?.i32s(2, "k-point count / gamma flag")?;
    let declared_kpoints = counts[0];
    let gamma_only = counts[1] != 0;
    if declared_kpoints < 1 {
        return Err(WfcError::malformed_header(format!(
            "k-point count must be positive, found {}",
            declared_kpoints
        )));
    }

    let declared_spin_count = reader.read_record(None)?.i32_scalar("spin count")?;
    let spin_count = clamp_spin_count(declared_spin_count)?;

    let declared_orbitals = reader.read_record(None)?.i32_scalar("orbital count")?;
    if declared_orbitals < 0 {
        return Err(WfcError::malformed_header(format!(
            "orbital count must be non-negative, found {}",
            declared_orbitals
        )));
    }
    let orbital_count = declared_orbitals as usize;

    let table = reader.read_record(None)?;
    table.require(orbital_count * ORBITAL_ROW_BYTES, "orbital table")?;
    let orbitals = decode_orbital_table(&table.payload, orbital_count)
        .map_err(|source| WfcError::io("failed to decode orbital table", source))?;

    tracing::debug!(
        kpoints = declared_kpoints,
        gamma_only,
        spins = spin_count,
        orbitals = orbital_count,
        "decoded WFSX header"
    );

    Ok(WfsxHeader {
        kpoint_count: declared_kpoints as usize,
        gamma_only,
        spin_count,
        declared_spin_count,
        orbital_count,
        orbitals,
    })
}

fn clamp_spin_count(declared: i32) -> WfcResult<usize> {
    let clamped = declared.min(MAX_SPIN_COUNT);
    if clamped != declared {
        tracing::warn!(declared, clamped, "clamping WFSX spin count");
    }
    match clamped {
        1 | 2 | 4 => Ok(clamped as usize),
        other => Err(WfcError::malformed_header(format!(
            "spin count must be 1, 2 or 4, found {}",
            other
        ))),
    }
}

fn decode_orbital_table(payload: &[u8], orbital_count: usize) -> std::io::Result<Vec<OrbitalMeta>> {
    let mut cursor = Cursor::new(payload);
    let mut orbitals = Vec::with_capacity(orbital_count);
    for _ in 0..orbital_count {
        let atom_index = cursor.read_i32::<LittleEndian>()?;
        let mut species_label = [0_u8; ORBITAL_LABEL_BYTES];
        cursor.read_exact(&mut species_label)?;
        let orbital_index = cursor.read_i32::<LittleEndian>()?;
        let config_index = cursor.read_i32::<LittleEndian>()?;
        let mut symmetry_label = [0_u8; ORBITAL_LABEL_BYTES];
        cursor.read_exact(&mut symmetry_label)?;
        orbitals.push(OrbitalMeta {
            atom_index,
            species_label,
            orbital_index,
            config_index,
            symmetry_label,
        });
    }
    Ok(orbitals)
}

fn label_text(field: &[u8]) -> String {
    String::from_utf8_lossy(field)
        .trim_end_matches(|character: char| character == '\0' || character.is_whitespace())
        .trim_start()
        .to_string()
}
