//! Shared numeric constants and fixed on-disk layout sizes.

/// Rydberg to electron-volt conversion used by the ABACUS text reader.
pub const RY2EV: f64 = 13.605_662_285_137_f64;

/// Size of one Fortran record length marker.
pub const RECORD_MARKER_BYTES: u64 = 4;
/// Leading plus trailing length markers around every record payload.
pub const RECORD_FRAMING_BYTES: u64 = 2 * RECORD_MARKER_BYTES;

/// Width of the fixed species / symmetry label fields in the WFSX orbital table.
pub const ORBITAL_LABEL_BYTES: usize = 20;
/// One orbital-table row: `i32`, label, `i32`, `i32`, label.
pub const ORBITAL_ROW_BYTES: usize = 4 + ORBITAL_LABEL_BYTES + 4 + 4 + ORBITAL_LABEL_BYTES;

/// Spin multiplicities above this value are clamped when read from WFSX headers.
pub const MAX_SPIN_COUNT: i32 = 4;

pub const COEFFICIENT_SCALAR_BYTES: usize = 4;
