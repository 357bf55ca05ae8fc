//! Synthetic WFSX streams for unit tests.

use crate::common::constants::ORBITAL_LABEL_BYTES;

pub(crate) fn frame(payload: &[u8]) -> Vec<u8> {
    let len = payload.len() as u32;
    let mut bytes = Vec::with_capacity(payload.len() + 8);
    bytes.extend_from_slice(&len.to_le_bytes());
    bytes.extend_from_slice(payload);
    bytes.extend_from_slice(&len.to_le_bytes());
    bytes
}

pub(crate) fn label(text: &str) -> [u8; ORBITAL_LABEL_BYTES] {
    let mut field = [b' '; ORBITAL_LABEL_BYTES];
    field[..text.len()].copy_from_slice(text.as_bytes());
    field
}

#[derive(Debug, Clone)]
pub(crate) struct WfsxFixture {
    pub(crate) gamma: bool,
    pub(crate) declared_spins: i32,
    pub(crate) kpoints: Vec<[f64; 3]>,
    pub(crate) orbitals: usize,
    pub(crate) bands: usize,
    /// `(pair, count)` overrides of the band count written for the pair-th
    /// (k-point, spin) block in file order.
    pub(crate) band_count_overrides: Vec<(usize, i32)>,
    /// Spin block `is` writes its k-vector with `is * shift` added to x.
    pub(crate) spin_kvec_shift: f64,
}

impl WfsxFixture {
    pub(crate) fn new(gamma: bool, spins: i32, kpoints: usize, orbitals: usize, bands: usize) -> Self {
        Self {
            gamma,
            declared_spins: spins,
            kpoints: (0..kpoints)
                .map(|ik| [0.1 * ik as f64, -0.05 * ik as f64, 0.25])
                .collect(),
            orbitals,
            bands,
            band_count_overrides: Vec::new(),
            spin_kvec_shift: 0.0,
        }
    }

    pub(crate) fn spin_count(&self) -> usize {
        self.declared_spins.min(4) as usize
    }

    pub(crate) fn energy(spin: usize, kpoint: usize, band: usize) -> f64 {
        -12.5 + 1.375 * band as f64 + 0.0625 * kpoint as f64 + 0.5 * spin as f64 + 1.0e-9
    }

    pub(crate) fn scalars(&self, spin: usize, kpoint: usize, band: usize) -> Vec<f32> {
        let width = if self.gamma { 1 } else { 2 };
        (0..self.orbitals * width)
            .map(|slot| (spin * 1000 + kpoint * 100 + band * 10) as f32 + slot as f32 * 0.5)
            .collect()
    }

    pub(crate) fn header_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend(frame(
            &[
                (self.kpoints.len() as i32).to_le_bytes(),
                i32::from(self.gamma).to_le_bytes(),
            ]
            .concat(),
        ));
        bytes.extend(frame(&self.declared_spins.to_le_bytes()));
        bytes.extend(frame(&(self.orbitals as i32).to_le_bytes()));

        let mut table = Vec::new();
        for orbital in 0..self.orbitals {
            table.extend_from_slice(&((orbital / 2 + 1) as i32).to_le_bytes());
            table.extend_from_slice(&label(if orbital % 2 == 0 { "Ti" } else { "O" }));
            table.extend_from_slice(&((orbital + 1) as i32).to_le_bytes());
            table.extend_from_slice(&1_i32.to_le_bytes());
            table.extend_from_slice(&label("2s"));
        }
        bytes.extend(frame(&table));
        bytes
    }

    pub(crate) fn encode(&self) -> Vec<u8> {
        let mut bytes = self.header_bytes();
        let mut pair = 0;
        for (ik, kvec) in self.kpoints.iter().enumerate() {
            for is in 0..self.spin_count() {
                let mut kpayload = ((ik + 1) as i32).to_le_bytes().to_vec();
                let mut written = *kvec;
                written[0] += is as f64 * self.spin_kvec_shift;
                for component in written {
                    kpayload.extend_from_slice(&component.to_le_bytes());
                }
                bytes.extend(frame(&kpayload));
                bytes.extend(frame(&((is + 1) as i32).to_le_bytes()));

                let written = self
                    .band_count_overrides
                    .iter()
                    .find(|(index, _)| *index == pair)
                    .map(|(_, count)| *count)
                    .unwrap_or(self.bands as i32);
                bytes.extend(frame(&written.to_le_bytes()));

                for ib in 0..written.max(0) as usize {
                    bytes.extend(frame(&((ib + 1) as i32).to_le_bytes()));
                    bytes.extend(frame(&Self::energy(is, ik, ib).to_le_bytes()));
                    let payload = self
                        .scalars(is, ik, ib)
                        .iter()
                        .flat_map(|value| value.to_le_bytes())
                        .collect::<Vec<_>>();
                    bytes.extend(frame(&payload));
                }
                pair += 1;
            }
        }
        bytes
    }
}
