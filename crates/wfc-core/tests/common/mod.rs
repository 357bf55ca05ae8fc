#![allow(dead_code)]

use std::fs;
use std::path::Path;

pub fn frame(payload: &[u8]) -> Vec<u8> {
    let len = (payload.len() as u32).to_le_bytes();
    [&len[..], payload, &len[..]].concat()
}

/// Band energy written for a 0-based (spin, k-point, band).
pub fn band_energy(spin: usize, kpoint: usize, band: usize) -> f64 {
    -7.25 + 0.875 * band as f64 + 0.03125 * kpoint as f64 - 0.5 * spin as f64 + 3.0e-11
}

/// Raw f32 scalars of one coefficient record.
pub fn band_scalars(spin: usize, kpoint: usize, band: usize, scalars: usize) -> Vec<f32> {
    (0..scalars)
        .map(|slot| {
            let sign = if slot % 2 == 0 { 1.0 } else { -1.0 };
            sign * (1.0 + spin as f32 * 0.125 + kpoint as f32 * 0.25 + band as f32 + slot as f32 / 8.0)
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct SyntheticWfsx {
    pub gamma_only: bool,
    pub spins: i32,
    pub kpoints: Vec<[f64; 3]>,
    pub orbitals: usize,
    /// Band count written for each (k-point, spin) block, in file order.
    pub band_counts: Vec<i32>,
    /// Added to the first k-vector component of every spin block `is` as
    /// `is * shift`, so later spins write a different vector.
    pub spin_kvec_shift: f64,
    pub trailing_bytes: Vec<u8>,
}

impl SyntheticWfsx {
    pub fn new(gamma_only: bool, spins: i32, kpoints: usize, orbitals: usize, bands: i32) -> Self {
        let spin_blocks = spins.clamp(0, 4) as usize;
        Self {
            gamma_only,
            spins,
            kpoints: (0..kpoints)
                .map(|ik| [0.125 * ik as f64, 0.0, -0.25 * ik as f64])
                .collect(),
            orbitals,
            band_counts: vec![bands; kpoints * spin_blocks],
            spin_kvec_shift: 0.0,
            trailing_bytes: Vec::new(),
        }
    }

    pub fn scalars_per_band(&self) -> usize {
        if self.gamma_only {
            self.orbitals
        } else {
            2 * self.orbitals
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend(frame(
            &[
                (self.kpoints.len() as i32).to_le_bytes(),
                i32::from(self.gamma_only).to_le_bytes(),
            ]
            .concat(),
        ));
        bytes.extend(frame(&self.spins.to_le_bytes()));
        bytes.extend(frame(&(self.orbitals as i32).to_le_bytes()));

        let mut table = Vec::new();
        for orbital in 0..self.orbitals {
            table.extend_from_slice(&1_i32.to_le_bytes());
            table.extend_from_slice(b"Si                  ");
            table.extend_from_slice(&((orbital + 1) as i32).to_le_bytes());
            table.extend_from_slice(&1_i32.to_le_bytes());
            table.extend_from_slice(b"3p                  ");
        }
        bytes.extend(frame(&table));

        let spin_blocks = self.spins.clamp(0, 4) as usize;
        let mut block = 0;
        for (ik, kvec) in self.kpoints.iter().enumerate() {
            for is in 0..spin_blocks {
                let mut kpayload = ((ik + 1) as i32).to_le_bytes().to_vec();
                let mut written = *kvec;
                written[0] += is as f64 * self.spin_kvec_shift;
                written
                    .iter()
                    .for_each(|component| kpayload.extend_from_slice(&component.to_le_bytes()));
                kpayload.extend_from_slice(&1.0_f64.to_le_bytes());
                bytes.extend(frame(&kpayload));
                bytes.extend(frame(&((is + 1) as i32).to_le_bytes()));

                let bands = self.band_counts[block];
                bytes.extend(frame(&bands.to_le_bytes()));
                for ib in 0..bands.max(0) as usize {
                    bytes.extend(frame(&((ib + 1) as i32).to_le_bytes()));
                    bytes.extend(frame(&band_energy(is, ik, ib).to_le_bytes()));
                    let payload = band_scalars(is, ik, ib, self.scalars_per_band())
                        .into_iter()
                        .flat_map(f32::to_le_bytes)
                        .collect::<Vec<_>>();
                    bytes.extend(frame(&payload));
                }
                block += 1;
            }
        }
        bytes.extend_from_slice(&self.trailing_bytes);
        bytes
    }

    pub fn write(&self, path: &Path) {
        fs::write(path, self.encode()).expect("synthetic WFSX should be written");
    }
}
