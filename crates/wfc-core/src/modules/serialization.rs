use crate::domain::{BandSelector, CoefficientVector};
use std::fs;
use std::path::Path;

/// One row of an energy table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyRow {
    pub spin: usize,
    pub kpoint: usize,
    pub band: usize,
    pub energy: f64,
}

pub fn format_fixed_f64(value: f64, width: usize, precision: usize) -> String {
    format!(
        "{value:>width$.precision$}",
        width = width,
        precision = precision
    )
}

pub fn format_scientific_f64(value: f64, width: usize, precision: usize) -> String {
    format!(
        "{value:>width$.precision$e}",
        width = width,
        precision = precision
    )
}

pub fn normalize_text_artifact(content: &str) -> String {
    let mut normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    if !normalized.is_empty() && !normalized.ends_with('\n') {
        normalized.push('\n');
    }
    normalized
}

pub fn write_text_artifact(path: &Path, content: &str) -> std::io::Result<()> {
    fs::write(path, normalize_text_artifact(content))
}

pub fn render_energy_table(rows: &[EnergyRow]) -> String {
    let mut output = String::from("#  spin kpoint   band       energy(eV)\n");
    for row in rows {
        output.push_str(&format!(
            "{:>7}{:>7}{:>7}{}\n",
            row.spin,
            row.kpoint,
            row.band,
            format_fixed_f64(row.energy, 17, 8)
        ));
    }
    output
}

/// One line per orbital: 1-based index, then the real part and, for complex
/// vectors, the imaginary part.
pub fn render_coefficients(selector: BandSelector, coefficients: &CoefficientVector) -> String {
    let mut output = format!("# {} orbitals={}\n", selector, coefficients.len());
    match coefficients {
        CoefficientVector::Real(values) => {
            for (orbital, value) in values.iter().enumerate() {
                output.push_str(&format!(
                    "{:>7}{}\n",
                    orbital + 1,
                    format_scientific_f64(f64::from(*value), 17, 8)
                ));
            }
        }
        CoefficientVector::Complex(values) => {
            for (orbital, value) in values.iter().enumerate() {
                output.push_str(&format!(
                    "{:>7}{}{}\n",
                    orbital + 1,
                    format_scientific_f64(f64::from(value.re), 17, 8),
                    format_scientific_f64(f64::from(value.im), 17, 8)
                ));
            }
        }
    }
    output
}
