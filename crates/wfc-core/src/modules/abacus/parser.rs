use crate::domain::{CoefficientVector, WfcError, WfcResult};
use num_complex::Complex32;
use std::fs;
use std::path::Path;
use std::str::FromStr;

pub(super) const KPOINTS_FILE_NAME: &str = "kpoints";

pub(super) fn lowf_file_name(kpoint: usize) -> String {
    format!("LOWF_K_{}.dat", kpoint)
}

/// Contents of one `LOWF_K_<n>.dat` file, energies still in Rydberg.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct LowfBlock {
    pub(super) band_count: usize,
    pub(super) orbital_count: usize,
    pub(super) energies_ry: Vec<f64>,
    pub(super) occupations: Vec<f64>,
    pub(super) coefficients: Vec<CoefficientVector>,
}

pub(super) fn read_input_source(path: &Path, artifact_name: &str) -> WfcResult<String> {
    fs::read_to_string(path).map_err(|source| {
        WfcError::io(
            format!(
                "failed to read ABACUS {} '{}'",
                artifact_name,
                path.display()
            ),
            source,
        )
    })
}

pub(super) fn parse_kpoints_source(source: &str) -> WfcResult<Vec<[f64; 3]>> {
    let mut lines = LineCursor::new(KPOINTS_FILE_NAME, source);

    let count_line = lines.next_line("k-point count")?;
    let declared = count_line
        .split_whitespace()
        .last()
        .ok_or_else(|| abacus_parse_error(KPOINTS_FILE_NAME, 1, "k-point count line is empty"))?;
    let kpoint_count = parse_token::<usize>(declared, KPOINTS_FILE_NAME, 1, "k-point count")?;
    if kpoint_count == 0 {
        return Err(abacus_parse_error(
            KPOINTS_FILE_NAME,
            1,
            "k-point count must be positive",
        ));
    }

    lines.next_line("k-point table heading")?;

    let mut vectors = Vec::new();
    for _ in 0..kpoint_count {
        let row = lines.next_line("k-point row")?;
        let tokens = row.split_whitespace().collect::<Vec<_>>();
        if tokens.len() < 4 {
            return Err(abacus_parse_error(
                KPOINTS_FILE_NAME,
                lines.line_number(),
                "k-point row must hold an index followed by three components",
            ));
        }
        let mut vector = [0.0_f64; 3];
        for (component, token) in vector.iter_mut().zip(&tokens[1..4]) {
            *component = parse_token(token, KPOINTS_FILE_NAME, lines.line_number(), "k-vector")?;
        }
        vectors.push(vector);
    }
    Ok(vectors)
}

pub(super) fn parse_lowf_source(
    artifact_name: &str,
    source: &str,
    gamma_only: bool,
) -> WfcResult<LowfBlock> {
    let mut lines = LineCursor::new(artifact_name, source);

    lines.next_line("k-point index")?;
    lines.next_line("k-vector")?;
    let band_count = lines.first_token::<usize>("band count")?;
    let orbital_count = lines.first_token::<usize>("orbital count")?;

    let scalars_per_band = if gamma_only {
        orbital_count
    } else {
        orbital_count.checked_mul(2).ok_or_else(|| {
            abacus_parse_error(artifact_name, lines.line_number(), "orbital count overflows")
        })?
    };

    // Counts come from the file; tables grow only as bands are actually read.
    let mut energies_ry = Vec::new();
    let mut occupations = Vec::new();
    let mut coefficients = Vec::new();
    for _ in 0..band_count {
        lines.next_line("band index")?;
        energies_ry.push(lines.first_token::<f64>("band energy")?);
        occupations.push(lines.first_token::<f64>("band occupation")?);

        let scalars = lines.scalars(scalars_per_band)?;
        coefficients.push(if gamma_only {
            CoefficientVector::Real(scalars)
        } else {
            CoefficientVector::Complex(
                scalars
                    .chunks_exact(2)
                    .map(|pair| Complex32::new(pair[0], pair[1]))
                    .collect(),
            )
        });
    }

    Ok(LowfBlock {
        band_count,
        orbital_count,
        energies_ry,
        occupations,
        coefficients,
    })
}

struct LineCursor<'a> {
    artifact_name: &'a str,
    lines: std::str::Lines<'a>,
    line_number: usize,
}

impl<'a> LineCursor<'a> {
    fn new(artifact_name: &'a str, source: &'a str) -> Self {
        Self {
            artifact_name,
            lines: source.lines(),
            line_number: 0,
        }
    }

    fn line_number(&self) -> usize {
        self.line_number
    }

    fn next_line(&mut self, what: &str) -> WfcResult<&'a str> {
        let line = self.lines.next().ok_or_else(|| {
            abacus_parse_error(
                self.artifact_name,
                self.line_number + 1,
                format!("unexpected end of file while reading {}", what),
            )
        })?;
        self.line_number += 1;
        Ok(line)
    }

    fn first_token<T: FromStr>(&mut self, what: &str) -> WfcResult<T> {
        let line = self.next_line(what)?;
        let token = line.split_whitespace().next().ok_or_else(|| {
            abacus_parse_error(
                self.artifact_name,
                self.line_number,
                format!("{} line is empty", what),
            )
        })?;
        parse_token(token, self.artifact_name, self.line_number, what)
    }

    /// Collects exactly `count` coefficient tokens from as many lines as they
    /// span. A band's values never share a line with the next band.
    fn scalars(&mut self, count: usize) -> WfcResult<Vec<f32>> {
        let mut values = Vec::new();
        while values.len() < count {
            let line = self.next_line("coefficients")?;
            for token in line.split_whitespace() {
                values.push(parse_token::<f32>(
                    token,
                    self.artifact_name,
                    self.line_number,
                    "coefficient",
                )?);
            }
        }
        if values.len() != count {
            return Err(abacus_parse_error(
                self.artifact_name,
                self.line_number,
                format!("expected {} coefficients, found {}", count, values.len()),
            ));
        }
        Ok(values)
    }
}

fn parse_token<T: FromStr>(
    token: &str,
    artifact_name: &str,
    line_number: usize,
    what: &str,
) -> WfcResult<T> {
    token.parse::<T>().map_err(|_| {
        abacus_parse_error(
            artifact_name,
            line_number,
            format!("invalid {} token '{}'", what, token),
        )
    })
}

fn abacus_parse_error(artifact_name: &str, line_number: usize, message: impl AsRef<str>) -> WfcError {
    WfcError::malformed_header(format!(
        "{} line {}: {}",
        artifact_name,
        line_number,
        message.as_ref()
    ))
}

#[cfg(test)]
mod tests {
    use super::{lowf_file_name, parse_kpoints_source, parse_lowf_source};
    use crate::domain::WfcError;
    use num_complex::Complex32;

    #[test]
    fn kpoints_table_reads_count_from_last_token() {
        let source = "nkstot now = 2\n KPOINTS DIRECT_X DIRECT_Y DIRECT_Z WEIGHT\n 1 0 0 0 0.5\n 2 0.5 0.25 0 0.5\n";
        let vectors = parse_kpoints_source(source).expect("kpoints should parse");

        assert_eq!(vectors, vec![[0.0, 0.0, 0.0], [0.5, 0.25, 0.0]]);
    }

    #[test]
    fn kpoints_with_missing_rows_are_malformed() {
        let error = parse_kpoints_source("nkstot = 3\nheading\n1 0 0 0\n").expect_err("short");

        assert!(matches!(error, WfcError::MalformedHeader { .. }));
        assert!(error.to_string().contains("line 4"));
    }

    #[test]
    fn kpoints_rows_need_three_components() {
        let error = parse_kpoints_source("nkstot = 1\nheading\n1 0.5\n").expect_err("one comp");

        assert!(error.to_string().contains("three components"));
    }

    #[test]
    fn gamma_block_spans_coefficients_over_lines() {
        let source = "1 (index of k points)\n0 0 0\n2 (number of bands)\n3 (number of orbitals)\n\
                      1 (band)\n-0.5 (Ry)\n2 (occupations)\n0.1 0.2\n0.3\n\
                      2 (band)\n0.25 (Ry)\n0 (occupations)\n1 2 3\n";
        let block = parse_lowf_source("LOWF_K_1.dat", source, true).expect("block");

        assert_eq!((block.band_count, block.orbital_count), (2, 3));
        assert_eq!(block.energies_ry, vec![-0.5, 0.25]);
        assert_eq!(block.occupations, vec![2.0, 0.0]);
        assert_eq!(block.coefficients[0].as_real(), Some(&[0.1_f32, 0.2, 0.3][..]));
        assert_eq!(block.coefficients[1].as_real(), Some(&[1.0_f32, 2.0, 3.0][..]));
    }

    #[test]
    fn complex_block_interleaves_real_and_imaginary_parts() {
        let source = "1\n0 0 0\n1\n2\n1\n0.0\n1.0\n1 -1 0.5 2\n";
        let block = parse_lowf_source("LOWF_K_1.dat", source, false).expect("block");

        assert_eq!(
            block.coefficients[0].as_complex(),
            Some(&[Complex32::new(1.0, -1.0), Complex32::new(0.5, 2.0)][..])
        );
    }

    #[test]
    fn surplus_coefficients_on_a_line_are_malformed() {
        let source = "1\n0 0 0\n1\n2\n1\n0.0\n1.0\n1 2 3\n";
        let error = parse_lowf_source("LOWF_K_1.dat", source, true).expect_err("three for two");

        assert!(error.to_string().contains("expected 2 coefficients, found 3"));
    }

    #[test]
    fn huge_declared_counts_fail_at_end_of_file() {
        let bands = format!("1\n0 0 0\n{}\n2\n1\n0.0\n1.0\n1 2\n", usize::MAX);
        let error = parse_lowf_source("LOWF_K_1.dat", &bands, true).expect_err("one band only");
        assert!(error.to_string().contains("line 9: unexpected end of file"));

        let orbitals = format!("1\n0 0 0\n1\n{}\n", usize::MAX);
        let error = parse_lowf_source("LOWF_K_1.dat", &orbitals, false).expect_err("overflow");
        assert!(error.to_string().contains("orbital count overflows"));

        let kpoints = format!("nkstot = {}\nheading\n1 0 0 0\n", usize::MAX);
        let error = parse_kpoints_source(&kpoints).expect_err("one row only");
        assert!(matches!(error, WfcError::MalformedHeader { .. }));
    }

    #[test]
    fn bad_tokens_name_the_file_and_line() {
        let source = "1\n0 0 0\nmany\n";
        let error = parse_lowf_source("LOWF_K_7.dat", source, true).expect_err("bad count");

        assert_eq!(
            error.to_string(),
            "malformed header: LOWF_K_7.dat line 3: invalid band count token 'many'"
        );
        assert_eq!(lowf_file_name(7), "LOWF_K_7.dat");
    }
}
