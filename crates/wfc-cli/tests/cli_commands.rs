use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn frame(payload: &[u8]) -> Vec<u8> {
    let len = (payload.len() as u32).to_le_bytes();
    [&len[..], payload, &len[..]].concat()
}

fn energy(spin: usize, kpoint: usize, band: usize) -> f64 {
    -4.0 + band as f64 + 0.5 * kpoint as f64 + 0.25 * spin as f64
}

/// Complex two-spin file: 2 k-points, 3 bands, 2 orbitals.
fn write_wfsx(path: &Path) {
    let (kpoints, spins, orbitals, bands) = (2_usize, 2_usize, 2_usize, 3_usize);
    let mut bytes = Vec::new();
    bytes.extend(frame(&[2_i32.to_le_bytes(), 0_i32.to_le_bytes()].concat()));
    bytes.extend(frame(&(spins as i32).to_le_bytes()));
    bytes.extend(frame(&(orbitals as i32).to_le_bytes()));
    let mut table = Vec::new();
    for orbital in 0..orbitals {
        table.extend_from_slice(&1_i32.to_le_bytes());
        table.extend_from_slice(b"Fe                  ");
        table.extend_from_slice(&((orbital + 1) as i32).to_le_bytes());
        table.extend_from_slice(&1_i32.to_le_bytes());
        table.extend_from_slice(b"3d                  ");
    }
    bytes.extend(frame(&table));

    for ik in 0..kpoints {
        for is in 0..spins {
            let mut kvec = ((ik + 1) as i32).to_le_bytes().to_vec();
            for component in [0.5 * ik as f64, 0.0, 0.0] {
                kvec.extend_from_slice(&component.to_le_bytes());
            }
            bytes.extend(frame(&kvec));
            bytes.extend(frame(&((is + 1) as i32).to_le_bytes()));
            bytes.extend(frame(&(bands as i32).to_le_bytes()));
            for ib in 0..bands {
                bytes.extend(frame(&((ib + 1) as i32).to_le_bytes()));
                bytes.extend(frame(&energy(is, ik, ib).to_le_bytes()));
                let payload = (0..2 * orbitals)
                    .map(|slot| (ib * 10 + slot) as f32 * 0.5)
                    .flat_map(f32::to_le_bytes)
                    .collect::<Vec<_>>();
                bytes.extend(frame(&payload));
            }
        }
    }
    fs::write(path, bytes).expect("WFSX fixture should be written");
}

fn fixture() -> (TempDir, PathBuf) {
    let temp = TempDir::new().expect("tempdir should be created");
    let path = temp.path().join("Fe.WFSX");
    write_wfsx(&path);
    (temp, path)
}

fn run_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_wfc-rs"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("wfc-rs should run")
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("temp paths should be UTF-8")
}

#[test]
fn info_json_reports_dimensions_and_kpoints() {
    let (_temp, path) = fixture();
    let output = run_cli(&["info", "--path", path_str(&path), "--json"]);

    assert!(
        output.status.success(),
        "info should succeed, stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let parsed: Value = serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(parsed["format"], "wfsx");
    assert_eq!(parsed["gamma_only"], false);
    assert_eq!(parsed["spin_count"], 2);
    assert_eq!(parsed["kpoint_count"], 2);
    assert_eq!(parsed["band_count"], 3);
    assert_eq!(parsed["orbital_count"], 2);
    assert_eq!(parsed["kpoint_vectors"][1][0], 0.5);
}

#[test]
fn energies_table_covers_every_spin_and_kpoint() {
    let (_temp, path) = fixture();
    let output = run_cli(&["energies", "--path", path_str(&path)]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let rows = stdout
        .lines()
        .filter(|line| !line.starts_with('#'))
        .collect::<Vec<_>>();
    assert_eq!(rows.len(), 2 * 2 * 3);

    let last = rows[rows.len() - 1]
        .split_whitespace()
        .collect::<Vec<_>>();
    assert_eq!(&last[..3], &["2", "2", "3"]);
    let value: f64 = last[3].parse().expect("energy column should be numeric");
    assert!((value - energy(1, 1, 2)).abs() < 1.0e-8);
}

#[test]
fn energies_json_can_be_restricted_and_written_to_a_file() {
    let (temp, path) = fixture();
    let report = temp.path().join("energies.json");
    let output = run_cli(&[
        "energies",
        "--path",
        path_str(&path),
        "--spin",
        "2",
        "--kpoint",
        "1",
        "--json",
        "--output",
        path_str(&report),
    ]);

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    let parsed: Value =
        serde_json::from_str(&fs::read_to_string(&report).expect("report should exist"))
            .expect("report should be JSON");
    let rows = parsed.as_array().expect("rows should be an array");
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["spin"], 2);
    assert_eq!(rows[0]["kpoint"], 1);
    assert_eq!(rows[2]["energy_ev"], energy(1, 0, 2));
}

#[test]
fn coeff_prints_one_line_per_orbital() {
    let (_temp, path) = fixture();
    let output = run_cli(&[
        "coeff",
        "--path",
        path_str(&path),
        "--spin",
        "1",
        "--kpoint",
        "2",
        "--band",
        "2",
    ]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines = stdout.lines().collect::<Vec<_>>();
    assert_eq!(lines[0], "# spin=1 kpoint=2 band=2 orbitals=2");
    assert_eq!(lines.len(), 3);

    let second = lines[2]
        .split_whitespace()
        .map(|token| token.parse::<f64>().expect("numeric column"))
        .collect::<Vec<_>>();
    assert_eq!(second, vec![2.0, 6.0, 6.5]);
}

#[test]
fn out_of_range_band_exits_with_input_validation_code() {
    let (_temp, path) = fixture();
    let output = run_cli(&[
        "coeff",
        "--path",
        path_str(&path),
        "--spin",
        "1",
        "--kpoint",
        "1",
        "--band",
        "4",
    ]);

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: [INPUT.INDEX_OUT_OF_RANGE] band index 4 is out of range"));
    assert!(stderr.contains("FATAL EXIT CODE: 2"));
}

#[test]
fn truncated_file_exits_with_format_code() {
    let (temp, path) = fixture();
    let mut bytes = fs::read(&path).expect("fixture should be readable");
    bytes.truncate(bytes.len() - 3);
    let cut = temp.path().join("cut.WFSX");
    fs::write(&cut, bytes).expect("cut fixture should be written");

    let output = run_cli(&["info", "--path", path_str(&cut)]);
    assert_eq!(output.status.code(), Some(4));
    assert!(String::from_utf8_lossy(&output.stderr).contains("FORMAT.TRUNCATED_RECORD"));
}

#[test]
fn config_file_selects_the_source() {
    let (temp, _path) = fixture();
    let config = temp.path().join("source.json");
    fs::write(&config, r#"{ "format": "wfsx", "path": "Fe.WFSX" }"#)
        .expect("config should be written");

    let output = run_cli(&["info", "--config", path_str(&config)]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("format: wfsx\n"));
    assert!(stdout.contains("bands: 3\n"));
}

#[test]
fn missing_source_flags_are_a_usage_error() {
    let output = run_cli(&["info"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("INPUT.CLI_USAGE"));
}

#[test]
fn missing_file_exits_with_io_code() {
    let temp = TempDir::new().expect("tempdir should be created");
    let output = run_cli(&[
        "info",
        "--path",
        path_str(&temp.path().join("absent.WFSX")),
    ]);

    assert_eq!(output.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&output.stderr).contains("IO.SOURCE_READ"));
}
