use super::CliError;
use super::helpers::{SourceArgs, emit_text};
use anyhow::Context;
use serde::Serialize;
use std::path::PathBuf;
use wfc_core::modules::serialization::{
    EnergyRow, format_fixed_f64, render_coefficients, render_energy_table,
};
use wfc_core::{BandSelector, SourceSummary, WavefunctionSource, open_source};

#[derive(clap::Args)]
pub(super) struct InfoArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
pub(super) struct EnergiesArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Restrict to one spin channel (1-based)
    #[arg(long)]
    spin: Option<usize>,

    /// Restrict to one k-point (1-based)
    #[arg(long)]
    kpoint: Option<usize>,

    /// Print rows as a JSON array
    #[arg(long)]
    json: bool,

    /// Write the table to a file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(clap::Args)]
pub(super) struct CoeffArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Spin channel (1-based)
    #[arg(long)]
    spin: usize,

    /// K-point (1-based)
    #[arg(long)]
    kpoint: usize,

    /// Band (1-based)
    #[arg(long)]
    band: usize,

    /// Write the listing to a file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct EnergyRecord {
    spin: usize,
    kpoint: usize,
    band: usize,
    energy_ev: f64,
}

pub(super) fn run_info_command(args: InfoArgs) -> Result<i32, CliError> {
    let config = args.source.resolve()?;
    let source = open_source(&config)?;
    let summary = source.summary();

    if args.json {
        let rendered = serde_json::to_string_pretty(&summary)
            .context("failed to serialize source summary")?;
        println!("{}", rendered);
    } else {
        print!("{}", render_summary(&summary));
    }
    Ok(0)
}

pub(super) fn run_energies_command(args: EnergiesArgs) -> Result<i32, CliError> {
    let config = args.source.resolve()?;
    let mut source = open_source(&config)?;
    let dims = source.dimensions();

    let spins = match args.spin {
        Some(spin) => vec![spin],
        None => (1..=dims.spin_count).collect(),
    };
    let kpoints = match args.kpoint {
        Some(kpoint) => vec![kpoint],
        None => (1..=dims.kpoint_count).collect(),
    };

    let rows = collect_energy_rows(source.as_mut(), &spins, &kpoints)?;
    tracing::debug!(rows = rows.len(), "collected band energies");

    let content = if args.json {
        let records = rows
            .iter()
            .map(|row| EnergyRecord {
                spin: row.spin,
                kpoint: row.kpoint,
                band: row.band,
                energy_ev: row.energy,
            })
            .collect::<Vec<_>>();
        serde_json::to_string_pretty(&records).context("failed to serialize energy rows")?
    } else {
        render_energy_table(&rows)
    };
    emit_text(args.output.as_deref(), &content)?;
    Ok(0)
}

pub(super) fn run_coeff_command(args: CoeffArgs) -> Result<i32, CliError> {
    let config = args.source.resolve()?;
    let mut source = open_source(&config)?;
    let selector = BandSelector::new(args.spin, args.kpoint, args.band);

    let coefficients = source.read_band_coefficients(selector)?;
    emit_text(
        args.output.as_deref(),
        &render_coefficients(selector, &coefficients),
    )?;
    Ok(0)
}

fn collect_energy_rows(
    source: &mut dyn WavefunctionSource,
    spins: &[usize],
    kpoints: &[usize],
) -> Result<Vec<EnergyRow>, CliError> {
    let mut rows = Vec::new();
    for &spin in spins {
        for &kpoint in kpoints {
            let energies = source.band_energies(spin, kpoint)?;
            rows.extend(
                energies
                    .into_iter()
                    .enumerate()
                    .map(|(index, energy)| EnergyRow {
                        spin,
                        kpoint,
                        band: index + 1,
                        energy,
                    }),
            );
        }
    }
    Ok(rows)
}

fn render_summary(summary: &SourceSummary) -> String {
    let dims = summary.dimensions;
    let mut output = format!(
        "format: {}\ngamma_only: {}\nspins: {}\nkpoints: {}\nbands: {}\norbitals: {}\n",
        summary.format,
        summary.gamma_only,
        dims.spin_count,
        dims.kpoint_count,
        dims.band_count,
        dims.orbital_count
    );
    for (index, vector) in summary.kpoint_vectors.iter().enumerate() {
        output.push_str(&format!(
            "kpoint {:>4}:{}{}{}\n",
            index + 1,
            format_fixed_f64(vector[0], 14, 8),
            format_fixed_f64(vector[1], 14, 8),
            format_fixed_f64(vector[2], 14, 8)
        ));
    }
    output
}
