use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use clinfilt::filter::{self, DEFAULT_PREDICATES};
use clinfilt::select::{self, MalformedMode};
use clinfilt::table::ClinicalTable;

/// Filter a clinical metadata table and its matching FASTA archive.
#[derive(Parser)]
#[command(name = "clinfilt")]
#[command(version)]
#[command(about = "Drop clinical records with missing/invalid fields and keep only their sequences", long_about = None)]
struct Cli {
    /// Clinical metadata table (TSV, header row with spaced column names)
    table: PathBuf,

    /// Sequence archive (FASTA)
    fasta: PathBuf,

    /// Filtered table output path
    #[arg(long, default_value = "clinical_filt.tsv")]
    out_table: PathBuf,

    /// Filtered sequence output path
    #[arg(long, default_value = "sequences_filt.fasta")]
    out_fasta: PathBuf,

    /// Abort on a matched record whose description has no '/'-delimited
    /// region field, instead of skipping it with a warning
    #[arg(long)]
    strict: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let table = ClinicalTable::from_path(&cli.table)?;
    log::info!("table: {} records, {} columns", table.len(), table.columns.len());

    let out = filter::filter(&table, DEFAULT_PREDICATES)?;
    for h in &out.hits {
        if !h.rows.is_empty() {
            log::info!("predicate {}: {} record(s)", h.name, h.rows.len());
        }
    }
    log::info!(
        "filter: kept {} of {} records",
        out.table.len(),
        table.len()
    );
    out.table.write_path(&cli.out_table)?;

    let mode = if cli.strict { MalformedMode::Fail } else { MalformedMode::Skip };
    let stats = select::select_file(&cli.fasta, &out.retained, &cli.out_fasta, mode)?;
    log::info!(
        "select: scanned {} record(s), wrote {}, skipped {} malformed",
        stats.scanned,
        stats.written,
        stats.malformed
    );

    println!(
        "{} -> {} ({} records) | {} -> {} ({} sequences)",
        cli.table.display(),
        cli.out_table.display(),
        out.table.len(),
        cli.fasta.display(),
        cli.out_fasta.display(),
        stats.written
    );

    Ok(())
}
