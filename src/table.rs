//! Tab-separated clinical table: in-memory model and I/O.
//!
//! The source table is a GISAID patient-metadata export: a header row whose
//! names contain literal spaces (`Patient status`, `Accession ID`, ...), then
//! one row per sample. Column names are normalized to underscores on read so
//! the predicates in [`crate::filter`] can address them uniformly.
//!
//! Missing values are empty fields. The whole table is materialized; these
//! exports are tens of thousands of rows, not millions.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::errors::FiltError;

/// Replace spaces with underscores, as done to every header cell on read.
pub fn normalize_column(name: &str) -> String {
    name.replace(' ', "_")
}

/// A clinical metadata table: normalized column names plus string rows.
///
/// Every cell stays a `String`; nothing in the pipeline needs typed columns,
/// and round-tripping untouched fields byte-for-byte matters more.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClinicalTable {
    /// Header names after space-to-underscore normalization.
    pub columns: Vec<String>,
    /// One entry per record, each padded/truncated to `columns.len()`.
    pub rows: Vec<Vec<String>>,
}

impl ClinicalTable {
    /// Parse a tab-separated table from any reader.
    ///
    /// Ragged rows are tolerated the way pandas tolerates them: short rows
    /// are padded with empty (missing) fields, long rows truncated.
    pub fn from_reader<R: Read>(rdr: R) -> Result<Self> {
        let mut csv = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(true)
            .from_reader(rdr);

        let columns: Vec<String> = csv
            .headers()
            .context("reading table header")?
            .iter()
            .map(normalize_column)
            .collect();

        let width = columns.len();
        let mut rows = Vec::new();
        for rec in csv.records() {
            let rec = rec.context("reading table row")?;
            let mut row: Vec<String> = rec.iter().map(str::to_string).collect();
            row.resize(width, String::new());
            rows.push(row);
        }

        Ok(ClinicalTable { columns, rows })
    }

    /// Parse a tab-separated table from a file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let p = path.as_ref();
        let fh = File::open(p).with_context(|| format!("opening table {}", p.display()))?;
        Self::from_reader(fh)
    }

    /// Index of a (normalized) column name.
    pub fn column_index(&self, name: &str) -> Result<usize, FiltError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| FiltError::MissingColumn(name.to_string()))
    }

    /// All values of one column, in row order.
    pub fn column_values(&self, name: &str) -> Result<Vec<String>, FiltError> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|r| r[idx].clone()).collect())
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the table holds no records (still a valid table).
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write the table as TSV: normalized header, one line per row, no index
    /// column.
    pub fn write<W: Write>(&self, w: W) -> Result<()> {
        let mut wtr = csv::WriterBuilder::new().delimiter(b'\t').from_writer(w);
        wtr.write_record(&self.columns).context("writing table header")?;
        for row in &self.rows {
            wtr.write_record(row).context("writing table row")?;
        }
        wtr.flush().context("flushing table output")?;
        Ok(())
    }

    /// Write the table to a file path.
    pub fn write_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let p = path.as_ref();
        let fh = File::create(p).with_context(|| format!("creating table {}", p.display()))?;
        self.write(BufWriter::new(fh))
    }
}
