#![forbid(unsafe_code)]
//! # clinfilt
//!
//! Clean a GISAID-style clinical metadata table (TSV) and its matching FASTA
//! archive: drop records with missing or placeholder fields, write the
//! filtered table, then copy through only the sequences whose accession
//! identifier survived, relabeling each header.
//!
//! ## Pipeline
//! Two strictly sequential stages, no feedback between them:
//! 1. [`filter::filter`] — evaluate the named validity predicates over the
//!    table and keep the survivors ([`filter::DEFAULT_PREDICATES`] carries
//!    the curation rule set, misspelled placeholder literals included).
//! 2. [`select::select`] — one forward pass over the archive, emitting each
//!    record whose description contains a retained identifier.
//!
//! ## Example
//! ```no_run
//! use clinfilt::{filter, select, table::ClinicalTable};
//!
//! let t = ClinicalTable::from_path("gisaid_hcov-19_table.tsv")?;
//! let out = filter::filter(&t, filter::DEFAULT_PREDICATES)?;
//! out.table.write_path("clinical_filt.tsv")?;
//! select::select_file(
//!     "gisaid_hcov-19.fasta",
//!     &out.retained,
//!     "sequences_filt.fasta",
//!     select::MalformedMode::Skip,
//! )?;
//! # anyhow::Ok(())
//! ```

pub mod errors;
pub mod filter;
pub mod select;
pub mod table;

/// Crate version string (from `CARGO_PKG_VERSION`).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
