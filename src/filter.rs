//! TableFilter: drop clinical records with missing or invalid fields.
//!
//! The rule set reproduces the curation pass applied to the 2020-08 GISAID
//! export, including its catalogue of misspelled "unknown" placeholder
//! strings. The literals are matched exactly; no trimming or case folding is
//! applied, because the table really does contain `"unknown "` and
//! `" unknown"` as distinct values.
//!
//! Removal happens in two phases:
//! 1. required-field drops (`Missing` rules), applied sequentially;
//! 2. all equality rules evaluated independently against the phase-1 table,
//!    with the union of matched row positions removed in a single pass, so a
//!    row matching several rules is removed exactly once.
//!
//! The original script built its index sets through dynamic variable lookup
//! (`missing1` .. `missing16`); here each rule is a named [`Predicate`] and
//! the outcome keeps a per-predicate hit list for logging and tests.

use std::collections::BTreeSet;

use crate::errors::FiltError;
use crate::table::ClinicalTable;

/// Normalized column names the default rule set operates on.
pub const STATUS_COL: &str = "Patient_status";
pub const AGE_COL: &str = "Patient_age";
pub const HOST_COL: &str = "Host";
pub const ACCESSION_COL: &str = "Accession_ID";

/// How a [`Predicate`] decides a match.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Rule {
    /// Field is empty (NA cell in the source TSV).
    Missing,
    /// Field equals this literal, byte for byte.
    Equals(&'static str),
}

/// A named discard rule over one column. A record matching ANY predicate is
/// dropped.
#[derive(Clone, Copy, Debug)]
pub struct Predicate {
    pub name: &'static str,
    pub column: &'static str,
    pub rule: Rule,
}

const fn eq(name: &'static str, column: &'static str, lit: &'static str) -> Predicate {
    Predicate { name, column, rule: Rule::Equals(lit) }
}

/// The curation rule set, in the order the original pass applied it.
///
/// The two `Missing` rules run sequentially first; everything after them is
/// unioned. `"\u{FEFF}unknown"` is a byte-order-mark artifact that leaked
/// into the status column of some submissions.
pub const DEFAULT_PREDICATES: &[Predicate] = &[
    Predicate { name: "status_missing", column: STATUS_COL, rule: Rule::Missing },
    Predicate { name: "age_missing", column: AGE_COL, rule: Rule::Missing },
    eq("status_unknown_trailing_space", STATUS_COL, "unknown "),
    eq("status_not_known", STATUS_COL, "Not known"),
    eq("status_unkown", STATUS_COL, "unkown"),
    eq("status_unknown_leading_space", STATUS_COL, " unknown"),
    eq("status_unknow", STATUS_COL, "unknow"),
    eq("status_Unknow", STATUS_COL, "Unknow"),
    eq("status_bom_unknown", STATUS_COL, "\u{FEFF}unknown"),
    eq("status_dash", STATUS_COL, "-"),
    eq("status_uncknown", STATUS_COL, "uncknown"),
    eq("status_Unkown", STATUS_COL, "Unkown"),
    eq("host_environment", HOST_COL, "Environment"),
    eq("host_panthera_tigris", HOST_COL, "Panthera tigris jacksoni"),
    eq("accession_known_bad", ACCESSION_COL, "EPI_ISL_494759"),
    eq("age_unknown", AGE_COL, "unknown"),
    eq("age_Unknown", AGE_COL, "Unknown"),
    eq("age_unkown", AGE_COL, "unkown"),
];

/// Row positions matched by one predicate (positions in the table the
/// predicate was evaluated against).
#[derive(Clone, Debug)]
pub struct PredicateHits {
    pub name: &'static str,
    pub rows: Vec<usize>,
}

/// Result of [`filter`]: the surviving table, the ordered accession list,
/// and the per-predicate hit map.
#[derive(Debug)]
pub struct FilterOutcome {
    pub table: ClinicalTable,
    /// `Accession_ID` values of the filtered table, in row order.
    pub retained: Vec<String>,
    pub hits: Vec<PredicateHits>,
}

/// Apply the predicate set to a table.
///
/// Matching zero rows is not an error; an empty output table is valid. A
/// predicate naming a column the table lacks fails with
/// [`FiltError::MissingColumn`] before any row is touched.
pub fn filter(table: &ClinicalTable, predicates: &[Predicate]) -> Result<FilterOutcome, FiltError> {
    // Resolve every referenced column up front so a bad predicate fails even
    // when it would have matched nothing.
    for p in predicates {
        table.column_index(p.column)?;
    }
    let accession_idx = table.column_index(ACCESSION_COL)?;

    let mut hits: Vec<PredicateHits> = Vec::with_capacity(predicates.len());

    // Phase 1: required-field drops, sequential. Each Missing rule scans the
    // table left behind by the previous one.
    let mut rows: Vec<Vec<String>> = table.rows.clone();
    for p in predicates.iter().filter(|p| p.rule == Rule::Missing) {
        let idx = table.column_index(p.column)?;
        let matched: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, r)| r[idx].is_empty())
            .map(|(i, _)| i)
            .collect();
        hits.push(PredicateHits { name: p.name, rows: matched });
        rows.retain(|r| !r[idx].is_empty());
    }

    // Phase 2: equality rules, evaluated independently against the phase-1
    // table; remove the union once.
    let mut union: BTreeSet<usize> = BTreeSet::new();
    for p in predicates.iter() {
        let lit = match p.rule {
            Rule::Equals(lit) => lit,
            Rule::Missing => continue,
        };
        let idx = table.column_index(p.column)?;
        let matched: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, r)| r[idx] == lit)
            .map(|(i, _)| i)
            .collect();
        union.extend(matched.iter().copied());
        hits.push(PredicateHits { name: p.name, rows: matched });
    }

    let kept: Vec<Vec<String>> = rows
        .into_iter()
        .enumerate()
        .filter(|(i, _)| !union.contains(i))
        .map(|(_, r)| r)
        .collect();

    let retained: Vec<String> = kept.iter().map(|r| r[accession_idx].clone()).collect();
    let table = ClinicalTable { columns: table.columns.clone(), rows: kept };

    Ok(FilterOutcome { table, retained, hits })
}
