//! Typed errors for the filtering pipeline.
//!
//! Application-level plumbing uses `anyhow`; the conditions a caller may want
//! to match on (or a test may want to assert) get their own variants here.

use thiserror::Error;

/// Errors with a defined meaning in the filtering contract.
#[derive(Debug, Error)]
pub enum FiltError {
    /// A predicate referenced a column the table does not carry.
    #[error("column `{0}` not present in table")]
    MissingColumn(String),

    /// A matched sequence description has no second `/`-delimited field, so
    /// the relabeled header cannot be built. The legacy script crashed here;
    /// we surface it as this error (fatal under `--strict`, otherwise the
    /// record is skipped with a warning).
    #[error("description `{0}` has no '/'-delimited region field")]
    MalformedDescription(String),
}
