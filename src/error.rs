//! Errors raised while reading whitespace-delimited tables

use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn a text file into a numeric table.
///
/// Line numbers are 1-based and refer to the physical line in the file,
/// comments and blank lines included.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}:{line}: cannot parse '{token}' as a number")]
    Parse {
        path: PathBuf,
        line: usize,
        token: String,
    },

    #[error("{path}:{line}: expected {expected} columns, found {found}")]
    ColumnCount {
        path: PathBuf,
        line: usize,
        expected: usize,
        found: usize,
    },

    /// The table as a whole has the wrong width; no single line is at fault.
    #[error("{path}: table has {found} columns, expected {expected}")]
    Width {
        path: PathBuf,
        expected: usize,
        found: usize,
    },

    #[error("{path}: table has no rows")]
    Empty { path: PathBuf },

    #[error("{path}:{line}: cluster label {value} is not a non-negative integer")]
    InvalidLabel {
        path: PathBuf,
        line: usize,
        value: f64,
    },

    /// `column` is 1-based.
    #[error("{path}:{line}: non-finite value in column {column}")]
    NonFinite {
        path: PathBuf,
        line: usize,
        column: usize,
    },
}
