use crate::types::TableKind;
use thiserror::Error;

/// Failures while bringing the dataset into memory. All of them abort the run.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to fetch table '{table}' from {location}: {message}")]
    Fetch {
        table: TableKind,
        location: String,
        message: String,
    },

    #[error("Table '{table}' is missing expected column '{column}'")]
    MissingColumn { table: TableKind, column: String },

    #[error("Table '{table}' row {row}: {source}")]
    Parse {
        table: TableKind,
        row: u64,
        #[source]
        source: csv::Error,
    },

    #[error("Table '{table}' is not valid CSV: {source}")]
    Malformed {
        table: TableKind,
        #[source]
        source: csv::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
