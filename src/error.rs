use crate::db::StoreError;
use std::path::PathBuf;
use thiserror::Error;

pub type ImportResult<T> = Result<T, ImportError>;

/// Errors that abort a media import.
///
/// Unacknowledged inserts are not errors; they are reported through
/// [`crate::import::ImportReport`].
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("cannot open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse {} as CSV: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("connection error: {0}")]
    Connection(#[source] StoreError),
    #[error("cannot import {collection}: {source}")]
    Insert {
        collection: String,
        #[source]
        source: StoreError,
    },
    #[error("cannot open log file {}: {source}", .path.display())]
    Log {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ImportError {
    /// True for input errors, raised before any network activity.
    pub fn is_input_error(&self) -> bool {
        matches!(self, ImportError::Open { .. } | ImportError::Parse { .. })
    }
}
