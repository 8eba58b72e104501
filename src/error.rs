//! Error types

use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while building trips
#[derive(Error, Debug)]
pub enum TripError {
    /// Invalid input for the call: coordinate bounds, blank ids or paths...
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A raw line that could not be turned into a ping
    #[error("Malformed line: {0}")]
    Parse(String),

    #[error("I/O failure on `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV failure: {0}")]
    Csv(#[from] csv::Error),

    #[error("GPX failure: {0}")]
    Gpx(String),

    #[error("Worker pool failure: {0}")]
    Pool(String),
}

impl TripError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, TripError>;
