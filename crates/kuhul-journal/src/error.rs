//! Error types for kuhul-journal

use std::path::PathBuf;
use thiserror::Error;

/// Journal error type
#[derive(Debug, Error)]
pub enum Error {
    /// Reading, writing or syncing a log file failed
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stored line is not a valid record
    #[error("Malformed record at {}:{line}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// A record could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Engine-level failure
    #[error(transparent)]
    Core(#[from] kuhul_core::Error),
}

/// Result type for journal operations
pub type Result<T> = std::result::Result<T, Error>;
