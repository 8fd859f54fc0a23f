//! Bundle error types

use std::io;
use storybundle_core::ErrorKind;
use thiserror::Error;

/// Errors that can occur while building or reading a story archive
#[derive(Debug, Error)]
pub enum BundleError {
    /// Container data is malformed or truncated
    #[error("Corrupted archive: {0}")]
    CorruptedData(String),

    /// An entry exceeds the configured size cap
    #[error("Archive entry '{path}' exceeds {limit} bytes")]
    EntryTooLarge {
        /// Entry path
        path: String,
        /// Configured maximum in bytes
        limit: u64,
    },

    /// The archive has more entries than allowed
    #[error("Archive has {count} entries, limit is {limit}")]
    TooManyEntries {
        /// Entry count found
        count: usize,
        /// Configured maximum
        limit: usize,
    },

    /// A required entry is absent
    #[error("Missing required entry in archive: {0}")]
    MissingEntry(String),

    /// The archive has no manifest.json
    #[error("Archive has no manifest.json")]
    MissingManifest,

    /// manifest.json is not the expected shape
    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    /// Building the archive failed
    #[error("Archive write error: {0}")]
    Write(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BundleError {
    /// Create a corrupted data error
    pub fn corrupted(msg: impl Into<String>) -> Self {
        Self::CorruptedData(msg.into())
    }

    /// Create an invalid manifest error
    pub fn invalid_manifest(msg: impl Into<String>) -> Self {
        Self::InvalidManifest(msg.into())
    }

    /// Create an archive write error
    pub fn write(msg: impl Into<String>) -> Self {
        Self::Write(msg.into())
    }

    /// Create a missing entry error
    pub fn missing_entry(path: impl Into<String>) -> Self {
        Self::MissingEntry(path.into())
    }

    /// Classification into the import/export taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            BundleError::CorruptedData(_)
            | BundleError::EntryTooLarge { .. }
            | BundleError::TooManyEntries { .. }
            | BundleError::MissingEntry(_) => ErrorKind::CorruptedData,
            BundleError::MissingManifest => ErrorKind::MissingManifest,
            BundleError::InvalidManifest(_) => ErrorKind::InvalidManifest,
            BundleError::Write(_) | BundleError::Io(_) => ErrorKind::FileWriteError,
            BundleError::Json(_) => ErrorKind::UnknownError,
        }
    }
}

/// Result type for bundle operations
pub type BundleResult<T> = Result<T, BundleError>;
