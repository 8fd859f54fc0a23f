//! Error types for the story library
//!
//! Two families live here:
//! - [`StoreError`]: failures reported by the storage / image collaborators
//! - [`ImportError`]: the structured, user-facing error carried in import
//!   outcomes, with a stable numeric code per [`ErrorKind`]
//!
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use thiserror::Error;

// =============================================================================
// Error taxonomy
// =============================================================================

/// Kind of an import/export failure
///
/// Codes are stable and suitable as localization keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Existing and incoming versions differ and no overwrite was requested
    VersionConflict,
    /// The identical version is already present
    DuplicateCollection,
    /// Archive unreadable or content unparseable
    CorruptedData,
    /// Referenced owner or language cannot be resolved
    MissingDependencies,
    /// Reading input failed
    FileReadError,
    /// Writing output failed
    FileWriteError,
    /// Archive has no manifest entry
    MissingManifest,
    /// Manifest entry is not the expected shape
    InvalidManifest,
    /// Manifest format version is not supported
    VersionIncompatible,
    /// Requested collection or its stories do not exist
    NotFound,
    /// Anything else
    UnknownError,
}

impl ErrorKind {
    /// Stable numeric code
    pub fn code(self) -> u32 {
        match self {
            ErrorKind::VersionConflict => 1001,
            ErrorKind::DuplicateCollection => 1002,
            ErrorKind::CorruptedData => 1003,
            ErrorKind::MissingDependencies => 1004,
            ErrorKind::FileReadError => 1005,
            ErrorKind::FileWriteError => 1006,
            ErrorKind::MissingManifest => 1007,
            ErrorKind::InvalidManifest => 1008,
            ErrorKind::VersionIncompatible => 1009,
            ErrorKind::NotFound => 1010,
            ErrorKind::UnknownError => 1999,
        }
    }

    /// Broad family a kind belongs to
    ///
    /// Manifest problems are a flavour of corrupted data.
    pub fn family(self) -> ErrorKind {
        match self {
            ErrorKind::MissingManifest | ErrorKind::InvalidManifest => ErrorKind::CorruptedData,
            other => other,
        }
    }

    /// Wire name, e.g. `VERSION_CONFLICT`
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::VersionConflict => "VERSION_CONFLICT",
            ErrorKind::DuplicateCollection => "DUPLICATE_COLLECTION",
            ErrorKind::CorruptedData => "CORRUPTED_DATA",
            ErrorKind::MissingDependencies => "MISSING_DEPENDENCIES",
            ErrorKind::FileReadError => "FILE_READ_ERROR",
            ErrorKind::FileWriteError => "FILE_WRITE_ERROR",
            ErrorKind::MissingManifest => "MISSING_MANIFEST",
            ErrorKind::InvalidManifest => "INVALID_MANIFEST",
            ErrorKind::VersionIncompatible => "VERSION_INCOMPATIBLE",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::UnknownError => "UNKNOWN_ERROR",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Suggested caller action for a conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    /// Keep the local collection
    Skip,
    /// Replace the local collection with the incoming one
    Overwrite,
    /// Combine both (reserved, never produced by the importer)
    Merge,
}

/// Structured context attached to an [`ImportError`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Version present locally
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_version: Option<String>,
    /// Version carried by the archive
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incoming_version: Option<String>,
    /// Collection id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<String>,
    /// Collection display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_name: Option<String>,
    /// Owner username
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// Language code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Suggested action
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<Recommendation>,
}

/// A structured import error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("[{kind} {code}] {message}")]
pub struct ImportError {
    /// Kind of failure
    pub kind: ErrorKind,
    /// Stable numeric code (mirrors `kind.code()`)
    pub code: u32,
    /// Human readable message
    pub message: String,
    /// Whether retrying the same call may succeed
    pub can_retry: bool,
    /// Optional structured context
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ErrorDetails>,
}

impl ImportError {
    /// Create an error of the given kind
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: kind.code(),
            message: message.into(),
            can_retry: false,
            details: None,
        }
    }

    /// Mark the error as retryable
    pub fn retryable(mut self) -> Self {
        self.can_retry = true;
        self
    }

    /// Attach structured details
    pub fn with_details(mut self, details: ErrorDetails) -> Self {
        self.details = Some(details);
        self
    }

    /// Recommendation carried in the details, if any
    pub fn recommendation(&self) -> Option<Recommendation> {
        self.details.as_ref().and_then(|d| d.recommendation)
    }
}

// =============================================================================
// Collaborator errors
// =============================================================================

/// Errors reported by the storage and image collaborators
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O error from the backing medium
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A write referenced a row that does not exist
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// A transaction could not be committed
    #[error("Transaction failed: {0}")]
    Transaction(String),

    /// Backend-specific failure
    #[error("Storage error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Create a constraint violation error
    pub fn constraint(msg: impl Into<String>) -> Self {
        Self::Constraint(msg.into())
    }

    /// Create a transaction error
    pub fn transaction(msg: impl Into<String>) -> Self {
        Self::Transaction(msg.into())
    }

    /// Create a backend error
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Best-effort classification into the import taxonomy
    ///
    /// Backend errors only carry text, so they are classified by what the
    /// message mentions.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Io(e) => match e.kind() {
                io::ErrorKind::NotFound | io::ErrorKind::UnexpectedEof => ErrorKind::FileReadError,
                _ => ErrorKind::FileWriteError,
            },
            StoreError::Constraint(_) => ErrorKind::MissingDependencies,
            StoreError::Transaction(msg) | StoreError::Backend(msg) => classify_message(msg),
        }
    }
}

/// Infer a kind from free-form failure text
pub fn classify_message(msg: &str) -> ErrorKind {
    let lower = msg.to_ascii_lowercase();
    if lower.contains("foreign key") || lower.contains("constraint") {
        ErrorKind::MissingDependencies
    } else if lower.contains("disk full")
        || lower.contains("no space")
        || lower.contains("read-only")
        || lower.contains("permission")
    {
        ErrorKind::FileWriteError
    } else if lower.contains("corrupt") || lower.contains("malformed") {
        ErrorKind::CorruptedData
    } else {
        ErrorKind::UnknownError
    }
}

/// Result type for collaborator operations
pub type StoreResult<T> = Result<T, StoreError>;
