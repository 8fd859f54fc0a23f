//! Engine error types

use std::io;
use storybundle_bundle::BundleError;
use storybundle_core::{ErrorKind, ImportError, StoreError};
use thiserror::Error;

/// Errors raised by the export pipeline and inside the import pipeline
#[derive(Debug, Error)]
pub enum EngineError {
    /// Collection or its stories absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Referenced owner or language cannot be resolved
    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Storage or image collaborator failure
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Archive, manifest or frame-text failure
    #[error("Bundle error: {0}")]
    Bundle(#[from] BundleError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl EngineError {
    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a missing dependency error
    pub fn missing_dependency(msg: impl Into<String>) -> Self {
        Self::MissingDependency(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Classification into the import/export taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::NotFound(_) => ErrorKind::NotFound,
            EngineError::MissingDependency(_) => ErrorKind::MissingDependencies,
            EngineError::Config(_) => ErrorKind::UnknownError,
            EngineError::Store(e) => e.kind(),
            EngineError::Bundle(e) => e.kind(),
            EngineError::Io(_) => ErrorKind::FileWriteError,
        }
    }

    /// Structured form for outcomes and UI
    pub fn to_import_error(&self) -> ImportError {
        ImportError::new(self.kind(), self.to_string())
    }
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
