//! Import and export pipelines for story archives
//!
//! This crate orchestrates the lower layers:
//! - Export: stored collection -> archive file or bytes
//! - Import: archive -> stored collection, with the conflict policy
//! - Batch persistence in bounded storage transactions
//! - Configuration from `storybundle.toml`
//!
//! The engine is the only component that knows about:
//! - Write ordering across owner, language, collection and content rows
//! - Mapping layer errors onto the import error taxonomy
//! - Progress reporting
//!
//! [`MemoryStore`] and [`MemoryImageStore`] implement the collaborator traits
//! in memory for tests and embedding.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod batch;
pub mod config;
pub mod conflict;
pub mod error;
pub mod export;
pub mod import;
pub mod memory;
pub mod progress;

pub use batch::{BatchReport, BatchWriter};
pub use config::{BundleConfig, CONFIG_FILE_NAME};
pub use conflict::{resolve_conflict, ConflictDecision};
pub use error::{EngineError, EngineResult};
pub use export::{xxh3_hex, ExportInfo, ExportOptions, Exporter};
pub use import::{ArchiveSummary, ImportOptions, ImportOutcome, ImportStage, Importer};
pub use memory::{MemoryImageStore, MemoryStore};
pub use progress::{ProgressFn, ProgressReporter};
