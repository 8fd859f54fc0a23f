//! storybundle - portable archives for offline story collections
//!
//! A collection (ordered stories, each an ordered list of illustrated frames)
//! is exported from local storage into one ZIP archive carrying a JSON
//! manifest, and imported back on another device with version-aware conflict
//! handling.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use storybundle::{BundleConfig, ExportOptions, Exporter, ImportOptions, Importer};
//! use storybundle::{MemoryImageStore, MemoryStore};
//!
//! let store = Arc::new(MemoryStore::new());
//! let images = Arc::new(MemoryImageStore::new());
//!
//! let exporter = Exporter::new(store.clone(), images.clone(), BundleConfig::default());
//! let bytes = exporter.export_to_vec(&ExportOptions::new("owner/name"), &mut |_, _| {})?;
//!
//! let importer = Importer::new(store, images, BundleConfig::default());
//! let outcome = importer.import_bytes(&bytes, &ImportOptions::default(), &mut |_, _| {});
//! assert!(outcome.success || outcome.skipped);
//! ```
//!
//! # Architecture
//!
//! - `storybundle-core`: records, error taxonomy, version comparison, storage traits
//! - `storybundle-bundle`: frame-text, archive and manifest codecs
//! - `storybundle-engine`: export and import pipelines, batch writer, config
//!
//! Storage is reached only through the [`LibraryStore`] and [`ImageStore`]
//! traits; the crate ships in-memory implementations of both.

pub use storybundle_bundle::{
    decode_story, encode_story, paths, reference_collision, ArchiveEntry, ArchiveLimits,
    ArchiveReader, ArchiveWriter, BundleError, ExportManifest, ManifestCodec, UserData,
    MANIFEST_FORMAT_VERSION,
};
pub use storybundle_core::{
    compare_versions, CollectionDescriptor, CollectionMetadata, ErrorDetails, ErrorKind,
    FrameRecord, ImageStore, ImportError, LanguageDescriptor, LibraryStore, OwnerDescriptor,
    OwnerType, Recommendation, StoreError, StoreResult, StoredCollection, StoryMetadata,
    StoryRecord, TextDirection,
};
pub use storybundle_engine::{
    ArchiveSummary, BatchReport, BatchWriter, BundleConfig, ConflictDecision, EngineError,
    EngineResult, ExportInfo, ExportOptions, Exporter, ImportOptions, ImportOutcome, ImportStage,
    Importer, MemoryImageStore, MemoryStore, CONFIG_FILE_NAME,
};
pub use storybundle_engine::{resolve_conflict, xxh3_hex};
