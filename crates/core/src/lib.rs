//! Core types and traits for storybundle
//!
//! This crate defines the foundational types used throughout the system:
//! - Records: CollectionDescriptor, StoryRecord, FrameRecord, OwnerDescriptor, LanguageDescriptor
//! - Typed metadata: CollectionMetadata, StoryMetadata
//! - Error taxonomy: ErrorKind, ImportError, StoreError
//! - Version comparison: compare_versions
//! - Collaborator traits: LibraryStore, ImageStore

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod traits;
pub mod types;
pub mod version;

pub use error::{
    classify_message, ErrorDetails, ErrorKind, ImportError, Recommendation, StoreError,
    StoreResult,
};
pub use traits::{ImageStore, LibraryStore};
pub use types::{
    CollectionDescriptor, CollectionMetadata, ExtraFields, FrameKey, FrameRecord,
    LanguageDescriptor, OwnerDescriptor, OwnerType, StoredCollection, StoryKey, StoryMetadata,
    StoryRecord, TextDirection,
};
pub use version::compare_versions;
