//! Story archive format
//!
//! This crate implements the portable archive that carries one collection
//! between devices.
//!
//! ## Archive Structure
//!
//! ```text
//! archive.storybundle.zip
//! ├── manifest.json          - format version, collection/owner/language descriptors
//! └── content/
//!     ├── 01.md              - one frame-text blob per story
//!     ├── 02.md
//!     ├── thumbnail.jpg      - optional, raw binary
//!     └── user-data.json     - optional, favorites
//! ```
//!
//! Archives written by older exporters keep stories under `ingredients/`;
//! the reader accepts both folders.
//!
//! ## Layers
//!
//! - [`frame_text`]: story blob <-> frames, pure
//! - [`archive`]: named entries <-> ZIP bytes, no semantics
//! - [`manifest`]: [`ExportManifest`] <-> manifest.json

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod archive;
pub mod error;
pub mod frame_text;
pub mod manifest;
pub mod types;

pub use archive::{ArchiveReader, ArchiveWriter};
pub use error::{BundleError, BundleResult};
pub use frame_text::{
    decode_story, encode_story, frame_gaps, reference_collision, DecodedFrame, DecodedStory,
};
pub use manifest::{ExportManifest, ManifestCodec};
pub use types::{
    paths, ArchiveEntry, ArchiveLimits, FavoriteFrame, UserData, ARCHIVE_EXTENSION,
    DEFAULT_COMPRESSION_LEVEL, MANIFEST_FORMAT_VERSION, MAX_COMPRESSION_LEVEL,
};
