//! Import pipeline: one archive into local storage
//!
//! ## State machine
//!
//! ```text
//! Start -> ArchiveOpened -> ManifestValidated -> ConflictChecked
//!       -> { Skipped | ContentDecoded -> Persisted } -> Done
//! ```
//!
//! Any state may move to the absorbing `Failed`. The public API never
//! returns `Err`: every path ends in an [`ImportOutcome`].
//!
//! ## Write order
//!
//! Every story is decoded before the first storage write. Writes then go
//! owner, language, collection, stories, frames, thumbnail. A failure part
//! way through leaves earlier writes in place; there is no rollback.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use storybundle_bundle::{
    decode_story, paths, ArchiveReader, BundleError, ExportManifest, ManifestCodec, UserData,
};
use storybundle_core::{
    ErrorDetails, ErrorKind, FrameRecord, ImageStore, ImportError, LibraryStore,
    OwnerDescriptor, StoredCollection, StoryRecord,
};
use tracing::{debug, info, warn};

use crate::batch::BatchWriter;
use crate::config::BundleConfig;
use crate::conflict::{resolve_conflict, ConflictDecision};
use crate::error::{EngineError, EngineResult};
use crate::progress::ProgressReporter;

// =============================================================================
// Public types
// =============================================================================

/// Import behavior switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportOptions {
    /// Replace a collection that is already installed
    pub overwrite_existing: bool,
    /// Accept any manifest format version
    pub skip_version_check: bool,
}

/// Position in the import state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportStage {
    /// Nothing done yet
    Start,
    /// Container opened and entries read
    ArchiveOpened,
    /// Manifest parsed and accepted
    ManifestValidated,
    /// Local collection compared with the incoming one
    ConflictChecked,
    /// Import stopped by the conflict policy
    Skipped,
    /// Every story decoded in memory
    ContentDecoded,
    /// All rows and assets written
    Persisted,
    /// Finished successfully
    Done,
    /// Stopped by an error
    Failed,
}

impl ImportStage {
    /// Stable name for logs
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportStage::Start => "START",
            ImportStage::ArchiveOpened => "ARCHIVE_OPENED",
            ImportStage::ManifestValidated => "MANIFEST_VALIDATED",
            ImportStage::ConflictChecked => "CONFLICT_CHECKED",
            ImportStage::Skipped => "SKIPPED",
            ImportStage::ContentDecoded => "CONTENT_DECODED",
            ImportStage::Persisted => "PERSISTED",
            ImportStage::Done => "DONE",
            ImportStage::Failed => "FAILED",
        }
    }
}

impl fmt::Display for ImportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one import attempt
///
/// Exactly one holds: imported (`success` with an id), skipped, or failed
/// (`success == false` with errors).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportOutcome {
    /// True when the collection was written
    pub success: bool,
    /// True when the conflict policy left local data untouched
    pub skipped: bool,
    /// Id of the imported collection
    pub imported_collection_id: Option<String>,
    /// Why the import was skipped or failed
    pub errors: Vec<ImportError>,
    /// Non-fatal notices from a successful import
    pub warnings: Vec<ImportError>,
    /// Stage the pipeline ended in
    pub stage: ImportStage,
    /// Story rows written
    pub stories_imported: usize,
    /// Frame rows written
    pub frames_imported: usize,
}

impl ImportOutcome {
    fn imported(
        collection_id: String,
        stories: usize,
        frames: usize,
        warnings: Vec<ImportError>,
    ) -> Self {
        Self {
            success: true,
            skipped: false,
            imported_collection_id: Some(collection_id),
            errors: Vec::new(),
            warnings,
            stage: ImportStage::Done,
            stories_imported: stories,
            frames_imported: frames,
        }
    }

    fn skipped(error: ImportError) -> Self {
        Self {
            success: false,
            skipped: true,
            imported_collection_id: None,
            errors: vec![error],
            warnings: Vec::new(),
            stage: ImportStage::Skipped,
            stories_imported: 0,
            frames_imported: 0,
        }
    }

    fn failed(error: ImportError) -> Self {
        Self {
            success: false,
            skipped: false,
            imported_collection_id: None,
            errors: vec![error],
            warnings: Vec::new(),
            stage: ImportStage::Failed,
            stories_imported: 0,
            frames_imported: 0,
        }
    }

    /// True when the import stopped on an error
    pub fn is_failed(&self) -> bool {
        !self.success && !self.skipped
    }

    /// First error, if any
    pub fn error(&self) -> Option<&ImportError> {
        self.errors.first()
    }
}

/// Read-only view of an archive and how it relates to local storage
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveSummary {
    /// Parsed manifest
    pub manifest: ExportManifest,
    /// Story numbers found, ascending
    pub story_numbers: Vec<u32>,
    /// Content folder the stories were found in
    pub content_dir: &'static str,
    /// Whether a thumbnail is embedded
    pub has_thumbnail: bool,
    /// Whether favorites are embedded
    pub has_user_data: bool,
    /// Version installed locally
    pub existing_version: Option<String>,
    /// What a plain import (no overwrite) would do
    pub conflict: ConflictDecision,
}

/// Imports archives into a [`LibraryStore`] and an [`ImageStore`]
pub struct Importer {
    store: Arc<dyn LibraryStore>,
    images: Arc<dyn ImageStore>,
    config: BundleConfig,
}

/// Everything needed to persist, built before the first write
struct DecodedContent {
    stories: Vec<StoryRecord>,
    frames: Vec<FrameRecord>,
    thumbnail: Option<Vec<u8>>,
}

// =============================================================================
// Import
// =============================================================================

impl Importer {
    /// Create an importer over the given collaborators
    pub fn new(
        store: Arc<dyn LibraryStore>,
        images: Arc<dyn ImageStore>,
        config: BundleConfig,
    ) -> Self {
        Self {
            store,
            images,
            config,
        }
    }

    /// Configuration in use
    pub fn config(&self) -> &BundleConfig {
        &self.config
    }

    /// Import an archive file
    ///
    /// A file that cannot be read fails with a retryable `FILE_READ_ERROR`.
    pub fn import_file(
        &self,
        path: &Path,
        options: &ImportOptions,
        on_progress: &mut dyn FnMut(u8, &str),
    ) -> ImportOutcome {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(
                    target: "storybundle::import",
                    path = ?path,
                    error = %e,
                    "Cannot read archive"
                );
                return ImportOutcome::failed(
                    ImportError::new(
                        ErrorKind::FileReadError,
                        format!("Cannot read '{}': {}", path.display(), e),
                    )
                    .retryable(),
                );
            }
        };
        self.import_bytes(&bytes, options, on_progress)
    }

    /// Import an in-memory archive
    pub fn import_bytes(
        &self,
        bytes: &[u8],
        options: &ImportOptions,
        on_progress: &mut dyn FnMut(u8, &str),
    ) -> ImportOutcome {
        let mut progress = ProgressReporter::new(on_progress);
        let mut stage = ImportStage::Start;

        match self.run(bytes, options, &mut progress, &mut stage) {
            Ok(outcome) => outcome,
            Err(error) => {
                warn!(
                    target: "storybundle::import",
                    stage = %stage,
                    kind = %error.kind,
                    code = error.code,
                    message = %error.message,
                    "Import failed"
                );
                ImportOutcome::failed(error)
            }
        }
    }

    /// Describe an archive without writing anything
    ///
    /// # Errors
    ///
    /// Fails when the archive cannot be opened, has no valid manifest or
    /// local storage cannot be queried.
    pub fn inspect(&self, bytes: &[u8]) -> EngineResult<ArchiveSummary> {
        let reader = ArchiveReader::open_with_limits(bytes, &self.config.archive_limits())?;
        let manifest = ManifestCodec::read_from(&reader)?;
        let (content_dir, stories) = story_entries(&reader);

        let existing_version = self
            .store
            .get_collection(&manifest.collection.id)?
            .map(|c| c.descriptor.version);
        let conflict = resolve_conflict(existing_version.as_deref(), &manifest.collection, false);

        Ok(ArchiveSummary {
            story_numbers: stories.keys().copied().collect(),
            content_dir,
            has_thumbnail: thumbnail_of(&reader).is_some(),
            has_user_data: reader.contains(paths::USER_DATA),
            existing_version,
            conflict,
            manifest,
        })
    }

    fn run(
        &self,
        bytes: &[u8],
        options: &ImportOptions,
        progress: &mut ProgressReporter<'_>,
        stage: &mut ImportStage,
    ) -> Result<ImportOutcome, ImportError> {
        // Open
        progress.report(0, "Opening archive");
        let reader = ArchiveReader::open_with_limits(bytes, &self.config.archive_limits())
            .map_err(bundle_error)?;
        advance(stage, ImportStage::ArchiveOpened);

        // Manifest
        progress.report(10, "Reading manifest");
        let manifest = ManifestCodec::read_from(&reader).map_err(bundle_error)?;
        self.validate_manifest(&manifest, options)?;
        advance(stage, ImportStage::ManifestValidated);

        // Conflict
        progress.report(20, "Checking for conflicts");
        let collection_id = manifest.collection.id.clone();
        let existing = self
            .store
            .get_collection(&collection_id)
            .map_err(|e| EngineError::from(e).to_import_error())?;
        let existing_version = existing.as_ref().map(|c| c.descriptor.version.as_str());

        let mut warnings = Vec::new();
        match resolve_conflict(existing_version, &manifest.collection, options.overwrite_existing) {
            ConflictDecision::Skip(error) => {
                advance(stage, ImportStage::Skipped);
                info!(
                    target: "storybundle::import",
                    collection_id = %collection_id,
                    kind = %error.kind,
                    recommendation = ?error.recommendation(),
                    "Import skipped"
                );
                return Ok(ImportOutcome::skipped(error));
            }
            ConflictDecision::Proceed { warning } => {
                if let Some(warning) = warning {
                    warn!(
                        target: "storybundle::import",
                        collection_id = %collection_id,
                        message = %warning.message,
                        "Overwriting with older version"
                    );
                    warnings.push(warning);
                }
            }
        }
        advance(stage, ImportStage::ConflictChecked);

        // Decode
        progress.report(30, "Decoding stories");
        let (content, user_data_warning) = self.decode(&reader, &collection_id)?;
        warnings.extend(user_data_warning);
        advance(stage, ImportStage::ContentDecoded);

        // Persist
        progress.report(50, "Saving collection");
        let replacing = existing.is_some();
        self.persist(manifest, replacing, &content, progress)
            .map_err(|e| e.to_import_error())?;
        advance(stage, ImportStage::Persisted);

        advance(stage, ImportStage::Done);
        progress.report(100, "Import complete");
        info!(
            target: "storybundle::import",
            collection_id = %collection_id,
            stories = content.stories.len(),
            frames = content.frames.len(),
            replaced = replacing,
            "Imported collection"
        );

        Ok(ImportOutcome::imported(
            collection_id,
            content.stories.len(),
            content.frames.len(),
            warnings,
        ))
    }

    fn validate_manifest(
        &self,
        manifest: &ExportManifest,
        options: &ImportOptions,
    ) -> Result<(), ImportError> {
        let collection = &manifest.collection;
        let details = || ErrorDetails {
            collection_id: Some(collection.id.clone()),
            collection_name: Some(collection.display_name.clone()),
            owner: Some(collection.owner_username.clone()),
            language: Some(collection.language_code.clone()),
            ..Default::default()
        };

        if !options.skip_version_check && !manifest.is_supported_format() {
            return Err(ImportError::new(
                ErrorKind::VersionIncompatible,
                format!(
                    "Manifest format version {} is not supported (expected {})",
                    manifest.format_version,
                    storybundle_bundle::MANIFEST_FORMAT_VERSION
                ),
            )
            .with_details(ErrorDetails {
                incoming_version: Some(manifest.format_version.clone()),
                ..details()
            }));
        }

        if manifest.language.code != collection.language_code {
            return Err(ImportError::new(
                ErrorKind::MissingDependencies,
                format!(
                    "Manifest language '{}' does not match collection language '{}'",
                    manifest.language.code, collection.language_code
                ),
            )
            .with_details(details()));
        }

        if let Some(owner) = manifest
            .owner
            .as_ref()
            .filter(|owner| owner.username != collection.owner_username)
        {
            return Err(ImportError::new(
                ErrorKind::MissingDependencies,
                format!(
                    "Manifest owner '{}' does not match collection owner '{}'",
                    owner.username, collection.owner_username
                ),
            )
            .with_details(details()));
        }

        Ok(())
    }

    fn decode(
        &self,
        reader: &ArchiveReader,
        collection_id: &str,
    ) -> Result<(DecodedContent, Option<ImportError>), ImportError> {
        let (content_dir, entries) = story_entries(reader);
        if entries.is_empty() {
            return Err(ImportError::new(
                ErrorKind::CorruptedData,
                "Archive contains no story entries",
            ));
        }
        debug!(
            target: "storybundle::import",
            content_dir,
            stories = entries.len(),
            "Located story entries"
        );

        let (user_data, warning) = match reader.read_text(paths::USER_DATA) {
            Ok(None) => (UserData::default(), None),
            Ok(Some(json)) => match serde_json::from_str::<UserData>(json) {
                Ok(data) => (data, None),
                Err(e) => (UserData::default(), Some(user_data_warning(e.to_string()))),
            },
            Err(e) => (UserData::default(), Some(user_data_warning(e.to_string()))),
        };

        let mut stories = Vec::with_capacity(entries.len());
        let mut frames = Vec::new();
        let mut dropped = 0;

        for (number, path) in entries {
            let text = reader
                .read_text(path)
                .map_err(bundle_error)?
                .ok_or_else(|| bundle_error(BundleError::missing_entry(path)))?;

            let decoded = decode_story(number, text);
            dropped += decoded.dropped_frames;

            let (mut story, story_frames) = decoded.into_records(collection_id, number);
            story.is_favorite = user_data.is_story_favorite(number);
            stories.push(story);
            frames.extend(story_frames.into_iter().map(|mut f| {
                f.is_favorite = user_data.is_frame_favorite(f.story_number, f.frame_number);
                f
            }));
        }

        if dropped > 0 {
            warn!(
                target: "storybundle::import",
                collection_id = %collection_id,
                dropped,
                "Malformed frames were dropped while decoding"
            );
        }

        Ok((
            DecodedContent {
                stories,
                frames,
                thumbnail: thumbnail_of(reader).map(<[u8]>::to_vec),
            },
            warning,
        ))
    }

    fn persist(
        &self,
        manifest: ExportManifest,
        replacing: bool,
        content: &DecodedContent,
        progress: &mut ProgressReporter<'_>,
    ) -> EngineResult<()> {
        let collection = manifest.collection;
        let store = self.store.as_ref();

        match manifest.owner {
            Some(owner) => store.save_owner(&owner)?,
            None => {
                if store.get_owner(&collection.owner_username)?.is_none() {
                    debug!(
                        target: "storybundle::import",
                        owner = %collection.owner_username,
                        "Manifest has no owner, creating a minimal one"
                    );
                    store.save_owner(&OwnerDescriptor {
                        username: collection.owner_username.clone(),
                        ..Default::default()
                    })?;
                }
            }
        }
        store.save_language(&manifest.language)?;

        let collection_id = collection.id.clone();
        store.save_collection(&StoredCollection::downloaded(collection))?;
        if replacing {
            store.clear_collection_content(&collection_id)?;
        }

        let writer = BatchWriter::new(self.config.story_chunk_size, self.config.frame_chunk_size);
        let report = writer.write(store, &content.stories, &content.frames, &mut |fraction| {
            progress.report_span(55, 95, fraction, "Saving stories")
        })?;
        debug!(
            target: "storybundle::import",
            collection_id = %collection_id,
            transactions = report.transactions,
            "Batch write finished"
        );

        if let Some(thumbnail) = &content.thumbnail {
            progress.report(97, "Saving thumbnail");
            self.images.save_thumbnail(&collection_id, thumbnail)?;
        }

        Ok(())
    }
}

fn advance(stage: &mut ImportStage, next: ImportStage) {
    debug!(
        target: "storybundle::import",
        from = %stage,
        to = %next,
        "Import stage"
    );
    *stage = next;
}

fn bundle_error(e: BundleError) -> ImportError {
    EngineError::from(e).to_import_error()
}

fn user_data_warning(reason: String) -> ImportError {
    ImportError::new(
        ErrorKind::CorruptedData,
        format!("Ignoring unreadable {}: {}", paths::USER_DATA, reason),
    )
}

/// Story entries by number, preferring the current folder over the legacy one
fn story_entries(reader: &ArchiveReader) -> (&'static str, BTreeMap<u32, &str>) {
    let mut current = BTreeMap::new();
    let mut legacy = BTreeMap::new();

    for name in reader.entry_names() {
        let Some(number) = paths::parse_story(name) else {
            continue;
        };
        let folder = match paths::content_dir_of(name) {
            Some(paths::CONTENT_DIR) => &mut current,
            _ => &mut legacy,
        };
        if let Some(previous) = folder.insert(number, name) {
            warn!(
                target: "storybundle::import",
                story = number,
                kept = name,
                ignored = previous,
                "Story number appears twice"
            );
        }
    }

    if current.is_empty() && !legacy.is_empty() {
        (paths::LEGACY_CONTENT_DIR, legacy)
    } else {
        (paths::CONTENT_DIR, current)
    }
}

fn thumbnail_of(reader: &ArchiveReader) -> Option<&[u8]> {
    reader
        .read_bytes(paths::THUMBNAIL)
        .or_else(|| reader.read_bytes(paths::LEGACY_THUMBNAIL))
}
