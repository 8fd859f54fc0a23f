//! Export pipeline: one stored collection to one archive
//!
//! ## Stages
//!
//! | Percent | Label                |
//! |---------|----------------------|
//! | 0       | `Loading collection` |
//! | 10–60   | `Encoding stories`   |
//! | 65      | `Adding thumbnail`   |
//! | 70      | `Adding user data`   |
//! | 75      | `Writing manifest`   |
//! | 80      | `Compressing archive`|
//! | 95      | `Writing file`       |
//! | 100     | `Export complete`    |
//!
//! File output is atomic: bytes go to a temp file next to the destination
//! which is then renamed into place.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use storybundle_bundle::{
    encode_story, frame_gaps, paths, reference_collision, ArchiveEntry, ArchiveWriter,
    BundleError, ExportManifest, FavoriteFrame, ManifestCodec, UserData,
};
use storybundle_core::{
    FrameRecord, ImageStore, LanguageDescriptor, LibraryStore, OwnerDescriptor,
    StoredCollection, StoryRecord,
};
use tracing::{debug, info, warn};

use crate::config::BundleConfig;
use crate::error::{EngineError, EngineResult};
use crate::progress::ProgressReporter;

// =============================================================================
// Public types
// =============================================================================

/// What to export and how
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Collection id (`owner/name`)
    pub collection_id: String,
    /// Write favorite flags to `content/user-data.json`
    pub include_user_data: bool,
    /// Embed the collection thumbnail when one exists
    pub include_thumbnails: bool,
    /// Deflate level 0–9; `None` uses the configured default
    pub compression_level: Option<u8>,
}

impl ExportOptions {
    /// Options for a collection with thumbnails on and user data off
    pub fn new(collection_id: impl Into<String>) -> Self {
        Self {
            collection_id: collection_id.into(),
            include_user_data: false,
            include_thumbnails: true,
            compression_level: None,
        }
    }
}

/// Information returned after exporting a collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportInfo {
    /// Collection id of the exported collection
    pub collection_id: String,
    /// Path where the archive was written
    pub path: PathBuf,
    /// Number of story entries in the archive
    pub story_count: usize,
    /// Number of frames across all stories
    pub frame_count: usize,
    /// Size of the archive in bytes
    pub archive_size_bytes: u64,
    /// xxh3 hex digest of the archive bytes
    pub checksum: String,
}

/// Builds archives from a [`LibraryStore`] and an [`ImageStore`]
pub struct Exporter {
    store: Arc<dyn LibraryStore>,
    images: Arc<dyn ImageStore>,
    config: BundleConfig,
}

struct BuiltArchive {
    bytes: Vec<u8>,
    story_count: usize,
    frame_count: usize,
}

struct CollectionSnapshot {
    collection: StoredCollection,
    owner: Option<OwnerDescriptor>,
    language: LanguageDescriptor,
    stories: Vec<(StoryRecord, Vec<FrameRecord>)>,
}

// =============================================================================
// Export
// =============================================================================

impl Exporter {
    /// Create an exporter over the given collaborators
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

    /// Export a collection to `dest`
    ///
    /// Parent directories are created. Either the complete archive is
    /// written or no file is left behind.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the collection or its stories are absent
    /// - `MissingDependency` if its language is not stored
    /// - `Io` if the file cannot be written
    pub fn export(
        &self,
        options: &ExportOptions,
        dest: &Path,
        on_progress: &mut dyn FnMut(u8, &str),
    ) -> EngineResult<ExportInfo> {
        let mut progress = ProgressReporter::new(on_progress);
        let built = self.build(options, &mut progress)?;

        progress.report(95, "Writing file");
        write_atomic(dest, &built.bytes)?;

        let info = ExportInfo {
            collection_id: options.collection_id.clone(),
            path: dest.to_path_buf(),
            story_count: built.story_count,
            frame_count: built.frame_count,
            archive_size_bytes: built.bytes.len() as u64,
            checksum: xxh3_hex(&built.bytes),
        };

        info!(
            target: "storybundle::export",
            collection_id = %info.collection_id,
            path = ?info.path,
            stories = info.story_count,
            frames = info.frame_count,
            size = info.archive_size_bytes,
            checksum = %info.checksum,
            "Exported collection"
        );

        progress.report(100, "Export complete");
        Ok(info)
    }

    /// Export a collection to an in-memory archive
    ///
    /// # Errors
    ///
    /// Same as [`Exporter::export`], minus file errors.
    pub fn export_to_vec(
        &self,
        options: &ExportOptions,
        on_progress: &mut dyn FnMut(u8, &str),
    ) -> EngineResult<Vec<u8>> {
        let mut progress = ProgressReporter::new(on_progress);
        let built = self.build(options, &mut progress)?;
        progress.report(100, "Export complete");
        Ok(built.bytes)
    }

    fn build(
        &self,
        options: &ExportOptions,
        progress: &mut ProgressReporter<'_>,
    ) -> EngineResult<BuiltArchive> {
        progress.report(0, "Loading collection");
        let snapshot = self.load(&options.collection_id)?;
        let collection_id = &options.collection_id;

        let mut entries = Vec::with_capacity(snapshot.stories.len() + 3);
        let mut user_data = UserData::default();
        let mut frame_count = 0;
        let story_total = snapshot.stories.len();

        for (i, (story, frames)) in snapshot.stories.iter().enumerate() {
            let gaps = frame_gaps(frames.iter().map(|f| f.frame_number));
            if !gaps.is_empty() {
                warn!(
                    target: "storybundle::export",
                    collection_id = %collection_id,
                    story = story.story_number,
                    missing = ?gaps,
                    "Story has gaps in frame numbering"
                );
            }

            let reference = story.metadata.source_reference.as_deref();
            if reference_collision(frames, reference) {
                warn!(
                    target: "storybundle::export",
                    collection_id = %collection_id,
                    story = story.story_number,
                    "Last frame ends in an underscored line that will read back as a source reference"
                );
            }

            let text = encode_story(&story.title, frames, reference);
            entries.push(ArchiveEntry::text(paths::story(story.story_number), text));
            frame_count += frames.len();

            if story.is_favorite {
                user_data.favorite_stories.push(story.story_number);
            }
            user_data.favorite_frames.extend(
                frames
                    .iter()
                    .filter(|f| f.is_favorite)
                    .map(|f| FavoriteFrame {
                        story: f.story_number,
                        frame: f.frame_number,
                    }),
            );

            progress.report_span(10, 60, (i + 1) as f32 / story_total as f32, "Encoding stories");
        }

        if options.include_thumbnails {
            progress.report(65, "Adding thumbnail");
            if let Some(bytes) = self.images.load_thumbnail(collection_id)? {
                entries.push(ArchiveEntry::binary(paths::THUMBNAIL, bytes));
            }
        }

        if options.include_user_data {
            progress.report(70, "Adding user data");
            let json = serde_json::to_string_pretty(&user_data).map_err(BundleError::from)?;
            entries.push(ArchiveEntry::text(paths::USER_DATA, json));
        }

        progress.report(75, "Writing manifest");
        let manifest = ExportManifest::new(
            self.config.app_name.clone(),
            self.config.app_version.clone(),
            snapshot.collection.descriptor,
            snapshot.owner,
            snapshot.language,
        );
        entries.insert(
            0,
            ArchiveEntry::text(paths::MANIFEST, ManifestCodec::encode(&manifest)?),
        );

        progress.report(80, "Compressing archive");
        let level = options
            .compression_level
            .unwrap_or(self.config.compression_level);
        let bytes = ArchiveWriter::new(level).create(&entries)?;

        debug!(
            target: "storybundle::export",
            collection_id = %collection_id,
            entries = entries.len(),
            level,
            size = bytes.len(),
            "Assembled archive"
        );

        Ok(BuiltArchive {
            bytes,
            story_count: story_total,
            frame_count,
        })
    }

    fn load(&self, collection_id: &str) -> EngineResult<CollectionSnapshot> {
        let collection = self
            .store
            .get_collection(collection_id)?
            .ok_or_else(|| EngineError::not_found(format!("collection '{}'", collection_id)))?;

        let descriptor = &collection.descriptor;
        let language = self
            .store
            .get_language(&descriptor.language_code)?
            .ok_or_else(|| {
                EngineError::missing_dependency(format!(
                    "language '{}' of collection '{}'",
                    descriptor.language_code, collection_id
                ))
            })?;
        let owner = self.store.get_owner(&descriptor.owner_username)?;

        let stories = self.store.list_stories(collection_id)?;
        if stories.is_empty() {
            return Err(EngineError::not_found(format!(
                "stories of collection '{}'",
                collection_id
            )));
        }

        let stories = stories
            .into_iter()
            .map(|story| {
                let frames = self.store.list_frames(collection_id, story.story_number)?;
                Ok((story, frames))
            })
            .collect::<EngineResult<Vec<_>>>()?;

        Ok(CollectionSnapshot {
            collection,
            owner,
            language,
            stories,
        })
    }
}

/// Hex xxh3 digest
pub fn xxh3_hex(data: &[u8]) -> String {
    use xxhash_rust::xxh3::xxh3_64;
    format!("{:016x}", xxh3_64(data))
}

fn write_atomic(path: &Path, bytes: &[u8]) -> EngineResult<()> {
    let temp_path = path.with_extension("tmp");

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let written = fs::write(&temp_path, bytes).and_then(|()| fs::rename(&temp_path, path));
    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }
    Ok(())
}
