//! Shared test utilities for the integration test suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]

use std::sync::{Arc, Once};

use chrono::{TimeZone, Utc};
pub use storybundle::{
    ArchiveEntry, ArchiveWriter, BundleConfig, CollectionDescriptor, CollectionMetadata,
    ExportManifest, ExportOptions, Exporter, FrameRecord, ImageStore, ImportOptions,
    ImportOutcome, Importer, LanguageDescriptor, LibraryStore, ManifestCodec, MemoryImageStore,
    MemoryStore, OwnerDescriptor, OwnerType, StoredCollection, StoryMetadata, StoryRecord,
};

// ============================================================================
// Initialization
// ============================================================================

static INIT_TRACING: Once = Once::new();

/// Route pipeline logs to the test harness output.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    });
}

// ============================================================================
// Harness
// ============================================================================

/// One device: a store, an image store and both pipelines over them.
pub struct Device {
    pub store: Arc<MemoryStore>,
    pub images: Arc<MemoryImageStore>,
    pub exporter: Exporter,
    pub importer: Importer,
}

impl Device {
    pub fn new() -> Self {
        Self::with_config(BundleConfig::default())
    }

    pub fn with_config(config: BundleConfig) -> Self {
        init_tracing();
        let store = Arc::new(MemoryStore::new());
        let images = Arc::new(MemoryImageStore::new());
        Self {
            exporter: Exporter::new(store.clone(), images.clone(), config.clone()),
            importer: Importer::new(store.clone(), images.clone(), config),
            store,
            images,
        }
    }

    /// Export to bytes, ignoring progress.
    pub fn export(&self, options: &ExportOptions) -> Vec<u8> {
        self.exporter
            .export_to_vec(options, &mut |_, _| {})
            .expect("export failed")
    }

    /// Import bytes, ignoring progress.
    pub fn import(&self, bytes: &[u8], options: ImportOptions) -> ImportOutcome {
        self.importer.import_bytes(bytes, &options, &mut |_, _| {})
    }

    /// Installed version of a collection.
    pub fn version_of(&self, id: &str) -> Option<String> {
        self.store
            .get_collection(id)
            .unwrap()
            .map(|c| c.descriptor.version)
    }
}

// ============================================================================
// Fixtures
// ============================================================================

pub const CREATION_ID: &str = "unfoldingWord/en_obs";

pub fn owner(username: &str) -> OwnerDescriptor {
    OwnerDescriptor {
        username: username.to_string(),
        full_name: Some("unfoldingWord".to_string()),
        owner_type: OwnerType::Organization,
        ..Default::default()
    }
}

pub fn english() -> LanguageDescriptor {
    LanguageDescriptor {
        code: "en".to_string(),
        native_name: "English".to_string(),
        english_name: "English".to_string(),
        is_gateway: true,
        ..Default::default()
    }
}

pub fn descriptor(id: &str, version: &str) -> CollectionDescriptor {
    let (owner, _) = CollectionDescriptor::split_id(id).expect("id must be owner/name");
    CollectionDescriptor {
        id: id.to_string(),
        owner_username: owner.to_string(),
        language_code: "en".to_string(),
        display_name: "Open Bible Stories".to_string(),
        version: version.to_string(),
        image_set_id: "obs-images".to_string(),
        last_updated: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        metadata: CollectionMetadata::default(),
    }
}

pub fn story(id: &str, number: u32, title: &str, source_reference: Option<&str>) -> StoryRecord {
    StoryRecord {
        collection_id: id.to_string(),
        story_number: number,
        title: title.to_string(),
        is_favorite: false,
        metadata: StoryMetadata {
            source_reference: source_reference.map(str::to_string),
            ..Default::default()
        },
    }
}

pub fn frame(id: &str, story: u32, number: u32, image_ref: &str, text: &str) -> FrameRecord {
    FrameRecord {
        collection_id: id.to_string(),
        story_number: story,
        frame_number: number,
        image_ref: image_ref.to_string(),
        text: text.to_string(),
        is_favorite: false,
    }
}

/// Store owner, language and collection rows in dependency order.
pub fn seed_collection(store: &dyn LibraryStore, id: &str, version: &str) {
    let desc = descriptor(id, version);
    store.save_owner(&owner(&desc.owner_username)).unwrap();
    store.save_language(&english()).unwrap();
    store
        .save_collection(&StoredCollection::downloaded(desc))
        .unwrap();
}

/// "The Creation": one story, two frames, a source reference.
pub fn seed_creation(store: &dyn LibraryStore, version: &str) {
    seed_collection(store, CREATION_ID, version);
    store
        .save_stories(&[story(CREATION_ID, 1, "The Creation", Some("Genesis 1-2"))])
        .unwrap();
    store
        .save_frames(&[
            frame(CREATION_ID, 1, 1, "img1.jpg", "text A"),
            frame(CREATION_ID, 1, 2, "img2.jpg", "text B"),
        ])
        .unwrap();
}

/// Seed `story_count` stories of `frames_per_story` frames each.
pub fn seed_large(store: &dyn LibraryStore, id: &str, story_count: u32, frames_per_story: u32) {
    seed_collection(store, id, "1");
    let stories: Vec<_> = (1..=story_count)
        .map(|n| story(id, n, &format!("Story {}", n), None))
        .collect();
    store.save_stories(&stories).unwrap();
    for s in 1..=story_count {
        let frames: Vec<_> = (1..=frames_per_story)
            .map(|f| {
                frame(
                    id,
                    s,
                    f,
                    &format!("https://cdn.example.org/{:02}-{:02}.jpg", s, f),
                    &format!("Frame {} of story {}.", f, s),
                )
            })
            .collect();
        store.save_frames(&frames).unwrap();
    }
}

/// Manifest for hand-built archives.
pub fn manifest(id: &str, version: &str) -> ExportManifest {
    ExportManifest::new(
        "storybundle",
        "0.1.0",
        descriptor(id, version),
        Some(owner("unfoldingWord")),
        english(),
    )
}

/// Build an archive from raw entries.
pub fn archive(entries: &[ArchiveEntry]) -> Vec<u8> {
    ArchiveWriter::new(6).create(entries).unwrap()
}

/// Archive with a manifest and the given story texts under `dir`.
pub fn archive_with_stories(manifest: &ExportManifest, dir: &str, stories: &[&str]) -> Vec<u8> {
    let mut entries = vec![ArchiveEntry::text(
        "manifest.json",
        ManifestCodec::encode(manifest).unwrap(),
    )];
    for (i, text) in stories.iter().enumerate() {
        entries.push(ArchiveEntry::text(
            format!("{}/{:02}.md", dir, i + 1),
            text.to_string(),
        ));
    }
    archive(&entries)
}

/// Every story and frame row of a collection, in key order.
pub fn snapshot(store: &dyn LibraryStore, id: &str) -> (Vec<StoryRecord>, Vec<FrameRecord>) {
    let stories = store.list_stories(id).unwrap();
    let frames = stories
        .iter()
        .flat_map(|s| store.list_frames(id, s.story_number).unwrap())
        .collect();
    (stories, frames)
}
