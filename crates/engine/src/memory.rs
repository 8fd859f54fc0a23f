//! MemoryStore: in-process reference implementation of the collaborators
//!
//! This module implements [`LibraryStore`] and [`ImageStore`] using:
//! - `BTreeMap`s keyed by each record's natural key
//! - one `parking_lot::RwLock` over all tables, so a batch write is atomic
//! - `AtomicUsize` counters for committed transactions and failure injection
//!
//! # Design Notes
//!
//! - **Referential integrity**: a collection needs its owner and language, a
//!   story needs its collection, a frame needs its story. Violations are
//!   `StoreError::Constraint`, the way a relational backend reports foreign
//!   key failures.
//! - **Failure injection**: `fail_after_transactions(n)` lets the first `n`
//!   batch transactions commit and fails every later one.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;

use storybundle_core::{
    FrameKey, FrameRecord, ImageStore, LanguageDescriptor, LibraryStore, OwnerDescriptor,
    StoreError, StoreResult, StoredCollection, StoryKey, StoryRecord,
};

#[derive(Debug, Default)]
struct Tables {
    collections: BTreeMap<String, StoredCollection>,
    owners: BTreeMap<String, OwnerDescriptor>,
    languages: BTreeMap<String, LanguageDescriptor>,
    stories: BTreeMap<StoryKey, StoryRecord>,
    frames: BTreeMap<FrameKey, FrameRecord>,
}

/// In-memory storage backend
#[derive(Debug)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    /// Committed batch transactions
    transactions: AtomicUsize,
    /// Batch transactions allowed before injected failures start
    fail_after: AtomicUsize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            transactions: AtomicUsize::new(0),
            fail_after: AtomicUsize::new(usize::MAX),
        }
    }

    /// Fail every batch transaction after the next `n` commits
    pub fn fail_after_transactions(&self, n: usize) {
        let committed = self.transactions.load(Ordering::SeqCst);
        self.fail_after
            .store(committed.saturating_add(n), Ordering::SeqCst);
    }

    /// Number of committed batch transactions
    pub fn transaction_count(&self) -> usize {
        self.transactions.load(Ordering::SeqCst)
    }

    /// Number of frames stored for a collection
    pub fn frame_count(&self, collection_id: &str) -> usize {
        self.tables
            .read()
            .frames
            .keys()
            .filter(|k| k.collection_id == collection_id)
            .count()
    }

    /// Every frame in key order, for comparing final states
    pub fn all_frames(&self) -> Vec<FrameRecord> {
        self.tables.read().frames.values().cloned().collect()
    }

    /// Every story in key order, for comparing final states
    pub fn all_stories(&self) -> Vec<StoryRecord> {
        self.tables.read().stories.values().cloned().collect()
    }

    fn begin_transaction(&self) -> StoreResult<()> {
        let limit = self.fail_after.load(Ordering::SeqCst);
        if self.transactions.load(Ordering::SeqCst) >= limit {
            return Err(StoreError::transaction("injected failure: transaction aborted"));
        }
        Ok(())
    }

    fn commit_transaction(&self) {
        self.transactions.fetch_add(1, Ordering::SeqCst);
    }
}

impl LibraryStore for MemoryStore {
    fn get_collection(&self, id: &str) -> StoreResult<Option<StoredCollection>> {
        Ok(self.tables.read().collections.get(id).cloned())
    }

    fn save_collection(&self, collection: &StoredCollection) -> StoreResult<()> {
        let mut tables = self.tables.write();
        let d = &collection.descriptor;
        if !tables.owners.contains_key(&d.owner_username) {
            return Err(StoreError::constraint(format!(
                "FOREIGN KEY: owner '{}' does not exist",
                d.owner_username
            )));
        }
        if !tables.languages.contains_key(&d.language_code) {
            return Err(StoreError::constraint(format!(
                "FOREIGN KEY: language '{}' does not exist",
                d.language_code
            )));
        }
        tables.collections.insert(d.id.clone(), collection.clone());
        Ok(())
    }

    fn delete_collection(&self, id: &str) -> StoreResult<bool> {
        let mut tables = self.tables.write();
        if tables.collections.remove(id).is_none() {
            return Ok(false);
        }
        tables.stories.retain(|k, _| k.collection_id != id);
        tables.frames.retain(|k, _| k.collection_id != id);
        Ok(true)
    }

    fn get_owner(&self, username: &str) -> StoreResult<Option<OwnerDescriptor>> {
        Ok(self.tables.read().owners.get(username).cloned())
    }

    fn save_owner(&self, owner: &OwnerDescriptor) -> StoreResult<()> {
        self.tables
            .write()
            .owners
            .insert(owner.username.clone(), owner.clone());
        Ok(())
    }

    fn get_language(&self, code: &str) -> StoreResult<Option<LanguageDescriptor>> {
        Ok(self.tables.read().languages.get(code).cloned())
    }

    fn save_language(&self, language: &LanguageDescriptor) -> StoreResult<()> {
        self.tables
            .write()
            .languages
            .insert(language.code.clone(), language.clone());
        Ok(())
    }

    fn list_stories(&self, collection_id: &str) -> StoreResult<Vec<StoryRecord>> {
        Ok(self
            .tables
            .read()
            .stories
            .values()
            .filter(|s| s.collection_id == collection_id)
            .cloned()
            .collect())
    }

    fn list_frames(&self, collection_id: &str, story_number: u32) -> StoreResult<Vec<FrameRecord>> {
        Ok(self
            .tables
            .read()
            .frames
            .values()
            .filter(|f| f.collection_id == collection_id && f.story_number == story_number)
            .cloned()
            .collect())
    }

    fn save_stories(&self, stories: &[StoryRecord]) -> StoreResult<()> {
        self.begin_transaction()?;
        let mut tables = self.tables.write();

        // Validate the whole batch before touching any table
        for story in stories {
            if !tables.collections.contains_key(&story.collection_id) {
                return Err(StoreError::constraint(format!(
                    "FOREIGN KEY: collection '{}' does not exist",
                    story.collection_id
                )));
            }
        }
        for story in stories {
            tables.stories.insert(story.key(), story.clone());
        }

        drop(tables);
        self.commit_transaction();
        Ok(())
    }

    fn save_frames(&self, frames: &[FrameRecord]) -> StoreResult<()> {
        self.begin_transaction()?;
        let mut tables = self.tables.write();

        for frame in frames {
            let story_key = StoryKey {
                collection_id: frame.collection_id.clone(),
                story_number: frame.story_number,
            };
            if !tables.stories.contains_key(&story_key) {
                return Err(StoreError::constraint(format!(
                    "FOREIGN KEY: story {} of '{}' does not exist",
                    frame.story_number, frame.collection_id
                )));
            }
        }
        for frame in frames {
            tables.frames.insert(frame.key(), frame.clone());
        }

        drop(tables);
        self.commit_transaction();
        Ok(())
    }

    fn clear_collection_content(&self, collection_id: &str) -> StoreResult<()> {
        let mut tables = self.tables.write();
        tables.stories.retain(|k, _| k.collection_id != collection_id);
        tables.frames.retain(|k, _| k.collection_id != collection_id);
        Ok(())
    }
}

/// In-memory thumbnail storage
#[derive(Debug, Default)]
pub struct MemoryImageStore {
    thumbnails: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryImageStore {
    /// Create an empty image store
    pub fn new() -> Self {
        Self::default()
    }
}

impl ImageStore for MemoryImageStore {
    fn load_thumbnail(&self, collection_id: &str) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.thumbnails.read().get(collection_id).cloned())
    }

    fn save_thumbnail(&self, collection_id: &str, bytes: &[u8]) -> StoreResult<()> {
        self.thumbnails
            .write()
            .insert(collection_id.to_string(), bytes.to_vec());
        Ok(())
    }
}
