//! Collaborator traits for storage and image assets
//!
//! The pipelines never talk to a concrete database. They are handed trait
//! objects implementing [`LibraryStore`] and [`ImageStore`], which enables
//! swapping the relational backend without touching import/export logic.
//!
//! Thread safety: all methods must be safe to call from multiple threads
//! (requires Send + Sync). Serializing access per collection id is the
//! caller's responsibility.

use crate::error::StoreResult;
use crate::types::{
    FrameRecord, LanguageDescriptor, OwnerDescriptor, StoredCollection, StoryRecord,
};

/// Storage abstraction for collections, stories, frames, owners and languages
///
/// `save_*` methods are upserts keyed by each record's natural key.
pub trait LibraryStore: Send + Sync {
    /// Get a collection row by id
    fn get_collection(&self, id: &str) -> StoreResult<Option<StoredCollection>>;

    /// Insert or replace a collection row
    fn save_collection(&self, collection: &StoredCollection) -> StoreResult<()>;

    /// Delete a collection with its stories and frames
    ///
    /// Owners and languages are shared and are never removed here.
    /// Returns false if the collection did not exist.
    fn delete_collection(&self, id: &str) -> StoreResult<bool>;

    /// Get an owner by username
    fn get_owner(&self, username: &str) -> StoreResult<Option<OwnerDescriptor>>;

    /// Insert or replace an owner
    fn save_owner(&self, owner: &OwnerDescriptor) -> StoreResult<()>;

    /// Get a language by code
    fn get_language(&self, code: &str) -> StoreResult<Option<LanguageDescriptor>>;

    /// Insert or replace a language
    fn save_language(&self, language: &LanguageDescriptor) -> StoreResult<()>;

    /// All stories of a collection, ordered by story number
    fn list_stories(&self, collection_id: &str) -> StoreResult<Vec<StoryRecord>>;

    /// All frames of one story, ordered by frame number
    fn list_frames(&self, collection_id: &str, story_number: u32) -> StoreResult<Vec<FrameRecord>>;

    /// Upsert a batch of stories inside a single transaction
    ///
    /// Either every record in the batch is written or none is.
    fn save_stories(&self, stories: &[StoryRecord]) -> StoreResult<()>;

    /// Upsert a batch of frames inside a single transaction
    ///
    /// Either every record in the batch is written or none is.
    fn save_frames(&self, frames: &[FrameRecord]) -> StoreResult<()>;

    /// Remove all stories and frames of a collection, keeping the collection row
    fn clear_collection_content(&self, collection_id: &str) -> StoreResult<()>;
}

/// Opaque binary assets keyed by collection
pub trait ImageStore: Send + Sync {
    /// Load the thumbnail of a collection, if one exists
    fn load_thumbnail(&self, collection_id: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Store the thumbnail of a collection, replacing any previous one
    fn save_thumbnail(&self, collection_id: &str, bytes: &[u8]) -> StoreResult<()>;
}
