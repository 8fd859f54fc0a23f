//! Core types for the story library
//!
//! This module defines the records that move through export and import:
//! - CollectionDescriptor: one content library (`owner/name`)
//! - StoryRecord: one numbered story within a collection
//! - FrameRecord: one image + text unit within a story
//! - OwnerDescriptor: publisher of one or more collections
//! - LanguageDescriptor: language metadata, joined by code
//!
//! Metadata bags are typed: known keys get explicit fields and anything else
//! is kept in a residual `extra` map so unknown fields survive a round-trip.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;

/// Residual map for metadata keys this crate does not model explicitly
pub type ExtraFields = BTreeMap<String, JsonValue>;

// =============================================================================
// Collection
// =============================================================================

/// Known keys of a collection's metadata plus a residual open map
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionMetadata {
    /// Checking level assigned by the publisher
    ///
    /// Publishers write either a bare level (`"3"`) or a catalog object
    /// (`{"checking_level": "3"}`), so the value is kept as-is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checking: Option<JsonValue>,

    /// Scope of the content (e.g. which books are covered)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<JsonValue>,

    /// Keys not modelled above
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl CollectionMetadata {
    /// True when no key is set
    pub fn is_empty(&self) -> bool {
        self.checking.is_none() && self.scope.is_none() && self.extra.is_empty()
    }

    /// Checking level as text, from either the bare or the catalog form
    pub fn checking_level(&self) -> Option<&str> {
        match self.checking.as_ref()? {
            JsonValue::String(level) => Some(level),
            JsonValue::Object(map) => map.get("checking_level")?.as_str(),
            _ => None,
        }
    }
}

/// One content library
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionDescriptor {
    /// Globally unique id, `owner/name`
    pub id: String,
    /// Username of the owning publisher
    pub owner_username: String,
    /// Language code (join key into LanguageDescriptor)
    pub language_code: String,
    /// Human readable name
    pub display_name: String,
    /// Dotted numeric version string
    pub version: String,
    /// Identifier of the image set the frames reference
    pub image_set_id: String,
    /// When the collection content last changed
    pub last_updated: DateTime<Utc>,
    /// Typed metadata
    pub metadata: CollectionMetadata,
}

impl CollectionDescriptor {
    /// Split the id into `(owner, name)`
    ///
    /// Returns None unless the id has exactly one `/` with non-empty parts.
    pub fn split_id(id: &str) -> Option<(&str, &str)> {
        let (owner, name) = id.split_once('/')?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return None;
        }
        Some((owner, name))
    }
}

/// A collection row as held by the storage collaborator
///
/// Wraps the portable descriptor with local-only state that never travels in
/// an archive.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredCollection {
    /// Portable descriptor
    pub descriptor: CollectionDescriptor,
    /// Whether the content is present on this device
    pub is_downloaded: bool,
}

impl StoredCollection {
    /// Wrap a descriptor that has been restored locally
    pub fn downloaded(descriptor: CollectionDescriptor) -> Self {
        Self {
            descriptor,
            is_downloaded: true,
        }
    }
}

// =============================================================================
// Story / Frame
// =============================================================================

/// Known keys of a story's metadata plus a residual open map
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoryMetadata {
    /// Reference to the source text the story is based on (e.g. "Genesis 1-2")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_reference: Option<String>,

    /// Keys not modelled above
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// One numbered story in a collection
#[derive(Debug, Clone, PartialEq)]
pub struct StoryRecord {
    /// Owning collection id
    pub collection_id: String,
    /// Story number, starting at 1
    pub story_number: u32,
    /// Story title
    pub title: String,
    /// User favorite flag
    pub is_favorite: bool,
    /// Typed metadata
    pub metadata: StoryMetadata,
}

impl StoryRecord {
    /// Natural key `(collection id, story number)`
    pub fn key(&self) -> StoryKey {
        StoryKey {
            collection_id: self.collection_id.clone(),
            story_number: self.story_number,
        }
    }
}

/// One frame within a story
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    /// Owning collection id
    pub collection_id: String,
    /// Owning story number
    pub story_number: u32,
    /// Frame number, sequential from 1
    pub frame_number: u32,
    /// Opaque image reference (file name or URL)
    pub image_ref: String,
    /// Frame text
    pub text: String,
    /// User favorite flag
    pub is_favorite: bool,
}

impl FrameRecord {
    /// Natural key `(collection id, story number, frame number)`
    pub fn key(&self) -> FrameKey {
        FrameKey {
            collection_id: self.collection_id.clone(),
            story_number: self.story_number,
            frame_number: self.frame_number,
        }
    }
}

/// Composite key of a story
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StoryKey {
    /// Collection id
    pub collection_id: String,
    /// Story number
    pub story_number: u32,
}

/// Composite key of a frame
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameKey {
    /// Collection id
    pub collection_id: String,
    /// Story number
    pub story_number: u32,
    /// Frame number
    pub frame_number: u32,
}

// =============================================================================
// Owner
// =============================================================================

/// Kind of publisher
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerType {
    /// A single person
    #[default]
    #[serde(alias = "user")]
    Individual,
    /// An organization
    #[serde(alias = "org")]
    Organization,
}

impl fmt::Display for OwnerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OwnerType::Individual => write!(f, "individual"),
            OwnerType::Organization => write!(f, "organization"),
        }
    }
}

/// Publisher of one or more collections
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OwnerDescriptor {
    /// Unique username
    pub username: String,
    /// Display name
    pub full_name: Option<String>,
    /// Avatar image URL
    pub avatar_url: Option<String>,
    /// Free-form description
    pub description: Option<String>,
    /// Contact website
    pub website: Option<String>,
    /// Location
    pub location: Option<String>,
    /// Individual or organization
    pub owner_type: OwnerType,
}

// =============================================================================
// Language
// =============================================================================

/// Script direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    /// Left to right
    #[default]
    Ltr,
    /// Right to left
    Rtl,
}

/// Language metadata
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LanguageDescriptor {
    /// Language code, the join key
    pub code: String,
    /// Name in the language itself
    pub native_name: String,
    /// English name
    pub english_name: String,
    /// Script direction
    pub direction: TextDirection,
    /// Whether this is a gateway language
    pub is_gateway: bool,
    /// Home country code
    pub home_country: String,
    /// Region name
    pub region: String,
    /// Catalog primary key, when known
    pub catalog_id: Option<u64>,
    /// Alternate names
    pub alternate_names: Vec<String>,
    /// Country codes where the language is spoken
    pub country_codes: Vec<String>,
}
