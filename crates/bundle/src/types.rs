//! Story archive core types
//!
//! Layout constants, entry descriptors, reader limits and the optional
//! user-data sidecar.

use serde::{Deserialize, Serialize};

/// Manifest format version this codec reads and writes
pub const MANIFEST_FORMAT_VERSION: &str = "1.0.0";

/// Conventional file extension for story archives
pub const ARCHIVE_EXTENSION: &str = "storybundle.zip";

/// Default deflate level for new archives
pub const DEFAULT_COMPRESSION_LEVEL: u8 = 6;

/// Highest deflate level
pub const MAX_COMPRESSION_LEVEL: u8 = 9;

/// Archive paths within the bundle
pub mod paths {
    /// Manifest entry
    pub const MANIFEST: &str = "manifest.json";
    /// Content folder written by this codec
    pub const CONTENT_DIR: &str = "content";
    /// Content folder used by older exporters, accepted on read
    pub const LEGACY_CONTENT_DIR: &str = "ingredients";
    /// Thumbnail entry
    pub const THUMBNAIL: &str = "content/thumbnail.jpg";
    /// Thumbnail entry in the legacy folder
    pub const LEGACY_THUMBNAIL: &str = "ingredients/thumbnail.jpg";
    /// Favorites sidecar
    pub const USER_DATA: &str = "content/user-data.json";

    /// Entry path of a story, e.g. `content/07.md`
    pub fn story(number: u32) -> String {
        format!("{}/{:02}.md", CONTENT_DIR, number)
    }

    /// Story number encoded in an entry path
    ///
    /// Accepts `content/<NN>.md` and `ingredients/<NN>.md` where `NN` is one or
    /// more ASCII digits with a value above zero.
    pub fn parse_story(path: &str) -> Option<u32> {
        let (dir, file) = path.split_once('/')?;
        if dir != CONTENT_DIR && dir != LEGACY_CONTENT_DIR {
            return None;
        }
        let digits = file.strip_suffix(".md")?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        match digits.parse::<u32>() {
            Ok(0) | Err(_) => None,
            Ok(n) => Some(n),
        }
    }

    /// Content folder an entry lives in, if it is a recognized one
    pub fn content_dir_of(path: &str) -> Option<&'static str> {
        match path.split_once('/') {
            Some((CONTENT_DIR, _)) => Some(CONTENT_DIR),
            Some((LEGACY_CONTENT_DIR, _)) => Some(LEGACY_CONTENT_DIR),
            _ => None,
        }
    }
}

/// One named entry to place in an archive
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveEntry {
    /// Path inside the archive
    pub path: String,
    /// Raw content
    pub content: Vec<u8>,
    /// Binary entries are stored as-is; text entries are UTF-8
    pub is_binary: bool,
}

impl ArchiveEntry {
    /// A UTF-8 text entry
    pub fn text(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into().into_bytes(),
            is_binary: false,
        }
    }

    /// A binary entry
    pub fn binary(path: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            content,
            is_binary: true,
        }
    }
}

/// Caps applied while reading untrusted archives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveLimits {
    /// Largest uncompressed entry accepted
    pub max_entry_bytes: u64,
    /// Largest number of entries accepted
    pub max_entries: usize,
}

impl Default for ArchiveLimits {
    fn default() -> Self {
        Self {
            max_entry_bytes: 64 * 1024 * 1024,
            max_entries: 10_000,
        }
    }
}

// =============================================================================
// user-data.json
// =============================================================================

/// Favorite flags exported alongside the content
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    /// Story numbers marked favorite
    #[serde(default)]
    pub favorite_stories: Vec<u32>,
    /// Frames marked favorite
    #[serde(default)]
    pub favorite_frames: Vec<FavoriteFrame>,
}

impl UserData {
    /// True when nothing is marked
    pub fn is_empty(&self) -> bool {
        self.favorite_stories.is_empty() && self.favorite_frames.is_empty()
    }

    /// Whether a story is marked favorite
    pub fn is_story_favorite(&self, story: u32) -> bool {
        self.favorite_stories.contains(&story)
    }

    /// Whether a frame is marked favorite
    pub fn is_frame_favorite(&self, story: u32, frame: u32) -> bool {
        self.favorite_frames
            .iter()
            .any(|f| f.story == story && f.frame == frame)
    }
}

/// Address of a favorite frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteFrame {
    /// Story number
    pub story: u32,
    /// Frame number
    pub frame: u32,
}
