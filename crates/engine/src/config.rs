//! Pipeline configuration via `storybundle.toml`
//!
//! Every field has a default, so an empty file (or no file) is valid.
//! `write_default_if_missing` drops a commented template next to the data.

use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use storybundle_bundle::{ArchiveLimits, DEFAULT_COMPRESSION_LEVEL, MAX_COMPRESSION_LEVEL};

/// Config file name
pub const CONFIG_FILE_NAME: &str = "storybundle.toml";

/// Import/export configuration loaded from `storybundle.toml`.
///
/// # Example
///
/// ```toml
/// app_name = "storybundle"
/// compression_level = 6
/// story_chunk_size = 200
/// frame_chunk_size = 500
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleConfig {
    /// Application name written into manifests
    #[serde(default = "default_app_name")]
    pub app_name: String,
    /// Application version written into manifests
    #[serde(default = "default_app_version")]
    pub app_version: String,
    /// Default deflate level for exports (0–9)
    #[serde(default = "default_compression_level")]
    pub compression_level: u8,
    /// Stories per storage transaction
    #[serde(default = "default_story_chunk_size")]
    pub story_chunk_size: usize,
    /// Frames per storage transaction
    #[serde(default = "default_frame_chunk_size")]
    pub frame_chunk_size: usize,
    /// Largest uncompressed archive entry accepted on import
    #[serde(default = "default_max_entry_bytes")]
    pub max_entry_bytes: u64,
    /// Largest number of archive entries accepted on import
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

fn default_app_name() -> String {
    "storybundle".to_string()
}

fn default_app_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_compression_level() -> u8 {
    DEFAULT_COMPRESSION_LEVEL
}

fn default_story_chunk_size() -> usize {
    200
}

fn default_frame_chunk_size() -> usize {
    500
}

fn default_max_entry_bytes() -> u64 {
    ArchiveLimits::default().max_entry_bytes
}

fn default_max_entries() -> usize {
    ArchiveLimits::default().max_entries
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            app_version: default_app_version(),
            compression_level: default_compression_level(),
            story_chunk_size: default_story_chunk_size(),
            frame_chunk_size: default_frame_chunk_size(),
            max_entry_bytes: default_max_entry_bytes(),
            max_entries: default_max_entries(),
        }
    }
}

impl BundleConfig {
    /// Limits applied when opening archives
    pub fn archive_limits(&self) -> ArchiveLimits {
        ArchiveLimits {
            max_entry_bytes: self.max_entry_bytes,
            max_entries: self.max_entries,
        }
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns an error if the compression level is above 9 or a chunk size,
    /// entry cap or entry count is zero.
    pub fn validate(&self) -> EngineResult<()> {
        if self.compression_level > MAX_COMPRESSION_LEVEL {
            return Err(EngineError::config(format!(
                "compression_level must be 0-{}, got {}",
                MAX_COMPRESSION_LEVEL, self.compression_level
            )));
        }
        if self.story_chunk_size == 0 || self.frame_chunk_size == 0 {
            return Err(EngineError::config("chunk sizes must be greater than zero"));
        }
        if self.max_entry_bytes == 0 || self.max_entries == 0 {
            return Err(EngineError::config("archive limits must be greater than zero"));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# storybundle configuration
#
# Name and version recorded in exported manifests.
app_name = "storybundle"
# app_version = "0.1.0"

# Deflate level used for exports, 0 (store) to 9 (smallest).
compression_level = 6

# Records per storage transaction on import.
story_chunk_size = 200
frame_chunk_size = 500

# Caps applied to untrusted archives on import.
max_entry_bytes = 67108864
max_entries = 10000
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> EngineResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            EngineError::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: BundleConfig = toml::from_str(&content).map_err(|e| {
            EngineError::config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> EngineResult<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                EngineError::config(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> EngineResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| EngineError::config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            EngineError::config(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
