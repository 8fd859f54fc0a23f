//! ZIP container reader and writer
//!
//! The codec knows nothing about what entries mean. It turns a list of named
//! entries into archive bytes and back. Any malformed or truncated container
//! surfaces as [`BundleError::CorruptedData`].

use crate::error::{BundleError, BundleResult};
use crate::types::{ArchiveEntry, ArchiveLimits, MAX_COMPRESSION_LEVEL};
use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

/// Writer for story archives
pub struct ArchiveWriter {
    compression_level: u8,
}

impl ArchiveWriter {
    /// Create a writer with a deflate level (0–9, higher values are clamped)
    ///
    /// Level 0 stores entries uncompressed.
    pub fn new(compression_level: u8) -> Self {
        Self {
            compression_level: compression_level.min(MAX_COMPRESSION_LEVEL),
        }
    }

    /// Compression level in use
    pub fn compression_level(&self) -> u8 {
        self.compression_level
    }

    /// Build an archive from entries, in the given order
    pub fn create(&self, entries: &[ArchiveEntry]) -> BundleResult<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

        for entry in entries {
            zip.start_file(entry.path.as_str(), self.options())
                .map_err(|e| BundleError::write(format!("start '{}': {}", entry.path, e)))?;
            zip.write_all(&entry.content)?;
        }

        let cursor = zip
            .finish()
            .map_err(|e| BundleError::write(format!("zip finish: {}", e)))?;
        Ok(cursor.into_inner())
    }

    fn options(&self) -> SimpleFileOptions {
        // Fixed timestamp keeps output reproducible
        let options = SimpleFileOptions::default()
            .last_modified_time(DateTime::default())
            .unix_permissions(0o644);

        if self.compression_level == 0 {
            options.compression_method(CompressionMethod::Stored)
        } else {
            options
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(i64::from(self.compression_level)))
        }
    }
}

/// Opened story archive
///
/// Every file entry is read into memory on open, so later lookups cannot
/// fail on container errors.
#[derive(Debug)]
pub struct ArchiveReader {
    entries: BTreeMap<String, Vec<u8>>,
}

impl ArchiveReader {
    /// Open archive bytes with default limits
    pub fn open(bytes: &[u8]) -> BundleResult<Self> {
        Self::open_with_limits(bytes, &ArchiveLimits::default())
    }

    /// Open archive bytes, rejecting oversized entries or entry counts
    pub fn open_with_limits(bytes: &[u8], limits: &ArchiveLimits) -> BundleResult<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| BundleError::corrupted(format!("zip open: {}", e)))?;

        if archive.len() > limits.max_entries {
            return Err(BundleError::TooManyEntries {
                count: archive.len(),
                limit: limits.max_entries,
            });
        }

        let mut entries = BTreeMap::new();
        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| BundleError::corrupted(format!("zip entry {}: {}", i, e)))?;
            if file.is_dir() {
                continue;
            }

            let name = normalize_path(file.name());
            if file.size() > limits.max_entry_bytes {
                return Err(BundleError::EntryTooLarge {
                    path: name,
                    limit: limits.max_entry_bytes,
                });
            }

            // Declared sizes are untrusted; cap the actual read too
            let mut data = Vec::new();
            (&mut file)
                .take(limits.max_entry_bytes + 1)
                .read_to_end(&mut data)
                .map_err(|e| BundleError::corrupted(format!("read '{}': {}", name, e)))?;
            if data.len() as u64 > limits.max_entry_bytes {
                return Err(BundleError::EntryTooLarge {
                    path: name,
                    limit: limits.max_entry_bytes,
                });
            }

            entries.insert(name, data);
        }

        Ok(Self { entries })
    }

    /// Entry paths in lexical order
    pub fn entry_names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of file entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the archive holds no file entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether an entry exists
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Raw bytes of an entry
    pub fn read_bytes(&self, path: &str) -> Option<&[u8]> {
        self.entries.get(path).map(Vec::as_slice)
    }

    /// Entry decoded as UTF-8 text
    ///
    /// Returns `Ok(None)` when the entry is absent.
    pub fn read_text(&self, path: &str) -> BundleResult<Option<&str>> {
        match self.entries.get(path) {
            None => Ok(None),
            Some(data) => std::str::from_utf8(data)
                .map(Some)
                .map_err(|e| BundleError::corrupted(format!("'{}' is not UTF-8: {}", path, e))),
        }
    }
}

/// Use forward slashes and drop leading `./` or `/`
fn normalize_path(name: &str) -> String {
    let name = name.replace('\\', "/");
    let mut name = name.as_str();
    loop {
        if let Some(rest) = name.strip_prefix("./") {
            name = rest;
        } else if let Some(rest) = name.strip_prefix('/') {
            name = rest;
        } else {
            break;
        }
    }
    name.to_string()
}
