//! Conflict policy between a local collection and an incoming archive
//!
//! | local vs incoming | overwrite = false                  | overwrite = true        |
//! |-------------------|------------------------------------|-------------------------|
//! | absent            | proceed                            | proceed                 |
//! | equal             | skip, `DUPLICATE_COLLECTION`       | proceed                 |
//! | incoming older    | skip, `VERSION_CONFLICT`, `SKIP`   | proceed with a warning  |
//! | incoming newer    | skip, `VERSION_CONFLICT`, `OVERWRITE` | proceed              |

use std::cmp::Ordering;

use storybundle_core::{
    compare_versions, CollectionDescriptor, ErrorDetails, ErrorKind, ImportError, Recommendation,
};

/// Outcome of the conflict check
#[derive(Debug, Clone, PartialEq)]
pub enum ConflictDecision {
    /// Continue importing; `warning` is reported but does not fail the import
    Proceed {
        /// Non-fatal notice, set when older data replaces newer data
        warning: Option<ImportError>,
    },
    /// Leave local data untouched
    Skip(ImportError),
}

impl ConflictDecision {
    /// True when the import should continue
    pub fn proceeds(&self) -> bool {
        matches!(self, ConflictDecision::Proceed { .. })
    }
}

/// Decide what to do with an incoming collection
///
/// `existing` is the version stored locally, if any.
pub fn resolve_conflict(
    existing: Option<&str>,
    incoming: &CollectionDescriptor,
    overwrite: bool,
) -> ConflictDecision {
    let existing = match existing {
        None => return ConflictDecision::Proceed { warning: None },
        Some(v) => v,
    };

    let details = |recommendation| ErrorDetails {
        existing_version: Some(existing.to_string()),
        incoming_version: Some(incoming.version.clone()),
        collection_id: Some(incoming.id.clone()),
        collection_name: Some(incoming.display_name.clone()),
        owner: Some(incoming.owner_username.clone()),
        language: Some(incoming.language_code.clone()),
        recommendation: Some(recommendation),
    };

    match (compare_versions(existing, &incoming.version), overwrite) {
        (Ordering::Equal, false) => ConflictDecision::Skip(
            ImportError::new(
                ErrorKind::DuplicateCollection,
                format!(
                    "Collection '{}' version {} is already installed",
                    incoming.id, existing
                ),
            )
            .with_details(details(Recommendation::Skip)),
        ),
        (Ordering::Greater, false) => ConflictDecision::Skip(
            ImportError::new(
                ErrorKind::VersionConflict,
                format!(
                    "Collection '{}' version {} is older than installed version {}",
                    incoming.id, incoming.version, existing
                ),
            )
            .with_details(details(Recommendation::Skip)),
        ),
        (Ordering::Less, false) => ConflictDecision::Skip(
            ImportError::new(
                ErrorKind::VersionConflict,
                format!(
                    "Collection '{}' version {} is newer than installed version {}",
                    incoming.id, incoming.version, existing
                ),
            )
            .with_details(details(Recommendation::Overwrite)),
        ),
        (Ordering::Greater, true) => ConflictDecision::Proceed {
            warning: Some(
                ImportError::new(
                    ErrorKind::VersionConflict,
                    format!(
                        "Replacing collection '{}' version {} with older version {}",
                        incoming.id, existing, incoming.version
                    ),
                )
                .with_details(details(Recommendation::Skip)),
            ),
        },
        (_, true) => ConflictDecision::Proceed { warning: None },
    }
}
