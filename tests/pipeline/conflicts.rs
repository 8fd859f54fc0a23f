//! Conflict policy against an installed collection

use crate::common::*;
use storybundle::{ErrorKind, ImportStage, Recommendation};

fn exported(version: &str) -> Vec<u8> {
    let source = Device::new();
    seed_creation(source.store.as_ref(), version);
    source.export(&ExportOptions::new(CREATION_ID))
}

#[test]
fn importing_twice_skips_duplicate() {
    let device = Device::new();
    let bytes = exported("1.0");

    let first = device.import(&bytes, ImportOptions::default());
    assert!(first.success);
    assert_eq!(first.imported_collection_id.as_deref(), Some(CREATION_ID));

    let second = device.import(&bytes, ImportOptions::default());
    assert!(second.skipped);
    assert!(!second.success);
    assert_eq!(second.stage, ImportStage::Skipped);
    assert!(second.imported_collection_id.is_none());
    assert_eq!(second.errors.len(), 1);
    assert_eq!(second.errors[0].kind, ErrorKind::DuplicateCollection);
    assert_eq!(second.errors[0].code, 1002);
}

#[test]
fn equal_versions_with_different_spelling_are_duplicates() {
    let device = Device::new();
    assert!(device.import(&exported("1.2"), ImportOptions::default()).success);

    let outcome = device.import(&exported("1.2.0"), ImportOptions::default());
    assert!(outcome.skipped);
    assert_eq!(outcome.error().unwrap().kind, ErrorKind::DuplicateCollection);
}

#[test]
fn newer_incoming_without_overwrite_recommends_overwrite() {
    let device = Device::new();
    assert!(device.import(&exported("1.9"), ImportOptions::default()).success);

    let outcome = device.import(&exported("1.10"), ImportOptions::default());
    assert!(outcome.skipped);
    let error = outcome.error().unwrap();
    assert_eq!(error.kind, ErrorKind::VersionConflict);
    assert_eq!(error.recommendation(), Some(Recommendation::Overwrite));

    let details = error.details.as_ref().unwrap();
    assert_eq!(details.existing_version.as_deref(), Some("1.9"));
    assert_eq!(details.incoming_version.as_deref(), Some("1.10"));
    assert_eq!(device.version_of(CREATION_ID).as_deref(), Some("1.9"));
}

#[test]
fn newer_incoming_with_overwrite_replaces_version() {
    let device = Device::new();
    assert!(device.import(&exported("1.9"), ImportOptions::default()).success);

    let outcome = device.import(
        &exported("1.10"),
        ImportOptions {
            overwrite_existing: true,
            ..Default::default()
        },
    );
    assert!(outcome.success);
    assert!(outcome.warnings.is_empty());
    assert_eq!(device.version_of(CREATION_ID).as_deref(), Some("1.10"));
}

#[test]
fn older_incoming_without_overwrite_recommends_skip() {
    let device = Device::new();
    assert!(device.import(&exported("3"), ImportOptions::default()).success);

    let outcome = device.import(&exported("2.5"), ImportOptions::default());
    assert!(outcome.skipped);
    assert_eq!(outcome.error().unwrap().kind, ErrorKind::VersionConflict);
    assert_eq!(
        outcome.error().unwrap().recommendation(),
        Some(Recommendation::Skip)
    );
}

#[test]
fn overwrite_removes_stale_frames() {
    let device = Device::new();

    let big = Device::new();
    seed_large(big.store.as_ref(), CREATION_ID, 3, 10);
    assert!(device
        .import(&big.export(&ExportOptions::new(CREATION_ID)), ImportOptions::default())
        .success);
    assert_eq!(device.store.frame_count(CREATION_ID), 30);

    let outcome = device.import(
        &exported("2"),
        ImportOptions {
            overwrite_existing: true,
            ..Default::default()
        },
    );
    assert!(outcome.success);

    let (stories, frames) = snapshot(device.store.as_ref(), CREATION_ID);
    assert_eq!(stories.len(), 1);
    assert_eq!(stories[0].title, "The Creation");
    assert_eq!(frames.len(), 2);
    assert_eq!(device.store.frame_count(CREATION_ID), 2);
}

#[test]
fn skipped_import_writes_nothing() {
    let device = Device::new();
    assert!(device.import(&exported("1"), ImportOptions::default()).success);
    let before = device.store.transaction_count();

    device.import(&exported("2"), ImportOptions::default());
    assert_eq!(device.store.transaction_count(), before);
    assert_eq!(device.version_of(CREATION_ID).as_deref(), Some("1"));
}
