//! Failed imports: bad containers, bad manifests, storage failures

use crate::common::*;
use storybundle::{ErrorKind, ImportStage, MANIFEST_FORMAT_VERSION};
use tempfile::TempDir;

#[test]
fn archive_without_manifest_fails_as_corrupted() {
    let device = Device::new();
    let bytes = archive(&[ArchiveEntry::text(
        "content/01.md",
        "# One\n\n![OBS Image](a.jpg)\n\nText\n",
    )]);

    let outcome = device.import(&bytes, ImportOptions::default());

    assert!(!outcome.success);
    assert!(!outcome.skipped);
    assert_eq!(outcome.stage, ImportStage::Failed);
    assert!(outcome.imported_collection_id.is_none());
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].kind, ErrorKind::MissingManifest);
    assert_eq!(outcome.errors[0].kind.family(), ErrorKind::CorruptedData);
    assert_eq!(outcome.errors[0].code, 1007);
}

#[test]
fn malformed_manifest_fails_as_invalid() {
    let device = Device::new();
    let bytes = archive(&[
        ArchiveEntry::text("manifest.json", "{\"manifestFormatVersion\": 1"),
        ArchiveEntry::text("content/01.md", "# One\n"),
    ]);

    let outcome = device.import(&bytes, ImportOptions::default());
    assert!(outcome.is_failed());
    assert_eq!(outcome.error().unwrap().kind, ErrorKind::InvalidManifest);
    assert_eq!(outcome.error().unwrap().kind.family(), ErrorKind::CorruptedData);
}

#[test]
fn format_version_mismatch_is_incompatible_unless_skipped() {
    let device = Device::new();
    let mut m = manifest(CREATION_ID, "1");
    m.format_version = "0.9.0".to_string();
    assert_ne!(m.format_version, MANIFEST_FORMAT_VERSION);
    let bytes = archive_with_stories(&m, "content", &["# One\n\n![OBS Image](a.jpg)\n\nText\n"]);

    let outcome = device.import(&bytes, ImportOptions::default());
    assert!(outcome.is_failed());
    assert_eq!(outcome.error().unwrap().kind, ErrorKind::VersionIncompatible);
    assert!(device.version_of(CREATION_ID).is_none());

    let outcome = device.import(
        &bytes,
        ImportOptions {
            skip_version_check: true,
            ..Default::default()
        },
    );
    assert!(outcome.success);
    assert_eq!(device.version_of(CREATION_ID).as_deref(), Some("1"));
}

#[test]
fn storage_failure_mid_batch_leaves_partial_rows() {
    let source = Device::new();
    seed_large(source.store.as_ref(), CREATION_ID, 3, 600);
    let bytes = source.export(&ExportOptions::new(CREATION_ID));

    let device = Device::new();
    // Story chunk and first frame chunk commit, then storage fails
    device.store.fail_after_transactions(2);

    let outcome = device.import(&bytes, ImportOptions::default());

    assert!(outcome.is_failed());
    assert!(outcome.imported_collection_id.is_none());
    let error = outcome.error().unwrap();
    assert_eq!(error.kind, ErrorKind::UnknownError);
    assert!(!error.can_retry);

    // No rollback: earlier writes stay
    assert!(device.version_of(CREATION_ID).is_some());
    assert_eq!(device.store.list_stories(CREATION_ID).unwrap().len(), 3);
    assert_eq!(device.store.frame_count(CREATION_ID), 500);
}

#[test]
fn oversized_entry_is_rejected() {
    let source = Device::new();
    seed_creation(source.store.as_ref(), "1");
    let bytes = source.export(&ExportOptions::new(CREATION_ID));

    let device = Device::with_config(BundleConfig {
        max_entry_bytes: 16,
        ..BundleConfig::default()
    });
    let outcome = device.import(&bytes, ImportOptions::default());

    assert!(outcome.is_failed());
    assert_eq!(outcome.error().unwrap().kind, ErrorKind::CorruptedData);
    assert!(device.version_of(CREATION_ID).is_none());
}

#[test]
fn unreadable_file_is_retryable() {
    let dir = TempDir::new().unwrap();
    let device = Device::new();

    let outcome = device.importer.import_file(
        &dir.path().join("missing.storybundle.zip"),
        &ImportOptions::default(),
        &mut |_, _| {},
    );

    let error = outcome.error().unwrap();
    assert_eq!(error.kind, ErrorKind::FileReadError);
    assert_eq!(error.code, 1005);
    assert!(error.can_retry);
}

#[test]
fn export_of_unknown_collection_is_not_found() {
    let device = Device::new();
    let err = device
        .exporter
        .export_to_vec(&ExportOptions::new("nobody/nothing"), &mut |_, _| {})
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.to_import_error().code, 1010);
}
