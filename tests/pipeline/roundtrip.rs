//! Export then import, across devices and through files

use crate::common::*;
use storybundle::{decode_story, xxh3_hex, ArchiveReader, ImportStage};
use tempfile::TempDir;

#[test]
fn creation_story_decodes_back_exactly() {
    let source = Device::new();
    seed_creation(source.store.as_ref(), "9.1");

    let bytes = source.export(&ExportOptions::new(CREATION_ID));
    let reader = ArchiveReader::open(&bytes).unwrap();
    let text = reader.read_text("content/01.md").unwrap().unwrap();

    assert_eq!(
        text,
        "# The Creation\n\n\
         ![OBS Image](img1.jpg)\n\n\
         text A\n\n\
         ![OBS Image](img2.jpg)\n\n\
         text B\n\n\
         _Genesis 1-2_\n"
    );

    let decoded = decode_story(1, text);
    assert_eq!(decoded.title, "The Creation");
    assert_eq!(decoded.source_reference.as_deref(), Some("Genesis 1-2"));
    let frames: Vec<_> = decoded
        .frames
        .iter()
        .map(|f| (f.number, f.image_ref.as_str(), f.text.as_str()))
        .collect();
    assert_eq!(frames, vec![(1, "img1.jpg", "text A"), (2, "img2.jpg", "text B")]);
}

#[test]
fn import_on_second_device_reproduces_rows() {
    let source = Device::new();
    seed_large(source.store.as_ref(), CREATION_ID, 12, 15);
    let bytes = source.export(&ExportOptions::new(CREATION_ID));

    let target = Device::new();
    let outcome = target.import(&bytes, ImportOptions::default());

    assert!(outcome.success, "{:?}", outcome.errors);
    assert_eq!(outcome.stage, ImportStage::Done);
    assert_eq!(outcome.imported_collection_id.as_deref(), Some(CREATION_ID));
    assert_eq!(outcome.stories_imported, 12);
    assert_eq!(outcome.frames_imported, 180);

    assert_eq!(
        snapshot(source.store.as_ref(), CREATION_ID),
        snapshot(target.store.as_ref(), CREATION_ID)
    );

    let local = source.store.get_collection(CREATION_ID).unwrap().unwrap();
    let imported = target.store.get_collection(CREATION_ID).unwrap().unwrap();
    assert_eq!(local.descriptor, imported.descriptor);
    assert!(imported.is_downloaded);
    assert_eq!(target.store.get_owner("unfoldingWord").unwrap(), Some(owner("unfoldingWord")));
    assert_eq!(target.store.get_language("en").unwrap(), Some(english()));
}

#[test]
fn file_export_and_import() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("exports").join("en_obs.storybundle.zip");

    let source = Device::new();
    seed_creation(source.store.as_ref(), "1");
    source.images.save_thumbnail(CREATION_ID, b"\xFF\xD8jpeg").unwrap();

    let mut labels = Vec::new();
    let info = source
        .exporter
        .export(&ExportOptions::new(CREATION_ID), &path, &mut |p, label| {
            labels.push((p, label.to_string()))
        })
        .unwrap();

    assert_eq!(info.story_count, 1);
    assert_eq!(info.frame_count, 2);
    assert_eq!(info.checksum, xxh3_hex(&std::fs::read(&path).unwrap()));
    assert!(labels.windows(2).all(|w| w[0].0 <= w[1].0));
    assert_eq!(labels.last().unwrap().0, 100);

    let target = Device::new();
    let mut percents = Vec::new();
    let outcome = target.importer.import_file(
        &path,
        &ImportOptions::default(),
        &mut |p, _| percents.push(p),
    );

    assert!(outcome.success);
    assert!(percents.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(percents.last(), Some(&100));
    assert_eq!(
        target.images.load_thumbnail(CREATION_ID).unwrap(),
        Some(b"\xFF\xD8jpeg".to_vec())
    );
}

#[test]
fn small_chunks_give_identical_result() {
    let source = Device::new();
    seed_large(source.store.as_ref(), CREATION_ID, 5, 40);
    let bytes = source.export(&ExportOptions::new(CREATION_ID));

    let default = Device::new();
    assert!(default.import(&bytes, ImportOptions::default()).success);

    let tiny = Device::with_config(BundleConfig {
        story_chunk_size: 2,
        frame_chunk_size: 7,
        ..BundleConfig::default()
    });
    assert!(tiny.import(&bytes, ImportOptions::default()).success);

    assert_eq!(default.store.transaction_count(), 2);
    assert_eq!(tiny.store.transaction_count(), 3 + 29);
    assert_eq!(
        snapshot(default.store.as_ref(), CREATION_ID),
        snapshot(tiny.store.as_ref(), CREATION_ID)
    );
}
