//! Archives written by older exporters

use crate::common::*;
use storybundle::ImageStore;

const STORY: &str = "# The Creation\n\n\
                     ![OBS Image](img1.jpg)\n\n\
                     text A\n\n\
                     ![OBS Image](img2.jpg)\n\n\
                     text B\n\n\
                     _Genesis 1-2_\n";

#[test]
fn ingredients_folder_is_accepted() {
    let device = Device::new();
    let m = manifest(CREATION_ID, "1");
    let bytes = archive(&[
        ArchiveEntry::text("manifest.json", ManifestCodec::encode(&m).unwrap()),
        ArchiveEntry::text("ingredients/01.md", STORY),
        ArchiveEntry::text("ingredients/2.md", "# Second\n\n![OBS Image](x.jpg)\n\nX\n"),
        ArchiveEntry::binary("ingredients/thumbnail.jpg", vec![7, 7]),
    ]);

    let summary = device.importer.inspect(&bytes).unwrap();
    assert_eq!(summary.content_dir, "ingredients");
    assert_eq!(summary.story_numbers, vec![1, 2]);
    assert!(summary.has_thumbnail);

    let outcome = device.import(&bytes, ImportOptions::default());
    assert!(outcome.success);
    assert_eq!(outcome.stories_imported, 2);
    assert_eq!(outcome.frames_imported, 3);

    let (stories, frames) = snapshot(device.store.as_ref(), CREATION_ID);
    assert_eq!(stories[0].title, "The Creation");
    assert_eq!(
        stories[0].metadata.source_reference.as_deref(),
        Some("Genesis 1-2")
    );
    assert_eq!(stories[1].title, "Second");
    assert_eq!(frames[1].text, "text B");
    assert_eq!(device.images.load_thumbnail(CREATION_ID).unwrap(), Some(vec![7, 7]));
}

#[test]
fn manifest_without_owner_creates_minimal_owner() {
    let device = Device::new();
    let mut m = manifest(CREATION_ID, "1");
    m.owner = None;
    let bytes = archive_with_stories(&m, "content", &[STORY]);

    assert!(device.import(&bytes, ImportOptions::default()).success);

    let owner = device.store.get_owner("unfoldingWord").unwrap().unwrap();
    assert_eq!(owner.username, "unfoldingWord");
    assert!(owner.full_name.is_none());
}

#[test]
fn malformed_frames_are_dropped_not_fatal() {
    let device = Device::new();
    let story = "# Broken\n\n\
                 ![OBS Image]()\n\n\
                 orphan text\n\n\
                 ![OBS Image](ok.jpg)\n\n\
                 kept\n\n\
                 ![OBS Image](empty.jpg)\n";
    let bytes = archive_with_stories(&manifest(CREATION_ID, "1"), "content", &[story]);

    let outcome = device.import(&bytes, ImportOptions::default());
    assert!(outcome.success);
    assert_eq!(outcome.frames_imported, 1);

    let frames = device.store.list_frames(CREATION_ID, 1).unwrap();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].frame_number, 1);
    assert_eq!(frames[0].image_ref, "ok.jpg");
    assert_eq!(frames[0].text, "kept");
}

#[test]
fn catalog_style_collection_metadata_is_accepted() {
    let device = Device::new();
    let mut m = manifest(CREATION_ID, "1");
    m.collection.metadata = serde_json::from_value(serde_json::json!({
        "checking": { "checking_level": "3" },
        "scope": "OBS"
    }))
    .unwrap();
    let bytes = archive_with_stories(&m, "content", &[STORY]);

    let outcome = device.import(&bytes, ImportOptions::default());
    assert!(outcome.success, "{:?}", outcome.errors);

    let stored = device.store.get_collection(CREATION_ID).unwrap().unwrap();
    let metadata = &stored.descriptor.metadata;
    assert_eq!(metadata.checking_level(), Some("3"));
    assert_eq!(metadata.scope, Some(serde_json::json!("OBS")));
}
