//! Favorites carried in content/user-data.json

use crate::common::*;
use storybundle::{ArchiveReader, UserData};

fn seed_with_favorites(device: &Device) {
    seed_creation(device.store.as_ref(), "1");
    let mut s = story(CREATION_ID, 1, "The Creation", Some("Genesis 1-2"));
    s.is_favorite = true;
    device.store.save_stories(&[s]).unwrap();
    let mut f = frame(CREATION_ID, 1, 2, "img2.jpg", "text B");
    f.is_favorite = true;
    device.store.save_frames(&[f]).unwrap();
}

#[test]
fn favorites_travel_when_requested() {
    let source = Device::new();
    seed_with_favorites(&source);

    let mut options = ExportOptions::new(CREATION_ID);
    options.include_user_data = true;
    let bytes = source.export(&options);

    let reader = ArchiveReader::open(&bytes).unwrap();
    let json = reader.read_text("content/user-data.json").unwrap().unwrap();
    let data: UserData = serde_json::from_str(json).unwrap();
    assert_eq!(data.favorite_stories, vec![1]);
    assert!(data.is_frame_favorite(1, 2));

    let target = Device::new();
    let summary = target.importer.inspect(&bytes).unwrap();
    assert!(summary.has_user_data);
    assert!(target.import(&bytes, ImportOptions::default()).success);

    assert_eq!(
        snapshot(source.store.as_ref(), CREATION_ID),
        snapshot(target.store.as_ref(), CREATION_ID)
    );
}

#[test]
fn favorites_stay_local_by_default() {
    let source = Device::new();
    seed_with_favorites(&source);
    let bytes = source.export(&ExportOptions::new(CREATION_ID));

    let target = Device::new();
    assert!(target.import(&bytes, ImportOptions::default()).success);

    let (stories, frames) = snapshot(target.store.as_ref(), CREATION_ID);
    assert!(!stories[0].is_favorite);
    assert!(frames.iter().all(|f| !f.is_favorite));
}
