use std::fs;

use launchpad_core::{LanguageCode, ListingRecord};
use launchpad_sync::{metadata, SyncError, WriteResult};
use tempfile::TempDir;

#[test]
fn listings_round_trip_through_the_tree() {
    let tmp = TempDir::new().unwrap();
    let dir = metadata::metadata_dir_at(tmp.path());
    let records = vec![
        ListingRecord::new("en-US")
            .with_title("My App")
            .with_full_description("Line one\nLine two"),
        ListingRecord::new("fr-FR").with_short_description("Court"),
    ];

    let writes = metadata::write_listings(&dir, &records).expect("write");

    assert_eq!(writes.len(), 3);
    assert!(!dir.join("en-US/video.txt").exists());
    assert_eq!(
        fs::read_to_string(dir.join("en-US/full_description.txt")).unwrap(),
        "Line one\nLine two\n"
    );
    assert_eq!(metadata::load_listings(&dir).expect("load"), records);
}

#[test]
fn rewriting_same_listing_is_unchanged() {
    let tmp = TempDir::new().unwrap();
    let records = vec![ListingRecord::new("en-US").with_title("Same")];
    metadata::write_listings(tmp.path(), &records).expect("first");

    let writes = metadata::write_listings(tmp.path(), &records).expect("second");

    assert!(matches!(writes[0], WriteResult::Unchanged { .. }));
}

#[test]
fn language_folder_without_text_loads_as_empty_record() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("de-DE")).unwrap();
    fs::write(tmp.path().join("stray.txt"), "not a language").unwrap();

    let records = metadata::load_listings(tmp.path()).expect("load");

    assert_eq!(records, vec![ListingRecord::new("de-DE")]);
}

#[test]
fn clearing_cache_keeps_images_and_drops_empty_folders() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    metadata::write_listings(
        dir,
        &[
            ListingRecord::new("en-US").with_title("A"),
            ListingRecord::new("fr-FR").with_title("B"),
        ],
    )
    .expect("write");
    fs::create_dir_all(dir.join("en-US/images/icon")).unwrap();
    fs::write(dir.join("en-US/images/icon/icon.png"), b"png").unwrap();
    fs::create_dir_all(dir.join("fr-FR/images/tvBanner")).unwrap();

    let removed = metadata::clear_cached_listings(dir).expect("clear");

    assert_eq!(removed, 2);
    assert!(!dir.join("en-US/title.txt").exists());
    assert!(dir.join("en-US/images/icon/icon.png").exists());
    assert!(!dir.join("fr-FR").exists());
}

#[test]
fn clearing_missing_tree_is_a_no_op() {
    let tmp = TempDir::new().unwrap();
    let removed = metadata::clear_cached_listings(&tmp.path().join("absent")).expect("clear");
    assert_eq!(removed, 0);
}

#[test]
fn missing_tree_points_at_pull() {
    let tmp = TempDir::new().unwrap();
    let err = metadata::ensure_exists(&tmp.path().join("metadata/android")).unwrap_err();
    assert!(matches!(err, SyncError::NotFound(_)));
    assert!(err.to_string().contains("listings pull"));
}

#[test]
fn release_notes_come_from_changelogs() {
    let tmp = TempDir::new().unwrap();
    let en = LanguageCode::from("en-US");
    fs::create_dir_all(tmp.path().join("en-US/changelogs")).unwrap();
    fs::write(tmp.path().join("en-US/changelogs/42.txt"), "Bug fixes\n").unwrap();

    assert_eq!(
        metadata::read_release_notes(tmp.path(), &en, 42)
            .unwrap()
            .as_deref(),
        Some("Bug fixes")
    );
    assert_eq!(metadata::read_release_notes(tmp.path(), &en, 43).unwrap(), None);
}
