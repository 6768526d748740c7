use listing_tracker::core::store::DEFAULT_STORAGE_KEY;
use listing_tracker::core::view::filter_by_tags;
use listing_tracker::{
    ListingStore, ListingsState, LocalStorage, NewListing, TraitMap, TraitValue, TrackerError,
};
use tempfile::TempDir;

fn sample_state() -> ListingsState {
    let mut state = ListingsState::default();
    state.add_listing(NewListing {
        title: "A".to_string(),
        url: "http://a".to_string(),
        tags: vec!["downtown".to_string()],
        ..Default::default()
    });
    let mut traits = TraitMap::new();
    traits.insert("pet-friendly".to_string(), TraitValue::Yes);
    traits.insert("parking".to_string(), TraitValue::Unknown);
    state.add_listing(NewListing {
        title: "B".to_string(),
        url: "http://b".to_string(),
        tags: vec!["uptown".to_string(), "pets".to_string()],
        image_url: Some("https://b.example/cover.jpg".to_string()),
        traits: Some(traits),
    });
    state
}

#[tokio::test]
async fn test_state_survives_a_new_store_instance() {
    let temp_dir = TempDir::new().unwrap();
    let state = sample_state();

    ListingStore::new(LocalStorage::new(temp_dir.path()))
        .save(&state)
        .await
        .unwrap();

    let reopened = ListingStore::new(LocalStorage::new(temp_dir.path()));
    let loaded = reopened.load().await.unwrap();
    assert_eq!(loaded, state);
    assert_eq!(loaded.known_traits, vec!["pet-friendly", "parking"]);

    let pets = filter_by_tags(&loaded.listings, &["pets"]);
    assert_eq!(pets.len(), 1);
    assert_eq!(pets[0].title, "B");
}

#[tokio::test]
async fn test_legacy_offers_file_is_loaded_and_rewritten() {
    let temp_dir = TempDir::new().unwrap();
    let legacy = r#"{
  "offers": [
    {"id": "1", "title": "A", "url": "http://a", "tags": ["downtown"], "imageUrl": ""},
    {"id": "2", "title": "B", "url": "http://b", "tags": ["uptown", "pets"],
     "traits": {"pet-friendly": "YES", "lift": null}}
  ],
  "traits": ["pet-friendly", "lift"]
}"#;
    let path = temp_dir.path().join(format!("{}.json", DEFAULT_STORAGE_KEY));
    std::fs::write(&path, legacy).unwrap();

    let store = ListingStore::new(LocalStorage::new(temp_dir.path()));
    let state = store.load().await.unwrap();
    assert_eq!(state.listings.len(), 2);
    assert_eq!(state.known_traits, vec!["pet-friendly", "lift"]);
    assert_eq!(
        state.listings[1].trait_value("lift"),
        Some(TraitValue::Unknown)
    );

    store.save(&state).await.unwrap();
    let rewritten: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(rewritten["schemaVersion"], 1);
    assert!(rewritten.get("offers").is_none());
    assert_eq!(rewritten["listings"][1]["traits"]["lift"], "UNKNOWN");
    assert_eq!(store.load().await.unwrap(), state);
}

#[tokio::test]
async fn test_corrupt_file_is_reported_not_replaced() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join(format!("{}.json", DEFAULT_STORAGE_KEY));
    std::fs::write(&path, "{\"listings\": 42}").unwrap();

    let store = ListingStore::new(LocalStorage::new(temp_dir.path()));
    let err = store.load().await.unwrap_err();
    assert!(matches!(err, TrackerError::SchemaError { .. }));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\"listings\": 42}");
}

#[tokio::test]
async fn test_export_then_import_into_fresh_directory() {
    let source_dir = TempDir::new().unwrap();
    let target_dir = TempDir::new().unwrap();
    let state = sample_state();

    let source = ListingStore::new(LocalStorage::new(source_dir.path()));
    source.save(&state).await.unwrap();
    let exported = source
        .export_to_file(source_dir.path(), "apartment-listings-export.json")
        .await
        .unwrap();
    let text = std::fs::read_to_string(&exported).unwrap();
    assert!(text.contains("\n  \"listings\""));

    let target = ListingStore::new(LocalStorage::new(target_dir.path()));
    assert!(target.import_from_text(&text).await.unwrap());
    assert_eq!(target.load().await.unwrap(), state);
}

#[tokio::test]
async fn test_rejected_import_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let store = ListingStore::new(LocalStorage::new(temp_dir.path()));

    assert!(!store.import_from_text("[1, 2, 3]").await.unwrap());
    assert!(!store.import_from_text(r#"{"offers": null}"#).await.unwrap());
    assert!(!temp_dir
        .path()
        .join(format!("{}.json", DEFAULT_STORAGE_KEY))
        .exists());
    assert_eq!(store.load().await.unwrap(), ListingsState::default());
}

#[tokio::test]
async fn test_custom_key_isolates_collections() {
    let temp_dir = TempDir::new().unwrap();
    let flats = ListingStore::with_key(LocalStorage::new(temp_dir.path()), "flats");
    let houses = ListingStore::with_key(LocalStorage::new(temp_dir.path()), "houses");

    flats.save(&sample_state()).await.unwrap();
    assert_eq!(houses.load().await.unwrap(), ListingsState::default());
    assert!(temp_dir.path().join("flats.json").exists());
}
