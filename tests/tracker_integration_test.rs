use anyhow::Result;
use httpmock::prelude::*;
use listing_tracker::config::AppConfig;
use listing_tracker::{
    ExportFormat, HttpMetadataFetcher, ListingFilter, LocalStorage, NewListing, TrackerApp,
    TraitMap, TraitValue,
};
use tempfile::TempDir;

fn config_for(dir: &TempDir) -> AppConfig {
    let mut config = AppConfig::default();
    config.storage.data_dir = dir.path().to_str().unwrap().to_string();
    config
}

fn app_for(config: &AppConfig) -> Result<TrackerApp<LocalStorage, HttpMetadataFetcher>> {
    let fetcher = HttpMetadataFetcher::new(&config.metadata)?;
    Ok(TrackerApp::new(
        LocalStorage::new(config.storage.data_dir.clone()),
        Some(fetcher),
        config,
    ))
}

#[tokio::test]
async fn test_add_with_scraped_metadata_then_filter() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = config_for(&temp_dir);
    let app = app_for(&config)?;

    let server = MockServer::start();
    let page_mock = server.mock(|when, then| {
        when.method(GET).path("/flat/1");
        then.status(200).body(
            r#"<head><title>Loft with terrace</title>
               <meta property="og:image" content="https://img.example/loft.jpg"></head>"#,
        );
    });

    let mut traits = TraitMap::new();
    traits.insert("pet-friendly".to_string(), TraitValue::Yes);
    let added = app
        .add(
            NewListing {
                url: server.url("/flat/1"),
                tags: vec!["pets".to_string(), "uptown".to_string()],
                traits: Some(traits),
                ..Default::default()
            },
            true,
        )
        .await?;
    page_mock.assert();
    assert_eq!(added.listing.title, "Loft with terrace");
    assert_eq!(
        added.listing.image_url.as_deref(),
        Some("https://img.example/loft.jpg")
    );

    app.add(
        NewListing {
            title: "Basement".to_string(),
            url: "http://basement.example".to_string(),
            tags: vec!["downtown".to_string()],
            ..Default::default()
        },
        false,
    )
    .await?;

    let pets = app
        .list(&ListingFilter {
            tags: vec!["pets".to_string()],
            traits: TraitMap::new(),
        })
        .await?;
    assert_eq!(pets.len(), 1);
    assert_eq!(pets[0].id, added.listing.id);

    let mut trait_filter = TraitMap::new();
    trait_filter.insert("pet-friendly".to_string(), TraitValue::No);
    let none = app
        .list(&ListingFilter {
            tags: vec![],
            traits: trait_filter,
        })
        .await?;
    assert!(none.is_empty());

    assert_eq!(app.list(&ListingFilter::default()).await?.len(), 2);
    assert_eq!(app.traits().await?, vec!["pet-friendly"]);
    assert_eq!(app.tags().await?, vec!["pets", "uptown", "downtown"]);
    Ok(())
}

#[tokio::test]
async fn test_failed_metadata_lookup_keeps_typed_fields() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let app = app_for(&config_for(&temp_dir))?;

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/down");
        then.status(503);
    });

    let outcome = app
        .add(
            NewListing {
                title: "Typed by hand".to_string(),
                url: server.url("/down"),
                ..Default::default()
            },
            true,
        )
        .await?;
    assert_eq!(outcome.listing.title, "Typed by hand");
    assert!(outcome.notice.is_some());
    Ok(())
}

#[tokio::test]
async fn test_export_and_import_files() -> Result<()> {
    let source_dir = TempDir::new()?;
    let target_dir = TempDir::new()?;
    let export_dir = TempDir::new()?;
    let source = app_for(&config_for(&source_dir))?;
    let target = app_for(&config_for(&target_dir))?;

    source
        .add(
            NewListing {
                title: "Flat, bright".to_string(),
                url: "http://flat.example".to_string(),
                tags: vec!["downtown".to_string()],
                ..Default::default()
            },
            false,
        )
        .await?;

    let json_path = source.export(export_dir.path(), ExportFormat::Json).await?;
    assert!(json_path.ends_with("apartment-listings.json"));

    let csv_path = source.export(export_dir.path(), ExportFormat::Csv).await?;
    assert!(csv_path.ends_with("apartment-listings.csv"));
    let csv = tokio::fs::read_to_string(&csv_path).await?;
    assert!(csv.contains("\"Flat, bright\""));

    assert!(target.import(&json_path).await?);
    assert_eq!(
        target.list(&ListingFilter::default()).await?,
        source.list(&ListingFilter::default()).await?
    );

    // a CSV file is not a listings document
    assert!(!target.import(&csv_path).await?);
    assert_eq!(target.list(&ListingFilter::default()).await?.len(), 1);
    Ok(())
}
