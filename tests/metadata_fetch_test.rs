use httpmock::prelude::*;
use listing_tracker::config::MetadataConfig;
use listing_tracker::domain::ports::MetadataFetcher;
use listing_tracker::{HttpMetadataFetcher, TrackerError};

const LISTING_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>  2-room flat near the park | Flats  </title>
  <meta property="og:image" content="//cdn.flats.example/photos/42.jpg">
</head>
<body><h1>2-room flat</h1></body>
</html>"#;

fn fetcher(config: MetadataConfig) -> HttpMetadataFetcher {
    HttpMetadataFetcher::new(&config).unwrap()
}

#[tokio::test]
async fn test_fetch_scrapes_title_and_image() {
    let server = MockServer::start();
    let page_mock = server.mock(|when, then| {
        when.method(GET).path("/listing/42");
        then.status(200)
            .header("Content-Type", "text/html; charset=utf-8")
            .body(LISTING_PAGE);
    });

    let metadata = fetcher(MetadataConfig::default())
        .fetch(&server.url("/listing/42"))
        .await
        .unwrap();

    page_mock.assert();
    assert_eq!(
        metadata.title.as_deref(),
        Some("2-room flat near the park | Flats")
    );
    assert_eq!(
        metadata.image_url.as_deref(),
        Some("https://cdn.flats.example/photos/42.jpg")
    );
}

#[tokio::test]
async fn test_fetch_goes_through_proxy_prefix() {
    let server = MockServer::start();
    let proxy_mock = server.mock(|when, then| {
        when.method(GET)
            .path_contains("/proxy/")
            .path_contains("listings.example");
        then.status(200).body("<title>Via proxy</title>");
    });

    let config = MetadataConfig {
        proxy_prefix: Some(server.url("/proxy/")),
        ..Default::default()
    };
    let metadata = fetcher(config)
        .fetch("https://listings.example/7")
        .await
        .unwrap();

    proxy_mock.assert();
    assert_eq!(metadata.title.as_deref(), Some("Via proxy"));
}

#[tokio::test]
async fn test_server_error_is_metadata_error() {
    let server = MockServer::start();
    let failing_mock = server.mock(|when, then| {
        when.method(GET).path("/gone");
        then.status(500);
    });

    let result = fetcher(MetadataConfig::default())
        .fetch(&server.url("/gone"))
        .await;

    failing_mock.assert();
    assert!(matches!(result, Err(TrackerError::MetadataError { .. })));
}

#[tokio::test]
async fn test_fetch_or_default_never_fails() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/gone");
        then.status(404);
    });

    let fetcher = fetcher(MetadataConfig::default());
    assert!(fetcher.fetch_or_default(&server.url("/gone")).await.is_empty());
    assert!(fetcher.fetch_or_default("not a url").await.is_empty());
}

#[tokio::test]
async fn test_fetch_decodes_charset_declared_in_markup() {
    let mut page = br#"<html><head><meta http-equiv="Content-Type" content="text/html; charset=windows-1255"><title>"#.to_vec();
    page.extend_from_slice(&[0xE3, 0xE9, 0xF8, 0xE4]);
    page.extend_from_slice(b"</title></head><body></body></html>");

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/listing/he");
        then.status(200)
            .header("Content-Type", "text/html")
            .body(page.clone());
    });

    let metadata = fetcher(MetadataConfig::default())
        .fetch(&server.url("/listing/he"))
        .await
        .unwrap();

    assert_eq!(metadata.title.as_deref(), Some("דירה"));
}
