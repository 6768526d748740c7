use crate::config::MetadataConfig;
use crate::core::scrape::{decode_body, extract_metadata};
use crate::domain::model::Metadata;
use crate::domain::ports::MetadataFetcher;
use crate::utils::error::{Result, TrackerError};
use crate::utils::validation::validate_url;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Fetches a listing page and scrapes its title and `og:image`.
pub struct HttpMetadataFetcher {
    client: Client,
    proxy_prefix: Option<String>,
}

impl HttpMetadataFetcher {
    pub fn new(config: &MetadataConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            proxy_prefix: config.proxy_prefix.clone(),
        })
    }

    fn request_url(&self, url: &str) -> String {
        match &self.proxy_prefix {
            Some(prefix) => format!("{}{}", prefix, url),
            None => url.to_string(),
        }
    }
}

#[async_trait]
impl MetadataFetcher for HttpMetadataFetcher {
    async fn fetch(&self, url: &str) -> Result<Metadata> {
        validate_url("url", url).map_err(|e| TrackerError::MetadataError {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let request_url = self.request_url(url);
        tracing::debug!("Fetching metadata from: {}", request_url);
        let response = self.client.get(&request_url).send().await?;

        tracing::debug!("Metadata response status: {}", response.status());
        if !response.status().is_success() {
            return Err(TrackerError::MetadataError {
                url: url.to_string(),
                message: format!("HTTP status {}", response.status()),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?;
        let body = decode_body(&bytes, content_type.as_deref());
        let metadata = extract_metadata(&body, url);
        tracing::debug!("Fetched metadata: {:?}", metadata);
        Ok(metadata)
    }
}
