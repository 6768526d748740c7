use crate::domain::model::Metadata;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Key-value medium holding serialized blobs, one per key.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> impl std::future::Future<Output = Result<Option<String>>> + Send;
    fn put(&self, key: &str, value: &str)
        -> impl std::future::Future<Output = Result<()>> + Send;
}

#[async_trait]
pub trait MetadataFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Metadata>;

    /// Never fails: any error is logged and yields empty metadata.
    async fn fetch_or_default(&self, url: &str) -> Metadata {
        match self.fetch(url).await {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::warn!("Error fetching metadata for {}: {}", url, e);
                Metadata::default()
            }
        }
    }
}
