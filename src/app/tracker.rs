use crate::config::AppConfig;
use crate::core::store::{ListingStore, TableFormat};
use crate::core::view::{collect_all_tags, ListingFilter};
use crate::domain::model::{Listing, ListingUpdate, Metadata, NewListing};
use crate::domain::ports::{KeyValueStore, MetadataFetcher};
use crate::utils::error::{Result, TrackerError};
use crate::utils::validation::validate_listing_fields;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
    Tsv,
}

/// Result of an add: the stored listing plus a note for the user when the
/// metadata lookup did not work out.
#[derive(Debug, Clone, PartialEq)]
pub struct AddOutcome {
    pub listing: Listing,
    pub notice: Option<String>,
}

/// One load-mutate-save cycle per operation over a [`ListingStore`].
pub struct TrackerApp<S: KeyValueStore, F: MetadataFetcher> {
    store: ListingStore<S>,
    fetcher: Option<F>,
    export_filename: String,
}

impl<S: KeyValueStore, F: MetadataFetcher> TrackerApp<S, F> {
    pub fn new(storage: S, fetcher: Option<F>, config: &AppConfig) -> Self {
        Self {
            store: ListingStore::with_key(storage, config.storage.key.clone()),
            fetcher,
            export_filename: config.export.filename.clone(),
        }
    }

    pub fn store(&self) -> &ListingStore<S> {
        &self.store
    }

    pub async fn list(&self, filter: &ListingFilter) -> Result<Vec<Listing>> {
        let state = self.store.load().await?;
        let matched: Vec<Listing> = filter.apply(&state.listings).into_iter().cloned().collect();
        tracing::debug!(
            "Filter matched {} of {} listings",
            matched.len(),
            state.listings.len()
        );
        Ok(matched)
    }

    pub async fn show(&self, id: &str) -> Result<Listing> {
        let state = self.store.load().await?;
        state
            .find_listing(id)
            .cloned()
            .ok_or_else(|| TrackerError::NotFound { id: id.to_string() })
    }

    /// Adds `draft`. Fields the caller left empty are filled from the page
    /// metadata when `fetch` is set and a fetcher is configured.
    pub async fn add(&self, mut draft: NewListing, fetch: bool) -> Result<AddOutcome> {
        let mut notice = None;

        let wants_metadata = draft.title.trim().is_empty() || draft.image_url.is_none();
        if fetch && wants_metadata && !draft.url.trim().is_empty() {
            if let Some(fetcher) = &self.fetcher {
                let fetched = fetcher.fetch(draft.url.trim()).await;
                match fetched {
                    Ok(metadata) => fill_missing(&mut draft, &metadata),
                    Err(e) => {
                        tracing::warn!("Error fetching metadata: {}", e);
                        notice = Some("Failed to fetch URL metadata".to_string());
                    }
                }
            }
        }

        validate_listing_fields(&draft.title, &draft.url)?;

        let mut state = self.store.load().await?;
        let listing = state.add_listing(draft);
        self.store.save(&state).await?;
        tracing::info!("Added listing {}", listing.id);

        Ok(AddOutcome { listing, notice })
    }

    pub async fn edit(&self, id: &str, update: ListingUpdate) -> Result<Listing> {
        let mut state = self.store.load().await?;
        if !state.update_listing(id, update) {
            return Err(TrackerError::NotFound { id: id.to_string() });
        }

        let edited = state
            .find_listing(id)
            .cloned()
            .ok_or_else(|| TrackerError::NotFound { id: id.to_string() })?;
        validate_listing_fields(&edited.title, &edited.url)?;

        self.store.save(&state).await?;
        tracing::info!("Updated listing {}", id);
        Ok(edited)
    }

    /// `false` when there was nothing to delete; nothing is written then.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let mut state = self.store.load().await?;
        if !state.delete_listing(id) {
            tracing::debug!("Delete of unknown listing {} ignored", id);
            return Ok(false);
        }
        self.store.save(&state).await?;
        tracing::info!("Deleted listing {}", id);
        Ok(true)
    }

    pub async fn tags(&self) -> Result<Vec<String>> {
        let state = self.store.load().await?;
        Ok(collect_all_tags(&state.listings))
    }

    pub async fn traits(&self) -> Result<Vec<String>> {
        Ok(self.store.load().await?.known_traits)
    }

    pub async fn add_trait(&self, name: &str) -> Result<bool> {
        let mut state = self.store.load().await?;
        if !state.add_known_trait(name) {
            return Ok(false);
        }
        self.store.save(&state).await?;
        Ok(true)
    }

    pub async fn export(&self, dir: &Path, format: ExportFormat) -> Result<PathBuf> {
        let table_format = match format {
            ExportFormat::Json => {
                return self.store.export_to_file(dir, &self.export_filename).await;
            }
            ExportFormat::Csv => TableFormat::Csv,
            ExportFormat::Tsv => TableFormat::Tsv,
        };

        let extension = match table_format {
            TableFormat::Csv => "csv",
            TableFormat::Tsv => "tsv",
        };
        let table = self.store.export_table(table_format).await?;
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(&self.export_filename).with_extension(extension);
        tokio::fs::write(&path, table).await?;
        tracing::info!("Exported listing table to {}", path.display());
        Ok(path)
    }

    /// Reads `path` and imports it. `Ok(false)` means the file was not a
    /// listings document and nothing changed.
    pub async fn import(&self, path: &Path) -> Result<bool> {
        let text = tokio::fs::read_to_string(path).await?;
        self.store.import_from_text(&text).await
    }

    pub async fn fetch_metadata(&self, url: &str) -> Result<Metadata> {
        match &self.fetcher {
            Some(fetcher) => fetcher.fetch(url).await,
            None => Err(TrackerError::ConfigError {
                message: "metadata fetching is disabled".to_string(),
            }),
        }
    }
}

fn fill_missing(draft: &mut NewListing, metadata: &Metadata) {
    let mut found = Metadata::default();
    if draft.title.trim().is_empty() {
        found.title = metadata.title.clone();
    }
    if draft.image_url.is_none() {
        found.image_url = metadata.image_url.clone();
    }
    draft.apply_metadata(&found);
}
