use crate::core::schema::{self, StoredShape};
use crate::domain::model::ListingsState;
use crate::domain::ports::KeyValueStore;
use crate::utils::error::{Result, TrackerError};
use std::path::{Path, PathBuf};

pub const DEFAULT_STORAGE_KEY: &str = "apartment-listings";
pub const DEFAULT_EXPORT_FILENAME: &str = "apartment-listings.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Tsv,
}

impl TableFormat {
    fn delimiter(self) -> u8 {
        match self {
            TableFormat::Csv => b',',
            TableFormat::Tsv => b'\t',
        }
    }
}

/// Reads and writes the whole [`ListingsState`] as one blob under one key.
pub struct ListingStore<S: KeyValueStore> {
    storage: S,
    key: String,
}

impl<S: KeyValueStore> ListingStore<S> {
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Last saved state, or an empty one when nothing has been stored yet.
    ///
    /// A stored blob that matches no known shape is an error: returning an
    /// empty state here would let the next save wipe the user's data.
    pub async fn load(&self) -> Result<ListingsState> {
        let Some(text) = self.storage.get(&self.key).await? else {
            tracing::debug!("No stored listings under '{}', starting empty", self.key);
            return Ok(ListingsState::default());
        };

        let (shape, state) =
            schema::decode_state(&text).map_err(|e| TrackerError::SchemaError {
                key: self.key.clone(),
                reason: e.to_string(),
            })?;

        if shape == StoredShape::Legacy {
            tracing::info!("Loaded legacy listing data; it will be rewritten on next save");
        }
        tracing::debug!(
            "Loaded {} listings and {} known traits",
            state.listings.len(),
            state.known_traits.len()
        );
        Ok(state)
    }

    pub async fn save(&self, state: &ListingsState) -> Result<()> {
        let text = schema::encode_state(state, false)?;
        self.storage.put(&self.key, &text).await?;
        tracing::debug!("Saved {} listings under '{}'", state.listings.len(), self.key);
        Ok(())
    }

    /// Pretty-printed JSON of the current state.
    pub async fn export_to_text(&self) -> Result<String> {
        let state = self.load().await?;
        Ok(schema::encode_state(&state, true)?)
    }

    /// Writes the export text to `dir/filename` and returns the path.
    pub async fn export_to_file(&self, dir: &Path, filename: &str) -> Result<PathBuf> {
        let text = self.export_to_text().await?;
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(filename);
        tokio::fs::write(&path, text).await?;
        tracing::info!("Exported listings to {}", path.display());
        Ok(path)
    }

    /// Replaces the stored state with the one in `text`.
    ///
    /// `Ok(false)` when the text is not a recognized listings document; in
    /// that case nothing is written. Errors are reserved for storage failures.
    pub async fn import_from_text(&self, text: &str) -> Result<bool> {
        let state = match schema::decode_state(text) {
            Ok((_, state)) => state,
            Err(e) => {
                tracing::warn!("Import rejected: {}", e);
                return Ok(false);
            }
        };

        self.save(&state).await?;
        tracing::info!("Imported {} listings", state.listings.len());
        Ok(true)
    }

    /// Spreadsheet rendering of the current listings.
    pub async fn export_table(&self, format: TableFormat) -> Result<String> {
        let state = self.load().await?;
        render_table(&state, format)
    }
}

pub fn render_table(state: &ListingsState, format: TableFormat) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(format.delimiter())
        .from_writer(Vec::new());

    writer.write_record(["id", "title", "url", "tags", "imageUrl", "traits"])?;
    for listing in &state.listings {
        let traits = listing
            .traits
            .iter()
            .flatten()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join(";");
        writer.write_record([
            listing.id.as_str(),
            listing.title.as_str(),
            listing.url.as_str(),
            listing.tags.join(";").as_str(),
            listing.image_url.as_deref().unwrap_or(""),
            traits.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| TrackerError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| TrackerError::ValidationError {
        message: format!("Table output is not UTF-8: {}", e),
    })
}
