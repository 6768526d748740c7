//! Debounced metadata lookups for a URL that is still being typed.
//!
//! Every edit bumps a generation counter and cancels the pending timer.
//! Only a timer left alone for the whole delay starts a fetch, and a fetch
//! result is delivered only if no edit happened while it was in flight.

use crate::config::MetadataConfig;
use crate::domain::model::Metadata;
use crate::domain::ports::MetadataFetcher;
use crate::utils::error::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug)]
pub struct MetadataUpdate {
    pub generation: u64,
    pub url: String,
    pub result: Result<Metadata>,
}

pub struct UrlDebouncer<F: MetadataFetcher + 'static> {
    fetcher: Arc<F>,
    delay: Duration,
    generation: Arc<AtomicU64>,
    pending: Mutex<Option<JoinHandle<()>>>,
    updates: mpsc::UnboundedSender<MetadataUpdate>,
}

impl<F: MetadataFetcher + 'static> UrlDebouncer<F> {
    /// Must be called inside a tokio runtime.
    pub fn new(fetcher: Arc<F>, delay: Duration) -> (Self, mpsc::UnboundedReceiver<MetadataUpdate>) {
        let (updates, receiver) = mpsc::unbounded_channel();
        let debouncer = Self {
            fetcher,
            delay,
            generation: Arc::new(AtomicU64::new(0)),
            pending: Mutex::new(None),
            updates,
        };
        (debouncer, receiver)
    }

    /// Uses `metadata.debounce_ms` as the quiet period.
    pub fn from_config(
        fetcher: Arc<F>,
        config: &MetadataConfig,
    ) -> (Self, mpsc::UnboundedReceiver<MetadataUpdate>) {
        Self::new(fetcher, Duration::from_millis(config.debounce_ms))
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Records a new URL value and returns its generation. Blank URLs only
    /// cancel what is pending.
    pub fn edit(&self, url: &str) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = pending.take() {
            handle.abort();
        }

        let url = url.trim().to_string();
        if url.is_empty() {
            return generation;
        }

        let fetcher = Arc::clone(&self.fetcher);
        let current = Arc::clone(&self.generation);
        let updates = self.updates.clone();
        let delay = self.delay;

        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if current.load(Ordering::SeqCst) != generation {
                return;
            }

            let result = fetcher.fetch(&url).await;
            if current.load(Ordering::SeqCst) != generation {
                tracing::debug!("Discarding stale metadata for {}", url);
                return;
            }
            if let Err(e) = &result {
                tracing::warn!("Error fetching metadata for {}: {}", url, e);
            }
            let _ = updates.send(MetadataUpdate {
                generation,
                url,
                result,
            });
        }));

        generation
    }

    /// Drops any pending or in-flight lookup.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = self
            .pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            handle.abort();
        }
    }
}

impl<F: MetadataFetcher + 'static> Drop for UrlDebouncer<F> {
    fn drop(&mut self) {
        self.cancel();
    }
}
