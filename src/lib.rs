pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::Cli;
pub use config::AppConfig;

pub use adapters::{HttpMetadataFetcher, LocalStorage, MemoryStorage};
pub use app::{ExportFormat, TrackerApp};
pub use crate::core::{debounce::UrlDebouncer, store::ListingStore, view::ListingFilter};
pub use domain::model::{
    Listing, ListingUpdate, ListingsState, Metadata, NewListing, TraitMap, TraitValue,
};
pub use utils::error::{Result, TrackerError};
