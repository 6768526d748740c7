pub mod debounce;
pub mod schema;
pub mod scrape;
pub mod store;
pub mod view;

pub use crate::domain::model::{Listing, ListingsState, Metadata, NewListing, TraitValue};
pub use crate::domain::ports::{KeyValueStore, MetadataFetcher};
pub use crate::utils::error::Result;
