//! Persisted shapes of [`ListingsState`].
//!
//! Two shapes are known:
//!
//! * `Legacy`: `{ "offers": [...], "traits": [...] }`, written by the first
//!   versions of the tracker. `traits` may be missing.
//! * `Current`: `{ "schemaVersion": 1, "listings": [...], "knownTraits": [...] }`.
//!   `schemaVersion` and `knownTraits` may be missing.
//!
//! Both map forward to the same in-memory state. Anything else is rejected
//! rather than guessed at.

use crate::domain::model::{Listing, ListingsState};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const CURRENT_SCHEMA_VERSION: u64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoredShape {
    Legacy,
    Current,
}

#[derive(Debug, Error, PartialEq)]
pub enum SchemaRejection {
    #[error("not valid JSON: {0}")]
    InvalidJson(String),

    #[error("top-level value is not an object")]
    NotAnObject,

    #[error("unsupported schemaVersion {0}")]
    UnsupportedVersion(String),

    #[error("neither 'listings' nor 'offers' is present")]
    MissingListings,

    #[error("both 'listings' and 'offers' are present")]
    AmbiguousListings,

    #[error("'{0}' is not an array")]
    NotAnArray(&'static str),

    #[error("malformed {shape:?} data: {message}")]
    Malformed { shape: StoredShape, message: String },
}

#[derive(Deserialize)]
struct LegacyBlob {
    offers: Vec<Listing>,
    #[serde(default)]
    traits: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurrentBlob {
    listings: Vec<Listing>,
    #[serde(default)]
    known_traits: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CurrentBlobRef<'a> {
    schema_version: u64,
    listings: &'a [Listing],
    known_traits: &'a [String],
}

/// Figure out which known shape `value` has without deserializing listings.
pub fn detect_shape(value: &Value) -> Result<StoredShape, SchemaRejection> {
    let obj = value.as_object().ok_or(SchemaRejection::NotAnObject)?;

    let version = match obj.get("schemaVersion") {
        None => None,
        Some(v) => match v.as_u64() {
            Some(CURRENT_SCHEMA_VERSION) => Some(CURRENT_SCHEMA_VERSION),
            _ => return Err(SchemaRejection::UnsupportedVersion(v.to_string())),
        },
    };

    match (obj.get("listings"), obj.get("offers")) {
        (Some(_), Some(_)) => Err(SchemaRejection::AmbiguousListings),
        (None, None) => Err(SchemaRejection::MissingListings),
        (Some(listings), None) => {
            if !listings.is_array() {
                return Err(SchemaRejection::NotAnArray("listings"));
            }
            Ok(StoredShape::Current)
        }
        (None, Some(offers)) => {
            // Versioned blobs never used the old key.
            if let Some(v) = version {
                return Err(SchemaRejection::UnsupportedVersion(format!(
                    "{} with 'offers'",
                    v
                )));
            }
            if !offers.is_array() {
                return Err(SchemaRejection::NotAnArray("offers"));
            }
            Ok(StoredShape::Legacy)
        }
    }
}

pub fn decode_value(value: Value) -> Result<(StoredShape, ListingsState), SchemaRejection> {
    let shape = detect_shape(&value)?;
    let malformed = |e: serde_json::Error| SchemaRejection::Malformed {
        shape,
        message: e.to_string(),
    };

    let state = match shape {
        StoredShape::Legacy => {
            let blob: LegacyBlob = serde_json::from_value(value).map_err(malformed)?;
            ListingsState {
                listings: blob.offers,
                known_traits: blob.traits,
            }
        }
        StoredShape::Current => {
            let blob: CurrentBlob = serde_json::from_value(value).map_err(malformed)?;
            ListingsState {
                listings: blob.listings,
                known_traits: blob.known_traits,
            }
        }
    };

    Ok((shape, state))
}

pub fn decode_state(text: &str) -> Result<(StoredShape, ListingsState), SchemaRejection> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| SchemaRejection::InvalidJson(e.to_string()))?;
    decode_value(value)
}

/// Always writes the current shape.
pub fn encode_state(state: &ListingsState, pretty: bool) -> serde_json::Result<String> {
    let blob = CurrentBlobRef {
        schema_version: CURRENT_SCHEMA_VERSION,
        listings: &state.listings,
        known_traits: &state.known_traits,
    };
    if pretty {
        serde_json::to_string_pretty(&blob)
    } else {
        serde_json::to_string(&blob)
    }
}
