use indexmap::IndexMap;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tri-state answer for a named trait on a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TraitValue {
    Yes,
    No,
    #[default]
    Unknown,
}

// Older data encodes "unknown" as JSON null.
impl<'de> Deserialize<'de> for TraitValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref() {
            None | Some("UNKNOWN") => Ok(TraitValue::Unknown),
            Some("YES") => Ok(TraitValue::Yes),
            Some("NO") => Ok(TraitValue::No),
            Some(other) => Err(de::Error::unknown_variant(other, &["YES", "NO", "UNKNOWN"])),
        }
    }
}

impl TraitValue {
    pub fn is_known(self) -> bool {
        self != TraitValue::Unknown
    }
}

impl fmt::Display for TraitValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TraitValue::Yes => "YES",
            TraitValue::No => "NO",
            TraitValue::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

impl FromStr for TraitValue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yes" | "y" | "true" => Ok(TraitValue::Yes),
            "no" | "n" | "false" => Ok(TraitValue::No),
            "unknown" | "?" | "" => Ok(TraitValue::Unknown),
            other => Err(format!("expected yes, no or unknown, got '{}'", other)),
        }
    }
}

/// Trait values keyed by name, in the order the names were entered.
pub type TraitMap = IndexMap<String, TraitValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traits: Option<TraitMap>,
}

impl Listing {
    /// The listing's own value for `name`; absent traits read as `None`.
    pub fn trait_value(&self, name: &str) -> Option<TraitValue> {
        self.traits.as_ref().and_then(|t| t.get(name).copied())
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// A listing as entered by the user, before an id is assigned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewListing {
    pub title: String,
    pub url: String,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub traits: Option<TraitMap>,
}

impl NewListing {
    pub fn into_listing(self, id: String) -> Listing {
        Listing {
            id,
            title: self.title,
            url: self.url,
            tags: self.tags,
            image_url: self.image_url,
            traits: self.traits,
        }
    }

    /// Copies whatever `metadata` found over the draft; fields the page
    /// did not provide keep their current value.
    pub fn apply_metadata(&mut self, metadata: &Metadata) {
        if let Some(title) = &metadata.title {
            self.title = title.clone();
        }
        if let Some(image_url) = &metadata.image_url {
            self.image_url = Some(image_url.clone());
        }
    }
}

/// Fields changed by an edit. `None` leaves the field as it is; `traits`
/// entries are merged into the listing's existing map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingUpdate {
    pub title: Option<String>,
    pub url: Option<String>,
    pub tags: Option<Vec<String>>,
    pub image_url: Option<String>,
    pub traits: TraitMap,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingsState {
    pub listings: Vec<Listing>,
    #[serde(default)]
    pub known_traits: Vec<String>,
}

/// Best-effort page metadata used to prefill a new listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Metadata {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.image_url.is_none()
    }
}
