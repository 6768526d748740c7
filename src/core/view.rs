use crate::domain::model::{Listing, ListingUpdate, ListingsState, NewListing, TraitMap, TraitValue};
use std::collections::HashSet;
use uuid::Uuid;

impl ListingsState {
    /// Appends `new_listing` under a fresh id and registers its trait names.
    pub fn add_listing(&mut self, new_listing: NewListing) -> Listing {
        let id = self.fresh_id();
        let listing = new_listing.into_listing(id);

        if let Some(traits) = &listing.traits {
            self.merge_known_traits(traits.keys());
        }
        self.listings.push(listing.clone());
        tracing::debug!("Added listing {} ({})", listing.id, listing.title);
        listing
    }

    /// Removes the listing with `id`. Returns whether anything was removed.
    pub fn delete_listing(&mut self, id: &str) -> bool {
        let before = self.listings.len();
        self.listings.retain(|listing| listing.id != id);
        before != self.listings.len()
    }

    pub fn find_listing(&self, id: &str) -> Option<&Listing> {
        self.listings.iter().find(|listing| listing.id == id)
    }

    /// Applies `update` in place. `false` when no listing has `id`.
    pub fn update_listing(&mut self, id: &str, update: ListingUpdate) -> bool {
        let Some(listing) = self.listings.iter_mut().find(|listing| listing.id == id) else {
            return false;
        };

        if let Some(title) = update.title {
            listing.title = title;
        }
        if let Some(url) = update.url {
            listing.url = url;
        }
        if let Some(tags) = update.tags {
            listing.tags = tags;
        }
        if let Some(image_url) = update.image_url {
            listing.image_url = Some(image_url);
        }

        let new_names: Vec<String> = update.traits.keys().cloned().collect();
        if !update.traits.is_empty() {
            listing
                .traits
                .get_or_insert_with(TraitMap::new)
                .extend(update.traits);
        }
        self.merge_known_traits(new_names.iter());
        true
    }

    /// Explicit "add trait" action. Returns `false` for blank or known names.
    pub fn add_known_trait(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.known_traits.iter().any(|t| t == name) {
            return false;
        }
        self.known_traits.push(name.to_string());
        true
    }

    /// Append-only merge keeping first-seen order.
    pub fn merge_known_traits<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            let name = name.as_ref();
            if !self.known_traits.iter().any(|t| t == name) {
                self.known_traits.push(name.to_string());
            }
        }
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if self.find_listing(&id).is_none() {
                return id;
            }
        }
    }
}

/// Listings carrying every tag in `required` (all listings when empty).
pub fn filter_by_tags<'a, T: AsRef<str>>(listings: &'a [Listing], required: &[T]) -> Vec<&'a Listing> {
    listings
        .iter()
        .filter(|listing| matches_tags(listing, required))
        .collect()
}

/// Listings whose own value equals every YES/NO filter. UNKNOWN filters are ignored.
pub fn filter_by_traits<'a>(listings: &'a [Listing], filters: &TraitMap) -> Vec<&'a Listing> {
    listings
        .iter()
        .filter(|listing| matches_traits(listing, filters))
        .collect()
}

fn matches_tags<T: AsRef<str>>(listing: &Listing, required: &[T]) -> bool {
    required.iter().all(|tag| listing.has_tag(tag.as_ref()))
}

fn matches_traits(listing: &Listing, filters: &TraitMap) -> bool {
    filters
        .iter()
        .filter(|(_, wanted)| wanted.is_known())
        .all(|(name, wanted)| listing.trait_value(name) == Some(*wanted))
}

/// Every tag in use, de-duplicated, in first-seen order.
pub fn collect_all_tags(listings: &[Listing]) -> Vec<String> {
    let mut seen = HashSet::new();
    listings
        .iter()
        .flat_map(|listing| listing.tags.iter())
        .filter(|tag| seen.insert(tag.as_str()))
        .cloned()
        .collect()
}

/// Clicking the active value clears it; clicking another value selects it.
pub fn toggle_trait(current: TraitValue, clicked: TraitValue) -> TraitValue {
    if current == clicked {
        TraitValue::Unknown
    } else {
        clicked
    }
}

/// Adds `tag` to the selection, or removes it if it is already selected.
pub fn toggle_tag(selected: &mut Vec<String>, tag: &str) {
    if let Some(pos) = selected.iter().position(|t| t == tag) {
        selected.remove(pos);
    } else {
        selected.push(tag.to_string());
    }
}

/// Tag and trait filters applied together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingFilter {
    pub tags: Vec<String>,
    pub traits: TraitMap,
}

impl ListingFilter {
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && !self.traits.values().any(|v| v.is_known())
    }

    pub fn matches(&self, listing: &Listing) -> bool {
        matches_tags(listing, &self.tags) && matches_traits(listing, &self.traits)
    }

    pub fn apply<'a>(&self, listings: &'a [Listing]) -> Vec<&'a Listing> {
        listings.iter().filter(|listing| self.matches(listing)).collect()
    }
}
