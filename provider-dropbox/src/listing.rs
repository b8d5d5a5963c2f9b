//! Normalized listing entries and their display order

use crate::types::Metadata;
use icu_collator::{Collator, CollatorOptions};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::warn;

/// A file or folder as shown in a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingEntry {
    pub id: String,
    pub name: String,
    /// `path_lower`, falling back to `path_display`
    pub path: String,
    pub is_folder: bool,
}

impl From<Metadata> for ListingEntry {
    fn from(metadata: Metadata) -> Self {
        let is_folder = metadata.is_folder();
        let path = metadata
            .path_lower
            .or(metadata.path_display)
            .unwrap_or_default();
        Self {
            id: metadata.id.unwrap_or_default(),
            name: metadata.name,
            path,
            is_folder,
        }
    }
}

/// Display order of a folder listing: folders before files, then names under
/// the Unicode root collation (accents and case are secondary and tertiary
/// differences, so `Eclair`, `éclair` and `eclair` sort next to each other).
pub struct ListingOrder {
    collator: Option<Collator>,
}

impl ListingOrder {
    pub fn new() -> Self {
        let collator = match Collator::try_new(&Default::default(), CollatorOptions::new()) {
            Ok(collator) => Some(collator),
            Err(e) => {
                warn!(error = %e, "Root collation unavailable; sorting names by code point");
                None
            }
        };
        Self { collator }
    }

    pub fn compare(&self, a: &ListingEntry, b: &ListingEntry) -> Ordering {
        b.is_folder
            .cmp(&a.is_folder)
            .then_with(|| self.compare_names(&a.name, &b.name))
    }

    /// Names equal under collation fall back to code point order so the
    /// sort is total.
    fn compare_names(&self, a: &str, b: &str) -> Ordering {
        let collated = match &self.collator {
            Some(collator) => collator.compare(a, b),
            None => a.to_lowercase().cmp(&b.to_lowercase()),
        };
        collated.then_with(|| a.cmp(b))
    }
}

impl Default for ListingOrder {
    fn default() -> Self {
        Self::new()
    }
}

/// Sort a folder listing for display.
pub fn sort_listing(entries: &mut [ListingEntry]) {
    let order = ListingOrder::new();
    entries.sort_by(|a, b| order.compare(a, b));
}
