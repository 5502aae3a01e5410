//! Field extraction: deciding which parts of an item are searchable.
//!
//! The index itself is agnostic about item shape. A [`TextExtractor`] turns
//! a [`SearchableItem`] into a single string that the indexer normalizes and
//! stores. Any `Fn(&SearchableItem) -> String` closure is an extractor, so
//! callers can supply a one-off policy without declaring a type.
//!
//! [`DefaultExtractor`] concatenates `name`, `description`, `sku`, `source`,
//! `vendor`, and `notes`, in that order, skipping absent or blank fields.

use crate::models::SearchableItem;
use crate::normalize::{combine_fields_with, NormalizeOptions};

/// Produces the searchable text for an item.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, item: &SearchableItem) -> String;
}

impl<F> TextExtractor for F
where
    F: Fn(&SearchableItem) -> String + Send + Sync,
{
    fn extract(&self, item: &SearchableItem) -> String {
        self(item)
    }
}

/// The built-in field policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultExtractor {
    opts: NormalizeOptions,
}

impl DefaultExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Strip punctuation from every field before joining.
    pub fn strip_punctuation(mut self, strip: bool) -> Self {
        self.opts.strip_punctuation = strip;
        self
    }
}

impl TextExtractor for DefaultExtractor {
    fn extract(&self, item: &SearchableItem) -> String {
        let fields = [
            item.name.as_deref(),
            item.description.as_deref(),
            item.sku.as_deref(),
            item.source.as_deref(),
            item.vendor.as_deref(),
            item.notes.as_deref(),
        ];
        combine_fields_with(fields, self.opts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_field_order() {
        let item = SearchableItem::new("a", "p1", "i1")
            .notes("Scratched leg")
            .vendor("Acme")
            .source("Estate Sale")
            .sku("OT-9")
            .description("  ")
            .name("Oak Table");

        assert_eq!(
            DefaultExtractor::new().extract(&item),
            "oak table ot-9 estate sale acme scratched leg"
        );
    }

    #[test]
    fn test_default_ignores_open_fields() {
        let item = SearchableItem::new("a", "p1", "i1")
            .name("Lamp")
            .field("room", "Kitchen");
        assert_eq!(DefaultExtractor::new().extract(&item), "lamp");
    }

    #[test]
    fn test_strip_punctuation() {
        let item = SearchableItem::new("a", "p1", "i1").sku("BFL-001");
        let ex = DefaultExtractor::new().strip_punctuation(true);
        assert_eq!(ex.extract(&item), "bfl 001");
    }

    #[test]
    fn test_closure_extractor() {
        let room = |item: &SearchableItem| item.fields.get("room").cloned().unwrap_or_default();
        let item = SearchableItem::new("a", "p1", "i1").field("room", "Kitchen");
        assert_eq!(room.extract(&item), "Kitchen");
    }
}
