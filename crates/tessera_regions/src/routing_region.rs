//! The table mapping packet keys to filter-table entries.

use crate::{count_word, words_to_bytes, Region, RegionError, WORD_BYTES};
use tessera_keyspace::RoutingKey;
use tracing::trace;

/// Words per routing entry: key, key mask, index mask, filter index.
pub const ROUTING_ENTRY_WORDS: usize = 4;

/// Routes received packets to the filter that handles them.
///
/// A packet matches an entry when `packet & key_mask == key`; the value
/// index within the filter is `packet & index_mask`.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterRoutingRegion {
    /// Keys with the filter-table index they route to, in match order.
    pub entries: Vec<(RoutingKey, usize)>,
    /// Tag selecting the key bits that are matched.
    pub filter_routing_tag: String,
    /// Field extracted as the value index.
    pub index_field: String,
}

impl FilterRoutingRegion {
    /// Creates a routing region.
    pub fn new(
        entries: Vec<(RoutingKey, usize)>,
        filter_routing_tag: impl Into<String>,
        index_field: impl Into<String>,
    ) -> Self {
        Self {
            entries,
            filter_routing_tag: filter_routing_tag.into(),
            index_field: index_field.into(),
        }
    }
}

impl Region for FilterRoutingRegion {
    fn size_bytes(&self) -> usize {
        WORD_BYTES * (1 + ROUTING_ENTRY_WORDS * self.entries.len())
    }

    fn encode(&self) -> Result<Vec<u8>, RegionError> {
        let mut words = Vec::with_capacity(1 + ROUTING_ENTRY_WORDS * self.entries.len());
        words.push(count_word("routing entry count", self.entries.len())?);
        for (key, index) in &self.entries {
            let entry = [
                key.value_for_tag(&self.filter_routing_tag),
                key.mask_for_tag(&self.filter_routing_tag),
                key.field_mask(&self.index_field)?,
                count_word("filter index", *index)?,
            ];
            trace!(key = ?key, index, "routing entry");
            words.extend(entry);
        }
        Ok(words_to_bytes(&words))
    }
}
