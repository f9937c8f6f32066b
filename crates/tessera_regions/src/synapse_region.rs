//! Lookup table from incoming spike keys to weight-matrix rows.

use crate::{count_word, words_to_bytes, Region, RegionError, WORD_BYTES};
use serde::{Deserialize, Serialize};
use tessera_keyspace::RoutingKey;
use tracing::debug;

/// Words per synapse index entry.
pub const SYNAPSE_ENTRY_WORDS: usize = 4;

/// One row of the synapse lookup table.
///
/// A spike matches when `spike & mask == key`; its neuron is
/// `spike & neuron_mask` and its weights start at row
/// `block_offset + neuron`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynapseIndex {
    /// Matched key bits.
    pub key: u32,
    /// Mask applied before matching.
    pub mask: u32,
    /// First weight-matrix row of this source.
    pub block_offset: u32,
    /// Mask extracting the presynaptic neuron index.
    pub neuron_mask: u32,
}

/// The synapse lookup table of one core.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynapseRowRegion {
    /// Entries in match order.
    pub entries: Vec<SynapseIndex>,
}

impl SynapseRowRegion {
    /// Builds the table from presynaptic sources and their row counts.
    ///
    /// Sources are laid out back to back in the weight matrix, so each
    /// block offset is the total row count of the sources before it.
    pub fn from_sources(
        sources: &[(RoutingKey, u32)],
        tag: &str,
        index_field: &str,
    ) -> Result<Self, RegionError> {
        let mut entries = Vec::with_capacity(sources.len());
        let mut offset: u32 = 0;
        for (key, rows) in sources {
            entries.push(SynapseIndex {
                key: key.value_for_tag(tag),
                mask: key.mask_for_tag(tag),
                block_offset: offset,
                neuron_mask: key.field_mask(index_field)?,
            });
            offset = offset.checked_add(*rows).ok_or(RegionError::Overflow {
                what: "synapse row offset",
                value: offset as usize + *rows as usize,
            })?;
        }
        debug!(sources = entries.len(), rows = offset, "built synapse row table");
        Ok(Self { entries })
    }
}

impl Region for SynapseRowRegion {
    fn size_bytes(&self) -> usize {
        WORD_BYTES * (1 + SYNAPSE_ENTRY_WORDS * self.entries.len())
    }

    fn encode(&self) -> Result<Vec<u8>, RegionError> {
        let mut words = Vec::with_capacity(1 + SYNAPSE_ENTRY_WORDS * self.entries.len());
        words.push(count_word("synapse entry count", self.entries.len())?);
        for entry in &self.entries {
            words.extend([entry.key, entry.mask, entry.block_offset, entry.neuron_mask]);
        }
        Ok(words_to_bytes(&words))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_keyspace::{KeyFormat, INDEX_FIELD, ROUTING_TAG};

    fn key(object: u32, cluster: u32) -> RoutingKey {
        RoutingKey::new(KeyFormat::standard())
            .with_field("object", object)
            .unwrap()
            .with_field("cluster", cluster)
            .unwrap()
    }

    #[test]
    fn block_offsets_accumulate() {
        let sources = vec![(key(1, 0), 100), (key(1, 1), 50), (key(2, 0), 7)];
        let region = SynapseRowRegion::from_sources(&sources, ROUTING_TAG, INDEX_FIELD).unwrap();

        let offsets: Vec<_> = region.entries.iter().map(|e| e.block_offset).collect();
        assert_eq!(offsets, vec![0, 100, 150]);
        assert_eq!(region.entries[1].key, 0x0104_0000);
        assert_eq!(region.entries[1].mask, 0xfffc_0000);
        assert_eq!(region.entries[1].neuron_mask, 0x3ff);
    }

    #[test]
    fn encoded_layout() {
        let region =
            SynapseRowRegion::from_sources(&[(key(3, 0), 10)], ROUTING_TAG, INDEX_FIELD).unwrap();
        let bytes = region.encode().unwrap();
        assert_eq!(bytes.len(), region.size_bytes());
        assert_eq!(&bytes[0..4], &1u32.to_le_bytes());
        assert_eq!(&bytes[4..8], &0x0300_0000u32.to_le_bytes());
        assert_eq!(&bytes[12..16], &0u32.to_le_bytes());
    }

    #[test]
    fn offset_overflow() {
        let sources = vec![(key(1, 0), u32::MAX), (key(2, 0), 1), (key(3, 0), 1)];
        assert!(matches!(
            SynapseRowRegion::from_sources(&sources, ROUTING_TAG, INDEX_FIELD),
            Err(RegionError::Overflow { .. })
        ));
    }
}
