//! Binary memory regions consumed by the accelerator firmware.
//!
//! A core that receives values over the packet network needs two tables:
//! the **filter region**, listing the discretized fixed-point filters it
//! runs, and the **filter routing region**, mapping packet key/mask
//! patterns to entries of that table. Spiking receivers additionally use a
//! [`SynapseRowRegion`] to find weight-matrix rows. Regions are gathered
//! into a [`RegionImage`] for loading.
//!
//! All regions are sequences of little-endian 32-bit words.

#![warn(missing_docs)]

pub mod error;
pub mod filter_region;
pub mod filters;
pub mod image;
pub mod reception;
pub mod routing_region;
pub mod synapse_region;

pub use error::{FilterError, RegionError};
pub use filter_region::{
    encode_filter_regions, make_filter_regions, EncodedFilterRegions, FilterRegion,
    FilterRegionOptions, E_INVALID_FILTER, E_NOT_STRICTLY_PROPER,
};
pub use filters::{Filter, FilterKind};
pub use image::RegionImage;
pub use reception::{ReceptionParams, ReceptionSpec, Signal};
pub use routing_region::FilterRoutingRegion;
pub use synapse_region::{SynapseIndex, SynapseRowRegion};

use std::io::Write;

/// Size of one region word in bytes.
pub const WORD_BYTES: usize = 4;

/// A block of memory laid out for the firmware.
pub trait Region {
    /// Size of the encoded region in bytes.
    fn size_bytes(&self) -> usize;

    /// Encodes the region.
    fn encode(&self) -> Result<Vec<u8>, RegionError>;

    /// Encodes the region and writes it to `out`.
    fn write_to(&self, out: &mut dyn Write) -> Result<(), RegionError> {
        out.write_all(&self.encode()?)?;
        Ok(())
    }
}

/// Converts a count to a region word.
pub(crate) fn count_word(what: &'static str, value: usize) -> Result<u32, RegionError> {
    u32::try_from(value).map_err(|_| RegionError::Overflow { what, value })
}

/// Serializes words little-endian.
pub(crate) fn words_to_bytes(words: &[u32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(words.len() * WORD_BYTES);
    for word in words {
        bytes.extend_from_slice(&word.to_le_bytes());
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_are_little_endian() {
        assert_eq!(
            words_to_bytes(&[1, 0xdead_beef]),
            vec![1, 0, 0, 0, 0xef, 0xbe, 0xad, 0xde]
        );
    }

    #[test]
    fn count_overflow() {
        assert_eq!(count_word("count", 7).unwrap(), 7);
        #[cfg(target_pointer_width = "64")]
        assert!(matches!(
            count_word("count", u32::MAX as usize + 1),
            Err(RegionError::Overflow { what: "count", .. })
        ));
    }

    #[test]
    fn write_to_matches_encode() {
        struct Fixed;
        impl Region for Fixed {
            fn size_bytes(&self) -> usize {
                4
            }
            fn encode(&self) -> Result<Vec<u8>, RegionError> {
                Ok(words_to_bytes(&[42]))
            }
        }
        let mut out = Vec::new();
        Fixed.write_to(&mut out).unwrap();
        assert_eq!(out, Fixed.encode().unwrap());
        assert_eq!(out.len(), Fixed.size_bytes());
    }
}
