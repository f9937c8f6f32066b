//! Concatenation of encoded regions into one loadable block.

use crate::{count_word, words_to_bytes, Region, RegionError, WORD_BYTES};
use std::io::Write;
use tessera_common::{ContentHash, ImageHasher, InternalError, TessResult};
use tracing::debug;

/// Encoded regions preceded by a pointer table.
///
/// Word 0 holds the region count, followed by one word per region with its
/// byte offset from the start of the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionImage {
    offsets: Vec<u32>,
    bytes: Vec<u8>,
    hash: ContentHash,
}

impl RegionImage {
    /// Encodes `regions` in order and lays them out behind the pointer table.
    pub fn build(regions: &[&dyn Region]) -> Result<Self, RegionError> {
        let header_bytes = WORD_BYTES * (1 + regions.len());
        let mut body = Vec::new();
        let mut offsets = Vec::with_capacity(regions.len());

        for region in regions {
            offsets.push(count_word("region offset", header_bytes + body.len())?);
            let encoded = region.encode()?;
            check_layout(encoded.len(), region.size_bytes())?;
            body.extend(encoded);
        }

        let mut table = Vec::with_capacity(1 + offsets.len());
        table.push(count_word("region count", regions.len())?);
        table.extend(&offsets);
        let hash = ImageHasher::new().words(&table).bytes(&body).finish();

        let mut bytes = words_to_bytes(&table);
        bytes.extend(body);
        debug!(
            regions = regions.len(),
            bytes = bytes.len(),
            hash = format_args!("{:08x}", hash.short()),
            "built region image"
        );
        Ok(Self {
            offsets,
            bytes,
            hash,
        })
    }

    /// Byte offset of each region.
    pub fn offsets(&self) -> &[u32] {
        &self.offsets
    }

    /// The complete image.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Fingerprint of the image bytes.
    pub fn fingerprint(&self) -> ContentHash {
        self.hash
    }

    /// Writes the image to `out`.
    pub fn write_to(&self, out: &mut dyn Write) -> Result<(), RegionError> {
        out.write_all(&self.bytes)?;
        Ok(())
    }
}

/// Checks that a region filled exactly its declared size in whole words.
fn check_layout(encoded: usize, declared: usize) -> TessResult<()> {
    if encoded != declared {
        return Err(InternalError::new(format!(
            "region encoded to {encoded} bytes but declares {declared}"
        )));
    }
    if encoded % WORD_BYTES != 0 {
        return Err(InternalError::new(format!(
            "region size {encoded} is not a whole number of words"
        )));
    }
    Ok(())
}
