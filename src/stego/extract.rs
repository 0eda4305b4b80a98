//! Extraction: header first, then the keyed payload region.

use crate::carrier::{BitOrdering, EmbeddingPlan, PixelGrid, HEADER_CHANNELS};
use crate::encoding::{decode, MajorityDecoder, VoteStats};
use crate::error::{Error, Result};
use crate::payload::FramePrefix;

/// Read and vote the header region, then sanity-check the prefix.
///
/// Works without a key. A clean image almost never passes the magic check
/// and yields [`Error::NoHiddenData`].
pub fn read_prefix(grid: &PixelGrid) -> Result<(FramePrefix, VoteStats)> {
    if grid.color_channel_count() < HEADER_CHANNELS {
        return Err(Error::NoHiddenData);
    }
    let raw: Vec<u8> = (0..HEADER_CHANNELS).map(|i| grid.read_bit(i, 0)).collect();
    let (bytes, stats) = decode(&raw)?;
    let prefix = FramePrefix::parse(&bytes)?;
    Ok((prefix, stats))
}

/// Read the ciphertext announced by `prefix`.
///
/// Copies are voted as they are read; no per-slot buffer is built. A length the payload region could never have held means
/// the header was not ours, which is reported as [`Error::NoHiddenData`].
pub fn read_ciphertext(
    grid: &PixelGrid,
    plan: &EmbeddingPlan,
    prefix: &FramePrefix,
    seed: &[u8; 32],
) -> Result<(Vec<u8>, VoteStats)> {
    let len = prefix.ciphertext_len as usize;
    if len > plan.payload_capacity_bytes() {
        return Err(Error::NoHiddenData);
    }

    let ordering = BitOrdering::new(plan, seed);
    let mut decoder = MajorityDecoder::with_capacity(len);
    for slots in ordering.copies(plan).take(len * 8) {
        decoder.push(&slots.map(|slot| grid.read_bit(slot.channel, slot.bit)));
    }
    if decoder.len() != len {
        return Err(Error::NoHiddenData);
    }
    decoder.finish()
}
