//! Adaptive embedder.
//!
//! The frame prefix goes into bit 0 of the first [`HEADER_CHANNELS`]
//! pixel-channels in raster order, three copies per bit. The ciphertext
//! follows the key-derived [`BitOrdering`], each bit written into its three
//! lane-strided copy slots.

use crate::carrier::{BitOrdering, EmbeddingPlan, PixelGrid, HEADER_CHANNELS};
use crate::encoding::{bits_from_bytes, repeated_bits};
use crate::error::{Error, Result};
use crate::payload::{FramePrefix, FramedBlob};

/// Fail with [`Error::PayloadTooLarge`] unless `blob` fits the plan.
pub fn check_capacity(plan: &EmbeddingPlan, blob: &FramedBlob) -> Result<()> {
    let available = plan.usable_capacity_bytes();
    if blob.len() > available {
        return Err(Error::PayloadTooLarge {
            needed: blob.len(),
            available,
        });
    }
    Ok(())
}

/// Write the prefix into the header region.
pub fn write_header(stego: &mut PixelGrid, prefix: &FramePrefix) {
    let bytes = prefix.to_bytes();
    for (channel, bit) in repeated_bits(&bytes).enumerate() {
        stego.write_bit(channel, 0, bit);
    }
    debug_assert_eq!(bytes.len() * 8 * crate::config::REDUNDANCY, HEADER_CHANNELS);
}

/// Produce a stego image carrying `blob`.
///
/// The capacity check runs first and `cover` is only read, so a failing call
/// leaves nothing behind.
pub fn embed_blob(
    cover: &PixelGrid,
    plan: &EmbeddingPlan,
    blob: &FramedBlob,
    ordering_seed: &[u8; 32],
) -> Result<PixelGrid> {
    check_capacity(plan, blob)?;

    let mut stego = cover.clone();
    write_header(&mut stego, &blob.prefix);

    let ordering = BitOrdering::new(plan, ordering_seed);
    for (slots, bit) in ordering.copies(plan).zip(bits_from_bytes(&blob.ciphertext)) {
        for slot in slots {
            stego.write_bit(slot.channel, slot.bit, bit);
        }
    }

    Ok(stego)
}
