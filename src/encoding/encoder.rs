//! Repetition encoder: every bit is emitted `REDUNDANCY` times in a row.

use crate::config::REDUNDANCY;

/// Expand bytes into bits, most significant bit first.
pub fn bits_from_bytes(data: &[u8]) -> impl Iterator<Item = u8> + '_ {
    data.iter()
        .flat_map(|&byte| (0..8).rev().map(move |shift| (byte >> shift) & 1))
}

/// Encode data into a repeated bitstream.
///
/// Each bit of `data` (MSB first) appears `REDUNDANCY` consecutive times,
/// so the output holds `data.len() * 8 * REDUNDANCY` entries of 0 or 1.
///
/// # Example
///
/// ```
/// use adaptive_stego::encoding::encode;
///
/// let bits = encode(&[0b1000_0000]);
/// assert_eq!(&bits[..6], &[1, 1, 1, 0, 0, 0]);
/// ```
pub fn encode(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(encoded_len(data.len()));
    out.extend(repeated_bits(data));
    out
}

/// Lazy form of [`encode`], for writers that stream straight into pixels.
pub fn repeated_bits(data: &[u8]) -> impl Iterator<Item = u8> + '_ {
    bits_from_bytes(data).flat_map(|bit| std::iter::repeat(bit).take(REDUNDANCY))
}

/// Number of bit copies needed to carry `byte_len` bytes.
pub fn encoded_len(byte_len: usize) -> usize {
    byte_len * 8 * REDUNDANCY
}
