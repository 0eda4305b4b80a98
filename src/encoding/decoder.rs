//! Majority-vote decoder for the repetition code.
//!
//! Exactly `REDUNDANCY` observations make one logical bit. A triple where all
//! copies flipped to the same wrong value decodes silently wrong here; the
//! authenticated frame above catches it.

use crate::config::REDUNDANCY;
use crate::error::{Error, Result};
use serde::Serialize;

/// Statistics collected while voting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VoteStats {
    /// Logical bits decoded.
    pub bits: usize,
    /// Bits whose copies all agreed.
    pub unanimous: usize,
    /// Bits where a minority copy was outvoted.
    pub corrected: usize,
}

impl VoteStats {
    /// Share of bits that needed a vote to settle, in percent.
    pub fn corrected_percent(&self) -> f32 {
        if self.bits == 0 {
            return 0.0;
        }
        self.corrected as f32 / self.bits as f32 * 100.0
    }
}

/// Decide a single bit from its copies.
pub fn majority(copies: &[u8]) -> u8 {
    let ones = copies.iter().filter(|&&b| b & 1 == 1).count();
    u8::from(ones * 2 > copies.len())
}

/// Streaming decoder: takes the copies of one logical bit at a time, so
/// callers can read copies straight from pixels without buffering them.
#[derive(Debug, Default)]
pub struct MajorityDecoder {
    out: Vec<u8>,
    byte: u8,
    filled: u8,
    stats: VoteStats,
}

impl MajorityDecoder {
    /// Decoder expecting about `byte_len` bytes.
    pub fn with_capacity(byte_len: usize) -> Self {
        Self {
            out: Vec::with_capacity(byte_len),
            ..Self::default()
        }
    }

    /// Vote one logical bit from its copies.
    pub fn push(&mut self, copies: &[u8]) {
        let bit = majority(copies);
        if copies.iter().all(|&c| c & 1 == bit) {
            self.stats.unanimous += 1;
        } else {
            self.stats.corrected += 1;
        }
        self.stats.bits += 1;

        self.byte = (self.byte << 1) | bit;
        self.filled += 1;
        if self.filled == 8 {
            self.out.push(self.byte);
            self.byte = 0;
            self.filled = 0;
        }
    }

    /// Bytes completed so far.
    pub fn len(&self) -> usize {
        self.out.len()
    }

    pub fn is_empty(&self) -> bool {
        self.out.is_empty() && self.filled == 0
    }

    /// Return the decoded bytes. Fails when a byte is left half-filled.
    pub fn finish(self) -> Result<(Vec<u8>, VoteStats)> {
        if self.filled != 0 {
            return Err(Error::Serialization(format!(
                "{} trailing bits do not make a byte",
                self.filled
            )));
        }
        Ok((self.out, self.stats))
    }
}

/// Decode a repeated bitstream back into bytes.
///
/// `raw_bits` must hold a whole number of bytes' worth of triples.
///
/// # Example
///
/// ```
/// use adaptive_stego::encoding::{decode, encode};
///
/// let mut bits = encode(b"Hi");
/// bits[0] ^= 1; // one damaged copy
/// let (data, stats) = decode(&bits).unwrap();
/// assert_eq!(data, b"Hi");
/// assert_eq!(stats.corrected, 1);
/// ```
pub fn decode(raw_bits: &[u8]) -> Result<(Vec<u8>, VoteStats)> {
    let group = 8 * REDUNDANCY;
    if raw_bits.len() % group != 0 {
        return Err(Error::Serialization(format!(
            "bitstream of {} copies is not a whole number of bytes",
            raw_bits.len()
        )));
    }

    let mut decoder = MajorityDecoder::with_capacity(raw_bits.len() / group);
    for copies in raw_bits.chunks(REDUNDANCY) {
        decoder.push(copies);
    }
    decoder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::encode;

    #[test]
    fn test_decode_clean() {
        let data = b"Hello, World!";
        let (decoded, stats) = decode(&encode(data)).unwrap();

        assert_eq!(decoded, data);
        assert_eq!(stats.bits, data.len() * 8);
        assert_eq!(stats.corrected, 0);
    }

    #[test]
    fn test_single_copy_per_bit_repaired() {
        let data: Vec<u8> = (0..64).collect();
        let mut bits = encode(&data);
        // Damage one copy of every logical bit, rotating which one.
        for (i, chunk) in bits.chunks_mut(REDUNDANCY).enumerate() {
            chunk[i % REDUNDANCY] ^= 1;
        }

        let (decoded, stats) = decode(&bits).unwrap();
        assert_eq!(decoded, data);
        assert_eq!(stats.corrected, data.len() * 8);
        assert_eq!(stats.corrected_percent(), 100.0);
    }

    #[test]
    fn test_two_copies_flip_the_bit() {
        let mut bits = encode(&[0x00]);
        bits[0] = 1;
        bits[1] = 1;

        let (decoded, _) = decode(&bits).unwrap();
        assert_eq!(decoded, vec![0x80]);
    }

    #[test]
    fn test_ragged_input_rejected() {
        let bits = vec![0u8; 8 * REDUNDANCY + 1];
        assert!(decode(&bits).is_err());
    }

    #[test]
    fn test_streaming_matches_batch() {
        let data = b"streamed votes";
        let mut bits = encode(data);
        bits[7] ^= 1;
        bits[40] ^= 1;

        let mut decoder = MajorityDecoder::with_capacity(data.len());
        for copies in bits.chunks(REDUNDANCY) {
            decoder.push(copies);
        }
        assert_eq!(decoder.len(), data.len());
        assert_eq!(decoder.finish().unwrap(), decode(&bits).unwrap());
    }

    #[test]
    fn test_streaming_partial_byte_rejected() {
        let mut decoder = MajorityDecoder::default();
        assert!(decoder.is_empty());
        for _ in 0..5 {
            decoder.push(&[1, 1, 0]);
        }
        assert!(!decoder.is_empty());
        assert!(decoder.finish().is_err());
    }

    #[test]
    fn test_majority() {
        assert_eq!(majority(&[1, 1, 0]), 1);
        assert_eq!(majority(&[0, 1, 0]), 0);
        assert_eq!(majority(&[1, 1, 1]), 1);
    }
}
