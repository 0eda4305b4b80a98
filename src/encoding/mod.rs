//! Repetition coding with majority voting.
//!
//! Every logical bit is stored `REDUNDANCY` times; extraction recovers it by
//! majority, tolerating one damaged copy per bit.

mod decoder;
mod encoder;

pub use decoder::{decode, majority, MajorityDecoder, VoteStats};
pub use encoder::{bits_from_bytes, encode, encoded_len, repeated_bits};
