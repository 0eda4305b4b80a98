//! DEFLATE compression of the serialized record.
//!
//! The first byte is a marker: 0 = stored, 1 = deflated. Data that does not
//! shrink is stored, so the framed size never exceeds the worst case that
//! [`super::max_framed_len`] reports.

use crate::error::{Error, Result};
use flate2::read::{DeflateDecoder, DeflateEncoder};
use flate2::Compression;
use std::io::Read;

const MARKER_STORED: u8 = 0;
const MARKER_DEFLATED: u8 = 1;

/// Bytes added on top of the input in the stored case.
pub const MARKER_LEN: usize = 1;

/// Compress data, falling back to stored form when DEFLATE does not help.
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut compressed = Vec::new();
    DeflateEncoder::new(data, Compression::best())
        .read_to_end(&mut compressed)
        .map_err(|e| Error::Compression(e.to_string()))?;

    let (marker, body) = if compressed.len() < data.len() {
        (MARKER_DEFLATED, compressed.as_slice())
    } else {
        (MARKER_STORED, data)
    };

    let mut out = Vec::with_capacity(MARKER_LEN + body.len());
    out.push(marker);
    out.extend_from_slice(body);
    Ok(out)
}

/// Decompress data produced by [`compress`].
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let (&marker, body) = data
        .split_first()
        .ok_or_else(|| Error::Compression("empty input".to_string()))?;

    match marker {
        MARKER_STORED => Ok(body.to_vec()),
        MARKER_DEFLATED => {
            let mut out = Vec::new();
            DeflateDecoder::new(body)
                .read_to_end(&mut out)
                .map_err(|e| Error::Compression(e.to_string()))?;
            Ok(out)
        }
        other => Err(Error::Compression(format!("invalid marker byte: {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{RngCore, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_repetitive_data_shrinks() {
        let data = vec![b'a'; 4096];
        let packed = compress(&data).unwrap();

        assert_eq!(packed[0], MARKER_DEFLATED);
        assert!(packed.len() < data.len());
        assert_eq!(decompress(&packed).unwrap(), data);
    }

    #[test]
    fn test_random_data_stored() {
        let mut data = vec![0u8; 1000];
        ChaCha8Rng::seed_from_u64(5).fill_bytes(&mut data);

        let packed = compress(&data).unwrap();
        assert_eq!(packed[0], MARKER_STORED);
        assert_eq!(packed.len(), data.len() + MARKER_LEN);
        assert_eq!(decompress(&packed).unwrap(), data);
    }

    #[test]
    fn test_empty_input() {
        let packed = compress(&[]).unwrap();
        assert_eq!(packed, vec![MARKER_STORED]);
        assert!(decompress(&packed).unwrap().is_empty());
    }

    #[test]
    fn test_bad_marker_rejected() {
        assert!(decompress(&[7, 1, 2, 3]).is_err());
        assert!(decompress(&[]).is_err());
    }
}
