//! Framed blob layout.
//!
//! ```text
//! [4 bytes ] magic "STG1"
//! [1 byte  ] format version
//! [16 bytes] PBKDF2 salt
//! [12 bytes] AES-GCM nonce
//! [16 bytes] AES-GCM tag
//! [4 bytes ] ciphertext length (big-endian u32)
//! [N bytes ] ciphertext of (compressed record || SHA-256 of record)
//! ```
//!
//! The first 53 bytes form the prefix, which lives in the key-independent
//! header region of the carrier.

use crate::config::{kdf_params, FORMAT_MAGIC, FORMAT_VERSION};
use crate::crypto::{NONCE_SIZE, TAG_SIZE};
use crate::error::{Error, Result};

/// Length of the fixed prefix.
pub const PREFIX_LEN: usize = 4 + 1 + kdf_params::SALT_LENGTH + NONCE_SIZE + TAG_SIZE + 4;

/// SHA-256 digest length.
pub const DIGEST_LEN: usize = 32;

/// Floor for the ciphertext of any real frame: the compression marker and
/// the digest. DEFLATE can shrink a small record below its serialized size,
/// so the record itself contributes no fixed minimum.
pub const MIN_CIPHERTEXT_LEN: usize = 1 + DIGEST_LEN;

/// Fixed-size part of a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramePrefix {
    pub version: u8,
    pub salt: [u8; kdf_params::SALT_LENGTH],
    pub nonce: [u8; NONCE_SIZE],
    pub tag: [u8; TAG_SIZE],
    pub ciphertext_len: u32,
}

impl FramePrefix {
    /// Serialize to the wire layout.
    pub fn to_bytes(&self) -> [u8; PREFIX_LEN] {
        let mut out = [0u8; PREFIX_LEN];
        let mut pos = 0;
        for part in [
            &FORMAT_MAGIC[..],
            &[self.version][..],
            &self.salt[..],
            &self.nonce[..],
            &self.tag[..],
            &self.ciphertext_len.to_be_bytes()[..],
        ] {
            out[pos..pos + part.len()].copy_from_slice(part);
            pos += part.len();
        }
        out
    }

    /// Parse and sanity-check a prefix.
    ///
    /// Any mismatch means the bytes were never written by the embedder, so
    /// every failure maps to [`Error::NoHiddenData`].
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < PREFIX_LEN {
            return Err(Error::NoHiddenData);
        }
        let (magic, rest) = data.split_at(4);
        if magic != FORMAT_MAGIC {
            return Err(Error::NoHiddenData);
        }
        let (version, rest) = rest.split_at(1);
        if version[0] != FORMAT_VERSION {
            return Err(Error::NoHiddenData);
        }
        let (salt, rest) = rest.split_at(kdf_params::SALT_LENGTH);
        let (nonce, rest) = rest.split_at(NONCE_SIZE);
        let (tag, rest) = rest.split_at(TAG_SIZE);
        let mut len = [0u8; 4];
        len.copy_from_slice(&rest[..4]);

        let prefix = Self {
            version: version[0],
            salt: salt.try_into().map_err(|_| Error::NoHiddenData)?,
            nonce: nonce.try_into().map_err(|_| Error::NoHiddenData)?,
            tag: tag.try_into().map_err(|_| Error::NoHiddenData)?,
            ciphertext_len: u32::from_be_bytes(len),
        };
        if (prefix.ciphertext_len as usize) < MIN_CIPHERTEXT_LEN {
            return Err(Error::NoHiddenData);
        }
        Ok(prefix)
    }
}

/// A complete frame: prefix plus ciphertext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramedBlob {
    pub prefix: FramePrefix,
    pub ciphertext: Vec<u8>,
}

impl FramedBlob {
    /// Total serialized length in bytes.
    pub fn len(&self) -> usize {
        PREFIX_LEN + self.ciphertext.len()
    }

    /// Always false: a frame carries at least its prefix.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Serialize to bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len());
        out.extend_from_slice(&self.prefix.to_bytes());
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Deserialize from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let prefix = FramePrefix::parse(data)?;
        let body = &data[PREFIX_LEN..];
        if body.len() != prefix.ciphertext_len as usize {
            return Err(Error::NoHiddenData);
        }
        Ok(Self {
            prefix,
            ciphertext: body.to_vec(),
        })
    }
}
