//! Payload framing: record serialization, compression, digest and
//! authenticated encryption.
//!
//! # Architecture
//!
//! ```text
//! Secret → bincode → SHA-256 ┐
//!                  → DEFLATE ┴→ AES-256-GCM (aad = salt) → FramedBlob
//! ```
//!
//! Opening checks the cipher tag first ([`Error::AuthenticationFailed`]),
//! then the digest of the decompressed record ([`Error::IntegrityMismatch`]).

mod compression;
mod frame;
mod record;

pub use compression::{compress, decompress};
pub use frame::{FramePrefix, FramedBlob, DIGEST_LEN, MIN_CIPHERTEXT_LEN, PREFIX_LEN};
pub use record::{record_len, Secret, MAX_FILENAME_LEN, TEXT_FILENAME};

use crate::config::FORMAT_VERSION;
use crate::crypto::{Cipher, KeyMaterial};
use crate::error::{Error, Result};
use sha2::{Digest, Sha256};

/// Encrypt and frame a secret under the given key material.
pub fn seal(secret: &Secret, material: &KeyMaterial) -> Result<FramedBlob> {
    let record = secret.to_bytes()?;
    let digest = Sha256::digest(&record);

    let mut plaintext = compress(&record)?;
    plaintext.extend_from_slice(&digest);

    let cipher = Cipher::new(material.key())?;
    let sealed = cipher.seal(&plaintext, material.salt())?;

    let ciphertext_len = u32::try_from(sealed.ciphertext.len()).map_err(|_| {
        Error::InvalidPayload(format!(
            "framed payload of {} bytes exceeds the 4 GiB frame limit",
            sealed.ciphertext.len()
        ))
    })?;

    Ok(FramedBlob {
        prefix: FramePrefix {
            version: FORMAT_VERSION,
            salt: *material.salt(),
            nonce: sealed.nonce,
            tag: sealed.tag,
            ciphertext_len,
        },
        ciphertext: sealed.ciphertext,
    })
}

/// Decrypt a frame and verify the record digest.
pub fn open(blob: &FramedBlob, material: &KeyMaterial) -> Result<Secret> {
    let cipher = Cipher::new(material.key())?;
    let plaintext = cipher.open(
        &blob.prefix.nonce,
        &blob.prefix.tag,
        &blob.ciphertext,
        &blob.prefix.salt,
    )?;

    if plaintext.len() < DIGEST_LEN {
        return Err(Error::IntegrityMismatch);
    }
    let (packed, stored_digest) = plaintext.split_at(plaintext.len() - DIGEST_LEN);

    let record = decompress(packed).map_err(|_| Error::IntegrityMismatch)?;
    if Sha256::digest(&record).as_slice() != stored_digest {
        return Err(Error::IntegrityMismatch);
    }

    Secret::from_bytes(&record)
}

/// Largest frame a secret of `data_len` bytes can produce.
///
/// Compression only ever shrinks the record, so this is exact for
/// incompressible data and an upper bound otherwise.
pub fn max_framed_len(data_len: usize, filename_len: Option<usize>) -> usize {
    PREFIX_LEN + 1 + record_len(data_len, filename_len) + DIGEST_LEN
}
