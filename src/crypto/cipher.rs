//! AES-256-GCM authenticated encryption with detached tags.

use crate::error::{Error, Result};
use aes_gcm::aead::AeadInPlace;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce, Tag};
use rand::RngCore;

/// Nonce size for AES-GCM (96 bits).
pub const NONCE_SIZE: usize = 12;

/// Authentication tag size (128 bits).
pub const TAG_SIZE: usize = 16;

/// Output of [`Cipher::seal`].
#[derive(Debug, Clone)]
pub struct Sealed {
    pub nonce: [u8; NONCE_SIZE],
    pub tag: [u8; TAG_SIZE],
    pub ciphertext: Vec<u8>,
}

/// AES-256-GCM cipher wrapper.
pub struct Cipher {
    cipher: Aes256Gcm,
}

impl Cipher {
    /// Create a new cipher from a derived key.
    pub fn new(key: &[u8; 32]) -> Result<Self> {
        let cipher =
            Aes256Gcm::new_from_slice(key).map_err(|e| Error::Encryption(e.to_string()))?;
        Ok(Self { cipher })
    }

    /// Encrypt with a fresh random nonce, binding `aad` into the tag.
    pub fn seal(&self, plaintext: &[u8], aad: &[u8]) -> Result<Sealed> {
        let mut nonce = [0u8; NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut nonce);

        let mut ciphertext = plaintext.to_vec();
        let tag = self
            .cipher
            .encrypt_in_place_detached(Nonce::from_slice(&nonce), aad, &mut ciphertext)
            .map_err(|e| Error::Encryption(e.to_string()))?;

        let mut tag_bytes = [0u8; TAG_SIZE];
        tag_bytes.copy_from_slice(&tag);

        Ok(Sealed {
            nonce,
            tag: tag_bytes,
            ciphertext,
        })
    }

    /// Decrypt and verify. Any mismatch of key, nonce, tag, aad or
    /// ciphertext yields [`Error::AuthenticationFailed`].
    pub fn open(
        &self,
        nonce: &[u8; NONCE_SIZE],
        tag: &[u8; TAG_SIZE],
        ciphertext: &[u8],
        aad: &[u8],
    ) -> Result<Vec<u8>> {
        let mut plaintext = ciphertext.to_vec();
        self.cipher
            .decrypt_in_place_detached(
                Nonce::from_slice(nonce),
                aad,
                &mut plaintext,
                Tag::from_slice(tag),
            )
            .map_err(|_| Error::AuthenticationFailed)?;
        Ok(plaintext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; 32] = [7u8; 32];

    #[test]
    fn test_seal_open_roundtrip() {
        let cipher = Cipher::new(&KEY).unwrap();
        let plaintext = b"Hello, World! This is a secret message.";

        let sealed = cipher.seal(plaintext, b"aad").unwrap();
        let opened = cipher
            .open(&sealed.nonce, &sealed.tag, &sealed.ciphertext, b"aad")
            .unwrap();

        assert_eq!(opened, plaintext);
        assert_eq!(sealed.ciphertext.len(), plaintext.len());
    }

    #[test]
    fn test_wrong_key_fails() {
        let sealed = Cipher::new(&KEY).unwrap().seal(b"Secret", b"").unwrap();
        let other = Cipher::new(&[8u8; 32]).unwrap();

        let result = other.open(&sealed.nonce, &sealed.tag, &sealed.ciphertext, b"");
        assert!(matches!(result, Err(Error::AuthenticationFailed)));
    }

    #[test]
    fn test_wrong_aad_fails() {
        let cipher = Cipher::new(&KEY).unwrap();
        let sealed = cipher.seal(b"Secret", b"salt-a").unwrap();

        let result = cipher.open(&sealed.nonce, &sealed.tag, &sealed.ciphertext, b"salt-b");
        assert!(matches!(result, Err(Error::AuthenticationFailed)));
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let cipher = Cipher::new(&KEY).unwrap();
        let mut sealed = cipher.seal(b"Secret data", b"").unwrap();
        sealed.ciphertext[0] ^= 0x01;

        let result = cipher.open(&sealed.nonce, &sealed.tag, &sealed.ciphertext, b"");
        assert!(matches!(result, Err(Error::AuthenticationFailed)));
    }

    #[test]
    fn test_fresh_nonce_per_seal() {
        let cipher = Cipher::new(&KEY).unwrap();
        let a = cipher.seal(b"Same message", b"").unwrap();
        let b = cipher.seal(b"Same message", b"").unwrap();

        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn test_empty_plaintext() {
        let cipher = Cipher::new(&KEY).unwrap();
        let sealed = cipher.seal(b"", b"").unwrap();
        let opened = cipher
            .open(&sealed.nonce, &sealed.tag, &sealed.ciphertext, b"")
            .unwrap();
        assert!(opened.is_empty());
    }
}
