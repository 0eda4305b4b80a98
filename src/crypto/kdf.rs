//! PBKDF2 key stretching with HKDF domain separation.
//!
//! The passphrase and salt are stretched once with PBKDF2-HMAC-SHA256, then
//! HKDF-Expand splits the master secret into a cipher key and an ordering
//! seed under two fixed labels, so neither output reveals the other.

use crate::config::kdf_params;
use crate::error::{Error, Result};
use hkdf::Hkdf;
use rand::RngCore;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Key material for a single embed or extract call.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct KeyMaterial {
    key: [u8; kdf_params::OUTPUT_LENGTH],
    ordering_seed: [u8; kdf_params::OUTPUT_LENGTH],
    salt: [u8; kdf_params::SALT_LENGTH],
}

impl KeyMaterial {
    /// AES-256 key.
    pub fn key(&self) -> &[u8; kdf_params::OUTPUT_LENGTH] {
        &self.key
    }

    /// Seed of the pseudorandom bit ordering.
    pub fn ordering_seed(&self) -> &[u8; kdf_params::OUTPUT_LENGTH] {
        &self.ordering_seed
    }

    /// Salt the material was derived with.
    pub fn salt(&self) -> &[u8; kdf_params::SALT_LENGTH] {
        &self.salt
    }
}

/// Key derivation using PBKDF2-HMAC-SHA256.
#[derive(Debug, Clone)]
pub struct KeyDerivation {
    salt: [u8; kdf_params::SALT_LENGTH],
}

impl KeyDerivation {
    /// Create a new KDF with a random salt.
    pub fn new() -> Self {
        let mut salt = [0u8; kdf_params::SALT_LENGTH];
        rand::thread_rng().fill_bytes(&mut salt);
        Self { salt }
    }

    /// Create a KDF from an existing salt (for extraction).
    pub fn from_salt(salt: [u8; kdf_params::SALT_LENGTH]) -> Self {
        Self { salt }
    }

    /// Get the salt for storage.
    pub fn salt(&self) -> &[u8; kdf_params::SALT_LENGTH] {
        &self.salt
    }

    /// Derive the cipher key and ordering seed from a passphrase.
    pub fn derive(&self, passphrase: &str, iterations: u32) -> Result<KeyMaterial> {
        if passphrase.is_empty() {
            return Err(Error::InvalidKey("passphrase must not be empty".to_string()));
        }
        if iterations < kdf_params::MIN_ITERATIONS {
            return Err(Error::InvalidConfig(format!(
                "KDF iterations must be at least {}",
                kdf_params::MIN_ITERATIONS
            )));
        }

        let mut master = Zeroizing::new([0u8; kdf_params::OUTPUT_LENGTH]);
        pbkdf2::pbkdf2_hmac::<Sha256>(
            passphrase.as_bytes(),
            &self.salt,
            iterations,
            master.as_mut_slice(),
        );

        let hk = Hkdf::<Sha256>::from_prk(master.as_slice())
            .map_err(|e| Error::KeyDerivation(e.to_string()))?;

        let mut material = KeyMaterial {
            key: [0u8; kdf_params::OUTPUT_LENGTH],
            ordering_seed: [0u8; kdf_params::OUTPUT_LENGTH],
            salt: self.salt,
        };
        hk.expand(kdf_params::CIPHER_KEY_LABEL, &mut material.key)
            .map_err(|e| Error::KeyDerivation(e.to_string()))?;
        hk.expand(kdf_params::ORDERING_SEED_LABEL, &mut material.ordering_seed)
            .map_err(|e| Error::KeyDerivation(e.to_string()))?;

        Ok(material)
    }
}

impl Default for KeyDerivation {
    fn default() -> Self {
        Self::new()
    }
}
