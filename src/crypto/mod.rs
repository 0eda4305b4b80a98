//! Cryptographic operations.
//!
//! This module provides:
//! - AES-256-GCM authenticated encryption with detached tags
//! - PBKDF2-HMAC-SHA256 key stretching with HKDF key/seed separation

mod cipher;
mod kdf;

pub use cipher::{Cipher, Sealed, NONCE_SIZE, TAG_SIZE};
pub use kdf::{KeyDerivation, KeyMaterial};
