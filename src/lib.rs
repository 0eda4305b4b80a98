//! Adaptive Image Steganography
//!
//! Hides an encrypted payload in the low bits of a raster image, spending
//! more bits on textured regions and leaving smooth regions untouched, and
//! scores arbitrary images for signs of hidden data.
//!
//! # Features
//!
//! - **Edge-aware capacity**: 0, 1 or 2 bits per channel from local texture
//! - **AES-256-GCM Encryption**: Authenticated encryption with PBKDF2 key stretching
//! - **Keyed bit ordering**: Payload bits scattered by a ChaCha20 permutation
//! - **Majority-vote redundancy**: Every bit stored three times
//! - **Steganalysis**: Key-less LSB statistics combined into a score
//!
//! # Architecture
//!
//! ```text
//! Secret → Frame (DEFLATE, SHA-256, AES-256-GCM) → Plan → Embed (3× copies) → Stego image
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use adaptive_stego::carrier::io;
//! use adaptive_stego::payload::Secret;
//! use adaptive_stego::Stego;
//! use std::path::Path;
//!
//! let stego = Stego::default();
//! let cover = io::load(Path::new("cover.png")).unwrap();
//!
//! let embedded = stego.embed(&cover, &Secret::text("Hidden data"), "password").unwrap();
//! io::save(&embedded.image, Path::new("stego.png")).unwrap();
//!
//! let extracted = stego.extract(&embedded.image, "password").unwrap();
//! assert_eq!(extracted.data, b"Hidden data");
//! ```

pub mod carrier;
pub mod config;
pub mod crypto;
pub mod encoding;
pub mod error;
pub mod payload;
pub mod steganalysis;
pub mod stego;

pub use carrier::PixelGrid;
pub use config::StegoConfig;
pub use error::{Error, Result};
pub use payload::Secret;
pub use steganalysis::{Detection, Verdict};
pub use stego::{CapacityReport, Embedded, Extracted, Stego};
