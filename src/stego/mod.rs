//! Embedding engine - the main interface.
//!
//! Embed runs key derivation, framing, planning, embedding and metrics.
//! Extract replans the stego image, reads the key-independent header for
//! the salt, then derives the key and reads the payload region.

pub mod embed;
pub mod extract;
pub mod metrics;

pub use metrics::{mse, psnr, EmbedMetrics};

use crate::carrier::{DepthBands, EmbeddingPlan, PixelGrid};
use crate::config::StegoConfig;
use crate::crypto::KeyDerivation;
use crate::error::{Error, Result};
use crate::payload::{self, FramedBlob, Secret, MIN_CIPHERTEXT_LEN};
use crate::steganalysis::{Detection, Detector};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Capacity of a cover image.
#[derive(Debug, Clone, Serialize)]
pub struct CapacityReport {
    pub width: u32,
    pub height: u32,
    /// Pixels per depth band.
    pub bands: DepthBands,
    /// Writable bit slots outside the header.
    pub raw_bits: usize,
    /// Largest framed blob, prefix included.
    pub capacity_bytes: usize,
    /// Longest incompressible secret (no filename) that still fits.
    pub max_secret_len: usize,
}

/// Output of a successful embed.
#[derive(Debug, Clone)]
pub struct Embedded {
    pub image: PixelGrid,
    pub metrics: EmbedMetrics,
}

/// Output of a successful extract.
#[derive(Debug, Clone, Serialize)]
pub struct Extracted {
    #[serde(skip)]
    pub data: Vec<u8>,
    pub filename: Option<String>,
    /// Both the cipher tag and the record digest matched.
    pub verified: bool,
    /// Hex SHA-256 of `data`.
    pub sha256: String,
    /// Bit copies outvoted while reading header and payload.
    pub corrected_bits: usize,
}

/// The steganography engine.
#[derive(Debug, Clone)]
pub struct Stego {
    config: StegoConfig,
    detector: Detector,
}

impl Stego {
    /// Create an engine, rejecting invalid configuration.
    pub fn new(config: StegoConfig) -> Result<Self> {
        config.validate().map_err(Error::InvalidConfig)?;
        let detector = Detector::new(config.detector, config.planner);
        Ok(Self { config, detector })
    }

    /// Plan `grid` and report what it can carry.
    pub fn capacity(&self, grid: &PixelGrid) -> Result<CapacityReport> {
        let plan = EmbeddingPlan::compute(grid, &self.config.planner)?;
        let capacity_bytes = plan.usable_capacity_bytes();

        // prefix, marker, record header and digest
        let overhead = payload::max_framed_len(0, None);
        let max_secret_len = capacity_bytes.saturating_sub(overhead);

        Ok(CapacityReport {
            width: grid.width(),
            height: grid.height(),
            bands: plan.bands(),
            raw_bits: plan.raw_capacity_bits(),
            capacity_bytes,
            max_secret_len,
        })
    }

    /// Hide `secret` in `cover` under `passphrase`.
    ///
    /// # Arguments
    ///
    /// * `cover` - Cover image; never modified
    /// * `secret` - Bytes and optional filename to hide
    /// * `passphrase` - Non-empty passphrase
    pub fn embed(&self, cover: &PixelGrid, secret: &Secret, passphrase: &str) -> Result<Embedded> {
        if passphrase.is_empty() {
            return Err(Error::InvalidKey("passphrase must not be empty".to_string()));
        }
        secret.validate()?;

        let plan = EmbeddingPlan::compute(cover, &self.config.planner)?;

        // Fresh salt per embed
        let material = KeyDerivation::new().derive(passphrase, self.config.kdf_iterations)?;
        let blob = payload::seal(secret, &material)?;

        let image = embed::embed_blob(cover, &plan, &blob, material.ordering_seed())?;
        let metrics = EmbedMetrics::between(cover, &image, plan.usable_capacity_bytes(), blob.len())?;

        Ok(Embedded { image, metrics })
    }

    /// Recover the secret hidden in `grid`.
    ///
    /// Fails with [`Error::NoHiddenData`] when the header is not ours,
    /// [`Error::AuthenticationFailed`] for a wrong passphrase or damaged
    /// ciphertext, and [`Error::IntegrityMismatch`] when the tag passes but
    /// the record digest does not.
    pub fn extract(&self, grid: &PixelGrid, passphrase: &str) -> Result<Extracted> {
        if passphrase.is_empty() {
            return Err(Error::InvalidKey("passphrase must not be empty".to_string()));
        }

        let plan = EmbeddingPlan::compute(grid, &self.config.planner)?;

        // Header carries the salt, so it is read before any key exists
        let (prefix, header_stats) = extract::read_prefix(grid)?;
        let material =
            KeyDerivation::from_salt(prefix.salt).derive(passphrase, self.config.kdf_iterations)?;

        let (ciphertext, payload_stats) =
            extract::read_ciphertext(grid, &plan, &prefix, material.ordering_seed())?;
        debug_assert!(ciphertext.len() >= MIN_CIPHERTEXT_LEN);

        let blob = FramedBlob { prefix, ciphertext };
        let secret = payload::open(&blob, &material)?;

        Ok(Extracted {
            sha256: hex::encode(Sha256::digest(&secret.data)),
            data: secret.data,
            filename: secret.filename,
            verified: true,
            corrected_bits: header_stats.corrected + payload_stats.corrected,
        })
    }

    /// Score `grid` for hidden data. Needs no key.
    pub fn detect(&self, grid: &PixelGrid) -> Detection {
        self.detector.detect(grid)
    }
}

impl Default for Stego {
    fn default() -> Self {
        Self {
            config: StegoConfig::default(),
            detector: Detector::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::kdf_params;

    fn engine() -> Stego {
        Stego::new(StegoConfig::with_iterations(kdf_params::MIN_ITERATIONS)).unwrap()
    }

    fn cover() -> PixelGrid {
        PixelGrid::from_fn(64, 64, |x, y, c| {
            ((x * 37 + y * 91 + c as u32 * 13) % 11 * 23) as u8
        })
        .unwrap()
    }

    #[test]
    fn test_embed_extract_text() {
        let stego = engine();
        let embedded = stego.embed(&cover(), &Secret::text("meet at noon"), "pw").unwrap();
        let extracted = stego.extract(&embedded.image, "pw").unwrap();

        assert_eq!(extracted.data, b"meet at noon");
        assert_eq!(extracted.filename.as_deref(), Some("secret.txt"));
        assert!(extracted.verified);
        assert_eq!(extracted.corrected_bits, 0);
        assert_eq!(
            extracted.sha256,
            hex::encode(Sha256::digest(b"meet at noon"))
        );
    }

    #[test]
    fn test_empty_secret_roundtrip() {
        let stego = engine();
        let empty = Secret::new(Vec::new(), None);
        let embedded = stego.embed(&cover(), &empty, "pw").unwrap();
        let extracted = stego.extract(&embedded.image, "pw").unwrap();

        assert!(extracted.data.is_empty());
        assert_eq!(extracted.filename, None);
        assert!(extracted.verified);
        assert_eq!(extracted.sha256, hex::encode(Sha256::digest(b"")));
    }

    #[test]
    fn test_mismatched_config_fails_cleanly() {
        let stego = engine();
        let embedded = stego.embed(&cover(), &Secret::text("x"), "pw").unwrap();

        let other_kdf =
            Stego::new(StegoConfig::with_iterations(kdf_params::MIN_ITERATIONS + 1)).unwrap();
        assert!(matches!(
            other_kdf.extract(&embedded.image, "pw"),
            Err(Error::AuthenticationFailed)
        ));

        let mut config = StegoConfig::with_iterations(kdf_params::MIN_ITERATIONS);
        config.planner.smooth_threshold = 6;
        config.planner.edge_threshold = 200;
        let other_plan = Stego::new(config).unwrap();
        assert!(matches!(
            other_plan.extract(&embedded.image, "pw"),
            Err(Error::AuthenticationFailed) | Err(Error::NoHiddenData)
        ));
    }

    #[test]
    fn test_metrics_reported() {
        let stego = engine();
        let embedded = stego.embed(&cover(), &Secret::text("x"), "pw").unwrap();
        let m = embedded.metrics;

        assert!(m.used_bytes <= m.capacity_bytes);
        assert!(m.mse > 0.0);
        assert!(m.psnr.is_finite());
    }

    #[test]
    fn test_empty_passphrase() {
        let stego = engine();
        let result = stego.embed(&cover(), &Secret::text("x"), "");
        assert!(matches!(result, Err(Error::InvalidKey(_))));
        assert!(matches!(stego.extract(&cover(), ""), Err(Error::InvalidKey(_))));
    }

    #[test]
    fn test_capacity_report_consistent() {
        let stego = engine();
        let grid = cover();
        let report = stego.capacity(&grid).unwrap();
        let plan = EmbeddingPlan::compute(&grid, &StegoConfig::default().planner).unwrap();

        assert_eq!(report.capacity_bytes, plan.usable_capacity_bytes());
        assert_eq!(
            report.bands.smooth + report.bands.textured + report.bands.edge,
            64 * 64
        );
        assert_eq!(
            payload::max_framed_len(report.max_secret_len, None),
            report.capacity_bytes
        );
    }

    #[test]
    fn test_engine_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Stego>();
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = Stego::new(StegoConfig::with_iterations(10));
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }
}
