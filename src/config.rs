//! Configuration constants and types for the steganography engine.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Frame magic number.
pub const FORMAT_MAGIC: [u8; 4] = *b"STG1";

/// Current frame format version.
pub const FORMAT_VERSION: u8 = 1;

/// Number of copies written for every logical bit.
pub const REDUNDANCY: usize = 3;

/// Deepest bit plane the embedder may overwrite (bits 0 and 1).
pub const MAX_EMBED_DEPTH: u8 = 2;

/// Number of colour channels per pixel that carry data.
pub const COLOR_CHANNELS: usize = 3;

/// Default texture strength below which a pixel is left alone.
pub const DEFAULT_SMOOTH_THRESHOLD: u16 = 3;

/// Default texture strength at or above which a pixel carries two bits.
pub const DEFAULT_EDGE_THRESHOLD: u16 = 12;

/// Key derivation parameters.
pub mod kdf_params {
    /// Default PBKDF2-HMAC-SHA256 iteration count.
    pub const DEFAULT_ITERATIONS: u32 = 200_000;

    /// Lowest accepted iteration count.
    pub const MIN_ITERATIONS: u32 = 100_000;

    /// Salt length in bytes.
    pub const SALT_LENGTH: usize = 16;

    /// Output length in bytes (256 bits).
    pub const OUTPUT_LENGTH: usize = 32;

    /// HKDF context label for the cipher key.
    pub const CIPHER_KEY_LABEL: &[u8] = b"adaptive-stego/v1/cipher-key";

    /// HKDF context label for the bit-ordering seed.
    pub const ORDERING_SEED_LABEL: &[u8] = b"adaptive-stego/v1/ordering-seed";
}

/// Default steganalysis weights.
pub mod detector_params {
    pub const BALANCE_WEIGHT: f64 = 1.0;
    pub const PAIR_WEIGHT: f64 = 1.5;
    pub const PLANE_WEIGHT: f64 = 1.0;
    pub const NEIGHBOR_WEIGHT: f64 = 1.0;
    /// Weight of the sample-pair estimate of the replaced-LSB share.
    pub const RATE_WEIGHT: f64 = 8.0;
    pub const BIAS: f64 = -5.0;
    pub const THRESHOLD: f64 = 0.5;

    /// Value pairs with fewer samples than this are left out of the chi-square.
    pub const MIN_PAIR_COUNT: u64 = 10;

    /// Below this many textured pixels the detector measures the whole image.
    pub const MIN_TEXTURED_PIXELS: usize = 256;
}

/// Thresholds that map texture strength onto embedding depth.
///
/// Both sides of a round trip must use the same values: the plan is
/// recomputed at extraction time and never transmitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Strength below this keeps the pixel untouched (depth 0).
    pub smooth_threshold: u16,

    /// Strength at or above this allows two bits per channel.
    pub edge_threshold: u16,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            smooth_threshold: DEFAULT_SMOOTH_THRESHOLD,
            edge_threshold: DEFAULT_EDGE_THRESHOLD,
        }
    }
}

/// Weights of the steganalysis score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub balance_weight: f64,
    pub pair_weight: f64,
    pub plane_weight: f64,
    pub neighbor_weight: f64,
    pub rate_weight: f64,
    /// Constant added to the weighted sum before the logistic squash.
    pub bias: f64,
    /// Scores at or above this are labelled likely-stego.
    pub threshold: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            balance_weight: detector_params::BALANCE_WEIGHT,
            pair_weight: detector_params::PAIR_WEIGHT,
            plane_weight: detector_params::PLANE_WEIGHT,
            neighbor_weight: detector_params::NEIGHBOR_WEIGHT,
            rate_weight: detector_params::RATE_WEIGHT,
            bias: detector_params::BIAS,
            threshold: detector_params::THRESHOLD,
        }
    }
}

/// Engine configuration.
///
/// The image records neither `kdf_iterations` nor `planner`. Extraction must
/// run with the values used to embed: another iteration count derives a
/// different key and fails as [`Error::AuthenticationFailed`], and other
/// planner thresholds select different slots, which fails the same way or
/// as [`Error::NoHiddenData`]. The detector weights are free to differ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StegoConfig {
    /// PBKDF2 iteration count.
    pub kdf_iterations: u32,

    /// Capacity planner thresholds.
    #[serde(default)]
    pub planner: PlannerConfig,

    /// Detector weighting.
    #[serde(default)]
    pub detector: DetectorConfig,
}

impl Default for StegoConfig {
    fn default() -> Self {
        Self {
            kdf_iterations: kdf_params::DEFAULT_ITERATIONS,
            planner: PlannerConfig::default(),
            detector: DetectorConfig::default(),
        }
    }
}

impl StegoConfig {
    /// Create a configuration with a custom iteration count and default thresholds.
    pub fn with_iterations(kdf_iterations: u32) -> Self {
        Self {
            kdf_iterations,
            ..Self::default()
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.kdf_iterations < kdf_params::MIN_ITERATIONS {
            return Err(format!(
                "KDF iterations must be at least {}",
                kdf_params::MIN_ITERATIONS
            ));
        }
        if self.planner.smooth_threshold > self.planner.edge_threshold {
            return Err("Smooth threshold must not exceed edge threshold".to_string());
        }
        let d = &self.detector;
        let weights = [
            d.balance_weight,
            d.pair_weight,
            d.plane_weight,
            d.neighbor_weight,
            d.rate_weight,
            d.bias,
        ];
        if weights.iter().any(|w| !w.is_finite()) {
            return Err("Detector weights must be finite".to_string());
        }
        if !(0.0..=1.0).contains(&d.threshold) {
            return Err("Detector threshold must be between 0 and 1".to_string());
        }
        Ok(())
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: StegoConfig = serde_json::from_str(&content)?;
        config.validate().map_err(Error::InvalidConfig)?;
        Ok(config)
    }

    /// Save the configuration as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
