//! Logistic scoring of LSB features.

use crate::carrier::{texture_mask, PixelGrid};
use crate::config::{detector_params::MIN_TEXTURED_PIXELS, DetectorConfig, PlannerConfig};
use crate::steganalysis::features::{extract_features, DetectionFeatures};
use serde::Serialize;
use std::fmt;

/// Label attached to a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verdict {
    LikelyClean,
    LikelyStego,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::LikelyClean => write!(f, "likely-clean"),
            Verdict::LikelyStego => write!(f, "likely-stego"),
        }
    }
}

/// Result of analysing one image. Heuristic, not proof.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    /// Probability-like score in [0, 1].
    pub score: f64,
    pub verdict: Verdict,
    pub features: DetectionFeatures,
}

/// Key-less steganalysis detector.
///
/// Looks where the planner would write: pixels textured enough to carry
/// data. Images with too few such pixels are measured whole.
#[derive(Debug, Clone, Default)]
pub struct Detector {
    config: DetectorConfig,
    planner: PlannerConfig,
}

impl Detector {
    pub fn new(config: DetectorConfig, planner: PlannerConfig) -> Self {
        Self { config, planner }
    }

    /// Weighted sum of the mean features, squashed to [0, 1].
    pub fn score(&self, features: &DetectionFeatures) -> f64 {
        let c = &self.config;
        let logit = c.bias
            + c.balance_weight * features.balance
            + c.pair_weight * features.pair
            + c.plane_weight * features.plane
            + c.neighbor_weight * features.neighbor
            + c.rate_weight * features.rate;
        1.0 / (1.0 + (-logit).exp())
    }

    pub fn verdict(&self, score: f64) -> Verdict {
        if score >= self.config.threshold {
            Verdict::LikelyStego
        } else {
            Verdict::LikelyClean
        }
    }

    /// Analyse an image. Pure: identical input gives an identical result.
    pub fn detect(&self, grid: &PixelGrid) -> Detection {
        let mut region = texture_mask(grid, &self.planner);
        if region.iter().filter(|&&p| p).count() < MIN_TEXTURED_PIXELS {
            region.clear();
        }
        let features = extract_features(grid, &region);
        let score = self.score(&features);
        Detection {
            score,
            verdict: self.verdict(score),
            features,
        }
    }
}
