//! Key-less steganalysis.
//!
//! LSB features per colour channel (bit balance, pairs-of-values chi-square,
//! bit-plane correlation, neighbour correlation and a sample pair estimate of
//! the replaced-LSB share) are averaged and combined through a logistic
//! function into a score in [0, 1].
//!
//! Features are taken over the pixels the planner would write. Flat regions
//! carry no payload and would only dilute the statistics.

mod detector;
mod features;

pub use detector::{Detection, Detector, Verdict};
pub use features::{extract_features, ChannelFeatures, DetectionFeatures};
