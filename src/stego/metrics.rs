//! Fidelity metrics between a cover and its stego image.
//!
//! MSE and PSNR are taken over the colour samples only; alpha is never
//! written and would only dilute the figures.

use crate::carrier::PixelGrid;
use crate::error::{Error, Result};
use serde::Serialize;

/// Peak sample value of 8-bit images.
const MAX_SAMPLE: f64 = 255.0;

/// Compute MSE between the colour samples of two grids.
///
/// # Errors
///
/// Returns [`Error::UnsupportedImage`] if the grids differ in shape.
pub fn mse(a: &PixelGrid, b: &PixelGrid) -> Result<f64> {
    if a.width() != b.width() || a.height() != b.height() {
        return Err(Error::UnsupportedImage(format!(
            "cannot compare {}x{} with {}x{}",
            a.width(),
            a.height(),
            b.width(),
            b.height()
        )));
    }
    let n = a.color_channel_count();
    if n == 0 {
        return Ok(0.0);
    }
    let sum: f64 = (0..n)
        .map(|i| {
            let diff = f64::from(a.samples()[a.sample_offset(i)])
                - f64::from(b.samples()[b.sample_offset(i)]);
            diff * diff
        })
        .sum();
    Ok(sum / n as f64)
}

/// Compute PSNR in decibels.
///
/// Returns `f64::INFINITY` when the grids are identical.
#[inline]
pub fn psnr(a: &PixelGrid, b: &PixelGrid) -> Result<f64> {
    Ok(psnr_from_mse(mse(a, b)?))
}

fn psnr_from_mse(mse: f64) -> f64 {
    if mse == 0.0 {
        return f64::INFINITY;
    }
    10.0 * (MAX_SAMPLE * MAX_SAMPLE / mse).log10()
}

/// Figures reported after an embed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EmbedMetrics {
    pub mse: f64,
    /// Infinite when nothing changed; serialized as `null` in JSON.
    pub psnr: f64,
    /// Largest framed blob the cover could hold.
    pub capacity_bytes: usize,
    /// Length of the framed blob actually written.
    pub used_bytes: usize,
}

impl EmbedMetrics {
    pub fn between(
        cover: &PixelGrid,
        stego: &PixelGrid,
        capacity_bytes: usize,
        used_bytes: usize,
    ) -> Result<Self> {
        let mse = mse(cover, stego)?;
        Ok(Self {
            mse,
            psnr: psnr_from_mse(mse),
            capacity_bytes,
            used_bytes,
        })
    }

    /// Share of capacity used, in percent.
    pub fn utilization(&self) -> f64 {
        if self.capacity_bytes == 0 {
            return 0.0;
        }
        self.used_bytes as f64 / self.capacity_bytes as f64 * 100.0
    }
}
