//! Edge-aware capacity planning.
//!
//! Texture strength is measured on `sample >> MAX_EMBED_DEPTH`, so nothing
//! the embedder writes can change the plan: extraction recomputes the exact
//! same depths from the stego image.

use crate::carrier::pixels::PixelGrid;
use crate::config::{PlannerConfig, COLOR_CHANNELS, MAX_EMBED_DEPTH, REDUNDANCY};
use crate::error::{Error, Result};
use crate::payload::PREFIX_LEN;
use serde::Serialize;

/// Pixel-channels reserved at the start of the image for the frame prefix.
pub const HEADER_CHANNELS: usize = PREFIX_LEN * 8 * REDUNDANCY;

/// Per-pixel embedding depths for one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddingPlan {
    width: u32,
    height: u32,
    depths: Vec<u8>,
}

/// Pixel counts per depth band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DepthBands {
    /// Depth 0: never modified.
    pub smooth: usize,
    /// Depth 1.
    pub textured: usize,
    /// Depth 2.
    pub edge: usize,
}

impl EmbeddingPlan {
    /// Plan depths for every pixel of `grid`.
    ///
    /// Fails with [`Error::UnsupportedImage`] when the image cannot even hold
    /// the header region.
    pub fn compute(grid: &PixelGrid, config: &PlannerConfig) -> Result<Self> {
        if grid.color_channel_count() < HEADER_CHANNELS {
            return Err(Error::UnsupportedImage(format!(
                "{}x{} has {} colour samples, at least {} are needed",
                grid.width(),
                grid.height(),
                grid.color_channel_count(),
                HEADER_CHANNELS
            )));
        }

        let (w, h) = (grid.width(), grid.height());
        let mut depths = Vec::with_capacity(grid.pixel_count());
        for y in 0..h {
            for x in 0..w {
                let strength = texture_strength(grid, x, y);
                depths.push(depth_for(strength, config));
            }
        }

        Ok(Self {
            width: w,
            height: h,
            depths,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Depth of a pixel.
    pub fn pixel_depth(&self, pixel: usize) -> u8 {
        self.depths[pixel]
    }

    /// Depth of a pixel-channel. Header channels report 0: they are written
    /// separately and never belong to the payload region.
    #[inline]
    pub fn depth(&self, channel_index: usize) -> u8 {
        if channel_index < HEADER_CHANNELS {
            0
        } else {
            self.depths[channel_index / COLOR_CHANNELS]
        }
    }

    /// Number of pixel-channels (pixels × 3).
    pub fn channel_count(&self) -> usize {
        self.depths.len() * COLOR_CHANNELS
    }

    /// Bit slots available to the payload region.
    pub fn raw_capacity_bits(&self) -> usize {
        (HEADER_CHANNELS..self.channel_count())
            .map(|i| self.depth(i) as usize)
            .sum()
    }

    /// Ciphertext bytes the payload region holds after redundancy.
    pub fn payload_capacity_bytes(&self) -> usize {
        self.raw_capacity_bits() / (REDUNDANCY * 8)
    }

    /// Largest framed blob, prefix included, the image can carry.
    pub fn usable_capacity_bytes(&self) -> usize {
        PREFIX_LEN + self.payload_capacity_bytes()
    }

    /// Pixel counts per depth band.
    pub fn bands(&self) -> DepthBands {
        let mut bands = DepthBands::default();
        for &d in &self.depths {
            match d {
                0 => bands.smooth += 1,
                1 => bands.textured += 1,
                _ => bands.edge += 1,
            }
        }
        bands
    }
}

/// Pixels the planner would let carry data, in raster order.
///
/// Same strength measure and smooth threshold as [`EmbeddingPlan`], but with
/// no header reservation or size floor, so it works on any image.
pub fn texture_mask(grid: &PixelGrid, config: &PlannerConfig) -> Vec<bool> {
    let mut mask = Vec::with_capacity(grid.pixel_count());
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            mask.push(depth_for(texture_strength(grid, x, y), config) > 0);
        }
    }
    mask
}

/// Sum of colour samples with the embeddable bits masked off.
#[inline]
fn intensity(grid: &PixelGrid, x: u32, y: u32) -> i32 {
    (0..COLOR_CHANNELS)
        .map(|c| (grid.get(x, y, c) >> MAX_EMBED_DEPTH) as i32)
        .sum()
}

/// Central-difference gradient magnitude (L1) with clamped borders.
fn texture_strength(grid: &PixelGrid, x: u32, y: u32) -> u16 {
    let max_x = grid.width() - 1;
    let max_y = grid.height() - 1;
    let dx = intensity(grid, (x + 1).min(max_x), y) - intensity(grid, x.saturating_sub(1), y);
    let dy = intensity(grid, x, (y + 1).min(max_y)) - intensity(grid, x, y.saturating_sub(1));
    (dx.abs() + dy.abs()) as u16
}

fn depth_for(strength: u16, config: &PlannerConfig) -> u8 {
    if strength < config.smooth_threshold {
        0
    } else if strength < config.edge_threshold {
        1
    } else {
        MAX_EMBED_DEPTH
    }
}
