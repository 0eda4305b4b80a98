//! Decoded pixel grids.
//!
//! Samples are interleaved in raster order. A *pixel-channel index* counts
//! only the three colour channels: index `i` is channel `i % 3` of pixel
//! `i / 3`. Alpha, when present, is never addressed by that index.

use crate::config::COLOR_CHANNELS;
use crate::error::{Error, Result};

/// An 8-bit RGB or RGBA image held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    channels: u8,
    samples: Vec<u8>,
}

impl PixelGrid {
    /// Wrap a sample buffer, checking its shape.
    pub fn new(width: u32, height: u32, channels: u8, samples: Vec<u8>) -> Result<Self> {
        if channels != 3 && channels != 4 {
            return Err(Error::UnsupportedImage(format!(
                "expected 3 or 4 channels, got {}",
                channels
            )));
        }
        if width == 0 || height == 0 {
            return Err(Error::UnsupportedImage(format!(
                "empty image ({}x{})",
                width, height
            )));
        }
        let expected = width as usize * height as usize * channels as usize;
        if samples.len() != expected {
            return Err(Error::UnsupportedImage(format!(
                "buffer holds {} samples, {}x{}x{} needs {}",
                samples.len(),
                width,
                height,
                channels,
                expected
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            samples,
        })
    }

    /// Build an RGB grid from a per-sample function `f(x, y, channel)`.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32, usize) -> u8) -> Result<Self> {
        let mut samples = Vec::with_capacity(width as usize * height as usize * 3);
        for y in 0..height {
            for x in 0..width {
                for c in 0..COLOR_CHANNELS {
                    samples.push(f(x, y, c));
                }
            }
        }
        Self::new(width, height, 3, samples)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Channels per pixel (3 or 4).
    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Whether the grid carries an alpha channel.
    pub fn has_alpha(&self) -> bool {
        self.channels == 4
    }

    /// Raw interleaved samples.
    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    /// Mutable access to the samples.
    pub fn samples_mut(&mut self) -> &mut [u8] {
        &mut self.samples
    }

    /// Number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Number of colour pixel-channels (pixels × 3).
    pub fn color_channel_count(&self) -> usize {
        self.pixel_count() * COLOR_CHANNELS
    }

    /// Offset into [`samples`](Self::samples) of a pixel-channel index.
    #[inline]
    pub fn sample_offset(&self, channel_index: usize) -> usize {
        (channel_index / COLOR_CHANNELS) * self.channels as usize + channel_index % COLOR_CHANNELS
    }

    /// Sample at pixel (x, y), channel `c`.
    #[inline]
    pub fn get(&self, x: u32, y: u32, c: usize) -> u8 {
        let pixel = y as usize * self.width as usize + x as usize;
        self.samples[pixel * self.channels as usize + c]
    }

    /// Read bit `bit` of a pixel-channel.
    #[inline]
    pub fn read_bit(&self, channel_index: usize, bit: u8) -> u8 {
        (self.samples[self.sample_offset(channel_index)] >> bit) & 1
    }

    /// Overwrite bit `bit` of a pixel-channel with `value` (0 or 1).
    #[inline]
    pub fn write_bit(&mut self, channel_index: usize, bit: u8, value: u8) {
        let offset = self.sample_offset(channel_index);
        let mask = 1u8 << bit;
        self.samples[offset] = (self.samples[offset] & !mask) | ((value & 1) << bit);
    }

    /// Invert bit `bit` of a pixel-channel.
    pub fn flip_bit(&mut self, channel_index: usize, bit: u8) {
        let offset = self.sample_offset(channel_index);
        self.samples[offset] ^= 1u8 << bit;
    }
}
