//! Loading and saving pixel grids with the `image` crate.
//!
//! Only lossless formats keep a stego image intact; saving always goes
//! through the extension of the target path, so callers should use `.png`
//! or `.bmp`.

use crate::carrier::pixels::PixelGrid;
use crate::error::{Error, Result};
use image::{DynamicImage, RgbImage, RgbaImage};
use std::path::Path;

/// Decode an image file into an RGB or RGBA grid.
pub fn load(path: &Path) -> Result<PixelGrid> {
    let image = image::open(path)?;
    from_dynamic(image)
}

/// Convert a decoded image, keeping alpha only when the source has it.
pub fn from_dynamic(image: DynamicImage) -> Result<PixelGrid> {
    let (width, height) = (image.width(), image.height());
    if image.color().has_alpha() {
        PixelGrid::new(width, height, 4, image.to_rgba8().into_raw())
    } else {
        PixelGrid::new(width, height, 3, image.to_rgb8().into_raw())
    }
}

/// Encode a grid to a file; the format follows the path's extension.
pub fn save(grid: &PixelGrid, path: &Path) -> Result<()> {
    to_dynamic(grid)?.save(path)?;
    Ok(())
}

/// Wrap a grid as an `image::DynamicImage`.
pub fn to_dynamic(grid: &PixelGrid) -> Result<DynamicImage> {
    let (w, h) = (grid.width(), grid.height());
    let samples = grid.samples().to_vec();
    let image = if grid.has_alpha() {
        RgbaImage::from_raw(w, h, samples).map(DynamicImage::ImageRgba8)
    } else {
        RgbImage::from_raw(w, h, samples).map(DynamicImage::ImageRgb8)
    };
    image.ok_or_else(|| Error::Image("sample buffer does not match dimensions".to_string()))
}
