//! Raster image to bitmap matrix conversion.
//!
//! The source is scaled to the target grid in a single area-averaging pass
//! (every source pixel contributes to the cell it falls in), then each cell
//! becomes the cell's RGB as a color when its alpha exceeds the threshold,
//! or empty otherwise.

use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::color::Color;
use crate::models::{BitmapMatrix, Grid, MatrixError};

/// Smallest accepted grid width.
pub const MIN_WIDTH: u32 = 8;
/// Largest accepted grid width.
pub const MAX_WIDTH: u32 = 128;

#[derive(Debug, Error)]
pub enum QuantizeError {
    #[error("failed to open image: {0}")]
    Open(#[from] image::ImageError),
    #[error("image has no pixels")]
    EmptyImage,
    #[error("grid width {0} out of range (8-128)")]
    WidthOutOfRange(u32),
    #[error(transparent)]
    Matrix(#[from] MatrixError),
}

/// Converter settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantizeOptions {
    /// Target grid width in cells
    pub width: u32,
    /// A cell is kept when its alpha is strictly greater than this
    pub alpha_threshold: u8,
}

impl Default for QuantizeOptions {
    fn default() -> Self {
        Self { width: 32, alpha_threshold: 0 }
    }
}

/// Grid height for a `src_w`x`src_h` source at `width` cells wide.
pub fn grid_height(src_w: u32, src_h: u32, width: u32) -> u32 {
    let aspect = src_h as f64 / src_w as f64;
    ((width as f64 * aspect).round() as u32).max(1)
}

/// Scale `image` to exactly `width`x`height`.
///
/// Downscaling averages source areas; upscaling interpolates, since there
/// is no area to average.
fn resample(image: &DynamicImage, width: u32, height: u32) -> RgbaImage {
    let rgba = image.to_rgba8();
    if width <= rgba.width() && height <= rgba.height() {
        imageops::thumbnail(&rgba, width, height)
    } else {
        imageops::resize(&rgba, width, height, FilterType::Triangle)
    }
}

/// Convert a decoded image into a matrix named `name`.
pub fn quantize_image(
    image: &DynamicImage,
    options: &QuantizeOptions,
    name: &str,
) -> Result<BitmapMatrix, QuantizeError> {
    if !(MIN_WIDTH..=MAX_WIDTH).contains(&options.width) {
        return Err(QuantizeError::WidthOutOfRange(options.width));
    }
    let (src_w, src_h) = (image.width(), image.height());
    if src_w == 0 || src_h == 0 {
        return Err(QuantizeError::EmptyImage);
    }

    let width = options.width;
    let height = grid_height(src_w, src_h, width);
    let scaled = resample(image, width, height);

    let grid: Grid = scaled
        .rows()
        .map(|row| {
            row.map(|px| {
                (px[3] > options.alpha_threshold).then(|| Color::rgb(px[0], px[1], px[2]))
            })
            .collect()
        })
        .collect();

    log::debug!("quantized {}x{} source to {}x{} grid", src_w, src_h, width, height);
    Ok(BitmapMatrix::from_parts(name.to_string(), width, height, grid)?)
}

/// Open and convert an image file. The matrix is named after the file stem.
pub fn quantize_file(path: &Path, options: &QuantizeOptions) -> Result<BitmapMatrix, QuantizeError> {
    let image = image::open(path)?;
    let name = path.file_stem().unwrap_or_default().to_string_lossy();
    quantize_image(&image, options, &name)
}

/// Convert many files in parallel, preserving input order.
pub fn quantize_files(
    paths: &[PathBuf],
    options: &QuantizeOptions,
) -> Vec<(PathBuf, Result<BitmapMatrix, QuantizeError>)> {
    paths
        .par_iter()
        .map(|path| (path.clone(), quantize_file(path, options)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::tempdir;

    fn checker(w: u32, h: u32) -> DynamicImage {
        // Left half opaque red, right half fully transparent
        DynamicImage::ImageRgba8(RgbaImage::from_fn(w, h, |x, _| {
            if x < w / 2 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        }))
    }

    #[test]
    fn test_grid_height_follows_aspect() {
        assert_eq!(grid_height(100, 50, 32), 16);
        assert_eq!(grid_height(100, 100, 8), 8);
        assert_eq!(grid_height(3, 2, 8), 5); // 5.33 rounds down
        assert_eq!(grid_height(2, 3, 9), 14); // 13.5 rounds half away from zero
        assert_eq!(grid_height(1000, 1, 8), 1);
    }

    #[test]
    fn test_quantize_downscale_keeps_halves() {
        let options = QuantizeOptions { width: 8, alpha_threshold: 0 };
        let matrix = quantize_image(&checker(64, 32), &options, "halves").unwrap();

        assert_eq!((matrix.width(), matrix.height()), (8, 4));
        assert_eq!(matrix.name(), "halves");
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(matrix.cell(x, y), Some(Color::rgb(255, 0, 0)));
            }
            for x in 4..8 {
                assert_eq!(matrix.cell(x, y), None);
            }
        }
    }

    #[test]
    fn test_quantize_averages_areas() {
        // Alternating black and white columns average to mid-gray
        let image = DynamicImage::ImageRgba8(RgbaImage::from_fn(32, 32, |x, _| {
            let v = if x % 2 == 0 { 0 } else { 255 };
            Rgba([v, v, v, 255])
        }));
        let matrix = quantize_image(&image, &QuantizeOptions { width: 8, alpha_threshold: 0 }, "g")
            .unwrap();
        let cell = matrix.cell(3, 3).unwrap().rgba();
        assert!((120..=135).contains(&cell[0]), "expected gray, got {:?}", cell);
    }

    #[test]
    fn test_quantize_alpha_threshold() {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(16, 16, Rgba([9, 9, 9, 100])));
        let keep = QuantizeOptions { width: 8, alpha_threshold: 99 };
        let drop = QuantizeOptions { width: 8, alpha_threshold: 100 };
        assert_eq!(quantize_image(&image, &keep, "a").unwrap().filled_count(), 64);
        assert_eq!(quantize_image(&image, &drop, "a").unwrap().filled_count(), 0);
    }

    #[test]
    fn test_quantize_upscales_small_sources() {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([0, 128, 0, 255])));
        let matrix =
            quantize_image(&image, &QuantizeOptions { width: 16, alpha_threshold: 0 }, "up")
                .unwrap();
        assert_eq!((matrix.width(), matrix.height()), (16, 16));
        assert_eq!(matrix.cell(7, 7), Some(Color::rgb(0, 128, 0)));
    }

    #[test]
    fn test_quantize_rejects_bad_input() {
        let options = QuantizeOptions::default();
        let empty = DynamicImage::ImageRgba8(RgbaImage::new(0, 0));
        assert!(matches!(quantize_image(&empty, &options, "e"), Err(QuantizeError::EmptyImage)));

        for width in [0, 7, 129] {
            let bad = QuantizeOptions { width, ..options };
            assert!(matches!(
                quantize_image(&checker(16, 16), &bad, "w"),
                Err(QuantizeError::WidthOutOfRange(w)) if w == width
            ));
        }
    }

    #[test]
    fn test_quantize_files_in_parallel() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("sunset.png");
        checker(40, 20).to_rgba8().save(&good).unwrap();
        let missing = dir.path().join("missing.png");

        let results = quantize_files(&[good.clone(), missing.clone()], &QuantizeOptions::default());
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, good);
        let matrix = results[0].1.as_ref().unwrap();
        assert_eq!(matrix.name(), "sunset");
        assert_eq!((matrix.width(), matrix.height()), (32, 16));
        assert!(matches!(results[1].1, Err(QuantizeError::Open(_))));
    }
}
