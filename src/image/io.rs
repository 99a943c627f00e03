//! I/O helpers for density maps, masks and JSON.
//!
//! - `load_grayscale_image`: read a PNG/TIFF/etc. into an `ImageF64` in [0, 1].
//! - `load_mask`: read an image and mark every non-zero pixel as foreground.
//! - `save_normalized_f64`: write an `ImageF64` to a grayscale PNG, stretched
//!   over its finite value range.
//! - `save_resolution_map`: write a resolution map to a grayscale PNG.
//! - `write_json_file`: pretty-print a serializable value to disk.
use super::{ImageF64, ImageView, Mask};
use crate::aggregate::ResolutionMap;
use image::{GrayImage, Luma};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Load an image from disk as 16-bit grayscale, scaled to [0, 1].
pub fn load_grayscale_image(path: &Path) -> Result<ImageF64, String> {
    let img = image::open(path)
        .map_err(|e| format!("Failed to open {}: {e}", path.display()))?
        .into_luma16();
    let width = img.width() as usize;
    let height = img.height() as usize;
    let data = img
        .into_raw()
        .into_iter()
        .map(|v| f64::from(v) / f64::from(u16::MAX))
        .collect();
    ImageF64::from_vec(width, height, data).map_err(|e| e.to_string())
}

/// Load a mask image; any non-zero pixel is foreground.
pub fn load_mask(path: &Path) -> Result<Mask, String> {
    let img = image::open(path)
        .map_err(|e| format!("Failed to open mask {}: {e}", path.display()))?
        .into_luma8();
    let width = img.width() as usize;
    let height = img.height() as usize;
    let data = img.into_raw().into_iter().map(|v| v > 0).collect();
    Mask::from_vec(width, height, data).map_err(|e| e.to_string())
}

/// Save a float image to a grayscale PNG, mapping its finite range to [0, 255].
pub fn save_normalized_f64(image: &ImageF64, path: &Path) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let (lo, hi) = image.finite_range().unwrap_or((0.0, 1.0));
    let span = if hi > lo { hi - lo } else { 1.0 };
    let mut out = GrayImage::new(image.w as u32, image.h as u32);
    for (y, row) in image.rows().enumerate() {
        for (x, &px) in row.iter().enumerate() {
            let v = if px.is_finite() {
                ((px - lo) / span * 255.0).clamp(0.0, 255.0)
            } else if px > 0.0 {
                255.0
            } else {
                0.0
            };
            out.put_pixel(x as u32, y as u32, Luma([v as u8]));
        }
    }
    out.save(path)
        .map_err(|e| format!("Failed to save {}: {e}", path.display()))
}

/// Save a resolution map: `width0` maps to dark, `width_max` to white and
/// background pixels to black.
pub fn save_resolution_map(map: &ResolutionMap, path: &Path) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let lo = map.width0 as f64;
    let span = (map.width_max as f64 - lo).max(1.0);
    let mut out = GrayImage::new(map.n as u32, map.n as u32);
    for y in 0..map.n {
        for x in 0..map.n {
            let v = match map.get(x, y) {
                Some(width) => 32.0 + (width as f64 - lo) / span * 223.0,
                None => 0.0,
            };
            out.put_pixel(x as u32, y as u32, Luma([v.clamp(0.0, 255.0) as u8]));
        }
    }
    out.save(path)
        .map_err(|e| format!("Failed to save {}: {e}", path.display()))
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize JSON for {}: {e}", path.display()))?;
    fs::write(path, json).map_err(|e| format!("Failed to write JSON {}: {e}", path.display()))
}

fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}
