use crate::decoder::SymbolDecoder;
use crate::error::Result;
use crate::models::{BitMatrix, PixelBuffer, Symbol};
use crate::search::binarize_at_with_threshold;
use std::fs;
use std::path::{Path, PathBuf};

const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "bmp"];

/// Load an image file, downscaled so its longer side is at most `max_dim` (0 = off).
pub fn load_pixels<P: AsRef<Path>>(path: P, max_dim: u32) -> Result<PixelBuffer> {
    let bytes = fs::read(path)?;
    PixelBuffer::from_encoded(&bytes)?.downscale(max_dim)
}

/// Summary statistics for grayscale data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrayStats {
    /// Minimum grayscale value.
    pub min: u8,
    /// Maximum grayscale value.
    pub max: u8,
    /// Average grayscale value.
    pub avg: u8,
}

/// Summary statistics for a binary matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryStats {
    /// Count of black pixels.
    pub black_pixels: usize,
    /// Total pixels in the matrix.
    pub total_pixels: usize,
    /// Ratio of black pixels to total pixels.
    pub black_ratio: f64,
}

/// Compute min/max/avg for grayscale values.
pub fn grayscale_stats(gray: &[u8]) -> GrayStats {
    if gray.is_empty() {
        return GrayStats {
            min: 0,
            max: 0,
            avg: 0,
        };
    }
    let mut min = u8::MAX;
    let mut max = u8::MIN;
    let mut sum: u64 = 0;
    for &v in gray {
        min = min.min(v);
        max = max.max(v);
        sum += v as u64;
    }
    GrayStats {
        min,
        max,
        avg: (sum / gray.len() as u64) as u8,
    }
}

/// Compute black pixel stats for a binary matrix.
pub fn binary_stats(binary: &BitMatrix) -> BinaryStats {
    let black = binary.count_black();
    let total = binary.width() * binary.height();
    let ratio = if total == 0 {
        0.0
    } else {
        black as f64 / total as f64
    };
    BinaryStats {
        black_pixels: black,
        total_pixels: total,
        black_ratio: ratio,
    }
}

/// What a single angle of the sweep produced, for debugging.
#[derive(Debug, Clone)]
pub struct AngleAttempt {
    /// Rotation in degrees
    pub angle: u32,
    /// Otsu threshold chosen for the rotated image
    pub threshold: u8,
    /// Black pixel stats after thresholding
    pub binary: BinaryStats,
    /// Every symbol the decoder reported at this angle
    pub symbols: Vec<Symbol>,
}

/// Run the decoder at every angle without stopping at the first hit.
///
/// Each attempt binarizes exactly as the rotation search does.
pub fn sweep_angles<D, I>(region: &PixelBuffer, angles: I, decoder: &D) -> Vec<AngleAttempt>
where
    D: SymbolDecoder,
    I: IntoIterator<Item = u32>,
{
    angles
        .into_iter()
        .map(|angle| {
            let (binary, threshold) = binarize_at_with_threshold(region, angle);
            AngleAttempt {
                angle,
                threshold,
                binary: binary_stats(&binary),
                symbols: decoder.decode(&binary),
            }
        })
        .collect()
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

fn collect_images(root: &Path) -> Vec<PathBuf> {
    let mut stack = vec![root.to_path_buf()];
    let mut images = Vec::new();

    while let Some(dir) = stack.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => continue,
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else if is_image_file(&path) {
                images.push(path);
            }
        }
    }

    images
}

/// Expand directories into the image files below them; files pass through.
///
/// Directory contents are sorted, and at most `limit` paths are returned.
pub fn expand_inputs(inputs: &[PathBuf], limit: Option<usize>) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut images = collect_images(input);
            images.sort();
            paths.extend(images);
        } else {
            paths.push(input.clone());
        }
    }
    if let Some(limit) = limit {
        paths.truncate(limit);
    }
    paths
}
