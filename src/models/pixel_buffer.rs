//! Validated in-memory image region
//!
//! A `PixelBuffer` is the unit of work for the rotation search: a
//! row-major, channel-interleaved byte buffer with 1 (gray), 3 (RGB) or
//! 4 (RGBA) channels. Every constructor checks the layout, so a buffer
//! that exists is never empty or mis-sized.

use std::fmt;
use std::str::FromStr;

use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanError};
use crate::utils::grayscale::{rgb_to_grayscale, rgb_to_grayscale_parallel, rgba_to_grayscale};

/// RGB buffers at least this large are converted to grayscale on the rayon pool
const PARALLEL_GRAYSCALE_PIXELS: usize = 1 << 20;

/// Owned pixel data with its dimensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    channels: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap raw pixel bytes, validating the layout
    pub fn from_raw(data: Vec<u8>, width: usize, height: usize, channels: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(ScanError::InvalidInput(format!(
                "buffer has zero area ({}x{})",
                width, height
            )));
        }
        if !matches!(channels, 1 | 3 | 4) {
            return Err(ScanError::InvalidInput(format!(
                "unsupported channel count {}",
                channels
            )));
        }
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(channels))
            .ok_or_else(|| ScanError::InvalidInput("buffer dimensions overflow".into()))?;
        if data.len() != expected {
            return Err(ScanError::InvalidInput(format!(
                "expected {} bytes for {}x{}x{}, got {}",
                expected,
                width,
                height,
                channels,
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Copy a borrowed slice into a new buffer
    pub fn from_slice(data: &[u8], width: usize, height: usize, channels: usize) -> Result<Self> {
        Self::from_raw(data.to_vec(), width, height, channels)
    }

    /// Decode an encoded image (PNG, JPEG, ...) held in memory
    pub fn from_encoded(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(ScanError::InvalidInput("empty image data".into()));
        }
        let img = image::load_from_memory(bytes)?;
        Self::from_dynamic(img)
    }

    /// Convert a decoded `image` value, keeping gray images single-channel
    pub fn from_dynamic(img: DynamicImage) -> Result<Self> {
        let (width, height) = (img.width() as usize, img.height() as usize);
        match img.color().channel_count() {
            1 | 2 => Self::from_raw(img.into_luma8().into_raw(), width, height, 1),
            3 => Self::from_raw(img.into_rgb8().into_raw(), width, height, 3),
            _ => Self::from_raw(img.into_rgba8().into_raw(), width, height, 4),
        }
    }

    /// A buffer where every byte is `value`
    pub(crate) fn filled(width: usize, height: usize, channels: usize, value: u8) -> Self {
        Self {
            width,
            height,
            channels,
            data: vec![value; width * height * channels],
        }
    }

    /// Width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Bytes per pixel
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Raw interleaved bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Channel values of the pixel at (x, y)
    pub fn pixel(&self, x: usize, y: usize) -> &[u8] {
        let start = (y * self.width + x) * self.channels;
        &self.data[start..start + self.channels]
    }

    /// Single-channel luminance, one byte per pixel
    pub fn to_grayscale(&self) -> Vec<u8> {
        match self.channels {
            1 => self.data.clone(),
            3 if self.width * self.height >= PARALLEL_GRAYSCALE_PIXELS => {
                rgb_to_grayscale_parallel(&self.data, self.width, self.height)
            }
            3 => rgb_to_grayscale(&self.data, self.width, self.height),
            _ => rgba_to_grayscale(&self.data, self.width, self.height),
        }
    }

    /// Copy out a sub-rectangle, clipped to the buffer bounds
    pub fn crop(&self, rect: &RegionRect) -> Result<Self> {
        let x0 = rect.x.min(self.width);
        let y0 = rect.y.min(self.height);
        let x1 = rect.x.saturating_add(rect.width).min(self.width);
        let y1 = rect.y.saturating_add(rect.height).min(self.height);
        if x1 <= x0 || y1 <= y0 {
            return Err(ScanError::InvalidInput(format!(
                "region {} lies outside the {}x{} image",
                rect, self.width, self.height
            )));
        }

        let row_len = (x1 - x0) * self.channels;
        let mut data = Vec::with_capacity(row_len * (y1 - y0));
        for y in y0..y1 {
            let start = (y * self.width + x0) * self.channels;
            data.extend_from_slice(&self.data[start..start + row_len]);
        }
        Self::from_raw(data, x1 - x0, y1 - y0, self.channels)
    }

    /// Shrink so the longer side is at most `max_dim`, keeping aspect ratio.
    ///
    /// Returns a clone when the buffer already fits or `max_dim` is 0.
    pub fn downscale(&self, max_dim: u32) -> Result<Self> {
        let max_side = self.width.max(self.height);
        if max_dim == 0 || max_side <= max_dim as usize {
            return Ok(self.clone());
        }
        let resized = self
            .to_dynamic()?
            .resize(max_dim, max_dim, image::imageops::FilterType::Triangle);
        Self::from_dynamic(resized)
    }

    fn to_dynamic(&self) -> Result<DynamicImage> {
        let (w, h) = (self.width as u32, self.height as u32);
        let data = self.data.clone();
        let img = match self.channels {
            1 => GrayImage::from_raw(w, h, data).map(DynamicImage::ImageLuma8),
            3 => RgbImage::from_raw(w, h, data).map(DynamicImage::ImageRgb8),
            _ => RgbaImage::from_raw(w, h, data).map(DynamicImage::ImageRgba8),
        };
        img.ok_or_else(|| ScanError::InvalidInput("buffer does not match its dimensions".into()))
    }
}

/// Axis-aligned crop rectangle in source pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionRect {
    /// Left edge
    pub x: usize,
    /// Top edge
    pub y: usize,
    /// Width in pixels
    pub width: usize,
    /// Height in pixels
    pub height: usize,
}

impl RegionRect {
    /// Create a new rectangle
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

impl fmt::Display for RegionRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.x, self.y, self.width, self.height)
    }
}

impl FromStr for RegionRect {
    type Err = ScanError;

    /// Parse `x,y,width,height`
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<usize> = s
            .split(',')
            .map(|p| p.trim().parse::<usize>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|_| ScanError::Config(format!("bad region '{}', expected x,y,w,h", s)))?;
        match parts.as_slice() {
            [x, y, w, h] => Ok(Self::new(*x, *y, *w, *h)),
            _ => Err(ScanError::Config(format!(
                "bad region '{}', expected x,y,w,h",
                s
            ))),
        }
    }
}
