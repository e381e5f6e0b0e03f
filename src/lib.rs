//! rust_barcode - rotation-search barcode decoding
//!
//! Decodes QR codes and EAN-13/EAN-8 barcodes from image regions whose
//! orientation is unknown. The region is rotated through a fixed sweep of
//! angles (0°, 30°, ... 330° by default); each rotated copy is converted to
//! grayscale, binarized with Otsu's threshold and handed to a
//! [`SymbolDecoder`]. The first angle that yields a symbol wins.
//!
//! ```
//! use rust_barcode::{PixelBuffer, decode_with_rotation};
//!
//! let blank = PixelBuffer::from_raw(vec![255; 64 * 64 * 3], 64, 64, 3).unwrap();
//! assert!(decode_with_rotation(&blank).is_none());
//! ```

#![warn(missing_docs)]

/// Rotation and scan settings, environment overrides
pub mod config;
/// Symbol decoders (EAN, QR) behind a common trait
pub mod decoder;
/// Error types
pub mod error;
/// Core data structures (PixelBuffer, BitMatrix, DecodeResult, ...)
pub mod models;
/// Whole-upload scanning and JSON reports
pub mod scan;
/// The rotation search itself
pub mod search;
/// Helpers for the CLI, debugging and benchmarks
pub mod tools;
/// Image utilities (grayscale, binarization, rotation)
pub mod utils;

pub use config::{RotationConfig, ScanConfig};
pub use decoder::{CompositeDecoder, EanDecoder, QrDecoder, SymbolDecoder};
pub use error::{Result, ScanError};
pub use models::{BitMatrix, DecodeResult, PixelBuffer, RegionRect, Symbol, Symbology};
pub use scan::{ErrorReport, ScanReport, scan_bytes};
pub use search::{AngleHit, RotationSearch, SearchOutcome};

/// Search `region` with the default decoders and the default twelve-angle sweep
///
/// # Returns
/// The first decoded symbol with the angle it was found at, or `None`
/// when no angle yields a decode.
pub fn decode_with_rotation(region: &PixelBuffer) -> Option<DecodeResult> {
    RotationSearch::new(CompositeDecoder::default()).search(region)
}

/// Search raw interleaved pixels with the default decoders
///
/// # Arguments
/// * `pixels` - Row-major bytes, `channels` per pixel (1, 3 or 4)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `channels` - Bytes per pixel
///
/// # Errors
/// `InvalidInput` for zero-area or mis-sized buffers, before any rotation.
pub fn decode_pixels(
    pixels: &[u8],
    width: usize,
    height: usize,
    channels: usize,
) -> Result<Option<DecodeResult>> {
    RotationSearch::new(CompositeDecoder::default()).search_raw(pixels, width, height, channels)
}

/// Decode an encoded image (PNG, JPEG, ...) and search it with the default decoders
///
/// # Errors
/// `InvalidInput` when the bytes are not a readable image.
pub fn decode_image_bytes(bytes: &[u8]) -> Result<Option<DecodeResult>> {
    RotationSearch::new(CompositeDecoder::default()).search_encoded(bytes)
}
