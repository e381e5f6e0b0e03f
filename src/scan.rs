//! Whole-upload scanning and the JSON report
//!
//! Reports use the same shape as the upload endpoint responses:
//!
//! ```json
//! {"filename": "shelf.jpg",
//!  "results": {"barcodes": [{"type": "EAN-13", "content": "4006381333931", "angle": 90}]}}
//! ```
//!
//! and `{"error": "Processing error: ..."}` when the upload is unusable.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::ScanConfig;
use crate::decoder::SymbolDecoder;
use crate::error::{Result, ScanError};
use crate::models::{PixelBuffer, RegionRect, Symbol, Symbology};
use crate::search::RotationSearch;

/// One decoded barcode in a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarcodeEntry {
    /// Symbology tag ("QR", "EAN-13", ...)
    #[serde(rename = "type")]
    pub symbology: Symbology,
    /// Payload as text (invalid UTF-8 replaced)
    pub content: String,
    /// Rotation that produced the decode, in degrees
    pub angle: u32,
    /// Source region, when the scan was restricted to regions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<RegionRect>,
}

impl BarcodeEntry {
    fn new(symbol: &Symbol, angle: u32, region: Option<RegionRect>) -> Self {
        Self {
            symbology: symbol.symbology,
            content: String::from_utf8_lossy(&symbol.content).into_owned(),
            angle,
            region,
        }
    }
}

/// Barcodes found in one upload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResults {
    /// Decoded barcodes, in region order
    pub barcodes: Vec<BarcodeEntry>,
}

/// Successful scan response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Name the upload was submitted under
    pub filename: String,
    /// What was found
    pub results: ScanResults,
}

/// Failed scan response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    /// `Processing error: <reason>`
    pub error: String,
}

impl ErrorReport {
    /// Render a scan error the way the upload endpoint reported failures
    pub fn from_error(err: &ScanError) -> Self {
        Self {
            error: format!("Processing error: {}", err),
        }
    }
}

impl From<&ScanError> for ErrorReport {
    fn from(err: &ScanError) -> Self {
        Self::from_error(err)
    }
}

/// Decode uploaded image bytes and scan them
pub fn scan_bytes<D: SymbolDecoder>(
    filename: &str,
    bytes: &[u8],
    config: &ScanConfig,
    decoder: D,
) -> Result<ScanReport> {
    let image = PixelBuffer::from_encoded(bytes)?;
    scan_buffer(filename, &image, config, decoder)
}

/// Cut `image` into the regions `config` asks for, ready to search.
///
/// Regions are cropped from the full-resolution image, then each crop is
/// downscaled to `max_dim`. Without regions the whole image is one region.
pub fn prepare_regions(
    image: &PixelBuffer,
    config: &ScanConfig,
) -> Result<Vec<(Option<RegionRect>, PixelBuffer)>> {
    if config.regions.is_empty() {
        return Ok(vec![(None, image.downscale(config.max_dim)?)]);
    }
    config
        .regions
        .iter()
        .map(|rect| Ok((Some(*rect), image.crop(rect)?.downscale(config.max_dim)?)))
        .collect()
}

/// Scan an already decoded image.
///
/// Each region reports every symbol found at its first successful angle.
pub fn scan_buffer<D: SymbolDecoder>(
    filename: &str,
    image: &PixelBuffer,
    config: &ScanConfig,
    decoder: D,
) -> Result<ScanReport> {
    let search = RotationSearch::with_config(decoder, config.rotation)?;
    let regions = prepare_regions(image, config)?;

    log::info!(
        "scanning {} ({}x{}) in {} region(s)",
        filename,
        image.width(),
        image.height(),
        regions.len()
    );

    let barcodes = regions
        .par_iter()
        .map(|(rect, region)| match search.search_symbols(region) {
            Some(hit) => hit
                .symbols
                .iter()
                .map(|symbol| BarcodeEntry::new(symbol, hit.angle, *rect))
                .collect(),
            None => Vec::new(),
        })
        .collect::<Vec<Vec<BarcodeEntry>>>()
        .into_iter()
        .flatten()
        .collect();

    Ok(ScanReport {
        filename: filename.to_string(),
        results: ScanResults { barcodes },
    })
}
