//! Rotation-search decoding
//!
//! Barcode decoders are orientation sensitive. Instead of estimating the
//! exact orientation, the search rotates the region through a fixed set
//! of angles, binarizes each rotated copy with Otsu's threshold and asks
//! the decoder for symbols, stopping at the first angle that yields one.

use rayon::prelude::*;

use crate::config::RotationConfig;
use crate::decoder::SymbolDecoder;
use crate::error::Result;
use crate::models::{BitMatrix, DecodeResult, PixelBuffer, Symbol};
use crate::utils::binarization::otsu_binarize_with_threshold;
use crate::utils::rotation::{WHITE, rotate};

/// Result of a search together with how many decode attempts it took
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    /// First decoded symbol and its angle, if any
    pub result: Option<DecodeResult>,
    /// Angles tried, including the successful one
    pub attempts: usize,
}

/// Rotated, grayscale, Otsu-binarized copy of `region`
pub fn binarize_at(region: &PixelBuffer, angle: u32) -> BitMatrix {
    binarize_at_with_threshold(region, angle).0
}

/// Like [`binarize_at`], also returning the Otsu threshold used
pub fn binarize_at_with_threshold(region: &PixelBuffer, angle: u32) -> (BitMatrix, u8) {
    let rotated = rotate(region, angle as f64, WHITE);
    let gray = rotated.to_grayscale();
    otsu_binarize_with_threshold(&gray, rotated.width(), rotated.height())
}

/// Every symbol decoded at the first successful angle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AngleHit {
    /// Angle in degrees
    pub angle: u32,
    /// Symbols in decoder order, never empty
    pub symbols: Vec<Symbol>,
}

/// Rotation search over a fixed angle sweep, generic over the decoder
pub struct RotationSearch<D> {
    decoder: D,
    config: RotationConfig,
}

impl<D: SymbolDecoder> RotationSearch<D> {
    /// Search with the default twelve-angle sweep
    pub fn new(decoder: D) -> Self {
        Self {
            decoder,
            config: RotationConfig::default(),
        }
    }

    /// Search with a custom sweep; the config is validated
    pub fn with_config(decoder: D, config: RotationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { decoder, config })
    }

    /// The angle sweep in use
    pub fn config(&self) -> &RotationConfig {
        &self.config
    }

    /// The decoder backing each attempt
    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    /// First symbol found over the sweep, or `None` when every angle fails
    pub fn search(&self, region: &PixelBuffer) -> Option<DecodeResult> {
        self.search_traced(region).result
    }

    /// Like [`search`](Self::search) but also reports the attempt count
    pub fn search_traced(&self, region: &PixelBuffer) -> SearchOutcome {
        let (hit, attempts) = self.sweep(region);
        let result = hit.and_then(|hit| {
            let angle = hit.angle;
            hit.symbols
                .into_iter()
                .next()
                .map(|symbol| DecodeResult::from_symbol(symbol, angle))
        });
        SearchOutcome { result, attempts }
    }

    /// Every symbol found at the first angle that decodes anything.
    ///
    /// Stops at the same angle as [`search`](Self::search); use this when
    /// a region may hold more than one symbol.
    pub fn search_symbols(&self, region: &PixelBuffer) -> Option<AngleHit> {
        self.sweep(region).0
    }

    fn sweep(&self, region: &PixelBuffer) -> (Option<AngleHit>, usize) {
        let mut attempts = 0;
        for angle in self.config.angles() {
            attempts += 1;
            let symbols = self.attempt_all(region, angle);
            if !symbols.is_empty() {
                log::debug!(
                    "{} symbol(s) decoded at {} degrees after {} attempts",
                    symbols.len(),
                    angle,
                    attempts
                );
                return (Some(AngleHit { angle, symbols }), attempts);
            }
            log::trace!("no symbol at {} degrees", angle);
        }

        log::debug!(
            "no symbol in {}x{} region after {} attempts",
            region.width(),
            region.height(),
            attempts
        );
        (None, attempts)
    }

    /// Single decode attempt at one angle
    pub fn attempt(&self, region: &PixelBuffer, angle: u32) -> Option<Symbol> {
        self.attempt_all(region, angle).into_iter().next()
    }

    /// Every symbol the decoder reports at one angle
    pub fn attempt_all(&self, region: &PixelBuffer, angle: u32) -> Vec<Symbol> {
        self.decoder.decode(&binarize_at(region, angle))
    }

    /// Validate raw pixels, then search them.
    ///
    /// Zero-area or mis-sized buffers fail with `InvalidInput` before any
    /// rotation is attempted.
    pub fn search_raw(
        &self,
        pixels: &[u8],
        width: usize,
        height: usize,
        channels: usize,
    ) -> Result<Option<DecodeResult>> {
        let region = PixelBuffer::from_slice(pixels, width, height, channels)?;
        Ok(self.search(&region))
    }

    /// Decode an encoded image (PNG, JPEG, ...), then search it
    pub fn search_encoded(&self, bytes: &[u8]) -> Result<Option<DecodeResult>> {
        let region = PixelBuffer::from_encoded(bytes)?;
        Ok(self.search(&region))
    }

    /// Search independent regions in parallel; results keep input order
    pub fn search_all(&self, regions: &[PixelBuffer]) -> Vec<Option<DecodeResult>> {
        regions.par_iter().map(|region| self.search(region)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Symbology;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Succeeds on the n-th call (1-based), never when `succeed_on` is 0
    struct NthCall {
        calls: AtomicUsize,
        succeed_on: usize,
    }

    impl NthCall {
        fn new(succeed_on: usize) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                succeed_on,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl SymbolDecoder for NthCall {
        fn name(&self) -> &str {
            "nth-call"
        }

        fn decode(&self, _image: &BitMatrix) -> Vec<Symbol> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call == self.succeed_on {
                vec![
                    Symbol::new("first", Symbology::Qr),
                    Symbol::new("second", Symbology::Ean8),
                ]
            } else {
                Vec::new()
            }
        }
    }

    fn white_region() -> PixelBuffer {
        PixelBuffer::from_raw(vec![255; 16 * 16 * 3], 16, 16, 3).unwrap()
    }

    #[test]
    fn test_short_circuits_at_first_angle() {
        let search = RotationSearch::new(NthCall::new(1));
        let outcome = search.search_traced(&white_region());
        let result = outcome.result.unwrap();
        assert_eq!(result.angle, 0);
        assert_eq!(result.content, b"first");
        assert_eq!(result.symbology, Symbology::Qr);
        assert_eq!(outcome.attempts, 1);
        assert_eq!(search.decoder().calls(), 1);
    }

    #[test]
    fn test_reports_angle_of_success() {
        let search = RotationSearch::new(NthCall::new(4));
        let result = search.search(&white_region()).unwrap();
        assert_eq!(result.angle, 90);
        assert_eq!(search.decoder().calls(), 4);
    }

    #[test]
    fn test_exhausts_every_angle() {
        let search = RotationSearch::new(NthCall::new(0));
        let outcome = search.search_traced(&white_region());
        assert!(outcome.result.is_none());
        assert_eq!(outcome.attempts, 12);
        assert_eq!(search.decoder().calls(), 12);
    }

    #[test]
    fn test_custom_sweep() {
        let config = RotationConfig::new(90, 4).unwrap();
        let search = RotationSearch::with_config(NthCall::new(0), config).unwrap();
        assert_eq!(search.search_traced(&white_region()).attempts, 4);

        let bad = RotationConfig {
            angle_step: 0,
            ..RotationConfig::default()
        };
        assert!(RotationSearch::with_config(NthCall::new(0), bad).is_err());
    }

    #[test]
    fn test_invalid_raw_input_fails_before_decoding() {
        let search = RotationSearch::new(NthCall::new(1));
        let err = search.search_raw(&[], 0, 0, 3).unwrap_err();
        assert!(err.is_invalid_input());
        let err = search.search_raw(&[0; 10], 2, 2, 3).unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(search.decoder().calls(), 0);
    }

    #[test]
    fn test_corrupt_encoded_input_fails_before_decoding() {
        let search = RotationSearch::new(NthCall::new(1));
        let err = search.search_encoded(b"\x89PNG\r\n\x1a\ngarbage").unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(search.decoder().calls(), 0);
    }

    #[test]
    fn test_search_symbols_keeps_every_symbol() {
        let search = RotationSearch::new(NthCall::new(2));
        let hit = search.search_symbols(&white_region()).unwrap();
        assert_eq!(hit.angle, 30);
        let contents: Vec<&[u8]> = hit.symbols.iter().map(|s| s.content.as_slice()).collect();
        assert_eq!(contents, vec![&b"first"[..], &b"second"[..]]);
        assert_eq!(search.decoder().calls(), 2);

        assert!(RotationSearch::new(NthCall::new(0)).search_symbols(&white_region()).is_none());
    }

    #[test]
    fn test_threshold_reported_with_binary() {
        let data: Vec<u8> = (0..16 * 16).map(|i| if i % 16 < 8 { 30 } else { 220 }).collect();
        let region = PixelBuffer::from_raw(data, 16, 16, 1).unwrap();
        let (binary, threshold) = binarize_at_with_threshold(&region, 0);
        assert!(threshold > 30 && threshold <= 220);
        assert_eq!(binary, binarize_at(&region, 0));
        assert!(binary.get(0, 0));
        assert!(!binary.get(15, 0));
    }

    #[test]
    fn test_binarize_at_fills_white() {
        let region = PixelBuffer::from_raw(vec![0; 20 * 10], 20, 10, 1).unwrap();
        let binary = binarize_at(&region, 90);
        assert_eq!(binary.width(), 20);
        assert_eq!(binary.height(), 10);
        // Left and right edges come from outside the source after a quarter turn.
        assert!(!binary.get(0, 5));
        assert!(!binary.get(19, 5));
        assert!(binary.get(10, 5));
    }
}
