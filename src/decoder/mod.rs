//! Symbol decoders run against a binarized image
//!
//! The rotation search only needs "binary image in, symbols out", so every
//! concrete backend sits behind [`SymbolDecoder`]:
//! - [`EanDecoder`]: EAN-13 / EAN-8 from horizontal scanlines
//! - [`QrDecoder`]: QR codes via `rqrr`
//! - [`CompositeDecoder`]: runs several backends in order

/// EAN-13 / EAN-8 scanline decoder
pub mod ean;
/// QR decoding backed by `rqrr`
pub mod qr;

pub use ean::EanDecoder;
pub use qr::QrDecoder;

use crate::models::{BitMatrix, Symbol};

/// Capability to find and decode symbols in a black/white image
pub trait SymbolDecoder: Send + Sync {
    /// Short backend name used in logs
    fn name(&self) -> &str;

    /// Decode every symbol visible in `image` (true = black).
    ///
    /// An empty vector means nothing was found; backends never fail.
    fn decode(&self, image: &BitMatrix) -> Vec<Symbol>;
}

impl<T: SymbolDecoder + ?Sized> SymbolDecoder for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn decode(&self, image: &BitMatrix) -> Vec<Symbol> {
        (**self).decode(image)
    }
}

impl<T: SymbolDecoder + ?Sized> SymbolDecoder for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn decode(&self, image: &BitMatrix) -> Vec<Symbol> {
        (**self).decode(image)
    }
}

/// Chains decoders; symbols are returned in backend order
pub struct CompositeDecoder {
    backends: Vec<Box<dyn SymbolDecoder>>,
}

impl CompositeDecoder {
    /// An empty chain that never decodes anything
    pub fn new() -> Self {
        Self {
            backends: Vec::new(),
        }
    }

    /// Append a backend to the chain
    pub fn with<D: SymbolDecoder + 'static>(mut self, decoder: D) -> Self {
        self.backends.push(Box::new(decoder));
        self
    }

    /// Number of backends in the chain
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// True when no backend is configured
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

impl Default for CompositeDecoder {
    /// QR first, then EAN
    fn default() -> Self {
        Self::new().with(QrDecoder::new()).with(EanDecoder::new())
    }
}

impl SymbolDecoder for CompositeDecoder {
    fn name(&self) -> &str {
        "composite"
    }

    fn decode(&self, image: &BitMatrix) -> Vec<Symbol> {
        let mut symbols = Vec::new();
        for backend in &self.backends {
            let found = backend.decode(image);
            log::trace!("{} backend found {} symbols", backend.name(), found.len());
            symbols.extend(found);
        }
        symbols
    }
}
