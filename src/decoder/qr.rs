use super::SymbolDecoder;
use crate::models::{BitMatrix, Symbol, Symbology};

/// Smallest QR symbol (version 1) is 21 modules wide
const MIN_QR_SIDE: usize = 21;

/// QR code decoder backed by `rqrr`
#[derive(Debug, Clone, Copy, Default)]
pub struct QrDecoder;

impl QrDecoder {
    /// Create a new QR decoder
    pub fn new() -> Self {
        Self
    }
}

impl SymbolDecoder for QrDecoder {
    fn name(&self) -> &str {
        "qr"
    }

    fn decode(&self, image: &BitMatrix) -> Vec<Symbol> {
        let (width, height) = (image.width(), image.height());
        if width < MIN_QR_SIDE || height < MIN_QR_SIDE {
            return Vec::new();
        }

        let luma = image.to_luma();
        let mut prepared =
            rqrr::PreparedImage::prepare_from_greyscale(width, height, |x, y| luma[y * width + x]);

        let mut symbols = Vec::new();
        for grid in prepared.detect_grids() {
            // Raw payload bytes; byte-mode data need not be UTF-8.
            let mut content = Vec::new();
            match grid.decode_to(&mut content) {
                Ok(_meta) => {
                    log::debug!("QR grid decoded: {} bytes", content.len());
                    symbols.push(Symbol::new(content, Symbology::Qr));
                }
                Err(err) => log::trace!("QR grid rejected: {:?}", err),
            }
        }
        symbols
    }
}
