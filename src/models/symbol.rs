use std::fmt;

use serde::{Deserialize, Serialize};

/// Barcode family a symbol was decoded as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbology {
    /// QR code (Model 2)
    #[serde(rename = "QR")]
    Qr,
    /// EAN-13 (UPC-A reads as EAN-13 with a leading zero)
    #[serde(rename = "EAN-13")]
    Ean13,
    /// EAN-8
    #[serde(rename = "EAN-8")]
    Ean8,
}

impl Symbology {
    /// Human-readable tag, matching the report's `type` field
    pub fn as_str(&self) -> &'static str {
        match self {
            Symbology::Qr => "QR",
            Symbology::Ean13 => "EAN-13",
            Symbology::Ean8 => "EAN-8",
        }
    }
}

impl fmt::Display for Symbology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A symbol reported by a decoder backend
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
    /// Raw payload bytes
    pub content: Vec<u8>,
    /// Symbology of the payload
    pub symbology: Symbology,
}

impl Symbol {
    /// Create a new symbol
    pub fn new(content: impl Into<Vec<u8>>, symbology: Symbology) -> Self {
        Self {
            content: content.into(),
            symbology,
        }
    }
}

/// Successful rotation search: the first symbol and the angle that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeResult {
    /// Raw payload bytes
    pub content: Vec<u8>,
    /// Symbology of the payload
    pub symbology: Symbology,
    /// Rotation in degrees (counter-clockwise) applied before the decode
    pub angle: u32,
}

impl DecodeResult {
    /// Build a result from a decoded symbol and the angle it was found at
    pub fn from_symbol(symbol: Symbol, angle: u32) -> Self {
        Self {
            content: symbol.content,
            symbology: symbol.symbology,
            angle,
        }
    }

    /// Payload as text, replacing invalid UTF-8
    pub fn content_lossy(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }
}
