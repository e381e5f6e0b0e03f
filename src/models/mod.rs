/// Binary images after thresholding
pub mod matrix;
/// Validated pixel buffers and region rectangles
pub mod pixel_buffer;
/// Floating point coordinates
pub mod point;
/// Decoded symbols and search results
pub mod symbol;

pub use matrix::BitMatrix;
pub use pixel_buffer::{PixelBuffer, RegionRect};
pub use point::Point;
pub use symbol::{DecodeResult, Symbol, Symbology};
