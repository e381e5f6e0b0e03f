//! Image processing helpers used by the rotation search
//!
//! - Grayscale conversion (RGB/RGBA to luminance)
//! - Binarization (Otsu's method and fixed threshold)
//! - Rotation (affine, bilinear, constant white border)

pub mod binarization;
pub mod grayscale;
pub mod rotation;
