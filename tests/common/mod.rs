//! Synthetic barcode images for the integration tests

#![allow(dead_code)]

use rust_barcode::PixelBuffer;
use rust_barcode::decoder::ean::encode_ean13;
use std::io::Cursor;

/// Pixels per module
pub const MODULE_PX: usize = 3;
/// Side of the square canvas every symbol is drawn on
pub const CANVAS: usize = 360;
/// Bar length; short enough that only a quarter turn lines a row up with every bar
pub const BAR_LEN: usize = 40;

const INK: u8 = 20;
const PAPER: u8 = 235;

/// Which way the bars of a rendered symbol run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bars {
    /// Bars run top to bottom (readable without rotation)
    Vertical,
    /// Bars run left to right (readable after a quarter turn)
    Horizontal,
}

/// Grayscale canvas with `code` centered on it
pub fn ean13_gray(code: &str, bars: Bars) -> Vec<u8> {
    let modules = encode_ean13(code).expect("valid EAN-13");
    let span = modules.len() * MODULE_PX;
    let start = (CANVAS - span) / 2;
    let bar_start = (CANVAS - BAR_LEN) / 2;

    let mut gray = vec![PAPER; CANVAS * CANVAS];
    for y in 0..CANVAS {
        for x in 0..CANVAS {
            let (along, across) = match bars {
                Bars::Vertical => (x, y),
                Bars::Horizontal => (y, x),
            };
            if along < start || along >= start + span {
                continue;
            }
            if across < bar_start || across >= bar_start + BAR_LEN {
                continue;
            }
            if modules[(along - start) / MODULE_PX] {
                gray[y * CANVAS + x] = INK;
            }
        }
    }
    gray
}

/// Pixels per QR module
pub const QR_MODULE_PX: usize = 4;

/// Grayscale canvas with a QR symbol carrying `data` centered on it
pub fn qr_gray(data: &[u8]) -> Vec<u8> {
    let code = qrcode::QrCode::new(data).expect("payload fits a QR symbol");
    let side = code.width();
    let colors = code.to_colors();
    let start = (CANVAS - side * QR_MODULE_PX) / 2;

    let mut gray = vec![PAPER; CANVAS * CANVAS];
    for my in 0..side {
        for mx in 0..side {
            if colors[my * side + mx] != qrcode::Color::Dark {
                continue;
            }
            for dy in 0..QR_MODULE_PX {
                let row = (start + my * QR_MODULE_PX + dy) * CANVAS;
                let col = start + mx * QR_MODULE_PX;
                gray[row + col..row + col + QR_MODULE_PX].fill(INK);
            }
        }
    }
    gray
}

/// Single-channel buffer from a grayscale image
pub fn gray_region(gray: Vec<u8>, width: usize, height: usize) -> PixelBuffer {
    PixelBuffer::from_raw(gray, width, height, 1).expect("valid canvas")
}

/// RGB canvas with `code` centered on it
pub fn ean13_region(code: &str, bars: Bars) -> PixelBuffer {
    let rgb: Vec<u8> = ean13_gray(code, bars)
        .into_iter()
        .flat_map(|v| [v, v, v])
        .collect();
    PixelBuffer::from_raw(rgb, CANVAS, CANVAS, 3).expect("valid canvas")
}

/// Blank RGB canvas
pub fn blank_region() -> PixelBuffer {
    PixelBuffer::from_raw(vec![PAPER; CANVAS * CANVAS * 3], CANVAS, CANVAS, 3)
        .expect("valid canvas")
}

/// Place canvases side by side with a `gap` of paper between them
pub fn side_by_side(left: &[u8], right: &[u8], gap: usize) -> (Vec<u8>, usize, usize) {
    let width = 2 * CANVAS + gap;
    let mut gray = vec![PAPER; width * CANVAS];
    for y in 0..CANVAS {
        let row = y * width;
        gray[row..row + CANVAS].copy_from_slice(&left[y * CANVAS..(y + 1) * CANVAS]);
        let right_start = row + CANVAS + gap;
        gray[right_start..right_start + CANVAS]
            .copy_from_slice(&right[y * CANVAS..(y + 1) * CANVAS]);
    }
    (gray, width, CANVAS)
}

/// PNG bytes of a grayscale image
pub fn encode_png(gray: Vec<u8>, width: usize, height: usize) -> Vec<u8> {
    let image = image::GrayImage::from_raw(width as u32, height as u32, gray)
        .expect("buffer matches dimensions");
    let mut bytes = Cursor::new(Vec::new());
    image::DynamicImage::ImageLuma8(image)
        .write_to(&mut bytes, image::ImageOutputFormat::Png)
        .expect("png encoding");
    bytes.into_inner()
}
