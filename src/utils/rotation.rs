//! Affine rotation about the image center
//!
//! Rotation keeps the source dimensions: content that leaves the frame is
//! discarded and uncovered pixels are filled with a constant color.
//! Positive angles turn the content counter-clockwise as seen on screen
//! (y axis pointing down), matching the usual `getRotationMatrix2D`
//! convention.

use crate::models::{PixelBuffer, Point};

/// Border fill used by the rotation search
pub const WHITE: u8 = 255;

/// Cosine and sine for `degrees`, exact for quarter turns so 90/180/270
/// map pixel centers onto pixel centers without interpolation blur.
fn rotation_trig(degrees: f64) -> (f64, f64) {
    let normalized = degrees.rem_euclid(360.0);
    if normalized == 0.0 {
        (1.0, 0.0)
    } else if normalized == 90.0 {
        (0.0, 1.0)
    } else if normalized == 180.0 {
        (-1.0, 0.0)
    } else if normalized == 270.0 {
        (0.0, -1.0)
    } else {
        let rad = normalized.to_radians();
        (rad.cos(), rad.sin())
    }
}

/// Rotate `src` by `degrees` about its center with bilinear interpolation.
///
/// Returns a new buffer of the same size and channel count; `src` is not
/// touched. Pixels whose source position falls outside the image blend
/// toward `fill`.
pub fn rotate(src: &PixelBuffer, degrees: f64, fill: u8) -> PixelBuffer {
    let (width, height, channels) = (src.width(), src.height(), src.channels());
    let (cos, sin) = rotation_trig(degrees);
    if cos == 1.0 {
        return src.clone();
    }

    let center = Point::grid_center(width, height);
    let mut out = PixelBuffer::filled(width, height, channels, fill);
    let data = src.as_bytes();
    let dst = out.as_bytes_mut();

    let fetch = |x: isize, y: isize, c: usize| -> f64 {
        if x < 0 || y < 0 || x as usize >= width || y as usize >= height {
            fill as f64
        } else {
            data[(y as usize * width + x as usize) * channels + c] as f64
        }
    };

    for y in 0..height {
        let dy = y as f64 - center.y;
        for x in 0..width {
            let dx = x as f64 - center.x;
            // Inverse map: where in the source does this output pixel come from.
            let sx = center.x + cos * dx - sin * dy;
            let sy = center.y + sin * dx + cos * dy;

            if sx <= -1.0 || sy <= -1.0 || sx >= width as f64 || sy >= height as f64 {
                continue;
            }

            let x0 = sx.floor();
            let y0 = sy.floor();
            let fx = sx - x0;
            let fy = sy - y0;
            let (ix, iy) = (x0 as isize, y0 as isize);

            let base = (y * width + x) * channels;
            for c in 0..channels {
                let top = fetch(ix, iy, c) * (1.0 - fx) + fetch(ix + 1, iy, c) * fx;
                let bottom = fetch(ix, iy + 1, c) * (1.0 - fx) + fetch(ix + 1, iy + 1, c) * fx;
                let value = top * (1.0 - fy) + bottom * fy;
                dst[base + c] = value.round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    out
}
