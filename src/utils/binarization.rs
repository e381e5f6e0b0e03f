use crate::models::BitMatrix;

/// Convert grayscale image to binary using Otsu's thresholding method
/// Returns a BitMatrix where true = black, false = white
pub fn otsu_binarize(gray: &[u8], width: usize, height: usize) -> BitMatrix {
    otsu_binarize_with_threshold(gray, width, height).0
}

/// Otsu binarization that also reports the threshold it picked
pub fn otsu_binarize_with_threshold(gray: &[u8], width: usize, height: usize) -> (BitMatrix, u8) {
    let threshold = otsu_threshold(gray);
    (threshold_binarize(gray, width, height, threshold), threshold)
}

/// Calculate Otsu's optimal threshold.
///
/// Pixels strictly below the returned value form the dark class. The
/// threshold maximises the between-class variance, which is the same as
/// minimising the weighted intra-class variance. Ties keep the lowest
/// threshold; a single-valued histogram yields 128.
pub fn otsu_threshold(gray: &[u8]) -> u8 {
    let mut histogram = [0u64; 256];
    for &pixel in gray {
        histogram[pixel as usize] += 1;
    }

    let total = gray.len() as f64;
    let total_sum: f64 = histogram
        .iter()
        .enumerate()
        .map(|(i, &c)| i as f64 * c as f64)
        .sum();

    let mut dark_pixels = 0.0f64;
    let mut dark_sum = 0.0f64;
    let mut max_variance = 0.0f64;
    let mut optimal = 128u8;

    // Threshold t puts intensities 0..t in the dark class.
    for t in 1..=255usize {
        let count = histogram[t - 1] as f64;
        dark_pixels += count;
        dark_sum += (t - 1) as f64 * count;

        let light_pixels = total - dark_pixels;
        if dark_pixels == 0.0 || light_pixels == 0.0 {
            continue;
        }

        let dark_mean = dark_sum / dark_pixels;
        let light_mean = (total_sum - dark_sum) / light_pixels;
        let w_dark = dark_pixels / total;
        let w_light = light_pixels / total;
        let variance = w_dark * w_light * (dark_mean - light_mean).powi(2);

        if variance > max_variance {
            max_variance = variance;
            optimal = t as u8;
        }
    }

    optimal
}

/// Simple global threshold binarization
pub fn threshold_binarize(gray: &[u8], width: usize, height: usize, threshold: u8) -> BitMatrix {
    BitMatrix::from_fn(width, height, |x, y| gray[y * width + x] < threshold)
}
