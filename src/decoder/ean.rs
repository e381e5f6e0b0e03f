//! EAN-13 / EAN-8 decoding from horizontal scanlines
//!
//! Each scanned row is run-length encoded into alternating bar/space
//! widths. A symbol is accepted when a start guard preceded by a quiet
//! zone is followed by the full digit layout, matching middle and end
//! guards, and a valid check digit. Rows are read in both directions.
//!
//! Only rows are scanned: a barcode whose bars run horizontally is not
//! readable here, which is what the rotation search is for.

use super::SymbolDecoder;
use crate::models::{BitMatrix, Symbol, Symbology};

/// Element widths (space, bar, space, bar) of the L-code digits 0-9.
/// G codes are the same widths reversed; R codes are L widths starting with a bar.
const L_PATTERNS: [[u8; 4]; 10] = [
    [3, 2, 1, 1],
    [2, 2, 2, 1],
    [2, 1, 2, 2],
    [1, 4, 1, 1],
    [1, 1, 3, 2],
    [1, 2, 3, 1],
    [1, 1, 1, 4],
    [1, 3, 1, 2],
    [1, 2, 1, 3],
    [3, 1, 1, 2],
];

/// L/G parity of the six left-hand EAN-13 digits, indexed by the implied
/// leading digit. Bit `5 - i` set means digit `i` uses a G code.
const FIRST_DIGIT_PARITY: [u8; 10] = [0x00, 0x0B, 0x0D, 0x0E, 0x13, 0x19, 0x1C, 0x15, 0x16, 0x1A];

const MAX_AVG_VARIANCE: f64 = 0.48;
const MAX_INDIVIDUAL_VARIANCE: f64 = 0.7;
const QUIET_ZONE_MODULES: f64 = 3.0;
const MODULE_RATIO_MIN: f64 = 0.6;
const MODULE_RATIO_MAX: f64 = 1.6;

/// guard(3) + 6 digits(24) + middle(5) + 6 digits(24) + guard(3)
const EAN13_RUNS: usize = 59;
/// guard(3) + 4 digits(16) + middle(5) + 4 digits(16) + guard(3)
const EAN8_RUNS: usize = 43;

const DEFAULT_MAX_SCANLINES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Run {
    black: bool,
    width: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Parity {
    L,
    G,
}

/// EAN-13 and EAN-8 decoder
#[derive(Debug, Clone, Copy)]
pub struct EanDecoder {
    max_scanlines: usize,
}

impl EanDecoder {
    /// Decoder scanning up to 32 rows per image
    pub fn new() -> Self {
        Self {
            max_scanlines: DEFAULT_MAX_SCANLINES,
        }
    }

    /// Decoder scanning up to `max_scanlines` rows (at least one)
    pub fn with_max_scanlines(max_scanlines: usize) -> Self {
        Self {
            max_scanlines: max_scanlines.max(1),
        }
    }

    /// Maximum number of rows tried per image
    pub fn max_scanlines(&self) -> usize {
        self.max_scanlines
    }
}

impl Default for EanDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolDecoder for EanDecoder {
    fn name(&self) -> &str {
        "ean"
    }

    fn decode(&self, image: &BitMatrix) -> Vec<Symbol> {
        let mut symbols: Vec<Symbol> = Vec::new();
        for y in scan_rows(image.height(), self.max_scanlines) {
            let runs = row_runs(image, y);
            for symbol in decode_scanline(&runs) {
                if !symbols.contains(&symbol) {
                    log::debug!(
                        "{} '{}' found on row {}",
                        symbol.symbology,
                        String::from_utf8_lossy(&symbol.content),
                        y
                    );
                    symbols.push(symbol);
                }
            }
        }
        symbols
    }
}

/// Rows to scan: the middle row first, then alternating outward
fn scan_rows(height: usize, max_scanlines: usize) -> Vec<usize> {
    if height == 0 {
        return Vec::new();
    }
    let max_scanlines = max_scanlines.max(1);
    let step = (height / max_scanlines).max(1);
    let mid = height / 2;

    let mut rows = vec![mid];
    let mut k = 1;
    while rows.len() < max_scanlines {
        let above = mid.checked_sub(k * step);
        let below = Some(mid + k * step).filter(|&r| r < height);
        if above.is_none() && below.is_none() {
            break;
        }
        for row in [above, below].into_iter().flatten() {
            if rows.len() < max_scanlines {
                rows.push(row);
            }
        }
        k += 1;
    }
    rows
}

fn row_runs(image: &BitMatrix, y: usize) -> Vec<Run> {
    let mut runs: Vec<Run> = Vec::new();
    for x in 0..image.width() {
        let black = image.get(x, y);
        match runs.last_mut() {
            Some(run) if run.black == black => run.width += 1,
            _ => runs.push(Run { black, width: 1 }),
        }
    }
    runs
}

/// Every symbol on one row, read left to right and then right to left
fn decode_scanline(runs: &[Run]) -> Vec<Symbol> {
    let mut symbols = decode_runs(runs);
    let reversed: Vec<Run> = runs.iter().rev().copied().collect();
    for symbol in decode_runs(&reversed) {
        if !symbols.contains(&symbol) {
            symbols.push(symbol);
        }
    }
    symbols
}

fn decode_runs(runs: &[Run]) -> Vec<Symbol> {
    let mut symbols = Vec::new();
    let mut start = 1;
    while start < runs.len() {
        if runs[start].black {
            let hit = decode_ean13(runs, start)
                .map(|s| (s, EAN13_RUNS))
                .or_else(|| decode_ean8(runs, start).map(|s| (s, EAN8_RUNS)));
            if let Some((symbol, len)) = hit {
                symbols.push(symbol);
                start += len;
                continue;
            }
        }
        start += 1;
    }
    symbols
}

/// Average normalized deviation of `widths` from `pattern`, or infinity
/// when any single element is too far off.
fn pattern_variance(widths: &[usize], pattern: &[u8]) -> f64 {
    let total: usize = widths.iter().sum();
    let modules: usize = pattern.iter().map(|&p| p as usize).sum();
    if total == 0 || modules == 0 {
        return f64::INFINITY;
    }

    let unit = total as f64 / modules as f64;
    let max_individual = MAX_INDIVIDUAL_VARIANCE * unit;
    let mut variance = 0.0;
    for (&w, &p) in widths.iter().zip(pattern) {
        let v = (w as f64 - p as f64 * unit).abs();
        if v > max_individual {
            return f64::INFINITY;
        }
        variance += v;
    }
    variance / total as f64
}

/// Best matching digit for four element widths
fn decode_digit(widths: &[usize], allow_g: bool) -> Option<(u8, Parity)> {
    let mut best = None;
    let mut best_variance = MAX_AVG_VARIANCE;
    for (digit, pattern) in L_PATTERNS.iter().enumerate() {
        let v = pattern_variance(widths, pattern);
        if v < best_variance {
            best_variance = v;
            best = Some((digit as u8, Parity::L));
        }
        if allow_g {
            let mut g = *pattern;
            g.reverse();
            let v = pattern_variance(widths, &g);
            if v < best_variance {
                best_variance = v;
                best = Some((digit as u8, Parity::G));
            }
        }
    }
    best
}

/// Module width implied by a run of single-module guard elements
fn guard_module(widths: &[usize]) -> Option<f64> {
    let ones = [1u8; 5];
    if pattern_variance(widths, &ones[..widths.len()]) >= MAX_AVG_VARIANCE {
        return None;
    }
    Some(widths.iter().sum::<usize>() as f64 / widths.len() as f64)
}

fn module_consistent(widths: &[usize], modules: usize, module: f64) -> bool {
    let unit = widths.iter().sum::<usize>() as f64 / modules as f64;
    (MODULE_RATIO_MIN..=MODULE_RATIO_MAX).contains(&(unit / module))
}

/// Both sides need a white run; a symbol cut off by the image edge has none
fn has_quiet_zones(runs: &[Run], start: usize, len: usize, module: f64) -> bool {
    let min_width = QUIET_ZONE_MODULES * module;
    let quiet = |run: Option<&Run>| run.is_some_and(|r| !r.black && r.width as f64 >= min_width);
    quiet(start.checked_sub(1).and_then(|i| runs.get(i))) && quiet(runs.get(start + len))
}

/// Decode `count` consecutive 4-element digits starting at `offset`
fn decode_digits(
    widths: &[usize],
    offset: usize,
    count: usize,
    allow_g: bool,
    module: f64,
    digits: &mut Vec<u8>,
    parities: &mut Vec<Parity>,
) -> Option<()> {
    for d in 0..count {
        let element = &widths[offset + d * 4..offset + d * 4 + 4];
        if !module_consistent(element, 7, module) {
            return None;
        }
        let (digit, parity) = decode_digit(element, allow_g)?;
        digits.push(digit);
        parities.push(parity);
    }
    Some(())
}

fn layout_widths(runs: &[Run], start: usize, len: usize) -> Option<Vec<usize>> {
    if start == 0 || start + len > runs.len() || !runs[start].black {
        return None;
    }
    Some(runs[start..start + len].iter().map(|r| r.width).collect())
}

fn decode_ean13(runs: &[Run], start: usize) -> Option<Symbol> {
    let widths = layout_widths(runs, start, EAN13_RUNS)?;
    let module = guard_module(&widths[0..3])?;
    if !has_quiet_zones(runs, start, EAN13_RUNS, module) {
        return None;
    }

    let mut digits = Vec::with_capacity(13);
    let mut parities = Vec::with_capacity(12);
    decode_digits(&widths, 3, 6, true, module, &mut digits, &mut parities)?;
    guard_module(&widths[27..32])?;
    decode_digits(&widths, 32, 6, false, module, &mut digits, &mut parities)?;
    guard_module(&widths[56..59])?;

    let parity_bits = parities[..6]
        .iter()
        .enumerate()
        .filter(|(_, p)| **p == Parity::G)
        .fold(0u8, |acc, (i, _)| acc | (1 << (5 - i)));
    let first = FIRST_DIGIT_PARITY.iter().position(|&p| p == parity_bits)?;
    digits.insert(0, first as u8);

    checksum_ok(&digits).then(|| Symbol::new(digits_to_text(&digits), Symbology::Ean13))
}

fn decode_ean8(runs: &[Run], start: usize) -> Option<Symbol> {
    let widths = layout_widths(runs, start, EAN8_RUNS)?;
    let module = guard_module(&widths[0..3])?;
    if !has_quiet_zones(runs, start, EAN8_RUNS, module) {
        return None;
    }

    let mut digits = Vec::with_capacity(8);
    let mut parities = Vec::with_capacity(8);
    decode_digits(&widths, 3, 4, false, module, &mut digits, &mut parities)?;
    guard_module(&widths[19..24])?;
    decode_digits(&widths, 24, 4, false, module, &mut digits, &mut parities)?;
    guard_module(&widths[40..43])?;

    checksum_ok(&digits).then(|| Symbol::new(digits_to_text(&digits), Symbology::Ean8))
}

/// Check digit for an EAN payload: weights 3, 1, 3, ... from the right
fn check_digit(payload: &[u8]) -> u8 {
    let sum: u32 = payload
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| d as u32 * if i % 2 == 0 { 3 } else { 1 })
        .sum();
    ((10 - sum % 10) % 10) as u8
}

fn checksum_ok(digits: &[u8]) -> bool {
    match digits.split_last() {
        Some((&check, payload)) => check_digit(payload) == check,
        None => false,
    }
}

fn digits_to_text(digits: &[u8]) -> String {
    digits.iter().map(|d| char::from(b'0' + d)).collect()
}

fn parse_digits(text: &str, payload_len: usize) -> Option<Vec<u8>> {
    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let mut digits: Vec<u8> = text.bytes().map(|b| b - b'0').collect();
    if digits.len() == payload_len {
        digits.push(check_digit(&digits));
    } else if digits.len() != payload_len + 1 || !checksum_ok(&digits) {
        return None;
    }
    Some(digits)
}

fn push_elements(bits: &mut Vec<bool>, widths: &[u8], first_black: bool) {
    let mut black = first_black;
    for &w in widths {
        bits.extend(std::iter::repeat_n(black, w as usize));
        black = !black;
    }
}

fn ean13_modules(digits: &[u8]) -> Vec<bool> {
    let parity = FIRST_DIGIT_PARITY[digits[0] as usize];
    let mut bits = Vec::with_capacity(95);
    push_elements(&mut bits, &[1, 1, 1], true);
    for (i, &d) in digits[1..7].iter().enumerate() {
        let mut widths = L_PATTERNS[d as usize];
        if parity & (1 << (5 - i)) != 0 {
            widths.reverse();
        }
        push_elements(&mut bits, &widths, false);
    }
    push_elements(&mut bits, &[1, 1, 1, 1, 1], false);
    for &d in &digits[7..13] {
        push_elements(&mut bits, &L_PATTERNS[d as usize], true);
    }
    push_elements(&mut bits, &[1, 1, 1], true);
    bits
}

fn ean8_modules(digits: &[u8]) -> Vec<bool> {
    let mut bits = Vec::with_capacity(67);
    push_elements(&mut bits, &[1, 1, 1], true);
    for &d in &digits[0..4] {
        push_elements(&mut bits, &L_PATTERNS[d as usize], false);
    }
    push_elements(&mut bits, &[1, 1, 1, 1, 1], false);
    for &d in &digits[4..8] {
        push_elements(&mut bits, &L_PATTERNS[d as usize], true);
    }
    push_elements(&mut bits, &[1, 1, 1], true);
    bits
}

/// Module sequence (true = bar) for an EAN-13 number, guards included.
///
/// Accepts 12 digits (check digit appended) or 13 digits with a valid
/// check digit. Quiet zones are left to the caller.
pub fn encode_ean13(text: &str) -> Option<Vec<bool>> {
    parse_digits(text, 12).map(|digits| ean13_modules(&digits))
}

/// Module sequence (true = bar) for an EAN-8 number, guards included.
///
/// Accepts 7 digits (check digit appended) or 8 digits with a valid
/// check digit.
pub fn encode_ean8(text: &str) -> Option<Vec<bool>> {
    parse_digits(text, 7).map(|digits| ean8_modules(&digits))
}
