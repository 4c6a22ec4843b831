//! FILENAME: core/engine/src/text.rs
//! PURPOSE: Approximate text measurement.
//! CONTEXT: Real glyph metrics belong to the canvas layer. Layout still needs a
//! deterministic width estimate for adaptive columns and for cells that align
//! extra shapes next to their text, so we use per-character advance ratios.

use crate::style::{FontWeight, TextStyle};

/// Advance of a narrow (Latin/digit) glyph as a fraction of the font size.
const NARROW_RATIO: f64 = 0.6;
/// Advance of a wide (CJK / full-width) glyph as a fraction of the font size.
const WIDE_RATIO: f64 = 1.0;
/// Extra advance for bold text.
const BOLD_FACTOR: f64 = 1.05;

fn is_wide(c: char) -> bool {
    matches!(c as u32,
        0x1100..=0x115F
        | 0x2E80..=0xA4CF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFE30..=0xFE4F
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6
        | 0x20000..=0x3FFFD)
}

/// Estimated rendered width of `text` at `font_size`.
pub fn measure_text_width(text: &str, font_size: f64) -> f64 {
    text.chars()
        .map(|c| if is_wide(c) { WIDE_RATIO } else { NARROW_RATIO })
        .sum::<f64>()
        * font_size
}

/// Estimated rendered width of `text` drawn with `style`.
pub fn measure_styled_text(text: &str, style: &TextStyle) -> f64 {
    let width = measure_text_width(text, style.font_size);
    match style.font_weight {
        FontWeight::Bold => width * BOLD_FACTOR,
        FontWeight::Normal => width,
    }
}
