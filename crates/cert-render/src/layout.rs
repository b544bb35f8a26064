//! Text layout shared by the PDF and raster paths
//!
//! Everything here is in millimetres with a top-left origin. Widths come
//! from the standard-font AFM tables, so both paths break lines and align
//! them identically.

use cert_pdf::{wrap_to_width, StandardFont};
use cert_template::{Align, TextElement};

/// Baseline offset from the element's top edge, as a fraction of font size
pub const BASELINE_FACTOR: f64 = 0.35;

/// Distance between consecutive baselines, as a fraction of font size
pub const LINE_PITCH_FACTOR: f64 = 1.16;

/// A positioned line of text
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    /// Left edge of the line
    pub x_mm: f64,
    /// Baseline, measured from the page top
    pub baseline_mm: f64,
    pub width_mm: f64,
}

/// Standard font used for a text element
pub fn font_for(element: &TextElement) -> StandardFont {
    StandardFont::from_family(&element.font_family, element.bold, element.italic)
}

/// Width of `text` in mm at `size_mm`
pub fn measure_mm(font: &StandardFont, text: &str, size_mm: f64) -> f64 {
    font.text_width_points(text, size_mm)
}

/// Horizontal start of a line of `width_mm`
///
/// `center` ignores `x` and centres on the page; `right` mirrors `x` from
/// the right page edge.
pub fn aligned_x(align: Align, x_mm: f64, width_mm: f64, page_width_mm: f64) -> f64 {
    match align {
        Align::Left => x_mm,
        Align::Center => page_width_mm / 2.0 - width_mm / 2.0,
        Align::Right => page_width_mm - x_mm - width_mm,
    }
}

/// Break `content` to the element's width and position every line
pub fn layout_text(element: &TextElement, content: &str, page_width_mm: f64) -> Vec<TextLine> {
    let font = font_for(element);
    let size = element.font_size_mm;
    let first_baseline = element.y + size * BASELINE_FACTOR;

    wrap_to_width(content, element.width, |s| measure_mm(&font, s, size))
        .into_iter()
        .enumerate()
        .filter(|(_, line)| !line.is_empty())
        .map(|(i, text)| {
            let width_mm = measure_mm(&font, &text, size);
            TextLine {
                x_mm: aligned_x(element.align, element.x, width_mm, page_width_mm),
                baseline_mm: first_baseline + i as f64 * size * LINE_PITCH_FACTOR,
                width_mm,
                text,
            }
        })
        .collect()
}
