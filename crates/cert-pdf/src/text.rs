//! Text rendering utilities

use crate::document::Color;

/// Context for rendering text
pub struct TextRenderContext {
    /// PDF font resource name (e.g., "F1")
    pub font_resource: String,
    /// Font size in points
    pub font_size: f64,
    /// Text color (RGB)
    pub color: Color,
}

/// Encode text for a WinAnsiEncoding simple font
///
/// Latin-1 characters map to their own code; the few WinAnsi extras
/// (curly quotes, dashes, euro, bullet, ellipsis) are mapped explicitly.
/// Anything else becomes `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    let mut replaced = 0usize;
    let encoded: Vec<u8> = text
        .chars()
        .map(|c| match c {
            '\u{20AC}' => 0x80,
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            c if (c as u32) < 0x80 => c as u8,
            c if (0xA0..=0xFF).contains(&(c as u32)) => c as u8,
            _ => {
                replaced += 1;
                b'?'
            }
        })
        .collect();

    if replaced > 0 {
        log::warn!("{replaced} character(s) of '{text}' have no WinAnsi code and were replaced with '?'");
    }
    encoded
}

/// Generate PDF operators for text insertion
///
/// Creates the PDF text operators (BT, rg, Tf, Td, Tj, ET) that draw
/// `encoded` with its baseline starting at `(x, y)`.
///
/// # Arguments
/// * `encoded` - WinAnsi-encoded text bytes
/// * `x` - X coordinate in points (PDF coordinates, from left)
/// * `y` - Baseline Y coordinate in points (PDF coordinates, from bottom)
/// * `ctx` - Text rendering context
pub fn generate_text_operators(encoded: &[u8], x: f64, y: f64, ctx: &TextRenderContext) -> Vec<u8> {
    let hex: String = encoded.iter().map(|b| format!("{b:02X}")).collect();

    let mut ops = String::new();
    ops.push_str("BT\n");
    ops.push_str(&format!(
        "{} {} {} rg\n",
        ctx.color.r, ctx.color.g, ctx.color.b
    ));
    ops.push_str(&format!("/{} {} Tf\n", ctx.font_resource, ctx.font_size));
    ops.push_str(&format!("{x} {y} Td\n"));
    ops.push_str(&format!("<{hex}> Tj\n"));
    ops.push_str("ET\n");

    ops.into_bytes()
}

/// Split text into lines no wider than `max_width`
///
/// Explicit newlines always break. Words are never split, so a single word
/// wider than `max_width` gets a line of its own. A non-positive
/// `max_width` disables wrapping.
pub fn wrap_to_width<F>(text: &str, max_width: f64, measure: F) -> Vec<String>
where
    F: Fn(&str) -> f64,
{
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        if max_width <= 0.0 {
            lines.push(paragraph.to_string());
            continue;
        }

        let mut current_line = String::new();
        for word in paragraph.split_whitespace() {
            if current_line.is_empty() {
                current_line = word.to_string();
                continue;
            }

            let candidate = format!("{current_line} {word}");
            if measure(&candidate) <= max_width {
                current_line = candidate;
            } else {
                lines.push(std::mem::replace(&mut current_line, word.to_string()));
            }
        }
        lines.push(current_line);
    }

    lines
}
