//! Glyph rasterization for surfaces
//!
//! Glyph positions always follow the standard-font advance widths so the
//! raster and PDF outputs break and align lines the same way. Glyph shapes
//! come from TrueType fonts registered per family; without one, a scaled
//! Spleen bitmap font stands in.

use crate::{RenderError, Result};
use ab_glyph::{Font, FontArc, PxScale};
use cert_pdf::StandardFont;
use spleen_font::{PSF2Font, FONT_12X24};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Height of the bitmap fallback cell above the baseline, as a fraction of font size
const BITMAP_ASCENT: f64 = 0.8;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FaceKey {
    family: String,
    bold: bool,
    italic: bool,
}

fn family_key(family: &str) -> String {
    family
        .split(',')
        .next()
        .unwrap_or_default()
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .to_ascii_lowercase()
}

/// TrueType faces available to surfaces, keyed by family and style
///
/// Metric-compatible faces (Liberation Sans/Serif/Mono for Helvetica,
/// Times and Courier) give the closest match to the PDF output.
#[derive(Clone)]
pub struct FontBook {
    faces: HashMap<FaceKey, FontArc>,
    /// Spleen fallback, parsed once and shared between clones
    bitmap: Option<Rc<RefCell<PSF2Font<'static>>>>,
}

impl Default for FontBook {
    fn default() -> Self {
        Self {
            faces: HashMap::new(),
            bitmap: PSF2Font::new(FONT_12X24)
                .map_err(|e| log::warn!("Bitmap fallback font unavailable: {e}"))
                .ok()
                .map(|font| Rc::new(RefCell::new(font))),
        }
    }
}

impl fmt::Debug for FontBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontBook")
            .field("faces", &self.faces.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl FontBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a TrueType/OpenType face for a family name
    ///
    /// # Arguments
    /// * `family` - Family name as used in templates (case-insensitive)
    /// * `bold`, `italic` - Style this face provides
    /// * `bytes` - Font file contents
    pub fn register(&mut self, family: &str, bold: bool, italic: bool, bytes: Vec<u8>) -> Result<()> {
        let font = FontArc::try_from_vec(bytes)
            .map_err(|e| RenderError::Input(format!("Invalid font data for '{family}': {e}")))?;

        self.faces.insert(
            FaceKey {
                family: family_key(family),
                bold,
                italic,
            },
            font,
        );
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Best face for a family: exact style, then bold only, then regular
    fn face(&self, family: &str, bold: bool, italic: bool) -> Option<&FontArc> {
        let family = family_key(family);
        [(bold, italic), (bold, false), (false, false)]
            .into_iter()
            .find_map(|(bold, italic)| {
                self.faces.get(&FaceKey {
                    family: family.clone(),
                    bold,
                    italic,
                })
            })
    }

    /// Rasterize one line of text
    ///
    /// `plot(x, y, coverage)` receives pixels relative to the line start on
    /// the baseline.
    pub(crate) fn draw_run<F>(
        &self,
        family: &str,
        metrics: &StandardFont,
        text: &str,
        size_px: f64,
        mut plot: F,
    ) where
        F: FnMut(i32, i32, f32),
    {
        let face = self.face(family, metrics.bold, metrics.italic);
        let mut bitmap_font = self.bitmap.as_ref().map(|font| font.borrow_mut());
        let mut pen_x = 0.0;

        for c in text.chars() {
            let advance = metrics.char_width(c) as f64 / 1000.0 * size_px;

            if !c.is_whitespace() {
                let drawn = face
                    .map(|font| draw_outline(font, c, pen_x, size_px, &mut plot))
                    .unwrap_or(false);

                if !drawn {
                    if let Some(bitmap_font) = bitmap_font.as_deref_mut() {
                        draw_bitmap(bitmap_font, c, pen_x, advance, size_px, &mut plot);
                    }
                }
            }

            pen_x += advance;
        }
    }
}

/// Draw `c` from a TrueType face; false when the face lacks the glyph
fn draw_outline<F>(font: &FontArc, c: char, pen_x: f64, size_px: f64, plot: &mut F) -> bool
where
    F: FnMut(i32, i32, f32),
{
    let glyph_id = font.glyph_id(c);
    if glyph_id.0 == 0 {
        return false;
    }

    let units_per_em = font.units_per_em().unwrap_or(1000.0);
    let scale = PxScale::from(size_px as f32 * font.height_unscaled() / units_per_em);
    let glyph = glyph_id.with_scale_and_position(scale, ab_glyph::point(pen_x as f32, 0.0));

    if let Some(outlined) = font.outline_glyph(glyph) {
        let bounds = outlined.px_bounds();
        outlined.draw(|gx, gy, coverage| {
            plot(
                bounds.min.x as i32 + gx as i32,
                bounds.min.y as i32 + gy as i32,
                coverage,
            );
        });
    }
    true
}

/// Draw `c` from the bitmap font, stretched to `advance × size_px`
fn draw_bitmap<F>(font: &mut PSF2Font, c: char, pen_x: f64, advance: f64, size_px: f64, plot: &mut F)
where
    F: FnMut(i32, i32, f32),
{
    let mut utf8 = [0u8; 4];
    let Some(glyph) = font.glyph_for_utf8(c.encode_utf8(&mut utf8).as_bytes()) else {
        return;
    };
    let rows: Vec<Vec<bool>> = glyph.map(|row| row.collect()).collect();
    let src_h = rows.len();
    let src_w = rows.first().map(Vec::len).unwrap_or(0);
    if src_w == 0 || src_h == 0 {
        return;
    }

    let cell_w = advance.ceil().max(1.0) as usize;
    let cell_h = size_px.ceil().max(1.0) as usize;
    let left = pen_x.round() as i32;
    let top = (-BITMAP_ASCENT * size_px).round() as i32;

    for dy in 0..cell_h {
        let sy = dy * src_h / cell_h;
        for dx in 0..cell_w {
            let sx = dx * src_w / cell_w;
            if rows[sy].get(sx).copied().unwrap_or(false) {
                plot(left + dx as i32, top + dy as i32, 1.0);
            }
        }
    }
}
