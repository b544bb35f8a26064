//! Standard (base-14) PDF fonts and their width metrics
//!
//! Certificates are rendered with the fonts every PDF viewer ships, so no
//! font program is embedded. Advance widths come from the Adobe AFM files
//! (units of 1/1000 em) for the printable ASCII range; other characters use
//! the face's average width.

/// Font face family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontFace {
    #[default]
    Helvetica,
    Times,
    Courier,
}

/// A standard font: a face plus weight/style variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StandardFont {
    pub face: FontFace,
    pub bold: bool,
    pub italic: bool,
}

impl StandardFont {
    pub fn new(face: FontFace, bold: bool, italic: bool) -> Self {
        Self { face, bold, italic }
    }

    pub fn helvetica(bold: bool, italic: bool) -> Self {
        Self::new(FontFace::Helvetica, bold, italic)
    }

    /// Map a CSS-style family name to the closest standard face
    ///
    /// Unknown families fall back to Helvetica.
    pub fn from_family(family: &str, bold: bool, italic: bool) -> Self {
        let first = family
            .split(',')
            .next()
            .unwrap_or_default()
            .trim()
            .trim_matches(|c| c == '"' || c == '\'')
            .to_ascii_lowercase();

        let face = match first.as_str() {
            "times" | "times new roman" | "times-roman" | "georgia" | "garamond" | "serif" => {
                FontFace::Times
            }
            "courier" | "courier new" | "monospace" | "consolas" => FontFace::Courier,
            "helvetica" | "arial" | "sans-serif" | "" => FontFace::Helvetica,
            other => {
                log::debug!("No standard face for font family '{other}', using Helvetica");
                FontFace::Helvetica
            }
        };

        Self::new(face, bold, italic)
    }

    /// PostScript name used as the `BaseFont` entry
    pub fn base_font(&self) -> &'static str {
        match (self.face, self.bold, self.italic) {
            (FontFace::Helvetica, false, false) => "Helvetica",
            (FontFace::Helvetica, true, false) => "Helvetica-Bold",
            (FontFace::Helvetica, false, true) => "Helvetica-Oblique",
            (FontFace::Helvetica, true, true) => "Helvetica-BoldOblique",
            (FontFace::Times, false, false) => "Times-Roman",
            (FontFace::Times, true, false) => "Times-Bold",
            (FontFace::Times, false, true) => "Times-Italic",
            (FontFace::Times, true, true) => "Times-BoldItalic",
            (FontFace::Courier, false, false) => "Courier",
            (FontFace::Courier, true, false) => "Courier-Bold",
            (FontFace::Courier, false, true) => "Courier-Oblique",
            (FontFace::Courier, true, true) => "Courier-BoldOblique",
        }
    }

    /// Advance width of a single character in 1/1000 em
    pub fn char_width(&self, c: char) -> u16 {
        let table: Option<&[u16; 95]> = match (self.face, self.bold) {
            (FontFace::Helvetica, false) => Some(&HELVETICA_WIDTHS),
            (FontFace::Helvetica, true) => Some(&HELVETICA_BOLD_WIDTHS),
            (FontFace::Times, _) => Some(&TIMES_WIDTHS),
            (FontFace::Courier, _) => None,
        };

        match table {
            None => 600,
            Some(widths) => {
                let code = c as u32;
                if (32..=126).contains(&code) {
                    widths[(code - 32) as usize]
                } else {
                    self.average_width()
                }
            }
        }
    }

    /// Width of `text` in points at `size` points
    pub fn text_width_points(&self, text: &str, size: f64) -> f64 {
        let units: u32 = text.chars().map(|c| self.char_width(c) as u32).sum();
        units as f64 * size / 1000.0
    }

    fn average_width(&self) -> u16 {
        match self.face {
            FontFace::Helvetica => 556,
            FontFace::Times => 500,
            FontFace::Courier => 600,
        }
    }
}

#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,                               // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015,                                             // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,                // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,                // 'N'..'Z'
    278, 278, 278, 469, 556, 333,                                                   // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,                // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,                // 'n'..'z'
    334, 260, 334, 584,                                                             // '{'..'~'
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

#[rustfmt::skip]
const TIMES_WIDTHS: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
    278, 278, 564, 564, 564, 444, 921,
    722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889,
    722, 722, 556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611,
    333, 278, 333, 469, 500, 333,
    444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778,
    500, 500, 500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444,
    480, 200, 480, 541,
];
