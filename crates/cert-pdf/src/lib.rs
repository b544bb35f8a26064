//! PDF Core - Paginated PDF output for certkit
//!
//! This crate provides functionality for:
//! - Creating new PDF documents with explicitly sized pages
//! - Drawing text with the standard (base-14) PDF fonts
//! - Drawing rectangles, ellipses and lines
//! - Inserting images (JPEG, PNG, raw RGB buffers)
//!
//! All public coordinates are in points with a top-left origin; the
//! conversion to PDF's bottom-left origin happens inside [`PdfDocument`].
//!
//! # Example
//!
//! ```ignore
//! use cert_pdf::{Align, PdfDocument, StandardFont};
//!
//! let mut doc = PdfDocument::new();
//! let page = doc.add_page(841.89, 595.28);
//! doc.set_font(StandardFont::helvetica(true, false), 24.0);
//! doc.insert_text("Certificate of Completion", page, 420.0, 120.0, Align::Center)?;
//! let bytes = doc.to_bytes()?;
//! ```

mod document;
mod font;
mod graphics;
mod image;
mod text;

pub use document::{Color, PdfDocument};
pub use font::{FontFace, StandardFont};
pub use graphics::{ellipse_operators, line_operators, rect_operators, rotation_operators, Paint};
pub use image::{detect_format, ImageFormat, ImageXObject};
pub use text::{encode_win_ansi, generate_text_operators, wrap_to_width, TextRenderContext};

use thiserror::Error;

/// Points per millimetre (72 pt per inch, 25.4 mm per inch)
pub const PT_PER_MM: f64 = 72.0 / 25.4;

/// Errors that can occur during PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("Invalid page number: {0} (document has {1} pages)")]
    InvalidPage(usize, usize),

    #[error("Invalid page size: {0} x {1} pt")]
    InvalidPageSize(f64, f64),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Text alignment options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_default() {
        assert_eq!(Align::default(), Align::Left);
    }

    #[test]
    fn test_pt_per_mm() {
        assert!((210.0 * PT_PER_MM - 595.275_590_551).abs() < 1e-6);
    }
}
