//! PDF export
//!
//! Two strategies produce a page from a template and an optional data row:
//! - element-based: every element becomes vector or text operators
//! - snapshot: a surface is rasterized and stretched over the page

use crate::glyphs::FontBook;
use crate::layout::{font_for, layout_text};
use crate::raster::RasterSurface;
use crate::surface::{InteractiveSurface, SnapshotOptions};
use crate::{RenderError, Result};
use cert_pdf::{ImageXObject, Paint, PdfDocument, PT_PER_MM};
use cert_template::{
    resolve_text, AssetStore, BorderStyle, Color, Element, ImageResolver, RenderContext, Row,
    Template,
};
use image::DynamicImage;
use std::rc::Rc;

fn pdf_color(color: Color) -> cert_pdf::Color {
    cert_pdf::Color::from_rgb(color.r, color.g, color.b)
}

fn pt(mm: f64) -> f64 {
    mm * PT_PER_MM
}

/// How a page is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    ElementBased,
    Snapshot,
}

impl Strategy {
    /// Strategy selected by the template's `useSnapshotGeneration` flag
    pub fn for_template(template: &Template) -> Self {
        if template.use_snapshot_generation {
            Strategy::Snapshot
        } else {
            Strategy::ElementBased
        }
    }
}

/// Renders templates into PDF pages
#[derive(Clone)]
pub struct Exporter {
    resolver: Rc<dyn ImageResolver>,
    fonts: Rc<FontBook>,
    raster_multiplier: f64,
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Exporter {
    pub fn new() -> Self {
        Self {
            resolver: Rc::new(AssetStore::new()),
            fonts: Rc::new(FontBook::new()),
            raster_multiplier: 2.0,
        }
    }

    pub fn with_resolver(mut self, resolver: Rc<dyn ImageResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_fonts(mut self, fonts: Rc<FontBook>) -> Self {
        self.fonts = fonts;
        self
    }

    /// Output quality factor for snapshot pages
    pub fn with_raster_multiplier(mut self, raster_multiplier: f64) -> Self {
        self.raster_multiplier = raster_multiplier;
        self
    }

    /// Append one page for `row` to `doc`
    ///
    /// Returns the new page number.
    pub fn render_page(&self, doc: &mut PdfDocument, template: &Template, row: Option<&Row>) -> Result<usize> {
        let (w_mm, h_mm) = template.page_size_mm();
        let page = doc.add_page(pt(w_mm), pt(h_mm))?;

        match Strategy::for_template(template) {
            Strategy::ElementBased => self.draw_elements(doc, page, template, row)?,
            Strategy::Snapshot => self.draw_snapshot(doc, page, template, row)?,
        }
        Ok(page)
    }

    /// One page per row, in order
    pub fn render_document(&self, template: &Template, rows: &[Row]) -> Result<Vec<u8>> {
        if rows.is_empty() {
            return Err(RenderError::Input("No rows to render".to_string()));
        }

        let mut doc = PdfDocument::new();
        for row in rows {
            self.render_page(&mut doc, template, Some(row))?;
        }
        Ok(doc.to_bytes()?)
    }

    /// A one-page document; without a row, text is rendered as written
    pub fn render_single(&self, template: &Template, row: Option<&Row>) -> Result<Vec<u8>> {
        let mut doc = PdfDocument::new();
        self.render_page(&mut doc, template, row)?;
        Ok(doc.to_bytes()?)
    }

    fn draw_elements(&self, doc: &mut PdfDocument, page: usize, template: &Template, row: Option<&Row>) -> Result<()> {
        let (w_mm, h_mm) = template.page_size_mm();

        let background = Paint {
            stroke: None,
            fill: Some(pdf_color(template.background_color)),
        };
        doc.draw_rect(page, 0.0, 0.0, pt(w_mm), pt(h_mm), &background)?;

        if let Some(source) = &template.background_image {
            if let Err(e) = self.place_image(doc, page, source, 0.0, 0.0, w_mm, h_mm) {
                log::warn!("Skipping background image: {e}");
            }
        }

        if let Some(border) = &template.border {
            let paint = Paint {
                stroke: Some((pdf_color(border.color), pt(border.width_mm))),
                fill: None,
            };
            let mut inset = border.inset_mm;
            let passes = if border.style == BorderStyle::Double { 2 } else { 1 };
            for _ in 0..passes {
                doc.draw_rect(
                    page,
                    pt(inset),
                    pt(inset),
                    pt(w_mm - 2.0 * inset),
                    pt(h_mm - 2.0 * inset),
                    &paint,
                )?;
                inset += 2.0 * border.width_mm;
            }
        }

        for element in &template.elements {
            log::trace!("Drawing {} '{}'", element.type_name(), element.id());
            let (x, y) = element.position();
            let rotated = element.rotation() != 0.0;
            if rotated {
                doc.begin_rotation(page, pt(x), pt(y), element.rotation())?;
            }

            self.draw_element(doc, page, element, row, w_mm)?;

            if rotated {
                doc.end_rotation(page)?;
            }
        }
        Ok(())
    }

    fn draw_element(
        &self,
        doc: &mut PdfDocument,
        page: usize,
        element: &Element,
        row: Option<&Row>,
        page_width_mm: f64,
    ) -> Result<()> {
        match element {
            Element::Text(text) => {
                let content = match row {
                    Some(row) => resolve_text(text, row),
                    None => text.content.clone(),
                };
                doc.set_font(font_for(text), pt(text.font_size_mm));
                doc.set_text_color(pdf_color(text.color));
                for line in layout_text(text, &content, page_width_mm) {
                    doc.insert_text(
                        &line.text,
                        page,
                        pt(line.x_mm),
                        pt(line.baseline_mm),
                        cert_pdf::Align::Left,
                    )?;
                }
            }
            Element::Image(image) => {
                let placed = self.place_image(
                    doc,
                    page,
                    &image.source,
                    image.x,
                    image.y,
                    image.width_mm,
                    image.height_mm,
                );
                if let Err(e) = placed {
                    log::warn!("Skipping image '{}': {e}", image.id);
                }
            }
            Element::Rectangle(rect) => {
                let paint = Paint {
                    stroke: (rect.stroke_width_mm > 0.0)
                        .then(|| (pdf_color(rect.stroke_color), pt(rect.stroke_width_mm))),
                    fill: rect.filled.then(|| pdf_color(rect.fill_color)),
                };
                doc.draw_rect(
                    page,
                    pt(rect.x),
                    pt(rect.y),
                    pt(rect.width_mm),
                    pt(rect.height_mm),
                    &paint,
                )?;
            }
            Element::Circle(circle) => {
                let paint = Paint {
                    stroke: (circle.stroke_width_mm > 0.0)
                        .then(|| (pdf_color(circle.stroke_color), pt(circle.stroke_width_mm))),
                    fill: circle.filled.then(|| pdf_color(circle.fill_color)),
                };
                let r = circle.radius_mm;
                doc.draw_ellipse(
                    page,
                    pt(circle.x + r),
                    pt(circle.y + r),
                    pt(r),
                    pt(r),
                    &paint,
                )?;
            }
            Element::Line(line) => {
                doc.draw_line(
                    page,
                    pt(line.x),
                    pt(line.y),
                    pt(line.x + line.width_mm),
                    pt(line.y),
                    pdf_color(line.color),
                    pt(line.stroke_width_mm),
                )?;
            }
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn place_image(
        &self,
        doc: &mut PdfDocument,
        page: usize,
        source: &str,
        x_mm: f64,
        y_mm: f64,
        w_mm: f64,
        h_mm: f64,
    ) -> Result<()> {
        let bytes = self.resolver.resolve(source)?;
        doc.insert_image(&bytes, page, pt(x_mm), pt(y_mm), pt(w_mm), pt(h_mm))?;
        Ok(())
    }

    fn draw_snapshot(&self, doc: &mut PdfDocument, page: usize, template: &Template, row: Option<&Row>) -> Result<()> {
        let mut surface = RasterSurface::new()
            .with_resolver(Rc::clone(&self.resolver))
            .with_fonts(Rc::clone(&self.fonts));
        surface.load_template(template, RenderContext::new(1.0, self.raster_multiplier));

        let raster = surface.snapshot(row, &SnapshotOptions::default())?;
        for failure in &surface.diagnostics().image_failures {
            log::warn!("Snapshot gap for '{}': {}", failure.element, failure.message);
        }

        let rgb = DynamicImage::ImageRgba8(raster).to_rgb8();
        let xobject = ImageXObject::from_rgb_image(&rgb)?;
        let (w_pt, h_pt) = doc.page_size(page)?;
        doc.insert_xobject(&xobject, page, 0.0, 0.0, w_pt, h_pt)?;
        Ok(())
    }
}
