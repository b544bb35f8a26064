//! Software painter for surfaces
//!
//! Elements are painted unrotated into a local layer whose coordinates are
//! relative to the element's anchor, then composited onto the page with
//! the element rotation (clockwise, around the anchor).

use crate::glyphs::FontBook;
use crate::layout::{font_for, layout_text};
use cert_template::{
    BorderStyle, CircleElement, Color, Element, ImageElement, LineElement, RectangleElement,
    Template, TextElement,
};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use std::collections::HashMap;

/// Number of sub-samples per axis for curved edges
const SUPERSAMPLE: usize = 4;

/// An RGBA buffer whose pixel `(0, 0)` sits at `offset` in drawing coordinates
pub(crate) struct Canvas {
    pixels: RgbaImage,
    offset: (f64, f64),
}

/// Axis-aligned bounds in a layer's drawing coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Window {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Window {
    fn around(points: impl IntoIterator<Item = (f64, f64)>) -> Self {
        points.into_iter().fold(
            Window {
                x0: f64::INFINITY,
                y0: f64::INFINITY,
                x1: f64::NEG_INFINITY,
                y1: f64::NEG_INFINITY,
            },
            |w, (x, y)| Window {
                x0: w.x0.min(x),
                y0: w.y0.min(y),
                x1: w.x1.max(x),
                y1: w.y1.max(y),
            },
        )
    }
}

fn overlap(a0: f64, a1: f64, b0: f64, b1: f64) -> f64 {
    (a1.min(b1) - a0.max(b0)).max(0.0)
}

impl Canvas {
    /// Opaque page filled with `background`
    pub fn page(width: u32, height: u32, background: Color) -> Self {
        let fill = Rgba([background.r, background.g, background.b, 255]);
        Self {
            pixels: RgbaImage::from_pixel(width.max(1), height.max(1), fill),
            offset: (0.0, 0.0),
        }
    }

    /// Transparent layer covering `[x0, x1) × [y0, y1)` in drawing coordinates
    pub fn layer(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        let left = x0.floor();
        let top = y0.floor();
        let width = (x1.ceil() - left).max(1.0) as u32;
        let height = (y1.ceil() - top).max(1.0) as u32;
        Self {
            pixels: RgbaImage::new(width, height),
            offset: (left, top),
        }
    }

    /// [`Canvas::layer`] restricted to `window`, or `None` when the two miss
    pub fn clipped_layer(x0: f64, y0: f64, x1: f64, y1: f64, window: &Window) -> Option<Self> {
        let (x0, y0) = (x0.max(window.x0), y0.max(window.y0));
        let (x1, y1) = (x1.min(window.x1), y1.min(window.y1));
        if !(x0 < x1 && y0 < y1) {
            return None;
        }
        Some(Self::layer(x0, y0, x1, y1))
    }

    /// The part of a layer's drawing space that lands on this canvas when
    /// composited at `anchor` rotated by `degrees`
    pub fn window(&self, anchor: (f64, f64), degrees: f64) -> Window {
        let (sin, cos) = degrees.to_radians().sin_cos();
        let (ox, oy) = self.offset;
        let (w, h) = (self.pixels.width() as f64, self.pixels.height() as f64);
        let corners = [(ox, oy), (ox + w, oy), (ox, oy + h), (ox + w, oy + h)];
        Window::around(corners.into_iter().map(|(x, y)| {
            let (u, v) = (x - anchor.0, y - anchor.1);
            (u * cos + v * sin, -u * sin + v * cos)
        }))
    }

    /// Whether the buffer spans exactly `[0, width) × [0, height)`
    fn spans(&self, width: u32, height: u32) -> bool {
        self.offset == (0.0, 0.0) && self.pixels.dimensions() == (width, height)
    }

    pub fn into_image(self) -> RgbaImage {
        self.pixels
    }

    /// Alpha-blend `color` at `coverage` into pixel `(px, py)` of the buffer
    fn blend(&mut self, px: i64, py: i64, color: [u8; 4], coverage: f32) {
        if px < 0 || py < 0 || coverage <= 0.0 {
            return;
        }
        let (px, py) = (px as u32, py as u32);
        if px >= self.pixels.width() || py >= self.pixels.height() {
            return;
        }

        let src_a = color[3] as f32 / 255.0 * coverage.min(1.0);
        let dst = self.pixels.get_pixel_mut(px, py);
        let dst_a = dst.0[3] as f32 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        if out_a <= 0.0 {
            return;
        }

        for i in 0..3 {
            let src = color[i] as f32 * src_a;
            let under = dst.0[i] as f32 * dst_a * (1.0 - src_a);
            dst.0[i] = ((src + under) / out_a).round().clamp(0.0, 255.0) as u8;
        }
        dst.0[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    }

    fn blend_at(&mut self, x: i32, y: i32, color: Color, coverage: f32) {
        let px = x as i64 - self.offset.0 as i64;
        let py = y as i64 - self.offset.1 as i64;
        self.blend(px, py, [color.r, color.g, color.b, 255], coverage);
    }

    /// Axis-aligned rectangle with exact area coverage at the edges
    pub fn fill_rect(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, color: Color) {
        let (ox, oy) = self.offset;
        let (x0, x1) = (x0.min(x1) - ox, x0.max(x1) - ox);
        let (y0, y1) = (y0.min(y1) - oy, y0.max(y1) - oy);

        let col_start = x0.floor().max(0.0) as i64;
        let col_end = (x1.ceil() as i64).min(self.pixels.width() as i64);
        let row_start = y0.floor().max(0.0) as i64;
        let row_end = (y1.ceil() as i64).min(self.pixels.height() as i64);

        for py in row_start..row_end {
            let cy = overlap(py as f64, py as f64 + 1.0, y0, y1);
            for px in col_start..col_end {
                let cx = overlap(px as f64, px as f64 + 1.0, x0, x1);
                self.blend(px, py, [color.r, color.g, color.b, 255], (cx * cy) as f32);
            }
        }
    }

    /// Rectangle outline centred on the path, like a PDF stroke
    pub fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64, stroke: f64, color: Color) {
        if stroke <= 0.0 {
            return;
        }
        let half = stroke / 2.0;
        self.fill_rect(x - half, y - half, x + w + half, y + half, color);
        self.fill_rect(x - half, y + h - half, x + w + half, y + h + half, color);
        if h > stroke {
            self.fill_rect(x - half, y + half, x + half, y + h - half, color);
            self.fill_rect(x + w - half, y + half, x + w + half, y + h - half, color);
        }
    }

    /// Circle with optional fill and centred stroke
    pub fn circle(&mut self, cx: f64, cy: f64, r: f64, fill: Option<Color>, stroke: Option<(Color, f64)>) {
        let half = stroke.map(|(_, w)| w / 2.0).unwrap_or(0.0);
        let reach = r + half;
        let (ox, oy) = self.offset;
        let step = 1.0 / SUPERSAMPLE as f64;
        let samples = (SUPERSAMPLE * SUPERSAMPLE) as f32;

        let col_start = (cx - reach - ox).floor().max(0.0) as i64;
        let col_end = ((cx + reach - ox).ceil() as i64).min(self.pixels.width() as i64);
        let row_start = (cy - reach - oy).floor().max(0.0) as i64;
        let row_end = ((cy + reach - oy).ceil() as i64).min(self.pixels.height() as i64);

        for py in row_start..row_end {
            for px in col_start..col_end {
                let (mut inside, mut on_stroke) = (0u32, 0u32);
                for sy in 0..SUPERSAMPLE {
                    for sx in 0..SUPERSAMPLE {
                        let x = px as f64 + ox + (sx as f64 + 0.5) * step - cx;
                        let y = py as f64 + oy + (sy as f64 + 0.5) * step - cy;
                        let d = (x * x + y * y).sqrt();
                        if d <= r {
                            inside += 1;
                        }
                        if half > 0.0 && (d - r).abs() <= half {
                            on_stroke += 1;
                        }
                    }
                }

                if let Some(fill) = fill {
                    self.blend(px, py, [fill.r, fill.g, fill.b, 255], inside as f32 / samples);
                }
                if let Some((color, _)) = stroke {
                    self.blend(px, py, [color.r, color.g, color.b, 255], on_stroke as f32 / samples);
                }
            }
        }
    }

    /// Copy `image` with its top-left at `(x, y)` in drawing coordinates
    pub fn draw_image(&mut self, image: &RgbaImage, x: f64, y: f64) {
        let left = (x - self.offset.0).round() as i64;
        let top = (y - self.offset.1).round() as i64;
        for (ix, iy, pixel) in image.enumerate_pixels() {
            let coverage = pixel.0[3] as f32 / 255.0;
            let opaque = [pixel.0[0], pixel.0[1], pixel.0[2], 255];
            self.blend(left + ix as i64, top + iy as i64, opaque, coverage);
        }
    }

    /// Nearest-neighbour copy of `image` stretched over `[0, width) × [0, height)`
    pub fn draw_image_stretched(&mut self, image: &RgbaImage, width: f64, height: f64) {
        let (iw, ih) = image.dimensions();
        if iw == 0 || ih == 0 {
            return;
        }
        let (ox, oy) = self.offset;
        for py in 0..self.pixels.height() {
            let y = py as f64 + oy + 0.5;
            if y < 0.0 || y >= height {
                continue;
            }
            let sy = ((y / height * ih as f64) as u32).min(ih - 1);
            for px in 0..self.pixels.width() {
                let x = px as f64 + ox + 0.5;
                if x < 0.0 || x >= width {
                    continue;
                }
                let sx = ((x / width * iw as f64) as u32).min(iw - 1);
                let pixel = image.get_pixel(sx, sy).0;
                let coverage = pixel[3] as f32 / 255.0;
                self.blend(px as i64, py as i64, [pixel[0], pixel[1], pixel[2], 255], coverage);
            }
        }
    }

    /// Composite `layer` whose drawing origin is at `anchor` on this canvas,
    /// rotated clockwise by `degrees` around that anchor
    pub fn composite(&mut self, layer: &Canvas, anchor: (f64, f64), degrees: f64) {
        let (sin, cos) = degrees.to_radians().sin_cos();
        let (lw, lh) = (layer.pixels.width() as f64, layer.pixels.height() as f64);
        let (lx0, ly0) = layer.offset;

        // Bounding box of the rotated layer on this canvas
        let corners = [(lx0, ly0), (lx0 + lw, ly0), (lx0, ly0 + lh), (lx0 + lw, ly0 + lh)];
        let mapped: Vec<(f64, f64)> = corners
            .iter()
            .map(|&(x, y)| (anchor.0 + x * cos - y * sin, anchor.1 + x * sin + y * cos))
            .collect();
        let min_x = mapped.iter().map(|p| p.0).fold(f64::INFINITY, f64::min) - self.offset.0;
        let max_x = mapped.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max) - self.offset.0;
        let min_y = mapped.iter().map(|p| p.1).fold(f64::INFINITY, f64::min) - self.offset.1;
        let max_y = mapped.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max) - self.offset.1;

        let col_start = min_x.floor().max(0.0) as i64;
        let col_end = (max_x.ceil() as i64).min(self.pixels.width() as i64);
        let row_start = min_y.floor().max(0.0) as i64;
        let row_end = (max_y.ceil() as i64).min(self.pixels.height() as i64);

        for py in row_start..row_end {
            for px in col_start..col_end {
                // Inverse rotation of the pixel centre into layer space
                let u = px as f64 + 0.5 + self.offset.0 - anchor.0;
                let v = py as f64 + 0.5 + self.offset.1 - anchor.1;
                let lx = u * cos + v * sin - lx0;
                let ly = -u * sin + v * cos - ly0;
                if lx < 0.0 || ly < 0.0 || lx >= lw || ly >= lh {
                    continue;
                }

                let src = layer.pixels.get_pixel(lx as u32, ly as u32).0;
                if src[3] == 0 {
                    continue;
                }
                let coverage = src[3] as f32 / 255.0;
                self.blend(px, py, [src[0], src[1], src[2], 255], coverage);
            }
        }
    }
}

/// Paints templates in mm onto a canvas at a fixed pixels-per-mm scale
pub(crate) struct Painter<'a> {
    pub scale: f64,
    pub fonts: &'a FontBook,
    /// Decoded images by source
    pub images: &'a HashMap<String, RgbaImage>,
}

impl<'a> Painter<'a> {
    /// Page canvas with background color, background image and border
    pub fn page(&self, template: &Template) -> Canvas {
        let (w_mm, h_mm) = template.page_size_mm();
        let (w, h) = ((w_mm * self.scale).round(), (h_mm * self.scale).round());
        let mut canvas = Canvas::page(w as u32, h as u32, template.background_color);

        if let Some(image) = template
            .background_image
            .as_ref()
            .and_then(|source| self.images.get(source))
        {
            let stretched = imageops::resize(image, w as u32, h as u32, FilterType::Triangle);
            canvas.draw_image(&stretched, 0.0, 0.0);
        }

        if let Some(border) = &template.border {
            let s = self.scale;
            let inset = border.inset_mm * s;
            let stroke = border.width_mm * s;
            canvas.stroke_rect(inset, inset, w - 2.0 * inset, h - 2.0 * inset, stroke, border.color);
            if border.style == BorderStyle::Double {
                let inner = inset + 2.0 * stroke;
                canvas.stroke_rect(inner, inner, w - 2.0 * inner, h - 2.0 * inner, stroke, border.color);
            }
        }

        canvas
    }

    /// Paint one element; `content` replaces text content when given
    ///
    /// Returns false when an image element has no decoded image.
    pub fn element(&self, canvas: &mut Canvas, element: &Element, content: Option<&str>, page_width_mm: f64) -> bool {
        let (x, y) = element.position();
        let anchor = (x * self.scale, y * self.scale);
        let window = canvas.window(anchor, element.rotation());

        let layer = match element {
            Element::Text(text) => {
                let content = content.unwrap_or(&text.content);
                self.text_layer(text, content, page_width_mm, &window)
            }
            Element::Image(image) => {
                let Some(decoded) = self.images.get(&image.source) else {
                    return false;
                };
                self.image_layer(decoded, image, &window)
            }
            Element::Rectangle(rect) => self.rect_layer(rect, &window),
            Element::Circle(circle) => self.circle_layer(circle, &window),
            Element::Line(line) => self.line_layer(line, &window),
        };

        if let Some(layer) = layer {
            log::trace!("Painting {} '{}'", element.type_name(), element.id());
            canvas.composite(&layer, anchor, element.rotation());
        }
        true
    }

    fn text_layer(&self, text: &TextElement, content: &str, page_width_mm: f64, window: &Window) -> Option<Canvas> {
        let lines = layout_text(text, content, page_width_mm);
        if lines.is_empty() {
            return None;
        }

        let s = self.scale;
        let size = text.font_size_mm * s;
        let rel_x = |mm: f64| (mm - text.x) * s;
        let rel_y = |mm: f64| (mm - text.y) * s;

        let x0 = lines.iter().map(|l| rel_x(l.x_mm)).fold(f64::INFINITY, f64::min);
        let x1 = lines
            .iter()
            .map(|l| rel_x(l.x_mm + l.width_mm))
            .fold(f64::NEG_INFINITY, f64::max);
        let last = lines.last().map(|l| rel_y(l.baseline_mm)).unwrap_or_default();
        let mut layer = Canvas::clipped_layer(x0 - size, -size, x1 + size, last + size, window)?;

        let metrics = font_for(text);
        for line in &lines {
            let left = rel_x(line.x_mm);
            let baseline = rel_y(line.baseline_mm);
            self.fonts
                .draw_run(&text.font_family, &metrics, &line.text, size, |gx, gy, coverage| {
                    layer.blend_at(
                        (left + gx as f64).round() as i32,
                        (baseline + gy as f64).round() as i32,
                        text.color,
                        coverage,
                    );
                });
        }

        Some(layer)
    }

    fn image_layer(&self, decoded: &RgbaImage, image: &ImageElement, window: &Window) -> Option<Canvas> {
        let w = (image.width_mm * self.scale).round().max(1.0);
        let h = (image.height_mm * self.scale).round().max(1.0);

        let mut layer = Canvas::clipped_layer(0.0, 0.0, w, h, window)?;
        if layer.spans(w as u32, h as u32) {
            let resized = imageops::resize(decoded, w as u32, h as u32, FilterType::Triangle);
            layer.draw_image(&resized, 0.0, 0.0);
        } else {
            // partly off the page
            layer.draw_image_stretched(decoded, w, h);
        }
        Some(layer)
    }

    fn rect_layer(&self, rect: &RectangleElement, window: &Window) -> Option<Canvas> {
        let s = self.scale;
        let (w, h) = (rect.width_mm * s, rect.height_mm * s);
        let stroke = rect.stroke_width_mm * s;
        let pad = stroke / 2.0 + 1.0;

        let mut layer = Canvas::clipped_layer(-pad, -pad, w + pad, h + pad, window)?;
        if rect.filled {
            layer.fill_rect(0.0, 0.0, w, h, rect.fill_color);
        }
        layer.stroke_rect(0.0, 0.0, w, h, stroke, rect.stroke_color);
        Some(layer)
    }

    fn circle_layer(&self, circle: &CircleElement, window: &Window) -> Option<Canvas> {
        let s = self.scale;
        let r = circle.radius_mm * s;
        let stroke = circle.stroke_width_mm * s;
        let pad = stroke / 2.0 + 1.0;

        let mut layer = Canvas::clipped_layer(-pad, -pad, 2.0 * r + pad, 2.0 * r + pad, window)?;
        let fill = circle.filled.then_some(circle.fill_color);
        let outline = (stroke > 0.0).then_some((circle.stroke_color, stroke));
        layer.circle(r, r, r, fill, outline);
        Some(layer)
    }

    fn line_layer(&self, line: &LineElement, window: &Window) -> Option<Canvas> {
        let s = self.scale;
        let w = line.width_mm * s;
        let half = (line.stroke_width_mm * s / 2.0).max(0.5);

        let mut layer = Canvas::clipped_layer(-1.0, -half - 1.0, w + 1.0, half + 1.0, window)?;
        layer.fill_rect(0.0, -half, w, half, line.color);
        Some(layer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(canvas: &Canvas, x: u32, y: u32) -> [u8; 4] {
        canvas.pixels.get_pixel(x, y).0
    }

    #[test]
    fn test_fill_rect_coverage() {
        let mut canvas = Canvas::page(10, 10, Color::white());
        canvas.fill_rect(2.0, 2.0, 4.5, 4.0, Color::black());

        assert_eq!(pixel(&canvas, 2, 2), [0, 0, 0, 255]);
        assert_eq!(pixel(&canvas, 3, 3), [0, 0, 0, 255]);
        // half-covered column
        assert_eq!(pixel(&canvas, 4, 2)[0], 128);
        assert_eq!(pixel(&canvas, 5, 2), [255, 255, 255, 255]);
        assert_eq!(pixel(&canvas, 2, 4), [255, 255, 255, 255]);
    }

    #[test]
    fn test_composite_without_rotation() {
        let mut layer = Canvas::layer(0.0, 0.0, 4.0, 2.0);
        layer.fill_rect(0.0, 0.0, 4.0, 2.0, Color::from_rgb(255, 0, 0));

        let mut page = Canvas::page(10, 10, Color::white());
        page.composite(&layer, (3.0, 5.0), 0.0);

        assert_eq!(pixel(&page, 3, 5), [255, 0, 0, 255]);
        assert_eq!(pixel(&page, 6, 6), [255, 0, 0, 255]);
        assert_eq!(pixel(&page, 7, 5), [255, 255, 255, 255]);
        assert_eq!(pixel(&page, 3, 7), [255, 255, 255, 255]);
    }

    #[test]
    fn test_composite_rotates_clockwise_around_anchor() {
        // a horizontal bar to the right of the anchor ends up below it
        let mut layer = Canvas::layer(0.0, 0.0, 6.0, 2.0);
        layer.fill_rect(0.0, 0.0, 6.0, 2.0, Color::black());

        let mut page = Canvas::page(20, 20, Color::white());
        page.composite(&layer, (10.0, 10.0), 90.0);

        assert_eq!(pixel(&page, 9, 14), [0, 0, 0, 255]);
        assert_eq!(pixel(&page, 14, 10), [255, 255, 255, 255]);
    }

    #[test]
    fn test_layer_offset() {
        let mut layer = Canvas::layer(-2.0, -2.0, 2.0, 2.0);
        layer.fill_rect(-2.0, -2.0, 0.0, 0.0, Color::black());
        let image = layer.into_image();
        assert_eq!(image.dimensions(), (4, 4));
        assert_eq!(image.get_pixel(0, 0).0, [0, 0, 0, 255]);
        assert_eq!(image.get_pixel(3, 3).0[3], 0);
    }

    #[test]
    fn test_window_follows_rotation() {
        let page = Canvas::page(100, 50, Color::white());
        assert_eq!(
            page.window((10.0, 20.0), 0.0),
            Window { x0: -10.0, y0: -20.0, x1: 90.0, y1: 30.0 }
        );

        // a quarter turn clockwise: the page lies at negative layer y
        let turned = page.window((0.0, 0.0), 90.0);
        assert!((turned.x0 - 0.0).abs() < 1e-9 && (turned.x1 - 50.0).abs() < 1e-9);
        assert!((turned.y0 + 100.0).abs() < 1e-9 && turned.y1.abs() < 1e-9);
    }

    #[test]
    fn test_clipped_layer() {
        let window = Window { x0: -10.0, y0: -20.0, x1: 90.0, y1: 30.0 };
        let layer = Canvas::clipped_layer(-1.0, -1.0, 1e9, 1e9, &window).unwrap();
        assert_eq!(layer.pixels.dimensions(), (91, 31));
        assert_eq!(layer.offset, (-1.0, -1.0));

        assert!(Canvas::clipped_layer(200.0, 0.0, 300.0, 10.0, &window).is_none());
    }

    #[test]
    fn test_oversized_elements_are_clipped_to_the_page() {
        let fonts = FontBook::new();
        let images = HashMap::new();
        let painter = Painter {
            scale: 1.0,
            fonts: &fonts,
            images: &images,
        };

        let mut rect = cert_template::ElementKind::Rectangle
            .default_element(cert_template::ElementId::from("huge"));
        rect.set_position(-30.0, -30.0);
        if let Element::Rectangle(r) = &mut rect {
            r.width_mm = 60_000.0;
            r.height_mm = 60_000.0;
            r.filled = true;
            r.fill_color = Color::black();
        }
        let mut circle = cert_template::ElementKind::Circle
            .default_element(cert_template::ElementId::from("far"));
        circle.set_position(5_000.0, 5_000.0);
        circle.set_rotation(30.0);

        let mut canvas = Canvas::page(40, 30, Color::white());
        assert!(painter.element(&mut canvas, &rect, None, 40.0));
        assert!(painter.element(&mut canvas, &circle, None, 40.0));

        assert_eq!(pixel(&canvas, 0, 0), [0, 0, 0, 255]);
        assert_eq!(pixel(&canvas, 39, 29), [0, 0, 0, 255]);
    }

    #[test]
    fn test_stretched_image_matches_nearest_sampling() {
        let image = RgbaImage::from_fn(2, 1, |x, _| {
            if x == 0 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        });
        let window = Window { x0: 5.0, y0: 0.0, x1: 15.0, y1: 4.0 };
        let mut layer = Canvas::clipped_layer(0.0, 0.0, 20.0, 4.0, &window).unwrap();
        layer.draw_image_stretched(&image, 20.0, 4.0);

        // layer starts at x = 5; the halves meet at x = 10
        assert_eq!(pixel(&layer, 4, 0), [255, 0, 0, 255]);
        assert_eq!(pixel(&layer, 5, 0), [0, 0, 255, 255]);
    }

    #[test]
    fn test_circle_fill() {
        let mut canvas = Canvas::page(20, 20, Color::white());
        canvas.circle(10.0, 10.0, 5.0, Some(Color::black()), None);
        assert_eq!(pixel(&canvas, 10, 10), [0, 0, 0, 255]);
        assert_eq!(pixel(&canvas, 1, 1), [255, 255, 255, 255]);
    }
}
