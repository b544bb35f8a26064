//! PDF Document builder

use crate::graphics::{ellipse_operators, line_operators, rect_operators, rotation_operators, Paint};
use crate::image::{generate_image_operators, ImageXObject};
use crate::text::{encode_win_ansi, generate_text_operators, TextRenderContext};
use crate::{Align, PdfError, Result, StandardFont};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};

/// RGB Color (values 0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Create a new RGB color (values 0.0 - 1.0)
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create color from RGB values (0-255)
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Black color
    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }

    /// White color
    pub fn white() -> Self {
        Self::rgb(1.0, 1.0, 1.0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// Per-page state accumulated until the document is serialized
#[derive(Debug, Clone)]
struct PageState {
    /// MediaBox width in points
    width: f64,
    /// MediaBox height in points
    height: f64,
    /// Content stream operators
    content: Vec<u8>,
    /// Font resource name -> font object
    fonts: BTreeMap<String, ObjectId>,
    /// Image resource name -> image object
    xobjects: BTreeMap<String, ObjectId>,
    /// Open rotation states not yet closed
    open_states: usize,
}

/// PDF Document builder providing high-level drawing operations
///
/// Coordinates passed to drawing methods are in points measured from the
/// top-left corner of the page.
pub struct PdfDocument {
    /// The underlying lopdf document (fonts and images live here)
    inner: Document,
    /// Reserved id of the page tree root
    pages_id: ObjectId,
    /// Pages in order
    pages: Vec<PageState>,
    /// Current font
    current_font: StandardFont,
    /// Current font size in points
    current_font_size: f64,
    /// Current text color
    current_text_color: Color,
    /// Embedded fonts (font -> resource name, object id)
    embedded_fonts: HashMap<StandardFont, (String, ObjectId)>,
    /// Embedded images (data hash -> resource name, object id, pixel size)
    embedded_images: HashMap<u64, (String, ObjectId)>,
    /// Next image resource number
    next_image_resource: u32,
}

impl Default for PdfDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfDocument {
    /// Create an empty document with no pages
    pub fn new() -> Self {
        let mut inner = Document::with_version("1.5");
        let pages_id = inner.new_object_id();

        Self {
            inner,
            pages_id,
            pages: Vec::new(),
            current_font: StandardFont::default(),
            current_font_size: 12.0,
            current_text_color: Color::default(),
            embedded_fonts: HashMap::new(),
            embedded_images: HashMap::new(),
            next_image_resource: 1,
        }
    }

    /// Get the number of pages in the document
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Append a blank page of the given size
    ///
    /// # Returns
    /// New page number (1-indexed)
    pub fn add_page(&mut self, width: f64, height: f64) -> Result<usize> {
        if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
            return Err(PdfError::InvalidPageSize(width, height));
        }

        self.pages.push(PageState {
            width,
            height,
            content: Vec::new(),
            fonts: BTreeMap::new(),
            xobjects: BTreeMap::new(),
            open_states: 0,
        });

        Ok(self.pages.len())
    }

    /// Page size `(width, height)` in points
    pub fn page_size(&self, page: usize) -> Result<(f64, f64)> {
        let state = self.page(page)?;
        Ok((state.width, state.height))
    }

    fn page(&self, page: usize) -> Result<&PageState> {
        if page == 0 || page > self.pages.len() {
            return Err(PdfError::InvalidPage(page, self.pages.len()));
        }
        Ok(&self.pages[page - 1])
    }

    fn page_mut(&mut self, page: usize) -> Result<&mut PageState> {
        let count = self.pages.len();
        if page == 0 || page > count {
            return Err(PdfError::InvalidPage(page, count));
        }
        Ok(&mut self.pages[page - 1])
    }

    /// Set the current font and size
    ///
    /// # Example
    /// ```ignore
    /// doc.set_font(StandardFont::from_family("Times New Roman", true, false), 18.0);
    /// ```
    pub fn set_font(&mut self, font: StandardFont, size: f64) {
        self.current_font = font;
        self.current_font_size = size;
    }

    /// Set the text color
    pub fn set_text_color(&mut self, color: Color) {
        self.current_text_color = color;
    }

    /// Current font's width of `text` in points
    pub fn get_text_width(&self, text: &str) -> f64 {
        self.current_font
            .text_width_points(text, self.current_font_size)
    }

    /// Insert text at a specific position
    ///
    /// # Arguments
    /// * `text` - Text to insert
    /// * `page` - Page number (1-indexed)
    /// * `x` - X anchor in points
    /// * `y` - Baseline Y in points (from top)
    /// * `align` - How the text sits relative to `x`
    pub fn insert_text(
        &mut self,
        text: &str,
        page: usize,
        x: f64,
        y: f64,
        align: Align,
    ) -> Result<()> {
        let page_height = self.page(page)?.height;

        if text.is_empty() {
            return Ok(());
        }

        let text_width = self.get_text_width(text);
        let start_x = match align {
            Align::Left => x,
            Align::Center => x - text_width / 2.0,
            Align::Right => x - text_width,
        };

        let font_resource = self.get_or_create_font_ref(self.current_font, page)?;
        let ctx = TextRenderContext {
            font_resource,
            font_size: self.current_font_size,
            color: self.current_text_color,
        };

        let ops = generate_text_operators(&encode_win_ansi(text), start_x, page_height - y, &ctx);
        self.buffer_content(page, &ops)
    }

    /// Draw a rectangle whose top-left corner is `(x, y)`
    pub fn draw_rect(
        &mut self,
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        paint: &Paint,
    ) -> Result<()> {
        let page_height = self.page(page)?.height;
        let ops = rect_operators(x, page_height - y - height, width, height, paint);
        self.buffer_content(page, &ops)
    }

    /// Draw an ellipse centred on `(cx, cy)`
    pub fn draw_ellipse(
        &mut self,
        page: usize,
        cx: f64,
        cy: f64,
        rx: f64,
        ry: f64,
        paint: &Paint,
    ) -> Result<()> {
        let page_height = self.page(page)?.height;
        let ops = ellipse_operators(cx, page_height - cy, rx, ry, paint);
        self.buffer_content(page, &ops)
    }

    /// Draw a straight line
    #[allow(clippy::too_many_arguments)]
    pub fn draw_line(
        &mut self,
        page: usize,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        color: Color,
        width: f64,
    ) -> Result<()> {
        let page_height = self.page(page)?.height;
        let ops = line_operators(x1, page_height - y1, x2, page_height - y2, color, width);
        self.buffer_content(page, &ops)
    }

    /// Rotate everything drawn until [`end_rotation`](Self::end_rotation)
    /// clockwise by `degrees` around `(px, py)`
    pub fn begin_rotation(&mut self, page: usize, px: f64, py: f64, degrees: f64) -> Result<()> {
        let page_height = self.page(page)?.height;
        let ops = rotation_operators(px, page_height - py, degrees);
        self.buffer_content(page, &ops)?;
        self.page_mut(page)?.open_states += 1;
        Ok(())
    }

    /// Close the most recent [`begin_rotation`](Self::begin_rotation)
    pub fn end_rotation(&mut self, page: usize) -> Result<()> {
        let state = self.page_mut(page)?;
        if state.open_states == 0 {
            return Ok(());
        }
        state.open_states -= 1;
        state.content.extend_from_slice(b"Q\n");
        Ok(())
    }

    /// Insert an image stretched to the given box
    ///
    /// # Arguments
    /// * `data` - Image file bytes (JPEG or PNG)
    /// * `page` - Page number (1-indexed)
    /// * `x`, `y` - Top-left corner in points
    /// * `width`, `height` - Box size in points
    pub fn insert_image(
        &mut self,
        data: &[u8],
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<()> {
        self.page(page)?;

        let hash = hash_bytes(data);
        if !self.embedded_images.contains_key(&hash) {
            let xobject = ImageXObject::from_bytes(data)?;
            self.embed_image(hash, &xobject);
        }

        self.place_image(hash, page, x, y, width, height)
    }

    /// Insert an already-built image XObject stretched to the given box
    pub fn insert_xobject(
        &mut self,
        xobject: &ImageXObject,
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<()> {
        self.page(page)?;

        let hash = hash_bytes(&xobject.data);
        if !self.embedded_images.contains_key(&hash) {
            self.embed_image(hash, xobject);
        }

        self.place_image(hash, page, x, y, width, height)
    }

    fn embed_image(&mut self, hash: u64, xobject: &ImageXObject) {
        let object_id = self.inner.add_object(xobject.to_pdf_stream());
        let resource_name = format!("Im{}", self.next_image_resource);
        self.next_image_resource += 1;
        self.embedded_images.insert(hash, (resource_name, object_id));
    }

    fn place_image(&mut self, hash: u64, page: usize, x: f64, y: f64, width: f64, height: f64) -> Result<()> {
        let (resource_name, object_id) = self
            .embedded_images
            .get(&hash)
            .cloned()
            .ok_or_else(|| PdfError::ImageError("Image was not embedded".to_string()))?;

        let state = self.page_mut(page)?;
        state.xobjects.insert(resource_name.clone(), object_id);
        let pdf_y = state.height - y - height;

        let ops = generate_image_operators(&resource_name, x, pdf_y, width, height);
        self.buffer_content(page, &ops)
    }

    /// Get or create the resource name of a font for a specific page
    fn get_or_create_font_ref(&mut self, font: StandardFont, page: usize) -> Result<String> {
        let (resource_name, object_id) = match self.embedded_fonts.get(&font) {
            Some(entry) => entry.clone(),
            None => {
                let object_id = self.inner.add_object(dictionary! {
                    "Type" => "Font",
                    "Subtype" => "Type1",
                    "BaseFont" => font.base_font(),
                    "Encoding" => "WinAnsiEncoding",
                });
                let resource_name = format!("F{}", self.embedded_fonts.len() + 1);
                self.embedded_fonts
                    .insert(font, (resource_name.clone(), object_id));
                (resource_name, object_id)
            }
        };

        self.page_mut(page)?
            .fonts
            .insert(resource_name.clone(), object_id);

        Ok(resource_name)
    }

    fn buffer_content(&mut self, page: usize, content: &[u8]) -> Result<()> {
        self.page_mut(page)?.content.extend_from_slice(content);
        Ok(())
    }

    /// Serialize the document to bytes
    ///
    /// The builder is left untouched, so more pages may be added and the
    /// document serialized again.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        if self.pages.is_empty() {
            return Err(PdfError::SaveError("Document has no pages".to_string()));
        }

        let mut doc = self.inner.clone();
        let mut kids = Vec::with_capacity(self.pages.len());

        for state in &self.pages {
            let mut content = state.content.clone();
            for _ in 0..state.open_states {
                content.extend_from_slice(b"Q\n");
            }
            let contents_id = doc.add_object(Stream::new(Dictionary::new(), content));

            let mut fonts = Dictionary::new();
            for (name, id) in &state.fonts {
                fonts.set(name.as_bytes(), Object::Reference(*id));
            }
            let mut xobjects = Dictionary::new();
            for (name, id) in &state.xobjects {
                xobjects.set(name.as_bytes(), Object::Reference(*id));
            }

            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => self.pages_id,
                "MediaBox" => vec![
                    0.into(),
                    0.into(),
                    state.width.into(),
                    state.height.into(),
                ],
                "Resources" => dictionary! {
                    "Font" => fonts,
                    "XObject" => xobjects,
                },
                "Contents" => contents_id,
            });
            kids.push(Object::Reference(page_id));
        }

        doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Count" => self.pages.len() as i64,
                "Kids" => kids,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;

        Ok(buffer)
    }
}

fn hash_bytes(data: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    data.hash(&mut hasher);
    hasher.finish()
}
