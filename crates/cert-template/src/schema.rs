//! Template JSON schema types

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// RGB color, serialized as a CSS hex string (`#rrggbb`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Black color
    pub const fn black() -> Self {
        Self::from_rgb(0, 0, 0)
    }

    /// White color
    pub const fn white() -> Self {
        Self::from_rgb(255, 255, 255)
    }

    /// Parse `#rgb` or `#rrggbb` (case-insensitive, `#` optional)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }

        match digits.len() {
            3 => {
                let nibble = |i: usize| u8::from_str_radix(&digits[i..i + 1], 16).ok();
                let (r, g, b) = (nibble(0)?, nibble(1)?, nibble(2)?);
                Some(Self::from_rgb(r * 17, g * 17, b * 17))
            }
            6 => {
                let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
                Some(Self::from_rgb(byte(0)?, byte(2)?, byte(4)?))
            }
            _ => None,
        }
    }

    /// Lower-case `#rrggbb`
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s).ok_or_else(|| format!("invalid hex color '{s}'"))
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Opaque element identifier, unique within a template
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Page orientation
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    #[default]
    Landscape,
}

/// Paper format
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PageFormat {
    #[default]
    A4,
    Letter,
}

impl PageFormat {
    /// Portrait `(width, height)` in mm
    pub fn portrait_mm(&self) -> (f64, f64) {
        match self {
            PageFormat::A4 => (210.0, 297.0),
            PageFormat::Letter => (215.9, 279.4),
        }
    }
}

/// Border line style
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BorderStyle {
    #[default]
    Solid,
    Double,
}

fn default_border_width() -> f64 {
    1.0
}

fn default_border_inset() -> f64 {
    10.0
}

/// Decorative page border
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Border {
    #[serde(default)]
    pub color: Color,

    /// Stroke width in mm
    #[serde(default = "default_border_width")]
    pub width_mm: f64,

    /// Distance from the page edge in mm
    #[serde(default = "default_border_inset")]
    pub inset_mm: f64,

    #[serde(default)]
    pub style: BorderStyle,
}

impl Default for Border {
    fn default() -> Self {
        Self {
            color: Color::black(),
            width_mm: default_border_width(),
            inset_mm: default_border_inset(),
            style: BorderStyle::Solid,
        }
    }
}

/// Text alignment
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

fn default_text_width() -> f64 {
    100.0
}

fn default_font_size_mm() -> f64 {
    8.0
}

fn default_font_family() -> String {
    "Helvetica".to_string()
}

fn default_stroke_width() -> f64 {
    0.5
}

fn default_box_width() -> f64 {
    60.0
}

fn default_box_height() -> f64 {
    40.0
}

fn default_radius() -> f64 {
    20.0
}

/// Text element
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TextElement {
    pub id: ElementId,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub rotation: f64,

    #[serde(default)]
    pub content: String,

    /// Wrap/align box width in mm
    #[serde(default = "default_text_width")]
    pub width: f64,

    #[serde(default = "default_font_size_mm")]
    pub font_size_mm: f64,

    #[serde(default = "default_font_family")]
    pub font_family: String,

    #[serde(default)]
    pub bold: bool,

    #[serde(default)]
    pub italic: bool,

    #[serde(default)]
    pub color: Color,

    #[serde(default)]
    pub align: Align,

    /// When set together with `data_field`, the row value replaces `content`
    #[serde(default)]
    pub is_dynamic: bool,

    /// Bound data column (ignored unless `is_dynamic`)
    #[serde(default)]
    pub data_field: Option<String>,
}

/// Raster image element
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageElement {
    pub id: ElementId,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub rotation: f64,

    /// Data URI, asset key or path
    #[serde(default)]
    pub source: String,

    #[serde(default = "default_box_width")]
    pub width_mm: f64,

    #[serde(default = "default_box_height")]
    pub height_mm: f64,
}

/// Rectangle element
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RectangleElement {
    pub id: ElementId,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub rotation: f64,

    #[serde(default = "default_box_width")]
    pub width_mm: f64,

    #[serde(default = "default_box_height")]
    pub height_mm: f64,

    #[serde(default)]
    pub stroke_color: Color,

    #[serde(default = "default_stroke_width")]
    pub stroke_width_mm: f64,

    #[serde(default)]
    pub filled: bool,

    #[serde(default = "Color::white")]
    pub fill_color: Color,
}

/// Circle element; `(x, y)` is the top-left of its bounding box
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CircleElement {
    pub id: ElementId,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub rotation: f64,

    #[serde(default = "default_radius")]
    pub radius_mm: f64,

    #[serde(default)]
    pub stroke_color: Color,

    #[serde(default = "default_stroke_width")]
    pub stroke_width_mm: f64,

    #[serde(default)]
    pub filled: bool,

    #[serde(default = "Color::white")]
    pub fill_color: Color,
}

/// Horizontal line from `(x, y)` to `(x + width_mm, y)` before rotation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LineElement {
    pub id: ElementId,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub rotation: f64,

    #[serde(default = "default_text_width")]
    pub width_mm: f64,

    #[serde(default = "default_stroke_width")]
    pub stroke_width_mm: f64,

    #[serde(default)]
    pub color: Color,
}

/// Template element (tagged union)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    Text(TextElement),
    Image(ImageElement),
    Rectangle(RectangleElement),
    Circle(CircleElement),
    Line(LineElement),
}

impl Element {
    /// Get the element ID
    pub fn id(&self) -> &ElementId {
        match self {
            Element::Text(e) => &e.id,
            Element::Image(e) => &e.id,
            Element::Rectangle(e) => &e.id,
            Element::Circle(e) => &e.id,
            Element::Line(e) => &e.id,
        }
    }

    pub(crate) fn set_id(&mut self, id: ElementId) {
        match self {
            Element::Text(e) => e.id = id,
            Element::Image(e) => e.id = id,
            Element::Rectangle(e) => e.id = id,
            Element::Circle(e) => e.id = id,
            Element::Line(e) => e.id = id,
        }
    }

    /// The `type` tag as serialized
    pub fn type_name(&self) -> &'static str {
        match self {
            Element::Text(_) => "text",
            Element::Image(_) => "image",
            Element::Rectangle(_) => "rectangle",
            Element::Circle(_) => "circle",
            Element::Line(_) => "line",
        }
    }

    /// Top-left anchor in mm
    pub fn position(&self) -> (f64, f64) {
        match self {
            Element::Text(e) => (e.x, e.y),
            Element::Image(e) => (e.x, e.y),
            Element::Rectangle(e) => (e.x, e.y),
            Element::Circle(e) => (e.x, e.y),
            Element::Line(e) => (e.x, e.y),
        }
    }

    /// Move the anchor to `(x, y)` in mm
    pub fn set_position(&mut self, x: f64, y: f64) {
        let (ex, ey) = match self {
            Element::Text(e) => (&mut e.x, &mut e.y),
            Element::Image(e) => (&mut e.x, &mut e.y),
            Element::Rectangle(e) => (&mut e.x, &mut e.y),
            Element::Circle(e) => (&mut e.x, &mut e.y),
            Element::Line(e) => (&mut e.x, &mut e.y),
        };
        *ex = x;
        *ey = y;
    }

    /// Rotation in degrees around the top-left anchor
    pub fn rotation(&self) -> f64 {
        match self {
            Element::Text(e) => e.rotation,
            Element::Image(e) => e.rotation,
            Element::Rectangle(e) => e.rotation,
            Element::Circle(e) => e.rotation,
            Element::Line(e) => e.rotation,
        }
    }

    pub fn set_rotation(&mut self, degrees: f64) {
        match self {
            Element::Text(e) => e.rotation = degrees,
            Element::Image(e) => e.rotation = degrees,
            Element::Rectangle(e) => e.rotation = degrees,
            Element::Circle(e) => e.rotation = degrees,
            Element::Line(e) => e.rotation = degrees,
        }
    }

    /// Unrotated bounding-box height in mm
    ///
    /// Text uses one line of `font_size_mm`; lines use their stroke width.
    pub fn height_mm(&self) -> f64 {
        match self {
            Element::Text(e) => e.font_size_mm,
            Element::Image(e) => e.height_mm,
            Element::Rectangle(e) => e.height_mm,
            Element::Circle(e) => e.radius_mm * 2.0,
            Element::Line(e) => e.stroke_width_mm,
        }
    }

    /// Lower edge (`y + height`) in mm
    pub fn bottom_mm(&self) -> f64 {
        self.position().1 + self.height_mm()
    }

    pub fn as_text(&self) -> Option<&TextElement> {
        match self {
            Element::Text(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextElement> {
        match self {
            Element::Text(e) => Some(e),
            _ => None,
        }
    }
}

fn default_name() -> String {
    "Untitled certificate".to_string()
}

/// Root template structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default)]
    pub orientation: Orientation,

    #[serde(default)]
    pub page_format: PageFormat,

    #[serde(default = "Color::white")]
    pub background_color: Color,

    /// Image source stretched over the whole page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<Border>,

    /// Render through a surface snapshot instead of element drawing
    #[serde(default)]
    pub use_snapshot_generation: bool,

    #[serde(default)]
    pub elements: Vec<Element>,

    // === Id counter (not serialized) ===
    #[serde(skip)]
    pub(crate) next_id: u64,
}

impl Default for Template {
    fn default() -> Self {
        Self::new(default_name())
    }
}

impl PartialEq for Template {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.orientation == other.orientation
            && self.page_format == other.page_format
            && self.background_color == other.background_color
            && self.background_image == other.background_image
            && self.border == other.border
            && self.use_snapshot_generation == other.use_snapshot_generation
            && self.elements == other.elements
    }
}

impl Template {
    /// Empty A4 landscape template on a white background
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            orientation: Orientation::Landscape,
            page_format: PageFormat::A4,
            background_color: Color::white(),
            background_image: None,
            border: None,
            use_snapshot_generation: false,
            elements: Vec::new(),
            next_id: 0,
        }
    }

    /// Page `(width, height)` in mm after orientation
    pub fn page_size_mm(&self) -> (f64, f64) {
        let (w, h) = self.page_format.portrait_mm();
        match self.orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }

    /// Look up an element by id
    pub fn element(&self, id: &ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id() == id)
    }

    pub fn element_mut(&mut self, id: &ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id() == id)
    }

    /// Text elements in drawing order
    pub fn text_elements(&self) -> impl Iterator<Item = &TextElement> {
        self.elements.iter().filter_map(Element::as_text)
    }
}
