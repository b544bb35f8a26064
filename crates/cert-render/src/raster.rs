//! Raster implementation of [`InteractiveSurface`]

use crate::canvas::{Canvas, Painter};
use crate::debounce::Debouncer;
use crate::glyphs::FontBook;
use crate::surface::{
    Edit, EditCallback, EditSummary, GesturePhase, ImageFailure, InteractiveSurface,
    SnapshotOptions, SurfaceDiagnostics,
};
use crate::{RenderError, Result};
use cert_template::{
    resolve_text, AssetStore, Element, ElementId, ElementKind, ImageResolver, RenderContext, Row,
    Template,
};
use image::RgbaImage;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source key used in diagnostics for the page background image
const BACKGROUND_ID: &str = "background";

/// Apply length transforms to an element
///
/// `position` maps the anchor, `extent` maps box sizes and radii, and
/// `fine` maps font sizes and stroke widths. Rotation is never touched.
fn map_lengths<P, E, F>(element: &Element, position: P, extent: E, fine: F) -> Element
where
    P: Fn(f64) -> f64,
    E: Fn(f64) -> f64,
    F: Fn(f64) -> f64,
{
    let mut mapped = element.clone();
    let (x, y) = element.position();
    mapped.set_position(position(x), position(y));

    match &mut mapped {
        Element::Text(e) => {
            e.width = extent(e.width);
            e.font_size_mm = fine(e.font_size_mm);
        }
        Element::Image(e) => {
            e.width_mm = extent(e.width_mm);
            e.height_mm = extent(e.height_mm);
        }
        Element::Rectangle(e) => {
            e.width_mm = extent(e.width_mm);
            e.height_mm = extent(e.height_mm);
            e.stroke_width_mm = fine(e.stroke_width_mm);
        }
        Element::Circle(e) => {
            e.radius_mm = extent(e.radius_mm);
            e.stroke_width_mm = fine(e.stroke_width_mm);
        }
        Element::Line(e) => {
            e.width_mm = extent(e.width_mm);
            e.stroke_width_mm = fine(e.stroke_width_mm);
        }
    }
    mapped
}

fn scaled(element: &Element, factor: f64) -> Element {
    map_lengths(element, |v| v * factor, |v| v * factor, |v| v * factor)
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Software surface holding its objects in pixels
///
/// Object geometry is stored with the `*_mm` fields holding pixel values at
/// the current context scale.
pub struct RasterSurface {
    /// Page settings of the loaded template (no elements)
    settings: Template,
    objects: Vec<Element>,
    context: RenderContext,
    resolver: Rc<dyn ImageResolver>,
    fonts: Rc<FontBook>,
    images: HashMap<String, RgbaImage>,
    /// Sources that failed to load, with the reason, until the next load
    failed: HashMap<String, String>,
    debouncer: Debouncer,
    callback: Option<EditCallback>,
    last_element: Option<ElementId>,
    next_id: u64,
    diagnostics: SurfaceDiagnostics,
}

impl Default for RasterSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RasterSurface {
    /// Empty surface with no registered assets or fonts
    pub fn new() -> Self {
        Self {
            settings: Template::default(),
            objects: Vec::new(),
            context: RenderContext::default(),
            resolver: Rc::new(AssetStore::new()),
            fonts: Rc::new(FontBook::new()),
            images: HashMap::new(),
            failed: HashMap::new(),
            debouncer: Debouncer::default(),
            callback: None,
            last_element: None,
            next_id: 0,
            diagnostics: SurfaceDiagnostics::default(),
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

    pub fn with_debounce(mut self, interval: Duration) -> Self {
        self.debouncer = Debouncer::new(interval);
        self
    }

    pub fn context(&self) -> RenderContext {
        self.context
    }

    /// Number of live objects
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    fn object_mut(&mut self, id: &ElementId) -> Result<&mut Element> {
        self.objects
            .iter_mut()
            .find(|e| e.id() == id)
            .ok_or_else(|| RenderError::Surface(format!("Unknown element '{id}'")))
    }

    fn generate_id(&mut self, kind: ElementKind) -> ElementId {
        loop {
            self.next_id += 1;
            let candidate = ElementId::new(format!("{}-{}", kind.as_str(), self.next_id));
            if !self.objects.iter().any(|e| e.id() == &candidate) {
                return candidate;
            }
        }
    }

    fn modify(&mut self, edit: Edit) -> Result<ElementId> {
        let scale = self.context.scale();

        match edit {
            Edit::Add { kind, x_px, y_px } => {
                let id = self.generate_id(kind);
                let mut element = scaled(&kind.default_element(id.clone()), scale);
                element.set_position(x_px, y_px);
                self.objects.push(element);
                Ok(id)
            }
            Edit::Move { id, x_px, y_px } => {
                self.object_mut(&id)?.set_position(x_px, y_px);
                Ok(id)
            }
            Edit::Resize {
                id,
                width_px,
                height_px,
            } => {
                if !(width_px > 0.0 && height_px >= 0.0) {
                    return Err(RenderError::Surface(format!(
                        "Invalid size {width_px}x{height_px} for '{id}'"
                    )));
                }
                match self.object_mut(&id)? {
                    Element::Text(e) => e.width = width_px,
                    Element::Image(e) => {
                        e.width_mm = width_px;
                        e.height_mm = height_px;
                    }
                    Element::Rectangle(e) => {
                        e.width_mm = width_px;
                        e.height_mm = height_px;
                    }
                    Element::Circle(e) => e.radius_mm = width_px.min(height_px) / 2.0,
                    Element::Line(e) => e.width_mm = width_px,
                }
                Ok(id)
            }
            Edit::Recolor { id, color } => {
                match self.object_mut(&id)? {
                    Element::Text(e) => e.color = color,
                    Element::Line(e) => e.color = color,
                    Element::Rectangle(e) => {
                        e.filled = true;
                        e.fill_color = color;
                    }
                    Element::Circle(e) => {
                        e.filled = true;
                        e.fill_color = color;
                    }
                    Element::Image(_) => {
                        return Err(RenderError::Surface(format!(
                            "Image element '{id}' has no color"
                        )))
                    }
                }
                Ok(id)
            }
            Edit::Delete { id } => {
                let before = self.objects.len();
                self.objects.retain(|e| e.id() != &id);
                if self.objects.len() == before {
                    return Err(RenderError::Surface(format!("Unknown element '{id}'")));
                }
                Ok(id)
            }
            Edit::EditText { id, content } => {
                match self.object_mut(&id)? {
                    Element::Text(e) => e.content = content,
                    other => {
                        return Err(RenderError::Surface(format!(
                            "Element '{id}' is a {}, not text",
                            other.type_name()
                        )))
                    }
                }
                Ok(id)
            }
            Edit::Rotate { id, degrees } => {
                if !degrees.is_finite() {
                    return Err(RenderError::Surface(format!("Invalid rotation for '{id}'")));
                }
                self.object_mut(&id)?.set_rotation(degrees);
                Ok(id)
            }
        }
    }

    fn notify(&mut self, edits: usize, phase: GesturePhase) {
        let summary = EditSummary {
            edits,
            last_element: self.last_element.clone(),
            phase,
        };
        if let Some(callback) = self.callback.as_mut() {
            callback(&summary);
        }
    }

    /// Decode every image source the page needs, recording failures
    fn load_images(&mut self) {
        let sources: Vec<(ElementId, String)> = self
            .settings
            .background_image
            .iter()
            .map(|source| (ElementId::from(BACKGROUND_ID), source.clone()))
            .chain(self.objects.iter().filter_map(|e| match e {
                Element::Image(image) => Some((image.id.clone(), image.source.clone())),
                _ => None,
            }))
            .collect();

        for (element, source) in sources {
            if self.images.contains_key(&source) {
                continue;
            }
            if let Some(message) = self.failed.get(&source) {
                self.diagnostics.image_failures.push(ImageFailure {
                    element,
                    message: message.clone(),
                });
                continue;
            }

            let decoded = self
                .resolver
                .resolve(&source)
                .map_err(|e| e.to_string())
                .and_then(|bytes| {
                    image::load_from_memory(&bytes)
                        .map(|img| img.to_rgba8())
                        .map_err(|e| e.to_string())
                });

            match decoded {
                Ok(image) => {
                    self.images.insert(source, image);
                }
                Err(message) => {
                    log::warn!("Image for '{element}' could not be loaded: {message}");
                    self.failed.insert(source, message.clone());
                    self.diagnostics
                        .image_failures
                        .push(ImageFailure { element, message });
                }
            }
        }
    }
}

impl InteractiveSurface for RasterSurface {
    fn load_template(&mut self, template: &Template, context: RenderContext) {
        let scale = context.scale();

        self.settings = template.clone();
        self.settings.elements.clear();
        self.objects = template.elements.iter().map(|e| scaled(e, scale)).collect();
        self.context = context;
        self.images.clear();
        self.failed.clear();
        self.last_element = None;
        self.diagnostics = SurfaceDiagnostics::default();

        log::debug!(
            "Loaded '{}' with {} objects at {:.3} px/mm",
            template.name,
            self.objects.len(),
            scale
        );
    }

    fn on_edit(&mut self, callback: EditCallback) {
        self.callback = Some(callback);
    }

    fn apply_edit(&mut self, edit: Edit, phase: GesturePhase, now: Instant) -> Result<()> {
        let id = self.modify(edit)?;
        self.last_element = Some(id);

        if let Some(edits) = self.debouncer.event(phase, now) {
            self.notify(edits, phase);
        }
        Ok(())
    }

    fn tick(&mut self, now: Instant) {
        if let Some(edits) = self.debouncer.poll(now) {
            self.notify(edits, GesturePhase::Continuing);
        }
    }

    fn serialize_to_template(&self) -> Template {
        let scale = self.context.scale();
        let whole_mm = |v: f64| (v / scale).round();
        let tenth_mm = |v: f64| round_tenth(v / scale);

        let mut template = self.settings.clone();
        template.elements = self
            .objects
            .iter()
            .map(|e| map_lengths(e, whole_mm, whole_mm, tenth_mm))
            .collect();
        template
    }

    fn resize(&mut self, context: RenderContext) {
        let factor = context.scale() / self.context.scale();
        self.objects = self.objects.iter().map(|e| scaled(e, factor)).collect();
        self.context = context;
    }

    fn snapshot(&mut self, row: Option<&Row>, options: &SnapshotOptions) -> Result<RgbaImage> {
        let scale = options.scale.unwrap_or_else(|| self.context.scale());
        if !(scale > 0.0 && scale.is_finite()) {
            return Err(RenderError::Surface(format!("Invalid snapshot scale {scale}")));
        }

        self.diagnostics = SurfaceDiagnostics::default();
        self.load_images();

        let page_width_mm = self.settings.page_size_mm().0;
        let to_mm = 1.0 / self.context.scale();
        let painter = Painter {
            scale,
            fonts: &self.fonts,
            images: &self.images,
        };

        let mut canvas: Canvas = painter.page(&self.settings);
        for object in &self.objects {
            let element = scaled(object, to_mm);
            let content = match (&element, row) {
                (Element::Text(text), Some(row)) => Some(resolve_text(text, row)),
                _ => None,
            };
            painter.element(&mut canvas, &element, content.as_deref(), page_width_mm);
        }

        Ok(canvas.into_image())
    }

    fn diagnostics(&self) -> &SurfaceDiagnostics {
        &self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cert_template::{parse_template, Color};
    use pretty_assertions::assert_eq;
    use std::cell::{Cell, RefCell};

    const TEMPLATE: &str = r##"{
        "name": "Award",
        "orientation": "portrait",
        "elements": [
            { "type": "text", "id": "name", "x": 20, "y": 40, "content": "{{name}}",
              "fontSizeMm": 9.5, "isDynamic": true, "dataField": "name" },
            { "type": "rectangle", "id": "frame", "x": 10, "y": 10, "widthMm": 190, "heightMm": 277,
              "strokeWidthMm": 0.8 },
            { "type": "circle", "id": "seal", "x": 150, "y": 230, "radiusMm": 15, "rotation": 12.5 },
            { "type": "line", "id": "rule", "x": 20, "y": 60, "widthMm": 170 }
        ]
    }"##;

    fn loaded(zoom: f64) -> RasterSurface {
        let mut surface = RasterSurface::new();
        surface.load_template(
            &parse_template(TEMPLATE).unwrap(),
            RenderContext::new(zoom, 1.0),
        );
        surface
    }

    #[test]
    fn test_load_serialize_round_trip() {
        let template = parse_template(TEMPLATE).unwrap();
        for zoom in [0.5, 1.0, 1.7, 3.0] {
            let surface = loaded(zoom);
            assert_eq!(surface.serialize_to_template(), template);
        }
    }

    #[test]
    fn test_resize_keeps_content() {
        let mut surface = loaded(1.0);
        surface.resize(RenderContext::new(2.5, 2.0));
        assert_eq!(surface.serialize_to_template(), parse_template(TEMPLATE).unwrap());
    }

    #[test]
    fn test_move_rounds_to_whole_mm() {
        let mut surface = loaded(1.0);
        let scale = surface.context().scale();
        surface
            .apply_edit(
                Edit::Move {
                    id: "name".into(),
                    x_px: 33.4 * scale,
                    y_px: 50.6 * scale,
                },
                GesturePhase::Finished,
                Instant::now(),
            )
            .unwrap();

        let template = surface.serialize_to_template();
        let name = template.element(&"name".into()).unwrap();
        assert_eq!(name.position(), (33.0, 51.0));
    }

    #[test]
    fn test_add_and_delete() {
        let mut surface = loaded(1.0);
        let now = Instant::now();
        surface
            .apply_edit(
                Edit::Add {
                    kind: ElementKind::Rectangle,
                    x_px: 0.0,
                    y_px: 0.0,
                },
                GesturePhase::Finished,
                now,
            )
            .unwrap();
        assert_eq!(surface.object_count(), 5);

        let template = surface.serialize_to_template();
        let added = &template.elements[4];
        assert_eq!(added.id().as_str(), "rectangle-1");
        assert_eq!(added.height_mm(), 40.0);

        surface
            .apply_edit(Edit::Delete { id: "frame".into() }, GesturePhase::Finished, now)
            .unwrap();
        assert_eq!(surface.object_count(), 4);
    }

    #[test]
    fn test_unknown_element_is_an_error() {
        let mut surface = loaded(1.0);
        let result = surface.apply_edit(
            Edit::Rotate {
                id: "missing".into(),
                degrees: 10.0,
            },
            GesturePhase::Finished,
            Instant::now(),
        );
        assert!(matches!(result, Err(RenderError::Surface(_))));
    }

    #[test]
    fn test_edit_text_on_shape_is_rejected() {
        let mut surface = loaded(1.0);
        let result = surface.apply_edit(
            Edit::EditText {
                id: "rule".into(),
                content: "x".into(),
            },
            GesturePhase::Finished,
            Instant::now(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_drag_notifies_after_quiet_period() {
        let fired = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&fired);

        let mut surface = loaded(1.0).with_debounce(Duration::from_millis(300));
        surface.on_edit(Box::new(move |summary| sink.borrow_mut().push(summary.clone())));

        let start = Instant::now();
        for i in 0..5u64 {
            surface
                .apply_edit(
                    Edit::Move {
                        id: "seal".into(),
                        x_px: 100.0 + i as f64,
                        y_px: 100.0,
                    },
                    GesturePhase::Continuing,
                    start + Duration::from_millis(i * 20),
                )
                .unwrap();
        }
        surface.tick(start + Duration::from_millis(200));
        assert!(fired.borrow().is_empty());

        surface.tick(start + Duration::from_millis(400));
        let fired = fired.borrow();
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].edits, 5);
        assert_eq!(fired[0].last_element, Some(ElementId::from("seal")));
    }

    #[test]
    fn test_snapshot_dimensions_and_background() {
        let mut surface = loaded(1.0);
        let image = surface
            .snapshot(None, &SnapshotOptions { scale: Some(2.0) })
            .unwrap();
        assert_eq!(image.dimensions(), (420, 594));
        assert_eq!(image.get_pixel(2, 2).0, [255, 255, 255, 255]);
        assert!(surface.diagnostics().is_clean());
    }

    #[test]
    fn test_snapshot_records_broken_images() {
        let mut template = parse_template(TEMPLATE).unwrap();
        template.background_color = Color::from_rgb(10, 20, 30);
        template.add_element(
            ElementKind::Image,
            &serde_json::json!({ "source": "missing-logo" }),
        );

        let mut surface = RasterSurface::new();
        surface.load_template(&template, RenderContext::default());
        let image = surface
            .snapshot(None, &SnapshotOptions { scale: Some(1.0) })
            .unwrap();

        assert_eq!(image.get_pixel(0, 0).0, [10, 20, 30, 255]);
        let failures = &surface.diagnostics().image_failures;
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].element.as_str(), "image-1");
    }

    /// Resolver that counts lookups and never finds anything decodable
    struct CountingResolver(Cell<usize>);

    impl ImageResolver for CountingResolver {
        fn resolve(&self, _source: &str) -> cert_template::Result<Vec<u8>> {
            self.0.set(self.0.get() + 1);
            Ok(b"not an image".to_vec())
        }
    }

    #[test]
    fn test_failed_images_are_not_retried() {
        let mut template = parse_template(TEMPLATE).unwrap();
        template.add_element(ElementKind::Image, &serde_json::json!({ "source": "broken" }));

        let resolver = Rc::new(CountingResolver(Cell::new(0)));
        let mut surface = RasterSurface::new().with_resolver(resolver.clone());
        surface.load_template(&template, RenderContext::default());

        let options = SnapshotOptions { scale: Some(0.5) };
        for _ in 0..3 {
            surface.snapshot(None, &options).unwrap();
            assert_eq!(surface.diagnostics().image_failures.len(), 1);
        }
        assert_eq!(resolver.0.get(), 1);

        // loading again forgets the failure
        surface.load_template(&template, RenderContext::default());
        surface.snapshot(None, &options).unwrap();
        assert_eq!(resolver.0.get(), 2);
    }
}
