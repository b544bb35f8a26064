//! Template mutation operations
//!
//! Every operation is total: an unknown id or an ill-typed patch leaves the
//! template untouched and reports `false`.

use crate::schema::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Element kinds that can be added to a template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Text,
    Image,
    Rectangle,
    Circle,
    Line,
}

impl ElementKind {
    /// Prefix used for generated ids
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Text => "text",
            ElementKind::Image => "image",
            ElementKind::Rectangle => "rectangle",
            ElementKind::Circle => "circle",
            ElementKind::Line => "line",
        }
    }

    /// A fresh element of this kind at the default position
    pub fn default_element(&self, id: ElementId) -> Element {
        let (x, y) = (20.0, 20.0);
        match self {
            ElementKind::Text => Element::Text(TextElement {
                id,
                x,
                y,
                rotation: 0.0,
                content: "New text".to_string(),
                width: 100.0,
                font_size_mm: 8.0,
                font_family: "Helvetica".to_string(),
                bold: false,
                italic: false,
                color: Color::black(),
                align: Align::Left,
                is_dynamic: false,
                data_field: None,
            }),
            ElementKind::Image => Element::Image(ImageElement {
                id,
                x,
                y,
                rotation: 0.0,
                source: String::new(),
                width_mm: 60.0,
                height_mm: 40.0,
            }),
            ElementKind::Rectangle => Element::Rectangle(RectangleElement {
                id,
                x,
                y,
                rotation: 0.0,
                width_mm: 60.0,
                height_mm: 40.0,
                stroke_color: Color::black(),
                stroke_width_mm: 0.5,
                filled: false,
                fill_color: Color::white(),
            }),
            ElementKind::Circle => Element::Circle(CircleElement {
                id,
                x,
                y,
                rotation: 0.0,
                radius_mm: 20.0,
                stroke_color: Color::black(),
                stroke_width_mm: 0.5,
                filled: false,
                fill_color: Color::white(),
            }),
            ElementKind::Line => Element::Line(LineElement {
                id,
                x,
                y,
                rotation: 0.0,
                width_mm: 100.0,
                stroke_width_mm: 0.5,
                color: Color::black(),
            }),
        }
    }
}

impl From<&Element> for ElementKind {
    fn from(element: &Element) -> Self {
        match element {
            Element::Text(_) => ElementKind::Text,
            Element::Image(_) => ElementKind::Image,
            Element::Rectangle(_) => ElementKind::Rectangle,
            Element::Circle(_) => ElementKind::Circle,
            Element::Line(_) => ElementKind::Line,
        }
    }
}

/// Merge `patch` into `target` key by key
///
/// Returns `None` if `patch` is not an object or tries to change one of the
/// `immutable` keys.
fn merge_patch(target: Value, patch: &Value, immutable: &[&str]) -> Option<Value> {
    let patch = patch.as_object()?;
    let Value::Object(mut object) = target else {
        return None;
    };

    for (key, value) in patch {
        if immutable.contains(&key.as_str()) {
            if object.get(key) != Some(value) {
                return None;
            }
            continue;
        }
        object.insert(key.clone(), value.clone());
    }

    Some(Value::Object(object))
}

impl Template {
    /// Generate an id `"<kind>-<n>"` not yet used in this template
    pub fn next_element_id(&mut self, kind: ElementKind) -> ElementId {
        loop {
            self.next_id += 1;
            let id = ElementId(format!("{}-{}", kind.as_str(), self.next_id));
            if self.element(&id).is_none() {
                return id;
            }
        }
    }

    /// Add an element of `kind`, overriding its defaults with the fields in
    /// `defaults` (a JSON object, or `null` for none)
    ///
    /// Invalid overrides are ignored and logged; the element is still added.
    pub fn add_element(&mut self, kind: ElementKind, defaults: &Value) -> ElementId {
        let id = self.next_element_id(kind);
        let mut element = kind.default_element(id.clone());

        if !defaults.is_null() {
            match patched(&element, defaults) {
                Some(with_defaults) => element = with_defaults,
                None => log::warn!("Ignoring invalid defaults for new {} element", kind.as_str()),
            }
        }

        self.elements.push(element);
        id
    }

    /// Append a fully built element
    ///
    /// A missing or already used id is replaced by a generated one.
    pub fn push_element(&mut self, mut element: Element) -> ElementId {
        if element.id().as_str().is_empty() || self.element(element.id()).is_some() {
            let id = self.next_element_id(ElementKind::from(&element));
            element.set_id(id);
        }
        let id = element.id().clone();
        self.elements.push(element);
        id
    }

    /// Shallow-merge `patch` into the element with `id`
    ///
    /// `id` and `type` cannot be changed.
    pub fn update_element(&mut self, id: &ElementId, patch: &Value) -> bool {
        let Some(index) = self.elements.iter().position(|e| e.id() == id) else {
            log::warn!("update_element: unknown element {id}");
            return false;
        };

        match patched(&self.elements[index], patch) {
            Some(element) => {
                self.elements[index] = element;
                true
            }
            None => {
                log::warn!("update_element: rejected patch for {id}: {patch}");
                false
            }
        }
    }

    /// Remove the element with `id`
    pub fn remove_element(&mut self, id: &ElementId) -> bool {
        let before = self.elements.len();
        self.elements.retain(|e| e.id() != id);
        let removed = self.elements.len() != before;
        if !removed {
            log::warn!("remove_element: unknown element {id}");
        }
        removed
    }

    /// Shallow-merge `patch` into the template-level settings
    ///
    /// `elements` cannot be replaced through a settings patch.
    pub fn update_settings(&mut self, patch: &Value) -> bool {
        let Ok(mut current) = serde_json::to_value(&*self) else {
            return false;
        };
        if let Value::Object(object) = &mut current {
            object.remove("elements");
        }

        let updated = merge_patch(current, patch, &["elements"])
            .and_then(|value| serde_json::from_value::<Template>(value).ok());

        match updated {
            Some(settings) => {
                self.name = settings.name;
                self.orientation = settings.orientation;
                self.page_format = settings.page_format;
                self.background_color = settings.background_color;
                self.background_image = settings.background_image;
                self.border = settings.border;
                self.use_snapshot_generation = settings.use_snapshot_generation;
                true
            }
            None => {
                log::warn!("update_settings: rejected patch {patch}");
                false
            }
        }
    }

    /// Replace empty or duplicate ids with generated ones
    pub(crate) fn ensure_unique_ids(&mut self) {
        let mut seen = std::collections::HashSet::new();
        for index in 0..self.elements.len() {
            let id = self.elements[index].id().clone();
            if id.as_str().is_empty() || !seen.insert(id) {
                let kind = ElementKind::from(&self.elements[index]);
                let fresh = self.next_element_id(kind);
                seen.insert(fresh.clone());
                self.elements[index].set_id(fresh);
            }
        }
    }
}

fn patched(element: &Element, patch: &Value) -> Option<Element> {
    let current = serde_json::to_value(element).ok()?;
    let merged = merge_patch(current, patch, &["id", "type"])?;
    serde_json::from_value(merged).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_add_generates_sequential_ids() {
        let mut template = Template::new("t");
        let a = template.add_element(ElementKind::Text, &Value::Null);
        let b = template.add_element(ElementKind::Rectangle, &Value::Null);
        assert_eq!(a.as_str(), "text-1");
        assert_eq!(b.as_str(), "rectangle-2");
    }

    #[test]
    fn test_generated_ids_skip_existing() {
        let mut template = Template::new("t");
        template.push_element(ElementKind::Text.default_element(ElementId::from("text-1")));
        let id = template.add_element(ElementKind::Text, &Value::Null);
        assert_eq!(id.as_str(), "text-2");
    }

    #[test]
    fn test_add_with_defaults() {
        let mut template = Template::new("t");
        let id = template.add_element(
            ElementKind::Text,
            &json!({ "content": "Hello", "x": 50, "align": "center" }),
        );
        let text = template.element(&id).and_then(Element::as_text).unwrap();
        assert_eq!(text.content, "Hello");
        assert_eq!(text.x, 50.0);
        assert_eq!(text.align, Align::Center);
    }

    #[test]
    fn test_add_with_bad_defaults_still_adds() {
        let mut template = Template::new("t");
        let id = template.add_element(ElementKind::Line, &json!({ "widthMm": "wide" }));
        assert!(template.element(&id).is_some());
    }

    #[test]
    fn test_update_element() {
        let mut template = Template::new("t");
        let id = template.add_element(ElementKind::Rectangle, &Value::Null);

        assert!(template.update_element(&id, &json!({ "x": 33, "filled": true })));
        match template.element(&id).unwrap() {
            Element::Rectangle(r) => {
                assert_eq!(r.x, 33.0);
                assert!(r.filled);
                assert_eq!(r.width_mm, 60.0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_update_rejections_leave_template_unchanged() {
        let mut template = Template::new("t");
        let id = template.add_element(ElementKind::Text, &Value::Null);
        let before = template.clone();

        assert!(!template.update_element(&ElementId::from("nope"), &json!({ "x": 1 })));
        assert!(!template.update_element(&id, &json!({ "fontSizeMm": "big" })));
        assert!(!template.update_element(&id, &json!({ "type": "image" })));
        assert!(!template.update_element(&id, &json!({ "id": "other" })));
        assert!(!template.update_element(&id, &json!([1, 2])));
        assert_eq!(template, before);

        // restating the current id is allowed
        assert!(template.update_element(&id, &json!({ "id": "text-1", "x": 5 })));
    }

    #[test]
    fn test_remove_element() {
        let mut template = Template::new("t");
        let id = template.add_element(ElementKind::Circle, &Value::Null);
        assert!(template.remove_element(&id));
        assert!(!template.remove_element(&id));
        assert!(template.elements.is_empty());
    }

    #[test]
    fn test_update_settings() {
        let mut template = Template::new("t");
        template.add_element(ElementKind::Text, &Value::Null);

        assert!(template.update_settings(&json!({
            "orientation": "portrait",
            "backgroundColor": "#fafafa",
            "border": { "color": "#c0a060", "widthMm": 2 }
        })));
        assert_eq!(template.orientation, Orientation::Portrait);
        assert_eq!(template.background_color, Color::from_rgb(0xfa, 0xfa, 0xfa));
        assert_eq!(template.border.as_ref().unwrap().width_mm, 2.0);
        assert_eq!(template.elements.len(), 1);

        assert!(!template.update_settings(&json!({ "pageFormat": "a3" })));
        assert!(!template.update_settings(&json!({ "elements": [] })));
        assert_eq!(template.page_format, PageFormat::A4);
        assert_eq!(template.elements.len(), 1);
    }

    #[test]
    fn test_ensure_unique_ids() {
        let mut template = Template::new("t");
        template.elements.push(ElementKind::Text.default_element(ElementId::from("a")));
        template.elements.push(ElementKind::Line.default_element(ElementId::from("a")));
        template.elements.push(ElementKind::Line.default_element(ElementId::default()));
        template.ensure_unique_ids();

        let ids: Vec<_> = template.elements.iter().map(|e| e.id().as_str()).collect();
        assert_eq!(ids, vec!["a", "line-1", "line-2"]);
    }
}
