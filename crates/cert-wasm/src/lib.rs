//! WASM bindings for certkit
//!
//! This crate provides JavaScript-friendly API for:
//! - Loading and editing certificate templates
//! - Matching spreadsheet columns to template fields
//! - Rendering single certificates, batches and PNG previews
//!
//! # Example (JavaScript)
//!
//! ```javascript
//! import init, { CertificateEngine } from 'cert-wasm';
//!
//! await init();
//!
//! const engine = CertificateEngine.fromJson(templateJson);
//! engine.registerAsset('logo', logoBytes);
//! engine.setDataJson(JSON.stringify({ headers, rows }));
//!
//! engine.applyBindings();
//! engine.placeUnmatched();
//!
//! const pdf = engine.generateCombined();
//! ```

use cert_render::{
    encode_png, BatchController, BatchMode, BatchOutput, EngineConfig, Exporter, FontBook,
    InteractiveSurface, RasterSurface, SnapshotOptions,
};
use cert_template::{
    apply_bindings, detect_fields, match_headers, place_unmatched, propose_bindings,
    unmatched_headers, AssetStore, DataSource, ElementId, ElementKind, RenderContext, Row,
    Template,
};
use std::collections::BTreeMap;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Parse an optional JSON object of column values
fn parse_row(row_json: Option<String>) -> Result<Option<Row>, JsValue> {
    row_json
        .filter(|json| !json.trim().is_empty())
        .map(|json| serde_json::from_str::<Row>(&json).map_err(js_error))
        .transpose()
}

/// Certificate template editor and renderer
#[wasm_bindgen]
pub struct CertificateEngine {
    template: Template,
    config: EngineConfig,
    assets: Rc<AssetStore>,
    fonts: Rc<FontBook>,
    data: Option<DataSource>,
}

#[wasm_bindgen]
impl CertificateEngine {
    /// Create an engine holding an empty A4 landscape template
    #[wasm_bindgen(constructor)]
    pub fn new() -> CertificateEngine {
        CertificateEngine {
            template: Template::default(),
            config: EngineConfig::default(),
            assets: Rc::new(AssetStore::new()),
            fonts: Rc::new(FontBook::new()),
            data: None,
        }
    }

    /// Create engine from template JSON
    ///
    /// @param json - Template JSON string
    /// @returns CertificateEngine instance
    #[wasm_bindgen(js_name = fromJson)]
    pub fn from_json(json: &str) -> Result<CertificateEngine, JsValue> {
        let mut engine = CertificateEngine::new();
        engine.load_template(json)?;
        Ok(engine)
    }

    /// Replace the template
    ///
    /// @param json - Template JSON string
    #[wasm_bindgen(js_name = loadTemplate)]
    pub fn load_template(&mut self, json: &str) -> Result<(), JsValue> {
        self.template = Template::from_json(json).map_err(js_error)?;
        Ok(())
    }

    /// Current template as pretty-printed JSON
    #[wasm_bindgen(js_name = templateJson)]
    pub fn template_json(&self) -> Result<String, JsValue> {
        self.template.to_json().map_err(js_error)
    }

    /// Set engine options
    ///
    /// @param json - EngineConfig JSON (camelCase, all fields optional)
    #[wasm_bindgen(js_name = setConfig)]
    pub fn set_config(&mut self, json: &str) -> Result<(), JsValue> {
        self.config = EngineConfig::from_json(json).map_err(js_error)?;
        Ok(())
    }

    /// Load the data source
    ///
    /// @param json - `{ "headers": [...], "rows": [{ column: value }, ...] }`
    #[wasm_bindgen(js_name = setDataJson)]
    pub fn set_data_json(&mut self, json: &str) -> Result<(), JsValue> {
        self.data = Some(DataSource::from_json(json).map_err(js_error)?);
        Ok(())
    }

    /// Number of loaded data rows
    #[wasm_bindgen(js_name = rowCount)]
    pub fn row_count(&self) -> usize {
        self.data.as_ref().map(DataSource::total_rows).unwrap_or(0)
    }

    /// Register an image for `source` references in the template
    ///
    /// @param key - Asset key used as an image source
    /// @param data - Image file bytes (Uint8Array)
    #[wasm_bindgen(js_name = registerAsset)]
    pub fn register_asset(&mut self, key: &str, data: &[u8]) {
        Rc::make_mut(&mut self.assets).insert(key, data.to_vec());
    }

    /// Register a TrueType face used for previews and snapshots
    ///
    /// @param family - Font family name as used in templates
    /// @param bold - Whether the face is bold
    /// @param italic - Whether the face is italic
    /// @param data - TTF file bytes (Uint8Array)
    #[wasm_bindgen(js_name = registerFont)]
    pub fn register_font(&mut self, family: &str, bold: bool, italic: bool, data: &[u8]) -> Result<(), JsValue> {
        Rc::make_mut(&mut self.fonts)
            .register(family, bold, italic, data.to_vec())
            .map_err(js_error)
    }

    /// Field names found in the template's text
    ///
    /// @returns Array of lower-case field names
    #[wasm_bindgen(js_name = detectFields)]
    pub fn detect_fields(&self) -> Vec<String> {
        detect_fields(&self.template.elements).into_iter().collect()
    }

    /// Match data headers to template fields
    ///
    /// @returns JSON object `{ field: header }`
    #[wasm_bindgen(js_name = matchHeaders)]
    pub fn match_headers(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.matches()?).map_err(js_error)
    }

    /// Binding proposals with confidence, one per field
    ///
    /// @returns JSON array of `{ templateField, matchedHeader, confidence }`
    #[wasm_bindgen(js_name = proposeBindings)]
    pub fn propose_bindings(&self) -> Result<String, JsValue> {
        let data = self.data()?;
        let proposals = propose_bindings(&data.headers, detect_fields(&self.template.elements));
        serde_json::to_string(&proposals).map_err(js_error)
    }

    /// Bind text elements to their matched headers
    ///
    /// @returns Number of elements changed
    #[wasm_bindgen(js_name = applyBindings)]
    pub fn apply_bindings(&mut self) -> Result<usize, JsValue> {
        let matches = self.matches()?;
        Ok(apply_bindings(&mut self.template, &matches))
    }

    /// Add a bound text element for every header no field matched
    ///
    /// @returns Number of elements added
    #[wasm_bindgen(js_name = placeUnmatched)]
    pub fn place_unmatched(&mut self) -> Result<usize, JsValue> {
        let matches = self.matches()?;
        let unmatched = unmatched_headers(&self.data()?.headers, &matches);
        self.template = place_unmatched(&self.template, &unmatched);
        Ok(unmatched.len())
    }

    /// Add an element
    ///
    /// @param kind - "text", "image", "rectangle", "circle" or "line"
    /// @param defaults - Optional object of initial camelCase fields
    /// @returns New element id
    #[wasm_bindgen(js_name = addElement)]
    pub fn add_element(&mut self, kind: &str, defaults: JsValue) -> Result<String, JsValue> {
        let kind: ElementKind = serde_json::from_value(serde_json::Value::String(kind.to_string()))
            .map_err(|_| JsValue::from_str(&format!("Unknown element kind '{kind}'")))?;
        let defaults: serde_json::Value = if defaults.is_undefined() || defaults.is_null() {
            serde_json::Value::Null
        } else {
            serde_wasm_bindgen::from_value(defaults)?
        };
        Ok(self.template.add_element(kind, &defaults).to_string())
    }

    /// Merge a patch into an element
    ///
    /// @param id - Element id
    /// @param patch - Object of camelCase fields
    /// @returns false when the id is unknown or the patch is invalid
    #[wasm_bindgen(js_name = updateElement)]
    pub fn update_element(&mut self, id: &str, patch: JsValue) -> Result<bool, JsValue> {
        let patch: serde_json::Value = serde_wasm_bindgen::from_value(patch)?;
        Ok(self.template.update_element(&ElementId::from(id), &patch))
    }

    /// Remove an element
    ///
    /// @param id - Element id
    /// @returns false when the id is unknown
    #[wasm_bindgen(js_name = removeElement)]
    pub fn remove_element(&mut self, id: &str) -> bool {
        self.template.remove_element(&ElementId::from(id))
    }

    /// Merge a patch into the page settings
    ///
    /// @param patch - Object of camelCase template fields (not `elements`)
    #[wasm_bindgen(js_name = updateSettings)]
    pub fn update_settings(&mut self, patch: JsValue) -> Result<bool, JsValue> {
        let patch: serde_json::Value = serde_wasm_bindgen::from_value(patch)?;
        Ok(self.template.update_settings(&patch))
    }

    /// Render one certificate
    ///
    /// @param rowJson - Optional JSON object of column values
    /// @returns PDF bytes (Uint8Array)
    #[wasm_bindgen(js_name = renderPdf)]
    pub fn render_pdf(&self, row_json: Option<String>) -> Result<Vec<u8>, JsValue> {
        let row = parse_row(row_json)?;
        self.exporter()
            .render_single(&self.template, row.as_ref())
            .map_err(js_error)
    }

    /// Render every data row into one PDF
    ///
    /// @returns PDF bytes (Uint8Array)
    #[wasm_bindgen(js_name = generateCombined)]
    pub fn generate_combined(&self) -> Result<Vec<u8>, JsValue> {
        match self.generate(BatchMode::Combined)? {
            BatchOutput::Combined(bytes) => Ok(bytes),
            BatchOutput::Separate(_) => Err(JsValue::from_str("Unexpected batch output")),
        }
    }

    /// Render one PDF per data row
    ///
    /// @returns Array of `{ filename, rowIndex, document, error }`; `document`
    /// is a Uint8Array, or null with `error` set when the row failed
    #[wasm_bindgen(js_name = generateSeparate)]
    pub fn generate_separate(&self) -> Result<js_sys::Array, JsValue> {
        let BatchOutput::Separate(documents) = self.generate(BatchMode::Separate)? else {
            return Err(JsValue::from_str("Unexpected batch output"));
        };

        let out = js_sys::Array::new();
        for document in documents {
            let entry = js_sys::Object::new();
            js_sys::Reflect::set(&entry, &"filename".into(), &document.filename.into())?;
            js_sys::Reflect::set(&entry, &"rowIndex".into(), &(document.row_index as u32).into())?;
            let (bytes, error): (JsValue, JsValue) = match &document.document {
                Ok(bytes) => (js_sys::Uint8Array::from(bytes.as_slice()).into(), JsValue::NULL),
                Err(e) => (JsValue::NULL, JsValue::from_str(&e.to_string())),
            };
            js_sys::Reflect::set(&entry, &"document".into(), &bytes)?;
            js_sys::Reflect::set(&entry, &"error".into(), &error)?;
            out.push(&entry);
        }
        Ok(out)
    }

    /// Rasterize the template for display
    ///
    /// @param rowJson - Optional JSON object of column values
    /// @param zoom - Display zoom (clamped to 0.1)
    /// @returns PNG bytes (Uint8Array)
    #[wasm_bindgen(js_name = renderPreviewPng)]
    pub fn render_preview_png(&self, row_json: Option<String>, zoom: f64) -> Result<Vec<u8>, JsValue> {
        let row = parse_row(row_json)?;
        let mut surface = RasterSurface::new()
            .with_resolver(self.assets.clone())
            .with_fonts(Rc::clone(&self.fonts));
        surface.load_template(&self.template, RenderContext::new(zoom, 1.0));

        let image = surface
            .snapshot(row.as_ref(), &SnapshotOptions::default())
            .map_err(js_error)?;
        encode_png(&image).map_err(js_error)
    }
}

impl CertificateEngine {
    fn data(&self) -> Result<&DataSource, JsValue> {
        self.data
            .as_ref()
            .ok_or_else(|| JsValue::from_str("No data loaded. Call setDataJson() first."))
    }

    fn matches(&self) -> Result<BTreeMap<String, String>, JsValue> {
        let data = self.data()?;
        Ok(match_headers(&data.headers, detect_fields(&self.template.elements)))
    }

    fn exporter(&self) -> Exporter {
        Exporter::new()
            .with_resolver(self.assets.clone())
            .with_fonts(Rc::clone(&self.fonts))
            .with_raster_multiplier(self.config.raster_multiplier)
    }

    fn generate(&self, mode: BatchMode) -> Result<BatchOutput, JsValue> {
        BatchController::new(self.config.clone())
            .with_resolver(self.assets.clone())
            .with_fonts(Rc::clone(&self.fonts))
            .generate(&self.template, self.data()?, mode)
            .map_err(js_error)
    }
}

impl Default for CertificateEngine {
    fn default() -> Self {
        Self::new()
    }
}
