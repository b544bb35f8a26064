//! Template JSON parsing

use crate::{Result, Template, TemplateError};

/// Parse a template from JSON string
///
/// Missing fields take their defaults, and empty or duplicate element ids
/// are replaced by generated ones.
pub fn parse_template(json: &str) -> Result<Template> {
    let mut template: Template =
        serde_json::from_str(json).map_err(|e| TemplateError::ParseError(e.to_string()))?;
    template.ensure_unique_ids();
    Ok(template)
}

impl Template {
    /// Parse a template from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        parse_template(json)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
