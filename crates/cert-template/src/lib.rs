//! Certificate templates - model, data binding and field matching
//!
//! This crate provides:
//! - Template JSON schema types and mutation operations
//! - Unit conversion between document millimetres and surface pixels
//! - Tabular data sources and `{{field}}` substitution
//! - Heuristic matching of data columns to template fields
//! - Image source resolution (data URIs, registered assets, paths)
//!
//! # Example
//!
//! ```ignore
//! use cert_template::{parse_template, resolve_text, DataSource, Element};
//!
//! let template = parse_template(template_json)?;
//! let data = DataSource::from_records(headers, records)?;
//! for element in &template.elements {
//!     if let Element::Text(text) = element {
//!         println!("{}", resolve_text(text, &data.rows[0]));
//!     }
//! }
//! ```

mod assets;
mod binding;
mod data;
pub mod matcher;
mod model;
pub mod parser;
mod schema;
pub mod units;

pub use assets::{AssetStore, ImageResolver};
pub use binding::{placeholders, resolve_text, substitute_placeholders, substitute_with};
pub use data::{DataSource, Row};
pub use matcher::{
    apply_bindings, detect_fields, match_headers, place_unmatched, propose_bindings,
    unmatched_headers, BindingProposal, Confidence,
};
pub use model::ElementKind;
pub use parser::parse_template;
pub use schema::*;
pub use units::RenderContext;

use thiserror::Error;

/// Errors that can occur during template processing
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Failed to parse template: {0}")]
    ParseError(String),

    #[error("Invalid input: {0}")]
    InputError(String),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type for template operations
pub type Result<T> = std::result::Result<T, TemplateError>;
