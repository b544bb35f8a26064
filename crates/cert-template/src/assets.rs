//! Image source resolution
//!
//! Template image sources are plain strings. They are resolved to encoded
//! image bytes from:
//! - `data:<mime>;base64,<payload>` URIs
//! - keys registered in an [`AssetStore`]
//! - file paths starting with `/`, `./` or `../` (not available in WASM)

use crate::{Result, TemplateError};
use base64::Engine;
use std::collections::HashMap;

/// Resolves an image source string to encoded image bytes
pub trait ImageResolver {
    fn resolve(&self, source: &str) -> Result<Vec<u8>>;
}

/// In-memory image assets keyed by name
#[derive(Debug, Clone, Default)]
pub struct AssetStore {
    assets: HashMap<String, Vec<u8>>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) an asset
    pub fn insert(&mut self, key: impl Into<String>, bytes: Vec<u8>) {
        self.assets.insert(key.into(), bytes);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.assets.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

fn decode_data_uri(source: &str) -> Result<Vec<u8>> {
    let comma = source
        .find(',')
        .ok_or_else(|| TemplateError::ImageError("Invalid data URI: missing comma".to_string()))?;
    let (meta, payload) = (&source[..comma], &source[comma + 1..]);

    if !meta.ends_with(";base64") {
        return Err(TemplateError::ImageError(
            "Only base64 data URIs are supported".to_string(),
        ));
    }

    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| TemplateError::ImageError(format!("Base64 decode error: {e}")))
}

fn is_path(source: &str) -> bool {
    source.starts_with('/') || source.starts_with("./") || source.starts_with("../")
}

impl ImageResolver for AssetStore {
    fn resolve(&self, source: &str) -> Result<Vec<u8>> {
        let source = source.trim();
        if source.is_empty() {
            return Err(TemplateError::ImageError("Empty image source".to_string()));
        }

        if source.starts_with("data:") {
            return decode_data_uri(source);
        }

        if let Some(bytes) = self.assets.get(source) {
            return Ok(bytes.clone());
        }

        if is_path(source) {
            #[cfg(not(target_arch = "wasm32"))]
            {
                return std::fs::read(source).map_err(|e| {
                    TemplateError::ImageError(format!("Failed to read image file '{source}': {e}"))
                });
            }
            #[cfg(target_arch = "wasm32")]
            {
                return Err(TemplateError::ImageError(format!(
                    "File path images not supported in WASM: '{source}'"
                )));
            }
        }

        Err(TemplateError::ImageError(format!(
            "Unknown image source '{source}'"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_uri() {
        let store = AssetStore::new();
        // "PNG" in base64
        let bytes = store.resolve("data:image/png;base64,UE5H").unwrap();
        assert_eq!(bytes, b"PNG");
    }

    #[test]
    fn test_bad_data_uris() {
        let store = AssetStore::new();
        assert!(store.resolve("data:image/png;base64").is_err());
        assert!(store.resolve("data:text/plain,hello").is_err());
        assert!(store.resolve("data:image/png;base64,!!!").is_err());
    }

    #[test]
    fn test_registered_asset() {
        let mut store = AssetStore::new();
        store.insert("logo", vec![1, 2, 3]);
        assert_eq!(store.resolve("logo").unwrap(), vec![1, 2, 3]);
        assert!(matches!(
            store.resolve("seal"),
            Err(TemplateError::ImageError(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let store = AssetStore::new();
        assert!(store.resolve("./definitely/not/here.png").is_err());
        assert!(store.resolve("   ").is_err());
    }
}
