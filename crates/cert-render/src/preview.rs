//! Preview scheduling with cancel-and-replace semantics
//!
//! Every request supersedes the previous one. A preview computed for an
//! older request is dropped when it completes, so the displayed preview
//! always belongs to the latest template state.

use crate::Result;
use image::{ImageFormat, RgbaImage};
use std::collections::HashSet;
use std::io::Cursor;

/// Encode a raster as PNG bytes
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Cursor::new(Vec::new());
    image.write_to(&mut bytes, ImageFormat::Png)?;
    Ok(bytes.into_inner())
}

/// Issues blob URLs for preview bytes (object URLs in a browser)
pub trait BlobRegistry {
    fn create(&mut self, bytes: Vec<u8>, mime: &str) -> String;
    fn revoke(&mut self, url: &str);
}

/// In-memory registry that tracks which URLs are live
#[derive(Debug, Default)]
pub struct MemoryBlobRegistry {
    next: u64,
    live: HashSet<String>,
}

impl MemoryBlobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn is_live(&self, url: &str) -> bool {
        self.live.contains(url)
    }
}

impl BlobRegistry for MemoryBlobRegistry {
    fn create(&mut self, _bytes: Vec<u8>, _mime: &str) -> String {
        self.next += 1;
        let url = format!("blob:memory/{}", self.next);
        self.live.insert(url.clone());
        url
    }

    fn revoke(&mut self, url: &str) {
        self.live.remove(url);
    }
}

/// Holds the single live preview URL
#[derive(Debug, Default)]
pub struct PreviewSlot {
    url: Option<String>,
}

impl PreviewSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Publish `bytes` and revoke the previous URL
    pub fn replace(&mut self, bytes: Vec<u8>, mime: &str, registry: &mut dyn BlobRegistry) -> &str {
        let url = registry.create(bytes, mime);
        if let Some(old) = self.url.replace(url) {
            registry.revoke(&old);
        }
        self.url.as_deref().unwrap_or_default()
    }

    /// Revoke the current URL, if any
    pub fn clear(&mut self, registry: &mut dyn BlobRegistry) {
        if let Some(old) = self.url.take() {
            registry.revoke(&old);
        }
    }
}

/// Identifies one preview request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewTicket {
    generation: u64,
}

impl PreviewTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Generation counter deciding which preview may be displayed
#[derive(Debug, Default)]
pub struct PreviewScheduler {
    generation: u64,
}

impl PreviewScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new preview, superseding any in flight
    pub fn request(&mut self) -> PreviewTicket {
        self.generation += 1;
        PreviewTicket {
            generation: self.generation,
        }
    }

    /// Whether `ticket` belongs to the latest request
    pub fn is_current(&self, ticket: PreviewTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Publish a finished preview if its ticket is still current
    ///
    /// Returns false when the preview was stale and discarded.
    pub fn commit(
        &self,
        ticket: PreviewTicket,
        png: Vec<u8>,
        slot: &mut PreviewSlot,
        registry: &mut dyn BlobRegistry,
    ) -> bool {
        if !self.is_current(ticket) {
            log::debug!(
                "Discarding stale preview {} (latest is {})",
                ticket.generation,
                self.generation
            );
            return false;
        }

        slot.replace(png, "image/png", registry);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_latest_ticket_commits() {
        let mut scheduler = PreviewScheduler::new();
        let mut slot = PreviewSlot::new();
        let mut registry = MemoryBlobRegistry::new();

        let first = scheduler.request();
        let second = scheduler.request();

        // the first render finishes last and must not win
        assert!(scheduler.commit(second, vec![2], &mut slot, &mut registry));
        assert!(!scheduler.commit(first, vec![1], &mut slot, &mut registry));

        assert_eq!(slot.url(), Some("blob:memory/1"));
        assert_eq!(registry.live_count(), 1);
    }

    #[test]
    fn test_replace_revokes_previous_url() {
        let mut slot = PreviewSlot::new();
        let mut registry = MemoryBlobRegistry::new();

        let first = slot.replace(vec![1], "image/png", &mut registry).to_string();
        let second = slot.replace(vec![2], "image/png", &mut registry).to_string();

        assert!(!registry.is_live(&first));
        assert!(registry.is_live(&second));
        assert_eq!(registry.live_count(), 1);

        slot.clear(&mut registry);
        assert_eq!(registry.live_count(), 0);
        assert_eq!(slot.url(), None);
    }

    #[test]
    fn test_encode_png_signature() {
        let png = encode_png(&RgbaImage::new(3, 2)).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
