//! Unit conversion between document millimetres and surface pixels
//!
//! Templates store geometry in millimetres. Surfaces work in pixels at
//! `scale` pixels per millimetre, where `scale` combines the display zoom
//! (cosmetic) with the raster multiplier (output resolution).

use serde::{Deserialize, Serialize};

/// CSS pixels per millimetre at 100% zoom (96 dpi)
pub const PX_PER_MM: f64 = 96.0 / 25.4;

/// PDF points per millimetre
pub const PT_PER_MM: f64 = 72.0 / 25.4;

/// Smallest accepted zoom or raster multiplier
pub const MIN_ZOOM: f64 = 0.1;

fn check_scale(scale: f64) {
    assert!(
        scale > 0.0 && scale.is_finite(),
        "unit scale must be positive and finite, got {scale}"
    );
}

/// Millimetres to pixels
///
/// # Panics
/// If `scale` is not a positive finite number.
pub fn mm_to_px(value_mm: f64, scale: f64) -> f64 {
    check_scale(scale);
    value_mm * scale
}

/// Pixels to millimetres
///
/// # Panics
/// If `scale` is not a positive finite number.
pub fn px_to_mm(value_px: f64, scale: f64) -> f64 {
    check_scale(scale);
    value_px / scale
}

/// Pixels to whole millimetres, as persisted in templates
pub fn px_to_mm_rounded(value_px: f64, scale: f64) -> f64 {
    px_to_mm(value_px, scale).round()
}

pub fn mm_to_pt(value_mm: f64) -> f64 {
    value_mm * PT_PER_MM
}

pub fn pt_to_mm(value_pt: f64) -> f64 {
    value_pt / PT_PER_MM
}

fn clamp_factor(value: f64) -> f64 {
    if value.is_nan() {
        MIN_ZOOM
    } else {
        value.max(MIN_ZOOM)
    }
}

/// Transient scale information for a surface
///
/// Never stored in a template; recomputed whenever the surface resizes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderContext {
    /// Cosmetic on-screen zoom
    pub display_zoom: f64,
    /// Output quality factor
    pub raster_multiplier: f64,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self {
            display_zoom: 1.0,
            raster_multiplier: 1.0,
        }
    }
}

impl RenderContext {
    /// Create a context, clamping both factors to [`MIN_ZOOM`]
    pub fn new(display_zoom: f64, raster_multiplier: f64) -> Self {
        Self {
            display_zoom: clamp_factor(display_zoom),
            raster_multiplier: clamp_factor(raster_multiplier),
        }
    }

    /// Same context with a new zoom, clamped to [`MIN_ZOOM`]
    pub fn with_zoom(self, display_zoom: f64) -> Self {
        Self {
            display_zoom: clamp_factor(display_zoom),
            ..self
        }
    }

    /// Same context with a new raster multiplier, clamped to [`MIN_ZOOM`]
    pub fn with_raster_multiplier(self, raster_multiplier: f64) -> Self {
        Self {
            raster_multiplier: clamp_factor(raster_multiplier),
            ..self
        }
    }

    /// Pixels per millimetre of the raster buffer
    pub fn scale(&self) -> f64 {
        PX_PER_MM * self.display_zoom * self.raster_multiplier
    }

    /// Pixels per millimetre as displayed (ignores the raster multiplier)
    pub fn display_scale(&self) -> f64 {
        PX_PER_MM * self.display_zoom
    }

    pub fn mm_to_px(&self, value_mm: f64) -> f64 {
        mm_to_px(value_mm, self.scale())
    }

    pub fn px_to_mm(&self, value_px: f64) -> f64 {
        px_to_mm(value_px, self.scale())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverse_law() {
        for scale in [0.1, 1.0, PX_PER_MM, PX_PER_MM * 2.0, 13.7] {
            for v in [0.0, 1.0, 20.5, 210.0, 297.0, 1234.567] {
                let back = mm_to_px(px_to_mm(v, scale), scale);
                assert!((back - v).abs() < 1e-9, "{v} at {scale} gave {back}");
            }
        }
    }

    #[test]
    fn test_rounded_persist() {
        let scale = PX_PER_MM * 2.0;
        assert_eq!(px_to_mm_rounded(mm_to_px(20.4, scale), scale), 20.0);
        assert_eq!(px_to_mm_rounded(mm_to_px(20.6, scale), scale), 21.0);
    }

    #[test]
    fn test_points() {
        assert!((mm_to_pt(297.0) - 841.889_763_779).abs() < 1e-6);
        assert!((pt_to_mm(mm_to_pt(33.3)) - 33.3).abs() < 1e-9);
    }

    #[test]
    #[should_panic(expected = "unit scale must be positive")]
    fn test_zero_scale_panics() {
        mm_to_px(10.0, 0.0);
    }

    #[test]
    #[should_panic]
    fn test_negative_scale_panics() {
        px_to_mm(10.0, -1.0);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let ctx = RenderContext::default().with_zoom(0.0);
        assert_eq!(ctx.display_zoom, MIN_ZOOM);
        let ctx = RenderContext::new(f64::NAN, -3.0);
        assert_eq!(ctx.display_zoom, MIN_ZOOM);
        assert_eq!(ctx.raster_multiplier, MIN_ZOOM);
    }

    #[test]
    fn test_zoom_and_multiplier_are_separate() {
        let ctx = RenderContext::new(1.5, 2.0);
        assert!((ctx.scale() - PX_PER_MM * 3.0).abs() < 1e-12);
        assert!((ctx.display_scale() - PX_PER_MM * 1.5).abs() < 1e-12);
    }
}
