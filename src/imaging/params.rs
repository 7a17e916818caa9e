//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the HTTP handlers (which parse form fields) and the
//! [`operations`](super::operations) module (which does the pixel work).
//!
//! ## Types
//!
//! - [`Intensity`] — strength of an effect in `[0, 1]` (default 1.0). Clamped on construction.
//! - [`Factor`] — enhancement factor where 1.0 leaves the image unchanged. Never clamped.
//! - [`HueShift`] — hue rotation in degrees, any value (wraps around the color circle).
//! - [`CropRequest`] — raw crop coordinates as submitted, before clamping.
//! - [`CropBox`] — a crop rectangle known to lie inside the source image.

/// Effect strength in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intensity(f32);

impl Intensity {
    pub fn new(value: f32) -> Self {
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// Map the intensity onto a sharpness enhancement factor.
    ///
    /// `0.0 → 0.5` (softened), `0.2 → 1.0` (unchanged), `1.0 → 3.0` (strongly sharpened).
    pub fn sharpen_factor(self) -> f32 {
        0.5 + self.0 * 2.5
    }

    /// Whether this intensity means "apply the effect completely".
    pub fn is_full(self) -> bool {
        self.0 >= 1.0
    }
}

impl Default for Intensity {
    fn default() -> Self {
        Self(1.0)
    }
}

/// Multiplicative enhancement factor: 0.0 = degenerate image, 1.0 = unchanged,
/// 2.0 = twice the distance from the degenerate image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Factor(pub f32);

impl Factor {
    pub fn value(self) -> f32 {
        self.0
    }
}

impl Default for Factor {
    fn default() -> Self {
        Self(1.0)
    }
}

/// Hue rotation in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HueShift(pub f64);

impl HueShift {
    pub fn degrees(self) -> f64 {
        self.0
    }
}

/// Crop coordinates as submitted by the client.
///
/// `width`/`height` default to the full source dimensions when absent, which
/// can only be resolved once the image is decoded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CropRequest {
    pub x: i64,
    pub y: i64,
    pub width: Option<i64>,
    pub height: Option<i64>,
    /// Apply an inscribed-ellipse alpha mask after cropping.
    pub circular: bool,
}

/// A crop rectangle inside the source image, with non-zero area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intensity_clamps_to_unit_range() {
        assert_eq!(Intensity::new(-0.5).value(), 0.0);
        assert_eq!(Intensity::new(0.25).value(), 0.25);
        assert_eq!(Intensity::new(7.0).value(), 1.0);
    }

    #[test]
    fn intensity_default_is_full() {
        assert_eq!(Intensity::default().value(), 1.0);
        assert!(Intensity::default().is_full());
        assert!(!Intensity::new(0.99).is_full());
    }

    #[test]
    fn sharpen_factor_spans_half_to_three() {
        assert_eq!(Intensity::new(0.0).sharpen_factor(), 0.5);
        assert!((Intensity::new(0.2).sharpen_factor() - 1.0).abs() < 1e-6);
        assert_eq!(Intensity::new(1.0).sharpen_factor(), 3.0);
    }

    #[test]
    fn factor_is_not_clamped() {
        assert_eq!(Factor(-3.0).value(), -3.0);
        assert_eq!(Factor(12.5).value(), 12.5);
        assert_eq!(Factor::default().value(), 1.0);
    }
}
