//! Shared test utilities for the kreate-server test suite.
//!
//! Provides synthetic image builders, PNG encode/decode shortcuts, and pixel
//! comparison assertions that work with `image` buffers.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let upload = png_bytes(&DynamicImage::ImageRgba8(solid_rgba(8, 8, [255, 0, 0, 255])));
//! let out = decode_png(&operations::invert_colors(&upload).unwrap());
//! assert_rgb_close(&out.to_rgb8(), &solid_rgb(8, 8, [0, 255, 255]), 0);
//! ```

use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;

// =========================================================================
// Synthetic images
// =========================================================================

/// Single-color RGBA image.
pub fn solid_rgba(width: u32, height: u32, rgba: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(rgba))
}

/// Single-color RGB image.
pub fn solid_rgb(width: u32, height: u32, rgb: [u8; 3]) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb(rgb))
}

/// Opaque RGBA image whose channels vary with position, so crops and
/// filters produce distinguishable output.
pub fn gradient_rgba(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            ((x + y) * 7 % 256) as u8,
            255,
        ])
    })
}

/// RGB counterpart of [`gradient_rgba`].
pub fn gradient_rgb(width: u32, height: u32) -> RgbImage {
    DynamicImage::ImageRgba8(gradient_rgba(width, height)).to_rgb8()
}

// =========================================================================
// Encoding shortcuts — panic on failure
// =========================================================================

/// Encode an image as PNG bytes, as a client would upload it.
pub fn png_bytes(image: &DynamicImage) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

/// Decode a PNG response body, asserting it really is a PNG.
pub fn decode_png(bytes: &[u8]) -> DynamicImage {
    assert_eq!(
        image::guess_format(bytes).unwrap(),
        ImageFormat::Png,
        "response is not a PNG"
    );
    image::load_from_memory_with_format(bytes, ImageFormat::Png).unwrap()
}

// =========================================================================
// Pixel assertions
// =========================================================================

/// Assert two RGB images have equal size and every channel within `tolerance`.
pub fn assert_rgb_close(actual: &RgbImage, expected: &RgbImage, tolerance: u8) {
    assert_eq!(actual.dimensions(), expected.dimensions(), "size mismatch");
    for (x, y, got) in actual.enumerate_pixels() {
        let want = expected.get_pixel(x, y);
        for c in 0..3 {
            assert!(
                got[c].abs_diff(want[c]) <= tolerance,
                "pixel ({x},{y}): got {:?}, expected {:?} (tolerance {tolerance})",
                got.0,
                want.0
            );
        }
    }
}
