//! High-level image operations.
//!
//! Each function takes the raw uploaded bytes plus typed parameters and
//! returns an encoded PNG. Decoding, color-mode conversion, the pixel filter,
//! and encoding happen here so handlers never touch pixel buffers.
//!
//! | Operation | Working mode | Output |
//! |---|---|---|
//! | [`remove_background`] | RGBA | RGBA, background transparent |
//! | [`crop`] | RGBA | RGBA, ellipse-masked when circular |
//! | [`sharpen`] | RGBA | RGBA |
//! | [`black_and_white`] | RGBA | RGBA (opaque at full intensity) |
//! | [`adjust_hue`] | RGB | RGB |
//! | [`adjust_contrast`] | RGBA | RGBA |
//! | [`adjust_saturation`] | RGBA | RGBA |
//! | [`invert_colors`] | RGB | RGB |

use super::backend::{BackendError, Segmenter};
use super::calculations::clamp_crop_box;
use super::codec::{decode, encode_png};
use super::filters;
use super::params::{CropRequest, Factor, HueShift, Intensity};
use image::DynamicImage;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Cut out the foreground using `segmenter`; the background becomes transparent.
pub fn remove_background(segmenter: &dyn Segmenter, bytes: &[u8]) -> Result<Vec<u8>> {
    let image = decode(bytes)?.to_rgba8();
    let mask = segmenter.segment(&image)?;
    let cut = filters::apply_foreground_mask(image, &mask)?;
    encode_png(&DynamicImage::ImageRgba8(cut))
}

/// Crop to the requested rectangle (clamped to the image), optionally keeping
/// only the inscribed ellipse.
pub fn crop(bytes: &[u8], request: &CropRequest) -> Result<Vec<u8>> {
    let image = decode(bytes)?.to_rgba8();
    let region = clamp_crop_box(image.dimensions(), request).ok_or_else(|| {
        BackendError::InvalidGeometry("Crop width and height must be positive.".into())
    })?;

    let mut cropped = filters::crop(&image, region);
    if request.circular {
        cropped = filters::mask_inscribed_ellipse(&cropped);
    }
    encode_png(&DynamicImage::ImageRgba8(cropped))
}

/// Sharpen (or soften, at low intensity) the image.
pub fn sharpen(bytes: &[u8], intensity: Intensity) -> Result<Vec<u8>> {
    let image = decode(bytes)?.to_rgba8();
    let sharpened = filters::sharpen(&image, intensity.sharpen_factor());
    encode_png(&DynamicImage::ImageRgba8(sharpened))
}

/// Convert to grayscale, blended with the original by `intensity`.
pub fn black_and_white(bytes: &[u8], intensity: Intensity) -> Result<Vec<u8>> {
    let image = decode(bytes)?.to_rgba8();
    let bw = filters::black_and_white(&image, intensity);
    encode_png(&DynamicImage::ImageRgba8(bw))
}

/// Rotate every hue by `shift` degrees. Transparency is dropped.
pub fn adjust_hue(bytes: &[u8], shift: HueShift) -> Result<Vec<u8>> {
    let image = decode(bytes)?.to_rgb8();
    let shifted = filters::shift_hue(&image, shift);
    encode_png(&DynamicImage::ImageRgb8(shifted))
}

pub fn adjust_contrast(bytes: &[u8], factor: Factor) -> Result<Vec<u8>> {
    let image = decode(bytes)?.to_rgba8();
    let adjusted = filters::adjust_contrast(&image, factor);
    encode_png(&DynamicImage::ImageRgba8(adjusted))
}

pub fn adjust_saturation(bytes: &[u8], factor: Factor) -> Result<Vec<u8>> {
    let image = decode(bytes)?.to_rgba8();
    let adjusted = filters::adjust_saturation(&image, factor);
    encode_png(&DynamicImage::ImageRgba8(adjusted))
}

/// Invert every color channel. Transparency is dropped.
pub fn invert_colors(bytes: &[u8]) -> Result<Vec<u8>> {
    let image = decode(bytes)?.into_rgb8();
    encode_png(&DynamicImage::ImageRgb8(filters::invert(image)))
}
