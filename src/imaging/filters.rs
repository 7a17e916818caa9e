//! Pixel filters — pure Rust, built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Implementation |
//! |---|---|
//! | Crop | `image::imageops::crop_imm` |
//! | Circular mask | inscribed-ellipse alpha mask |
//! | Sharpness | `image::imageops::filter3x3` smoothing, then enhancement blend |
//! | Contrast / saturation | enhancement blend against a gray degenerate image |
//! | Black & white | ITU-R 601-2 luma, optional blend with the original |
//! | Hue | 8-bit HSV round trip with a 256-entry hue lookup table |
//! | Invert | `image::DynamicImage::invert` on RGB |
//! | Background cutout | segmentation mask multiplied into alpha |
//!
//! The enhancement filters share one model: build a *degenerate* version of
//! the image (blurred, flat gray, or desaturated), then move each sample from
//! the degenerate value towards the original by `factor`. A factor of 1.0
//! reproduces the input exactly; 0.0 yields the degenerate image; values above
//! 1.0 exaggerate the difference. Whole-buffer loops run on the rayon pool.

use super::backend::BackendError;
use super::calculations::{
    blend, hsv_to_rgb, hue_lookup_table, inside_inscribed_ellipse, luma, rgb_to_hsv,
};
use super::params::{CropBox, Factor, HueShift, Intensity};
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, Rgba, RgbImage, RgbaImage};
use rayon::prelude::*;

/// 3×3 smoothing kernel used as the degenerate image for sharpening.
const SMOOTH_KERNEL: [f32; 9] = [1.0, 1.0, 1.0, 1.0, 5.0, 1.0, 1.0, 1.0, 1.0];

/// Extract `region` from `image`.
pub fn crop(image: &RgbaImage, region: CropBox) -> RgbaImage {
    imageops::crop_imm(image, region.x, region.y, region.width, region.height).to_image()
}

/// Keep only the ellipse inscribed in the image bounds; everything outside
/// becomes fully transparent.
///
/// The mask is binary: pixels inside keep their color and alpha unchanged.
pub fn mask_inscribed_ellipse(image: &RgbaImage) -> RgbaImage {
    let (width, height) = image.dimensions();
    RgbaImage::from_fn(width, height, |x, y| {
        if inside_inscribed_ellipse(x, y, width, height) {
            *image.get_pixel(x, y)
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

/// Move every sample of `degenerate` towards `source` by `factor`.
fn enhance(source: &RgbaImage, mut degenerate: RgbaImage, factor: f32) -> RgbaImage {
    let samples: &mut [u8] = &mut degenerate;
    samples
        .par_iter_mut()
        .zip(source.as_raw().par_iter())
        .for_each(|(d, &s)| *d = blend(*d, s, factor));
    degenerate
}

/// Smoothed copy of `image`: interior pixels go through the 3×3 kernel, the
/// one-pixel border and the alpha channel are copied from the source.
fn smooth(image: &RgbaImage) -> RgbaImage {
    let (width, height) = image.dimensions();
    if width < 3 || height < 3 {
        // No interior pixels.
        return image.clone();
    }
    // filter3x3 truncates its sums, so results can sit one level below a rounding filter.
    let filtered: RgbaImage = imageops::filter3x3(image, &SMOOTH_KERNEL[..]);
    RgbaImage::from_fn(width, height, |x, y| {
        let src = image.get_pixel(x, y);
        if x == 0 || y == 0 || x + 1 >= width || y + 1 >= height {
            *src
        } else {
            let f = filtered.get_pixel(x, y);
            Rgba([f[0], f[1], f[2], src[3]])
        }
    })
}

/// Sharpness enhancement at `factor` (1.0 = unchanged, < 1.0 softer, > 1.0 sharper).
pub fn sharpen(image: &RgbaImage, factor: f32) -> RgbaImage {
    enhance(image, smooth(image), factor)
}

/// Contrast enhancement against a flat gray at the image's mean luma.
pub fn adjust_contrast(image: &RgbaImage, factor: Factor) -> RgbaImage {
    let mean = mean_luma(image);
    let (width, height) = image.dimensions();
    let degenerate = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([mean, mean, mean, image.get_pixel(x, y)[3]])
    });
    enhance(image, degenerate, factor.value())
}

/// Saturation enhancement against the per-pixel gray of the image.
pub fn adjust_saturation(image: &RgbaImage, factor: Factor) -> RgbaImage {
    let mut degenerate = image.clone();
    degenerate.par_chunks_exact_mut(4).for_each(|px| {
        let l = luma(px[0], px[1], px[2]);
        px[0] = l;
        px[1] = l;
        px[2] = l;
    });
    enhance(image, degenerate, factor.value())
}

/// Grayscale conversion, blended with the original when `intensity` is below 1.
///
/// Full intensity yields opaque gray; partial intensities blend every channel,
/// alpha included, towards that opaque gray.
pub fn black_and_white(image: &RgbaImage, intensity: Intensity) -> RgbaImage {
    let mut gray = image.clone();
    gray.par_chunks_exact_mut(4).for_each(|px| {
        let l = luma(px[0], px[1], px[2]);
        px.copy_from_slice(&[l, l, l, 255]);
    });

    if intensity.is_full() {
        return gray;
    }

    let weight = intensity.value();
    let samples: &mut [u8] = &mut gray;
    samples
        .par_iter_mut()
        .zip(image.as_raw().par_iter())
        .for_each(|(g, &orig)| *g = blend(orig, *g, weight));
    gray
}

/// Rotate the hue of every pixel by `shift` degrees through 8-bit HSV.
pub fn shift_hue(image: &RgbImage, shift: HueShift) -> RgbImage {
    let table = hue_lookup_table(shift.degrees());
    let mut out = image.clone();
    out.par_chunks_exact_mut(3).for_each(|px| {
        let [h, s, v] = rgb_to_hsv([px[0], px[1], px[2]]);
        px.copy_from_slice(&hsv_to_rgb([table[h as usize], s, v]));
    });
    out
}

/// Invert every color channel. Alpha is not part of the input.
pub fn invert(image: RgbImage) -> RgbImage {
    let mut inverted = DynamicImage::ImageRgb8(image);
    inverted.invert();
    inverted.into_rgb8()
}

/// Multiply a segmentation mask into the alpha channel of `image`.
///
/// Masks of a different size are resized to the image first. Pixels that end
/// up fully transparent are cleared to `(0, 0, 0, 0)`.
pub fn apply_foreground_mask(
    mut image: RgbaImage,
    mask: &GrayImage,
) -> Result<RgbaImage, BackendError> {
    let (width, height) = image.dimensions();
    if mask.width() == 0 || mask.height() == 0 {
        return Err(BackendError::Segmentation(
            "segmentation model returned an empty mask".into(),
        ));
    }
    let resized;
    let mask = if mask.dimensions() == (width, height) {
        mask
    } else {
        resized = imageops::resize(mask, width, height, FilterType::Triangle);
        &resized
    };

    image
        .par_chunks_exact_mut(4)
        .zip(mask.as_raw().par_iter())
        .for_each(|(px, &m)| {
            let alpha = (u32::from(px[3]) * u32::from(m) + 127) / 255;
            if alpha == 0 {
                px.copy_from_slice(&[0, 0, 0, 0]);
            } else {
                px[3] = alpha as u8;
            }
        });
    Ok(image)
}

/// Mean ITU-R 601-2 luma over all pixels, rounded.
fn mean_luma(image: &RgbaImage) -> u8 {
    let count = u64::from(image.width()) * u64::from(image.height());
    if count == 0 {
        return 0;
    }
    let sum: u64 = image
        .as_raw()
        .par_chunks_exact(4)
        .map(|px| u64::from(luma(px[0], px[1], px[2])))
        .sum();
    ((sum as f64 / count as f64) + 0.5) as u8
}
