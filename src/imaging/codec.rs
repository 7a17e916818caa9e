//! Decoding uploads and encoding PNG responses.
//!
//! | Direction | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP, GIF, BMP) | `image::load_from_memory` (format sniffed from content) |
//! | Encode → PNG | `image::DynamicImage::write_to` with `ImageFormat::Png` |

use super::backend::BackendError;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

/// Decode uploaded bytes, guessing the format from the content.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, BackendError> {
    image::load_from_memory(bytes).map_err(BackendError::Decode)
}

/// Encode an image as PNG. Every endpoint answers in PNG so transparency survives.
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, BackendError> {
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, ImageFormat::Png)
        .map_err(BackendError::Encode)?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use image::{ImageEncoder, RgbImage};

    #[test]
    fn decode_png_upload() {
        let bytes = png_bytes(&DynamicImage::ImageRgba8(solid_rgba(12, 7, [1, 2, 3, 4])));
        let image = decode(&bytes).unwrap();
        assert_eq!((image.width(), image.height()), (12, 7));
        assert_eq!(image.to_rgba8().get_pixel(3, 3).0, [1, 2, 3, 4]);
    }

    #[test]
    fn decode_jpeg_upload() {
        let img = RgbImage::from_fn(40, 30, |x, y| image::Rgb([x as u8, y as u8, 128]));
        let mut bytes = Vec::new();
        image::codecs::jpeg::JpegEncoder::new(&mut bytes)
            .write_image(img.as_raw(), 40, 30, image::ExtendedColorType::Rgb8)
            .unwrap();

        let image = decode(&bytes).unwrap();
        assert_eq!((image.width(), image.height()), (40, 30));
    }

    #[test]
    fn decode_garbage_errors() {
        assert!(matches!(
            decode(b"definitely not pixels"),
            Err(BackendError::Decode(_))
        ));
    }

    #[test]
    fn decode_empty_errors() {
        assert!(decode(&[]).is_err());
    }

    #[test]
    fn encode_produces_png_signature() {
        let bytes = encode_png(&DynamicImage::ImageRgb8(RgbImage::new(3, 3))).unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Png);
    }
}
