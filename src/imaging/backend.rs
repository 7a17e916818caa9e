//! Imaging error type and the segmentation backend trait.
//!
//! Pixel filters are plain functions over `image` buffers and need no
//! abstraction. Background removal is different: it depends on a pretrained
//! model that may or may not be present at runtime, so it sits behind the
//! [`Segmenter`] trait. The production implementation is
//! [`OnnxSegmenter`](super::onnx_backend::OnnxSegmenter) (cargo feature `onnx`);
//! tests use a mock.

use image::{GrayImage, RgbaImage};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("cannot identify image file: {0}")]
    Decode(image::ImageError),
    #[error("cannot encode PNG: {0}")]
    Encode(image::ImageError),
    /// The requested geometry does not select any pixels.
    #[error("{0}")]
    InvalidGeometry(String),
    /// The segmentation model failed or is unavailable.
    #[error("{0}")]
    Segmentation(String),
}

/// Foreground/background segmentation model.
///
/// Implementations must be shareable across request workers.
pub trait Segmenter: Send + Sync {
    /// Short human-readable description, used in logs.
    fn name(&self) -> &str;

    /// Compute a foreground mask for `image`.
    ///
    /// The returned mask should have the image's dimensions; 255 means
    /// certainly foreground, 0 certainly background. Masks of another size are
    /// resized by the caller.
    fn segment(&self, image: &RgbaImage) -> Result<GrayImage, BackendError>;
}
