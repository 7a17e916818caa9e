//! Image processing — pure Rust pixel work plus an optional ONNX segmenter.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode / encode** | `image::load_from_memory`, PNG via `DynamicImage::write_to` |
//! | **Crop** | `image::imageops::crop_imm` + inscribed-ellipse mask |
//! | **Sharpen / contrast / saturation** | enhancement blend against a degenerate image |
//! | **Black & white / hue / invert** | luma, 8-bit HSV lookup table, `DynamicImage::invert` |
//! | **Background removal** | [`Segmenter`] trait, `ort` under feature `onnx` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for geometry and color math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`BackendError`] + the [`Segmenter`] trait
//! - **Filters**: Buffer-level transforms, parallelised with rayon
//! - **Operations**: Bytes in, PNG out; one function per endpoint

pub mod backend;
mod calculations;
mod codec;
mod filters;
#[cfg(feature = "onnx")]
pub mod onnx_backend;
pub mod operations;
mod params;

pub use backend::{BackendError, Segmenter};
#[cfg(feature = "onnx")]
pub use onnx_backend::OnnxSegmenter;
pub use params::{CropRequest, Factor, HueShift, Intensity};

use crate::config::SegmentationConfig;
use std::sync::Arc;

/// Load the configured segmentation model, if any.
///
/// Returns `Ok(None)` when no model path is configured, or when the binary was
/// built without the `onnx` feature (a warning is logged in that case).
pub fn load_segmenter(
    config: &SegmentationConfig,
) -> Result<Option<Arc<dyn Segmenter>>, BackendError> {
    let Some(path) = config.model_path.as_deref() else {
        tracing::info!("no segmentation model configured; /remove-background is disabled");
        return Ok(None);
    };

    #[cfg(feature = "onnx")]
    {
        let segmenter = OnnxSegmenter::from_file(path, config.input_size)?;
        tracing::info!(model = %segmenter.name(), "segmentation model loaded");
        Ok(Some(Arc::new(segmenter)))
    }

    #[cfg(not(feature = "onnx"))]
    {
        tracing::warn!(
            path = %path.display(),
            "segmentation model configured but this build lacks the `onnx` feature"
        );
        Ok(None)
    }
}
