//! ONNX Runtime segmentation backend (cargo feature `onnx`).
//!
//! Runs a U²-Net style salient-object model: one `1×3×N×N` float input,
//! first output a `1×1×N×N` saliency map.
//!
//! Preprocessing: resize to `N×N` (Lanczos3), scale to `[0, 1]`, normalize
//! with the ImageNet mean/std, lay out as NCHW. Postprocessing: min–max
//! normalize the saliency map, scale to `u8`, resize back to the source size.

use super::backend::{BackendError, Segmenter};
use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, RgbaImage};
use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use ort::value::Tensor;
use std::fmt::Display;
use std::path::Path;
use std::sync::Mutex;

const MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const STD: [f32; 3] = [0.229, 0.224, 0.225];

pub struct OnnxSegmenter {
    session: Mutex<Session>,
    input_size: u32,
    name: String,
}

fn model_error(e: impl Display) -> BackendError {
    BackendError::Segmentation(format!("segmentation model error: {e}"))
}

impl OnnxSegmenter {
    /// Load a model from `path`. `input_size` is the square edge the model expects.
    pub fn from_file(path: &Path, input_size: u32) -> Result<Self, BackendError> {
        let session = Session::builder()
            .map_err(model_error)?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(model_error)?
            .commit_from_file(path)
            .map_err(model_error)?;

        Ok(Self {
            session: Mutex::new(session),
            input_size,
            name: format!("onnx:{}", path.display()),
        })
    }

    fn preprocess(&self, image: &RgbaImage) -> Vec<f32> {
        let size = self.input_size;
        let resized = imageops::resize(image, size, size, FilterType::Lanczos3);
        let plane = (size * size) as usize;
        let mut tensor = vec![0.0f32; 3 * plane];
        for (i, px) in resized.pixels().enumerate() {
            for c in 0..3 {
                let v = f32::from(px[c]) / 255.0;
                tensor[c * plane + i] = (v - MEAN[c]) / STD[c];
            }
        }
        tensor
    }
}

/// Min–max normalize a saliency map into an 8-bit mask.
fn saliency_to_mask(data: &[f32], size: u32) -> GrayImage {
    let (min, max) = data
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let range = if max > min { max - min } else { 1.0 };
    GrayImage::from_fn(size, size, |x, y| {
        let v = data[(y * size + x) as usize];
        Luma([(((v - min) / range) * 255.0).round().clamp(0.0, 255.0) as u8])
    })
}

impl Segmenter for OnnxSegmenter {
    fn name(&self) -> &str {
        &self.name
    }

    fn segment(&self, image: &RgbaImage) -> Result<GrayImage, BackendError> {
        let size = self.input_size as usize;
        let input = Tensor::from_array(([1usize, 3, size, size], self.preprocess(image)))
            .map_err(model_error)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| BackendError::Segmentation("segmentation session poisoned".into()))?;
        let outputs = session.run(ort::inputs![input]).map_err(model_error)?;
        let (shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(model_error)?;

        let dims: Vec<i64> = shape.iter().copied().collect();
        let expected = size * size;
        if data.len() < expected {
            return Err(BackendError::Segmentation(format!(
                "unexpected model output shape {dims:?}"
            )));
        }

        let mask = saliency_to_mask(&data[..expected], self.input_size);
        let (width, height) = image.dimensions();
        Ok(imageops::resize(&mask, width, height, FilterType::Triangle))
    }
}
