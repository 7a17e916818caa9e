//! Request handlers, one per endpoint.
//!
//! Every editing handler follows the same shape:
//!
//! ```text
//! multipart ─► Upload::read ─► image present? ─► parse fields ─► spawn_blocking(operation) ─► PNG
//!                                   │                 │                     │
//!                                  400           400 / 500                 500 (or 400 for empty crops)
//! ```
//!
//! Pixel work is CPU-bound and runs on tokio's blocking pool so the reactor
//! keeps accepting connections; bulk loops inside it fan out onto rayon.

use super::AppState;
use super::error::ApiError;
use super::upload::{FieldError, ImagePart, Upload};
use crate::imaging::operations;
use crate::imaging::{BackendError, CropRequest, Factor, HueShift, Intensity};
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use std::fmt::Display;
use tracing::{error, info, warn};

pub const BANNER: &str = "Kreate Backend is running! Available endpoints: /remove-background, /crop-image, /sharpen-image, /black-and-white, /adjust-hue, /adjust-contrast, /adjust-saturation, /invert-colors.";

type Form = Result<Multipart, MultipartRejection>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    RemoveBackground,
    Crop,
    Sharpen,
    BlackAndWhite,
    AdjustHue,
    AdjustContrast,
    AdjustSaturation,
    InvertColors,
}

impl Endpoint {
    pub const ALL: [Endpoint; 8] = [
        Endpoint::RemoveBackground,
        Endpoint::Crop,
        Endpoint::Sharpen,
        Endpoint::BlackAndWhite,
        Endpoint::AdjustHue,
        Endpoint::AdjustContrast,
        Endpoint::AdjustSaturation,
        Endpoint::InvertColors,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Endpoint::RemoveBackground => "/remove-background",
            Endpoint::Crop => "/crop-image",
            Endpoint::Sharpen => "/sharpen-image",
            Endpoint::BlackAndWhite => "/black-and-white",
            Endpoint::AdjustHue => "/adjust-hue",
            Endpoint::AdjustContrast => "/adjust-contrast",
            Endpoint::AdjustSaturation => "/adjust-saturation",
            Endpoint::InvertColors => "/invert-colors",
        }
    }

    /// Human description used in log lines.
    fn action(self) -> &'static str {
        match self {
            Endpoint::RemoveBackground => "background removal",
            Endpoint::Crop => "cropping",
            Endpoint::Sharpen => "sharpening",
            Endpoint::BlackAndWhite => "black and white conversion",
            Endpoint::AdjustHue => "hue adjustment",
            Endpoint::AdjustContrast => "contrast adjustment",
            Endpoint::AdjustSaturation => "saturation adjustment",
            Endpoint::InvertColors => "color inversion",
        }
    }

    fn failure_prefix(self) -> &'static str {
        match self {
            Endpoint::RemoveBackground | Endpoint::Crop => "Image processing failed",
            Endpoint::Sharpen => "Image sharpening failed",
            Endpoint::BlackAndWhite => "Image B&W conversion failed",
            Endpoint::AdjustHue => "Image hue adjustment failed",
            Endpoint::AdjustContrast => "Image contrast adjustment failed",
            Endpoint::AdjustSaturation => "Image saturation adjustment failed",
            Endpoint::InvertColors => "Image color inversion failed",
        }
    }

    pub fn download_name(self) -> &'static str {
        match self {
            Endpoint::RemoveBackground => "no_background.png",
            Endpoint::Crop => "cropped_image.png",
            Endpoint::Sharpen => "sharpened_image.png",
            Endpoint::BlackAndWhite => "bw_image.png",
            Endpoint::AdjustHue => "hue_adjusted_image.png",
            Endpoint::AdjustContrast => "contrast_adjusted_image.png",
            Endpoint::AdjustSaturation => "saturation_adjusted_image.png",
            Endpoint::InvertColors => "inverted_image.png",
        }
    }

    /// Wrap any failure as this endpoint's 500.
    pub fn failure(self, err: impl Display) -> ApiError {
        ApiError::Processing(format!("{}: {err}", self.failure_prefix()))
    }
}

fn invalid_crop(err: impl Display) -> ApiError {
    ApiError::Validation(format!("Invalid crop coordinates: {err}"))
}

pub async fn home() -> &'static str {
    info!("GET request received at /");
    BANNER
}

pub async fn remove_background(
    State(state): State<AppState>,
    form: Form,
) -> Result<Response, ApiError> {
    let endpoint = Endpoint::RemoveBackground;
    let (image, _) = accept(endpoint, form).await?;
    let segmenter = state.segmenter.clone();

    run(endpoint, image, move |bytes| {
        let segmenter = segmenter.ok_or_else(|| {
            BackendError::Segmentation("no segmentation model is loaded".into())
        })?;
        operations::remove_background(segmenter.as_ref(), bytes)
    })
    .await
}

pub async fn crop_image(form: Form) -> Result<Response, ApiError> {
    let endpoint = Endpoint::Crop;
    let (image, upload) = accept(endpoint, form).await?;
    let request = crop_request(&upload).map_err(|e| {
        warn!(error = %e, "invalid crop coordinates");
        invalid_crop(e)
    })?;

    run(endpoint, image, move |bytes| operations::crop(bytes, &request)).await
}

pub async fn sharpen_image(form: Form) -> Result<Response, ApiError> {
    let endpoint = Endpoint::Sharpen;
    let (image, upload) = accept(endpoint, form).await?;
    let intensity = intensity(endpoint, &upload)?;

    run(endpoint, image, move |bytes| {
        operations::sharpen(bytes, intensity)
    })
    .await
}

pub async fn black_and_white(form: Form) -> Result<Response, ApiError> {
    let endpoint = Endpoint::BlackAndWhite;
    let (image, upload) = accept(endpoint, form).await?;
    let intensity = intensity(endpoint, &upload)?;

    run(endpoint, image, move |bytes| {
        operations::black_and_white(bytes, intensity)
    })
    .await
}

pub async fn adjust_hue(form: Form) -> Result<Response, ApiError> {
    let endpoint = Endpoint::AdjustHue;
    let (image, upload) = accept(endpoint, form).await?;
    let shift = HueShift(float_param(endpoint, &upload, "hue_shift", 0.0)?);

    run(endpoint, image, move |bytes| operations::adjust_hue(bytes, shift)).await
}

pub async fn adjust_contrast(form: Form) -> Result<Response, ApiError> {
    let endpoint = Endpoint::AdjustContrast;
    let (image, upload) = accept(endpoint, form).await?;
    let factor = Factor(f32_param(endpoint, &upload, "factor", 1.0)?);

    run(endpoint, image, move |bytes| {
        operations::adjust_contrast(bytes, factor)
    })
    .await
}

pub async fn adjust_saturation(form: Form) -> Result<Response, ApiError> {
    let endpoint = Endpoint::AdjustSaturation;
    let (image, upload) = accept(endpoint, form).await?;
    let factor = Factor(f32_param(endpoint, &upload, "factor", 1.0)?);

    run(endpoint, image, move |bytes| {
        operations::adjust_saturation(bytes, factor)
    })
    .await
}

pub async fn invert_colors(form: Form) -> Result<Response, ApiError> {
    let endpoint = Endpoint::InvertColors;
    let (image, _) = accept(endpoint, form).await?;

    run(endpoint, image, operations::invert_colors).await
}

// =============================================================================
// Shared steps
// =============================================================================

/// Read the form and make sure it carries a named image file.
async fn accept(endpoint: Endpoint, form: Form) -> Result<(ImagePart, Upload), ApiError> {
    info!(endpoint = endpoint.path(), "request received");
    let upload = Upload::read(form).await.inspect_err(|e| {
        warn!(endpoint = endpoint.path(), error = %e, "unreadable upload");
    })?;
    let image = upload
        .image()
        .inspect_err(|e| {
            warn!(endpoint = endpoint.path(), "{e} for {}", endpoint.action());
        })?
        .clone();
    Ok((image, upload))
}

/// Run `op` on the blocking pool and turn its outcome into a response.
async fn run<F>(endpoint: Endpoint, image: ImagePart, op: F) -> Result<Response, ApiError>
where
    F: FnOnce(&[u8]) -> operations::Result<Vec<u8>> + Send + 'static,
{
    info!(
        endpoint = endpoint.path(),
        filename = %image.filename,
        size = image.bytes.len(),
        "processing image for {}",
        endpoint.action()
    );

    let outcome = tokio::task::spawn_blocking(move || op(&image.bytes))
        .await
        .map_err(|e| {
            error!(endpoint = endpoint.path(), error = %e, "worker task failed");
            endpoint.failure(e)
        })?;

    match outcome {
        Ok(png) => {
            info!(
                endpoint = endpoint.path(),
                size = png.len(),
                "{} successful",
                endpoint.action()
            );
            Ok(png_response(endpoint, png))
        }
        Err(BackendError::InvalidGeometry(msg)) => {
            warn!(endpoint = endpoint.path(), "invalid crop coordinates: {msg}");
            Err(invalid_crop(msg))
        }
        Err(e) => {
            error!(endpoint = endpoint.path(), error = %e, "{} failed", endpoint.action());
            Err(endpoint.failure(e))
        }
    }
}

fn png_response(endpoint: Endpoint, png: Vec<u8>) -> Response {
    let disposition = format!("inline; filename=\"{}\"", endpoint.download_name());
    (
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        png,
    )
        .into_response()
}

/// A float form field; unparseable values are processing failures.
fn float_param(
    endpoint: Endpoint,
    upload: &Upload,
    name: &str,
    default: f64,
) -> Result<f64, ApiError> {
    upload.float_field(name, default).map_err(|e| {
        error!(endpoint = endpoint.path(), error = %e, "bad numeric parameter");
        endpoint.failure(e)
    })
}

fn f32_param(
    endpoint: Endpoint,
    upload: &Upload,
    name: &str,
    default: f32,
) -> Result<f32, ApiError> {
    upload.f32_field(name, default).map_err(|e| {
        error!(endpoint = endpoint.path(), error = %e, "bad numeric parameter");
        endpoint.failure(e)
    })
}

fn intensity(endpoint: Endpoint, upload: &Upload) -> Result<Intensity, ApiError> {
    Ok(Intensity::new(f32_param(endpoint, upload, "intensity", 1.0)?))
}

fn crop_request(upload: &Upload) -> Result<CropRequest, FieldError> {
    Ok(CropRequest {
        x: upload.int_field("x")?.unwrap_or(0),
        y: upload.int_field("y")?.unwrap_or(0),
        width: upload.int_field("width")?,
        height: upload.int_field("height")?,
        circular: upload.flag("circular"),
    })
}
