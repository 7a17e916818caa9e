//! Multipart upload parsing.
//!
//! Every editing endpoint receives the same shape of request: one file part
//! named `image` plus a handful of optional text fields. [`Upload::read`]
//! drains the multipart stream into that shape; typed accessors then parse
//! individual fields.
//!
//! Parsing rules:
//! - only the first occurrence of a field name counts;
//! - the `image` part is recognised only when it carries a filename
//!   (possibly empty); other file parts are ignored;
//! - field values are trimmed before numeric parsing.

use super::error::ApiError;
use axum::extract::Multipart;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::http::StatusCode;
use axum::body::Bytes;
use std::collections::HashMap;
use std::fmt;
use std::num::IntErrorKind;
use std::str::FromStr;

pub const IMAGE_FIELD: &str = "image";

pub const NO_IMAGE: &str = "No image file provided";
pub const EMPTY_FILENAME: &str = "No selected image file";

/// The uploaded image file.
#[derive(Debug, Clone)]
pub struct ImagePart {
    pub filename: String,
    pub bytes: Bytes,
}

/// A drained multipart request.
#[derive(Debug, Default)]
pub struct Upload {
    image: Option<ImagePart>,
    fields: HashMap<String, String>,
}

/// A form field that is present but does not parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub value: String,
    pub expected: &'static str,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "could not convert field '{}' to {}: '{}'",
            self.field, self.expected, self.value
        )
    }
}

impl std::error::Error for FieldError {}

impl Upload {
    /// Drain `multipart` into an [`Upload`].
    ///
    /// A request that is not multipart at all yields an empty upload, so the
    /// caller reports the missing image rather than a content-type problem.
    pub async fn read(
        multipart: Result<Multipart, MultipartRejection>,
    ) -> Result<Self, ApiError> {
        let mut upload = Upload::default();
        let Ok(mut multipart) = multipart else {
            return Ok(upload);
        };

        while let Some(field) = multipart.next_field().await.map_err(stream_error)? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            match field.file_name().map(str::to_owned) {
                Some(filename) => {
                    let bytes = field.bytes().await.map_err(stream_error)?;
                    if name == IMAGE_FIELD && upload.image.is_none() {
                        upload.image = Some(ImagePart { filename, bytes });
                    }
                }
                None => {
                    let text = field.text().await.map_err(stream_error)?;
                    upload.fields.entry(name).or_insert(text);
                }
            }
        }
        Ok(upload)
    }

    /// The `image` part, or the 400 explaining why there is none.
    pub fn image(&self) -> Result<&ImagePart, ApiError> {
        match &self.image {
            None => Err(ApiError::Validation(NO_IMAGE.into())),
            Some(part) if part.filename.is_empty() => {
                Err(ApiError::Validation(EMPTY_FILENAME.into()))
            }
            Some(part) => Ok(part),
        }
    }

    /// Raw text of a form field, if present.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Parse a finite float field, or return `default` when absent.
    pub fn float_field(&self, name: &str, default: f64) -> Result<f64, FieldError> {
        match self.parse_field::<f64>(name, "a number")? {
            Some(v) if v.is_finite() => Ok(v),
            Some(_) => Err(self.field_error(name, "a number")),
            None => Ok(default),
        }
    }

    /// Like [`Upload::float_field`], but the value must also stay finite as
    /// an `f32`.
    pub fn f32_field(&self, name: &str, default: f32) -> Result<f32, FieldError> {
        let value = self.float_field(name, f64::from(default))? as f32;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(self.field_error(name, "a number"))
        }
    }

    /// Parse an integer field, returning `None` when absent.
    ///
    /// Out-of-range values saturate; crop coordinates are clamped later anyway.
    pub fn int_field(&self, name: &str) -> Result<Option<i64>, FieldError> {
        let Some(raw) = self.field(name) else {
            return Ok(None);
        };
        match raw.trim().parse::<i64>() {
            Ok(v) => Ok(Some(v)),
            Err(e) => match e.kind() {
                IntErrorKind::PosOverflow => Ok(Some(i64::MAX)),
                IntErrorKind::NegOverflow => Ok(Some(i64::MIN)),
                _ => Err(self.field_error(name, "an integer")),
            },
        }
    }

    /// Whether a flag field equals `"true"`, ignoring case.
    pub fn flag(&self, name: &str) -> bool {
        self.field(name)
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }

    fn parse_field<T: FromStr>(
        &self,
        name: &str,
        expected: &'static str,
    ) -> Result<Option<T>, FieldError> {
        match self.field(name) {
            None => Ok(None),
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .map(Some)
                .map_err(|_| self.field_error(name, expected)),
        }
    }

    fn field_error(&self, name: &str, expected: &'static str) -> FieldError {
        FieldError {
            field: name.to_string(),
            value: self.field(name).unwrap_or_default().to_string(),
            expected,
        }
    }
}

fn stream_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::TooLarge(err.body_text())
    } else {
        // A body that stops being valid multipart carries no usable image.
        tracing::debug!(error = %err.body_text(), "malformed multipart body");
        ApiError::Validation(NO_IMAGE.into())
    }
}

#[cfg(test)]
impl Upload {
    pub fn for_test(image: Option<(&str, &[u8])>, fields: &[(&str, &str)]) -> Self {
        Upload {
            image: image.map(|(filename, bytes)| ImagePart {
                filename: filename.to_string(),
                bytes: Bytes::copy_from_slice(bytes),
            }),
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}
