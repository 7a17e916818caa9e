//! # Kreate Server
//!
//! A small HTTP service exposing single-shot image edits: background removal,
//! rectangular and circular cropping, sharpening, black-and-white conversion,
//! hue / contrast / saturation adjustment, and color inversion.
//!
//! # Architecture: One Image In, One PNG Out
//!
//! Every endpoint runs the same short, stateless sequence:
//!
//! ```text
//! multipart upload ─► validate ─► decode ─► one transform ─► encode PNG ─► response
//! ```
//!
//! There is no pipeline, no chaining of operations, and nothing persisted
//! between requests. The only shared object is the optional segmentation
//! model, loaded once at startup and read by every background-removal request.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`server`] | axum router, multipart parsing, handlers, JSON error responses |
//! | [`imaging`] | Pure-Rust pixel operations and the [`imaging::Segmenter`] seam |
//! | [`config`] | `config.toml` loading, merging over stock defaults, and validation |
//!
//! # Design Decisions
//!
//! ## PNG-Only Output
//!
//! Whatever format is uploaded, every response is PNG. Several operations
//! produce transparency (background removal, circular crops), and a single
//! lossless output format keeps the client contract to one MIME type.
//!
//! ## Enhancement Blends Instead of Ad-Hoc Filters
//!
//! Sharpness, contrast, and saturation are all expressed as a blend between
//! the source and a *degenerate* image (blurred, flat gray, desaturated). A
//! factor of 1.0 is an exact identity, values below soften the effect and
//! values above exaggerate it. One blend routine, three degenerate builders.
//!
//! ## Blocking Work Off the Reactor
//!
//! Decoding, filtering, and encoding are CPU-bound. Handlers move them onto
//! tokio's blocking pool with `spawn_blocking`; the whole-buffer loops inside
//! run on a rayon pool sized from `[processing] max_threads`.
//!
//! ## Segmentation Behind a Trait
//!
//! Background removal needs a pretrained model that is large, optional, and
//! slow to load. It lives behind [`imaging::Segmenter`]: the `onnx` cargo
//! feature provides an ONNX Runtime implementation, tests use a mock, and a
//! server without a model still serves every other endpoint.

pub mod config;
pub mod imaging;
pub mod server;

#[cfg(test)]
pub(crate) mod test_helpers;
