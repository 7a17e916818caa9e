//! HTTP surface: router, shared state, and the serve loop.
//!
//! | Path | Method | Handler |
//! |---|---|---|
//! | `/` | GET | [`handlers::home`] — plain-text banner |
//! | `/remove-background` | POST | [`handlers::remove_background`] |
//! | `/crop-image` | POST | [`handlers::crop_image`] |
//! | `/sharpen-image` | POST | [`handlers::sharpen_image`] |
//! | `/black-and-white` | POST | [`handlers::black_and_white`] |
//! | `/adjust-hue` | POST | [`handlers::adjust_hue`] |
//! | `/adjust-contrast` | POST | [`handlers::adjust_contrast`] |
//! | `/adjust-saturation` | POST | [`handlers::adjust_saturation`] |
//! | `/invert-colors` | POST | [`handlers::invert_colors`] |
//!
//! CORS is open to any origin. Preflight `OPTIONS` requests are answered by
//! the CORS layer and rewritten to `204 No Content`.

pub mod error;
pub mod handlers;
pub mod upload;

pub use error::ApiError;
pub use handlers::{BANNER, Endpoint};

use crate::imaging::Segmenter;
use axum::Router;
use axum::extract::{DefaultBodyLimit, Request};
use axum::http::{Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

/// Default request body limit when none is configured.
pub const DEFAULT_UPLOAD_LIMIT: usize = 32 * 1024 * 1024;

/// Read-only state shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Background-removal model; `None` when no model is loaded.
    pub segmenter: Option<Arc<dyn Segmenter>>,
    /// Largest accepted request body in bytes.
    pub max_upload_bytes: usize,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            segmenter: None,
            max_upload_bytes: DEFAULT_UPLOAD_LIMIT,
        }
    }
}

/// Build the application router with all endpoints and middleware.
pub fn build_router(state: AppState) -> Router {
    let limit = state.max_upload_bytes;

    Router::new()
        .route("/", get(handlers::home))
        .route(
            Endpoint::RemoveBackground.path(),
            post(handlers::remove_background),
        )
        .route(Endpoint::Crop.path(), post(handlers::crop_image))
        .route(Endpoint::Sharpen.path(), post(handlers::sharpen_image))
        .route(Endpoint::BlackAndWhite.path(), post(handlers::black_and_white))
        .route(Endpoint::AdjustHue.path(), post(handlers::adjust_hue))
        .route(Endpoint::AdjustContrast.path(), post(handlers::adjust_contrast))
        .route(
            Endpoint::AdjustSaturation.path(),
            post(handlers::adjust_saturation),
        )
        .route(Endpoint::InvertColors.path(), post(handlers::invert_colors))
        .with_state(state)
        // Middleware
        .layer(DefaultBodyLimit::max(limit))
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(preflight_no_content))
        .layer(TraceLayer::new_for_http())
}

/// Preflight answers carry no body; report them as `204 No Content`.
async fn preflight_no_content(request: Request, next: Next) -> Response {
    let preflight = request.method() == Method::OPTIONS;
    let path = request.uri().path().to_owned();
    let mut response = next.run(request).await;

    if preflight && response.status() == StatusCode::OK {
        debug!(%path, "responding to OPTIONS (preflight) request");
        *response.status_mut() = StatusCode::NO_CONTENT;
    }
    response
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: &str, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Kreate backend listening on http://{}", listener.local_addr()?);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received, draining connections");
}
