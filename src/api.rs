//! HTTP API.
//!
//! Every tool is a `POST /api/<tool>` taking a multipart form and answering
//! with the transformed file as an attachment:
//! - page selection: organize, split, crop, rotate
//! - whole documents: merge, compress, repair, metadata, info
//! - passwords: lock, unlock
//! - overlays: page numbers, watermark
//! - text: extract, redact, compare
//! - any file: hash report

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;

pub mod documents;
pub mod files;
pub mod form;
pub mod overlays;
pub mod pages;
pub mod security;
pub mod text;

#[cfg(test)]
mod test_support;

/// Shared, read-only state handed to every handler
pub struct AppState {
    pub config: AppConfig,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        AppState {
            config,
            start_time: Instant::now(),
        }
    }
}

/// Build the API router
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let max_body_size = state.config.limits.max_upload_bytes;

    let api_routes = Router::new()
        // Page selection
        .route("/organize-pdf", post(pages::organize_pdf_handler))
        .route("/split-pdf", post(pages::split_pdf_handler))
        .route("/crop-pdf", post(pages::crop_pdf_handler))
        .route("/rotate-pdf", post(pages::rotate_pdf_handler))
        // Whole documents
        .route("/merge-pdfs", post(documents::merge_pdfs_handler))
        .route("/compress-pdf", post(documents::compress_pdf_handler))
        .route("/repair-pdf", post(documents::repair_pdf_handler))
        .route("/edit-pdf-metadata", post(documents::edit_metadata_handler))
        .route("/pdf-info", post(documents::pdf_info_handler))
        // Passwords
        .route("/lock-pdf", post(security::lock_pdf_handler))
        .route("/unlock-pdf", post(security::unlock_pdf_handler))
        // Overlays
        .route("/add-page-numbers", post(overlays::add_page_numbers_handler))
        .route("/watermark-pdf", post(overlays::watermark_pdf_handler))
        // Text
        .route("/extract-text", post(text::extract_text_handler))
        .route("/redact-pdf", post(text::redact_pdf_handler))
        .route("/compare-pdf", post(text::compare_pdf_handler))
        // Any file
        .route("/file-hash", post(files::file_hash_handler));

    Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_seconds: u64,
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_health() {
        let response = get_path(test_app(), "/health").await;
        assert_eq!(response.status, StatusCode::OK);
        let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let response = get_path(test_app(), "/api/pdf-to-word").await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }
}
