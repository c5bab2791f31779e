//! HTTP service wrapping ingestion and peak detection.
//!
//! Routes:
//! - `POST /upload`: multipart file upload, answers with the parsed table
//! - `POST /find_peaks`: table or series plus parameters, answers with peak indices
//! - `POST /export`: table as JSON in, CSV attachment out
//!
//! Every route answers CORS preflights.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use log::{error, info, warn};
use serde::Serialize;
use tower_http::cors::CorsLayer;

use crate::config::ServerConfig;
use crate::error::{PeakscopeError, Result};

pub mod handlers;
pub mod upload;

/// Body of every failed request.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub status: &'static str,
    pub message: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            message: message.into(),
        }
    }
}

impl IntoResponse for PeakscopeError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if self.is_client_error() {
            warn!("request rejected ({status}): {self}");
        } else {
            error!("request failed ({status}): {self}");
        }
        (status, Json(ErrorBody::new(self.to_string()))).into_response()
    }
}

/// Build the application router.
///
/// Cross-origin requests are allowed from any origin so a front end served
/// elsewhere can call the API.
pub fn router(config: Arc<ServerConfig>) -> Router {
    let limit = config.max_content_length;
    Router::new()
        .route("/upload", post(handlers::upload))
        .route("/find_peaks", post(handlers::find_peaks))
        .route("/export", post(handlers::export))
        .layer(DefaultBodyLimit::max(limit))
        .layer(CorsLayer::permissive())
        .with_state(config)
}

/// Bind `config.bind_addr` and serve until the process is stopped.
pub async fn serve(config: ServerConfig) -> Result<()> {
    tokio::fs::create_dir_all(&config.upload_folder).await?;
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(
        "peakscope listening on {} (uploads in {}, body limit {} bytes)",
        listener.local_addr()?,
        config.upload_folder.display(),
        config.max_content_length
    );
    axum::serve(listener, router(Arc::new(config))).await?;
    Ok(())
}
