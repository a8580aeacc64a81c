//! HTTP transport for report generation.
//!
//! # Endpoints
//!
//! - `POST /generate`: multipart form, returns the `.docx` as an attachment
//! - `GET /health`: liveness probe
//!
//! # Form fields
//!
//! | field                          | kind | notes                          |
//! |--------------------------------|------|--------------------------------|
//! | `description`                  | text | optional                       |
//! | `coordinates` / `coords_json`  | text | JSON `[[x, y], ...]`           |
//! | `spreadsheet` / `excel_file`   | file | `.xlsx`; wins over coordinates |
//! | `document` / `pdf_file`        | file | PDF, one image per page        |
//!
//! A file part with an empty filename and no content (an unselected browser
//! file input) is treated as absent. Unknown fields are ignored.
//!
//! # Errors
//!
//! Every failure is a JSON body `{"error": "..."}`: 400 for input problems,
//! 500 for internal faults.

use crate::config::ReportConfig;
use crate::error::ReportError;
use crate::generate::{generate_report, ReportRequest};
use crate::pipeline::assemble::{DOCX_CONTENT_TYPE, REPORT_FILENAME};
use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

/// Default request body cap: 100 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Transport-level settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8000)),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Error body shared by every failure response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Clone)]
struct AppState {
    config: Arc<ReportConfig>,
}

/// Errors a handler can return.
#[derive(Debug)]
pub enum AppError {
    Report(ReportError),
    /// The request body is not a readable multipart form.
    Multipart(String),
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        Self::Report(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            Self::Report(e) => {
                let status = StatusCode::from_u16(e.status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                if status.is_server_error() {
                    warn!("Report generation failed: {e}");
                } else {
                    info!("Report request rejected: {e}");
                }
                (status, e.public_message())
            }
            Self::Multipart(msg) => {
                info!("Malformed form: {msg}");
                (StatusCode::BAD_REQUEST, msg)
            }
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}

/// Build the application router.
pub fn router(config: ReportConfig, server: &ServerConfig) -> Router {
    let state = AppState {
        config: Arc::new(config),
    };
    Router::new()
        .route("/generate", post(generate_handler))
        .route("/health", get(health_check))
        .with_state(state)
        .layer(DefaultBodyLimit::max(server.max_upload_bytes))
        .layer(CorsLayer::very_permissive())
}

/// Bind and serve until Ctrl-C.
pub async fn serve(config: ReportConfig, server: ServerConfig) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(server.bind).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(config, &server))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to install Ctrl-C handler: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn generate_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, AppError> {
    let multipart = multipart.map_err(|e| AppError::Multipart(format!("Invalid form: {e}")))?;
    let request = read_form(multipart).await?;
    info!(
        "Generate request: description={}, coordinates={}, spreadsheet={}, document={}",
        request.description.is_some(),
        request.coordinates.is_some(),
        request.spreadsheet.as_ref().map_or(0, Vec::len),
        request.document.as_ref().map_or(0, Vec::len),
    );

    let report = generate_report(request, &state.config).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, DOCX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={REPORT_FILENAME}"),
            ),
        ],
        report.docx,
    )
        .into_response())
}

/// Which request slot a form field fills.
enum Slot {
    Description,
    Coordinates,
    Spreadsheet,
    Document,
}

fn slot_for(name: &str) -> Option<Slot> {
    match name {
        "description" => Some(Slot::Description),
        "coordinates" | "coords_json" => Some(Slot::Coordinates),
        "spreadsheet" | "excel_file" => Some(Slot::Spreadsheet),
        "document" | "pdf_file" => Some(Slot::Document),
        _ => None,
    }
}

async fn read_form(mut multipart: Multipart) -> Result<ReportRequest, AppError> {
    let mut request = ReportRequest::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Multipart(format!("Failed to read multipart field: {e}")))?
    {
        let Some(slot) = field.name().and_then(slot_for) else {
            continue;
        };
        let file_name = field.file_name().map(str::to_owned);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Multipart(format!("Failed to read field data: {e}")))?;

        // An unselected file input still sends a part with filename="".
        if file_name.as_deref() == Some("") && data.is_empty() {
            continue;
        }

        match slot {
            Slot::Description => request.description = Some(text(&data)?),
            Slot::Coordinates => request.coordinates = Some(text(&data)?),
            Slot::Spreadsheet => request.spreadsheet = Some(data.to_vec()),
            Slot::Document => request.document = Some(data.to_vec()),
        }
    }

    Ok(request)
}

fn text(data: &[u8]) -> Result<String, AppError> {
    String::from_utf8(data.to_vec())
        .map_err(|_| AppError::Multipart("Text fields must be valid UTF-8".to_string()))
}
