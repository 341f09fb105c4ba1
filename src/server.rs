//! HTTP server exposing theme extraction.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/extract-theme` | Extract a theme from `{ "url": "..." }` |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! Errors are a flat JSON object with a fixed, user-presentable message:
//!
//! ```json
//! { "error": "Invalid URL" }
//! ```
//!
//! | Status | Message | Cause |
//! |--------|---------|-------|
//! | 400 | `URL is required` | `url` missing, null or empty |
//! | 400 | `Invalid request body` | body is not a JSON object |
//! | 400 | `Invalid URL` | `url` is not an absolute http(s) URL |
//! | 400 | `Failed to fetch website` | the page could not be retrieved |
//! | 500 | `Failed to extract theme` | anything else, including panics |
//!
//! Internal details are logged, never returned.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so the web UI can call the
//! endpoint from the browser.

use std::any::Any;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{self, CorsLayer};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::models::ExtractionResult;
use crate::pipeline::{ExtractError, ThemeExtractor};

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    extractor: Arc<ThemeExtractor>,
}

impl AppState {
    pub fn new(extractor: ThemeExtractor) -> Self {
        Self {
            extractor: Arc::new(extractor),
        }
    }
}

/// Starts the HTTP server on `[server].bind` and runs until the process is
/// terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let extractor = ThemeExtractor::from_config(&config.fetch)?;
    let app = router(AppState::new(extractor));

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!(addr = %listener.local_addr()?, "theme extractor listening");
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors::Any)
        .allow_methods(cors::Any)
        .allow_headers(cors::Any);

    Router::new()
        .route("/api/extract-theme", post(handle_extract_theme))
        .route("/health", get(handle_health))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
        .with_state(state)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
}

/// Error that converts into an Axum HTTP response.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: &'static str,
}

impl AppError {
    fn bad_request(message: &'static str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message,
        }
    }

    fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Failed to extract theme",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

impl From<ExtractError> for AppError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::InvalidUrl(_) => AppError::bad_request("Invalid URL"),
            ExtractError::Fetch(_) => AppError::bad_request("Failed to fetch website"),
            ExtractError::Internal(detail) => {
                error!(error = %detail, "theme extraction failed");
                AppError::internal()
            }
        }
    }
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(panic = detail, "handler panicked");
    AppError::internal().into_response()
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /api/extract-theme ============

#[derive(Debug, Deserialize)]
struct ExtractRequest {
    #[serde(default)]
    url: Option<Value>,
}

/// The URL to extract from. Missing, `null` and blank strings are "required"
/// errors; any other non-string value cannot be a URL.
fn requested_url(url: Option<Value>) -> Result<String, AppError> {
    match url {
        None | Some(Value::Null) => Err(AppError::bad_request("URL is required")),
        Some(Value::String(u)) if u.trim().is_empty() => {
            Err(AppError::bad_request("URL is required"))
        }
        Some(Value::String(u)) => Ok(u),
        Some(_) => Err(AppError::bad_request("Invalid URL")),
    }
}

/// Handler for `POST /api/extract-theme`.
async fn handle_extract_theme(
    State(state): State<AppState>,
    body: Result<Json<ExtractRequest>, JsonRejection>,
) -> Result<Json<ExtractionResult>, AppError> {
    let Json(request) = body.map_err(|rejection| {
        warn!(error = %rejection, "rejected extract-theme body");
        AppError::bad_request("Invalid request body")
    })?;

    let url = requested_url(request.url)?;

    let result = state.extractor.extract_theme(&url).await?;
    Ok(Json(result))
}
