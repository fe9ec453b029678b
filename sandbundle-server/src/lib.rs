//! HTTP boundary for sandboxed builds.
//!
//! `POST /build` (and `POST /`) accepts `{files, entryPoint?}` and answers with
//! the build result. Request errors map to `400`, engine errors to `500`; both
//! carry the same JSON body shape as a success.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use http::StatusCode;
use sandbundle_rs::{
    build_with_config, BuildError, BuildRequest, BuildResult, BundlerConfig, ShimDefinition,
    ShimRegistry,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub config: BundlerConfig,
    pub timeout: Duration,
    pub max_body_bytes: usize,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: BundlerConfig::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    config: Arc<BundlerConfig>,
}

pub fn router(options: &ServerOptions) -> Router {
    let state = AppState {
        config: Arc::new(options.config.clone()),
    };

    Router::new()
        .route("/", post(handle_build))
        .route("/build", post(handle_build))
        .route("/health", get(handle_health))
        .layer(DefaultBodyLimit::max(options.max_body_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(CatchPanicLayer::new())
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(options.timeout))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn handle_health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

async fn handle_build(
    State(state): State<AppState>,
    payload: Result<Json<BuildRequest>, JsonRejection>,
) -> (StatusCode, Json<BuildResult>) {
    let (status, result) = match payload {
        Ok(Json(request)) => {
            let result = build_with_config(request, &state.config).await;
            let status = match &result {
                Ok(_) => StatusCode::OK,
                Err(err) if err.is_client_error() => StatusCode::BAD_REQUEST,
                Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, result)
        }
        // Oversized bodies keep their 413
        Err(rejection) => (
            rejection.status(),
            Err(BuildError::RequestInvalid(rejection.body_text())),
        ),
    };
    if let Err(err) = &result {
        tracing::warn!(status = status.as_u16(), "Build failed: {}", err);
    }

    (status, Json(BuildResult::from(result)))
}

/// Reads a JSON shim file (`{"<specifier>": {"source": "...", "globals": [...]}}`)
/// and layers it over the built-in shims.
pub fn load_shim_file(path: &str) -> anyhow::Result<ShimRegistry> {
    let path = shellexpand::full(path)
        .with_context(|| format!("Failed to expand shim file path {}", path))?
        .into_owned();
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read shim file {}", path))?;
    let definitions: BTreeMap<String, ShimDefinition> = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse shim file {}", path))?;

    log::info!("Loaded {} shims from {}", definitions.len(), path);
    Ok(ShimRegistry::builtin().with_definitions(definitions))
}
