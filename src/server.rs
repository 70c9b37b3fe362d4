//! HTTP/JSON server.
//!
//! Exposes the chunk index to web front ends and LLM tooling.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `GET`  | `/ops/facets` | Facet value lists |
//! | `GET`  | `/ops/search` | Ranked retrieval, `{"results": [...]}` |
//! | `GET`  | `/ops/context` | Retrieval rendered as LLM context |
//! | `POST` | `/ops/reload` | Force a rebuild from the chunk file |
//!
//! Search parameters: `q`, `k`, and repeatable `subject`, `grade`, `ctype`.
//! A missing or unparsable `k` falls back to `[retrieval].default_limit`.
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "load_failed", "message": "Chunk file not found: ..." } }
//! ```

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use ops_index_core::format::format_for_llm;
use ops_index_core::models::{FacetIndex, ResultRecord};
use ops_index_core::search::RetrieveRequest;
use ops_index_core::store::ChunkStore;

use crate::config::Config;
use crate::file_store::FileStore;
use crate::search::{build_request, Filters};

/// Shared state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    store: Arc<dyn ChunkStore>,
}

impl AppState {
    pub fn new(config: Arc<Config>, store: Arc<dyn ChunkStore>) -> Self {
        Self { config, store }
    }
}

/// Build the router with CORS open to all origins.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/ops/facets", get(handle_facets))
        .route("/ops/search", get(handle_search))
        .route("/ops/context", get(handle_context))
        .route("/ops/reload", post(handle_reload))
        .layer(cors)
        .with_state(state)
}

/// Serve on an already-bound listener until the process ends.
pub async fn serve(listener: TcpListener, state: AppState) -> anyhow::Result<()> {
    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// Starts the server on `[server].bind`, backed by the configured chunk file.
///
/// The chunk file is loaded eagerly so a broken file is reported at startup;
/// it is still re-checked on every request.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let store = Arc::new(FileStore::from_config(config));
    let index = store.load(false).await?;
    tracing::info!(chunks = index.len(), "chunk index ready");

    let state = AppState::new(Arc::new(config.clone()), store);
    let listener = TcpListener::bind(&config.server.bind).await?;
    tracing::info!(bind = %config.server.bind, "ops server listening");
    println!("ops server listening on http://{}", config.server.bind);

    serve(listener, state).await
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

/// Chunk file missing, unreadable, or invalid. The store has already logged it.
fn load_failed(err: anyhow::Error) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "load_failed".to_string(),
        message: format!("{:#}", err),
    }
}

// ============ Query parsing ============

/// Parse the raw query pairs, keeping repeated facet keys.
fn parse_search_params(config: &Config, pairs: Vec<(String, String)>) -> RetrieveRequest {
    let mut query = String::new();
    let mut limit = None;
    let mut filters = Filters::default();

    for (key, value) in pairs {
        match key.as_str() {
            "q" => query = value,
            "k" => limit = value.trim().parse::<usize>().ok(),
            "subject" => filters.subjects.push(value),
            "grade" => filters.grades.push(value),
            "ctype" => filters.content_types.push(value),
            _ => {}
        }
    }

    build_request(config, &query, limit, filters, None)
}

// ============ Handlers ============

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

async fn handle_facets(State(state): State<AppState>) -> Result<Json<FacetIndex>, AppError> {
    let facets = state.store.facets().await.map_err(load_failed)?;
    Ok(Json(facets))
}

#[derive(Serialize)]
struct SearchResponse {
    results: Vec<ResultRecord>,
}

async fn handle_search(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<SearchResponse>, AppError> {
    let req = parse_search_params(&state.config, pairs);
    let results = state.store.retrieve(&req).await.map_err(load_failed)?;
    Ok(Json(SearchResponse { results }))
}

#[derive(Serialize)]
struct ContextResponse {
    context: String,
    results: Vec<ResultRecord>,
}

async fn handle_context(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<ContextResponse>, AppError> {
    let req = parse_search_params(&state.config, pairs);
    let results = state.store.retrieve(&req).await.map_err(load_failed)?;
    Ok(Json(ContextResponse {
        context: format_for_llm(&results),
        results,
    }))
}

#[derive(Serialize)]
struct ReloadResponse {
    chunks: usize,
}

async fn handle_reload(State(state): State<AppState>) -> Result<Json<ReloadResponse>, AppError> {
    let index = state.store.load(true).await.map_err(load_failed)?;
    Ok(Json(ReloadResponse {
        chunks: index.len(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_repeated_facets() {
        let cfg = Config::for_data_path("x.json");
        let req = parse_search_params(
            &cfg,
            pairs(&[
                ("q", "kertotaulu"),
                ("k", "3"),
                ("subject", "Matematiikka"),
                ("subject", "Historia"),
                ("grade", "1-2"),
                ("ctype", "tavoite"),
                ("unknown", "x"),
            ]),
        );
        assert_eq!(req.query, "kertotaulu");
        assert_eq!(req.limit, 3);
        assert_eq!(req.subjects, vec!["Matematiikka", "Historia"]);
        assert_eq!(req.grades, vec!["1-2"]);
        assert_eq!(req.content_types, vec!["tavoite"]);
    }

    #[test]
    fn test_parse_bad_k_falls_back() {
        let cfg = Config::for_data_path("x.json");
        let req = parse_search_params(&cfg, pairs(&[("k", "many")]));
        assert_eq!(req.limit, cfg.retrieval.default_limit);
        let req = parse_search_params(&cfg, pairs(&[("k", "")]));
        assert_eq!(req.limit, cfg.retrieval.default_limit);
        let req = parse_search_params(&cfg, vec![]);
        assert_eq!(req.query, "");
        assert_eq!(req.limit, 8);
    }
}
