use axum::{
    extract::{Query as QueryParams, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use seeker_core::corpus::{load_corpus, CorpusOptions};
use seeker_core::rank::DEFAULT_TOP_K;
use seeker_core::{
    EngineConfig, IndexStats, NormalizerKind, Query, QueryResult, SearchEngine, SearchError, WeightingScheme,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_mode")]
    pub mode: String,
    pub window: Option<usize>,
    pub k: Option<usize>,
}
fn default_mode() -> String { "ranked".to_string() }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub mode: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub result: QueryResult,
}

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SearchEngine>,
}

pub struct ApiError(SearchError);

impl From<SearchError> for ApiError {
    fn from(e: SearchError) -> Self { ApiError(e) }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            SearchError::NotReady => StatusCode::SERVICE_UNAVAILABLE,
            e if e.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}

/// Command-line and environment overrides applied on top of a base config.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub normalizer: Option<NormalizerKind>,
    pub scheme: Option<WeightingScheme>,
    pub top_k: Option<usize>,
    pub parallel: bool,
}

pub fn resolve_config(base: EngineConfig, overrides: &ConfigOverrides) -> Result<EngineConfig, SearchError> {
    let mut config = base;
    if let Some(normalizer) = overrides.normalizer {
        config = config.with_normalizer(normalizer);
    }
    if let Some(scheme) = overrides.scheme {
        config = config.with_scheme(scheme);
    }
    if let Some(top_k) = overrides.top_k {
        config = config.with_top_k(top_k);
    }
    let parallel = config.parallel_build || overrides.parallel;
    config = config.with_parallel_build(parallel);
    config.validate()?;
    Ok(config)
}

pub fn build_app(engine: Arc<SearchEngine>) -> Router {
    let app_state = AppState { engine };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/ready", get(ready_handler))
        .route("/stats", get(stats_handler))
        .route("/search", get(search_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Read the corpus and build the engine on the blocking pool. Until this
/// finishes every query answers 503.
pub fn spawn_index_build(engine: Arc<SearchEngine>, corpus: PathBuf, options: CorpusOptions) -> JoinHandle<()> {
    tokio::task::spawn_blocking(move || match load_corpus(&corpus, &options) {
        Ok(loaded) => {
            engine.build(loaded.documents);
        }
        Err(e) => tracing::error!(error = %e, corpus = %corpus.display(), "index build failed"),
    })
}

async fn ready_handler(State(state): State<AppState>) -> StatusCode {
    if state.engine.is_ready() { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE }
}

async fn stats_handler(State(state): State<AppState>) -> Result<Json<IndexStats>, ApiError> {
    Ok(Json(state.engine.stats()?))
}

pub async fn search_handler(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let start = std::time::Instant::now();
    let k = params.k.map(|k| k.clamp(1, DEFAULT_TOP_K));
    let query = Query::from_mode(&params.mode, &params.q, params.window, k)?;
    let result = state.engine.execute(&query)?;
    let elapsed = start.elapsed();
    Ok(Json(SearchResponse {
        query: params.q,
        mode: query.mode().to_string(),
        took_s: elapsed.as_secs_f64(),
        total_hits: result.len(),
        result,
    }))
}
