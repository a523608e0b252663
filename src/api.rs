// src/api.rs
//! HTTP surface over the trained indices.
//!
//! Routes:
//! - `GET  /health`
//! - `POST /analyze`       `{ "text": "...", "trace": false }`
//! - `POST /batch`         `[ { "id": "a", "text": "..." } ]`
//! - `GET  /debug/index`
//! - `POST /admin/reload`
//! - `GET  /metrics`

use std::sync::{Arc, RwLock};
use std::time::Instant;

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use metrics::{counter, gauge, histogram};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::SentimentError;
use crate::index::{IndexPair, Label};
use crate::logging::anon_hash;
use crate::metrics::{
    Metrics, INDEX_RELOADS_TOTAL, INVALID_INPUT_TOTAL, MISSING_INDEX_TOTAL, SCORED_TOTAL,
    SCORE_DURATION_MS, VOCABULARY_SIZE,
};
use crate::scorer::{Polarity, WordContribution};
use crate::store::IndexStore;

type Slot = std::result::Result<Arc<IndexPair>, SentimentError>;

/// Shared, swappable view of the current indices.
///
/// Readers clone the inner `Arc` and score without holding the lock; a reload
/// replaces it in one write.
#[derive(Clone)]
pub struct IndexHandle {
    inner: Arc<RwLock<Slot>>,
}

impl IndexHandle {
    pub fn new(pair: IndexPair) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Ok(Arc::new(pair)))),
        }
    }

    /// A handle with nothing loaded; scoring reports `MissingIndex { label }`.
    pub fn missing(label: Label) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Err(SentimentError::MissingIndex { label }))),
        }
    }

    /// Load from the store. Never-trained indices give an empty handle;
    /// a corrupt file is an error.
    pub fn load(store: &IndexStore) -> Result<Self> {
        match store.load_pair() {
            Ok(pair) => Ok(Self::new(pair)),
            Err(e) => match e.downcast_ref::<SentimentError>() {
                Some(SentimentError::MissingIndex { label }) => {
                    warn!(target: "api", %label, dir = %store.dir().display(), "no trained index; run `train` first");
                    Ok(Self::missing(*label))
                }
                _ => Err(e),
            },
        }
    }

    pub fn current(&self) -> std::result::Result<Arc<IndexPair>, SentimentError> {
        let guard = self.inner.read().unwrap_or_else(|p| p.into_inner());
        guard.clone()
    }

    pub fn replace(&self, pair: IndexPair) {
        let mut guard = self.inner.write().unwrap_or_else(|p| p.into_inner());
        *guard = Ok(Arc::new(pair));
    }
}

#[derive(Clone)]
pub struct AppState {
    pub indices: IndexHandle,
    pub store: IndexStore,
    pub metrics: Option<Metrics>,
}

impl AppState {
    pub fn new(indices: IndexHandle, store: IndexStore) -> Self {
        Self {
            indices,
            store,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// State for the server binary: indices from the configured store, metrics on.
    pub fn from_config(cfg: &AppConfig) -> Result<Self> {
        let metrics = Metrics::init()?;
        let store = cfg.store();
        let indices = IndexHandle::load(&store)?;
        if let Ok(pair) = indices.current() {
            record_vocabulary(&pair);
        }
        Ok(Self::new(indices, store).with_metrics(metrics))
    }
}

pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/analyze", post(analyze))
        .route("/batch", post(analyze_batch))
        .route("/debug/index", get(debug_index))
        .route("/admin/reload", post(admin_reload));

    if let Some(m) = &state.metrics {
        app = app.merge(m.router());
    }

    app.layer(CorsLayer::very_permissive()).with_state(state)
}

/// Bind and serve until Ctrl-C.
pub async fn serve(addr: &str, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(target: "api", addr, "listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("http server")
}

/* ----------------------------
Errors
---------------------------- */

#[derive(Debug)]
pub enum ApiError {
    Sentiment(SentimentError),
    Internal(anyhow::Error),
}

impl From<SentimentError> for ApiError {
    fn from(e: SentimentError) -> Self {
        ApiError::Sentiment(e)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        match e.downcast_ref::<SentimentError>() {
            Some(s) => ApiError::Sentiment(s.clone()),
            None => ApiError::Internal(e),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

fn status_for(e: &SentimentError) -> StatusCode {
    match e {
        SentimentError::InvalidInput => StatusCode::UNPROCESSABLE_ENTITY,
        SentimentError::MissingIndex { .. } => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            ApiError::Sentiment(e) => (status_for(&e), e.to_string()),
            ApiError::Internal(e) => {
                warn!(target: "api", error = ?e, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}"))
            }
        };
        (status, Json(ErrorBody { error: msg })).into_response()
    }
}

fn record_rejection(e: &SentimentError) {
    match e {
        SentimentError::InvalidInput => counter!(INVALID_INPUT_TOTAL).increment(1),
        SentimentError::MissingIndex { .. } => counter!(MISSING_INDEX_TOTAL).increment(1),
    }
}

fn record_vocabulary(pair: &IndexPair) {
    for label in Label::ALL {
        gauge!(VOCABULARY_SIZE, "label" => label.as_str()).set(pair.get(label).len() as f64);
    }
}

fn current_indices(state: &AppState) -> std::result::Result<Arc<IndexPair>, ApiError> {
    state.indices.current().map_err(|e| {
        record_rejection(&e);
        ApiError::from(e)
    })
}

/* ----------------------------
Handlers
---------------------------- */

#[derive(Deserialize)]
struct AnalyzeReq {
    text: String,
    #[serde(default)]
    trace: bool,
}

#[derive(Serialize)]
struct AnalyzeResp {
    score: f64,
    label: Polarity,
    tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace: Option<Vec<WordContribution>>,
}

async fn analyze(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeReq>,
) -> std::result::Result<Json<AnalyzeResp>, ApiError> {
    let pair = current_indices(&state)?;

    let started = Instant::now();
    let report = pair.score_with_trace(&body.text).map_err(|e| {
        record_rejection(&e);
        ApiError::from(e)
    })?;
    histogram!(SCORE_DURATION_MS).record(started.elapsed().as_secs_f64() * 1000.0);
    counter!(SCORED_TOTAL).increment(1);

    info!(
        target: "api",
        id = %anon_hash(&body.text),
        score = report.score,
        label = %report.polarity,
        tokens = report.tokens,
        "analyzed"
    );

    Ok(Json(AnalyzeResp {
        score: report.score,
        label: report.polarity,
        tokens: report.tokens,
        trace: body.trace.then_some(report.trace),
    }))
}

#[derive(Deserialize)]
struct BatchItem {
    #[serde(default)]
    id: Option<String>,
    text: String,
}

#[derive(Serialize)]
struct BatchOut {
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<Polarity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

async fn analyze_batch(
    State(state): State<AppState>,
    Json(items): Json<Vec<BatchItem>>,
) -> std::result::Result<Json<Vec<BatchOut>>, ApiError> {
    let pair = current_indices(&state)?;

    let out = items
        .into_iter()
        .enumerate()
        .map(|(i, it)| {
            let id = it.id.unwrap_or_else(|| i.to_string());
            let started = Instant::now();
            match pair.score(&it.text) {
                Ok(score) => {
                    histogram!(SCORE_DURATION_MS).record(started.elapsed().as_secs_f64() * 1000.0);
                    counter!(SCORED_TOTAL).increment(1);
                    BatchOut {
                        id,
                        score: Some(score),
                        label: Some(Polarity::from_score(score)),
                        error: None,
                    }
                }
                Err(e) => {
                    record_rejection(&e);
                    BatchOut {
                        id,
                        score: None,
                        label: None,
                        error: Some(e.to_string()),
                    }
                }
            }
        })
        .collect::<Vec<_>>();

    info!(target: "api", items = out.len(), "batch analyzed");
    Ok(Json(out))
}

#[derive(Serialize)]
struct IndexInfo {
    loaded: bool,
    positive_vocabulary: usize,
    negative_vocabulary: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

async fn debug_index(State(state): State<AppState>) -> Json<IndexInfo> {
    match state.indices.current() {
        Ok(pair) => Json(IndexInfo {
            loaded: true,
            positive_vocabulary: pair.positive.len(),
            negative_vocabulary: pair.negative.len(),
            error: None,
        }),
        Err(e) => Json(IndexInfo {
            loaded: false,
            positive_vocabulary: 0,
            negative_vocabulary: 0,
            error: Some(e.to_string()),
        }),
    }
}

async fn admin_reload(
    State(state): State<AppState>,
) -> std::result::Result<Json<IndexInfo>, ApiError> {
    let store = state.store.clone();
    let pair = tokio::task::spawn_blocking(move || store.load_pair())
        .await
        .context("reload task panicked")??;

    record_vocabulary(&pair);
    let info = IndexInfo {
        loaded: true,
        positive_vocabulary: pair.positive.len(),
        negative_vocabulary: pair.negative.len(),
        error: None,
    };
    state.indices.replace(pair);
    counter!(INDEX_RELOADS_TOTAL).increment(1);
    info!(
        target: "api",
        positive = info.positive_vocabulary,
        negative = info.negative_vocabulary,
        "indices reloaded"
    );
    Ok(Json(info))
}
