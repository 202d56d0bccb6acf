//! HTTP API.
//!
//! ```text
//! GET  /health            liveness
//! GET  /languages         enabled languages
//! POST /translate         one text through the fallback chain
//! POST /translate/ui      one UI label (registry key, English fallback)
//! POST /translate/batch   many labels or texts, one provider call per tier
//! GET  /metrics           counters (Bearer API_KEY when configured)
//! ```

use crate::i18n::{Language, LanguageCode, LanguageConfig, LanguageRegistry};
use crate::security::is_authorized;
use crate::translation::{
    into_map, ContentType, HybridTranslator, MetricsReport, TranslationRequest, TranslationResult,
    UiLabel, UiTranslation, UiTranslator,
};
use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub translator: Arc<HybridTranslator>,
    pub ui: Arc<UiTranslator>,
    pub api_key: Option<String>,
}

impl AppState {
    pub fn new(translator: Arc<HybridTranslator>, api_key: Option<String>) -> Self {
        let ui = Arc::new(UiTranslator::new(translator.clone()));
        Self {
            translator,
            ui,
            api_key,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("`{0}` must not be empty")]
    MissingField(&'static str),

    #[error("unknown content type: {0}")]
    UnknownContentType(String),

    #[error("missing or invalid API key")]
    Unauthorized,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            _ => StatusCode::BAD_REQUEST,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct TranslateBody {
    pub text: String,
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub content_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TranslateUiBody {
    pub key: String,
    pub fallback: String,
    pub to: String,
}

#[derive(Debug, Deserialize)]
pub struct TranslateBatchBody {
    pub to: String,
    /// Source language of the item texts; English when omitted
    #[serde(default)]
    pub from: Option<String>,
    pub items: Vec<UiLabel>,
    #[serde(default)]
    pub content_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TranslateBatchResponse {
    pub translations: HashMap<String, String>,
    pub results: Vec<UiTranslation>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/languages", get(languages))
        .route("/translate", post(translate))
        .route("/translate/ui", post(translate_ui))
        .route("/translate/batch", post(translate_batch))
        .route("/metrics", get(metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API on an already-bound listener until the process exits.
pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    let addr = listener.local_addr().context("Listener has no local address")?;
    info!("Listening on http://{}", addr);
    axum::serve(listener, build_router(state))
        .await
        .context("HTTP server failed")
}

fn required(field: &'static str, value: &str) -> Result<LanguageCode, ApiError> {
    let code = LanguageCode::new(value);
    if code.is_empty() {
        return Err(ApiError::MissingField(field));
    }
    Ok(code)
}

fn content_type(value: Option<&str>, default: ContentType) -> Result<ContentType, ApiError> {
    match value {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| ApiError::UnknownContentType(raw.to_string())),
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn languages() -> Json<Vec<&'static LanguageConfig>> {
    Json(LanguageRegistry::get().list_enabled())
}

async fn translate(
    State(state): State<AppState>,
    Json(body): Json<TranslateBody>,
) -> Result<Json<TranslationResult>, ApiError> {
    let from = required("from", &body.from)?;
    let to = required("to", &body.to)?;
    let content_type = content_type(body.content_type.as_deref(), ContentType::default())?;

    let request = TranslationRequest::new(body.text, from, to, content_type);
    Ok(Json(state.translator.translate(&request).await))
}

async fn translate_ui(
    State(state): State<AppState>,
    Json(body): Json<TranslateUiBody>,
) -> Result<Json<TranslationResult>, ApiError> {
    if body.key.trim().is_empty() {
        return Err(ApiError::MissingField("key"));
    }
    let to = required("to", &body.to)?;

    Ok(Json(
        state
            .ui
            .translate_ui(&body.key, &body.fallback, to.as_str())
            .await,
    ))
}

async fn translate_batch(
    State(state): State<AppState>,
    Json(body): Json<TranslateBatchBody>,
) -> Result<Json<TranslateBatchResponse>, ApiError> {
    let to = required("to", &body.to)?;
    let content_type = content_type(body.content_type.as_deref(), ContentType::Ui)?;

    let from = match body.from.as_deref() {
        Some(raw) => required("from", raw)?,
        None => Language::canonical().into(),
    };

    // Registry keys are authored against the canonical language
    let keyed = content_type == ContentType::Ui && from.language() == Some(Language::canonical());
    let results = if keyed {
        state.ui.translate_ui_batch(&body.items, to.as_str()).await
    } else {
        let texts: Vec<String> = body.items.iter().map(|item| item.text.clone()).collect();
        let translated = state
            .translator
            .translate_many(&texts, &from, &to, content_type)
            .await;

        body.items
            .into_iter()
            .zip(translated)
            .map(|(item, result)| UiTranslation {
                key: item.key,
                result,
            })
            .collect()
    };

    Ok(Json(TranslateBatchResponse {
        translations: into_map(results.clone()),
        results,
    }))
}

async fn metrics(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MetricsReport>, ApiError> {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    if !is_authorized(authorization, state.api_key.as_deref()) {
        return Err(ApiError::Unauthorized);
    }
    Ok(Json(state.translator.metrics()))
}
