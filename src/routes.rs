use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::state::AppState;
use crate::translate::{SmokeTestResponse, TranslateError, TranslationRequest, TranslationResponse};

pub const API_TITLE: &str = "Text Translation API";
pub const API_DESCRIPTION: &str = "A simple text translation API backed by a hosted language model";

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/docs", get(docs))
        .route("/translate", post(translate_text))
        .route("/test", get(test_translation))
}

/// Full application: routes plus CORS and request tracing.
pub fn build_app(state: AppState) -> Router {
    // Wildcard origins cannot carry credentials, so the credentialed variant mirrors the caller.
    let cors = if state.config.cors.allow_credentials {
        CorsLayer::very_permissive()
    } else {
        CorsLayer::permissive()
    };

    Router::new()
        .merge(create_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Translation API is running",
        "docs": "/docs"
    }))
}

async fn docs() -> Json<Value> {
    Json(json!({
        "title": API_TITLE,
        "description": API_DESCRIPTION,
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            {
                "method": "POST",
                "path": "/translate",
                "summary": "Translate text from one language to another",
                "body": {
                    "text": "The text to translate (required, not blank)",
                    "input_language": "Source language (default: English)",
                    "output_language": "Target language (default: Malay)"
                }
            },
            {
                "method": "GET",
                "path": "/test",
                "summary": "Translate a fixed sentence to check the model provider is reachable"
            },
            {
                "method": "GET",
                "path": "/",
                "summary": "Liveness message"
            }
        ]
    }))
}

async fn translate_text(
    State(state): State<AppState>,
    payload: Result<Json<TranslationRequest>, JsonRejection>,
) -> Result<Json<TranslationResponse>, ApiError> {
    let Json(request) = payload?;

    state
        .translator
        .translate(request)
        .await
        .map(Json)
        .map_err(|e| match e {
            TranslateError::Validation(msg) => ApiError::BadRequest(msg),
            TranslateError::Upstream(e) => ApiError::Internal(format!("Translation failed: {}", e)),
        })
}

async fn test_translation(
    State(state): State<AppState>,
) -> Result<Json<SmokeTestResponse>, ApiError> {
    state
        .translator
        .smoke_test()
        .await
        .map(Json)
        .map_err(|e| ApiError::Internal(format!("Test failed: {}", e)))
}
