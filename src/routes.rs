use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::info;

use crate::models::GenerateImageBody;
use crate::service::GenerationService;

const API_NAME: &str = "Pixel Bloom API";
/// Directory the front-end bundle is served from.
const STATIC_DIR: &str = "public";

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<GenerationService>,
}

/// Full HTTP surface: the generation API, health probes, a blocked internal
/// prefix, and the static front end at the site root.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/generate-image", post(generate_image))
        .route("/api/health", get(health))
        .route("/ping", get(ping))
        .route("/backend", any(blocked))
        .route("/backend/*path", any(blocked))
        .fallback_service(ServeDir::new(STATIC_DIR).append_index_html_on_directories(true))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn generate_image(
    State(state): State<AppState>,
    Json(body): Json<GenerateImageBody>,
) -> Response {
    let request = body.into_request();
    info!(
        prompt = %truncate(&request.prompt, 80),
        style = request.style.label(),
        ratio = request.ratio.label(),
        "🚀 generate-image request"
    );

    match state.service.generate(&request).await {
        Ok(image_data_url) => {
            info!(chars = image_data_url.len(), "✅ returning image payload");
            Json(json!({ "imageDataUrl": image_data_url })).into_response()
        }
        Err(err) => {
            let status = err.status_code();
            let mut payload = json!({ "error": err.to_string() });
            if err.is_policy() {
                payload["filtered"] = json!(true);
            }
            (status, Json(payload)).into_response()
        }
    }
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "ok": true,
        "name": API_NAME,
        "timestamp": Utc::now().timestamp_millis(),
    }))
}

pub async fn ping() -> &'static str {
    "pong"
}

/// The reserved internal prefix 404s regardless of method.
pub async fn blocked() -> StatusCode {
    StatusCode::NOT_FOUND
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        format!("{}…", s.chars().take(max).collect::<String>())
    }
}
