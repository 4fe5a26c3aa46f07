//! Administrative HTTP surface.
//!
//! A small axum router for operator tooling:
//!
//! - `GET /pre-authorize/:identity` returns the live grant, or runs
//!   chain verification and grants on success
//! - `POST /pre-authorize/:identity` is the forced grant; it requires
//!   the system secret as a Bearer credential and bypasses chain checks
//! - `GET /health`
//!
//! The hard authorization logic lives in the gateway; these handlers
//! only translate HTTP to it.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tracing::warn;

use graphgate_core::Identity;

use crate::gateway::Gateway;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    gateway: Arc<Gateway>,
}

/// Build the administrative router around a gateway.
pub fn admin_router(gateway: Arc<Gateway>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/pre-authorize/:identity",
            get(pre_authorize).post(force_pre_authorize),
        )
        .with_state(AppState { gateway })
}

async fn health() -> &'static str {
    "ok"
}

async fn pre_authorize(
    State(state): State<AppState>,
    Path(identity): Path<String>,
) -> Response {
    let identity = Identity::new(identity);
    match state.gateway.pre_authorize(&identity).await {
        Some(entry) => (StatusCode::OK, Json(entry)).into_response(),
        None => (
            StatusCode::FORBIDDEN,
            Json(serde_json::json!({ "error": "identity is not authorized" })),
        )
            .into_response(),
    }
}

async fn force_pre_authorize(
    State(state): State<AppState>,
    Path(identity): Path<String>,
    headers: HeaderMap,
) -> Response {
    let presented = bearer_from_headers(&headers);
    match presented {
        Some(secret) if state.gateway.is_system_secret(secret) => {
            let identity = Identity::new(identity);
            let entry = state.gateway.force_pre_authorize(&identity).await;
            (StatusCode::OK, Json(entry)).into_response()
        }
        _ => {
            warn!("forced pre-authorization refused: bad or missing system secret");
            (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({ "error": "system secret required" })),
            )
                .into_response()
        }
    }
}

fn bearer_from_headers(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .map(str::trim)
}
