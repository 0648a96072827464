//! Route handlers. Errors are mapped to status-code/string pairs at this
//! boundary; there is no retry or partial-failure handling behind it.

pub mod analysis;
pub mod chat;
pub mod transactions;
pub mod upload;

use axum::Json;
use axum::http::StatusCode;
use serde_json::{Value, json};

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "ledgerlens API is running" }))
}

pub(crate) fn internal_error(err: anyhow::Error) -> (StatusCode, String) {
    tracing::error!("request failed: {err:#}");
    (StatusCode::INTERNAL_SERVER_ERROR, format!("{err:#}"))
}
