//! Stored-statement readback.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::state::AppState;

use super::internal_error;

/// Split the stored statement into account metadata and the transaction list
pub async fn get_transactions(
    State(state): State<AppState>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let statement = state
        .store
        .load_statement()
        .map_err(internal_error)?
        .unwrap_or_default();

    let mut account_info = serde_json::to_value(&statement).map_err(|e| internal_error(e.into()))?;
    let transactions = account_info
        .as_object_mut()
        .and_then(|obj| obj.remove("transactions"))
        .unwrap_or_else(|| Value::Array(Vec::new()));

    Ok(Json(json!({
        "account_info": account_info,
        "transactions": transactions,
    })))
}
