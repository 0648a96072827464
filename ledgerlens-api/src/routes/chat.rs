//! Q&A over the cached report.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use ledgerlens_providers::{InsightsAgent, provider_for};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

use super::internal_error;

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub response: String,
}

pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, String)> {
    let Some(report) = state.store.load_report().map_err(internal_error)? else {
        return Err((
            StatusCode::NOT_FOUND,
            "Analysis report not found. Run analysis first.".to_string(),
        ));
    };

    let provider = provider_for(state.provider, state.model.as_deref()).map_err(internal_error)?;
    let agent = InsightsAgent::new(provider);

    let answer = agent
        .answer_question(&req.message, &report)
        .await
        .map_err(internal_error)?;

    Ok(Json(ChatResponse { response: answer }))
}
