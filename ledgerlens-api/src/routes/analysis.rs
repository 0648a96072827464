//! Analysis handler: recompute the report, persist it, narrate it.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use ledgerlens_core::Analyzer;
use ledgerlens_providers::{InsightsAgent, provider_for};
use serde_json::{Value, json};

use crate::state::AppState;

use super::internal_error;

pub async fn get_analysis(
    State(state): State<AppState>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let Some(statement) = state.store.load_statement().map_err(internal_error)? else {
        return Err((
            StatusCode::NOT_FOUND,
            "No transactions found. Upload a statement first.".to_string(),
        ));
    };

    let report = Analyzer::new(statement).full_report();
    state.store.save_report(&report).map_err(internal_error)?;

    let provider = provider_for(state.provider, state.model.as_deref()).map_err(internal_error)?;
    let agent = InsightsAgent::new(provider);
    tracing::info!("generating insights with {}", agent.provider_name());

    let insights = agent
        .generate_insights(&report)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Analysis failed: {e:#}")))?;
    state.store.save_insights(&insights).map_err(internal_error)?;

    Ok(Json(json!({
        "report": report,
        "insights": insights,
    })))
}
