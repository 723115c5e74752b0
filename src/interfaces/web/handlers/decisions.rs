use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use super::super::AppState;

#[derive(Deserialize)]
pub struct DecisionRequest {
    decision_type: String,
    #[serde(default = "empty_object")]
    input_data: serde_json::Value,
    #[serde(default)]
    context: String,
}

fn empty_object() -> serde_json::Value {
    serde_json::json!({})
}

/// Run the decision engine. A failed completion still produced an audit row
/// before this handler sees the error, so failure maps to a JSON error body
/// rather than a transport error.
pub async fn create_decision(
    State(state): State<AppState>,
    Json(payload): Json<DecisionRequest>,
) -> Json<serde_json::Value> {
    match state
        .agent
        .make_decision(&payload.decision_type, payload.input_data, &payload.context)
        .await
    {
        Ok(decision) => Json(serde_json::json!({ "success": true, "decision": decision })),
        Err(e) => Json(serde_json::json!({ "success": false, "error": e.to_string() })),
    }
}

#[derive(Deserialize)]
pub struct DecisionsQuery {
    limit: Option<usize>,
}

pub async fn get_decisions(
    State(state): State<AppState>,
    Query(query): Query<DecisionsQuery>,
) -> Json<serde_json::Value> {
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    match state.store.recent_decisions(None, limit).await {
        Ok(decisions) => Json(serde_json::json!({ "success": true, "decisions": decisions })),
        Err(e) => Json(serde_json::json!({ "success": false, "error": e.to_string() })),
    }
}
