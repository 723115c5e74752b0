use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use super::super::AppState;

#[derive(Deserialize)]
pub struct MetricsQuery {
    name: Option<String>,
    limit: Option<usize>,
}

pub async fn get_metrics(
    State(state): State<AppState>,
    Query(query): Query<MetricsQuery>,
) -> Json<serde_json::Value> {
    let limit = query.limit.unwrap_or(100).clamp(1, 500);
    match state
        .store
        .recent_metrics(query.name.as_deref(), limit)
        .await
    {
        Ok(metrics) => Json(serde_json::json!({ "success": true, "metrics": metrics })),
        Err(e) => Json(serde_json::json!({ "success": false, "error": e.to_string() })),
    }
}
