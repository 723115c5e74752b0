use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use super::super::AppState;

#[derive(Deserialize)]
pub struct ThoughtsQuery {
    limit: Option<usize>,
}

/// Backfill for the live thought feed.
pub async fn get_thoughts(
    State(state): State<AppState>,
    Query(query): Query<ThoughtsQuery>,
) -> Json<serde_json::Value> {
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    match state.store.recent_thoughts(limit).await {
        Ok(thoughts) => Json(serde_json::json!({ "success": true, "thoughts": thoughts })),
        Err(e) => Json(serde_json::json!({ "success": false, "error": e.to_string() })),
    }
}
