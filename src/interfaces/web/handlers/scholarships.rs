use axum::{
    Json,
    extract::{Query, State},
};

use super::super::AppState;
use crate::core::store::types::ScholarshipFilter;

pub async fn get_scholarships(
    State(state): State<AppState>,
    Query(filter): Query<ScholarshipFilter>,
) -> Json<serde_json::Value> {
    match state.store.list_scholarships(&filter).await {
        Ok(scholarships) => {
            let total_count = scholarships.len();
            Json(serde_json::json!({
                "scholarships": scholarships,
                "total_count": total_count,
            }))
        }
        Err(e) => Json(serde_json::json!({ "success": false, "error": e.to_string() })),
    }
}

pub async fn get_scholarship_statistics(State(state): State<AppState>) -> Json<serde_json::Value> {
    match state.store.scholarship_statistics().await {
        Ok(stats) => Json(serde_json::json!({ "success": true, "statistics": stats })),
        Err(e) => Json(serde_json::json!({ "success": false, "error": e.to_string() })),
    }
}
