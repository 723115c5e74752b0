use axum::{
    Json,
    extract::{Path, State},
};

use super::super::AppState;

pub async fn get_agents(State(state): State<AppState>) -> Json<serde_json::Value> {
    match state.store.list_agents().await {
        Ok(agents) => {
            let total_count = agents.len();
            Json(serde_json::json!({
                "agents": agents,
                "total_count": total_count,
            }))
        }
        Err(e) => Json(serde_json::json!({ "success": false, "error": e.to_string() })),
    }
}

pub async fn get_agent_detail(
    Path(agent_id): Path<String>,
    State(state): State<AppState>,
) -> Json<serde_json::Value> {
    match state.store.get_agent(&agent_id).await {
        Ok(Some(agent)) => {
            let recent = state
                .store
                .recent_decisions(Some(&agent.id), 10)
                .await
                .unwrap_or_default();
            Json(serde_json::json!({
                "agent": agent,
                "recent_decisions": recent,
            }))
        }
        Ok(None) => Json(serde_json::json!({ "success": false, "error": "Agent not found" })),
        Err(e) => Json(serde_json::json!({ "success": false, "error": e.to_string() })),
    }
}

pub async fn get_agent_statistics(State(state): State<AppState>) -> Json<serde_json::Value> {
    match state.store.agent_statistics().await {
        Ok(stats) => Json(serde_json::json!({ "success": true, "statistics": stats })),
        Err(e) => Json(serde_json::json!({ "success": false, "error": e.to_string() })),
    }
}
