use axum::{Json, body::Bytes, extract::State};

use super::super::AppState;
use crate::core::hunt::HuntRequest;

/// Body is optional: an empty POST starts a hunt with defaults.
pub async fn start_hunt(State(state): State<AppState>, body: Bytes) -> Json<serde_json::Value> {
    let request: HuntRequest = if body.is_empty() {
        HuntRequest::default()
    } else {
        match serde_json::from_slice(&body) {
            Ok(parsed) => parsed,
            Err(e) => {
                return Json(serde_json::json!({
                    "success": false,
                    "error": format!("invalid request body: {}", e),
                }));
            }
        }
    };

    match state.hunts.start(request).await {
        Ok(session) => Json(serde_json::json!({
            "success": true,
            "message": "Live hunt started successfully",
            "session": session,
        })),
        Err(e) => Json(serde_json::json!({ "success": false, "error": e.to_string() })),
    }
}

pub async fn stop_hunt(State(state): State<AppState>) -> Json<serde_json::Value> {
    match state.hunts.stop().await {
        Ok(stopped) => Json(serde_json::json!({
            "success": true,
            "message": "Live hunt stopped successfully",
            "stopped_sessions": stopped,
        })),
        Err(e) => Json(serde_json::json!({ "success": false, "error": e.to_string() })),
    }
}

pub async fn hunt_status(State(state): State<AppState>) -> Json<serde_json::Value> {
    match state.hunts.status().await {
        Ok(Some(session)) => Json(serde_json::json!({
            "hunting": true,
            "session": session,
        })),
        Ok(None) => Json(serde_json::json!({
            "hunting": false,
            "message": "No active hunting sessions",
        })),
        Err(e) => Json(serde_json::json!({ "success": false, "error": e.to_string() })),
    }
}
