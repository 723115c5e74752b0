use axum::{Json, extract::State};
use serde::Deserialize;

use super::super::AppState;
use crate::core::agent::AnalysisReport;

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    content: String,
    url: String,
    #[serde(default = "default_analysis_type")]
    analysis_type: String,
}

fn default_analysis_type() -> String {
    "scholarship_detection".to_string()
}

/// Run the content analyzer and return its report verbatim. The analyzer is
/// infallible; errors arrive inside the report.
pub async fn analyze_content(
    State(state): State<AppState>,
    Json(payload): Json<AnalyzeRequest>,
) -> Json<AnalysisReport> {
    let report = state
        .agent
        .analyze_content(&payload.content, &payload.url, &payload.analysis_type)
        .await;
    Json(report)
}
