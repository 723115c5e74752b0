pub mod prompts;

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::core::broadcast::DashboardBroadcaster;
use crate::core::config::HunterConfig;
use crate::core::llm::{CompletionBackend, CompletionOutcome, CompletionParams};
use crate::core::store::AgentStore;
use crate::core::store::types::{
    AgentRecord, AgentSeed, DecisionRecord, Importance, NewDecision, ThoughtRecord,
};

use prompts::DecisionOutput;

pub const MASTER_AGENT_NAME: &str = "Master Scholarship Hunter";

/// One candidate record extracted by the analyzer. Every field is optional
/// on the wire; models omit what they don't find.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScholarshipCandidate {
    pub name: String,
    pub provider: String,
    pub country: String,
    pub field_of_study: String,
    pub academic_level: String,
    #[serde(alias = "tunisia_eligible")]
    pub target_eligible: bool,
    pub funding_type: String,
    pub funding_amount: String,
    pub application_deadline: Option<String>,
    pub application_url: String,
    pub requirements: Option<String>,
    pub relevance_scores: RelevanceScores,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RelevanceScores {
    pub ai: f64,
    pub web_dev: f64,
    pub it: f64,
}

impl RelevanceScores {
    pub fn overall(&self) -> f64 {
        (self.ai + self.web_dev + self.it) / 3.0
    }
}

/// What `analyze_content` hands back. Failures show up as `error` (plus
/// `raw_response` for parse failures) with an empty candidate list, never as
/// a panic or an Err.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisReport {
    pub scholarships: Vec<ScholarshipCandidate>,
    pub analysis_summary: Option<String>,
    pub error: Option<String>,
    pub raw_response: Option<String>,
}

/// The master hunter agent: one persisted identity plus the decision engine,
/// content analyzer, thought log and metrics recorder built around it.
///
/// The store, completion backend and broadcaster are all injected, so the
/// whole pipeline runs against a canned backend in tests.
pub struct HunterAgent {
    store: Arc<AgentStore>,
    backend: Arc<dyn CompletionBackend>,
    broadcaster: DashboardBroadcaster,
    config: Arc<HunterConfig>,
    record: AgentRecord,
}

impl HunterAgent {
    /// Idempotent: re-running with the same name reuses the existing row.
    pub async fn initialize(
        store: Arc<AgentStore>,
        backend: Arc<dyn CompletionBackend>,
        broadcaster: DashboardBroadcaster,
        config: Arc<HunterConfig>,
        name: &str,
        agent_type: &str,
    ) -> Result<Self> {
        let seed = AgentSeed {
            name: name.to_string(),
            agent_type: agent_type.to_string(),
            ai_model: config.model.clone(),
            model_provider: config.model_provider.clone(),
            temperature: 0.7,
            max_tokens: config.analysis_max_tokens as i64,
            system_prompt: prompts::system_prompt(&config),
            capabilities: json!({
                "content_analysis": true,
                "decision_making": true,
                "strategy_planning": true,
                "eligibility_verification": true,
            }),
        };
        let record = store.get_or_create_agent(&seed).await?;

        Ok(Self {
            store,
            backend,
            broadcaster,
            config,
            record,
        })
    }

    pub fn agent_id(&self) -> &str {
        &self.record.id
    }

    /// Record a thinking step with the default confidence and surface it to
    /// dashboard subscribers.
    pub async fn think(
        &self,
        content: &str,
        thought_type: &str,
        importance: Importance,
    ) -> Result<ThoughtRecord> {
        self.think_with_confidence(
            content,
            thought_type,
            importance,
            self.config.default_thought_confidence,
        )
        .await
    }

    /// Persist first, then best-effort broadcast. The stored row is the
    /// source of truth; a dead broadcast channel never fails this call.
    pub async fn think_with_confidence(
        &self,
        content: &str,
        thought_type: &str,
        importance: Importance,
        confidence: f64,
    ) -> Result<ThoughtRecord> {
        let thought = self
            .store
            .record_thought(&self.record.id, thought_type, content, importance, confidence)
            .await?;

        self.broadcaster.publish_thinking(&self.record.name, &thought);

        let preview: String = content.chars().take(100).collect();
        info!("AI Thought ({}): {}", thought_type, preview);
        Ok(thought)
    }

    /// Run one structured decision through the model and persist the outcome.
    ///
    /// A failed completion is still written to the audit trail (success=false,
    /// zero confidence, the error message) before the error surfaces to the
    /// caller. Unparseable responses degrade to a fallback payload instead of
    /// failing.
    pub async fn make_decision(
        &self,
        decision_type: &str,
        input_data: Value,
        context: &str,
    ) -> Result<DecisionRecord> {
        let messages = prompts::decision_messages(&self.config, decision_type, context, &input_data);
        let params = CompletionParams {
            model: self.config.model.clone(),
            temperature: self.config.decision_temperature,
            max_tokens: self.config.decision_max_tokens,
        };

        match self.backend.chat_completion(&messages, &params).await {
            CompletionOutcome::Success {
                content,
                tokens_used,
                processing_time,
            } => {
                let output =
                    DecisionOutput::from_model_text(&content, self.config.fallback_confidence);

                let decision = self
                    .store
                    .insert_decision(NewDecision {
                        agent_id: self.record.id.clone(),
                        decision_type: decision_type.to_string(),
                        input_data,
                        output_data: output.output_payload(),
                        reasoning: output.reasoning().to_string(),
                        confidence_score: output.confidence(),
                        processing_time,
                        tokens_used: tokens_used as i64,
                        success: true,
                        error_message: None,
                    })
                    .await?;

                let headline: String = output.headline().chars().take(120).collect();
                if let Err(e) = self
                    .think(
                        &format!("Decision ({}): {}", decision_type, headline),
                        "reflection",
                        Importance::Medium,
                    )
                    .await
                {
                    warn!("Could not record decision thought: {}", e);
                }

                self.record_metric("decision_time", processing_time, "seconds", None)
                    .await;

                info!("AI Decision ({}): {}", decision_type, headline);
                Ok(decision)
            }
            CompletionOutcome::Failure {
                error: cause,
                processing_time,
            } => {
                // The audit row comes first; only then does the error surface.
                self.store
                    .insert_decision(NewDecision {
                        agent_id: self.record.id.clone(),
                        decision_type: decision_type.to_string(),
                        input_data,
                        output_data: json!({}),
                        reasoning: format!("Decision failed: {}", cause),
                        confidence_score: 0.0,
                        processing_time,
                        tokens_used: 0,
                        success: false,
                        error_message: Some(cause.clone()),
                    })
                    .await?;

                error!("AI Decision failed ({}): {}", decision_type, cause);
                Err(anyhow!("AI decision failed: {}", cause))
            }
        }
    }

    /// Extract structured scholarship candidates from raw page content.
    /// Content beyond the configured character budget is cut before the call.
    pub async fn analyze_content(
        &self,
        content: &str,
        url: &str,
        analysis_type: &str,
    ) -> AnalysisReport {
        if let Err(e) = self
            .think(
                &format!("Analyzing content from {} for {}", url, analysis_type),
                "analysis",
                Importance::Medium,
            )
            .await
        {
            warn!("Could not record analysis thought: {}", e);
        }

        let messages = prompts::analysis_messages(&self.config, content, url, analysis_type);
        let params = CompletionParams {
            model: self.config.model.clone(),
            temperature: self.config.analysis_temperature,
            max_tokens: self.config.analysis_max_tokens,
        };

        match self.backend.chat_completion(&messages, &params).await {
            CompletionOutcome::Failure { error: cause, .. } => {
                error!("Content analysis failed for {}: {}", url, cause);
                self.record_metric("content_analysis_error", 1.0, "count", None)
                    .await;
                if let Err(e) = self
                    .think(
                        &format!("Content analysis failed for {}: {}", url, cause),
                        "analysis",
                        Importance::High,
                    )
                    .await
                {
                    warn!("Could not record analysis failure thought: {}", e);
                }
                AnalysisReport {
                    error: Some(cause),
                    ..Default::default()
                }
            }
            CompletionOutcome::Success { content: text, .. } => {
                match prompts::parse_analysis(&text) {
                    Some((scholarships, analysis_summary)) => {
                        self.record_metric("content_analysis_success", 1.0, "count", None)
                            .await;
                        if let Err(e) = self
                            .think(
                                &format!(
                                    "Extracted {} candidate scholarships from {}",
                                    scholarships.len(),
                                    url
                                ),
                                "discovery",
                                Importance::High,
                            )
                            .await
                        {
                            warn!("Could not record discovery thought: {}", e);
                        }
                        AnalysisReport {
                            scholarships,
                            analysis_summary,
                            error: None,
                            raw_response: None,
                        }
                    }
                    None => {
                        self.record_metric("content_analysis_failure", 1.0, "count", None)
                            .await;
                        if let Err(e) = self
                            .think(
                                &format!("Could not parse analysis response for {}", url),
                                "analysis",
                                Importance::High,
                            )
                            .await
                        {
                            warn!("Could not record parse failure thought: {}", e);
                        }
                        AnalysisReport {
                            error: Some("Failed to parse AI analysis".to_string()),
                            raw_response: Some(text),
                            ..Default::default()
                        }
                    }
                }
            }
        }
    }

    /// Plan the next search phase from current results. Errors come back as
    /// an error-shaped payload so callers can keep going.
    pub async fn plan_search_strategy(&self, current_results: Value) -> Value {
        if let Err(e) = self
            .think(
                "Planning next search strategy based on current results",
                "planning",
                Importance::High,
            )
            .await
        {
            warn!("Could not record planning thought: {}", e);
        }

        match self
            .make_decision(
                "strategy_planning",
                current_results,
                "Planning next phase of scholarship search based on current progress",
            )
            .await
        {
            Ok(decision) => decision.output_data,
            Err(e) => {
                error!("Strategy planning failed: {}", e);
                json!({ "error": e.to_string() })
            }
        }
    }

    /// Fire-and-forget: metrics are diagnostic, never load-bearing.
    pub async fn record_metric(
        &self,
        name: &str,
        value: f64,
        unit: &str,
        context: Option<Value>,
    ) {
        if let Err(e) = self
            .store
            .record_metric(&self.record.id, name, value, unit, context)
            .await
        {
            error!("Error recording metric {}: {}", name, e);
        }
    }
}
