use serde::Serialize;

/// Seed values for an idempotent agent get-or-create.
#[derive(Debug, Clone)]
pub struct AgentSeed {
    pub name: String,
    pub agent_type: String,
    pub ai_model: String,
    pub model_provider: String,
    pub temperature: f64,
    pub max_tokens: i64,
    pub system_prompt: String,
    pub capabilities: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentRecord {
    pub id: String,
    pub name: String,
    pub agent_type: String,
    pub ai_model: String,
    pub model_provider: String,
    pub temperature: f64,
    pub max_tokens: i64,
    pub is_active: bool,
    pub system_prompt: String,
    pub capabilities: serde_json::Value,
    pub tasks_completed: i64,
    pub total_decisions: i64,
    pub created_at: String,
    pub last_activity: String,
}

/// How loudly a thought should surface on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Importance {
    Low,
    Medium,
    High,
    Critical,
}

impl Importance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Importance::Low => "low",
            Importance::Medium => "medium",
            Importance::High => "high",
            Importance::Critical => "critical",
        }
    }

}

#[derive(Debug, Clone, Serialize)]
pub struct ThoughtRecord {
    pub id: String,
    pub agent_id: String,
    pub thought_type: String,
    pub content: String,
    pub importance: String,
    pub confidence: f64,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewDecision {
    pub agent_id: String,
    pub decision_type: String,
    pub input_data: serde_json::Value,
    pub output_data: serde_json::Value,
    pub reasoning: String,
    pub confidence_score: f64,
    pub processing_time: f64,
    pub tokens_used: i64,
    pub success: bool,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DecisionRecord {
    pub id: String,
    pub agent_id: String,
    pub decision_type: String,
    pub input_data: serde_json::Value,
    pub output_data: serde_json::Value,
    pub reasoning: String,
    pub confidence_score: f64,
    pub processing_time: f64,
    pub tokens_used: i64,
    pub success: bool,
    pub error_message: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricRecord {
    pub id: i64,
    pub agent_id: String,
    pub metric_name: String,
    pub metric_value: f64,
    pub metric_unit: String,
    pub context: serde_json::Value,
    pub recorded_at: String,
}

#[derive(Debug, Clone)]
pub struct NewScholarship {
    pub name: String,
    pub provider: String,
    pub country: String,
    pub field_of_study: String,
    pub academic_level: String,
    pub target_eligible: bool,
    pub funding_type: String,
    pub funding_amount: String,
    pub application_deadline: Option<String>,
    pub application_url: String,
    pub ai_relevance_score: f64,
    pub web_dev_relevance_score: f64,
    pub it_relevance_score: f64,
    pub overall_relevance_score: f64,
    pub source_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScholarshipRecord {
    pub id: String,
    pub name: String,
    pub provider: String,
    pub country: String,
    pub field_of_study: String,
    pub academic_level: String,
    pub target_eligible: bool,
    pub funding_type: String,
    pub funding_amount: String,
    pub application_deadline: Option<String>,
    pub application_url: String,
    pub ai_relevance_score: f64,
    pub web_dev_relevance_score: f64,
    pub it_relevance_score: f64,
    pub overall_relevance_score: f64,
    pub source_url: String,
    pub discovered_at: String,
}

#[derive(Debug, Default, Clone, serde::Deserialize)]
pub struct ScholarshipFilter {
    pub eligible: Option<bool>,
    pub funding: Option<String>,
    pub min_score: Option<f64>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HuntSessionRecord {
    pub id: String,
    pub name: String,
    pub status: String,
    pub target_count: i64,
    pub scholarships_found: i64,
    pub sources_visited: i64,
    pub strategy: String,
    pub started_at: String,
    pub ended_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AgentStatistics {
    pub total_agents: i64,
    pub active_agents: i64,
    pub total_decisions: i64,
    pub successful_decisions: i64,
    pub average_success_rate: f64,
    pub agent_types: std::collections::HashMap<String, i64>,
}

#[derive(Debug, Serialize)]
pub struct ScholarshipStatistics {
    pub total: i64,
    pub target_eligible: i64,
    pub fully_funded: i64,
    pub average_relevance: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn importance_labels_are_lowercase() {
        for (imp, label) in [
            (Importance::Low, "low"),
            (Importance::Medium, "medium"),
            (Importance::High, "high"),
            (Importance::Critical, "critical"),
        ] {
            assert_eq!(imp.as_str(), label);
        }
    }
}
