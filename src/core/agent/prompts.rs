use regex::Regex;
use serde_json::{Value, json};

use crate::core::config::HunterConfig;
use crate::core::llm::ChatMessage;

/// Mission statement for the hunter agent, parameterized by the configured
/// target country and focus fields.
pub fn system_prompt(config: &HunterConfig) -> String {
    format!(
        "You are an advanced AI agent specialized in finding fully-funded scholarships \
         for students from {country}.\n\
         Your mission is to discover new scholarship opportunities and analyze their relevance.\n\n\
         Key objectives:\n\
         1. Find fully-funded scholarships\n\
         2. Verify {country} eligibility for each scholarship\n\
         3. Focus on {fields} fields\n\
         4. Make strategic decisions about search priorities\n\
         5. Analyze content for scholarship relevance\n\n\
         Always think step by step and explain your reasoning.",
        country = config.target_country,
        fields = config.focus_fields.join(", "),
    )
}

pub fn decision_messages(
    config: &HunterConfig,
    decision_type: &str,
    context: &str,
    input_data: &Value,
) -> Vec<ChatMessage> {
    let input_pretty =
        serde_json::to_string_pretty(input_data).unwrap_or_else(|_| input_data.to_string());
    vec![
        ChatMessage::system(system_prompt(config)),
        ChatMessage::user(format!(
            "Make a decision about: {decision_type}\n\n\
             Context: {context}\n\n\
             Input data: {input_pretty}\n\n\
             Please provide:\n\
             1. Your decision\n\
             2. Detailed reasoning\n\
             3. Confidence score (0-1)\n\
             4. Any additional data or recommendations\n\n\
             Respond in JSON format with keys: decision, reasoning, confidence, additional_data"
        )),
    ]
}

pub fn analysis_messages(
    config: &HunterConfig,
    content: &str,
    url: &str,
    analysis_type: &str,
) -> Vec<ChatMessage> {
    let bounded = truncate_chars(content, config.content_char_budget);
    vec![
        ChatMessage::system(system_prompt(config)),
        ChatMessage::user(format!(
            "Analyze this web content for scholarship opportunities:\n\n\
             URL: {url}\n\
             Analysis Type: {analysis_type}\n\n\
             Content:\n{bounded}\n\n\
             Please extract and analyze:\n\
             1. Any scholarship opportunities mentioned\n\
             2. Eligibility for {country} students\n\
             3. Relevance to {fields} fields\n\
             4. Application deadlines and requirements\n\
             5. Funding information (full/partial)\n\
             6. Contact details and application URLs\n\n\
             For each scholarship found, provide structured data including:\n\
             - name, provider, country, field_of_study, academic_level\n\
             - target_eligible (boolean), funding_type, application_deadline\n\
             - application_url, requirements, relevance_scores (ai, web_dev, it)\n\n\
             Respond in JSON format with a 'scholarships' array and 'analysis_summary'.",
            country = config.target_country,
            fields = config.focus_fields.join("/"),
        )),
    ]
}

/// Char-boundary-safe truncation to at most `max_chars` characters.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Outcome of parsing a decision response: either the structured record the
/// prompt asked for, or the raw text carried along as prose reasoning.
#[derive(Debug, Clone, PartialEq)]
pub enum DecisionOutput {
    Parsed {
        decision: String,
        reasoning: String,
        confidence: f64,
        additional: Value,
    },
    Fallback {
        raw_text: String,
        confidence: f64,
    },
}

impl DecisionOutput {
    /// Strict parse with an explicit fallback branch. Well-formed JSON is
    /// trusted verbatim; anything else becomes prose reasoning at the given
    /// neutral confidence. Never panics.
    pub fn from_model_text(text: &str, fallback_confidence: f64) -> Self {
        let candidate = strip_code_fences(text);
        match serde_json::from_str::<Value>(candidate) {
            Ok(Value::Object(map)) => {
                let decision = match map.get("decision") {
                    Some(Value::String(s)) => s.clone(),
                    Some(other) => other.to_string(),
                    None => String::new(),
                };
                let reasoning = map
                    .get("reasoning")
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_string();
                let confidence = map
                    .get("confidence")
                    .and_then(Value::as_f64)
                    .unwrap_or(fallback_confidence)
                    .clamp(0.0, 1.0);
                let additional = map.get("additional_data").cloned().unwrap_or(json!({}));
                DecisionOutput::Parsed {
                    decision,
                    reasoning,
                    confidence,
                    additional,
                }
            }
            _ => DecisionOutput::Fallback {
                raw_text: text.trim().to_string(),
                confidence: fallback_confidence.clamp(0.0, 1.0),
            },
        }
    }

    pub fn confidence(&self) -> f64 {
        match self {
            DecisionOutput::Parsed { confidence, .. } => *confidence,
            DecisionOutput::Fallback { confidence, .. } => *confidence,
        }
    }

    pub fn reasoning(&self) -> &str {
        match self {
            DecisionOutput::Parsed { reasoning, .. } => reasoning,
            DecisionOutput::Fallback { raw_text, .. } => raw_text,
        }
    }

    /// Short label for logs and the summary thought.
    pub fn headline(&self) -> &str {
        match self {
            DecisionOutput::Parsed { decision, .. } if !decision.is_empty() => decision,
            DecisionOutput::Parsed { reasoning, .. } => reasoning,
            DecisionOutput::Fallback { raw_text, .. } => raw_text,
        }
    }

    /// The payload persisted into the decision row.
    pub fn output_payload(&self) -> Value {
        match self {
            DecisionOutput::Parsed {
                decision,
                reasoning,
                confidence,
                additional,
            } => json!({
                "decision": decision,
                "reasoning": reasoning,
                "confidence": confidence,
                "additional_data": additional,
            }),
            DecisionOutput::Fallback {
                raw_text,
                confidence,
            } => json!({
                "decision": "",
                "reasoning": raw_text,
                "confidence": confidence,
                "additional_data": {},
            }),
        }
    }
}

/// Parse an analysis response into candidates plus an optional summary.
/// Returns None when the text is not the expected structured form.
pub fn parse_analysis(text: &str) -> Option<(Vec<super::ScholarshipCandidate>, Option<String>)> {
    let candidate = strip_code_fences(text);
    let value: Value = serde_json::from_str(candidate).ok()?;
    let obj = value.as_object()?;

    let scholarships = obj
        .get("scholarships")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| {
                    serde_json::from_value::<super::ScholarshipCandidate>(entry.clone()).ok()
                })
                .collect::<Vec<_>>()
        })?;

    let summary = obj
        .get("analysis_summary")
        .and_then(Value::as_str)
        .map(str::to_string);

    Some((scholarships, summary))
}

/// Models frequently wrap JSON answers in markdown fences; unwrap them.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let re = Regex::new(r"^```(?:json)?\s*([\s\S]*?)\s*```$").ok();
    if let Some(re) = re
        && let Some(captures) = re.captures(trimmed)
        && let Some(inner) = captures.get(1)
    {
        return inner.as_str();
    }
    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo wörld", 5), "héllo");
        assert_eq!(truncate_chars("short", 100), "short");
        assert_eq!(truncate_chars("", 10), "");
    }

    #[test]
    fn well_formed_json_is_trusted_verbatim() {
        let output = DecisionOutput::from_model_text(
            r#"{"decision": "expand to DAAD", "reasoning": "German programs fund CS heavily",
                "confidence": 0.85, "additional_data": {"region": "EU"}}"#,
            0.5,
        );
        match output {
            DecisionOutput::Parsed {
                decision,
                reasoning,
                confidence,
                additional,
            } => {
                assert_eq!(decision, "expand to DAAD");
                assert_eq!(reasoning, "German programs fund CS heavily");
                assert_eq!(confidence, 0.85);
                assert_eq!(additional["region"], "EU");
            }
            other => panic!("expected Parsed, got {:?}", other),
        }
    }

    #[test]
    fn prose_becomes_fallback_reasoning() {
        let output = DecisionOutput::from_model_text("Focus on Europe first", 0.5);
        assert_eq!(output.reasoning(), "Focus on Europe first");
        assert_eq!(output.confidence(), 0.5);
        let payload = output.output_payload();
        assert_eq!(payload["reasoning"], "Focus on Europe first");
        assert_eq!(payload["confidence"], 0.5);
        assert_eq!(payload["decision"], "");
    }

    #[test]
    fn fenced_json_is_unwrapped() {
        let output = DecisionOutput::from_model_text(
            "```json\n{\"decision\": \"go\", \"confidence\": 0.7}\n```",
            0.5,
        );
        match output {
            DecisionOutput::Parsed {
                decision,
                confidence,
                ..
            } => {
                assert_eq!(decision, "go");
                assert_eq!(confidence, 0.7);
            }
            other => panic!("expected Parsed, got {:?}", other),
        }
    }

    #[test]
    fn out_of_range_confidence_is_clamped() {
        let output =
            DecisionOutput::from_model_text(r#"{"decision": "x", "confidence": 7.0}"#, 0.5);
        assert_eq!(output.confidence(), 1.0);
    }

    #[test]
    fn json_array_is_not_a_decision_object() {
        let output = DecisionOutput::from_model_text("[1, 2, 3]", 0.5);
        assert!(matches!(output, DecisionOutput::Fallback { .. }));
    }

    #[test]
    fn analysis_parses_candidates_and_summary() {
        let text = r#"{
            "scholarships": [
                {"name": "DAAD EPOS", "provider": "DAAD", "country": "Germany",
                 "field_of_study": "IT", "academic_level": "master",
                 "target_eligible": true, "funding_type": "full",
                 "application_url": "https://daad.de/apply",
                 "relevance_scores": {"ai": 0.8, "web_dev": 0.7, "it": 0.9}}
            ],
            "analysis_summary": "One strong match."
        }"#;
        let (scholarships, summary) = parse_analysis(text).unwrap();
        assert_eq!(scholarships.len(), 1);
        assert_eq!(scholarships[0].name, "DAAD EPOS");
        assert!(scholarships[0].target_eligible);
        assert_eq!(scholarships[0].relevance_scores.it, 0.9);
        assert_eq!(summary.as_deref(), Some("One strong match."));
    }

    #[test]
    fn analysis_accepts_legacy_eligibility_key() {
        let text = r#"{"scholarships": [{"name": "X", "tunisia_eligible": true}]}"#;
        let (scholarships, _) = parse_analysis(text).unwrap();
        assert!(scholarships[0].target_eligible);
    }

    #[test]
    fn malformed_analysis_is_none() {
        assert!(parse_analysis("not json at all").is_none());
        assert!(parse_analysis(r#"{"no_scholarships_key": 1}"#).is_none());
        assert!(parse_analysis("[]").is_none());
    }

    #[test]
    fn analysis_prompt_embeds_truncated_content() {
        let mut config = HunterConfig::default();
        config.content_char_budget = 10;
        let content = format!("{}{}", "x".repeat(10), "OVERFLOW_MARKER");
        let messages = analysis_messages(&config, &content, "https://example.org", "scholarship_detection");
        assert_eq!(messages.len(), 2);
        assert!(messages[1].content.contains("xxxxxxxxxx"));
        assert!(!messages[1].content.contains("OVERFLOW_MARKER"));
    }

    #[test]
    fn decision_prompt_names_type_and_context() {
        let config = HunterConfig::default();
        let messages = decision_messages(
            &config,
            "strategy_planning",
            "initial search",
            &json!({"phase": 1}),
        );
        assert!(messages[0].content.contains("Tunisia"));
        assert!(messages[1].content.contains("strategy_planning"));
        assert!(messages[1].content.contains("initial search"));
        assert!(messages[1].content.contains("\"phase\": 1"));
    }
}
