use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_MODEL: &str = "deepseek/deepseek-v3-0324";

/// Runtime configuration for the hunter daemon.
///
/// Defaults live here, `config.toml` in the data directory overrides them,
/// and a handful of environment variables override the file. The analyzer
/// truncation budget and the fallback confidence are tunables, not
/// constants.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HunterConfig {
    /// Base URL of the OpenAI-compatible completion provider.
    pub base_url: String,
    pub chat_endpoint: String,
    pub api_key: String,
    pub model: String,
    pub model_provider: String,
    pub request_timeout_secs: u64,

    pub decision_temperature: f32,
    pub decision_max_tokens: u32,
    pub analysis_temperature: f32,
    pub analysis_max_tokens: u32,

    /// Hard cap on raw page content embedded in an analysis prompt, in chars.
    pub content_char_budget: usize,
    /// Confidence assigned when a decision response is not parseable JSON.
    pub fallback_confidence: f64,
    /// Confidence recorded for thoughts that don't supply one explicitly.
    pub default_thought_confidence: f64,

    pub target_country: String,
    pub focus_fields: Vec<String>,

    /// Delay between hunt source visits. Zero disables pacing (tests).
    pub hunt_pace_ms: u64,
    /// Sources swept by live hunts; the built-in list applies when empty.
    pub hunt_sources: Vec<crate::core::hunt::HuntSource>,

    pub api_host: String,
    pub api_port: u16,
}

impl Default for HunterConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.novita.ai".to_string(),
            chat_endpoint: "/v3/openai/chat/completions".to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            model_provider: "novita".to_string(),
            request_timeout_secs: 60,
            decision_temperature: 0.3,
            decision_max_tokens: 2000,
            analysis_temperature: 0.2,
            analysis_max_tokens: 4000,
            content_char_budget: 8000,
            fallback_confidence: 0.5,
            default_thought_confidence: 0.8,
            target_country: "Tunisia".to_string(),
            focus_fields: vec![
                "AI".to_string(),
                "Web Development".to_string(),
                "IT".to_string(),
                "Computer Science".to_string(),
            ],
            hunt_pace_ms: 2500,
            hunt_sources: Vec::new(),
            api_host: "127.0.0.1".to_string(),
            api_port: 8090,
        }
    }
}

impl HunterConfig {
    /// Load configuration: defaults, then `config.toml` if present, then env.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let config_path = data_dir.join("config.toml");
        let mut config = if config_path.exists() {
            let raw = std::fs::read_to_string(&config_path)
                .with_context(|| format!("reading {}", config_path.display()))?;
            Self::from_toml_str(&raw)
                .with_context(|| format!("parsing {}", config_path.display()))?
        } else {
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("SCHOLARHUNT_API_KEY")
            && !key.is_empty()
        {
            self.api_key = key;
        }
        if let Ok(url) = std::env::var("SCHOLARHUNT_BASE_URL")
            && !url.is_empty()
        {
            self.base_url = url;
        }
    }

    /// Full URL of the chat completion endpoint.
    pub fn completion_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.chat_endpoint)
    }

    /// Data directory: `SCHOLARHUNT_DATA_DIR`, or the platform data dir.
    pub fn resolve_data_dir() -> PathBuf {
        if let Ok(dir) = std::env::var("SCHOLARHUNT_DATA_DIR")
            && !dir.is_empty()
        {
            return PathBuf::from(dir);
        }
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("scholarhunt")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = HunterConfig::default();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert!(config.fallback_confidence > 0.0 && config.fallback_confidence < 1.0);
        assert!(config.content_char_budget > 0);
        assert_eq!(config.target_country, "Tunisia");
    }

    #[test]
    fn toml_overrides_only_named_fields() {
        let config = HunterConfig::from_toml_str(
            r#"
            api_port = 9999
            target_country = "Morocco"
            content_char_budget = 4000
            "#,
        )
        .unwrap();
        assert_eq!(config.api_port, 9999);
        assert_eq!(config.target_country, "Morocco");
        assert_eq!(config.content_char_budget, 4000);
        // untouched fields keep their defaults
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.fallback_confidence, 0.5);
    }

    #[test]
    fn hunt_sources_parse_from_toml() {
        let config = HunterConfig::from_toml_str(
            r#"
            [[hunt_sources]]
            name = "Cambridge"
            url = "https://www.cambridge.example/funding"
            content = "Gates Cambridge Scholarships..."
            "#,
        )
        .unwrap();
        assert_eq!(config.hunt_sources.len(), 1);
        assert_eq!(config.hunt_sources[0].name, "Cambridge");
    }

    #[test]
    fn completion_url_joins_without_double_slash() {
        let mut config = HunterConfig::default();
        config.base_url = "https://api.example.com/".to_string();
        config.chat_endpoint = "/v1/chat/completions".to_string();
        assert_eq!(
            config.completion_url(),
            "https://api.example.com/v1/chat/completions"
        );
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(HunterConfig::from_toml_str("api_port = \"not a port\"").is_err());
    }
}
