use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::error;

use super::{ChatMessage, CompletionBackend, CompletionOutcome, CompletionParams};
use crate::core::config::HunterConfig;

// ── OpenAI-compatible request/response ──

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    content: String,
}

#[derive(Deserialize, Default)]
struct Usage {
    #[serde(default)]
    total_tokens: u32,
}

/// Chat-completion client for Novita's OpenAI-compatible endpoint.
/// One instance per process, injected into whoever needs it.
pub struct NovitaClient {
    client: Client,
    url: String,
    api_key: String,
}

impl NovitaClient {
    pub fn new(config: &HunterConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            url: config.completion_url(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl CompletionBackend for NovitaClient {
    async fn chat_completion(
        &self,
        messages: &[ChatMessage],
        params: &CompletionParams,
    ) -> CompletionOutcome {
        let wire: Vec<WireMessage> = messages
            .iter()
            .map(|m| WireMessage {
                role: &m.role,
                content: &m.content,
            })
            .collect();

        let req = ChatRequest {
            model: &params.model,
            messages: wire,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        };

        let start = Instant::now();
        let res = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&req)
            .send()
            .await;

        match res {
            Ok(res) if res.status().is_success() => {
                let elapsed = start.elapsed().as_secs_f64();
                match res.json::<ChatResponse>().await {
                    Ok(parsed) => {
                        let content = parsed
                            .choices
                            .into_iter()
                            .next()
                            .map(|c| c.message.content)
                            .unwrap_or_default();
                        let tokens_used = parsed.usage.unwrap_or_default().total_tokens;
                        CompletionOutcome::Success {
                            content,
                            tokens_used,
                            processing_time: elapsed,
                        }
                    }
                    Err(e) => {
                        error!("Completion response did not parse: {}", e);
                        CompletionOutcome::Failure {
                            error: format!("malformed completion response: {}", e),
                            processing_time: elapsed,
                        }
                    }
                }
            }
            Ok(res) => {
                let elapsed = start.elapsed().as_secs_f64();
                let status = res.status();
                let body = res.text().await.unwrap_or_default();
                error!("Completion API error: {} - {}", status, body);
                CompletionOutcome::Failure {
                    error: format!("API error: {}", status.as_u16()),
                    processing_time: elapsed,
                }
            }
            Err(e) => {
                let elapsed = start.elapsed().as_secs_f64();
                error!("Completion transport error: {}", e);
                CompletionOutcome::Failure {
                    error: e.to_string(),
                    processing_time: elapsed,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_parses_content_and_usage() {
        let raw = r#"{
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "hello"}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content, "hello");
        assert_eq!(parsed.usage.unwrap().total_tokens, 15);
    }

    #[test]
    fn response_without_usage_still_parses() {
        let raw = r#"{"choices": [{"message": {"content": "ok"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert!(parsed.usage.is_none());
    }

    #[test]
    fn request_serializes_openai_shape() {
        let req = ChatRequest {
            model: "deepseek/deepseek-v3-0324",
            messages: vec![WireMessage {
                role: "user",
                content: "hi",
            }],
            temperature: 0.3,
            max_tokens: 2000,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["model"], "deepseek/deepseek-v3-0324");
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["max_tokens"], 2000);
    }
}
