pub mod novita;

use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompletionParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Result of one completion call. Transport errors, timeouts and non-2xx
/// statuses all land in `Failure` with the elapsed time attached; the client
/// never raises. Retrying is the caller's business and nobody here does it.
#[derive(Debug, Clone)]
pub enum CompletionOutcome {
    Success {
        content: String,
        tokens_used: u32,
        processing_time: f64,
    },
    Failure {
        error: String,
        processing_time: f64,
    },
}

#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn chat_completion(
        &self,
        messages: &[ChatMessage],
        params: &CompletionParams,
    ) -> CompletionOutcome;
}
