//! Completion client abstraction.
//!
//! Answer generation only needs one non-streaming call: a prompt in, text
//! out. Providers translate [`LlmRequest`] into their own wire format.

use docqa_core::AppResult;
use serde::{Deserialize, Serialize};

/// Sampling knobs forwarded to the provider. `None` keeps the provider default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Sampling {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// A single completion call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmRequest {
    pub model: String,

    /// Instruction sent ahead of the prompt, for providers with chat roles
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    pub prompt: String,

    #[serde(default)]
    pub sampling: Sampling,
}

impl LlmRequest {
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system: None,
            prompt: prompt.into(),
            sampling: Sampling::default(),
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.sampling.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.sampling.temperature = Some(temperature);
        self
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

/// Generated text plus what the provider reported about it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub content: String,

    /// Model name as echoed by the provider
    pub model: String,

    #[serde(default)]
    pub usage: TokenUsage,
}

/// Token counts reported by the provider; zero when it reports none.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt: u32,
    pub completion: u32,
}

impl TokenUsage {
    pub fn new(prompt: u32, completion: u32) -> Self {
        Self { prompt, completion }
    }

    pub fn total(&self) -> u32 {
        self.prompt.saturating_add(self.completion)
    }
}

/// A language-model backend able to complete a prompt.
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    /// Short provider label used in logs ("ollama", "openai", ...).
    fn provider_name(&self) -> &str;

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse>;
}
