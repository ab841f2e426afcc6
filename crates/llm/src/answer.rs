//! Answer generation from retrieved context.

use crate::client::{LlmClient, LlmRequest};
use docqa_core::{AppError, AppResult};
use handlebars::Handlebars;
use serde::Serialize;
use std::sync::Arc;

const TEMPLATE_NAME: &str = "answer";

/// Prompt sent to the model for every question.
pub const ANSWER_TEMPLATE: &str = "You are a helpful assistant. Use the context below to answer the user's question.\n\nContext:\n{{context}}\n\nQuestion: {{question}}\nAnswer:";

/// Default generation budget.
pub const DEFAULT_MAX_TOKENS: u32 = 300;

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Produces an answer to a question given retrieved context.
#[async_trait::async_trait]
pub trait Answerer: Send + Sync {
    async fn generate_answer(&self, question: &str, context: &str) -> AppResult<String>;
}

#[derive(Serialize)]
struct PromptVars<'a> {
    question: &'a str,
    context: &'a str,
}

/// Renders the answering prompt and sends it through an [`LlmClient`].
pub struct AnswerService {
    client: Arc<dyn LlmClient>,
    model: String,
    max_tokens: u32,
    temperature: f32,
    templates: Handlebars<'static>,
}

impl AnswerService {
    /// Create a service with the default prompt and generation settings.
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>) -> AppResult<Self> {
        let mut templates = Handlebars::new();
        templates.register_escape_fn(handlebars::no_escape);
        templates
            .register_template_string(TEMPLATE_NAME, ANSWER_TEMPLATE)
            .map_err(|e| AppError::Config(format!("Failed to register answer template: {}", e)))?;

        Ok(Self {
            client,
            model: model.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            templates,
        })
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Render the prompt for a question and context.
    pub fn render_prompt(&self, question: &str, context: &str) -> AppResult<String> {
        self.templates
            .render(TEMPLATE_NAME, &PromptVars { question, context })
            .map_err(|e| AppError::Other(format!("Failed to render answer prompt: {}", e)))
    }
}

#[async_trait::async_trait]
impl Answerer for AnswerService {
    async fn generate_answer(&self, question: &str, context: &str) -> AppResult<String> {
        let prompt = self.render_prompt(question, context)?;
        let request = LlmRequest::new(prompt, self.model.clone())
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature);

        tracing::debug!(
            provider = self.client.provider_name(),
            model = %self.model,
            context_chars = context.len(),
            "Generating answer"
        );

        let response = self.client.complete(&request).await.map_err(|e| match e {
            AppError::Llm(msg) => AppError::Llm(msg),
            other => AppError::Llm(other.to_string()),
        })?;

        Ok(response.content.trim().to_string())
    }
}
