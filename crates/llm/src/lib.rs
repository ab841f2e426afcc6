//! Answer-model integration for DocQA.
//!
//! This crate provides a provider-agnostic abstraction over the language
//! models that turn retrieved context into an answer, plus the
//! [`AnswerService`] that owns the answering prompt.
//!
//! # Providers
//! - **Ollama**: Local LLM runtime (default)
//! - **OpenAI-compatible**: OpenAI, the Hugging Face router, and any host
//!   speaking the `/chat/completions` protocol
//!
//! # Example
//! ```no_run
//! use docqa_llm::{AnswerService, Answerer, providers::OllamaClient};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = AnswerService::new(Arc::new(OllamaClient::new()), "llama3.2")?;
//! let answer = service.generate_answer("Who wrote it?", "Written by Ada.").await?;
//! println!("{}", answer);
//! # Ok(())
//! # }
//! ```

pub mod answer;
pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use answer::{AnswerService, Answerer};
pub use client::{LlmClient, LlmRequest, LlmResponse, Sampling, TokenUsage};
pub use factory::create_client;
pub use providers::{OllamaClient, OpenAiCompatibleClient};
pub use types::ProviderType;
