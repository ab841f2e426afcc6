//! Embedding provider implementations.

pub mod mock;
pub mod ollama;

pub use mock::MockProvider;
pub use ollama::OllamaProvider;
