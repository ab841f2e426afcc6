//! Embedding providers.
//!
//! Turns chunk and query text into fixed-dimension vectors. The `mock`
//! provider is deterministic and offline; `ollama` calls a local model.

pub mod config;
pub mod provider;
pub mod providers;

pub use config::EmbeddingConfig;
pub use provider::{create_provider, EmbeddingProvider};
