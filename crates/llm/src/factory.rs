//! LLM provider factory.
//!
//! Resolves a configured provider name to a concrete client, filling in
//! default endpoints and checking that required secrets are present.

use crate::client::LlmClient;
use crate::providers::{OllamaClient, OpenAiCompatibleClient};
use crate::types::ProviderType;
use docqa_core::{AppError, AppResult};
use std::sync::Arc;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("ollama", "openai", "huggingface", "openai-compatible")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - Optional API key (for providers that require it)
///
/// # Errors
/// Returns `AppError::Config` if:
/// - Provider is unknown
/// - Required API key is missing
/// - An OpenAI-compatible provider has no endpoint
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn LlmClient>> {
    let provider_type = ProviderType::parse(provider)
        .ok_or_else(|| AppError::Config(format!("Unknown LLM provider: {}", provider)))?;

    let api_key = api_key.filter(|k| !k.is_empty());
    if provider_type.requires_api_key() && api_key.is_none() {
        return Err(AppError::Config(format!(
            "{} provider requires API key",
            provider_type.as_str()
        )));
    }

    let base_url = endpoint
        .or(provider_type.default_endpoint())
        .ok_or_else(|| {
            AppError::Config(format!(
                "{} provider requires an endpoint",
                provider_type.as_str()
            ))
        })?;

    tracing::debug!(provider = provider_type.as_str(), base_url, "Creating LLM client");

    let client: Arc<dyn LlmClient> = match provider_type {
        ProviderType::Ollama => Arc::new(OllamaClient::with_base_url(base_url)),
        ProviderType::OpenAI | ProviderType::HuggingFace | ProviderType::OpenAiCompatible => {
            Arc::new(OpenAiCompatibleClient::new(
                provider_type.as_str(),
                base_url,
                api_key.map(str::to_string),
            ))
        }
    };

    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_ollama_client() {
        let client = create_client("ollama", None, None).unwrap();
        assert_eq!(client.provider_name(), "ollama");
    }

    #[test]
    fn test_create_ollama_with_custom_endpoint() {
        let client = create_client("ollama", Some("http://localhost:8080"), None);
        assert!(client.is_ok());
    }

    #[test]
    fn test_openai_requires_api_key() {
        match create_client("openai", None, None) {
            Err(AppError::Config(msg)) => assert!(msg.contains("requires API key")),
            _ => panic!("Expected config error for OpenAI without API key"),
        }
    }

    #[test]
    fn test_huggingface_with_key() {
        let client = create_client("hf", None, Some("hf_token")).unwrap();
        assert_eq!(client.provider_name(), "huggingface");
    }

    #[test]
    fn test_openai_compatible_requires_endpoint() {
        assert!(create_client("openai-compatible", None, None).is_err());
        assert!(create_client("openai-compatible", Some("http://localhost:8000/v1"), None).is_ok());
    }

    #[test]
    fn test_unknown_provider() {
        match create_client("unknown", None, None) {
            Err(AppError::Config(msg)) => assert!(msg.contains("Unknown LLM provider")),
            _ => panic!("Expected error for unknown provider"),
        }
    }
}
