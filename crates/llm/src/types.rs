//! Provider identification.

/// Provider type enum for matching configuration strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    Ollama,
    OpenAI,
    HuggingFace,
    OpenAiCompatible,
}

impl ProviderType {
    /// Parse provider type from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Some(Self::Ollama),
            "openai" => Some(Self::OpenAI),
            "huggingface" | "hf" => Some(Self::HuggingFace),
            "openai-compatible" | "custom" => Some(Self::OpenAiCompatible),
            _ => None,
        }
    }

    /// Get the canonical provider name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
            Self::OpenAI => "openai",
            Self::HuggingFace => "huggingface",
            Self::OpenAiCompatible => "openai-compatible",
        }
    }

    /// Default base URL when the configuration does not name one.
    pub fn default_endpoint(&self) -> Option<&'static str> {
        match self {
            Self::Ollama => Some("http://localhost:11434"),
            Self::OpenAI => Some("https://api.openai.com/v1"),
            Self::HuggingFace => Some("https://router.huggingface.co/v1"),
            Self::OpenAiCompatible => None,
        }
    }

    /// Whether requests must carry a bearer token.
    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::OpenAI | Self::HuggingFace)
    }
}
