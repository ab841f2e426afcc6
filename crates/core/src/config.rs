//! Configuration management for DocQA.
//!
//! Configuration is assembled from several sources, later ones winning:
//! - Built-in defaults
//! - A YAML config file (`DOCQA_CONFIG`, or `docqa.yaml` in the workspace)
//! - Environment variables
//! - Command-line flags (`with_overrides`)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Default config file name looked up in the workspace directory.
pub const CONFIG_FILE_NAME: &str = "docqa.yaml";

/// Embedding providers the knowledge crate knows how to build.
pub const KNOWN_EMBEDDING_PROVIDERS: [&str; 2] = ["mock", "ollama"];

/// Answer-model providers the llm crate knows how to build.
pub const KNOWN_LLM_PROVIDERS: [&str; 4] = ["ollama", "openai", "huggingface", "openai-compatible"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Workspace root; relative paths in the config resolve against it
    #[serde(skip)]
    pub workspace: PathBuf,

    /// Config file that was merged, if any
    #[serde(skip)]
    pub config_file: Option<PathBuf>,

    /// Verbose mode (enables debug logging)
    #[serde(skip)]
    pub verbose: bool,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub chunking: ChunkingConfig,

    #[serde(default)]
    pub embedding: EmbeddingSettings,

    #[serde(default)]
    pub llm: LlmSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Upper bound on request bodies (PDF uploads)
    #[serde(rename = "maxBodyBytes", default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

/// On-disk location of the vector index and its metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(rename = "dataDir", default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(rename = "indexFile", default = "default_index_file")]
    pub index_file: String,

    #[serde(rename = "metadataFile", default = "default_metadata_file")]
    pub metadata_file: String,
}

/// How documents are split before embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// "words" (fixed word windows) or "overlapping" (character windows)
    #[serde(default = "default_chunk_strategy")]
    pub strategy: String,

    #[serde(rename = "maxWords", default = "default_max_words")]
    pub max_words: usize,

    #[serde(rename = "maxChars", default = "default_max_chars")]
    pub max_chars: usize,

    #[serde(default = "default_overlap")]
    pub overlap: usize,

    /// Documents producing more chunks than this are rejected
    #[serde(rename = "maxChunks", default = "default_max_chunks")]
    pub max_chunks: usize,
}

/// Embedding provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    #[serde(default = "default_embedding_provider")]
    pub provider: String,

    #[serde(default = "default_embedding_model")]
    pub model: String,

    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
}

/// Answer model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    #[serde(default = "default_llm_provider")]
    pub provider: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    #[serde(default)]
    pub endpoint: Option<String>,

    /// Environment variable holding the API key
    #[serde(rename = "apiKeyEnv", default)]
    pub api_key_env: Option<String>,

    /// Resolved API key (never read from or written to the config file)
    #[serde(skip)]
    pub api_key: Option<String>,

    #[serde(rename = "maxTokens", default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

/// Logging settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: Option<String>,

    /// Disable colored output
    #[serde(rename = "noColor", default)]
    pub no_color: bool,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_max_body_bytes() -> usize {
    20 * 1024 * 1024
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("vectorstore")
}

fn default_index_file() -> String {
    "index.bin".to_string()
}

fn default_metadata_file() -> String {
    "metadata.json".to_string()
}

fn default_chunk_strategy() -> String {
    "words".to_string()
}

fn default_max_words() -> usize {
    100
}

fn default_max_chars() -> usize {
    500
}

fn default_overlap() -> usize {
    100
}

fn default_max_chunks() -> usize {
    100
}

fn default_embedding_provider() -> String {
    "mock".to_string()
}

fn default_embedding_model() -> String {
    "trigram-v1".to_string()
}

fn default_dimensions() -> usize {
    384
}

fn default_llm_provider() -> String {
    "ollama".to_string()
}

fn default_llm_model() -> String {
    "llama3.2".to_string()
}

fn default_max_tokens() -> u32 {
    300
}

fn default_temperature() -> f32 {
    0.7
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            index_file: default_index_file(),
            metadata_file: default_metadata_file(),
        }
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            strategy: default_chunk_strategy(),
            max_words: default_max_words(),
            max_chars: default_max_chars(),
            overlap: default_overlap(),
            max_chunks: default_max_chunks(),
        }
    }
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            model: default_embedding_model(),
            endpoint: None,
            dimensions: default_dimensions(),
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            model: default_llm_model(),
            endpoint: None,
            api_key_env: None,
            api_key: None,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            verbose: false,
            server: ServerConfig::default(),
            store: StoreSettings::default(),
            chunking: ChunkingConfig::default(),
            embedding: EmbeddingSettings::default(),
            llm: LlmSettings::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the YAML file and environment variables.
    ///
    /// Environment variables:
    /// - `DOCQA_WORKSPACE`: Override workspace path
    /// - `DOCQA_CONFIG`: Path to config file
    /// - `DOCQA_DATA_DIR`: Directory holding the index and metadata files
    /// - `DOCQA_HOST` / `DOCQA_PORT`: HTTP bind address
    /// - `DOCQA_EMBEDDING_PROVIDER` / `DOCQA_EMBEDDING_MODEL`
    /// - `DOCQA_LLM_PROVIDER` / `DOCQA_LLM_MODEL` / `DOCQA_LLM_ENDPOINT`
    /// - `DOCQA_API_KEY`: API key for the answer model
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use docqa_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Data dir: {:?}", config.data_dir());
    /// ```
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(workspace) = std::env::var("DOCQA_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
        }

        if let Ok(config_file) = std::env::var("DOCQA_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => cf.clone(),
            None => config.workspace.join(CONFIG_FILE_NAME),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file not found: {:?}",
                config_path
            )));
        }

        config.apply_env();
        config.llm.api_key = config.resolve_api_key();

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let mut parsed: AppConfig = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        parsed.workspace = self.workspace.clone();
        parsed.config_file = Some(path.to_path_buf());
        parsed.verbose = self.verbose;

        tracing::debug!("Merged config file {:?}", path);
        Ok(parsed)
    }

    /// Apply environment variable overrides.
    fn apply_env(&mut self) {
        if let Ok(dir) = std::env::var("DOCQA_DATA_DIR") {
            self.store.data_dir = PathBuf::from(dir);
        }

        if let Ok(host) = std::env::var("DOCQA_HOST") {
            self.server.host = host;
        }

        if let Some(port) = std::env::var("DOCQA_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
        {
            self.server.port = port;
        }

        if let Ok(provider) = std::env::var("DOCQA_EMBEDDING_PROVIDER") {
            self.embedding.provider = provider;
        }

        if let Ok(model) = std::env::var("DOCQA_EMBEDDING_MODEL") {
            self.embedding.model = model;
        }

        if let Ok(provider) = std::env::var("DOCQA_LLM_PROVIDER") {
            self.llm.provider = provider;
        }

        if let Ok(model) = std::env::var("DOCQA_LLM_MODEL") {
            self.llm.model = model;
        }

        if let Ok(endpoint) = std::env::var("DOCQA_LLM_ENDPOINT") {
            self.llm.endpoint = Some(endpoint);
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            self.logging.no_color = true;
        }
    }

    /// Resolve the answer-model API key.
    ///
    /// `DOCQA_API_KEY` wins over the variable named by `llm.apiKeyEnv`.
    fn resolve_api_key(&self) -> Option<String> {
        if let Ok(key) = std::env::var("DOCQA_API_KEY") {
            return Some(key);
        }

        self.llm
            .api_key_env
            .as_ref()
            .and_then(|var| std::env::var(var).ok())
            .or_else(|| self.llm.api_key.clone())
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over everything else.
    pub fn with_overrides(
        mut self,
        data_dir: Option<PathBuf>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(data_dir) = data_dir {
            self.store.data_dir = data_dir;
        }

        if let Some(log_level) = log_level {
            self.logging.level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.logging.level.is_none() {
                self.logging.level = Some("debug".to_string());
            }
        }

        if no_color {
            self.logging.no_color = true;
        }

        self
    }

    /// Directory holding the persisted index and metadata.
    pub fn data_dir(&self) -> PathBuf {
        if self.store.data_dir.is_absolute() {
            self.store.data_dir.clone()
        } else {
            self.workspace.join(&self.store.data_dir)
        }
    }

    /// Path of the persisted vector index.
    pub fn index_path(&self) -> PathBuf {
        self.data_dir().join(&self.store.index_file)
    }

    /// Path of the persisted chunk metadata.
    pub fn metadata_path(&self) -> PathBuf {
        self.data_dir().join(&self.store.metadata_file)
    }

    /// `host:port` the HTTP server binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> AppResult<()> {
        let embedding = self.embedding.provider.as_str();
        if !KNOWN_EMBEDDING_PROVIDERS.contains(&embedding) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                embedding,
                KNOWN_EMBEDDING_PROVIDERS.join(", ")
            )));
        }

        let llm = self.llm.provider.to_lowercase();
        if !KNOWN_LLM_PROVIDERS.contains(&llm.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown LLM provider: {}. Supported: {}",
                self.llm.provider,
                KNOWN_LLM_PROVIDERS.join(", ")
            )));
        }

        if self.embedding.dimensions == 0 {
            return Err(AppError::Config(
                "Embedding dimensions must be greater than zero".to_string(),
            ));
        }

        if self.chunking.max_chunks == 0 {
            return Err(AppError::Config(
                "chunking.maxChunks must be greater than zero".to_string(),
            ));
        }

        match self.chunking.strategy.as_str() {
            "words" if self.chunking.max_words == 0 => Err(AppError::Config(
                "chunking.maxWords must be greater than zero".to_string(),
            )),
            "overlapping" if self.chunking.overlap >= self.chunking.max_chars => {
                Err(AppError::Config(format!(
                    "chunking.overlap ({}) must be smaller than chunking.maxChars ({})",
                    self.chunking.overlap, self.chunking.max_chars
                )))
            }
            "words" | "overlapping" => Ok(()),
            other => Err(AppError::Config(format!(
                "Unknown chunking strategy: {}. Supported: words, overlapping",
                other
            ))),
        }
    }
}
