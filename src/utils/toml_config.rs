//! TOML-based configuration for the synthesis engine
//!
//! The engine is configured from a single `synthesis.toml`:
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 3000
//! log_level = "info"
//! log_format = "pretty"   # or "json"
//!
//! [llm]
//! type = "ollama"
//! base_url = "http://localhost:11434"
//! model = "llama3.2"
//!
//! [research]
//! max_results = 10
//! default_depth = "standard"
//!
//! [confidence]
//! web = 0.3
//! market = 0.5
//!
//! [market_data]
//! base_url = "https://quotes.internal"
//! api_key_env = "MARKET_DATA_API_KEY"
//!
//! [proprietary]
//! base_url = "https://corpus.internal"
//! max_documents = 20
//! ```
//!
//! Secrets are never stored in the file: sections name the environment
//! variable holding them (`api_key_env`) and validation fails if it is unset.
//! `ConfigManager` holds the active configuration behind an `ArcSwap` so
//! readers never block and `reload()` swaps it atomically.

use crate::llm::{LLMClient, Provider};
use crate::retrieval::Collaborators;
use crate::retrieval::deep::ResearchCoordinator;
use crate::retrieval::market::HttpMarketData;
use crate::retrieval::proprietary::HttpProprietaryCorpus;
use crate::retrieval::web::DaedraSearch;
use crate::types::{AppError, ResearchDepth};
use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Root configuration structure loaded from synthesis.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// Completion service
    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub research: ResearchConfig,

    /// Per-strategy confidence floors and the sentiment gate
    #[serde(default)]
    pub confidence: ConfidenceConfig,

    /// Optional market-data feed; absent means no quantitative market data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_data: Option<MarketDataConfig>,

    /// Optional proprietary-document corpus
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proprietary: Option<ProprietaryConfig>,
}

// ============= Server Configuration =============

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

// ============= Completion Service =============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LlmConfig {
    Ollama {
        #[serde(default = "default_ollama_url")]
        base_url: String,
        model: String,
    },
    OpenAI {
        /// Environment variable containing API key
        api_key_env: String,
        #[serde(default = "default_openai_base")]
        api_base: String,
        model: String,
    },
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_openai_base() -> String {
    "https://api.openai.com/v1".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        LlmConfig::Ollama {
            base_url: default_ollama_url(),
            model: "llama3.2".to_string(),
        }
    }
}

impl LlmConfig {
    pub fn model(&self) -> &str {
        match self {
            LlmConfig::Ollama { model, .. } | LlmConfig::OpenAI { model, .. } => model,
        }
    }
}

// ============= Research Defaults =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    /// Used when a request does not set `maxResults`
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Used when a request does not set `depth`
    #[serde(default)]
    pub default_depth: ResearchDepth,

    /// Research questions generated by the deep-research coordinator at comprehensive depth
    #[serde(default = "default_question_count")]
    pub question_count: usize,

    /// Deep-research search rounds at comprehensive depth
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u8,

    /// Web results fetched per deep-research question
    #[serde(default = "default_results_per_question")]
    pub results_per_question: usize,
}

fn default_max_results() -> usize {
    10
}

fn default_question_count() -> usize {
    5
}

fn default_max_iterations() -> u8 {
    2
}

fn default_results_per_question() -> usize {
    5
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            default_depth: ResearchDepth::default(),
            question_count: default_question_count(),
            max_iterations: default_max_iterations(),
            results_per_question: default_results_per_question(),
        }
    }
}

// ============= Confidence =============

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceConfig {
    #[serde(default = "default_web_floor")]
    pub web: f64,

    #[serde(default = "default_deep_floor")]
    pub deep: f64,

    /// Higher than the web floor: market data is higher-trust evidence
    #[serde(default = "default_market_floor")]
    pub market: f64,

    #[serde(default = "default_proprietary_floor")]
    pub proprietary: f64,

    /// Mean sentiment magnitude needed before recommending an exposure change
    #[serde(default = "default_sentiment_threshold")]
    pub sentiment_threshold: f64,
}

fn default_web_floor() -> f64 {
    0.3
}

fn default_deep_floor() -> f64 {
    0.3
}

fn default_market_floor() -> f64 {
    0.5
}

fn default_proprietary_floor() -> f64 {
    0.4
}

fn default_sentiment_threshold() -> f64 {
    0.1
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            web: default_web_floor(),
            deep: default_deep_floor(),
            market: default_market_floor(),
            proprietary: default_proprietary_floor(),
            sentiment_threshold: default_sentiment_threshold(),
        }
    }
}

// ============= Retrieval Collaborators =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketDataConfig {
    pub base_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    #[serde(default = "default_collaborator_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProprietaryConfig {
    pub base_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// Upper bound on documents requested per query
    #[serde(default = "default_max_documents")]
    pub max_documents: usize,

    #[serde(default = "default_collaborator_timeout")]
    pub timeout_secs: u64,
}

fn default_collaborator_timeout() -> u64 {
    30
}

fn default_max_documents() -> usize {
    20
}

// ============= Configuration Loading & Validation =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

impl EngineConfig {
    /// Load and validate configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate ranges, required values and env var availability
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must be non-zero".to_string(),
            ));
        }

        if self.llm.model().trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "llm.model must not be empty".to_string(),
            ));
        }
        if let LlmConfig::OpenAI { api_key_env, .. } = &self.llm {
            self.validate_env_var(api_key_env)?;
        }

        if self.research.max_results == 0 {
            return Err(ConfigError::ValidationError(
                "research.max_results must be at least 1".to_string(),
            ));
        }
        if self.research.question_count == 0 || self.research.max_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "research.question_count and research.max_iterations must be at least 1"
                    .to_string(),
            ));
        }

        let c = &self.confidence;
        for (name, value) in [
            ("web", c.web),
            ("deep", c.deep),
            ("market", c.market),
            ("proprietary", c.proprietary),
            ("sentiment_threshold", c.sentiment_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ValidationError(format!(
                    "confidence.{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        if let Some(market) = &self.market_data {
            Self::validate_url("market_data.base_url", &market.base_url)?;
            if let Some(env) = &market.api_key_env {
                self.validate_env_var(env)?;
            }
        }

        if let Some(proprietary) = &self.proprietary {
            Self::validate_url("proprietary.base_url", &proprietary.base_url)?;
            if let Some(env) = &proprietary.api_key_env {
                self.validate_env_var(env)?;
            }
            if proprietary.max_documents == 0 {
                return Err(ConfigError::ValidationError(
                    "proprietary.max_documents must be at least 1".to_string(),
                ));
            }
        }

        Ok(())
    }

    fn validate_url(field: &str, url: &str) -> Result<(), ConfigError> {
        if url.starts_with("http://") || url.starts_with("https://") {
            Ok(())
        } else {
            Err(ConfigError::ValidationError(format!(
                "{} must be an http(s) URL, got '{}'",
                field, url
            )))
        }
    }

    fn validate_env_var(&self, name: &str) -> Result<(), ConfigError> {
        std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))?;
        Ok(())
    }

    /// Get a resolved value from an env var reference
    pub fn resolve_env(&self, env_name: &str) -> Option<String> {
        std::env::var(env_name).ok()
    }

    /// Completion-service provider with secrets resolved
    pub fn provider(&self) -> Result<Provider, ConfigError> {
        Ok(match &self.llm {
            LlmConfig::Ollama { base_url, model } => Provider::Ollama {
                base_url: base_url.clone(),
                model: model.clone(),
            },
            LlmConfig::OpenAI {
                api_key_env,
                api_base,
                model,
            } => Provider::OpenAI {
                api_key: self
                    .resolve_env(api_key_env)
                    .ok_or_else(|| ConfigError::MissingEnvVar(api_key_env.clone()))?,
                api_base: api_base.clone(),
                model: model.clone(),
            },
        })
    }

    /// Build the retrieval collaborators this configuration describes.
    ///
    /// Web search and deep research are always available; the market-data
    /// feed and proprietary corpus only when their sections are present.
    pub fn collaborators(&self, llm: Arc<dyn LLMClient>) -> crate::types::Result<Collaborators> {
        let web = Arc::new(DaedraSearch::new());
        let deep = Arc::new(ResearchCoordinator::new(
            llm,
            web.clone(),
            self.research.question_count,
            self.research.max_iterations,
            self.research.results_per_question,
        ));
        let mut collaborators = Collaborators::new(web, deep);

        if let Some(market) = &self.market_data {
            let api_key = market.api_key_env.as_deref().and_then(|e| self.resolve_env(e));
            collaborators = collaborators.with_market_data(Arc::new(HttpMarketData::new(
                market.base_url.clone(),
                api_key,
                Duration::from_secs(market.timeout_secs),
            )?));
        }

        if let Some(proprietary) = &self.proprietary {
            let api_key = proprietary
                .api_key_env
                .as_deref()
                .and_then(|e| self.resolve_env(e));
            collaborators = collaborators.with_proprietary_corpus(Arc::new(
                HttpProprietaryCorpus::new(
                    proprietary.base_url.clone(),
                    api_key,
                    Duration::from_secs(proprietary.timeout_secs),
                )?
                .with_max_documents(proprietary.max_documents),
            ));
        }

        Ok(collaborators)
    }
}

// ============= Configuration Manager =============

/// Thread-safe holder of the active configuration
#[derive(Clone)]
pub struct ConfigManager {
    config: Arc<ArcSwap<EngineConfig>>,
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new configuration manager and load the initial config
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(ConfigError::ReadError)?
                .join(path)
        };

        let config = EngineConfig::load(&path)?;

        Ok(Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            config_path: path,
        })
    }

    /// Create a config manager directly from a config (useful for testing)
    pub fn from_config(config: EngineConfig) -> Self {
        Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            config_path: PathBuf::from("synthesis.toml"),
        }
    }

    /// Get the current configuration (lockless read)
    pub fn config(&self) -> Arc<EngineConfig> {
        self.config.load_full()
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Reload the configuration from disk.
    ///
    /// The active configuration is left untouched when the file fails to
    /// load or validate.
    pub fn reload(&self) -> Result<(), ConfigError> {
        info!("Reloading configuration from {:?}", self.config_path);

        let new_config = EngineConfig::load(&self.config_path)?;
        self.config.store(Arc::new(new_config));

        info!("Configuration reloaded successfully");
        Ok(())
    }
}
