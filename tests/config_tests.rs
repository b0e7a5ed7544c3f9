//! Loading, validating and hot-reloading synthesis.toml.

use std::io::Write;
use std::sync::Arc;
use synthesis::types::ResearchDepth;
use synthesis::utils::toml_config::{ConfigError, LogFormat};
use synthesis::{ConfigManager, EngineConfig, SynthesisOrchestrator};
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const FULL_CONFIG: &str = r#"
[server]
port = 4100
log_format = "json"

[llm]
type = "ollama"
base_url = "http://gpu-box:11434"
model = "qwen2.5"

[research]
max_results = 25
default_depth = "basic"
question_count = 3

[confidence]
web = 0.2
proprietary = 0.5

[market_data]
base_url = "https://quotes.example.com"
timeout_secs = 5

[proprietary]
base_url = "https://corpus.example.com/"
max_documents = 8
"#;

#[test]
fn test_load_full_config() {
    let file = write_config(FULL_CONFIG);
    let config = EngineConfig::load(file.path()).unwrap();

    assert_eq!(config.server.port, 4100);
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.log_format, LogFormat::Json);
    assert_eq!(config.llm.model(), "qwen2.5");
    assert_eq!(config.research.max_results, 25);
    assert_eq!(config.research.default_depth, ResearchDepth::Basic);
    assert_eq!(config.research.question_count, 3);
    assert_eq!(config.confidence.web, 0.2);
    assert_eq!(config.confidence.market, 0.5);
    assert_eq!(config.market_data.as_ref().unwrap().timeout_secs, 5);
    assert_eq!(config.proprietary.as_ref().unwrap().max_documents, 8);
}

#[test]
fn test_missing_file() {
    let err = EngineConfig::load("/nonexistent/synthesis.toml").unwrap_err();
    assert!(matches!(err, ConfigError::FileNotFound(_)));
}

#[test]
fn test_malformed_toml() {
    let file = write_config("[server\nport = ");
    assert!(matches!(
        EngineConfig::load(file.path()).unwrap_err(),
        ConfigError::ParseError(_)
    ));
}

#[test]
fn test_zero_max_results_rejected() {
    let err = EngineConfig::parse("[research]\nmax_results = 0\n").unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError(_)));
}

#[test]
fn test_openai_requires_key_env() {
    let err = EngineConfig::parse(
        r#"
[llm]
type = "openai"
api_key_env = "SYNTHESIS_TEST_UNSET_OPENAI_KEY"
model = "gpt-4o-mini"
"#,
    )
    .unwrap_err();
    assert!(
        matches!(err, ConfigError::MissingEnvVar(ref v) if v == "SYNTHESIS_TEST_UNSET_OPENAI_KEY")
    );
}

#[tokio::test]
async fn test_orchestrator_from_config() {
    let config = EngineConfig::parse(FULL_CONFIG).unwrap();
    let llm: Arc<dyn synthesis::LLMClient> = Arc::new(NullLLM);
    assert!(SynthesisOrchestrator::from_config(&config, llm).is_ok());
}

#[test]
fn test_reload_swaps_config() {
    let file = write_config("[server]\nport = 5000\n");
    let manager = ConfigManager::new(file.path()).unwrap();
    assert_eq!(manager.config().server.port, 5000);

    std::fs::write(file.path(), "[server]\nport = 5001\n").unwrap();
    manager.reload().unwrap();
    assert_eq!(manager.config().server.port, 5001);
}

#[test]
fn test_failed_reload_keeps_active_config() {
    let file = write_config("[server]\nport = 5000\n");
    let manager = ConfigManager::new(file.path()).unwrap();

    std::fs::write(file.path(), "[confidence]\nweb = 1.5\n").unwrap();
    assert!(manager.reload().is_err());
    assert_eq!(manager.config().server.port, 5000);
}

struct NullLLM;

#[async_trait::async_trait]
impl synthesis::LLMClient for NullLLM {
    async fn generate(&self, _prompt: &str) -> synthesis::Result<String> {
        Ok(String::new())
    }

    async fn generate_with_system(
        &self,
        _system: &str,
        _prompt: &str,
    ) -> synthesis::Result<String> {
        Ok(String::new())
    }

    fn model_name(&self) -> &str {
        "null"
    }
}
