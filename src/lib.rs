//! # Research Synthesis Engine
//!
//! Turns a topic-oriented research request into one self-contained,
//! confidence-scored research result. Material comes from independent
//! retrieval collaborators (open-web search, deep research, a market-data
//! feed, a proprietary-document corpus); a completion service extracts
//! structured signal from it, identifies trends and patterns, and writes the
//! narrative.
//!
//! ## Overview
//!
//! The engine can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `synthesis-engine` binary
//! 2. **As a library** - Build a [`SynthesisOrchestrator`] in your own service
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use synthesis::{EngineConfig, LLMClientFactory, SynthesisOrchestrator};
//! use synthesis::types::{ResearchRequest, ResearchType};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig::load("synthesis.toml")?;
//!     let llm = LLMClientFactory::new(config.provider()?).create_shared().await?;
//!     let orchestrator = SynthesisOrchestrator::from_config(&config, llm)?;
//!
//!     let request = ResearchRequest::new("Tesla stock analysis", ResearchType::Comprehensive);
//!     let result = orchestrator.synthesize(&request).await?;
//!
//!     println!("{}", result.summary);
//!     for finding in &result.key_findings {
//!         println!("- {}", finding);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Research types
//!
//! | `researchType` | Strategy |
//! |----------------|----------|
//! | `web-search` | Open-web search, extraction, trends and patterns |
//! | `deep-research` | Delegated multi-question research, entity enrichment |
//! | `market-analysis` | Market-oriented search plus optional price history |
//! | `proprietary-analysis` | Internal document corpus |
//! | `comprehensive` | Web, market and proprietary concurrently, merged |
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `ollama` | Ollama local inference (default) |
//! | `openai` | OpenAI API support |
//!
//! ## Modules
//!
//! - [`agents`] - Message envelope adapter for other agents
//! - [`analysis`] - Information extraction, trend and pattern identification
//! - [`api`] - REST API handlers and routes
//! - [`cli`] - Command-line parsing and colored output
//! - [`llm`] - Completion-service clients and fail-soft payload parsing
//! - [`research`] - Strategy executors and the synthesis orchestrator
//! - [`retrieval`] - Retrieval collaborator traits and clients
//! - [`types`] - Common types and error handling
//! - [`utils`] - TOML configuration and hot reload

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// Inter-agent message adapters.
pub mod agents;
/// Signal extraction, trend and pattern identification.
pub mod analysis;
/// HTTP API handlers and routes.
pub mod api;
/// Command-line interface.
pub mod cli;
/// Completion-service clients and abstractions.
pub mod llm;
/// Strategy executors and synthesis orchestration.
pub mod research;
/// Retrieval collaborators.
pub mod retrieval;
/// Core types (requests, results, errors).
pub mod types;
/// Configuration utilities.
pub mod utils;

// Re-export commonly used types
pub use agents::{AgentMessage, ResearchAgent};
pub use llm::{LLMClient, LLMClientFactory, Provider};
pub use research::SynthesisOrchestrator;
pub use retrieval::Collaborators;
pub use types::{AppError, ResearchRequest, ResearchResult, Result};
pub use utils::toml_config::{ConfigManager, EngineConfig};

use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// TOML configuration with atomic reload
    pub config_manager: Arc<ConfigManager>,
    /// Direct research entry point
    pub orchestrator: Arc<SynthesisOrchestrator>,
    /// Envelope entry point wrapping the same orchestrator
    pub research_agent: Arc<ResearchAgent>,
}

impl AppState {
    pub fn new(config_manager: ConfigManager, orchestrator: SynthesisOrchestrator) -> Self {
        let orchestrator = Arc::new(orchestrator);
        Self {
            config_manager: Arc::new(config_manager),
            research_agent: Arc::new(ResearchAgent::new(Arc::clone(&orchestrator))),
            orchestrator,
        }
    }
}
