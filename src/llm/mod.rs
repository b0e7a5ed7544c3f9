//! Completion Service Clients and Abstractions
//!
//! This module wraps the remote natural-language completion service behind a
//! single trait so the analysis components and strategies never depend on a
//! concrete provider.
//!
//! # Architecture
//!
//! - [`LLMClient`] - The core trait that all providers implement
//! - [`LLMClientFactory`] - Builds the shared client from a [`Provider`]
//! - [`structured`] - Fail-soft extraction of JSON payloads from completion text
//!
//! # Supported Providers
//!
//! Enable providers via Cargo features:
//! - `ollama` - Local Ollama server (default)
//! - `openai` - OpenAI API and compatible endpoints
//!
//! # Example
//!
//! ```ignore
//! use synthesis::llm::{LLMClientFactory, Provider};
//!
//! let factory = LLMClientFactory::new(Provider::Ollama {
//!     base_url: "http://localhost:11434".to_string(),
//!     model: "llama3.2".to_string(),
//! });
//! let client = factory.create_shared().await?;
//! let text = client.generate("Summarise the EV market in one line").await?;
//! ```

/// Core completion-service trait and provider factory.
pub mod client;
/// Lenient JSON payload extraction from completion text.
pub mod structured;

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "openai")]
pub mod openai;

pub use client::{LLMClient, LLMClientFactory, Provider};
