//! Research Synthesis
//!
//! [`orchestrator::SynthesisOrchestrator`] takes a
//! [`ResearchRequest`](crate::types::ResearchRequest), dispatches it to the
//! strategy its `researchType` names and returns one
//! [`ResearchResult`](crate::types::ResearchResult).
//!
//! # Usage
//!
//! ```ignore
//! use synthesis::research::SynthesisOrchestrator;
//! use synthesis::types::{ResearchRequest, ResearchType};
//!
//! let orchestrator = SynthesisOrchestrator::from_config(&config, llm)?;
//! let result = orchestrator
//!     .synthesize(&ResearchRequest::new("Tesla stock analysis", ResearchType::WebSearch))
//!     .await?;
//!
//! println!("{} ({:.0}% confidence)", result.summary, result.confidence * 100.0);
//! ```
//!
//! # Comprehensive mode
//!
//! 1. **Fan-out** - web, market and proprietary strategies run concurrently
//! 2. **Join** - every strategy completes before any error is reported
//! 3. **Merge** - findings and topics are unioned, confidence averaged
//! 4. **Narrate** - one completion call combines the individual summaries

/// Comprehensive-mode result merging.
pub mod merge;
/// Request dispatch and fan-out.
pub mod orchestrator;
/// The four strategy executors.
pub mod strategies;

pub use orchestrator::SynthesisOrchestrator;
pub use strategies::StrategyExecutor;
