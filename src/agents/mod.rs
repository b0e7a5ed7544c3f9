//! Agent Message Adapters
//!
//! Other agents in the surrounding system (compliance review, investment-idea
//! tracking) reach the engine through the generic [`message::AgentMessage`]
//! envelope instead of calling the orchestrator directly.

/// Envelope types shared by every agent.
pub mod message;
/// The research agent wrapping the synthesis orchestrator.
pub mod research;

pub use message::{AgentMessage, MessageType, Priority};
pub use research::ResearchAgent;

use async_trait::async_trait;

/// Base trait for envelope-speaking agents
#[async_trait]
pub trait Agent: Send + Sync {
    /// Name used as `sender`/`recipient` in envelopes
    fn name(&self) -> &str;

    /// `content.type` values this agent accepts
    fn capabilities(&self) -> &'static [&'static str];

    /// Handle one envelope. Never fails: errors come back as `error` envelopes.
    async fn handle(&self, message: AgentMessage) -> AgentMessage;
}
