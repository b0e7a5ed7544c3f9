//! Inter-agent message envelope
//!
//! Every agent in the surrounding system speaks the same envelope: a typed
//! `messageType`, routing (`sender`, `recipient`), correlation identifiers
//! that survive a request/response round trip, and a free-form JSON
//! `content` payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessageType {
    Request,
    Response,
    Error,
    Notification,
    /// Anything else a sender put on the wire, kept verbatim
    Other(String),
}

impl From<String> for MessageType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "request" => MessageType::Request,
            "response" => MessageType::Response,
            "error" => MessageType::Error,
            "notification" => MessageType::Notification,
            _ => MessageType::Other(value),
        }
    }
}

impl From<MessageType> for String {
    fn from(value: MessageType) -> Self {
        value.to_string()
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageType::Request => write!(f, "request"),
            MessageType::Response => write!(f, "response"),
            MessageType::Error => write!(f, "error"),
            MessageType::Notification => write!(f, "notification"),
            MessageType::Other(other) => write!(f, "{}", other),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl From<String> for Priority {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "low" => Priority::Low,
            "high" | "urgent" | "critical" => Priority::High,
            _ => Priority::Medium,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentMessage {
    #[serde(default = "new_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub sender: String,
    pub recipient: String,
    /// request | response | error | notification
    #[schema(value_type = String)]
    pub message_type: MessageType,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub content: Value,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl AgentMessage {
    /// A fresh request opening a new conversation.
    pub fn request(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        content: Value,
    ) -> Self {
        Self {
            id: new_id(),
            conversation_id: Some(new_id()),
            request_id: Some(new_id()),
            sender: sender.into(),
            recipient: recipient.into(),
            message_type: MessageType::Request,
            priority: Priority::default(),
            content,
            timestamp: Utc::now(),
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Response addressed back to this message's sender, same correlation ids.
    pub fn respond(&self, content: Value) -> Self {
        self.reply(MessageType::Response, self.priority, content)
    }

    /// Error reply; errors are always high priority.
    pub fn fail(&self, content: Value) -> Self {
        self.reply(MessageType::Error, Priority::High, content)
    }

    /// Error reply to a payload that could not be read as an envelope.
    ///
    /// Routing and correlation fields are salvaged from `raw` where present;
    /// an unreadable `sender` becomes the recipient `"unknown"`.
    pub fn rejection(raw: &Value, sender: impl Into<String>, content: Value) -> Self {
        let field = |key: &str| raw.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            id: new_id(),
            conversation_id: field("conversationId"),
            request_id: field("requestId"),
            sender: sender.into(),
            recipient: field("sender").unwrap_or_else(|| "unknown".to_string()),
            message_type: MessageType::Error,
            priority: Priority::High,
            content,
            timestamp: Utc::now(),
        }
    }

    fn reply(&self, message_type: MessageType, priority: Priority, content: Value) -> Self {
        Self {
            id: new_id(),
            conversation_id: self.conversation_id.clone(),
            request_id: self.request_id.clone(),
            sender: self.recipient.clone(),
            recipient: self.sender.clone(),
            message_type,
            priority,
            content,
            timestamp: Utc::now(),
        }
    }

    /// `content.type`, when present.
    pub fn content_type(&self) -> Option<&str> {
        self.content.get("type").and_then(Value::as_str)
    }
}
