//! API request handlers.

/// Health check handler.
pub mod health;
/// Research agent envelope handler.
pub mod messages;
/// OpenAPI document handler.
pub mod openapi;
/// Direct research handler.
pub mod research;
