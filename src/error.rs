//! Error types for Agent Brain

use thiserror::Error;

use crate::schema::ValidationError;

/// Errors that can occur while ingesting events or building a profile
#[derive(Debug, Error)]
pub enum BrainError {
    #[error("No events ingested; nothing to build a profile from")]
    NoData,

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid event: {0}")]
    Validation(#[from] ValidationError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
