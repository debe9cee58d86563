//! Error types for the expense agent

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

#[derive(Error, Debug)]
pub enum AgentError {

    // =============================
    // Core Loop Errors
    // =============================

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Protocol violation: unknown action '{name}' with input '{input}'")]
    Protocol { name: String, input: String },

    #[error("Completion timed out after {0}s")]
    CompletionTimeout(u64),

    #[error("Query deadline exceeded after {0}s")]
    DeadlineExceeded(u64),

    #[error("Configuration error: {0}")]
    Config(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
