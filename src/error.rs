//! Error types for the chat relay service

use thiserror::Error;

/// Result type alias for chat service operations
pub type Result<T> = std::result::Result<T, ChatError>;

#[derive(Error, Debug)]
pub enum ChatError {

    // =============================
    // Request Validation
    // =============================

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // =============================
    // Model Collaborator Errors
    // =============================

    #[error("Model error: {0}")]
    ModelError(String),

    #[error("Model request timed out: {0}")]
    ModelTimeout(String),

    /// The model returned no usable text (e.g. a safety block)
    #[error("Model returned an empty response: {0}")]
    EmptyModelResponse(String),
}
