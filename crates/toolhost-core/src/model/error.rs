//! Model call error types

use thiserror::Error;

/// Failure contacting the conversational model
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelCallError {
    /// API request failed
    #[error("{provider} API error: {message}")]
    ApiError { provider: String, message: String },

    /// Response could not be turned into a message
    #[error("Invalid response from {provider}: {message}")]
    InvalidResponse { provider: String, message: String },

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ModelCallError {
    /// Create an API error
    pub fn api_error(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ApiError {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create an invalid response error
    pub fn invalid_response(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

pub type ModelResult<T> = Result<T, ModelCallError>;
