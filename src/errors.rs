use reqwest::StatusCode;
use thiserror::Error;

/// Failures surfaced by [`crate::cache::token_cache::CredentialTokenCache::get_token`].
#[derive(Debug, Error)]
pub enum TokenError {
    /// Client id or secret is absent. Never retried.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Token endpoint rejected the request, was unreachable or returned an unusable body.
    #[error("authentication error: {0}")]
    Authentication(String),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("API request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("API request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid API response: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl ToolError {
    /// Value of `error_type` in the tool result envelope.
    pub fn error_type(&self) -> &'static str {
        match self {
            ToolError::InvalidArguments(_) => "validation_error",
            ToolError::Api(ApiError::Token(TokenError::Configuration(_))) => "configuration_error",
            ToolError::Api(ApiError::Token(TokenError::Authentication(_))) => "authentication_error",
            ToolError::Api(ApiError::Status { .. })
            | ToolError::Api(ApiError::Transport(_))
            | ToolError::Api(ApiError::Decode(_)) => "api_error",
            ToolError::Unexpected(_) => "unexpected_error",
        }
    }
}
