use reqwest::StatusCode;
use shared::error::{ApiError, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("invalid directory url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("unsupported directory url '{0}', expected http or https")]
    UnsupportedUrl(String),
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} responded with {status}")]
    Status { url: String, status: StatusCode },
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl DirectoryError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Transport { .. } => ErrorCode::Transport,
            Self::Status { .. } => ErrorCode::Status,
            Self::Decode { .. } => ErrorCode::Decode,
            Self::Client(_) | Self::InvalidUrl { .. } | Self::UnsupportedUrl(_) => {
                ErrorCode::Internal
            }
        }
    }
}

impl From<&DirectoryError> for ApiError {
    fn from(value: &DirectoryError) -> Self {
        ApiError::new(value.code(), value.to_string())
    }
}
