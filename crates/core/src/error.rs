use thiserror::Error;

use crate::provider::ProviderError;

/// Failures surfaced to the caller of the orchestration endpoint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuickWatchError {
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("Transcript not found for video {video_id}")]
    NotFound { video_id: String },

    #[error("Upstream failure: {message}")]
    UpstreamFailure { message: String },
}

impl QuickWatchError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    pub fn upstream(err: impl std::fmt::Display) -> Self {
        Self::UpstreamFailure {
            message: err.to_string(),
        }
    }

    /// HTTP-like status carried by error responses.
    pub fn status(&self) -> u16 {
        match self {
            QuickWatchError::InvalidInput { .. } => 400,
            QuickWatchError::NotFound { .. } => 404,
            QuickWatchError::UpstreamFailure { .. } => 500,
        }
    }
}

#[derive(Error, Debug)]
pub enum TranscriptError {
    #[error("Video {video_id} has no transcript")]
    NoTranscript { video_id: String },

    #[error("Transcript data is not available: {reason}")]
    Unavailable { reason: String },

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum IntelligenceError {
    #[error("Provider error: {0}")]
    ProviderError(#[from] ProviderError),

    #[error("Invalid API response: {0}")]
    InvalidApiResponse(serde_json::Value),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, QuickWatchError>;
