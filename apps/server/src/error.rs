use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use quickwatch_core::QuickWatchError;
use serde::Serialize;
use tracing::error;

/// Error body: `{ "message": ..., "error"?: ... }`.
#[derive(Debug, Serialize, PartialEq)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug)]
pub struct ApiError(pub QuickWatchError);

impl From<QuickWatchError> for ApiError {
    fn from(err: QuickWatchError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn body(&self) -> ErrorBody {
        match &self.0 {
            QuickWatchError::InvalidInput { reason } => ErrorBody {
                message: reason.clone(),
                error: None,
            },
            QuickWatchError::NotFound { .. } => ErrorBody {
                message: "Transcript not found for this video".to_string(),
                error: None,
            },
            QuickWatchError::UpstreamFailure { message } => ErrorBody {
                message: "Failed to process video".to_string(),
                error: Some(message.clone()),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let QuickWatchError::UpstreamFailure { message } = &self.0 {
            error!(%message, "Error processing video");
        }
        (self.status_code(), Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_taxonomy_to_status_and_body() {
        let missing = ApiError(QuickWatchError::invalid_input("Video ID is required"));
        assert_eq!(missing.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(missing.body().message, "Video ID is required");

        let not_found = ApiError(QuickWatchError::NotFound {
            video_id: "dQw4w9WgXcQ".into(),
        });
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);

        let upstream = ApiError(QuickWatchError::upstream("rate limited"));
        assert_eq!(upstream.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            upstream.body(),
            ErrorBody {
                message: "Failed to process video".into(),
                error: Some("rate limited".into()),
            }
        );
    }
}
