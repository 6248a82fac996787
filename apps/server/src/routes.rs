use std::time::Duration;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::{get, post},
};
use quickwatch_core::{Orchestrator, ProcessVideoRequest, QuickWatch, QuickWatchError};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

use crate::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Orchestrator,
    pub timeout: Duration,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/process-video", post(process_video))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn process_video(
    State(state): State<AppState>,
    body: Result<Json<ProcessVideoRequest>, JsonRejection>,
) -> Result<Json<QuickWatch>, ApiError> {
    let Json(request) =
        body.map_err(|rejection| QuickWatchError::invalid_input(rejection.body_text()))?;

    let quick_watch = tokio::time::timeout(state.timeout, state.orchestrator.process(&request))
        .await
        .map_err(|_| {
            QuickWatchError::upstream(format!(
                "request timed out after {}s",
                state.timeout.as_secs()
            ))
        })??;

    Ok(Json(quick_watch))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header::CONTENT_TYPE},
    };
    use quickwatch_core::{
        HighlightSelector, Highlights, IntelligenceError, SummaryGenerator, TranscriptError,
        TranscriptItem, TranscriptSource, VideoId,
    };
    use tower::ServiceExt;

    use super::*;

    struct Captions(Option<Vec<TranscriptItem>>);

    #[async_trait]
    impl TranscriptSource for Captions {
        async fn fetch(&self, video_id: &VideoId) -> Result<Vec<TranscriptItem>, TranscriptError> {
            self.0.clone().ok_or_else(|| TranscriptError::NoTranscript {
                video_id: video_id.to_string(),
            })
        }
    }

    struct Summary(Result<&'static str, &'static str>);

    #[async_trait]
    impl SummaryGenerator for Summary {
        async fn summarize(&self, _: &[TranscriptItem]) -> Result<String, IntelligenceError> {
            match self.0 {
                Ok(text) => Ok(text.to_string()),
                Err(reason) => Err(IntelligenceError::InvalidApiResponse(json!(reason))),
            }
        }
    }

    struct Indices;

    #[async_trait]
    impl HighlightSelector for Indices {
        async fn select(&self, _: &[TranscriptItem]) -> Result<Highlights, IntelligenceError> {
            Ok(Highlights::Indices(vec![1]))
        }
    }

    struct Stalled;

    #[async_trait]
    impl SummaryGenerator for Stalled {
        async fn summarize(&self, _: &[TranscriptItem]) -> Result<String, IntelligenceError> {
            std::future::pending().await
        }
    }

    fn captions() -> Option<Vec<TranscriptItem>> {
        Some(vec![
            TranscriptItem {
                text: "hello".into(),
                start: 0.0,
                duration: 1.5,
            },
            TranscriptItem {
                text: "the point".into(),
                start: 1.5,
                duration: 3.0,
            },
        ])
    }

    fn app(
        transcripts: Option<Vec<TranscriptItem>>,
        summaries: Arc<dyn SummaryGenerator>,
    ) -> Router {
        router(AppState {
            orchestrator: Orchestrator::new(
                Arc::new(Captions(transcripts)),
                summaries,
                Arc::new(Indices),
            ),
            timeout: Duration::from_secs(5),
        })
    }

    async fn post_json(app: Router, body: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/process-video")
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn process_video_returns_the_aggregate() {
        let app = app(captions(), Arc::new(Summary(Ok("A greeting, then the point."))));
        let (status, body) = post_json(app, r#"{"videoId": "dQw4w9WgXcQ"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summary"], "A greeting, then the point.");
        assert_eq!(body["keyMoments"], json!([1]));
        assert_eq!(body["transcript"][1]["start"], json!(1.5));
    }

    #[tokio::test]
    async fn missing_video_id_is_a_bad_request() {
        let app = app(captions(), Arc::new(Summary(Ok("s"))));
        let (status, body) = post_json(app, "{}").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"message": "Video ID is required"}));
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let app = app(captions(), Arc::new(Summary(Ok("s"))));
        let (status, body) = post_json(app, "{\"videoId\":").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn missing_transcript_is_not_found() {
        let app = app(None, Arc::new(Summary(Ok("s"))));
        let (status, body) = post_json(app, r#"{"videoId": "dQw4w9WgXcQ"}"#).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"message": "Transcript not found for this video"}));
    }

    #[tokio::test]
    async fn upstream_failure_carries_the_underlying_error() {
        let app = app(captions(), Arc::new(Summary(Err("model overloaded"))));
        let (status, body) = post_json(app, r#"{"videoId": "dQw4w9WgXcQ"}"#).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Failed to process video");
        assert!(body["error"].as_str().unwrap().contains("model overloaded"));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_requests_time_out() {
        let app = app(captions(), Arc::new(Stalled));
        let (status, body) = post_json(app, r#"{"videoId": "dQw4w9WgXcQ"}"#).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "request timed out after 5s");
    }

    #[tokio::test]
    async fn health_reports_version() {
        let response = app(captions(), Arc::new(Summary(Ok("s"))))
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
    }
}
