use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    error::{QuickWatchError, Result, TranscriptError},
    intelligence::{HighlightSelector, SummaryGenerator},
    types::{Highlights, ProcessVideoRequest, QuickWatch, TranscriptItem},
    youtube::{TranscriptSource, VideoId, resolve_video_id},
};

/// Composes the three collaborators into one quick-watch request.
#[derive(Clone)]
pub struct Orchestrator {
    transcripts: Arc<dyn TranscriptSource>,
    summaries: Arc<dyn SummaryGenerator>,
    highlights: Arc<dyn HighlightSelector>,
}

impl Orchestrator {
    pub fn new(
        transcripts: Arc<dyn TranscriptSource>,
        summaries: Arc<dyn SummaryGenerator>,
        highlights: Arc<dyn HighlightSelector>,
    ) -> Self {
        Self {
            transcripts,
            summaries,
            highlights,
        }
    }

    /// Transcript for `video_id`; a missing or empty transcript is `NotFound`.
    pub async fn fetch_transcript(&self, video_id: &VideoId) -> Result<Vec<TranscriptItem>> {
        let transcript = self
            .transcripts
            .fetch(video_id)
            .await
            .map_err(|err| match err {
                TranscriptError::NoTranscript { video_id } => QuickWatchError::NotFound { video_id },
                other => QuickWatchError::upstream(other),
            })?;

        if transcript.is_empty() {
            return Err(QuickWatchError::NotFound {
                video_id: video_id.to_string(),
            });
        }
        Ok(transcript)
    }

    /// Summary and highlights, requested concurrently.
    pub async fn analyze(&self, transcript: &[TranscriptItem]) -> Result<(String, Highlights)> {
        let summary = async {
            self.summaries
                .summarize(transcript)
                .await
                .map_err(QuickWatchError::upstream)
        };
        let highlights = async {
            self.highlights
                .select(transcript)
                .await
                .map_err(QuickWatchError::upstream)
        };
        tokio::try_join!(summary, highlights)
    }

    #[instrument(skip_all, fields(request_id = %Uuid::new_v4(), video_id = tracing::field::Empty))]
    pub async fn process(&self, request: &ProcessVideoRequest) -> Result<QuickWatch> {
        let raw = request
            .video_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| QuickWatchError::invalid_input("Video ID is required"))?;
        let video_id = resolve_video_id(raw).ok_or_else(|| {
            QuickWatchError::invalid_input(format!("Not a YouTube video ID or URL: {raw}"))
        })?;
        tracing::Span::current().record("video_id", video_id.as_str());

        let transcript = self.fetch_transcript(&video_id).await.inspect_err(|err| {
            warn!(error = %err, "transcript unavailable");
        })?;
        let (summary, key_moments) = self.analyze(&transcript).await.inspect_err(|err| {
            warn!(error = %err, "analysis failed");
        })?;

        info!(
            lines = transcript.len(),
            key_moments = key_moments.len(),
            "quick watch ready"
        );
        Ok(QuickWatch {
            transcript,
            summary,
            key_moments,
        })
    }
}
