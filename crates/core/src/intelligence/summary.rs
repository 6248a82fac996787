use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::{error::IntelligenceError, intelligence::ChatClient, types::TranscriptItem};

const SUMMARY_SYSTEM_PROMPT: &str = "You summarize YouTube video transcripts. \
Reply with plain prose only, no headings, no lists, no preamble.";

/// Given the transcript, produces a prose summary.
#[async_trait]
pub trait SummaryGenerator: Send + Sync {
    async fn summarize(&self, transcript: &[TranscriptItem]) -> Result<String, IntelligenceError>;
}

pub struct LlmSummaryGenerator {
    client: ChatClient,
}

impl LlmSummaryGenerator {
    pub fn new(client: ChatClient) -> Self {
        Self { client }
    }
}

/// Transcript text joined with single spaces.
pub fn full_text(transcript: &[TranscriptItem]) -> String {
    transcript
        .iter()
        .map(|item| item.text.trim())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[async_trait]
impl SummaryGenerator for LlmSummaryGenerator {
    #[instrument(skip_all, fields(lines = transcript.len()))]
    async fn summarize(&self, transcript: &[TranscriptItem]) -> Result<String, IntelligenceError> {
        let user_prompt = format!(
            "Below is a transcript from a YouTube video. Please provide a concise summary \
             (150-200 words) that captures the main points and key insights:\n\n{}",
            full_text(transcript)
        );

        let summary = self
            .client
            .complete(SUMMARY_SYSTEM_PROMPT, &user_prompt)
            .await?;
        debug!(chars = summary.len(), "summary generated");
        Ok(summary.trim().to_string())
    }
}
