use std::{fmt, str::FromStr};

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::{
    error::IntelligenceError,
    format::{format_transcript_with_indices, format_transcript_with_timestamps},
    intelligence::ChatClient,
    json::first_json_array,
    types::{Highlights, KeyMoment, TranscriptItem},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HighlightMode {
    /// Keep a subset of transcript lines, by index.
    Prune,
    /// Free-standing moments with their own time range and rationale.
    #[default]
    KeyMoments,
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown highlight mode: {0} (expected prune or moments)")]
pub struct UnknownHighlightMode(String);

impl FromStr for HighlightMode {
    type Err = UnknownHighlightMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prune" | "indices" => Ok(HighlightMode::Prune),
            "moments" | "key-moments" | "key_moments" => Ok(HighlightMode::KeyMoments),
            other => Err(UnknownHighlightMode(other.to_string())),
        }
    }
}

impl fmt::Display for HighlightMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HighlightMode::Prune => f.write_str("prune"),
            HighlightMode::KeyMoments => f.write_str("moments"),
        }
    }
}

/// Given the timestamped transcript, picks what is worth watching.
#[async_trait]
pub trait HighlightSelector: Send + Sync {
    async fn select(&self, transcript: &[TranscriptItem]) -> Result<Highlights, IntelligenceError>;
}

pub struct LlmHighlightSelector {
    client: ChatClient,
    mode: HighlightMode,
}

impl LlmHighlightSelector {
    pub fn new(client: ChatClient, mode: HighlightMode) -> Self {
        Self { client, mode }
    }

    pub fn mode(&self) -> HighlightMode {
        self.mode
    }
}

const PRUNE_SYSTEM_PROMPT: &str =
    "You condense video transcripts. You answer with a JSON array and nothing else.";

const KEY_MOMENTS_SYSTEM_PROMPT: &str =
    "You find the most important moments in video transcripts. You answer with a JSON array and nothing else.";

fn prune_prompt(transcript: &[TranscriptItem]) -> String {
    format!(
        r#"AGGRESSIVELY reduce this transcript to only the ABSOLUTELY ESSENTIAL lines while maintaining proper sentence structure and meaning.
The goal is a concise version of the content that still preserves the overall context and flow of the conversation.
Return ONLY a JSON array of line indices to KEEP, like [0, 15, 30].
NO explanations, just numbers.

Transcript:
{}"#,
        format_transcript_with_indices(transcript)
    )
}

fn key_moments_prompt(transcript: &[TranscriptItem]) -> String {
    format!(
        r#"Identify the 5-10 most important moments of this video transcript.
Each line starts with [MM:SS @ seconds]; use the seconds value for times.

Return ONLY a JSON array in this exact format:
[
  {{"startTime": 12.0, "endTime": 41.5, "text": "what happens in this moment", "importance": "why it matters"}}
]

Rules:
- Order moments by startTime
- Moments must not overlap
- endTime must be greater than startTime

Transcript:
{}"#,
        format_transcript_with_timestamps(transcript)
    )
}

/// Indices from the first numeric JSON array in `reply`. Indices outside the
/// transcript and repeats are dropped; no array means no highlights.
pub fn parse_indices(reply: &str, transcript_len: usize) -> Vec<usize> {
    let Some(indices) = first_json_array::<Vec<usize>>(reply) else {
        warn!("no index array in model reply");
        return Vec::new();
    };

    let mut kept = Vec::with_capacity(indices.len());
    for index in indices {
        if index >= transcript_len {
            debug!(index, transcript_len, "dropping out-of-range index");
        } else if !kept.contains(&index) {
            kept.push(index);
        }
    }
    kept
}

/// Key moments from the first JSON array in `reply`. Elements without a
/// numeric `startTime` are skipped.
pub fn parse_key_moments(reply: &str) -> Vec<KeyMoment> {
    let Some(elements) = first_json_array::<Vec<Value>>(reply) else {
        warn!("no key moment array in model reply");
        return Vec::new();
    };

    elements
        .into_iter()
        .enumerate()
        .filter_map(|(index, element)| {
            let moment = key_moment(&element);
            if moment.is_none() {
                warn!(index, %element, "skipping malformed key moment");
            }
            moment
        })
        .collect()
}

fn key_moment(element: &Value) -> Option<KeyMoment> {
    let object = element.as_object()?;
    let start_time = object.get("startTime")?.as_f64()?;
    Some(KeyMoment {
        start_time,
        end_time: object.get("endTime").and_then(Value::as_f64),
        text: object
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        importance: object
            .get("importance")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

#[async_trait]
impl HighlightSelector for LlmHighlightSelector {
    #[instrument(skip_all, fields(mode = %self.mode, lines = transcript.len()))]
    async fn select(&self, transcript: &[TranscriptItem]) -> Result<Highlights, IntelligenceError> {
        let highlights = match self.mode {
            HighlightMode::Prune => {
                let reply = self
                    .client
                    .complete(PRUNE_SYSTEM_PROMPT, &prune_prompt(transcript))
                    .await?;
                Highlights::Indices(parse_indices(&reply, transcript.len()))
            }
            HighlightMode::KeyMoments => {
                let reply = self
                    .client
                    .complete(KEY_MOMENTS_SYSTEM_PROMPT, &key_moments_prompt(transcript))
                    .await?;
                Highlights::Moments(parse_key_moments(&reply))
            }
        };
        debug!(count = highlights.len(), "highlights selected");
        Ok(highlights)
    }
}
