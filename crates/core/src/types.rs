use serde::{Deserialize, Serialize};

use crate::playback::RawSegment;

/// One timed caption line as delivered by the transcript source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptItem {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

impl TranscriptItem {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyMoment {
    pub start_time: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<f64>,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub importance: Option<String>,
}

/// Output of the highlight selector: either transcript lines to keep or
/// free-standing key moments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Highlights {
    Indices(Vec<usize>),
    Moments(Vec<KeyMoment>),
}

impl Default for Highlights {
    fn default() -> Self {
        Highlights::Moments(Vec::new())
    }
}

impl Highlights {
    pub fn len(&self) -> usize {
        match self {
            Highlights::Indices(indices) => indices.len(),
            Highlights::Moments(moments) => moments.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Playback segments in delivery order. Indices that do not address a
    /// transcript line are dropped.
    pub fn to_segments(&self, transcript: &[TranscriptItem]) -> Vec<RawSegment> {
        match self {
            Highlights::Indices(indices) => indices
                .iter()
                .filter_map(|&i| transcript.get(i))
                .map(RawSegment::from)
                .collect(),
            Highlights::Moments(moments) => moments.iter().map(RawSegment::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessVideoRequest {
    #[serde(default)]
    pub video_id: Option<String>,
}

impl ProcessVideoRequest {
    pub fn new(video_id: impl Into<String>) -> Self {
        Self {
            video_id: Some(video_id.into()),
        }
    }
}

/// Aggregate returned by the orchestration endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickWatch {
    pub transcript: Vec<TranscriptItem>,
    pub summary: String,
    pub key_moments: Highlights,
}

impl QuickWatch {
    pub fn segments(&self) -> Vec<RawSegment> {
        self.key_moments.to_segments(&self.transcript)
    }
}
