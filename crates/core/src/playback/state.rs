use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing {
        index: usize,
    },
    Paused {
        index: usize,
        remaining_ms: u64,
    },
}

impl PlaybackState {
    pub fn index(&self) -> Option<usize> {
        match self {
            PlaybackState::Idle => None,
            PlaybackState::Playing { index } | PlaybackState::Paused { index, .. } => Some(*index),
        }
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, PlaybackState::Playing { .. })
    }

    /// Label of the single transport control for this state.
    pub fn control_label(&self) -> &'static str {
        match self {
            PlaybackState::Idle => "Quick Watch",
            PlaybackState::Playing { .. } => "Pause",
            PlaybackState::Paused { .. } => "Resume",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSnapshot {
    pub state: PlaybackState,
    pub segment_count: usize,
    /// Time left on the armed completion timer, if any.
    pub timer_remaining_ms: Option<u64>,
}
