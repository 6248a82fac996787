pub mod error;
pub mod format;
pub mod intelligence;
pub mod json;
pub mod orchestrator;
pub mod playback;
pub mod provider;
pub mod types;
pub mod youtube;

pub use error::{IntelligenceError, QuickWatchError, Result, TranscriptError};
pub use format::{
    format_quick_watch_readable, format_timestamp, format_transcript_with_indices,
    format_transcript_with_timestamps,
};
pub use intelligence::{
    ChatClient, HighlightMode, HighlightSelector, LlmHighlightSelector, LlmSummaryGenerator,
    SummaryGenerator,
};
pub use orchestrator::Orchestrator;
pub use playback::{
    DEFAULT_PLAYER_ID, PlaybackController, PlaybackSnapshot, PlaybackState, PlayerHandle,
    PlayerRegistry, PlayerStatus, PlayerView, ProgressTracker, RawSegment, SegmentList,
    SimulatedPlayer, TimeSegment,
};
pub use provider::{Provider, ProviderConfig, ProviderError};
pub use types::{Highlights, KeyMoment, ProcessVideoRequest, QuickWatch, TranscriptItem};
pub use youtube::{
    TranscriptSource, VideoId, YoutubeTranscriptSource, extract_video_id, resolve_video_id,
};
