use std::{fmt, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

static VIDEO_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^.*((youtu\.be/)|(v/)|(/u/\w/)|(embed/)|(watch\?))\??v?=?([^#&?]*).*")
        .expect("video url pattern is valid")
});

/// An 11-character YouTube video identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VideoId(String);

impl VideoId {
    pub const LEN: usize = 11;

    /// Accepts a bare identifier only.
    pub fn parse(candidate: &str) -> Option<Self> {
        let valid = candidate.len() == Self::LEN
            && candidate
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        valid.then(|| VideoId(candidate.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }

    pub fn embed_url(&self) -> String {
        format!("https://www.youtube.com/embed/{}", self.0)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for VideoId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        VideoId::parse(&value).ok_or_else(|| format!("invalid video id: {value}"))
    }
}

impl From<VideoId> for String {
    fn from(id: VideoId) -> Self {
        id.0
    }
}

/// Pull the video identifier out of a YouTube URL (`watch?v=`, `youtu.be/`,
/// `embed/`, `v/`, `/u/<x>/`). `None` when the URL carries no valid id.
pub fn extract_video_id(url: &str) -> Option<VideoId> {
    let captures = VIDEO_URL.captures(url)?;
    VideoId::parse(captures.get(7)?.as_str())
}

/// Accept either a bare identifier or any URL shape understood by
/// [`extract_video_id`].
pub fn resolve_video_id(input: &str) -> Option<VideoId> {
    let input = input.trim();
    VideoId::parse(input).or_else(|| extract_video_id(input))
}
