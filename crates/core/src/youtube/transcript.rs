use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::header::{ACCEPT_LANGUAGE, USER_AGENT};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::{
    error::TranscriptError, format::clean_caption_text, json::first_json_array,
    types::TranscriptItem, youtube::VideoId,
};

const WATCH_URL: &str = "https://www.youtube.com/watch";
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0 Safari/537.36";

static PLAYABILITY_STATUS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""playabilityStatus":\{"status":"([A-Z_]+)""#)
        .expect("playability pattern is valid")
});

/// Given a video identifier, yields its timed caption lines in order.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    async fn fetch(&self, video_id: &VideoId) -> Result<Vec<TranscriptItem>, TranscriptError>;
}

/// Reads the caption tracks advertised on the watch page and downloads the
/// best match for the configured language as `json3` timed text.
pub struct YoutubeTranscriptSource {
    client: reqwest::Client,
    lang: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    pub base_url: String,
    #[serde(default)]
    pub language_code: String,
    #[serde(default)]
    pub kind: Option<String>,
}

impl CaptionTrack {
    pub fn is_auto_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }
}

#[derive(Debug, Deserialize)]
struct TimedText {
    #[serde(default)]
    events: Vec<TimedTextEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimedTextEvent {
    t_start_ms: Option<f64>,
    d_duration_ms: Option<f64>,
    segs: Option<Vec<TimedTextSeg>>,
}

#[derive(Debug, Deserialize)]
struct TimedTextSeg {
    utf8: Option<String>,
}

impl YoutubeTranscriptSource {
    pub fn new(lang: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), lang)
    }

    pub fn with_client(client: reqwest::Client, lang: impl Into<String>) -> Self {
        Self {
            client,
            lang: lang.into(),
        }
    }

    async fn watch_page(&self, video_id: &VideoId) -> Result<String, TranscriptError> {
        let html = self
            .client
            .get(WATCH_URL)
            .query(&[("v", video_id.as_str()), ("hl", self.lang.as_str())])
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .header(ACCEPT_LANGUAGE, self.lang.as_str())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(html)
    }
}

#[async_trait]
impl TranscriptSource for YoutubeTranscriptSource {
    #[instrument(skip(self), fields(lang = %self.lang))]
    async fn fetch(&self, video_id: &VideoId) -> Result<Vec<TranscriptItem>, TranscriptError> {
        let html = self.watch_page(video_id).await?;

        let Some(tracks) = caption_tracks(&html) else {
            return Err(match playability_status(&html) {
                Some(status) if status != "OK" => TranscriptError::Unavailable {
                    reason: format!("video is not playable ({status})"),
                },
                _ => TranscriptError::NoTranscript {
                    video_id: video_id.to_string(),
                },
            });
        };

        let track = pick_track(&tracks, &self.lang).ok_or_else(|| TranscriptError::NoTranscript {
            video_id: video_id.to_string(),
        })?;
        debug!(
            language = %track.language_code,
            auto_generated = track.is_auto_generated(),
            "caption track selected"
        );

        let body = self
            .client
            .get(format!("{}&fmt=json3", track.base_url))
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let items = parse_json3(&body)?;
        debug!(lines = items.len(), "transcript fetched");
        Ok(items)
    }
}

/// Caption tracks advertised by a watch page, `None` when the page has none.
pub fn caption_tracks(html: &str) -> Option<Vec<CaptionTrack>> {
    let at = html.find("\"captionTracks\":")?;
    first_json_array::<Vec<CaptionTrack>>(&html[at..]).filter(|tracks| !tracks.is_empty())
}

fn playability_status(html: &str) -> Option<&str> {
    PLAYABILITY_STATUS
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Prefer a manual track in `lang`, then an auto-generated one, then
/// whatever comes first.
pub fn pick_track<'a>(tracks: &'a [CaptionTrack], lang: &str) -> Option<&'a CaptionTrack> {
    let matches_lang = |t: &&CaptionTrack| {
        t.language_code == lang || t.language_code.split('-').next() == Some(lang)
    };
    tracks
        .iter()
        .filter(matches_lang)
        .find(|t| !t.is_auto_generated())
        .or_else(|| tracks.iter().find(matches_lang))
        .or_else(|| tracks.first())
}

/// Timed text in `json3` form to transcript lines. Missing timings default to
/// zero and events without visible text are dropped.
pub fn parse_json3(body: &str) -> Result<Vec<TranscriptItem>, serde_json::Error> {
    let doc: TimedText = serde_json::from_str(body)?;
    Ok(doc
        .events
        .into_iter()
        .filter_map(|event| {
            let text: String = event
                .segs?
                .into_iter()
                .filter_map(|seg| seg.utf8)
                .collect();
            let text = clean_caption_text(text.trim());
            if text.is_empty() {
                return None;
            }
            Some(TranscriptItem {
                text,
                start: event.t_start_ms.unwrap_or(0.0) / 1000.0,
                duration: event.d_duration_ms.unwrap_or(0.0) / 1000.0,
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const WATCH_PAGE: &str = r#"<script>var ytInitialPlayerResponse = {"playabilityStatus":{"status":"OK"},"captions":{"playerCaptionsTracklistRenderer":{"captionTracks":[{"baseUrl":"https://www.youtube.com/api/timedtext?v=dQw4w9WgXcQ&lang=en&kind=asr","name":{"simpleText":"English (auto-generated)"},"languageCode":"en","kind":"asr"},{"baseUrl":"https://www.youtube.com/api/timedtext?v=dQw4w9WgXcQ&lang=en-GB","languageCode":"en-GB"},{"baseUrl":"https://www.youtube.com/api/timedtext?v=dQw4w9WgXcQ&lang=de","languageCode":"de"}],"audioTracks":[]}}};</script>"#;

    #[test]
    fn reads_caption_tracks_from_watch_page() {
        let tracks = caption_tracks(WATCH_PAGE).unwrap();
        assert_eq!(tracks.len(), 3);
        assert_eq!(
            tracks[0].base_url,
            "https://www.youtube.com/api/timedtext?v=dQw4w9WgXcQ&lang=en&kind=asr"
        );
        assert!(tracks[0].is_auto_generated());
    }

    #[test]
    fn prefers_manual_track_in_requested_language() {
        let tracks = caption_tracks(WATCH_PAGE).unwrap();
        assert_eq!(pick_track(&tracks, "en").unwrap().language_code, "en-GB");
        assert_eq!(pick_track(&tracks, "de").unwrap().language_code, "de");
        assert_eq!(pick_track(&tracks, "fr").unwrap().language_code, "en");
        assert!(pick_track(&[], "en").is_none());
    }

    #[test]
    fn page_without_captions_has_no_tracks() {
        let page = r#"{"playabilityStatus":{"status":"LOGIN_REQUIRED"}}"#;
        assert!(caption_tracks(page).is_none());
        assert_eq!(playability_status(page), Some("LOGIN_REQUIRED"));
    }

    #[test]
    fn parses_json3_events() {
        let body = r#"{"events":[
            {"tStartMs":0,"dDurationMs":5000,"id":1},
            {"tStartMs":1200,"dDurationMs":2300,"segs":[{"utf8":"we&#39;re no"},{"utf8":" strangers"}]},
            {"tStartMs":3500,"segs":[{"utf8":"\n"}]},
            {"dDurationMs":900,"segs":[{"utf8":"to love"}]}
        ]}"#;
        let items = parse_json3(body).unwrap();
        assert_eq!(
            items,
            vec![
                TranscriptItem {
                    text: "we're no strangers".into(),
                    start: 1.2,
                    duration: 2.3
                },
                TranscriptItem {
                    text: "to love".into(),
                    start: 0.0,
                    duration: 0.9
                },
            ]
        );
    }
}
