use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::types::{KeyMoment, TranscriptItem};

/// Window assumed for a segment that carries neither a duration nor an end.
pub const DEFAULT_SEGMENT_SECONDS: f64 = 30.0;

/// Latest time a segment may start or end at: one week of video.
pub const MAX_SEGMENT_SECONDS: f64 = 7.0 * 24.0 * 3600.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SegmentError {
    #[error("segment has no start")]
    MissingStart,

    #[error("field `{field}` is not a number: {value}")]
    NotANumber { field: &'static str, value: Value },

    #[error("field `{field}` is negative: {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("endTime {end} is before startTime {start}")]
    EndBeforeStart { start: f64, end: f64 },

    #[error("field `{field}` is out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

/// A time range exactly as delivered by a collaborator. Both
/// `{ start, duration }` and `{ startTime, endTime }` are accepted and nothing
/// is trusted until [`RawSegment::normalize`] succeeds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSegment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<Value>,
    #[serde(default, rename = "startTime", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<Value>,
    #[serde(default, rename = "endTime", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<Value>,
}

/// Canonical `(start, end)` pair in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeSegment {
    pub start: f64,
    pub end: f64,
}

impl RawSegment {
    pub fn from_start_duration(start: f64, duration: f64) -> Self {
        Self {
            start: Some(start.into()),
            duration: Some(duration.into()),
            ..Self::default()
        }
    }

    pub fn from_range(start_time: f64, end_time: Option<f64>) -> Self {
        Self {
            start_time: Some(start_time.into()),
            end_time: end_time.map(Value::from),
            ..Self::default()
        }
    }

    pub fn normalize(&self) -> Result<TimeSegment, SegmentError> {
        let start = match (&self.start, &self.start_time) {
            (Some(v), _) => seconds("start", v)?,
            (None, Some(v)) => seconds("startTime", v)?,
            (None, None) => return Err(SegmentError::MissingStart),
        };

        let end = if let Some(v) = &self.duration {
            start + seconds("duration", v)?
        } else if let Some(v) = &self.end_time {
            let end = seconds("endTime", v)?;
            if end < start {
                return Err(SegmentError::EndBeforeStart { start, end });
            }
            end
        } else {
            start + DEFAULT_SEGMENT_SECONDS
        };
        if end > MAX_SEGMENT_SECONDS {
            return Err(SegmentError::OutOfRange {
                field: "end",
                value: end,
            });
        }

        Ok(TimeSegment { start, end })
    }
}

fn seconds(field: &'static str, value: &Value) -> Result<f64, SegmentError> {
    let n = value
        .as_f64()
        .filter(|n| n.is_finite())
        .ok_or_else(|| SegmentError::NotANumber {
            field,
            value: value.clone(),
        })?;
    if n < 0.0 {
        return Err(SegmentError::Negative { field, value: n });
    }
    if n > MAX_SEGMENT_SECONDS {
        return Err(SegmentError::OutOfRange { field, value: n });
    }
    Ok(n)
}

impl From<&TranscriptItem> for RawSegment {
    fn from(item: &TranscriptItem) -> Self {
        RawSegment::from_start_duration(item.start, item.duration)
    }
}

impl From<&KeyMoment> for RawSegment {
    fn from(moment: &KeyMoment) -> Self {
        RawSegment::from_range(moment.start_time, moment.end_time)
    }
}

/// The ordered list a controller plays through. Malformed entries keep their
/// slot so indices stay aligned with what the collaborator delivered.
#[derive(Debug, Clone, Default)]
pub struct SegmentList {
    slots: Vec<Result<TimeSegment, SegmentError>>,
}

impl SegmentList {
    pub fn new(raw: impl IntoIterator<Item = RawSegment>) -> Self {
        Self {
            slots: raw.into_iter().map(|seg| seg.normalize()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slot(&self, index: usize) -> Option<&Result<TimeSegment, SegmentError>> {
        self.slots.get(index)
    }

    /// Well-formed segment at `index`.
    pub fn get(&self, index: usize) -> Option<&TimeSegment> {
        self.slots.get(index).and_then(|slot| slot.as_ref().ok())
    }

    pub fn valid(&self) -> impl Iterator<Item = (usize, &TimeSegment)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().ok().map(|seg| (i, seg)))
    }

    /// Effective end of segment `index`: its own end, clamped to the start of
    /// the next well-formed segment so windows never run into each other.
    pub fn end(&self, index: usize) -> Option<f64> {
        let seg = self.get(index)?;
        let next_start = self
            .slots
            .iter()
            .skip(index + 1)
            .find_map(|slot| slot.as_ref().ok())
            .map(|next| next.start);

        Some(match next_start {
            Some(next_start) => seg.end.min(next_start),
            None => seg.end,
        })
    }

    /// Playback window of segment `index`. Never negative, even when the next
    /// segment starts before this one.
    pub fn window(&self, index: usize) -> Option<Duration> {
        let seg = self.get(index)?;
        let end = self.end(index)?;
        Duration::try_from_secs_f64((end - seg.start).max(0.0)).ok()
    }

    /// First segment starting strictly after `time`, wrapping to the first
    /// well-formed segment when none does.
    pub fn next_after(&self, time: f64) -> Option<usize> {
        self.valid()
            .find(|(_, seg)| seg.start > time)
            .or_else(|| self.valid().next())
            .map(|(i, _)| i)
    }

    /// Last segment whose start is at or before `time`.
    pub fn active_index_at(&self, time: f64) -> Option<usize> {
        self.slots
            .iter()
            .enumerate()
            .rev()
            .find_map(|(i, slot)| match slot {
                Ok(seg) if seg.start <= time => Some(i),
                _ => None,
            })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn list(raw: Value) -> SegmentList {
        let raw: Vec<RawSegment> = serde_json::from_value(raw).unwrap();
        SegmentList::new(raw)
    }

    #[test]
    fn both_shapes_normalize_to_start_end() {
        let a = RawSegment::from_start_duration(10.0, 20.0).normalize().unwrap();
        let b = RawSegment::from_range(10.0, Some(30.0)).normalize().unwrap();
        assert_eq!(a, b);
        assert_eq!(a, TimeSegment { start: 10.0, end: 30.0 });
    }

    #[test]
    fn missing_end_defaults_to_thirty_seconds() {
        let seg = RawSegment::from_range(42.0, None).normalize().unwrap();
        assert_eq!(seg.end, 72.0);
    }

    #[test]
    fn overlapping_segment_is_clamped_to_next_start() {
        let segments = list(json!([
            {"start": 10, "duration": 20},
            {"start": 25, "duration": 20}
        ]));
        assert_eq!(segments.end(0), Some(25.0));
        assert_eq!(segments.end(1), Some(45.0));
        assert_eq!(segments.window(0), Some(Duration::from_secs(15)));
    }

    #[test]
    fn clamped_end_never_exceeds_next_start_for_sorted_lists() {
        let segments = list(json!([
            {"start": 0, "duration": 5},
            {"start": 5, "duration": 50},
            {"start": 12.5, "duration": 1},
            {"start": 80, "duration": 3}
        ]));
        for i in 0..segments.len() - 1 {
            let next = segments.get(i + 1).unwrap().start;
            assert!(segments.end(i).unwrap() <= next, "segment {i} overruns");
        }
    }

    #[test]
    fn out_of_order_segment_gets_an_empty_window() {
        let segments = list(json!([
            {"start": 60, "duration": 10},
            {"start": 5, "duration": 10}
        ]));
        assert_eq!(segments.window(0), Some(Duration::ZERO));
        assert_eq!(segments.window(1), Some(Duration::from_secs(10)));
    }

    #[test]
    fn malformed_fields_are_rejected_but_keep_their_slot() {
        let segments = list(json!([
            {"start": 0, "duration": 10},
            {"start": 20, "duration": "ten"},
            {"startTime": "soon"},
            {"duration": 3},
            {"start": -1, "duration": 2},
            {"startTime": 9, "endTime": 4},
            {"start": 40, "duration": 10}
        ]));

        assert_eq!(segments.len(), 7);
        assert!(matches!(
            segments.slot(1),
            Some(Err(SegmentError::NotANumber { field: "duration", .. }))
        ));
        assert!(matches!(
            segments.slot(2),
            Some(Err(SegmentError::NotANumber { field: "startTime", .. }))
        ));
        assert_eq!(segments.slot(3), Some(&Err(SegmentError::MissingStart)));
        assert!(matches!(segments.slot(4), Some(Err(SegmentError::Negative { .. }))));
        assert!(matches!(
            segments.slot(5),
            Some(Err(SegmentError::EndBeforeStart { .. }))
        ));
        // clamping looks past malformed neighbours
        assert_eq!(segments.end(0), Some(10.0));
        assert_eq!(segments.valid().count(), 2);
    }

    #[test]
    fn absurd_times_are_rejected() {
        let segments = list(json!([
            {"start": 0, "duration": 1e300},
            {"startTime": 0, "endTime": 1e19},
            {"start": 1e12},
            {"start": MAX_SEGMENT_SECONDS - 10.0},
            {"start": 0, "duration": 20}
        ]));

        assert!(matches!(
            segments.slot(0),
            Some(Err(SegmentError::OutOfRange { field: "duration", .. }))
        ));
        assert!(matches!(
            segments.slot(1),
            Some(Err(SegmentError::OutOfRange { field: "endTime", .. }))
        ));
        assert!(matches!(
            segments.slot(2),
            Some(Err(SegmentError::OutOfRange { field: "start", .. }))
        ));
        assert!(matches!(
            segments.slot(3),
            Some(Err(SegmentError::OutOfRange { field: "end", .. }))
        ));
        assert_eq!(segments.window(4), Some(Duration::from_secs(20)));
    }

    #[test]
    fn next_after_wraps_to_first_segment() {
        let segments = list(json!([
            {"start": 0, "duration": 5},
            {"start": 10, "duration": 5}
        ]));
        assert_eq!(segments.next_after(3.0), Some(1));
        assert_eq!(segments.next_after(10.0), Some(0));
        assert_eq!(segments.next_after(50.0), Some(0));
        assert_eq!(SegmentList::default().next_after(1.0), None);
    }

    #[test]
    fn active_index_is_last_segment_started() {
        let segments = list(json!([
            {"start": 10, "duration": 5},
            {"start": 20, "duration": 5},
            {"start": 30, "duration": "x"}
        ]));
        assert_eq!(segments.active_index_at(5.0), None);
        assert_eq!(segments.active_index_at(10.0), Some(0));
        assert_eq!(segments.active_index_at(27.0), Some(1));
        assert_eq!(segments.active_index_at(99.0), Some(1));
    }
}
