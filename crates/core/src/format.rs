use crate::types::{Highlights, QuickWatch, TranscriptItem};

/// Format seconds as MM:SS timestamp
pub fn format_timestamp(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let mins = (seconds / 60.0) as u32;
    let secs = (seconds % 60.0) as u32;
    format!("{:02}:{:02}", mins, secs)
}

/// Undo the HTML escaping caption services leave in their text.
pub fn clean_caption_text(text: &str) -> String {
    text.replace("&amp;#39;", "'")
        .replace("&#39;", "'")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
        .replace('\n', " ")
}

/// Numbered transcript lines, `[i] text`, for index-based pruning.
pub fn format_transcript_with_indices(transcript: &[TranscriptItem]) -> String {
    transcript
        .iter()
        .enumerate()
        .map(|(i, item)| format!("[{}] {}", i, item.text.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format transcript lines with timestamps and their exact start in seconds
pub fn format_transcript_with_timestamps(transcript: &[TranscriptItem]) -> String {
    transcript
        .iter()
        .map(|item| {
            format!(
                "[{} @ {:.1}s] {}",
                format_timestamp(item.start),
                item.start,
                item.text.trim()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_quick_watch_readable(quick_watch: &QuickWatch, include_transcript: bool) -> String {
    let mut output = String::new();
    output.push_str("# Quick Watch\n\n");

    output.push_str("## Summary\n\n");
    output.push_str(quick_watch.summary.trim());
    output.push_str("\n\n");

    output.push_str("## Key Moments\n\n");
    match &quick_watch.key_moments {
        highlights if highlights.is_empty() => output.push_str("No key moments found.\n"),
        Highlights::Indices(indices) => {
            for item in indices.iter().filter_map(|&i| quick_watch.transcript.get(i)) {
                output.push_str(&format!(
                    "• [{}] {}\n",
                    format_timestamp(item.start),
                    item.text.trim()
                ));
            }
        }
        Highlights::Moments(moments) => {
            for moment in moments {
                output.push_str(&format!(
                    "• [{}] {}\n",
                    format_timestamp(moment.start_time),
                    moment.text.trim()
                ));
                if let Some(importance) = &moment.importance {
                    output.push_str(&format!("  _{}_\n", importance.trim()));
                }
            }
        }
    }

    if include_transcript {
        output.push_str("\n## Transcript\n\n");
        for item in &quick_watch.transcript {
            output.push_str(&format!(
                "[{}] {}\n",
                format_timestamp(item.start),
                item.text.trim()
            ));
        }
    }

    output
}
