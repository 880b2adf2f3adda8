//! Subtitle file parsing
//!
//! Recognized inputs: the backend's JSON, site JSON3 (timed-text events),
//! WebVTT and SRT. Every parser feeds the same normalization step.

use super::{SubtitleCue, SubtitleDocument};
use crate::{Error, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BackendSubtitles {
    subtitles: Vec<BackendCue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BackendCue {
    #[serde(default)]
    text: String,
    start_ms: u64,
    #[serde(default)]
    duration_ms: u64,
}

#[derive(Debug, Deserialize)]
struct Json3Subtitles {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Json3Event {
    #[serde(default)]
    t_start_ms: u64,
    #[serde(default)]
    d_duration_ms: u64,
    #[serde(default)]
    segs: Vec<Json3Segment>,
}

#[derive(Debug, Deserialize)]
struct Json3Segment {
    #[serde(default)]
    utf8: String,
}

/// Detect the format of `content` and parse it into a normalized document
pub fn parse_document(content: &str) -> Result<SubtitleDocument> {
    let trimmed = content.trim_start_matches('\u{feff}').trim_start();
    let cues = if trimmed.starts_with("WEBVTT") {
        parse_vtt(trimmed)?
    } else if trimmed.starts_with('{') {
        parse_json(trimmed)?
    } else {
        parse_srt(trimmed)?
    };
    Ok(SubtitleDocument::from_cues(cues))
}

fn parse_json(content: &str) -> Result<Vec<SubtitleCue>> {
    let value: serde_json::Value = serde_json::from_str(content)
        .map_err(|e| Error::Subtitle(format!("Invalid subtitle JSON: {}", e)))?;

    if value.get("subtitles").is_some() {
        let parsed: BackendSubtitles = serde_json::from_value(value)
            .map_err(|e| Error::Subtitle(format!("Invalid backend subtitles: {}", e)))?;
        Ok(parsed
            .subtitles
            .into_iter()
            .map(|cue| SubtitleCue {
                text: cue.text,
                start_ms: cue.start_ms,
                duration_ms: cue.duration_ms,
            })
            .collect())
    } else if value.get("events").is_some() {
        let parsed: Json3Subtitles = serde_json::from_value(value)
            .map_err(|e| Error::Subtitle(format!("Invalid JSON3 subtitles: {}", e)))?;
        Ok(parsed
            .events
            .into_iter()
            .map(|event| SubtitleCue {
                text: event.segs.into_iter().map(|seg| seg.utf8).collect::<String>(),
                start_ms: event.t_start_ms,
                duration_ms: event.d_duration_ms,
            })
            .collect())
    } else {
        Err(Error::Subtitle("Unrecognized subtitle JSON layout".to_string()))
    }
}

fn parse_srt(content: &str) -> Result<Vec<SubtitleCue>> {
    let subtitles = srtlib::Subtitles::parse_from_str(content.to_string())
        .map_err(|e| Error::Subtitle(format!("Invalid SRT: {}", e)))?;

    Ok(subtitles
        .to_vec()
        .into_iter()
        .map(|sub| {
            let start_ms = timestamp_to_millis(sub.start_time);
            let end_ms = timestamp_to_millis(sub.end_time);
            SubtitleCue {
                text: sub.text,
                start_ms,
                duration_ms: end_ms.saturating_sub(start_ms),
            }
        })
        .collect())
}

fn timestamp_to_millis(ts: srtlib::Timestamp) -> u64 {
    let (h, m, s, ms) = ts.get();
    u64::from(srtlib::Timestamp::convert_to_milliseconds(h, m, s, ms))
}

fn parse_vtt(content: &str) -> Result<Vec<SubtitleCue>> {
    let mut cues = Vec::new();
    let normalized = content.replace("\r\n", "\n");

    for block in normalized.split("\n\n") {
        let mut lines = block.lines().skip_while(|line| !line.contains("-->"));
        let timing = match lines.next() {
            Some(line) => line,
            None => continue,
        };

        let mut parts = timing.split("-->");
        let start = parts.next().map(str::trim).unwrap_or_default();
        // Cue settings may follow the end timestamp
        let end = parts
            .next()
            .and_then(|rest| rest.split_whitespace().next())
            .unwrap_or_default();
        let start_ms = parse_vtt_timestamp(start)
            .ok_or_else(|| Error::Subtitle(format!("Invalid WebVTT timestamp: {}", start)))?;
        let end_ms = parse_vtt_timestamp(end)
            .ok_or_else(|| Error::Subtitle(format!("Invalid WebVTT timestamp: {}", end)))?;

        let text = lines.map(strip_tags).collect::<Vec<_>>().join("\n");
        cues.push(SubtitleCue {
            text,
            start_ms,
            duration_ms: end_ms.saturating_sub(start_ms),
        });
    }

    Ok(cues)
}

/// `hh:mm:ss.mmm` or `mm:ss.mmm`
fn parse_vtt_timestamp(value: &str) -> Option<u64> {
    let (clock, millis) = value.split_once('.')?;
    let millis: u64 = millis.parse().ok()?;
    let fields: Vec<u64> = clock
        .split(':')
        .map(|field| field.parse().ok())
        .collect::<Option<Vec<_>>>()?;
    let (h, m, s) = match fields.as_slice() {
        [h, m, s] => (*h, *m, *s),
        [m, s] => (0, *m, *s),
        _ => return None,
    };
    Some(((h * 60 + m) * 60 + s) * 1000 + millis)
}

fn strip_tags(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut in_tag = false;
    for c in line.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}
