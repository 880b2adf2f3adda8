//! Pure conversion of parsed subtitles to file formats

use super::SubtitleDocument;
use crate::{Error, Result};
use serde::Serialize;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleFormat {
    Srt,
    Vtt,
    Json,
}

impl SubtitleFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            SubtitleFormat::Srt => "srt",
            SubtitleFormat::Vtt => "vtt",
            SubtitleFormat::Json => "json",
        }
    }
}

impl FromStr for SubtitleFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "srt" => Ok(SubtitleFormat::Srt),
            "vtt" | "webvtt" => Ok(SubtitleFormat::Vtt),
            "json" => Ok(SubtitleFormat::Json),
            other => Err(Error::Subtitle(format!("Unknown subtitle format: {}", other))),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonCue<'a> {
    text: &'a str,
    start_ms: u64,
    duration_ms: u64,
}

#[derive(Serialize)]
struct JsonDocument<'a> {
    subtitles: Vec<JsonCue<'a>>,
}

/// Render `doc` in `format`
pub fn convert(doc: &SubtitleDocument, format: SubtitleFormat) -> Result<String> {
    match format {
        SubtitleFormat::Srt => Ok(to_srt(doc)),
        SubtitleFormat::Vtt => Ok(to_vtt(doc)),
        SubtitleFormat::Json => {
            let json = JsonDocument {
                subtitles: doc
                    .cues
                    .iter()
                    .map(|cue| JsonCue {
                        text: &cue.text,
                        start_ms: cue.start_ms,
                        duration_ms: cue.duration_ms,
                    })
                    .collect(),
            };
            serde_json::to_string_pretty(&json)
                .map_err(|e| Error::Subtitle(format!("Failed to serialize subtitles: {}", e)))
        }
    }
}

fn to_srt(doc: &SubtitleDocument) -> String {
    doc.cues
        .iter()
        .enumerate()
        .map(|(i, cue)| {
            srtlib::Subtitle::new(
                i + 1,
                srt_timestamp(cue.start_ms),
                srt_timestamp(cue.end_ms()),
                cue.text.clone(),
            )
            .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn srt_timestamp(ms: u64) -> srtlib::Timestamp {
    srtlib::Timestamp::from_milliseconds(u32::try_from(ms).unwrap_or(u32::MAX))
}

fn to_vtt(doc: &SubtitleDocument) -> String {
    let mut out = String::from("WEBVTT\n");
    for cue in &doc.cues {
        out.push('\n');
        out.push_str(&format!(
            "{} --> {}\n{}\n",
            vtt_timestamp(cue.start_ms),
            vtt_timestamp(cue.end_ms()),
            cue.text
        ));
    }
    out
}

fn vtt_timestamp(ms: u64) -> String {
    let (hours, rest) = (ms / 3_600_000, ms % 3_600_000);
    let (minutes, rest) = (rest / 60_000, rest % 60_000);
    let (seconds, millis) = (rest / 1000, rest % 1000);
    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
}
