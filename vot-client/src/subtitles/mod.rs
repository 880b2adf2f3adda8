//! Subtitle listing, download and parsing
//!
//! **Responsibilities:**
//! - Ask the backend for its subtitle tracks and merge them with the tracks
//!   the hosting site already published
//! - Download a track through the signed client's transports and parse it
//! - Convert parsed cues to SRT, WebVTT or JSON without any I/O

pub mod format;
pub mod parse;

pub use format::{convert, SubtitleFormat};

use crate::client::SignedRequestClient;
use crate::models::{SubtitleSource, SubtitleTrack, VideoDescriptor};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// One timed line of text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleCue {
    pub text: String,
    pub start_ms: u64,
    pub duration_ms: u64,
}

impl SubtitleCue {
    pub fn end_ms(&self) -> u64 {
        self.start_ms.saturating_add(self.duration_ms)
    }
}

/// Parsed and normalized subtitle track
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleDocument {
    pub cues: Vec<SubtitleCue>,
}

impl SubtitleDocument {
    /// Trim and collapse whitespace, drop empty cues, order by start time
    pub fn from_cues(cues: Vec<SubtitleCue>) -> Self {
        let mut cues: Vec<SubtitleCue> = cues
            .into_iter()
            .filter_map(|mut cue| {
                cue.text = cue.text.split_whitespace().collect::<Vec<_>>().join(" ");
                (!cue.text.is_empty()).then_some(cue)
            })
            .collect();
        cues.sort_by_key(|cue| cue.start_ms);
        Self { cues }
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// Cue visible at `position_ms`, if any
    pub fn cue_at(&self, position_ms: u64) -> Option<&SubtitleCue> {
        self.cues
            .iter()
            .find(|cue| cue.start_ms <= position_ms && position_ms < cue.end_ms())
    }
}

/// Lists and fetches subtitle tracks for a video
pub struct SubtitleProcessor {
    client: Arc<SignedRequestClient>,
}

impl SubtitleProcessor {
    pub fn new(client: Arc<SignedRequestClient>) -> Self {
        Self { client }
    }

    /// Backend tracks merged with `site_tracks`, best candidates first
    ///
    /// Order: backend tracks, then tracks in the response language, then
    /// human-made before auto-generated. Ties keep their input order.
    pub async fn get_subtitles(
        &self,
        video: &VideoDescriptor,
        site_tracks: &[SubtitleTrack],
    ) -> Result<Vec<SubtitleTrack>> {
        let response = self
            .client
            .get_subtitles(video, &video.detected_language)
            .await?;

        let mut tracks = Vec::new();
        if response.waiting {
            debug!(video_id = %video.video_id, "Backend subtitles not ready yet");
        } else {
            for object in response.subtitles {
                if !object.url.is_empty() {
                    tracks.push(SubtitleTrack {
                        source: SubtitleSource::Backend,
                        language: object.language.clone(),
                        url: object.url,
                        is_auto_generated: false,
                        translated_from_language: None,
                    });
                }
                if !object.translated_url.is_empty() {
                    tracks.push(SubtitleTrack {
                        source: SubtitleSource::Backend,
                        language: object.translated_language,
                        url: object.translated_url,
                        is_auto_generated: false,
                        translated_from_language: Some(object.language),
                    });
                }
            }
        }
        tracks.extend(site_tracks.iter().cloned());

        let response_language = video.response_language.as_str();
        tracks.sort_by_key(|track| {
            (
                !track.is_backend(),
                track.language != response_language,
                track.is_auto_generated,
            )
        });

        info!(
            video_id = %video.video_id,
            total = tracks.len(),
            backend = tracks.iter().filter(|t| t.is_backend()).count(),
            "Subtitle tracks listed"
        );
        Ok(tracks)
    }

    /// Download and parse one track
    pub async fn fetch_subtitles(&self, track: &SubtitleTrack) -> Result<SubtitleDocument> {
        let content = self.client.fetch_text(&track.url).await?;
        let document = parse::parse_document(&content)?;
        debug!(
            language = %track.language,
            cues = document.cues.len(),
            "Subtitles parsed"
        );
        Ok(document)
    }
}
