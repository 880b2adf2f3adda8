//! Domain types shared by the orchestrator, subtitle processor and CLI

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Subject of a translation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoDescriptor {
    /// Site-scoped identifier
    pub video_id: String,
    pub url: String,
    /// Length in seconds; `None` when the page could not tell
    pub duration_secs: Option<f64>,
    pub is_stream: bool,
    pub detected_language: String,
    pub response_language: String,
    #[serde(default)]
    pub translation_help: Vec<TranslationHelp>,
    #[serde(default)]
    pub title: Option<String>,
}

impl VideoDescriptor {
    pub fn new(video_id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            url: url.into(),
            duration_secs: None,
            is_stream: false,
            detected_language: "en".to_string(),
            response_language: "ru".to_string(),
            translation_help: Vec::new(),
            title: None,
        }
    }

    pub fn with_languages(mut self, detected: impl Into<String>, response: impl Into<String>) -> Self {
        self.detected_language = detected.into();
        self.response_language = response.into();
        self
    }

    pub fn with_duration(mut self, secs: f64) -> Self {
        self.duration_secs = Some(secs);
        self
    }

    /// The page switched to another video
    pub fn set_video_id(&mut self, video_id: impl Into<String>) {
        self.video_id = video_id.into();
    }

    /// Duration to send to the backend
    pub fn effective_duration(&self, default_secs: f64) -> f64 {
        match self.duration_secs {
            Some(d) if d.is_finite() && d > 0.0 => d,
            _ => default_secs,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HelpTarget {
    VideoFileUrl,
    SubtitlesFileUrl,
}

impl HelpTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            HelpTarget::VideoFileUrl => "video_file_url",
            HelpTarget::SubtitlesFileUrl => "subtitles_file_url",
        }
    }
}

/// Direct media or subtitle URL for sites the backend cannot scrape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationHelp {
    pub target: HelpTarget,
    pub target_url: String,
}

/// One on-demand translation call
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationRequest {
    pub video: VideoDescriptor,
    pub request_lang: String,
    pub response_lang: String,
    pub translation_help: Vec<TranslationHelp>,
    /// Selects the newer backend model generation
    pub model_variant: bool,
    pub force_source_lang: bool,
    pub bypass_cache: bool,
    pub video_title: Option<String>,
}

impl TranslationRequest {
    /// Request using the descriptor's own languages and help entries
    pub fn for_video(video: VideoDescriptor, model_variant: bool) -> Self {
        Self {
            request_lang: video.detected_language.clone(),
            response_lang: video.response_language.clone(),
            translation_help: video.translation_help.clone(),
            video_title: video.title.clone(),
            video,
            model_variant,
            force_source_lang: false,
            bypass_cache: false,
        }
    }
}

/// Interpreted backend answer to an on-demand request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationResult {
    pub url: Option<String>,
    /// Positive while the backend is still processing
    pub remaining_time_secs: i32,
    pub translated: bool,
    pub message: Option<String>,
    pub translation_id: Option<String>,
    pub duration_secs: Option<f64>,
    #[serde(default)]
    pub from_cache: bool,
}

impl TranslationResult {
    pub fn is_terminal_success(&self) -> bool {
        self.translated && self.remaining_time_secs < 1
    }

    /// `Err(ServerBusy)` while the backend is still working
    pub fn check_ready(&self) -> crate::Result<()> {
        if self.is_terminal_success() {
            Ok(())
        } else {
            Err(crate::Error::ServerBusy {
                remaining_time: self.remaining_time_secs,
            })
        }
    }
}

/// Interpreted backend answer to a stream request
#[derive(Debug, Clone, PartialEq)]
pub struct StreamResult {
    pub translated: bool,
    pub interval_secs: i32,
    /// Localization key describing why the stream is unavailable
    pub message: Option<String>,
    /// Playlist URL and server timestamp once live
    pub url: Option<String>,
    pub timestamp: Option<i64>,
    pub ping_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "site")]
pub enum SubtitleSource {
    /// Produced by the translation backend
    Backend,
    /// Native track published by the hosting site
    Site(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleTrack {
    pub source: SubtitleSource,
    pub language: String,
    pub url: String,
    pub is_auto_generated: bool,
    pub translated_from_language: Option<String>,
}

impl SubtitleTrack {
    pub fn is_backend(&self) -> bool {
        self.source == SubtitleSource::Backend
    }
}

/// Authenticated backend session
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub uuid: String,
    pub secret_key: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

/// Current video identity as seen by the page
pub trait VideoIdResolver: Send + Sync {
    fn current_video_id(&self) -> Option<String>;
}

/// Resolver backed by a shared cell the host updates on navigation
#[derive(Debug, Clone, Default)]
pub struct SharedVideoId {
    current: Arc<Mutex<Option<String>>>,
}

impl SharedVideoId {
    pub fn new(video_id: impl Into<String>) -> Self {
        Self {
            current: Arc::new(Mutex::new(Some(video_id.into()))),
        }
    }

    pub fn set(&self, video_id: Option<String>) {
        if let Ok(mut current) = self.current.lock() {
            *current = video_id;
        }
    }
}

impl VideoIdResolver for SharedVideoId {
    fn current_video_id(&self) -> Option<String> {
        self.current.lock().ok().and_then(|current| current.clone())
    }
}
