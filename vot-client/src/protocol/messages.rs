//! Message schemas
//!
//! Field tags are part of the wire contract and must never be renumbered.

/// Auxiliary media location for sites the backend cannot scrape itself
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VideoTranslationHelpObject {
    /// `video_file_url` or `subtitles_file_url`
    #[prost(string, tag = "1")]
    pub target: String,
    #[prost(string, tag = "2")]
    pub target_url: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VideoTranslationRequest {
    #[prost(string, tag = "3")]
    pub url: String,
    #[prost(string, tag = "4")]
    pub device_id: String,
    #[prost(bool, tag = "5")]
    pub first_request: bool,
    /// Video length in seconds
    #[prost(double, tag = "6")]
    pub duration: f64,
    #[prost(string, tag = "8")]
    pub source_lang: String,
    #[prost(bool, tag = "9")]
    pub force_source_lang: bool,
    #[prost(message, repeated, tag = "11")]
    pub translation_help: Vec<VideoTranslationHelpObject>,
    #[prost(bool, tag = "13")]
    pub was_stream: bool,
    #[prost(string, tag = "14")]
    pub response_lang: String,
    #[prost(bool, tag = "17")]
    pub bypass_cache: bool,
    /// Selects the newer voice model generation
    #[prost(bool, tag = "18")]
    pub use_new_model: bool,
    #[prost(string, tag = "19")]
    pub video_title: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VideoTranslationResponse {
    #[prost(string, tag = "1")]
    pub url: String,
    #[prost(double, tag = "2")]
    pub duration: f64,
    /// See `TranslationStatus`
    #[prost(int32, tag = "4")]
    pub status: i32,
    /// Seconds until the backend expects to finish
    #[prost(int32, tag = "5")]
    pub remaining_time: i32,
    #[prost(string, tag = "7")]
    pub translation_id: String,
    #[prost(string, tag = "8")]
    pub language: String,
    #[prost(string, tag = "9")]
    pub message: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SubtitlesObject {
    #[prost(string, tag = "1")]
    pub language: String,
    #[prost(string, tag = "2")]
    pub url: String,
    #[prost(string, tag = "4")]
    pub translated_language: String,
    #[prost(string, tag = "5")]
    pub translated_url: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SubtitlesRequest {
    #[prost(string, tag = "1")]
    pub url: String,
    #[prost(string, tag = "2")]
    pub language: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SubtitlesResponse {
    /// Backend has not produced subtitles yet
    #[prost(bool, tag = "1")]
    pub waiting: bool,
    #[prost(message, repeated, tag = "2")]
    pub subtitles: Vec<SubtitlesObject>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StreamTranslationRequest {
    #[prost(string, tag = "1")]
    pub url: String,
    #[prost(string, tag = "2")]
    pub language: String,
    #[prost(string, tag = "3")]
    pub response_language: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StreamTranslationObject {
    /// Playlist URL of the translated stream
    #[prost(string, tag = "1")]
    pub url: String,
    #[prost(int64, tag = "2")]
    pub timestamp: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StreamTranslationResponse {
    /// Seconds; see `StreamInterval`
    #[prost(int32, tag = "1")]
    pub interval: i32,
    #[prost(message, optional, tag = "2")]
    pub translated_info: Option<StreamTranslationObject>,
    #[prost(int32, tag = "3")]
    pub ping_id: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StreamPingRequest {
    #[prost(int32, tag = "1")]
    pub ping_id: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SessionRequest {
    #[prost(string, tag = "1")]
    pub uuid: String,
    #[prost(string, tag = "2")]
    pub module: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SessionResponse {
    #[prost(string, tag = "1")]
    pub secret_key: String,
    /// Lifetime in seconds
    #[prost(int32, tag = "2")]
    pub expires: i32,
}

/// `VideoTranslationResponse.status` values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationStatus {
    Failed,
    Finished,
    Waiting,
    LongWaiting,
    PartContent,
    AudioRequested,
}

impl TranslationStatus {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(TranslationStatus::Failed),
            1 => Some(TranslationStatus::Finished),
            2 => Some(TranslationStatus::Waiting),
            3 => Some(TranslationStatus::LongWaiting),
            5 => Some(TranslationStatus::PartContent),
            6 => Some(TranslationStatus::AudioRequested),
            _ => None,
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            TranslationStatus::Failed => 0,
            TranslationStatus::Finished => 1,
            TranslationStatus::Waiting => 2,
            TranslationStatus::LongWaiting => 3,
            TranslationStatus::PartContent => 5,
            TranslationStatus::AudioRequested => 6,
        }
    }
}

/// `StreamTranslationResponse.interval` values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamInterval {
    NoConnection,
    /// Translation is being prepared; poll again after this many seconds
    Translating,
    /// Translation is live; ping at this interval
    Streaming,
}

impl StreamInterval {
    pub fn from_secs(secs: i32) -> Option<Self> {
        match secs {
            0 => Some(StreamInterval::NoConnection),
            10 => Some(StreamInterval::Translating),
            20 => Some(StreamInterval::Streaming),
            _ => None,
        }
    }

    pub fn secs(&self) -> i32 {
        match self {
            StreamInterval::NoConnection => 0,
            StreamInterval::Translating => 10,
            StreamInterval::Streaming => 20,
        }
    }
}
