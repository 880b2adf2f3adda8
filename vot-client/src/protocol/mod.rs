//! Binary wire protocol spoken with the translation backend
//!
//! Messages are protobuf-encoded (`prost`). Decoding is lenient in the
//! protobuf way: unknown fields are skipped and absent fields take their
//! default value, so additive server-side changes never break the client.

pub mod codec;
pub mod messages;

pub use codec::{decode, encode};
pub use messages::*;

/// Backend endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Translate,
    GetSubtitles,
    TranslateStream,
    PingStream,
    CreateSession,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Translate => "/video-translation/translate",
            Endpoint::GetSubtitles => "/video-subtitles/get-subtitles",
            Endpoint::TranslateStream => "/stream-translation/translate-stream",
            Endpoint::PingStream => "/stream-translation/ping-stream",
            Endpoint::CreateSession => "/session/create",
        }
    }

    /// Whether requests to this endpoint carry signature/token headers
    pub fn is_signed(&self) -> bool {
        !matches!(self, Endpoint::PingStream)
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}
