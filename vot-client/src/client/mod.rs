//! Signed request client for the translation backend
//!
//! **Responsibilities:**
//! - Encode request messages and sign the raw body (HMAC-SHA256)
//! - Attach a fresh anti-replay token to every signed request
//! - Dispatch through the primary transport, falling back to the proxy route
//!   when the primary one fails at transport level
//! - Map HTTP status and backend status codes onto `Error`

pub mod signing;
pub mod transport;

use crate::config::{ApiSettings, ClientConfig};
use crate::models::{Session, StreamResult, TranslationRequest, TranslationResult, VideoDescriptor};
use crate::protocol::{self, Endpoint, StreamInterval, TranslationStatus};
use crate::{Error, Result};
use prost::Message;
use signing::{generate_token, sign_body, SIGNATURE_HEADER, TOKEN_HEADER};
use std::sync::Arc;
use tracing::{debug, warn};
pub use transport::{HttpRequest, HttpResponse, Method, ReqwestTransport, Transport};

const PROTOBUF_CONTENT_TYPE: &str = "application/x-protobuf";

/// Client for the translation backend endpoints
pub struct SignedRequestClient {
    primary: Arc<dyn Transport>,
    fallback: Option<Arc<dyn Transport>>,
    api: ApiSettings,
    default_duration_secs: f64,
}

impl SignedRequestClient {
    pub fn new(
        primary: Arc<dyn Transport>,
        fallback: Option<Arc<dyn Transport>>,
        api: ApiSettings,
        default_duration_secs: f64,
    ) -> Self {
        Self {
            primary,
            fallback,
            api,
            default_duration_secs,
        }
    }

    /// Client with reqwest transports built from configuration
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let primary: Arc<dyn Transport> = Arc::new(ReqwestTransport::new(
            &config.api.user_agent,
            config.api.timeout,
        )?);
        let fallback = match &config.api.fallback_proxy {
            Some(proxy) => Some(Arc::new(ReqwestTransport::with_proxy(
                &config.api.user_agent,
                config.api.timeout,
                proxy,
            )?) as Arc<dyn Transport>),
            None => None,
        };

        Ok(Self::new(
            primary,
            fallback,
            config.api.clone(),
            config.translation.default_duration_secs,
        ))
    }

    pub fn host(&self) -> &str {
        &self.api.host
    }

    /// Request (or poll) an on-demand translation
    pub async fn translate_video(&self, request: &TranslationRequest) -> Result<TranslationResult> {
        let video = &request.video;
        let message = protocol::VideoTranslationRequest {
            url: video.url.clone(),
            device_id: String::new(),
            first_request: true,
            duration: video.effective_duration(self.default_duration_secs),
            source_lang: request.request_lang.clone(),
            force_source_lang: request.force_source_lang,
            translation_help: request
                .translation_help
                .iter()
                .map(|help| protocol::VideoTranslationHelpObject {
                    target: help.target.as_str().to_string(),
                    target_url: help.target_url.clone(),
                })
                .collect(),
            was_stream: false,
            response_lang: request.response_lang.clone(),
            bypass_cache: request.bypass_cache,
            use_new_model: request.model_variant,
            video_title: request.video_title.clone().unwrap_or_default(),
        };

        let response: protocol::VideoTranslationResponse =
            self.call(Endpoint::Translate, &message).await?;
        debug!(
            video_id = %video.video_id,
            status = response.status,
            remaining_time = response.remaining_time,
            "Translation response"
        );
        interpret_translation(response)
    }

    /// List backend-generated subtitles for a video
    pub async fn get_subtitles(
        &self,
        video: &VideoDescriptor,
        language: &str,
    ) -> Result<protocol::SubtitlesResponse> {
        let message = protocol::SubtitlesRequest {
            url: video.url.clone(),
            language: language.to_string(),
        };
        self.call(Endpoint::GetSubtitles, &message).await
    }

    /// Request (or poll) a live stream translation
    pub async fn translate_stream(
        &self,
        video: &VideoDescriptor,
        request_lang: &str,
        response_lang: &str,
    ) -> Result<StreamResult> {
        let message = protocol::StreamTranslationRequest {
            url: video.url.clone(),
            language: request_lang.to_string(),
            response_language: response_lang.to_string(),
        };
        let response: protocol::StreamTranslationResponse =
            self.call(Endpoint::TranslateStream, &message).await?;
        debug!(
            video_id = %video.video_id,
            interval = response.interval,
            ping_id = response.ping_id,
            "Stream translation response"
        );
        Ok(interpret_stream(response))
    }

    /// Keep a running stream translation alive
    pub async fn ping_stream(&self, ping_id: i32) -> Result<()> {
        let message = protocol::StreamPingRequest { ping_id };
        self.exchange(Endpoint::PingStream, &message).await?;
        Ok(())
    }

    /// Create an authenticated backend session for `module`
    pub async fn create_session(&self, module: &str) -> Result<Session> {
        let uuid = uuid::Uuid::new_v4().simple().to_string();
        let message = protocol::SessionRequest {
            uuid: uuid.clone(),
            module: module.to_string(),
        };
        let response: protocol::SessionResponse =
            self.call(Endpoint::CreateSession, &message).await?;
        if response.secret_key.is_empty() {
            return Err(Error::Server("Session response carried no secret key".to_string()));
        }

        Ok(Session {
            uuid,
            secret_key: response.secret_key,
            expires_at: vot_common::time::expiry_from_secs(
                vot_common::time::now(),
                i64::from(response.expires),
            ),
        })
    }

    /// Plain GET through the same transports (subtitle files)
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self.dispatch(HttpRequest::get(url)).await?;
        if !response.is_ok() {
            return Err(Error::http_status(
                response.status,
                format!("GET {} failed", url),
            ));
        }
        String::from_utf8(response.body)
            .map_err(|e| Error::Subtitle(format!("Response from {} is not UTF-8: {}", url, e)))
    }

    async fn call<Req, Resp>(&self, endpoint: Endpoint, message: &Req) -> Result<Resp>
    where
        Req: Message,
        Resp: Message + Default,
    {
        let response = self.exchange(endpoint, message).await?;
        protocol::decode(&response.body)
    }

    async fn exchange<Req: Message>(&self, endpoint: Endpoint, message: &Req) -> Result<HttpResponse> {
        let body = protocol::encode(message);
        let mut request = HttpRequest::post(self.api.url(endpoint.path()), body)
            .header("Accept", PROTOBUF_CONTENT_TYPE)
            .header("Content-Type", PROTOBUF_CONTENT_TYPE);

        if endpoint.is_signed() {
            let signature = sign_body(self.api.hmac_key.as_bytes(), &request.body)?;
            request = request
                .header(SIGNATURE_HEADER, signature)
                .header(TOKEN_HEADER, generate_token());
        }

        let response = self.dispatch(request).await?;
        if !response.is_ok() {
            warn!(endpoint = %endpoint, status = response.status, "Backend returned error status");
            return Err(Error::http_status(
                response.status,
                format!("{} returned HTTP {}", endpoint, response.status),
            ));
        }
        Ok(response)
    }

    async fn dispatch(&self, request: HttpRequest) -> Result<HttpResponse> {
        let fallback = match &self.fallback {
            Some(fallback) => fallback,
            None => return self.primary.send(request).await,
        };

        match self.primary.send(request.clone()).await {
            Ok(response) => Ok(response),
            Err(e) => {
                warn!(url = %request.url, error = %e, "Primary transport failed, retrying via fallback");
                fallback.send(request).await
            }
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Map a raw translation response onto a result or a terminal error
fn interpret_translation(response: protocol::VideoTranslationResponse) -> Result<TranslationResult> {
    let status = TranslationStatus::from_code(response.status).ok_or_else(|| {
        Error::Server(format!("Unknown translation status {}", response.status))
    })?;
    let duration_secs = (response.duration > 0.0).then_some(response.duration);
    let translation_id = non_empty(response.translation_id);
    let message = non_empty(response.message);

    match status {
        TranslationStatus::Failed => Err(Error::Server(
            message.unwrap_or_else(|| "Translation failed".to_string()),
        )),
        TranslationStatus::Finished | TranslationStatus::PartContent => {
            let url = non_empty(response.url).ok_or(Error::AudioNotReceived)?;
            Ok(TranslationResult {
                url: Some(url),
                remaining_time_secs: response.remaining_time.min(0),
                translated: true,
                message,
                translation_id,
                duration_secs,
                from_cache: false,
            })
        }
        TranslationStatus::Waiting
        | TranslationStatus::LongWaiting
        | TranslationStatus::AudioRequested => Ok(TranslationResult {
            url: None,
            // Keep "still processing" distinguishable even when no estimate was sent
            remaining_time_secs: response.remaining_time.max(1),
            translated: false,
            message,
            translation_id,
            duration_secs,
            from_cache: false,
        }),
    }
}

fn interpret_stream(response: protocol::StreamTranslationResponse) -> StreamResult {
    let translated = StreamInterval::from_secs(response.interval) == Some(StreamInterval::Streaming);
    let message = if !translated
        && StreamInterval::from_secs(response.interval) != Some(StreamInterval::Translating)
    {
        Some("streamNoConnectionToServer".to_string())
    } else {
        None
    };
    let (url, timestamp) = match response.translated_info {
        Some(info) if !info.url.is_empty() => (Some(info.url), Some(info.timestamp)),
        _ => (None, None),
    };

    StreamResult {
        translated,
        interval_secs: response.interval,
        message,
        url,
        timestamp,
        ping_id: response.ping_id,
    }
}
