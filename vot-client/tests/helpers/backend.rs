//! Scripted backend for exercising the client without a network

use async_trait::async_trait;
use prost::Message;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use vot_client::client::{HttpRequest, HttpResponse, Transport};
use vot_client::config::{ApiSettings, TranslationSettings};
use vot_client::models::SharedVideoId;
use vot_client::protocol;
use vot_client::{Error, Result, SignedRequestClient, TranslationOrchestrator};
use vot_common::events::EventBus;
use vot_common::localization::EnglishLocalizer;

pub const TEST_HOST: &str = "api.test";
pub const TEST_KEY: &str = "test-hmac-key";

#[derive(Debug, Clone)]
pub enum Reply {
    Response(HttpResponse),
    /// Transport-level failure (no HTTP answer at all)
    Fail,
}

/// Transport answering from per-path reply queues
///
/// The last reply queued for a path is sticky: it keeps being returned once
/// the queue is down to one entry. Every request is recorded.
#[derive(Default)]
pub struct MockTransport {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, path: &str, reply: Reply) {
        self.replies
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(reply);
    }

    pub fn reply_message<M: Message>(&self, path: &str, message: &M) {
        self.reply(path, Reply::Response(HttpResponse::ok(message.encode_to_vec())));
    }

    pub fn reply_body(&self, path: &str, body: &[u8]) {
        self.reply(path, Reply::Response(HttpResponse::ok(body.to_vec())));
    }

    pub fn reply_status(&self, path: &str, status: u16) {
        self.reply(
            path,
            Reply::Response(HttpResponse {
                status,
                body: Vec::new(),
            }),
        );
    }

    pub fn fail(&self, path: &str) {
        self.reply(path, Reply::Fail);
    }

    /// Drop every reply still queued for `path`
    pub fn reset(&self, path: &str) {
        self.replies.lock().unwrap().remove(path);
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.url.ends_with(path))
            .collect()
    }

    pub fn count(&self, path: &str) -> usize {
        self.requests_to(path).len()
    }

    fn next_reply(&self, url: &str) -> Option<Reply> {
        let mut replies = self.replies.lock().unwrap();
        let queue = replies
            .iter_mut()
            .find(|(path, _)| url.ends_with(path.as_str()))
            .map(|(_, queue)| queue)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let url = request.url.clone();
        self.requests.lock().unwrap().push(request);
        match self.next_reply(&url) {
            Some(Reply::Response(response)) => Ok(response),
            Some(Reply::Fail) => Err(Error::network(format!("connection refused: {}", url))),
            None => Err(Error::network(format!("no scripted reply for {}", url))),
        }
    }
}

pub fn api_settings() -> ApiSettings {
    ApiSettings {
        host: TEST_HOST.to_string(),
        hmac_key: TEST_KEY.to_string(),
        user_agent: "vot-client-tests".to_string(),
        timeout: Duration::from_secs(5),
        fallback_proxy: None,
    }
}

pub fn translation_settings() -> TranslationSettings {
    TranslationSettings {
        retry_with_subtitles: Duration::from_secs(20),
        retry_without_subtitles: Duration::from_secs(30),
        cache_ttl: Duration::from_secs(2 * 60 * 60),
        default_duration_secs: 343.0,
    }
}

pub fn client_with(primary: &Arc<MockTransport>) -> Arc<SignedRequestClient> {
    Arc::new(SignedRequestClient::new(
        primary.clone(),
        None,
        api_settings(),
        translation_settings().default_duration_secs,
    ))
}

/// Orchestrator whose page currently shows `video_id`
pub fn orchestrator_for(
    transport: &Arc<MockTransport>,
    video_id: &str,
) -> (Arc<TranslationOrchestrator>, SharedVideoId, EventBus) {
    let resolver = SharedVideoId::new(video_id);
    let events = EventBus::new(100);
    let orchestrator = TranslationOrchestrator::new(
        client_with(transport),
        Arc::new(resolver.clone()),
        Arc::new(EnglishLocalizer),
        events.clone(),
        translation_settings(),
    );
    (Arc::new(orchestrator), resolver, events)
}

pub fn waiting(remaining_time: i32) -> protocol::VideoTranslationResponse {
    protocol::VideoTranslationResponse {
        status: protocol::TranslationStatus::Waiting.code(),
        remaining_time,
        ..Default::default()
    }
}

pub fn finished(url: &str) -> protocol::VideoTranslationResponse {
    protocol::VideoTranslationResponse {
        url: url.to_string(),
        duration: 120.0,
        status: protocol::TranslationStatus::Finished.code(),
        translation_id: "tr-1".to_string(),
        ..Default::default()
    }
}

pub fn stream_pending() -> protocol::StreamTranslationResponse {
    protocol::StreamTranslationResponse {
        interval: protocol::StreamInterval::Translating.secs(),
        translated_info: None,
        ping_id: 0,
    }
}

pub fn stream_live(url: &str, ping_id: i32) -> protocol::StreamTranslationResponse {
    protocol::StreamTranslationResponse {
        interval: protocol::StreamInterval::Streaming.secs(),
        translated_info: Some(protocol::StreamTranslationObject {
            url: url.to_string(),
            timestamp: 1_700_000_000,
        }),
        ping_id,
    }
}
