//! Translation orchestrator
//!
//! Turns single backend calls into the long-running workflows a playback
//! session needs:
//!
//! - **On-demand:** `Idle → Requesting → {Success, Pending, Aborted, Error}`.
//!   `Pending` waits one fixed interval and loops back to `Requesting`; the
//!   whole chain resolves the original call exactly once.
//! - **Stream:** `Idle → Requesting → {Pending, Running, Aborted, Error}`;
//!   `Running` owns a keepalive task until stopped.
//!
//! Every request (first or retried) re-resolves the page's current video id
//! first; a mismatch ends the chain with no result and no network call.
//! At most one retry wait and one keepalive exist per orchestrator; starting
//! a new attempt cancels the leftovers of the previous one.

pub mod cache;
pub mod stream;

pub use cache::{
    CacheKey, CachedSubtitles, CachedTranslation, SubtitleCache, TranslationCache, TtlCache,
};
pub use stream::StreamSession;

use crate::client::SignedRequestClient;
use crate::config::TranslationSettings;
use crate::models::{
    StreamResult, SubtitleTrack, TranslationRequest, TranslationResult, VideoDescriptor,
    VideoIdResolver,
};
use crate::protocol::StreamInterval;
use crate::subtitles::{SubtitleDocument, SubtitleProcessor};
use crate::{Error, Result};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use vot_common::events::{EventBus, StreamState, TranslationState, VotEvent};
use vot_common::localization::{format_count, Localizer};

/// Cancellation handle for one attempt
#[derive(Debug, Clone)]
struct Attempt {
    id: u64,
    token: CancellationToken,
}

struct Inner {
    state: TranslationState,
    stream_state: StreamState,
    /// Video the current state refers to
    video_id: String,
    stream_video_id: String,
    attempt_seq: u64,
    video_attempt: Option<Attempt>,
    stream_attempt: Option<Attempt>,
    stream: Option<StreamSession>,
    translations: TranslationCache,
    subtitle_cache: SubtitleCache,
    subtitles: Vec<SubtitleTrack>,
}

/// Per-session translation state machine
pub struct TranslationOrchestrator {
    client: Arc<SignedRequestClient>,
    subtitles: SubtitleProcessor,
    resolver: Arc<dyn VideoIdResolver>,
    localizer: Arc<dyn Localizer>,
    events: EventBus,
    settings: TranslationSettings,
    inner: Mutex<Inner>,
}

impl TranslationOrchestrator {
    pub fn new(
        client: Arc<SignedRequestClient>,
        resolver: Arc<dyn VideoIdResolver>,
        localizer: Arc<dyn Localizer>,
        events: EventBus,
        settings: TranslationSettings,
    ) -> Self {
        Self {
            subtitles: SubtitleProcessor::new(client.clone()),
            client,
            resolver,
            localizer,
            events,
            inner: Mutex::new(Inner {
                state: TranslationState::Idle,
                stream_state: StreamState::Idle,
                video_id: String::new(),
                stream_video_id: String::new(),
                attempt_seq: 0,
                video_attempt: None,
                stream_attempt: None,
                stream: None,
                translations: TranslationCache::new(settings.cache_ttl),
                subtitle_cache: SubtitleCache::new(settings.cache_ttl),
                subtitles: Vec::new(),
            }),
            settings,
        }
    }

    pub fn state(&self) -> TranslationState {
        self.lock().state
    }

    pub fn stream_state(&self) -> StreamState {
        self.lock().stream_state
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Subtitle tracks currently known for the session
    pub fn subtitles(&self) -> Vec<SubtitleTrack> {
        self.lock().subtitles.clone()
    }

    /// Replace the session's subtitle list
    ///
    /// A backend-sourced track shortens the retry interval of pending
    /// translations.
    pub fn set_subtitles(&self, tracks: Vec<SubtitleTrack>) {
        self.lock().subtitles = tracks;
    }

    /// Fetch the merged subtitle list and keep it for the session
    pub async fn refresh_subtitles(
        &self,
        video: &VideoDescriptor,
        site_tracks: &[SubtitleTrack],
    ) -> Result<Vec<SubtitleTrack>> {
        let tracks = self.subtitles.get_subtitles(video, site_tracks).await?;
        self.set_subtitles(tracks.clone());
        Ok(tracks)
    }

    /// Delay before re-polling a translation the backend is still working on
    pub fn retry_delay(&self) -> Duration {
        if self.lock().subtitles.iter().any(SubtitleTrack::is_backend) {
            self.settings.retry_with_subtitles
        } else {
            self.settings.retry_without_subtitles
        }
    }

    /// Request a translation, waiting out "still processing" answers
    ///
    /// Returns `Ok(None)` when the chain was aborted (video changed, or
    /// cancelled by `cancel`, `release` or a newer attempt).
    pub async fn translate_video(
        &self,
        request: &TranslationRequest,
    ) -> Result<Option<TranslationResult>> {
        let attempt = self.begin_video_attempt();
        let video_id = request.video.video_id.as_str();

        loop {
            if attempt.token.is_cancelled() {
                self.transition(&attempt, video_id, TranslationState::Aborted);
                return Ok(None);
            }
            if let Err(e) = self.check_identity(video_id) {
                debug!(video_id, error = %e, "Translation aborted");
                self.transition(&attempt, video_id, TranslationState::Aborted);
                self.finish_video_attempt(&attempt);
                return Ok(None);
            }

            self.transition(&attempt, video_id, TranslationState::Requesting);
            let result = match self.client.translate_video(request).await {
                Ok(result) => result,
                Err(e) => {
                    warn!(video_id, error = %e, "Translation request failed");
                    self.transition(&attempt, video_id, TranslationState::Error);
                    self.finish_video_attempt(&attempt);
                    return Err(e);
                }
            };
            if attempt.token.is_cancelled() {
                self.transition(&attempt, video_id, TranslationState::Aborted);
                return Ok(None);
            }

            match result.check_ready() {
                Ok(()) => {
                    info!(video_id, "Translation ready");
                    self.transition(&attempt, video_id, TranslationState::Success);
                    if let Some(url) = &result.url {
                        self.events.emit_lossy(VotEvent::TranslationReady {
                            video_id: video_id.to_string(),
                            url: url.clone(),
                            from_cache: false,
                            timestamp: vot_common::time::now(),
                        });
                    }
                    self.finish_video_attempt(&attempt);
                    return Ok(Some(result));
                }
                Err(Error::ServerBusy { remaining_time }) => {
                    let delay = self.retry_delay();
                    let message = result
                        .message
                        .clone()
                        .unwrap_or_else(|| pending_message(self.localizer.as_ref(), remaining_time));
                    info!(
                        video_id,
                        remaining_time,
                        retry_in_ms = delay.as_millis() as u64,
                        "Translation pending"
                    );
                    self.transition(&attempt, video_id, TranslationState::Pending);
                    self.events.emit_lossy(VotEvent::TranslationRetryScheduled {
                        video_id: video_id.to_string(),
                        remaining_time_secs: remaining_time,
                        retry_in_ms: delay.as_millis() as u64,
                        message,
                        timestamp: vot_common::time::now(),
                    });

                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = attempt.token.cancelled() => {
                            debug!(video_id, "Pending translation cancelled");
                            self.transition(&attempt, video_id, TranslationState::Aborted);
                            return Ok(None);
                        }
                    }
                }
                Err(e) => {
                    self.transition(&attempt, video_id, TranslationState::Error);
                    self.finish_video_attempt(&attempt);
                    return Err(e);
                }
            }
        }
    }

    /// `translate_video` behind the session's TTL cache
    ///
    /// A live cache entry answers without any network call; a fresh terminal
    /// success is stored for `cache_ttl`.
    pub async fn translate_cached(
        &self,
        request: &TranslationRequest,
    ) -> Result<Option<TranslationResult>> {
        let key = cache_key(request);

        if !request.bypass_cache {
            let hit = self.lock().translations.get(&key);
            if let Some(cached) = hit {
                info!(video_id = %key.video_id, "Translation served from cache");
                let attempt = self.begin_video_attempt();
                self.transition(&attempt, &key.video_id, TranslationState::Requesting);
                self.transition(&attempt, &key.video_id, TranslationState::Success);
                self.finish_video_attempt(&attempt);
                self.events.emit_lossy(VotEvent::TranslationReady {
                    video_id: key.video_id.clone(),
                    url: cached.url.clone(),
                    from_cache: true,
                    timestamp: vot_common::time::now(),
                });
                return Ok(Some(TranslationResult {
                    url: Some(cached.url),
                    remaining_time_secs: 0,
                    translated: true,
                    message: None,
                    translation_id: cached.translation_id,
                    duration_secs: cached.duration_secs,
                    from_cache: true,
                }));
            }
        }

        let result = self.translate_video(request).await?;
        if let Some(result) = &result {
            if let (true, Some(url)) = (result.is_terminal_success(), &result.url) {
                let expires_at = self.lock().translations.insert(
                    key.clone(),
                    CachedTranslation {
                        url: url.clone(),
                        duration_secs: result.duration_secs,
                        translation_id: result.translation_id.clone(),
                    },
                );
                debug!(video_id = %key.video_id, %expires_at, "Translation cached");
            }
        }
        Ok(result)
    }

    /// Parsed cues for `track`, cached under the translation key of `request`
    ///
    /// The key holds one track at a time; asking for a different track
    /// refetches and replaces the entry.
    pub async fn fetch_subtitles_cached(
        &self,
        request: &TranslationRequest,
        track: &SubtitleTrack,
    ) -> Result<SubtitleDocument> {
        let key = cache_key(request);
        match self.cached_subtitles(&key) {
            Some(cached) if cached.source_url == track.url => return Ok(cached.document),
            Some(cached) => {
                debug!(
                    video_id = %key.video_id,
                    old = %cached.source_url,
                    new = %track.url,
                    "Subtitle track changed"
                );
            }
            None => {}
        }

        let document = self.subtitles.fetch_subtitles(track).await?;
        self.lock().subtitle_cache.insert(
            key,
            CachedSubtitles {
                source_url: track.url.clone(),
                document: document.clone(),
            },
        );
        Ok(document)
    }

    pub fn cached_subtitles(&self, key: &CacheKey) -> Option<CachedSubtitles> {
        self.lock().subtitle_cache.get(key)
    }

    /// Start a live stream translation
    ///
    /// Any running stream session is stopped first. Returns `Ok(None)` when
    /// aborted; on success the keepalive runs until `stop_stream`/`release`.
    pub async fn translate_stream(
        &self,
        video: &VideoDescriptor,
        request_lang: &str,
        response_lang: &str,
    ) -> Result<Option<StreamResult>> {
        let attempt = self.begin_stream_attempt();
        let video_id = video.video_id.as_str();

        loop {
            if attempt.token.is_cancelled() {
                self.stream_transition(&attempt, video_id, StreamState::Aborted);
                return Ok(None);
            }
            if let Err(e) = self.check_identity(video_id) {
                debug!(video_id, error = %e, "Stream translation aborted");
                self.stream_transition(&attempt, video_id, StreamState::Aborted);
                return Ok(None);
            }

            self.stream_transition(&attempt, video_id, StreamState::Requesting);
            let result = match self
                .client
                .translate_stream(video, request_lang, response_lang)
                .await
            {
                Ok(result) => result,
                Err(e) => {
                    warn!(video_id, error = %e, "Stream translation request failed");
                    self.stream_transition(&attempt, video_id, StreamState::Error);
                    return Err(e);
                }
            };
            if attempt.token.is_cancelled() {
                self.stream_transition(&attempt, video_id, StreamState::Aborted);
                return Ok(None);
            }

            if !result.translated
                && StreamInterval::from_secs(result.interval_secs) == Some(StreamInterval::Translating)
            {
                let delay = Duration::from_millis(result.interval_secs as u64 * 1000);
                info!(video_id, retry_in_ms = delay.as_millis() as u64, "Stream translation pending");
                self.stream_transition(&attempt, video_id, StreamState::Pending);

                tokio::select! {
                    _ = tokio::time::sleep(delay) => continue,
                    _ = attempt.token.cancelled() => {
                        self.stream_transition(&attempt, video_id, StreamState::Aborted);
                        return Ok(None);
                    }
                }
            }

            if let Some(key) = &result.message {
                self.stream_transition(&attempt, video_id, StreamState::Error);
                return Err(Error::Server(self.localizer.lookup(key)));
            }
            let url = match (&result.url, result.translated) {
                (Some(url), true) => url.clone(),
                _ => {
                    self.stream_transition(&attempt, video_id, StreamState::Error);
                    return Err(Error::AudioNotReceived);
                }
            };

            let session = StreamSession::start(
                self.client.clone(),
                result.ping_id,
                Duration::from_secs(result.interval_secs.max(1) as u64),
                url,
                self.events.clone(),
            );
            info!(
                video_id,
                ping_id = result.ping_id,
                interval_secs = result.interval_secs,
                "Stream translation running"
            );
            {
                let mut inner = self.lock();
                if !is_current(&inner.stream_attempt, &attempt) {
                    // A newer attempt took over while we were starting
                    return Ok(None);
                }
                inner.stream = Some(session);
            }
            self.stream_transition(&attempt, video_id, StreamState::Running);
            return Ok(Some(result));
        }
    }

    /// Ping id and interval of the running stream session
    pub fn stream_session_info(&self) -> Option<(i32, Duration)> {
        self.lock()
            .stream
            .as_ref()
            .map(|session| (session.ping_id(), session.interval()))
    }

    /// Stop the stream keepalive; no ping is sent afterwards
    pub fn stop_stream(&self) {
        let (session, stopped) = {
            let mut inner = self.lock();
            if let Some(attempt) = inner.stream_attempt.take() {
                attempt.token.cancel();
            }
            let session = inner.stream.take();
            let old_state = inner.stream_state;
            let active = matches!(
                old_state,
                StreamState::Requesting | StreamState::Pending | StreamState::Running
            );
            if active || session.is_some() {
                inner.stream_state = StreamState::Stopped;
                (session, Some((old_state, inner.stream_video_id.clone())))
            } else {
                (session, None)
            }
        };

        if let Some(session) = session {
            info!(ping_id = session.ping_id(), "Stream translation stopped");
            drop(session);
        }
        if let Some((old_state, video_id)) = stopped {
            self.events.emit_lossy(VotEvent::StreamStateChanged {
                video_id,
                old_state,
                new_state: StreamState::Stopped,
                timestamp: vot_common::time::now(),
            });
        }
    }

    /// Cancel the pending on-demand retry, if any
    pub fn cancel(&self) {
        let aborted = {
            let mut inner = self.lock();
            match inner.video_attempt.take() {
                Some(attempt) => {
                    debug!(attempt = attempt.id, "Cancelling translation attempt");
                    attempt.token.cancel();
                    let old_state = inner.state;
                    if old_state.is_terminal() || old_state == TranslationState::Idle {
                        None
                    } else {
                        inner.state = TranslationState::Aborted;
                        Some((old_state, inner.video_id.clone()))
                    }
                }
                None => None,
            }
        };
        if let Some((old_state, video_id)) = aborted {
            self.events.emit_lossy(VotEvent::TranslationStateChanged {
                video_id,
                old_state,
                new_state: TranslationState::Aborted,
                timestamp: vot_common::time::now(),
            });
        }
    }

    /// Tear down everything the session owns except the caches
    pub fn release(&self) {
        self.cancel();
        self.stop_stream();
        let mut inner = self.lock();
        inner.subtitles.clear();
        inner.state = TranslationState::Idle;
        inner.stream_state = StreamState::Idle;
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // State stays consistent even if a holder panicked
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_identity(&self, expected: &str) -> Result<()> {
        let actual = self.resolver.current_video_id();
        if actual.as_deref() == Some(expected) {
            Ok(())
        } else {
            Err(Error::VideoIdMismatch {
                expected: expected.to_string(),
                actual,
            })
        }
    }

    fn begin_video_attempt(&self) -> Attempt {
        let mut inner = self.lock();
        if let Some(previous) = inner.video_attempt.take() {
            previous.token.cancel();
        }
        inner.attempt_seq += 1;
        let attempt = Attempt {
            id: inner.attempt_seq,
            token: CancellationToken::new(),
        };
        inner.video_attempt = Some(attempt.clone());
        attempt
    }

    fn finish_video_attempt(&self, attempt: &Attempt) {
        let mut inner = self.lock();
        if is_current(&inner.video_attempt, attempt) {
            inner.video_attempt = None;
        }
    }

    fn begin_stream_attempt(&self) -> Attempt {
        let (previous, attempt) = {
            let mut inner = self.lock();
            if let Some(previous) = inner.stream_attempt.take() {
                previous.token.cancel();
            }
            inner.attempt_seq += 1;
            let attempt = Attempt {
                id: inner.attempt_seq,
                token: CancellationToken::new(),
            };
            inner.stream_attempt = Some(attempt.clone());
            let previous = inner.stream.take().map(|session| {
                let old_state = inner.stream_state;
                inner.stream_state = StreamState::Stopped;
                (session, old_state, inner.stream_video_id.clone())
            });
            (previous, attempt)
        };
        if let Some((session, old_state, video_id)) = previous {
            info!(ping_id = session.ping_id(), "Stopping previous stream session");
            drop(session);
            self.events.emit_lossy(VotEvent::StreamStateChanged {
                video_id,
                old_state,
                new_state: StreamState::Stopped,
                timestamp: vot_common::time::now(),
            });
        }
        attempt
    }

    /// Move the on-demand state machine, ignoring superseded attempts
    fn transition(&self, attempt: &Attempt, video_id: &str, new_state: TranslationState) {
        let old_state = {
            let mut inner = self.lock();
            if !is_current(&inner.video_attempt, attempt) {
                return;
            }
            let old_state = inner.state;
            inner.state = new_state;
            inner.video_id = video_id.to_string();
            old_state
        };
        if old_state != new_state {
            self.events.emit_lossy(VotEvent::TranslationStateChanged {
                video_id: video_id.to_string(),
                old_state,
                new_state,
                timestamp: vot_common::time::now(),
            });
        }
    }

    fn stream_transition(&self, attempt: &Attempt, video_id: &str, new_state: StreamState) {
        let old_state = {
            let mut inner = self.lock();
            if !is_current(&inner.stream_attempt, attempt) {
                return;
            }
            let old_state = inner.stream_state;
            inner.stream_state = new_state;
            inner.stream_video_id = video_id.to_string();
            old_state
        };
        if old_state != new_state {
            self.events.emit_lossy(VotEvent::StreamStateChanged {
                video_id: video_id.to_string(),
                old_state,
                new_state,
                timestamp: vot_common::time::now(),
            });
        }
    }
}

impl Drop for TranslationOrchestrator {
    fn drop(&mut self) {
        let inner = self.lock();
        if let Some(attempt) = &inner.video_attempt {
            attempt.token.cancel();
        }
        if let Some(attempt) = &inner.stream_attempt {
            attempt.token.cancel();
        }
    }
}

fn is_current(slot: &Option<Attempt>, attempt: &Attempt) -> bool {
    slot.as_ref().map(|a| a.id) == Some(attempt.id)
}

fn cache_key(request: &TranslationRequest) -> CacheKey {
    CacheKey::new(
        request.video.video_id.clone(),
        request.request_lang.clone(),
        request.response_lang.clone(),
        request.model_variant,
    )
}

/// Localized "translation will take ..." text for a pending result
pub fn pending_message(localizer: &dyn Localizer, remaining_secs: i32) -> String {
    let minutes = remaining_secs / 60;
    match minutes {
        m if m <= 0 => localizer.lookup("translationTakeFewMinutes"),
        1 => localizer.lookup("translationTakeApproximatelyMinute"),
        m => format_count(
            &localizer.lookup("translationTakeApproximatelyMinutes"),
            i64::from(m),
        ),
    }
}
