//! Running stream translation and its keepalive task

use crate::client::SignedRequestClient;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use vot_common::events::{EventBus, VotEvent};

/// Live stream translation
///
/// Owns the keepalive task. Stopping or dropping the session cancels it; no
/// ping is sent afterwards.
pub struct StreamSession {
    ping_id: i32,
    interval: Duration,
    url: String,
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl StreamSession {
    /// Start pinging `ping_id` every `interval`, first ping one interval from now
    pub fn start(
        client: Arc<SignedRequestClient>,
        ping_id: i32,
        interval: Duration,
        url: String,
        events: EventBus,
    ) -> Self {
        let interval = interval.max(Duration::from_secs(1));
        let token = CancellationToken::new();
        let task_token = token.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = task_token.cancelled() => break,
                    _ = ticker.tick() => {
                        let success = match client.ping_stream(ping_id).await {
                            Ok(()) => {
                                debug!(ping_id, "Stream keepalive sent");
                                true
                            }
                            Err(e) => {
                                warn!(ping_id, error = %e, "Stream keepalive failed");
                                false
                            }
                        };
                        if task_token.is_cancelled() {
                            break;
                        }
                        events.emit_lossy(VotEvent::StreamPing {
                            ping_id,
                            success,
                            timestamp: vot_common::time::now(),
                        });
                    }
                }
            }
            debug!(ping_id, "Stream keepalive stopped");
        });

        Self {
            ping_id,
            interval,
            url,
            token,
            handle: Some(handle),
        }
    }

    pub fn ping_id(&self) -> i32 {
        self.ping_id
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Translated stream playlist
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_running(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Cancel the keepalive and wait for the task to finish
    pub async fn stop(mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for StreamSession {
    fn drop(&mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for StreamSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamSession")
            .field("ping_id", &self.ping_id)
            .field("interval", &self.interval)
            .field("running", &self.is_running())
            .finish()
    }
}
