//! Event types for the VOT event system
//!
//! Components never share an ambient event bus: an `EventBus` is created by
//! whoever owns the playback session and handed to each component at
//! construction time.

mod translation_types;

pub use translation_types::{PlaybackFailure, StreamState, TranslationState};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// VOT event types
///
/// Events are broadcast via `EventBus` and serialize to tagged JSON for
/// consumers that forward them elsewhere (UI layer, logs).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum VotEvent {
    /// On-demand translation state changed
    TranslationStateChanged {
        video_id: String,
        old_state: TranslationState,
        new_state: TranslationState,
        timestamp: DateTime<Utc>,
    },

    /// Backend still processing, a retry has been scheduled
    ///
    /// Triggers:
    /// - UI: show "translation will take N minutes" status
    TranslationRetryScheduled {
        video_id: String,
        /// Remaining processing time reported by the backend (seconds)
        remaining_time_secs: i32,
        /// Delay until the retry fires
        retry_in_ms: u64,
        /// Localized status text
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// Translated audio is available
    TranslationReady {
        video_id: String,
        url: String,
        /// Served from the in-memory cache without a network call
        from_cache: bool,
        timestamp: DateTime<Utc>,
    },

    /// Stream translation state changed
    StreamStateChanged {
        video_id: String,
        old_state: StreamState,
        new_state: StreamState,
        timestamp: DateTime<Utc>,
    },

    /// Stream keepalive ping sent
    StreamPing {
        ping_id: i32,
        success: bool,
        timestamp: DateTime<Utc>,
    },

    /// Secondary audio source failed to start
    AudioPlaybackFailed {
        reason: PlaybackFailure,
        message: String,
        timestamp: DateTime<Utc>,
    },
}

impl VotEvent {
    /// Event name for logging/forwarding
    pub fn event_type(&self) -> &'static str {
        match self {
            VotEvent::TranslationStateChanged { .. } => "TranslationStateChanged",
            VotEvent::TranslationRetryScheduled { .. } => "TranslationRetryScheduled",
            VotEvent::TranslationReady { .. } => "TranslationReady",
            VotEvent::StreamStateChanged { .. } => "StreamStateChanged",
            VotEvent::StreamPing { .. } => "StreamPing",
            VotEvent::AudioPlaybackFailed { .. } => "AudioPlaybackFailed",
        }
    }
}

// ========================================
// EventBus Implementation
// ========================================

/// Event distribution channel for one playback session
///
/// Uses `tokio::broadcast` internally:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Lagged message detection for slow subscribers
///
/// # Examples
///
/// ```
/// use vot_common::events::{EventBus, VotEvent};
///
/// let event_bus = EventBus::new(100);
/// let mut rx = event_bus.subscribe();
///
/// event_bus.emit_lossy(VotEvent::StreamPing {
///     ping_id: 7,
///     success: true,
///     timestamp: chrono::Utc::now(),
/// });
///
/// assert!(matches!(rx.try_recv(), Ok(VotEvent::StreamPing { ping_id: 7, .. })));
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<VotEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<VotEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists,
    /// `Err` if nobody is listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: VotEvent,
    ) -> Result<usize, broadcast::error::SendError<VotEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: VotEvent) {
        let _ = self.tx.send(event);
    }

    /// Current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("capacity", &self.capacity)
            .field("subscribers", &self.tx.receiver_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_without_subscribers_fails() {
        let bus = EventBus::new(10);
        let result = bus.emit(VotEvent::StreamPing {
            ping_id: 1,
            success: true,
            timestamp: Utc::now(),
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_emit_reaches_all_subscribers() {
        let bus = EventBus::new(10);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        let delivered = bus
            .emit(VotEvent::TranslationReady {
                video_id: "abc".to_string(),
                url: "https://audio/x.mp3".to_string(),
                from_cache: false,
                timestamp: Utc::now(),
            })
            .unwrap();
        assert_eq!(delivered, 2);

        for rx in [&mut rx1, &mut rx2] {
            match rx.try_recv().unwrap() {
                VotEvent::TranslationReady { video_id, .. } => assert_eq!(video_id, "abc"),
                other => panic!("Unexpected event: {:?}", other),
            }
        }
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = VotEvent::TranslationStateChanged {
            video_id: "abc".to_string(),
            old_state: TranslationState::Requesting,
            new_state: TranslationState::Pending,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "TranslationStateChanged");
        assert_eq!(json["new_state"], "pending");
        assert_eq!(event.event_type(), "TranslationStateChanged");
    }

    #[test]
    fn test_terminal_translation_states() {
        assert!(TranslationState::Success.is_terminal());
        assert!(TranslationState::Aborted.is_terminal());
        assert!(TranslationState::Error.is_terminal());
        assert!(!TranslationState::Pending.is_terminal());
        assert!(!TranslationState::Requesting.is_terminal());
    }
}
