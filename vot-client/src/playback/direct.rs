//! Backend over a plain media element

use super::backend::{AudioBackend, BackendKind, GainNode, MediaElement, PlayError};
use super::events::VideoClock;
use async_trait::async_trait;

/// Plays through the element itself
///
/// Without an audio graph the element's own volume is used (0..=1). With a
/// gain node the element stays at full volume and the gain carries the level,
/// which allows boosting up to `max_boost`.
pub struct DirectBackend {
    element: Box<dyn MediaElement>,
    gain: Option<Box<dyn GainNode>>,
    max_boost: f64,
}

impl DirectBackend {
    pub fn new(element: Box<dyn MediaElement>) -> Self {
        Self {
            element,
            gain: None,
            max_boost: 1.0,
        }
    }

    pub fn with_gain(mut element: Box<dyn MediaElement>, gain: Box<dyn GainNode>, max_boost: f64) -> Self {
        element.set_volume(1.0);
        Self {
            element,
            gain: Some(gain),
            max_boost: max_boost.max(1.0),
        }
    }

    pub fn has_gain(&self) -> bool {
        self.gain.is_some()
    }
}

#[async_trait]
impl AudioBackend for DirectBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Direct
    }

    async fn play(&mut self) -> Result<(), PlayError> {
        self.element.play().await
    }

    fn pause(&mut self) {
        self.element.pause();
    }

    fn is_paused(&self) -> bool {
        self.element.is_paused()
    }

    fn clear(&mut self) {
        self.element.pause();
        self.element.set_src(None);
    }

    fn volume(&self) -> f64 {
        match &self.gain {
            Some(gain) => gain.gain(),
            None => self.element.volume(),
        }
    }

    fn set_volume(&mut self, volume: f64) {
        let volume = if volume.is_finite() { volume } else { 0.0 };
        match &mut self.gain {
            Some(gain) => gain.set_gain(volume.clamp(0.0, self.max_boost)),
            None => self.element.set_volume(volume.clamp(0.0, 1.0)),
        }
    }

    fn src(&self) -> Option<String> {
        self.element.src()
    }

    fn set_src(&mut self, url: &str) {
        self.element.set_src(Some(url.to_string()));
    }

    fn current_time(&self) -> f64 {
        self.element.current_time()
    }

    fn playback_rate(&self) -> f64 {
        self.element.playback_rate()
    }

    fn align(&mut self, clock: &VideoClock) {
        self.element.set_current_time(clock.current_time);
        self.element.set_playback_rate(clock.playback_rate);
    }
}
