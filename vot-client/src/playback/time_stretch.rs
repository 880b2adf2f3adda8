//! Backend over a pitch-preserving granular player

use super::backend::{AudioBackend, BackendKind, GranularPlayer, PlayError};
use super::events::VideoClock;
use async_trait::async_trait;

/// Gain floor; anything at or below is treated as silence
pub const MIN_GAIN_DB: f64 = -96.0;

pub fn amplitude_to_db(amplitude: f64) -> f64 {
    if amplitude.is_nan() || amplitude <= 0.0 {
        return MIN_GAIN_DB;
    }
    (20.0 * amplitude.log10()).max(MIN_GAIN_DB)
}

pub fn db_to_amplitude(db: f64) -> f64 {
    if db <= MIN_GAIN_DB {
        0.0
    } else {
        10f64.powf(db / 20.0)
    }
}

/// Rate changes alter tempo only, never pitch
pub struct TimeStretchBackend {
    player: Box<dyn GranularPlayer>,
    max_boost: f64,
}

impl TimeStretchBackend {
    pub fn new(player: Box<dyn GranularPlayer>, max_boost: f64) -> Self {
        Self {
            player,
            max_boost: max_boost.max(1.0),
        }
    }
}

#[async_trait]
impl AudioBackend for TimeStretchBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::TimeStretch
    }

    async fn play(&mut self) -> Result<(), PlayError> {
        self.player.play().await
    }

    fn pause(&mut self) {
        self.player.pause();
    }

    fn is_paused(&self) -> bool {
        self.player.is_paused()
    }

    fn clear(&mut self) {
        self.player.pause();
        self.player.set_src(None);
    }

    fn volume(&self) -> f64 {
        db_to_amplitude(self.player.gain_db())
    }

    fn set_volume(&mut self, volume: f64) {
        let volume = if volume.is_finite() { volume } else { 0.0 };
        self.player
            .set_gain_db(amplitude_to_db(volume.clamp(0.0, self.max_boost)));
    }

    fn src(&self) -> Option<String> {
        self.player.src()
    }

    fn set_src(&mut self, url: &str) {
        self.player.set_src(Some(url.to_string()));
    }

    fn current_time(&self) -> f64 {
        self.player.position()
    }

    fn playback_rate(&self) -> f64 {
        self.player.tempo()
    }

    fn align(&mut self, clock: &VideoClock) {
        self.player.seek(clock.current_time);
        self.player.set_tempo(clock.playback_rate);
    }
}
