//! Playback sync engine
//!
//! Owns the secondary audio backend of one session and keeps it aligned with
//! the primary video. Primary video events arrive as `SyncMode` values, either
//! through direct `lip_sync` calls or over the channel consumed by `run`.

use super::backend::{AudioBackend, BackendKind, PlayError};
use super::events::{SyncAction, SyncMode, VideoClock};
use crate::config::{rewrite_audio_url, PlaybackSettings};
use crate::{Error, Result};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use vot_common::events::{EventBus, VotEvent};

/// Host handle to the video being translated
pub trait PrimaryVideo: Send + Sync {
    fn clock(&self) -> VideoClock;
    fn volume(&self) -> f64;
    fn set_volume(&self, volume: f64);
}

#[derive(Debug, Default)]
struct Ducking {
    /// Level the original track is lowered to, `None` when disabled
    level: Option<f64>,
    /// Original volume saved while ducked
    saved_volume: Option<f64>,
}

pub struct PlaybackSyncEngine {
    backend: Mutex<Box<dyn AudioBackend>>,
    video: Arc<dyn PrimaryVideo>,
    events: EventBus,
    audio_proxy_host: Option<String>,
    ducking: StdMutex<Ducking>,
}

impl PlaybackSyncEngine {
    pub fn new(
        backend: Box<dyn AudioBackend>,
        video: Arc<dyn PrimaryVideo>,
        events: EventBus,
        settings: &PlaybackSettings,
    ) -> Self {
        Self {
            backend: Mutex::new(backend),
            video,
            events,
            audio_proxy_host: settings.audio_proxy_host.clone(),
            ducking: StdMutex::new(Ducking::default()),
        }
    }

    pub async fn backend_kind(&self) -> BackendKind {
        self.backend.lock().await.kind()
    }

    pub async fn src(&self) -> Option<String> {
        self.backend.lock().await.src()
    }

    pub async fn is_paused(&self) -> bool {
        self.backend.lock().await.is_paused()
    }

    pub async fn volume(&self) -> f64 {
        self.backend.lock().await.volume()
    }

    pub async fn set_volume(&self, volume: f64) {
        self.backend.lock().await.set_volume(volume);
    }

    /// Lower the original track to `level` while translated audio plays
    pub fn set_ducking(&self, level: Option<f64>) {
        let restore = {
            let mut ducking = self.lock_ducking();
            ducking.level = level.map(|l| l.clamp(0.0, 1.0));
            if level.is_none() {
                ducking.saved_volume.take()
            } else {
                None
            }
        };
        if let Some(volume) = restore {
            self.video.set_volume(volume);
        }
    }

    /// Tear down the current source and start `url` in step with the video
    pub async fn load(&self, url: &str) -> Result<()> {
        {
            let mut backend = self.backend.lock().await;
            backend.pause();
            backend.clear();
            backend.set_src(url);
        }
        info!(url, "Translated audio loaded");

        let clock = self.video.clock();
        let mode = if clock.paused {
            SyncMode::Pause
        } else {
            SyncMode::Play
        };
        self.sync_with(mode, clock).await
    }

    /// `load`, retrying once through the audio proxy when the format is rejected
    pub async fn load_with_proxy_fallback(&self, url: &str) -> Result<()> {
        match self.load(url).await {
            Err(Error::AudioFormatUnsupported(reason)) => match &self.audio_proxy_host {
                Some(proxy) => {
                    let proxied = rewrite_audio_url(url, proxy);
                    if proxied == url {
                        return Err(Error::AudioFormatUnsupported(reason));
                    }
                    warn!(url, %proxied, reason = %reason, "Audio rejected, retrying via proxy");
                    self.load(&proxied).await
                }
                None => Err(Error::AudioFormatUnsupported(reason)),
            },
            other => other,
        }
    }

    /// Realign with the primary video and follow its play/pause state
    pub async fn lip_sync(&self, mode: SyncMode) -> Result<()> {
        let clock = self.video.clock();
        self.sync_with(mode, clock).await
    }

    async fn sync_with(&self, mode: SyncMode, clock: VideoClock) -> Result<()> {
        let outcome = {
            let mut backend = self.backend.lock().await;
            if backend.src().is_none() {
                if mode.action() == SyncAction::Halt {
                    backend.pause();
                }
                return Ok(());
            }
            backend.lip_sync(mode, &clock).await
        };
        debug!(?mode, current_time = clock.current_time, rate = clock.playback_rate, "Lip-sync");

        match outcome {
            Ok(()) => {
                match mode.action() {
                    SyncAction::Resume => self.duck(),
                    SyncAction::Halt => self.unduck(),
                    SyncAction::AlignOnly => {}
                }
                Ok(())
            }
            Err(e) => self.handle_play_error(e),
        }
    }

    fn handle_play_error(&self, e: PlayError) -> Result<()> {
        let failure = e.failure();
        let message = e.to_string();
        match e.into_error() {
            Some(error) => {
                warn!(error = %error, "Translated audio failed to play");
                self.events.emit_lossy(VotEvent::AudioPlaybackFailed {
                    reason: failure,
                    message,
                    timestamp: vot_common::time::now(),
                });
                Err(error)
            }
            None => {
                debug!("Play interrupted by pause");
                Ok(())
            }
        }
    }

    /// Consume primary video events until the sender side is dropped
    pub async fn run(&self, mut rx: mpsc::UnboundedReceiver<SyncMode>) {
        while let Some(mode) = rx.recv().await {
            if let Err(e) = self.lip_sync(mode).await {
                debug!(?mode, error = %e, "Lip-sync failed");
            }
        }
        debug!("Sync channel closed");
    }

    /// Spawn `run` on the runtime
    pub fn spawn(self: &Arc<Self>, rx: mpsc::UnboundedReceiver<SyncMode>) -> JoinHandle<()> {
        let engine = Arc::clone(self);
        tokio::spawn(async move { engine.run(rx).await })
    }

    /// Swap in another backend, carrying over source, volume and position
    pub async fn replace_backend(&self, mut replacement: Box<dyn AudioBackend>) -> Result<()> {
        let clock = self.video.clock();
        let src = {
            let mut backend = self.backend.lock().await;
            let src = backend.src();
            replacement.set_volume(backend.volume());
            backend.pause();
            backend.clear();
            if let Some(src) = &src {
                replacement.set_src(src);
            }
            info!(from = ?backend.kind(), to = ?replacement.kind(), "Audio backend replaced");
            *backend = replacement;
            src
        };

        if src.is_some() {
            let mode = if clock.paused {
                SyncMode::Pause
            } else {
                SyncMode::Play
            };
            self.sync_with(mode, clock).await
        } else {
            Ok(())
        }
    }

    /// Pause, detach the source and restore the original volume
    pub async fn release(&self) {
        {
            let mut backend = self.backend.lock().await;
            backend.pause();
            backend.clear();
        }
        self.unduck();
        debug!("Playback released");
    }

    /// `release` without waiting for the backend lock
    ///
    /// Returns `false` when the backend is busy and nothing was torn down.
    pub fn try_release(&self) -> bool {
        match self.backend.try_lock() {
            Ok(mut backend) => {
                backend.pause();
                backend.clear();
            }
            Err(_) => return false,
        }
        self.unduck();
        debug!("Playback released");
        true
    }

    fn lock_ducking(&self) -> std::sync::MutexGuard<'_, Ducking> {
        self.ducking.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn duck(&self) {
        let mut ducking = self.lock_ducking();
        if let (Some(level), None) = (ducking.level, ducking.saved_volume) {
            let original = self.video.volume();
            ducking.saved_volume = Some(original);
            self.video.set_volume(original * level);
        }
    }

    fn unduck(&self) {
        let saved = self.lock_ducking().saved_volume.take();
        if let Some(volume) = saved {
            self.video.set_volume(volume);
        }
    }
}
