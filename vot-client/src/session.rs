//! One playback session: orchestrator and sync engine scoped together

use crate::models::{TranslationRequest, TranslationResult, VideoDescriptor};
use crate::orchestrator::TranslationOrchestrator;
use crate::playback::{PlaybackSyncEngine, SyncMode};
use crate::Result;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Wires translation results into playback for a single video
///
/// Dropping or releasing the session cancels pending retries, stops the stream
/// keepalive and tears down the secondary audio source.
pub struct VideoSession {
    orchestrator: Arc<TranslationOrchestrator>,
    engine: Arc<PlaybackSyncEngine>,
    sync_tx: mpsc::UnboundedSender<SyncMode>,
    sync_task: JoinHandle<()>,
}

impl VideoSession {
    /// Start the session; the sync loop runs until `release`
    pub fn start(orchestrator: Arc<TranslationOrchestrator>, engine: Arc<PlaybackSyncEngine>) -> Self {
        let (sync_tx, sync_rx) = mpsc::unbounded_channel();
        let sync_task = engine.spawn(sync_rx);
        Self {
            orchestrator,
            engine,
            sync_tx,
            sync_task,
        }
    }

    pub fn orchestrator(&self) -> &Arc<TranslationOrchestrator> {
        &self.orchestrator
    }

    pub fn engine(&self) -> &Arc<PlaybackSyncEngine> {
        &self.engine
    }

    /// Forward a primary video event to the sync loop
    pub fn notify(&self, mode: SyncMode) {
        // Only fails after release, when there is nothing left to sync
        let _ = self.sync_tx.send(mode);
    }

    /// Sender for hosts that feed video events from elsewhere
    pub fn sync_sender(&self) -> mpsc::UnboundedSender<SyncMode> {
        self.sync_tx.clone()
    }

    /// Translate (cache first) and load the result into the sync engine
    ///
    /// `Ok(None)` when the translation was aborted.
    pub async fn translate_and_play(
        &self,
        request: &TranslationRequest,
    ) -> Result<Option<TranslationResult>> {
        let result = match self.orchestrator.translate_cached(request).await? {
            Some(result) => result,
            None => return Ok(None),
        };

        if let Some(url) = &result.url {
            self.engine.load_with_proxy_fallback(url).await?;
        }
        Ok(Some(result))
    }

    /// Start a stream translation and play its playlist
    pub async fn stream_and_play(
        &self,
        video: &VideoDescriptor,
        request_lang: &str,
        response_lang: &str,
    ) -> Result<bool> {
        let result = self
            .orchestrator
            .translate_stream(video, request_lang, response_lang)
            .await?;
        match result.and_then(|r| r.url) {
            Some(url) => {
                self.engine.load(&url).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Release orchestrator and playback together
    pub async fn release(self) {
        self.orchestrator.release();
        self.engine.release().await;
        self.sync_task.abort();
        info!("Video session released");
    }
}

impl Drop for VideoSession {
    fn drop(&mut self) {
        self.orchestrator.release();
        self.sync_task.abort();
        if self.engine.try_release() {
            return;
        }
        // Backend busy mid-sync; finish the teardown once it is free
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let engine = Arc::clone(&self.engine);
            handle.spawn(async move { engine.release().await });
        } else {
            warn!("Video session dropped outside a runtime with its backend busy");
        }
    }
}
