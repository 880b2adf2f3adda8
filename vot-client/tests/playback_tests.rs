//! Integration tests for the playback sync engine and video session

mod helpers;

use helpers::{
    finished, orchestrator_for, FakeElement, FakeGain, FakePlayer, FakeVideo, MockTransport,
};
use std::sync::Arc;
use std::time::Duration;
use vot_client::config::PlaybackSettings;
use vot_client::models::{TranslationRequest, VideoDescriptor};
use vot_client::playback::time_stretch::amplitude_to_db;
use vot_client::playback::{
    AudioBackend, BackendKind, DirectBackend, PlayError, PlaybackSyncEngine, PrimaryVideo, SyncMode,
    TimeStretchBackend, VideoClock,
};
use vot_client::{Error, VideoSession};
use vot_common::events::{EventBus, PlaybackFailure, VotEvent};

const AUDIO_URL: &str = "https://vtrans.test/tts/prod/a.mp3";

fn settings(proxy: Option<&str>) -> PlaybackSettings {
    PlaybackSettings {
        audio_proxy_host: proxy.map(str::to_string),
        max_volume_boost: 4.0,
        ducking_level: 0.15,
    }
}

fn engine_with(
    video: Arc<FakeVideo>,
    proxy: Option<&str>,
) -> (PlaybackSyncEngine, helpers::media::SharedState, EventBus) {
    let (element, state) = FakeElement::new();
    let events = EventBus::new(16);
    let engine = PlaybackSyncEngine::new(
        Box::new(DirectBackend::new(Box::new(element))),
        video,
        events.clone(),
        &settings(proxy),
    );
    (engine, state, events)
}

#[tokio::test]
async fn test_load_follows_playing_video() {
    let video = FakeVideo::playing_at(12.5, 1.5);
    let (engine, state, _events) = engine_with(video, None);

    engine.load(AUDIO_URL).await.unwrap();

    let state = state.lock().unwrap();
    assert_eq!(state.src.as_deref(), Some(AUDIO_URL));
    assert_eq!(state.position, 12.5);
    assert_eq!(state.rate, 1.5);
    assert!(!state.paused);
    assert_eq!(state.play_calls, 1);
}

#[tokio::test]
async fn test_load_with_paused_video_stays_paused() {
    let video = FakeVideo::new(VideoClock {
        current_time: 40.0,
        playback_rate: 1.0,
        paused: true,
    });
    let (engine, state, _events) = engine_with(video, None);

    engine.load(AUDIO_URL).await.unwrap();

    let state = state.lock().unwrap();
    assert!(state.paused);
    assert_eq!(state.position, 40.0);
    assert_eq!(state.play_calls, 0);
}

#[tokio::test]
async fn test_pause_modes_always_pause() {
    let video = FakeVideo::playing_at(0.0, 1.0);
    let (engine, state, _events) = engine_with(video.clone(), None);
    engine.load(AUDIO_URL).await.unwrap();

    for mode in [SyncMode::Pause, SyncMode::Stop, SyncMode::Waiting] {
        state.lock().unwrap().paused = false;
        engine.lip_sync(mode).await.unwrap();
        assert!(engine.is_paused().await, "{:?} should pause", mode);
    }

    // Seeking while playing realigns position and rate, then resumes
    video.set_clock(VideoClock {
        current_time: 90.0,
        playback_rate: 1.75,
        paused: false,
    });
    engine.lip_sync(SyncMode::Playing).await.unwrap();
    assert!(!engine.is_paused().await);
    let state = state.lock().unwrap();
    assert_eq!(state.position, 90.0);
    assert_eq!(state.rate, 1.75);
}

#[tokio::test]
async fn test_time_stretch_follows_seek_and_rate() {
    let video = FakeVideo::playing_at(0.0, 1.0);
    let (player, state) = FakePlayer::new();
    let engine = PlaybackSyncEngine::new(
        Box::new(TimeStretchBackend::new(Box::new(player), 4.0)),
        video.clone(),
        EventBus::new(16),
        &settings(None),
    );
    engine.load(AUDIO_URL).await.unwrap();

    video.set_clock(VideoClock {
        current_time: 64.5,
        playback_rate: 0.5,
        paused: false,
    });
    engine.lip_sync(SyncMode::Playing).await.unwrap();
    {
        let state = state.lock().unwrap();
        assert_eq!(state.position, 64.5);
        assert_eq!(state.rate, 0.5);
        assert!(!state.paused);
    }

    // A rate change alone realigns without pausing
    video.set_clock(VideoClock {
        current_time: 70.0,
        playback_rate: 1.25,
        paused: false,
    });
    engine.lip_sync(SyncMode::RateChange).await.unwrap();
    let state = state.lock().unwrap();
    assert_eq!(state.position, 70.0);
    assert_eq!(state.rate, 1.25);
    assert!(!state.paused);
}

#[tokio::test]
async fn test_pause_without_source_still_pauses() {
    let video = FakeVideo::playing_at(0.0, 1.0);
    let (engine, state, _events) = engine_with(video, None);
    state.lock().unwrap().paused = false;

    engine.lip_sync(SyncMode::Pause).await.unwrap();
    assert!(state.lock().unwrap().paused);

    // Nothing to resume without a source
    engine.lip_sync(SyncMode::Play).await.unwrap();
    assert_eq!(state.lock().unwrap().play_calls, 0);
}

#[tokio::test]
async fn test_gesture_required_is_permission_denied() {
    let video = FakeVideo::playing_at(0.0, 1.0);
    let (engine, state, events) = engine_with(video, None);
    let mut rx = events.subscribe();
    state
        .lock()
        .unwrap()
        .play_results
        .push_back(Err(PlayError::NotAllowed("user gesture required".to_string())));

    let result = engine.load(AUDIO_URL).await;

    assert!(matches!(result, Err(Error::PermissionDenied)));
    match rx.try_recv().unwrap() {
        VotEvent::AudioPlaybackFailed { reason, .. } => {
            assert_eq!(reason, PlaybackFailure::PermissionDenied)
        }
        other => panic!("Unexpected event: {:?}", other),
    }
}

#[tokio::test]
async fn test_interrupted_play_is_not_an_error() {
    let video = FakeVideo::playing_at(0.0, 1.0);
    let (engine, state, events) = engine_with(video, None);
    let mut rx = events.subscribe();
    state.lock().unwrap().play_results.push_back(Err(PlayError::Aborted));

    engine.load(AUDIO_URL).await.unwrap();
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_unsupported_audio_retries_through_proxy() {
    let video = FakeVideo::playing_at(0.0, 1.0);
    let (engine, state, _events) = engine_with(video, Some("proxy.test"));
    state
        .lock()
        .unwrap()
        .play_results
        .push_back(Err(PlayError::NotSupported("blocked".to_string())));

    engine.load_with_proxy_fallback(AUDIO_URL).await.unwrap();

    let state = state.lock().unwrap();
    assert_eq!(
        state.src.as_deref(),
        Some("https://proxy.test/video-translation/audio-proxy/tts/prod/a.mp3")
    );
    assert_eq!(state.play_calls, 2);
    assert!(!state.paused);
}

#[tokio::test]
async fn test_unsupported_audio_without_proxy_fails() {
    let video = FakeVideo::playing_at(0.0, 1.0);
    let (engine, state, _events) = engine_with(video, None);
    state
        .lock()
        .unwrap()
        .play_results
        .push_back(Err(PlayError::NotSupported("blocked".to_string())));

    assert!(matches!(
        engine.load_with_proxy_fallback(AUDIO_URL).await,
        Err(Error::AudioFormatUnsupported(_))
    ));
}

#[tokio::test]
async fn test_ducking_follows_play_state() {
    let video = FakeVideo::playing_at(0.0, 1.0);
    video.set_volume(0.8);
    let (engine, _state, _events) = engine_with(video.clone(), None);
    engine.set_ducking(Some(0.25));

    engine.load(AUDIO_URL).await.unwrap();
    assert!((video.volume() - 0.2).abs() < 1e-9);

    engine.lip_sync(SyncMode::Pause).await.unwrap();
    assert!((video.volume() - 0.8).abs() < 1e-9);

    engine.lip_sync(SyncMode::Play).await.unwrap();
    engine.release().await;
    assert!((video.volume() - 0.8).abs() < 1e-9);
    assert!(engine.src().await.is_none());
}

#[test]
fn test_gain_node_allows_boost() {
    let (element, state) = FakeElement::new();
    let (gain, gain_value) = FakeGain::new();
    let mut backend = DirectBackend::with_gain(Box::new(element), Box::new(gain), 2.0);
    backend.set_volume(3.0);
    assert_eq!(*gain_value.lock().unwrap(), 2.0);
    assert_eq!(state.lock().unwrap().volume, 1.0);

    let (plain_element, plain_state) = FakeElement::new();
    let mut plain = DirectBackend::new(Box::new(plain_element));
    plain.set_volume(3.0);
    assert_eq!(plain_state.lock().unwrap().volume, 1.0);
}

#[tokio::test]
async fn test_replace_backend_carries_source_and_volume() {
    let video = FakeVideo::playing_at(30.0, 2.0);
    let (engine, element_state, _events) = engine_with(video, None);
    engine.load(AUDIO_URL).await.unwrap();
    engine.set_volume(0.5).await;

    let (player, player_state) = FakePlayer::new();
    engine
        .replace_backend(Box::new(TimeStretchBackend::new(Box::new(player), 4.0)))
        .await
        .unwrap();

    assert_eq!(engine.backend_kind().await, BackendKind::TimeStretch);
    assert!(element_state.lock().unwrap().src.is_none());

    let player_state = player_state.lock().unwrap();
    assert_eq!(player_state.src.as_deref(), Some(AUDIO_URL));
    assert!((player_state.gain_db - amplitude_to_db(0.5)).abs() < 1e-9);
    assert_eq!(player_state.position, 30.0);
    // Tempo follows the video rate without touching pitch
    assert_eq!(player_state.rate, 2.0);
    assert!(!player_state.paused);
}

#[tokio::test(start_paused = true)]
async fn test_video_session_plays_translation() {
    let transport = MockTransport::new();
    transport.reply_message("/video-translation/translate", &finished(AUDIO_URL));
    let (orchestrator, _resolver, _events) = orchestrator_for(&transport, "abc");
    let video = FakeVideo::playing_at(5.0, 1.0);
    let (engine, state, _engine_events) = engine_with(video, None);
    let session = VideoSession::start(orchestrator, Arc::new(engine));

    let descriptor = VideoDescriptor::new("abc", "https://youtu.be/abc");
    let request = TranslationRequest::for_video(descriptor, false);
    let result = session.translate_and_play(&request).await.unwrap().unwrap();
    assert_eq!(result.url.as_deref(), Some(AUDIO_URL));
    assert!(!state.lock().unwrap().paused);

    session.notify(SyncMode::Pause);
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(state.lock().unwrap().paused);

    session.release().await;
    assert!(state.lock().unwrap().src.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_video_session_plays_stream() {
    let transport = MockTransport::new();
    transport.reply_message(
        "/stream-translation/translate-stream",
        &helpers::stream_live("https://stream.test/live.m3u8", 11),
    );
    transport.reply_body("/stream-translation/ping-stream", &[]);
    let (orchestrator, _resolver, _events) = orchestrator_for(&transport, "live1");
    let (engine, state, _engine_events) = engine_with(FakeVideo::playing_at(0.0, 1.0), None);
    let session = VideoSession::start(orchestrator, Arc::new(engine));

    let descriptor = VideoDescriptor::new("live1", "https://youtu.be/live1");
    assert!(session.stream_and_play(&descriptor, "en", "ru").await.unwrap());
    assert_eq!(
        state.lock().unwrap().src.as_deref(),
        Some("https://stream.test/live.m3u8")
    );

    tokio::time::sleep(Duration::from_secs(25)).await;
    assert_eq!(transport.count("/stream-translation/ping-stream"), 1);

    session.release().await;
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(transport.count("/stream-translation/ping-stream"), 1);
}

#[tokio::test]
async fn test_dropped_session_stops_audio() {
    let transport = MockTransport::new();
    transport.reply_message("/video-translation/translate", &finished(AUDIO_URL));
    let (orchestrator, _resolver, _events) = orchestrator_for(&transport, "abc");
    let video = FakeVideo::playing_at(5.0, 1.0);
    video.set_volume(0.8);
    let (engine, state, _engine_events) = engine_with(video.clone(), None);
    engine.set_ducking(Some(0.5));
    let session = VideoSession::start(orchestrator.clone(), Arc::new(engine));

    let descriptor = VideoDescriptor::new("abc", "https://youtu.be/abc");
    let request = TranslationRequest::for_video(descriptor, false);
    session.translate_and_play(&request).await.unwrap().unwrap();
    assert!(!state.lock().unwrap().paused);
    assert!((video.volume() - 0.4).abs() < 1e-9);

    drop(session);

    let state = state.lock().unwrap();
    assert!(state.paused);
    assert!(state.src.is_none());
    assert!((video.volume() - 0.8).abs() < 1e-9);
    assert!(orchestrator.subtitles().is_empty());
}
