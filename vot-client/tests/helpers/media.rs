//! In-memory stand-ins for the host's media handles
//!
//! Each fake shares its state through an `Arc<Mutex<MediaState>>` so a test
//! can inspect it after handing the fake to a backend.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use vot_client::playback::{GainNode, GranularPlayer, MediaElement, PlayError, PrimaryVideo, VideoClock};

#[derive(Debug)]
pub struct MediaState {
    pub paused: bool,
    pub src: Option<String>,
    pub position: f64,
    pub rate: f64,
    pub volume: f64,
    pub gain_db: f64,
    pub play_calls: usize,
    /// Outcomes for upcoming `play` calls; empty means success
    pub play_results: VecDeque<Result<(), PlayError>>,
}

impl Default for MediaState {
    fn default() -> Self {
        Self {
            paused: true,
            src: None,
            position: 0.0,
            rate: 1.0,
            volume: 1.0,
            gain_db: 0.0,
            play_calls: 0,
            play_results: VecDeque::new(),
        }
    }
}

pub type SharedState = Arc<Mutex<MediaState>>;

fn play(state: &SharedState) -> Result<(), PlayError> {
    let mut state = state.lock().unwrap();
    state.play_calls += 1;
    let result = state.play_results.pop_front().unwrap_or(Ok(()));
    if result.is_ok() {
        state.paused = false;
    }
    result
}

pub struct FakeElement {
    pub state: SharedState,
}

impl FakeElement {
    pub fn new() -> (Self, SharedState) {
        let state = SharedState::default();
        (
            Self {
                state: state.clone(),
            },
            state,
        )
    }
}

#[async_trait]
impl MediaElement for FakeElement {
    async fn play(&mut self) -> Result<(), PlayError> {
        play(&self.state)
    }

    fn pause(&mut self) {
        self.state.lock().unwrap().paused = true;
    }

    fn is_paused(&self) -> bool {
        self.state.lock().unwrap().paused
    }

    fn src(&self) -> Option<String> {
        self.state.lock().unwrap().src.clone()
    }

    fn set_src(&mut self, src: Option<String>) {
        self.state.lock().unwrap().src = src;
    }

    fn current_time(&self) -> f64 {
        self.state.lock().unwrap().position
    }

    fn set_current_time(&mut self, secs: f64) {
        self.state.lock().unwrap().position = secs;
    }

    fn playback_rate(&self) -> f64 {
        self.state.lock().unwrap().rate
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.state.lock().unwrap().rate = rate;
    }

    fn volume(&self) -> f64 {
        self.state.lock().unwrap().volume
    }

    fn set_volume(&mut self, volume: f64) {
        self.state.lock().unwrap().volume = volume;
    }
}

pub struct FakeGain {
    pub gain: Arc<Mutex<f64>>,
}

impl FakeGain {
    pub fn new() -> (Self, Arc<Mutex<f64>>) {
        let gain = Arc::new(Mutex::new(1.0));
        (Self { gain: gain.clone() }, gain)
    }
}

impl GainNode for FakeGain {
    fn gain(&self) -> f64 {
        *self.gain.lock().unwrap()
    }

    fn set_gain(&mut self, gain: f64) {
        *self.gain.lock().unwrap() = gain;
    }
}

pub struct FakePlayer {
    pub state: SharedState,
}

impl FakePlayer {
    pub fn new() -> (Self, SharedState) {
        let state = SharedState::default();
        (
            Self {
                state: state.clone(),
            },
            state,
        )
    }
}

#[async_trait]
impl GranularPlayer for FakePlayer {
    async fn play(&mut self) -> Result<(), PlayError> {
        play(&self.state)
    }

    fn pause(&mut self) {
        self.state.lock().unwrap().paused = true;
    }

    fn is_paused(&self) -> bool {
        self.state.lock().unwrap().paused
    }

    fn src(&self) -> Option<String> {
        self.state.lock().unwrap().src.clone()
    }

    fn set_src(&mut self, src: Option<String>) {
        self.state.lock().unwrap().src = src;
    }

    fn position(&self) -> f64 {
        self.state.lock().unwrap().position
    }

    fn seek(&mut self, secs: f64) {
        self.state.lock().unwrap().position = secs;
    }

    fn tempo(&self) -> f64 {
        self.state.lock().unwrap().rate
    }

    fn set_tempo(&mut self, tempo: f64) {
        self.state.lock().unwrap().rate = tempo;
    }

    fn gain_db(&self) -> f64 {
        self.state.lock().unwrap().gain_db
    }

    fn set_gain_db(&mut self, db: f64) {
        self.state.lock().unwrap().gain_db = db;
    }
}

/// Primary video with a settable clock
pub struct FakeVideo {
    clock: Mutex<VideoClock>,
    volume: Mutex<f64>,
}

impl FakeVideo {
    pub fn new(clock: VideoClock) -> Arc<Self> {
        Arc::new(Self {
            clock: Mutex::new(clock),
            volume: Mutex::new(1.0),
        })
    }

    pub fn playing_at(current_time: f64, playback_rate: f64) -> Arc<Self> {
        Self::new(VideoClock {
            current_time,
            playback_rate,
            paused: false,
        })
    }

    pub fn set_clock(&self, clock: VideoClock) {
        *self.clock.lock().unwrap() = clock;
    }
}

impl PrimaryVideo for FakeVideo {
    fn clock(&self) -> VideoClock {
        *self.clock.lock().unwrap()
    }

    fn volume(&self) -> f64 {
        *self.volume.lock().unwrap()
    }

    fn set_volume(&self, volume: f64) {
        *self.volume.lock().unwrap() = volume;
    }
}
