//! Primary video events that drive lip-sync

use crate::Error;
use std::str::FromStr;

/// Playback event observed on the primary video
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    Play,
    Playing,
    Pause,
    Stop,
    Waiting,
    RateChange,
    Seeked,
}

/// What the secondary source does after realigning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    Resume,
    Halt,
    AlignOnly,
}

impl SyncMode {
    pub fn action(&self) -> SyncAction {
        match self {
            SyncMode::Play | SyncMode::Playing => SyncAction::Resume,
            SyncMode::Pause | SyncMode::Stop | SyncMode::Waiting => SyncAction::Halt,
            SyncMode::RateChange | SyncMode::Seeked => SyncAction::AlignOnly,
        }
    }
}

impl FromStr for SyncMode {
    type Err = Error;

    /// Accepts DOM media event names
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "play" => Ok(SyncMode::Play),
            "playing" => Ok(SyncMode::Playing),
            "pause" => Ok(SyncMode::Pause),
            "stop" | "ended" => Ok(SyncMode::Stop),
            "waiting" => Ok(SyncMode::Waiting),
            "ratechange" => Ok(SyncMode::RateChange),
            "seeked" => Ok(SyncMode::Seeked),
            other => Err(Error::Playback(format!("Unknown media event: {}", other))),
        }
    }
}

/// Position, rate and pause state of the primary video
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoClock {
    /// Seconds
    pub current_time: f64,
    pub playback_rate: f64,
    pub paused: bool,
}

impl Default for VideoClock {
    fn default() -> Self {
        Self {
            current_time: 0.0,
            playback_rate: 1.0,
            paused: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_actions() {
        assert_eq!(SyncMode::Playing.action(), SyncAction::Resume);
        assert_eq!(SyncMode::Waiting.action(), SyncAction::Halt);
        assert_eq!(SyncMode::Seeked.action(), SyncAction::AlignOnly);
    }

    #[test]
    fn test_parse_event_names() {
        assert_eq!("ratechange".parse::<SyncMode>().unwrap(), SyncMode::RateChange);
        assert_eq!("ended".parse::<SyncMode>().unwrap(), SyncMode::Stop);
        assert!("volumechange".parse::<SyncMode>().is_err());
    }
}
