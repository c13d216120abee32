//! Capture/recording state types.

use std::fmt;

/// The current state of speech capture for a composer.
///
/// Starting is only valid from `Idle` and only when a recognition engine
/// is available; stopping (or a successful submission) returns to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// Not recording, ready to start
    Idle,
    /// A recognition session is live
    Recording,
}

impl CaptureState {
    pub fn is_recording(self) -> bool {
        self == CaptureState::Recording
    }
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureState::Idle => write!(f, "idle"),
            CaptureState::Recording => write!(f, "recording"),
        }
    }
}
