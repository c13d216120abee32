//! Application events for the tao event loop.

use notavoz_core::CaptureState;
use notavoz_speech::RecognitionEvent;

/// Events for the tao event loop.
#[derive(Debug)]
pub enum NotavozEvent {
    /// The capture state has changed
    StateChanged(CaptureState),
    /// A recognition session delivered an event
    Recognition(RecognitionEvent),
}
