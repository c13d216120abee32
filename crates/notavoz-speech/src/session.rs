//! Session handle and event types.

use crate::transcript::TranscriptSegment;

/// Events delivered by a live recognition session.
#[derive(Debug, Clone)]
pub enum RecognitionEvent {
    /// Every transcript segment accumulated since the session started, in
    /// arrival order. Each event supersedes the previous one, so consumers
    /// replace rather than append.
    Results(Vec<TranscriptSegment>),
    /// A runtime error inside the session. Diagnostic only; the session may
    /// keep running.
    Error(String),
}

/// Callback invoked with each session event.
pub type EventHandler = Box<dyn FnMut(RecognitionEvent) + Send>;

/// Owned handle to a live recognition session.
///
/// The handle is the only way to stop the session it came from, which keeps
/// sessions per-owner: replacing the handle with a new one drops, and
/// thereby stops, the previous session instead of leaking it. Stopping is
/// idempotent and non-blocking.
pub struct RecognitionSession {
    stopper: Option<Box<dyn FnOnce() + Send>>,
}

impl RecognitionSession {
    /// Wraps the engine-specific stop action.
    pub fn new(stopper: Box<dyn FnOnce() + Send>) -> Self {
        Self {
            stopper: Some(stopper),
        }
    }

    /// Signals the session to end. Later calls are no-ops.
    pub fn stop(&mut self) {
        if let Some(stop) = self.stopper.take() {
            stop();
        }
    }

    /// Whether stop has been requested yet.
    pub fn is_active(&self) -> bool {
        self.stopper.is_some()
    }
}

impl Drop for RecognitionSession {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    fn counting_session() -> (RecognitionSession, Arc<AtomicUsize>) {
        let stops = Arc::new(AtomicUsize::new(0));
        let counter = stops.clone();
        let session = RecognitionSession::new(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        (session, stops)
    }

    #[test]
    fn test_stop_is_idempotent() {
        let (mut session, stops) = counting_session();
        assert!(session.is_active());

        session.stop();
        session.stop();

        assert!(!session.is_active());
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_stops_the_session() {
        let (session, stops) = counting_session();
        drop(session);
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_after_stop_does_not_stop_again() {
        let (mut session, stops) = counting_session();
        session.stop();
        drop(session);
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }
}
