//! Speech-recognition capability boundary for notavoz.
//!
//! The note composer never talks to a recognizer directly: it probes a list
//! of candidate [`RecognitionEngine`]s for one that is available, starts a
//! session with fixed settings, and consumes the transcript events the
//! session delivers. Which engine answered is invisible to the caller;
//! presence is all that matters.

mod cloud;
mod session;
mod transcript;

use std::sync::Arc;

pub use cloud::{
    ChunkSource, ChunkTranscriber, CloudEngine, SourceFactory, WhisperApiClient, WhisperApiConfig,
};
pub use session::{EventHandler, RecognitionEvent, RecognitionSession};
use thiserror::Error;
pub use transcript::{combined_transcript, TranscriptSegment};

/// Errors that can occur while providing recognition.
#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("no API key configured")]
    NoApiKey,

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("audio capture failed: {0}")]
    Capture(#[from] notavoz_audio::CaptureError),

    #[error("recognition failed: {0}")]
    RecognitionFailed(String),
}

/// Result type for recognition operations.
pub type Result<T> = std::result::Result<T, SpeechError>;

/// How a recognition session listens and reports.
#[derive(Debug, Clone)]
pub struct RecognitionSettings {
    /// Spoken language (BCP 47 tag)
    pub language: String,
    /// Keep listening across pauses instead of ending after the first phrase
    pub continuous: bool,
    /// Deliver transcripts while the session is still running, not only at
    /// the end
    pub interim_results: bool,
    /// Alternatives requested per segment; only the single best is kept
    pub max_alternatives: u8,
}

impl Default for RecognitionSettings {
    fn default() -> Self {
        Self {
            language: "pt-BR".to_owned(),
            continuous: true,
            interim_results: true,
            max_alternatives: 1,
        }
    }
}

impl RecognitionSettings {
    /// Override the spoken language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

/// Trait for recognition engines.
///
/// An engine is the host-provided side of the capability. Implementations
/// own whatever resources a session needs (audio input, network clients);
/// the caller only keeps the [`RecognitionSession`] handle.
pub trait RecognitionEngine: Send + Sync {
    /// Returns the name of this engine for logging/debugging.
    fn name(&self) -> &str;

    /// Whether this engine can deliver a session right now.
    fn is_available(&self) -> bool;

    /// Starts a session. Events are delivered to `on_event` from a
    /// background context until the returned handle is stopped.
    fn start(
        &self,
        settings: &RecognitionSettings,
        on_event: EventHandler,
    ) -> Result<RecognitionSession>;
}

/// Returns the first engine in `engines` that reports itself available.
///
/// This is the capability probe: candidates are tried in order and callers
/// branch only on whether *some* engine answered, never on which one.
pub fn detect_engine(
    engines: &[Arc<dyn RecognitionEngine>],
) -> Option<Arc<dyn RecognitionEngine>> {
    engines.iter().find(|e| e.is_available()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubEngine {
        name: &'static str,
        available: bool,
    }

    impl RecognitionEngine for StubEngine {
        fn name(&self) -> &str {
            self.name
        }

        fn is_available(&self) -> bool {
            self.available
        }

        fn start(&self, _: &RecognitionSettings, _: EventHandler) -> Result<RecognitionSession> {
            Ok(RecognitionSession::new(Box::new(|| {})))
        }
    }

    fn stub(name: &'static str, available: bool) -> Arc<dyn RecognitionEngine> {
        Arc::new(StubEngine { name, available })
    }

    #[test]
    fn test_detect_prefers_first_available() {
        let engines = [stub("primary", true), stub("fallback", true)];
        let found = detect_engine(&engines).unwrap();
        assert_eq!(found.name(), "primary");
    }

    #[test]
    fn test_detect_skips_unavailable() {
        let engines = [stub("primary", false), stub("fallback", true)];
        let found = detect_engine(&engines).unwrap();
        assert_eq!(found.name(), "fallback");
    }

    #[test]
    fn test_detect_none_available() {
        let engines = [stub("primary", false)];
        assert!(detect_engine(&engines).is_none());
        assert!(detect_engine(&[]).is_none());
    }

    #[test]
    fn test_default_settings_match_contract() {
        let settings = RecognitionSettings::default();
        assert_eq!(settings.language, "pt-BR");
        assert!(settings.continuous);
        assert!(settings.interim_results);
        assert_eq!(settings.max_alternatives, 1);
    }
}
