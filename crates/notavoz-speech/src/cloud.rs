//! Cloud-backed recognition engine.
//!
//! The engine approximates streaming recognition by windowing: a session
//! thread drains the capture buffer every window, silence-gated WAV chunks
//! go to an OpenAI-compatible transcription endpoint, and each transcribed
//! window becomes one more final segment in the cumulative result list.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::runtime::Runtime;
use tracing::{debug, error, info, warn};

use crate::session::{EventHandler, RecognitionEvent, RecognitionSession};
use crate::transcript::TranscriptSegment;
use crate::{RecognitionEngine, RecognitionSettings, Result, SpeechError};

const TRANSCRIPTION_ENDPOINT: &str = "https://api.openai.com/v1/audio/transcriptions";
const DEFAULT_MODEL: &str = "gpt-4o-mini-transcribe";

/// How often a session thread checks for a stop request.
const POLL_STEP: Duration = Duration::from_millis(50);

/// Configuration for the transcription API client.
#[derive(Debug, Clone)]
pub struct WhisperApiConfig {
    /// API key
    pub api_key: String,

    /// Model to use (defaults to gpt-4o-mini-transcribe)
    pub model: Option<String>,
}

impl WhisperApiConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: None,
        }
    }

    /// Set the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Get the model name, using default if not set.
    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }
}

/// OpenAI-compatible transcription API client.
#[derive(Debug, Clone)]
pub struct WhisperApiClient {
    client: reqwest::Client,
    config: WhisperApiConfig,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

impl WhisperApiClient {
    /// Create a new client with the given configuration.
    pub fn new(config: WhisperApiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Create a client from just an API key with default settings.
    pub fn from_api_key(api_key: impl Into<String>) -> Self {
        Self::new(WhisperApiConfig::new(api_key))
    }
}

/// Transcribes one WAV window of audio.
#[async_trait]
pub trait ChunkTranscriber: Send + Sync {
    /// Transcribe a WAV-encoded window to text.
    ///
    /// # Arguments
    /// * `wav` - complete WAV file bytes for one capture window
    /// * `language` - optional language hint (BCP 47 tag)
    async fn transcribe(&self, wav: &[u8], language: Option<&str>) -> Result<String>;

    /// Returns the name of this transcriber for logging/debugging.
    fn name(&self) -> &str;
}

#[async_trait]
impl ChunkTranscriber for WhisperApiClient {
    async fn transcribe(&self, wav: &[u8], language: Option<&str>) -> Result<String> {
        debug!(
            model = self.config.model(),
            audio_bytes = wav.len(),
            language = ?language,
            "Sending transcription request"
        );

        let mut form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(wav.to_vec())
                    .file_name("window.wav")
                    .mime_str("audio/wav")
                    .map_err(|e| SpeechError::ApiError(e.to_string()))?,
            )
            .part(
                "model",
                reqwest::multipart::Part::text(self.config.model().to_owned()),
            );

        if let Some(lang) = language {
            // The endpoint expects an ISO 639-1 code; strip any region subtag.
            let primary = lang.split('-').next().unwrap_or(lang);
            form = form.part(
                "language",
                reqwest::multipart::Part::text(primary.to_owned()),
            );
        }

        let response = self
            .client
            .post(TRANSCRIPTION_ENDPOINT)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SpeechError::ApiError(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        let parsed: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| SpeechError::RecognitionFailed(e.to_string()))?;

        Ok(parsed.text)
    }

    fn name(&self) -> &str {
        "whisper-api"
    }
}

/// Produces WAV windows for a session.
///
/// Implementations are created on the session thread and need not be `Send`;
/// the microphone-backed source holds a cpal stream.
pub trait ChunkSource {
    /// Audio captured since the previous call; `None` when the window was
    /// empty or silent.
    fn next_wav(&mut self) -> Result<Option<Vec<u8>>>;
}

impl ChunkSource for notavoz_audio::ChunkedCapture {
    fn next_wav(&mut self) -> Result<Option<Vec<u8>>> {
        Ok(self.drain_wav()?)
    }
}

/// Creates a fresh [`ChunkSource`] for each session, on the session thread.
pub type SourceFactory = Arc<dyn Fn() -> Result<Box<dyn ChunkSource>> + Send + Sync>;

/// Recognition engine backed by chunked microphone capture and a cloud
/// transcription endpoint.
pub struct CloudEngine {
    transcriber: Option<Arc<dyn ChunkTranscriber>>,
    source_factory: SourceFactory,
    probe: Arc<dyn Fn() -> bool + Send + Sync>,
    window: Duration,
    runtime: Arc<Runtime>,
}

impl CloudEngine {
    /// Engine over the default microphone. Pass `None` when no API key is
    /// configured; the engine then reports itself unavailable.
    pub fn new(api: Option<WhisperApiClient>, window: Duration) -> anyhow::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()?;

        Ok(Self {
            transcriber: api.map(|c| Arc::new(c) as Arc<dyn ChunkTranscriber>),
            source_factory: Arc::new(|| {
                let capture = notavoz_audio::ChunkedCapture::open()?;
                Ok(Box::new(capture) as Box<dyn ChunkSource>)
            }),
            probe: Arc::new(notavoz_audio::input_available),
            window,
            runtime: Arc::new(runtime),
        })
    }

    /// Replace the transcription backend.
    pub fn with_transcriber(mut self, transcriber: Arc<dyn ChunkTranscriber>) -> Self {
        self.transcriber = Some(transcriber);
        self
    }

    /// Replace the audio source. The device probe is bypassed since the
    /// source no longer depends on a microphone being present.
    pub fn with_source_factory(mut self, factory: SourceFactory) -> Self {
        self.source_factory = factory;
        self.probe = Arc::new(|| true);
        self
    }
}

impl RecognitionEngine for CloudEngine {
    fn name(&self) -> &str {
        "cloud"
    }

    fn is_available(&self) -> bool {
        self.transcriber.is_some() && (self.probe)()
    }

    fn start(
        &self,
        settings: &RecognitionSettings,
        on_event: EventHandler,
    ) -> Result<RecognitionSession> {
        let Some(transcriber) = self.transcriber.clone() else {
            return Err(SpeechError::NoApiKey);
        };

        let factory = self.source_factory.clone();
        let settings = settings.clone();
        let runtime = self.runtime.clone();
        let window = self.window;
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = stop.clone();

        thread::Builder::new()
            .name("notavoz-recognition".to_owned())
            .spawn(move || {
                run_session(factory, transcriber, runtime, settings, window, stop_flag, on_event);
            })
            .map_err(|e| {
                SpeechError::RecognitionFailed(format!("failed to spawn session thread: {}", e))
            })?;

        Ok(RecognitionSession::new(Box::new(move || {
            stop.store(true, Ordering::Relaxed);
        })))
    }
}

fn run_session(
    factory: SourceFactory,
    transcriber: Arc<dyn ChunkTranscriber>,
    runtime: Arc<Runtime>,
    settings: RecognitionSettings,
    window: Duration,
    stop: Arc<AtomicBool>,
    mut on_event: EventHandler,
) {
    let mut source = match factory() {
        Ok(source) => source,
        Err(e) => {
            error!("failed to open audio source: {}", e);
            on_event(RecognitionEvent::Error(e.to_string()));
            return;
        }
    };

    info!(
        language = %settings.language,
        continuous = settings.continuous,
        window = ?window,
        "recognition session started"
    );

    let mut segments: Vec<TranscriptSegment> = Vec::new();
    let mut elapsed = Duration::ZERO;

    while !stop.load(Ordering::Relaxed) {
        thread::sleep(POLL_STEP);
        elapsed += POLL_STEP;
        if elapsed < window {
            continue;
        }
        elapsed = Duration::ZERO;

        let produced = transcribe_window(
            source.as_mut(),
            transcriber.as_ref(),
            &runtime,
            &settings,
            &mut segments,
            &mut on_event,
        );

        if produced && !settings.continuous {
            if !settings.interim_results && !segments.is_empty() {
                on_event(RecognitionEvent::Results(segments.clone()));
            }
            debug!("single-phrase session complete");
            return;
        }
    }

    // Final flush so the tail of the dictation is not lost.
    transcribe_window(
        source.as_mut(),
        transcriber.as_ref(),
        &runtime,
        &settings,
        &mut segments,
        &mut on_event,
    );
    if !settings.interim_results && !segments.is_empty() {
        on_event(RecognitionEvent::Results(segments.clone()));
    }

    info!(segments = segments.len(), "recognition session ended");
}

/// Drain one window from the source and transcribe it. Returns whether a new
/// segment was produced. With interim results enabled the cumulative list is
/// emitted immediately; otherwise emission is left to the caller.
fn transcribe_window(
    source: &mut dyn ChunkSource,
    transcriber: &dyn ChunkTranscriber,
    runtime: &Runtime,
    settings: &RecognitionSettings,
    segments: &mut Vec<TranscriptSegment>,
    on_event: &mut EventHandler,
) -> bool {
    let wav = match source.next_wav() {
        Ok(Some(wav)) => wav,
        Ok(None) => return false,
        Err(e) => {
            warn!("failed to drain capture window: {}", e);
            on_event(RecognitionEvent::Error(e.to_string()));
            return false;
        }
    };

    match runtime.block_on(transcriber.transcribe(&wav, Some(&settings.language))) {
        Ok(text) if !text.trim().is_empty() => {
            segments.push(TranscriptSegment::final_text(text));
            if settings.interim_results {
                on_event(RecognitionEvent::Results(segments.clone()));
            }
            true
        }
        Ok(_) => false,
        Err(e) => {
            warn!("transcription failed: {}", e);
            on_event(RecognitionEvent::Error(e.to_string()));
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::sync::Mutex;

    use super::*;

    struct ScriptedSource {
        chunks: Vec<Vec<u8>>,
    }

    impl ChunkSource for ScriptedSource {
        fn next_wav(&mut self) -> Result<Option<Vec<u8>>> {
            if self.chunks.is_empty() {
                Ok(None)
            } else {
                Ok(Some(self.chunks.remove(0)))
            }
        }
    }

    struct EchoTranscriber;

    #[async_trait]
    impl ChunkTranscriber for EchoTranscriber {
        async fn transcribe(&self, wav: &[u8], _: Option<&str>) -> Result<String> {
            Ok(String::from_utf8_lossy(wav).into_owned())
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    fn scripted_engine(chunks: Vec<Vec<u8>>) -> CloudEngine {
        let chunks = Arc::new(Mutex::new(Some(chunks)));
        CloudEngine::new(None, Duration::from_millis(50))
            .unwrap()
            .with_transcriber(Arc::new(EchoTranscriber))
            .with_source_factory(Arc::new(move || {
                let chunks = chunks.lock().unwrap().take().unwrap_or_default();
                Ok(Box::new(ScriptedSource { chunks }) as Box<dyn ChunkSource>)
            }))
    }

    #[test]
    fn test_engine_without_key_is_unavailable() {
        let engine = CloudEngine::new(None, Duration::from_millis(50)).unwrap();
        assert!(!engine.is_available());
    }

    #[test]
    fn test_engine_without_key_refuses_to_start() {
        let engine = CloudEngine::new(None, Duration::from_millis(50)).unwrap();
        let result = engine.start(&RecognitionSettings::default(), Box::new(|_| {}));
        assert!(matches!(result, Err(SpeechError::NoApiKey)));
    }

    #[test]
    fn test_scripted_engine_is_available() {
        let engine = scripted_engine(vec![]);
        assert!(engine.is_available());
    }

    #[test]
    fn test_session_emits_cumulative_results() {
        let engine = scripted_engine(vec![b"ola".to_vec(), b" mundo".to_vec()]);
        let (tx, rx) = mpsc::channel();

        let mut session = engine
            .start(
                &RecognitionSettings::default(),
                Box::new(move |ev| {
                    tx.send(ev).ok();
                }),
            )
            .unwrap();

        let first = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        let second = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        session.stop();

        let RecognitionEvent::Results(first) = first else {
            panic!("expected results event");
        };
        let RecognitionEvent::Results(second) = second else {
            panic!("expected results event");
        };
        assert_eq!(crate::combined_transcript(&first), "ola");
        assert_eq!(crate::combined_transcript(&second), "ola mundo");
    }
}
