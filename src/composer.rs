//! The note composer behind the "new note" card.
//!
//! One instance owns three pieces of transient state: whether the
//! onboarding prompt is showing, whether dictation is recording, and the
//! draft text. It also owns the handle to its recognition session, so two
//! composers can never trample each other's sessions and stopping always
//! targets the session this instance created. A completed note leaves
//! through the caller-supplied callback; the composer never persists
//! anything itself.

use std::sync::Arc;

use tracing::{debug, error, info};

use notavoz_speech::{
    combined_transcript, detect_engine, RecognitionEngine, RecognitionEvent, RecognitionSession,
    RecognitionSettings,
};

use crate::notify::{Notifier, Toast};

/// Invoked exactly once per successful submission with the full note text.
pub type NoteCallback = Box<dyn FnMut(&str) + Send>;

/// Receives session events for routing back into the composer, typically
/// through the application event loop.
pub type EventSink = Arc<dyn Fn(RecognitionEvent) + Send + Sync>;

pub struct NoteComposer {
    on_note_created: NoteCallback,
    engines: Vec<Arc<dyn RecognitionEngine>>,
    notifier: Box<dyn Notifier>,
    events: EventSink,
    settings: RecognitionSettings,
    onboarding_visible: bool,
    recording: bool,
    draft: String,
    session: Option<RecognitionSession>,
}

impl NoteComposer {
    pub fn new(
        engines: Vec<Arc<dyn RecognitionEngine>>,
        notifier: Box<dyn Notifier>,
        events: EventSink,
        on_note_created: NoteCallback,
    ) -> Self {
        Self {
            on_note_created,
            engines,
            notifier,
            events,
            settings: RecognitionSettings::default(),
            onboarding_visible: true,
            recording: false,
            draft: String::new(),
            session: None,
        }
    }

    /// Override the recognition settings, e.g. with a configured language.
    pub fn with_settings(mut self, settings: RecognitionSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn onboarding_visible(&self) -> bool {
        self.onboarding_visible
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Switch from the onboarding prompt to the text editor.
    pub fn open_editor(&mut self) {
        self.onboarding_visible = false;
    }

    /// Sync the draft with the editor contents. Called on every keystroke;
    /// deleting everything brings the onboarding prompt back.
    pub fn content_changed(&mut self, text: &str) {
        self.draft.clear();
        self.draft.push_str(text);

        if text.is_empty() {
            self.onboarding_visible = true;
        }
    }

    /// Start dictating into the draft.
    ///
    /// Probes the engines for an available one; when none answers, reports
    /// an error toast and changes nothing. Starting while a previous
    /// session is still around replaces its handle, which stops it.
    pub fn start_recording(&mut self) {
        let Some(engine) = detect_engine(&self.engines) else {
            self.notifier.toast(Toast::error(
                "speech recognition is not supported on this system",
            ));
            return;
        };

        self.recording = true;
        self.onboarding_visible = false;

        let sink = self.events.clone();
        match engine.start(&self.settings, Box::new(move |event| sink(event))) {
            Ok(session) => {
                info!(
                    engine = engine.name(),
                    language = %self.settings.language,
                    "recording started"
                );
                self.session = Some(session);
            }
            Err(e) => {
                error!("failed to start recognition session: {}", e);
                self.recording = false;
            }
        }
    }

    /// Stop dictating. Safe to call when nothing is recording.
    pub fn stop_recording(&mut self) {
        self.recording = false;

        if let Some(mut session) = self.session.take() {
            session.stop();
            info!("recording stopped");
        }
    }

    /// Apply one session event. Result events replace the draft wholesale
    /// with the transcript accumulated so far; errors are logged only and
    /// the recording flag is deliberately left as-is.
    pub fn handle_recognition_event(&mut self, event: RecognitionEvent) {
        match event {
            RecognitionEvent::Results(segments) => {
                self.draft = combined_transcript(&segments);
                debug!(chars = self.draft.len(), "draft updated from transcript");
            }
            RecognitionEvent::Error(e) => {
                error!("recognition error: {}", e);
            }
        }
    }

    /// Submit the draft.
    ///
    /// An empty draft is a silent no-op. Otherwise the note goes to the
    /// callback exactly once and the composer resets to its initial
    /// prompt. A live session is not stopped here; its handle stays owned,
    /// so later transcripts will land in the emptied draft.
    pub fn save(&mut self) {
        if self.draft.is_empty() {
            return;
        }

        (self.on_note_created)(&self.draft);
        info!(chars = self.draft.len(), "note saved");

        self.draft.clear();
        self.onboarding_visible = true;
        self.recording = false;

        self.notifier.toast(Toast::success("note saved successfully"));
    }
}
