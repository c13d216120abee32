// Re-export from sub-crates
pub use notavoz_audio::{CaptureError, ChunkedCapture};
pub use notavoz_core::{
    CaptureState, Config, ConfigManager, APP_NAME, APP_NAME_PRETTY, DEFAULT_LOG_LEVEL,
};
pub use notavoz_speech::{
    CloudEngine, RecognitionEngine, RecognitionEvent, RecognitionSession, RecognitionSettings,
    SpeechError, WhisperApiClient, WhisperApiConfig,
};

// App-specific modules
mod composer;
pub mod config_ext;
pub mod dialog;
pub mod event;
pub mod icon;
pub mod notify;
pub mod store;

pub use composer::{EventSink, NoteCallback, NoteComposer};

// Version from this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
