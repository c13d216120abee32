//! Core types and configuration for notavoz.
//!
//! This crate provides platform-agnostic types that can be used across
//! all notavoz sub-crates.

mod config;
mod state;

pub use config::{Config, ConfigManager};
pub use state::CaptureState;

/// Application name
pub const APP_NAME: &str = "notavoz";

/// Pretty application name for display
pub const APP_NAME_PRETTY: &str = "NotaVoz";

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";
