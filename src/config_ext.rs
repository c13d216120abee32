//! App-specific configuration extensions.
//!
//! This module provides hotkey support on top of the core Config.

use std::str::FromStr;

use global_hotkey::hotkey::{Code, HotKey, Modifiers};
use tracing::warn;

use crate::Config;

/// Default hotkey: Ctrl+Shift+N
pub fn default_hotkey() -> HotKey {
    HotKey::new(Some(Modifiers::CONTROL | Modifiers::SHIFT), Code::KeyN)
}

/// Extension trait for Config to handle hotkeys.
pub trait ConfigExt {
    /// Get the hotkey, parsing from config or using default.
    fn hotkey(&self) -> HotKey;
}

impl ConfigExt for Config {
    fn hotkey(&self) -> HotKey {
        match self.hotkey_str() {
            None => default_hotkey(),
            Some(raw) => HotKey::from_str(raw).unwrap_or_else(|e| {
                warn!("invalid hotkey {:?} in config, using default: {}", raw, e);
                default_hotkey()
            }),
        }
    }
}
