//! The dialog shell hosting the note composer.
//!
//! The shell owns its own open/closed state; the composer never tracks
//! whether it is visible. Closing tears the window down. Both the close
//! affordance and losing focus (interacting outside the dialog, like
//! clicking through an overlay) close it; composer state survives a close.

use anyhow::{Context, Result};
use tao::dpi::LogicalSize;
use tao::event_loop::EventLoopWindowTarget;
use tao::window::{Window, WindowBuilder, WindowId};
use tracing::debug;

use crate::event::NotavozEvent;

pub struct WindowShell {
    window: Option<Window>,
}

impl WindowShell {
    pub fn new() -> Self {
        Self { window: None }
    }

    /// Opens the dialog, or refocuses it when already open.
    pub fn open(&mut self, target: &EventLoopWindowTarget<NotavozEvent>) -> Result<()> {
        if let Some(window) = &self.window {
            window.set_focus();
            return Ok(());
        }

        let window = WindowBuilder::new()
            .with_title("new note")
            .with_inner_size(LogicalSize::new(520.0, 120.0))
            .with_resizable(false)
            .with_always_on_top(true)
            .build(target)
            .context("Failed to create note dialog window")?;

        debug!("note dialog opened");
        self.window = Some(window);
        Ok(())
    }

    /// Closes and tears down the dialog.
    pub fn close(&mut self) {
        if self.window.take().is_some() {
            debug!("note dialog closed");
        }
    }

    pub fn is_open(&self) -> bool {
        self.window.is_some()
    }

    pub fn owns(&self, id: WindowId) -> bool {
        self.window.as_ref().map(|w| w.id() == id).unwrap_or(false)
    }

    /// Renders the current composer line in the title bar.
    pub fn set_title(&self, title: &str) {
        if let Some(window) = &self.window {
            window.set_title(title);
        }
    }
}

impl Default for WindowShell {
    fn default() -> Self {
        Self::new()
    }
}
