//! System notifications and toasts.

use notify_rust::Notification;
use tracing::field::{Field, Visit};
use tracing::{error, Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

use crate::{APP_NAME, APP_NAME_PRETTY};

/// A user-visible notification raised by the composer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toast {
    Success(String),
    Error(String),
}

impl Toast {
    pub fn success(body: impl Into<String>) -> Self {
        Toast::Success(body.into())
    }

    pub fn error(body: impl Into<String>) -> Self {
        Toast::Error(body.into())
    }

    pub fn body(&self) -> &str {
        match self {
            Toast::Success(body) | Toast::Error(body) => body,
        }
    }

    fn summary(&self) -> &'static str {
        match self {
            Toast::Success(_) => "saved",
            Toast::Error(_) => "error",
        }
    }
}

/// Delivers toasts to the user. The composer only knows this trait, so
/// tests can swap in a recording implementation.
pub trait Notifier: Send {
    fn toast(&mut self, toast: Toast);
}

/// Notifier backed by system notifications.
#[derive(Debug, Default)]
pub struct SystemNotifier;

impl Notifier for SystemNotifier {
    fn toast(&mut self, toast: Toast) {
        notify(toast.summary(), toast.body());
    }
}

/// Send a system notification with a summary and body.
pub fn notify(summary: &str, body: &str) {
    Notification::new()
        .appname(APP_NAME)
        .summary(&format!("{} - {}", APP_NAME_PRETTY, summary))
        .body(body)
        .show()
        .map_err(|e| error!("Failed to send notification: {}", e))
        .ok();
}

/// Visitor to extract the message field from tracing events.
struct MessageVisitor {
    message: Option<String>,
}

impl MessageVisitor {
    fn new() -> Self {
        Self { message: None }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{:?}", value));
        }
    }
}

/// Tracing layer that sends notifications for warnings and errors.
#[derive(Debug, Default)]
pub struct NotificationLayer {}

impl NotificationLayer {
    pub fn new() -> Self {
        Self {}
    }
}

fn should_notify(level: Level) -> Option<&'static str> {
    match level {
        Level::ERROR => Some("error"),
        Level::WARN => Some("warning"),
        _ => None,
    }
}

impl<S: Subscriber> Layer<S> for NotificationLayer {
    fn on_event(&self, event: &Event<'_>, _: Context<'_, S>) {
        let level = *event.metadata().level();

        if let Some(summary) = should_notify(level) {
            let mut visitor = MessageVisitor::new();
            event.record(&mut visitor);

            if let Some(message) = visitor.message {
                notify(summary, &message);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toast_accessors() {
        let toast = Toast::success("note saved successfully");
        assert_eq!(toast.body(), "note saved successfully");
        assert_eq!(toast.summary(), "saved");

        let toast = Toast::error("no engine");
        assert_eq!(toast.summary(), "error");
    }

    #[test]
    fn test_should_notify_levels() {
        assert_eq!(should_notify(Level::ERROR), Some("error"));
        assert_eq!(should_notify(Level::WARN), Some("warning"));
        assert_eq!(should_notify(Level::INFO), None);
        assert_eq!(should_notify(Level::DEBUG), None);
    }
}
