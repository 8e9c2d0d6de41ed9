//! User-facing notifications.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::{CustomizerError, ValidationError};

/// Visual weight of a notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationVariant {
    /// Informational or success.
    #[default]
    Default,
    /// Failure.
    Destructive,
}

/// A toast-style message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Short headline.
    pub title: String,
    /// Detail line.
    pub description: String,
    /// Visual weight.
    pub variant: NotificationVariant,
}

impl Notification {
    /// A success or informational notification.
    #[must_use]
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NotificationVariant::Default,
        }
    }

    /// A failure notification.
    #[must_use]
    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NotificationVariant::Destructive,
        }
    }

    /// Notification for a refused export.
    #[must_use]
    pub fn validation(err: &ValidationError) -> Self {
        Self::error(err.title(), err.to_string())
    }

    /// Notification for a failed export.
    #[must_use]
    pub fn export_failed(err: &CustomizerError) -> Self {
        match err {
            CustomizerError::Validation(v) => Self::validation(v),
            other => {
                tracing::error!("Export failed: {other}");
                Self::error(
                    "Export Failed",
                    "There was an error generating the PDF. Please try again.",
                )
            }
        }
    }

    /// Notification for a failed save.
    #[must_use]
    pub fn save_failed(err: &CustomizerError) -> Self {
        tracing::error!("Save failed: {err}");
        Self::error("Error Saving Design", err.to_string())
    }
}

/// Receives notifications for display.
pub trait Notifier: Send + Sync {
    /// Show a notification.
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the tracing log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.variant {
            NotificationVariant::Default => {
                tracing::info!("{}: {}", notification.title, notification.description);
            }
            NotificationVariant::Destructive => {
                tracing::warn!("{}: {}", notification.title, notification.description);
            }
        }
    }
}

/// Collects notifications in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications received so far.
    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.seen
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// The most recent notification.
    #[must_use]
    pub fn last(&self) -> Option<Notification> {
        self.seen
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(notification);
    }
}
