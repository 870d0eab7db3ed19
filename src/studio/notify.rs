//! User-facing notifications and studio events

use crate::recorder::RecordingOutput;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastVariant {
    #[default]
    Default,
    Destructive,
}

/// A transient notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Toast {
    pub title: String,
    pub description: String,
    pub variant: ToastVariant,
}

impl Toast {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: ToastVariant::Default,
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: ToastVariant::Destructive,
        }
    }
}

/// Everything the studio tells the UI about
#[derive(Debug, Clone)]
pub enum StudioEvent {
    Toast(Toast),
    /// Scenes, sources or selection changed
    Changed,
    RecordingComplete(RecordingOutput),
}

/// Sink for studio events
pub trait Notifier: Send + Sync {
    fn emit(&self, event: StudioEvent);

    fn toast(&self, toast: Toast) {
        self.emit(StudioEvent::Toast(toast));
    }
}

