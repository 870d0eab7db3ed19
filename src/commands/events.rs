//! Events pushed to the frontend

use crate::studio::{Notifier, StudioEvent};
use tauri::{AppHandle, Emitter};

pub const TOAST: &str = "toast";
pub const STUDIO_CHANGED: &str = "studio-changed";
pub const RECORDING_EVENT: &str = "recording-event";
pub const RECORDING_COMPLETE: &str = "recording-complete";
pub const AUDIO_LEVEL: &str = "audio-level";

/// Forwards studio events to every window
pub struct TauriNotifier {
    app: AppHandle,
}

impl TauriNotifier {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }
}

impl Notifier for TauriNotifier {
    fn emit(&self, event: StudioEvent) {
        let result = match event {
            StudioEvent::Toast(toast) => {
                tracing::debug!("Toast: {} - {}", toast.title, toast.description);
                self.app.emit(TOAST, toast)
            }
            StudioEvent::Changed => self.app.emit(STUDIO_CHANGED, ()),
            StudioEvent::RecordingComplete(output) => self.app.emit(RECORDING_COMPLETE, output),
        };

        if let Err(e) = result {
            tracing::warn!("Failed to emit studio event: {}", e);
        }
    }
}
