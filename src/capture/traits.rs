//! Capture trait definitions
//!
//! Platform-agnostic types for acquiring capture streams.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tokio::sync::watch;
use uuid::Uuid;

/// Capture-related errors
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Screen recording permission not granted")]
    PermissionDenied,

    #[error("Capture not supported: {0}")]
    Unsupported(String),

    #[error("Window not found: {0}")]
    WindowNotFound(String),

    #[error("Capture process error: {0}")]
    Process(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CaptureResult<T> = Result<T, CaptureError>;

/// What a source captures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Screen,
    Window,
}

impl SourceKind {
    /// Name shown in the source list
    pub fn display_name(&self) -> &'static str {
        match self {
            SourceKind::Screen => "Screen Capture",
            SourceKind::Window => "Window Capture",
        }
    }

    /// Short label used in notifications
    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::Screen => "Screen",
            SourceKind::Window => "Window",
        }
    }
}

/// Video constraints; `None` leaves the choice to the platform
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoConstraints {
    pub ideal_width: Option<u32>,
    pub max_width: Option<u32>,
    pub ideal_height: Option<u32>,
    pub max_height: Option<u32>,
    pub ideal_frame_rate: Option<u32>,
    pub max_frame_rate: Option<u32>,
}

/// Audio constraints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioConstraints {
    pub enabled: bool,
    pub noise_suppression: bool,
    pub sample_rate: Option<u32>,
}

impl Default for AudioConstraints {
    fn default() -> Self {
        Self {
            enabled: true,
            noise_suppression: false,
            sample_rate: None,
        }
    }
}

/// Constraints passed when acquiring a capture stream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptureConstraints {
    pub video: VideoConstraints,
    pub audio: AudioConstraints,
}

impl CaptureConstraints {
    /// Full HD at 30fps (60 max) with cleaned-up 44.1kHz audio
    pub fn detailed() -> Self {
        Self {
            video: VideoConstraints {
                ideal_width: Some(1920),
                max_width: Some(1920),
                ideal_height: Some(1080),
                max_height: Some(1080),
                ideal_frame_rate: Some(30),
                max_frame_rate: Some(60),
            },
            audio: AudioConstraints {
                enabled: true,
                noise_suppression: true,
                sample_rate: Some(44100),
            },
        }
    }

    /// Video and audio with whatever the platform picks
    pub fn platform_default() -> Self {
        Self::default()
    }

    /// Frame rate to request from the capture device
    pub fn frame_rate(&self) -> u32 {
        let ideal = self.video.ideal_frame_rate.unwrap_or(30);
        match self.video.max_frame_rate {
            Some(max) => ideal.min(max),
            None => ideal,
        }
    }
}

/// A request to acquire a capture stream
#[derive(Debug, Clone)]
pub struct CaptureRequest {
    pub kind: SourceKind,
    pub constraints: CaptureConstraints,
    /// Title of the window to capture (window sources only)
    pub window_title: Option<String>,
}

/// A live capture stream
///
/// The stream describes how to read from the capture device. It ends either
/// when the application stops it or when the platform ends it (the window
/// closes, the user revokes sharing, the capture process dies).
#[derive(Debug)]
pub struct CaptureStream {
    id: String,
    kind: SourceKind,
    label: String,
    input_args: Vec<String>,
    has_audio: bool,
    constraints: CaptureConstraints,
    active: AtomicBool,
    ended_tx: watch::Sender<bool>,
}

impl CaptureStream {
    pub fn new(
        kind: SourceKind,
        label: impl Into<String>,
        input_args: Vec<String>,
        has_audio: bool,
        constraints: CaptureConstraints,
    ) -> Self {
        let (ended_tx, _) = watch::channel(false);
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            label: label.into(),
            input_args,
            has_audio,
            constraints,
            active: AtomicBool::new(true),
            ended_tx,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Encoder input arguments that read from the capture device
    pub fn input_args(&self) -> &[String] {
        &self.input_args
    }

    pub fn has_audio(&self) -> bool {
        self.has_audio
    }

    pub fn constraints(&self) -> &CaptureConstraints {
        &self.constraints
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Release the stream. Does not fire the ended signal.
    pub fn stop(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            tracing::debug!("Capture stream {} stopped", self.id);
        }
    }

    /// Mark the stream as ended by the platform
    pub fn end(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            tracing::info!("Capture stream {} ended", self.id);
            self.ended_tx.send_replace(true);
        }
    }

    /// Receiver that flips to `true` once the platform ends the stream
    pub fn ended(&self) -> watch::Receiver<bool> {
        self.ended_tx.subscribe()
    }
}

/// Information about a capturable window
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowInfo {
    /// Platform window handle
    pub id: u64,

    /// Window title
    pub title: String,
}

/// Platform capture backend
#[async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Acquire a capture stream; gated by the platform's permission flow
    async fn acquire(&self, request: &CaptureRequest) -> CaptureResult<CaptureStream>;

    /// Windows that can be targeted by a window source
    fn list_windows(&self) -> Vec<WindowInfo>;

    fn has_permission(&self) -> bool;

    fn request_permission(&self) -> bool;
}

/// Check if screen recording permission is granted
pub fn has_screen_recording_permission() -> bool {
    #[cfg(target_os = "macos")]
    {
        crate::capture::macos::has_screen_recording_permission()
    }

    #[cfg(not(target_os = "macos"))]
    {
        // No explicit permission gate outside macOS
        true
    }
}

/// Request screen recording permission
pub fn request_screen_recording_permission() -> bool {
    #[cfg(target_os = "macos")]
    {
        crate::capture::macos::request_screen_recording_permission()
    }

    #[cfg(not(target_os = "macos"))]
    {
        true
    }
}
