//! Capture stream acquisition
//!
//! Screen and window capture streams, the platform permission gate and
//! window enumeration.

pub mod ffmpeg;
pub mod traits;

#[cfg(target_os = "macos")]
pub mod macos;

#[cfg(target_os = "windows")]
pub mod windows;

pub use ffmpeg::FfmpegCapture;
pub use traits::{
    CaptureBackend, CaptureConstraints, CaptureError, CaptureRequest, CaptureResult,
    CaptureStream, SourceKind, WindowInfo,
};

// Re-export permission functions from traits (which delegates to platform)
pub use traits::{has_screen_recording_permission, request_screen_recording_permission};
