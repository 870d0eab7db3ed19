//! FFmpeg-backed capture
//!
//! Capture streams are described as FFmpeg input arguments for the platform's
//! grab device (x11grab, avfoundation, gdigrab). The recorder spawns FFmpeg
//! with these arguments when a recording starts.

use super::traits::{
    has_screen_recording_permission, request_screen_recording_permission, CaptureBackend,
    CaptureError, CaptureRequest, CaptureResult, CaptureStream, SourceKind, WindowInfo,
};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

/// Desktop platform the grab arguments are built for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    MacOs,
    Windows,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Linux
        }
    }
}

/// Build the FFmpeg input arguments for a capture request
///
/// Returns the arguments and whether they include an audio input.
pub fn build_input_args(
    platform: Platform,
    request: &CaptureRequest,
    x11_display: &str,
) -> CaptureResult<(Vec<String>, bool)> {
    let fps = request.constraints.frame_rate().to_string();
    let want_audio = request.constraints.audio.enabled;

    let mut args: Vec<String> = Vec::new();
    let mut has_audio = false;

    match platform {
        Platform::Linux => {
            if request.kind == SourceKind::Window {
                return Err(CaptureError::Unsupported(
                    "window capture is only available on Windows".to_string(),
                ));
            }
            args.extend(
                ["-f", "x11grab", "-framerate", &fps, "-i", x11_display]
                    .iter()
                    .map(|s| s.to_string()),
            );
            if want_audio {
                args.extend(
                    ["-f", "pulse", "-thread_queue_size", "1024", "-i", "default"]
                        .iter()
                        .map(|s| s.to_string()),
                );
                has_audio = true;
            }
        }
        Platform::MacOs => {
            if request.kind == SourceKind::Window {
                return Err(CaptureError::Unsupported(
                    "window capture is only available on Windows".to_string(),
                ));
            }
            // System audio needs ScreenCaptureKit; avfoundation only grabs video here
            args.extend(
                [
                    "-f",
                    "avfoundation",
                    "-capture_cursor",
                    "1",
                    "-framerate",
                    &fps,
                    "-i",
                    "Capture screen 0:none",
                ]
                .iter()
                .map(|s| s.to_string()),
            );
        }
        Platform::Windows => {
            let target = match request.kind {
                SourceKind::Screen => "desktop".to_string(),
                SourceKind::Window => {
                    let title = request
                        .window_title
                        .as_deref()
                        .filter(|t| !t.trim().is_empty())
                        .ok_or_else(|| {
                            CaptureError::WindowNotFound("no window selected".to_string())
                        })?;
                    format!("title={}", title)
                }
            };
            args.extend(
                ["-f", "gdigrab", "-framerate", &fps, "-i", &target]
                    .iter()
                    .map(|s| s.to_string()),
            );
        }
    }

    Ok((args, has_audio))
}

/// Capture backend that hands grab devices to FFmpeg
pub struct FfmpegCapture {
    ffmpeg_path: String,
}

impl FfmpegCapture {
    pub fn new(ffmpeg_path: impl Into<String>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
        }
    }

    /// Check that the FFmpeg binary can be executed
    pub async fn is_available(&self) -> bool {
        Command::new(&self.ffmpeg_path)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false)
    }
}

#[async_trait]
impl CaptureBackend for FfmpegCapture {
    async fn acquire(&self, request: &CaptureRequest) -> CaptureResult<CaptureStream> {
        if !self.has_permission() && !self.request_permission() {
            return Err(CaptureError::PermissionDenied);
        }

        if !self.is_available().await {
            return Err(CaptureError::Unsupported(format!(
                "FFmpeg not found at '{}'",
                self.ffmpeg_path
            )));
        }

        if let (SourceKind::Window, Some(title)) = (request.kind, request.window_title.as_deref()) {
            let windows = self.list_windows();
            if !windows.iter().any(|w| w.title == title) {
                return Err(CaptureError::WindowNotFound(title.to_string()));
            }
        }

        let display = std::env::var("DISPLAY").unwrap_or_else(|_| ":0.0".to_string());
        let (input_args, has_audio) = build_input_args(Platform::current(), request, &display)?;

        let label = match (request.kind, request.window_title.as_deref()) {
            (SourceKind::Window, Some(title)) => title.to_string(),
            (kind, _) => kind.display_name().to_string(),
        };

        tracing::info!("Acquired {:?} capture: {}", request.kind, input_args.join(" "));

        Ok(CaptureStream::new(
            request.kind,
            label,
            input_args,
            has_audio,
            request.constraints.clone(),
        ))
    }

    fn list_windows(&self) -> Vec<WindowInfo> {
        #[cfg(target_os = "windows")]
        {
            crate::capture::windows::list_windows()
        }

        #[cfg(not(target_os = "windows"))]
        {
            Vec::new()
        }
    }

    fn has_permission(&self) -> bool {
        has_screen_recording_permission()
    }

    fn request_permission(&self) -> bool {
        request_screen_recording_permission()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::traits::CaptureConstraints;

    fn request(kind: SourceKind, constraints: CaptureConstraints) -> CaptureRequest {
        CaptureRequest {
            kind,
            constraints,
            window_title: None,
        }
    }

    #[test]
    fn test_linux_screen_with_audio() {
        let (args, has_audio) = build_input_args(
            Platform::Linux,
            &request(SourceKind::Screen, CaptureConstraints::detailed()),
            ":1",
        )
        .unwrap();
        assert!(has_audio);
        assert_eq!(&args[..6], ["-f", "x11grab", "-framerate", "30", "-i", ":1"]);
        assert!(args.contains(&"pulse".to_string()));
    }

    #[test]
    fn test_linux_window_unsupported() {
        let result = build_input_args(
            Platform::Linux,
            &request(SourceKind::Window, CaptureConstraints::default()),
            ":0.0",
        );
        assert!(matches!(result, Err(CaptureError::Unsupported(_))));
    }

    #[test]
    fn test_macos_screen_has_no_audio() {
        let (args, has_audio) = build_input_args(
            Platform::MacOs,
            &request(SourceKind::Screen, CaptureConstraints::default()),
            ":0.0",
        )
        .unwrap();
        assert!(!has_audio);
        assert!(args.contains(&"avfoundation".to_string()));
    }

    #[test]
    fn test_windows_window_by_title() {
        let mut req = request(SourceKind::Window, CaptureConstraints::default());
        req.window_title = Some("Notepad".to_string());
        let (args, _) = build_input_args(Platform::Windows, &req, ":0.0").unwrap();
        assert_eq!(args.last().unwrap(), "title=Notepad");

        req.window_title = None;
        let result = build_input_args(Platform::Windows, &req, ":0.0");
        assert!(matches!(result, Err(CaptureError::WindowNotFound(_))));
    }
}
