//! macOS permission handling
//!
//! Handles the screen recording permission on macOS.

use core_graphics::access::ScreenCaptureAccess;

/// Check if screen recording permission is granted
pub fn has_screen_recording_permission() -> bool {
    ScreenCaptureAccess::preflight()
}

/// Request screen recording permission
///
/// Shows the system prompt the first time. Returns true only if permission
/// was already granted; a fresh grant takes effect after relaunch.
pub fn request_screen_recording_permission() -> bool {
    let granted = ScreenCaptureAccess::request();
    if !granted {
        open_screen_recording_preferences();
    }
    granted
}

/// Open System Settings at the Screen Recording pane
pub fn open_screen_recording_preferences() {
    let url = "x-apple.systempreferences:com.apple.preference.security?Privacy_ScreenCapture";
    if let Ok(output) = std::process::Command::new("open").arg(url).output() {
        if !output.status.success() {
            tracing::warn!("Failed to open Screen Recording preferences");
        }
    }
}
