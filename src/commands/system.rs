//! System-related Tauri commands

use super::ConfigState;
use crate::capture::FfmpegCapture;
use crate::studio::Profile;
use serde::{Deserialize, Serialize};
use tauri::State;

/// System information
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    pub os: String,
    pub os_version: String,
    pub arch: String,
    pub app_version: String,
    pub profile: Profile,
    /// Capture and encoding both need the ffmpeg binary
    pub ffmpeg_available: bool,
}

/// Get basic system information
#[tauri::command]
pub async fn get_system_info(config: State<'_, ConfigState>) -> Result<SystemInfo, String> {
    let (profile, ffmpeg_path) = {
        let config = config.config.lock();
        (config.profile, config.ffmpeg_path.clone())
    };

    Ok(SystemInfo {
        os: std::env::consts::OS.to_string(),
        os_version: os_version().await,
        arch: std::env::consts::ARCH.to_string(),
        app_version: env!("CARGO_PKG_VERSION").to_string(),
        profile,
        ffmpeg_available: FfmpegCapture::new(ffmpeg_path).is_available().await,
    })
}

async fn os_version() -> String {
    #[cfg(target_os = "macos")]
    let probe = tokio::process::Command::new("sw_vers")
        .arg("-productVersion")
        .output()
        .await;

    #[cfg(target_os = "windows")]
    let probe = tokio::process::Command::new("cmd")
        .args(["/C", "ver"])
        .output()
        .await;

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let probe = tokio::process::Command::new("uname").arg("-r").output().await;

    probe
        .ok()
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "Unknown".to_string())
}
