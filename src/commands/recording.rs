//! Recording-related Tauri commands

use super::{command_error, ConfigState};
use crate::recorder::{RecordingOutput, RecordingState};
use crate::studio::{RecordingSettings, SettingsOptions, StudioHandle};
use std::path::PathBuf;
use tauri::{AppHandle, State};

/// Check if screen recording permission is granted
#[tauri::command]
pub async fn check_screen_permission(studio: State<'_, StudioHandle>) -> Result<bool, String> {
    Ok(studio.lock().await.has_permission())
}

/// Request screen recording permission
#[tauri::command]
pub async fn request_screen_permission(studio: State<'_, StudioHandle>) -> Result<bool, String> {
    Ok(studio.lock().await.request_permission())
}

/// Start recording the current source
#[tauri::command]
pub async fn start_recording(studio: State<'_, StudioHandle>) -> Result<(), String> {
    studio
        .lock()
        .await
        .start_recording()
        .await
        .map_err(command_error)
}

/// Stop recording and save the file
#[tauri::command]
pub async fn stop_recording(studio: State<'_, StudioHandle>) -> Result<RecordingOutput, String> {
    studio
        .lock()
        .await
        .stop_recording()
        .await
        .map_err(command_error)
}

/// Pause recording
#[tauri::command]
pub async fn pause_recording(studio: State<'_, StudioHandle>) -> Result<(), String> {
    studio
        .lock()
        .await
        .pause_recording()
        .await
        .map_err(command_error)
}

/// Resume recording
#[tauri::command]
pub async fn resume_recording(studio: State<'_, StudioHandle>) -> Result<(), String> {
    studio
        .lock()
        .await
        .resume_recording()
        .await
        .map_err(command_error)
}

/// The pause button
#[tauri::command]
pub async fn toggle_pause(studio: State<'_, StudioHandle>) -> Result<RecordingState, String> {
    studio
        .lock()
        .await
        .toggle_pause()
        .await
        .map_err(command_error)
}

/// Get current recording state
#[tauri::command]
pub async fn get_recording_state(
    studio: State<'_, StudioHandle>,
) -> Result<RecordingState, String> {
    Ok(studio.lock().await.recording_state())
}

/// Get current recording duration in milliseconds
#[tauri::command]
pub async fn get_recording_duration(studio: State<'_, StudioHandle>) -> Result<f64, String> {
    Ok(studio.lock().await.recording_duration_ms())
}

#[tauri::command]
pub async fn get_recording_settings(
    studio: State<'_, StudioHandle>,
) -> Result<RecordingSettings, String> {
    Ok(studio.lock().await.settings())
}

/// Choices offered by the settings dialog
#[tauri::command]
pub async fn get_settings_options() -> Result<SettingsOptions, String> {
    Ok(SettingsOptions::all())
}

/// Apply and persist new recording settings
#[tauri::command]
pub async fn update_recording_settings(
    app: AppHandle,
    studio: State<'_, StudioHandle>,
    config: State<'_, ConfigState>,
    settings: RecordingSettings,
) -> Result<(), String> {
    studio.lock().await.update_settings(settings);

    let mut config = config.config.lock();
    config.recording = settings;
    config.save(&app).map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn get_output_dir(studio: State<'_, StudioHandle>) -> Result<String, String> {
    Ok(studio.lock().await.output_dir().to_string_lossy().to_string())
}

/// Change where recordings are saved
#[tauri::command]
pub async fn set_output_dir(
    app: AppHandle,
    studio: State<'_, StudioHandle>,
    config: State<'_, ConfigState>,
    path: String,
) -> Result<(), String> {
    let dir = PathBuf::from(&path);
    if !dir.is_dir() {
        return Err(format!("Not a directory: {}", path));
    }

    studio.lock().await.set_output_dir(dir.clone());

    let mut config = config.config.lock();
    config.output_dir = dir;
    config.save(&app).map_err(|e| e.to_string())
}
