//! Scene, source and preview commands

use super::command_error;
use crate::capture::{SourceKind, WindowInfo};
use crate::studio::{Direction, PreviewState, Scene, Source, StudioHandle, StudioSnapshot};
use tauri::State;

/// Everything the main window renders
#[tauri::command]
pub async fn get_studio_snapshot(studio: State<'_, StudioHandle>) -> Result<StudioSnapshot, String> {
    Ok(studio.lock().await.snapshot())
}

#[tauri::command]
pub async fn add_scene(studio: State<'_, StudioHandle>, name: String) -> Result<Scene, String> {
    studio.lock().await.add_scene(&name).map_err(command_error)
}

#[tauri::command]
pub async fn delete_scene(studio: State<'_, StudioHandle>, id: String) -> Result<Scene, String> {
    studio.lock().await.delete_scene(&id).map_err(command_error)
}

#[tauri::command]
pub async fn duplicate_scene(studio: State<'_, StudioHandle>, id: String) -> Result<Scene, String> {
    studio.lock().await.duplicate_scene(&id).map_err(command_error)
}

#[tauri::command]
pub async fn rename_scene(
    studio: State<'_, StudioHandle>,
    id: String,
    name: String,
) -> Result<Scene, String> {
    studio
        .lock()
        .await
        .rename_scene(&id, &name)
        .map_err(command_error)
}

/// Returns whether the scene moved
#[tauri::command]
pub async fn move_scene(
    studio: State<'_, StudioHandle>,
    id: String,
    direction: Direction,
) -> Result<bool, String> {
    studio
        .lock()
        .await
        .move_scene(&id, direction)
        .map_err(command_error)
}

#[tauri::command]
pub async fn select_scene(studio: State<'_, StudioHandle>, id: String) -> Result<(), String> {
    studio.lock().await.select_scene(&id).map_err(command_error)
}

/// Add a screen or window source
///
/// Prompts for capture permission where the platform requires it.
#[tauri::command]
pub async fn add_source(
    studio: State<'_, StudioHandle>,
    kind: SourceKind,
    window_title: Option<String>,
) -> Result<Source, String> {
    studio
        .add_source(kind, window_title)
        .await
        .map_err(command_error)
}

#[tauri::command]
pub async fn delete_source(studio: State<'_, StudioHandle>, id: String) -> Result<Source, String> {
    studio.lock().await.delete_source(&id).map_err(command_error)
}

#[tauri::command]
pub async fn move_source(
    studio: State<'_, StudioHandle>,
    id: String,
    direction: Direction,
) -> Result<bool, String> {
    studio
        .lock()
        .await
        .move_source(&id, direction)
        .map_err(command_error)
}

#[tauri::command]
pub async fn select_source(studio: State<'_, StudioHandle>, id: String) -> Result<(), String> {
    studio.lock().await.select_source(&id).map_err(command_error)
}

/// Windows a window source can target
#[tauri::command]
pub async fn list_windows(studio: State<'_, StudioHandle>) -> Result<Vec<WindowInfo>, String> {
    Ok(studio.lock().await.list_windows())
}

#[tauri::command]
pub async fn get_preview_state(studio: State<'_, StudioHandle>) -> Result<PreviewState, String> {
    Ok(studio.lock().await.preview())
}
