//! Audio mixer commands

use crate::mixer::{AudioMixer, LevelMonitor, MixerState};
use std::sync::Arc;
use tauri::State;

/// The mixer and the capture thread feeding its meter
pub struct MixerHandle {
    pub mixer: Arc<AudioMixer>,
    pub monitor: LevelMonitor,
}

#[tauri::command]
pub async fn get_mixer_state(state: State<'_, MixerHandle>) -> Result<MixerState, String> {
    Ok(state.mixer.snapshot())
}

/// Set the fader; applies to the next recording
#[tauri::command]
pub async fn set_volume(state: State<'_, MixerHandle>, volume: u8) -> Result<MixerState, String> {
    let volume = state.mixer.set_volume(volume);
    tracing::debug!("Desktop audio volume: {}", volume);
    Ok(state.mixer.snapshot())
}

#[tauri::command]
pub async fn set_muted(state: State<'_, MixerHandle>, muted: bool) -> Result<MixerState, String> {
    state.mixer.set_muted(muted);
    Ok(state.mixer.snapshot())
}

#[tauri::command]
pub async fn toggle_mute(state: State<'_, MixerHandle>) -> Result<MixerState, String> {
    let muted = state.mixer.toggle_mute();
    tracing::debug!("Desktop audio muted: {}", muted);
    Ok(state.mixer.snapshot())
}
