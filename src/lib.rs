//! BabxRec - a screen recording studio.
//!
//! This is the main library crate for the BabxRec application.
//! It provides the Tauri application setup and all backend functionality.

pub mod capture;
pub mod commands;
pub mod config;
pub mod mixer;
pub mod recorder;
pub mod studio;
pub mod utils;

#[cfg(test)]
mod testing;

use anyhow::Context;
use capture::FfmpegCapture;
use commands::events::{TauriNotifier, AUDIO_LEVEL, RECORDING_EVENT};
use commands::mixer::MixerHandle;
use commands::ConfigState;
use config::StudioConfig;
use mixer::{tick_levels, AudioMixer, LevelMonitor};
use recorder::FfmpegRecorderFactory;
use std::sync::Arc;
use std::time::Duration;
use studio::{Studio, StudioHandle, StudioServices};
use tauri::{App, Emitter, Manager};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build the studio and register it and the mixer as managed state
fn setup_studio(app: &mut App) -> anyhow::Result<()> {
    let handle = app.handle().clone();
    let config = StudioConfig::load_or_default(&handle);

    tracing::info!(
        "Profile {:?}, saving recordings to {}",
        config.profile,
        config.output_dir.display()
    );
    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            config.output_dir.display()
        )
    })?;

    let mixer = Arc::new(AudioMixer::new(config.default_volume));
    let studio = Studio::new(
        config.profile,
        config.recording,
        config.output_dir.clone(),
        StudioServices {
            capture: Arc::new(FfmpegCapture::new(config.ffmpeg_path.clone())),
            recorders: Arc::new(FfmpegRecorderFactory::new(config.ffmpeg_path.clone())),
            notifier: Arc::new(TauriNotifier::new(handle.clone())),
            mixer: mixer.clone(),
        },
    );

    // Forward recorder lifecycle events
    let mut recording_events = studio.subscribe_recording();
    let events_app = handle.clone();
    tauri::async_runtime::spawn(async move {
        loop {
            match recording_events.recv().await {
                Ok(event) => {
                    if let Err(e) = events_app.emit(RECORDING_EVENT, event) {
                        tracing::warn!("Failed to emit recording event: {}", e);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Dropped {} recording events", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    // Level meter
    let monitor = LevelMonitor::start(&mixer);
    let level_app = handle.clone();
    tauri::async_runtime::spawn(tick_levels(
        mixer.clone(),
        Duration::from_millis(config.meter_interval_ms.max(1)),
        monitor.running(),
        move |state| {
            if let Err(e) = level_app.emit(AUDIO_LEVEL, state) {
                tracing::warn!("Failed to emit audio level: {}", e);
            }
        },
    ));

    app.manage(StudioHandle::new(studio));
    app.manage(MixerHandle { mixer, monitor });
    app.manage(ConfigState::new(config));
    Ok(())
}

/// Initialize the application
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "babxrec=debug,tauri=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting BabxRec v{}", env!("CARGO_PKG_VERSION"));

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_fs::init())
        .invoke_handler(tauri::generate_handler![
            // Studio commands
            commands::studio::get_studio_snapshot,
            commands::studio::add_scene,
            commands::studio::delete_scene,
            commands::studio::duplicate_scene,
            commands::studio::rename_scene,
            commands::studio::move_scene,
            commands::studio::select_scene,
            commands::studio::add_source,
            commands::studio::delete_source,
            commands::studio::move_source,
            commands::studio::select_source,
            commands::studio::list_windows,
            commands::studio::get_preview_state,
            // Recording commands
            commands::recording::check_screen_permission,
            commands::recording::request_screen_permission,
            commands::recording::start_recording,
            commands::recording::stop_recording,
            commands::recording::pause_recording,
            commands::recording::resume_recording,
            commands::recording::toggle_pause,
            commands::recording::get_recording_state,
            commands::recording::get_recording_duration,
            commands::recording::get_recording_settings,
            commands::recording::get_settings_options,
            commands::recording::update_recording_settings,
            commands::recording::get_output_dir,
            commands::recording::set_output_dir,
            // Mixer commands
            commands::mixer::get_mixer_state,
            commands::mixer::set_volume,
            commands::mixer::set_muted,
            commands::mixer::toggle_mute,
            // System commands
            commands::system::get_system_info,
        ])
        .setup(|app| {
            setup_studio(app)?;
            Ok(())
        })
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
