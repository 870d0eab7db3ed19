//! The studio
//!
//! Owns the scene and source lists, the single live capture stream, the
//! recording coordinator and the recording settings. Every user-facing
//! outcome is reported through the `Notifier`.

pub mod notify;
pub mod ordering;
pub mod preview;
pub mod profile;
pub mod scenes;
pub mod settings;
pub mod sources;

pub use notify::{Notifier, StudioEvent, Toast, ToastVariant};
pub use ordering::Direction;
pub use preview::PreviewState;
pub use profile::Profile;
pub use scenes::{Scene, SceneList};
pub use settings::{FileType, RecordingSettings, Resolution, SettingsOptions};
pub use sources::{Source, SourceList};

use crate::capture::{CaptureBackend, CaptureRequest, CaptureStream, SourceKind, WindowInfo};
use crate::mixer::AudioMixer;
use crate::recorder::{
    negotiate, OutputTarget, RecorderError, RecorderFactory, RecorderOptions, RecordingCoordinator,
    RecordingEvent, RecordingOutput, RecordingState,
};
use crate::utils::{StudioError, StudioResult};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{broadcast, watch, Mutex, MutexGuard};

/// Platform services the studio drives
pub struct StudioServices {
    pub capture: Arc<dyn CaptureBackend>,
    pub recorders: Arc<dyn RecorderFactory>,
    pub notifier: Arc<dyn Notifier>,
    pub mixer: Arc<AudioMixer>,
}

/// The capture stream currently feeding the preview and the recorder
struct LiveStream {
    source_id: String,
    stream: Arc<CaptureStream>,
}

/// Lets the caller react when the platform ends a source's stream
pub struct StreamWatch {
    pub source_id: String,
    pub stream_id: String,
    pub ended: watch::Receiver<bool>,
}

/// Everything the main window renders
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudioSnapshot {
    pub profile: Profile,
    pub scenes: Vec<Scene>,
    pub selected_scene: Option<String>,
    pub sources: Vec<Source>,
    pub selected_source: Option<String>,
    pub recording_state: RecordingState,
    pub preview: PreviewState,
    pub settings: RecordingSettings,
}

pub struct Studio {
    profile: Profile,
    scenes: SceneList,
    sources: SourceList,
    current: Option<LiveStream>,
    coordinator: RecordingCoordinator,
    settings: RecordingSettings,
    output_dir: PathBuf,
    capture: Arc<dyn CaptureBackend>,
    recorders: Arc<dyn RecorderFactory>,
    notifier: Arc<dyn Notifier>,
    mixer: Arc<AudioMixer>,
}

impl Studio {
    pub fn new(
        profile: Profile,
        settings: RecordingSettings,
        output_dir: PathBuf,
        services: StudioServices,
    ) -> Self {
        Self {
            profile,
            scenes: SceneList::new(profile.delete_policy()),
            sources: SourceList::new(),
            current: None,
            coordinator: RecordingCoordinator::new(),
            settings,
            output_dir,
            capture: services.capture,
            recorders: services.recorders,
            notifier: services.notifier,
            mixer: services.mixer,
        }
    }

    /// Toast the failure, then hand it back
    fn report<T>(&self, result: StudioResult<T>) -> StudioResult<T> {
        if let Err(e) = &result {
            tracing::warn!("{}", e);
            self.notifier.toast(e.toast());
        }
        result
    }

    /// Toast a recorder failure other than an invalid transition
    fn recorder_failure(&self, error: RecorderError) -> StudioError {
        if !matches!(
            error,
            RecorderError::NotRecording | RecorderError::NotPaused
        ) {
            tracing::error!("Recorder failure: {}", error);
            self.notifier
                .toast(Toast::destructive("Recording Error", error.to_string()));
        }
        error.into()
    }

    fn confirm(&self, toast: Toast) {
        if self.profile.confirms_edits() {
            self.notifier.toast(toast);
        }
    }

    fn changed(&self) {
        self.notifier.emit(StudioEvent::Changed);
    }

    pub fn snapshot(&self) -> StudioSnapshot {
        StudioSnapshot {
            profile: self.profile,
            scenes: self.scenes.scenes().to_vec(),
            selected_scene: self.scenes.selected().map(str::to_string),
            sources: self.sources.sources().to_vec(),
            selected_source: self.sources.selected().map(str::to_string),
            recording_state: self.coordinator.state(),
            preview: self.preview(),
            settings: self.settings,
        }
    }

    // Scenes

    pub fn add_scene(&mut self, name: &str) -> StudioResult<Scene> {
        let result = self.scenes.add(name);
        let scene = self.report(result)?;
        self.confirm(Toast::info(
            "Scene Added",
            format!("Scene \"{}\" has been created.", scene.name),
        ));
        self.changed();
        Ok(scene)
    }

    pub fn delete_scene(&mut self, id: &str) -> StudioResult<Scene> {
        let result = self.scenes.delete(id);
        let scene = self.report(result)?;
        self.confirm(Toast::destructive(
            "Scene Deleted",
            "The scene has been removed.",
        ));
        self.changed();
        Ok(scene)
    }

    pub fn duplicate_scene(&mut self, id: &str) -> StudioResult<Scene> {
        let result = self.scenes.duplicate(id);
        let scene = self.report(result)?;
        self.changed();
        Ok(scene)
    }

    pub fn rename_scene(&mut self, id: &str, name: &str) -> StudioResult<Scene> {
        let result = self.scenes.rename(id, name);
        let scene = self.report(result)?;
        self.confirm(Toast::info(
            "Scene Renamed",
            format!("Scene renamed to \"{}\".", scene.name),
        ));
        self.changed();
        Ok(scene)
    }

    pub fn move_scene(&mut self, id: &str, direction: Direction) -> StudioResult<bool> {
        let moved = self.scenes.move_scene(id, direction)?;
        if moved {
            self.changed();
        }
        Ok(moved)
    }

    pub fn select_scene(&mut self, id: &str) -> StudioResult<()> {
        self.scenes.select(id)?;
        self.changed();
        Ok(())
    }

    // Sources

    /// Acquire a capture stream and add a source for it
    ///
    /// The new stream replaces the current one, which is stopped.
    pub async fn add_source(
        &mut self,
        kind: SourceKind,
        window_title: Option<String>,
    ) -> StudioResult<(Source, StreamWatch)> {
        let request = CaptureRequest {
            kind,
            constraints: self.profile.capture_constraints(),
            window_title,
        };

        let stream = match self.capture.acquire(&request).await {
            Ok(stream) => Arc::new(stream),
            Err(e) => return self.report(Err(e.into())),
        };

        if let Some(previous) = self.current.take() {
            previous.stream.stop();
        }

        let source = self.sources.add(kind);
        let watch = StreamWatch {
            source_id: source.id.clone(),
            stream_id: stream.id().to_string(),
            ended: stream.ended(),
        };
        tracing::info!("Added {} source {}", kind.label(), source.id);

        self.current = Some(LiveStream {
            source_id: source.id.clone(),
            stream,
        });

        self.confirm(Toast::info(
            "Source Added",
            format!("{} capture source has been added.", kind.label()),
        ));
        self.changed();
        Ok((source, watch))
    }

    pub fn delete_source(&mut self, id: &str) -> StudioResult<Source> {
        let Some(source) = self.sources.remove(id) else {
            return self.report(Err(StudioError::SourceNotFound(id.to_string())));
        };

        if self.current.as_ref().is_some_and(|live| live.source_id == id) {
            if let Some(live) = self.current.take() {
                live.stream.stop();
            }
        }

        self.confirm(Toast::destructive(
            "Source Deleted",
            "The source has been removed.",
        ));
        self.changed();
        Ok(source)
    }

    pub fn move_source(&mut self, id: &str, direction: Direction) -> StudioResult<bool> {
        let moved = self.sources.move_source(id, direction)?;
        if moved {
            self.changed();
        }
        Ok(moved)
    }

    pub fn select_source(&mut self, id: &str) -> StudioResult<()> {
        self.sources.select(id)?;
        self.changed();
        Ok(())
    }

    /// The platform ended a source's stream
    pub async fn handle_stream_ended(&mut self, source_id: &str, stream_id: &str) {
        tracing::info!("Capture for source {} ended", source_id);

        self.sources.remove(source_id);
        self.sources.clear_selection();

        if self
            .current
            .as_ref()
            .is_some_and(|live| live.stream.id() == stream_id)
        {
            self.current = None;
        }

        if self.coordinator.state() != RecordingState::Idle {
            if let Err(e) = self.stop_recording().await {
                tracing::error!("Failed to finalise recording after capture ended: {}", e);
            }
        }

        self.changed();
    }

    pub fn list_windows(&self) -> Vec<WindowInfo> {
        self.capture.list_windows()
    }

    pub fn has_permission(&self) -> bool {
        self.capture.has_permission()
    }

    pub fn request_permission(&self) -> bool {
        self.capture.request_permission()
    }

    // Recording

    async fn recorder_options(&self) -> RecorderOptions {
        let container = self.settings.file_type.container();
        let mime_type = if self.profile.negotiates_codecs() {
            let candidates = self.settings.file_type.candidates();
            let mut supported = Vec::with_capacity(candidates.len());
            for candidate in &candidates {
                if self.recorders.is_type_supported(candidate).await {
                    supported.push(candidate.clone());
                }
            }
            negotiate(&candidates, &container, |m| supported.contains(m))
        } else {
            container
        };
        let (max_width, max_height) = self.settings.resolution.dimensions();

        RecorderOptions {
            mime_type,
            max_width,
            max_height,
            audio_gain: self.mixer.gain(),
        }
    }

    pub fn recording_state(&self) -> RecordingState {
        self.coordinator.state()
    }

    pub fn recording_duration_ms(&self) -> f64 {
        self.coordinator.duration_ms()
    }

    pub fn subscribe_recording(&self) -> broadcast::Receiver<RecordingEvent> {
        self.coordinator.subscribe()
    }

    pub async fn start_recording(&mut self) -> StudioResult<()> {
        let Some(live) = self.current.as_ref() else {
            return self.report(Err(StudioError::NoSource));
        };

        let stream = live.stream.clone();
        let options = self.recorder_options().await;
        tracing::debug!("Recorder options: {:?}", options);

        let started = match self.recorders.create(stream, options) {
            Ok(recorder) => self.coordinator.start(recorder).await,
            Err(e) => Err(e),
        };
        self.report(started.map_err(StudioError::from))?;

        self.notifier.toast(Toast::info(
            "Recording Started",
            "Screen recording is now active.",
        ));
        self.changed();
        Ok(())
    }

    /// Stop recording and write the file to the output directory
    pub async fn stop_recording(&mut self) -> StudioResult<RecordingOutput> {
        if self.coordinator.state() == RecordingState::Idle {
            return Err(RecorderError::NotRecording.into());
        }

        let target = OutputTarget {
            dir: self.output_dir.clone(),
            prefix: self.profile.file_prefix().to_string(),
        };

        let result = self.coordinator.stop(&target).await;
        self.changed();
        let output = result.map_err(|e| self.recorder_failure(e))?;

        tracing::info!("Recording saved to {}", output.path);
        self.notifier
            .emit(StudioEvent::RecordingComplete(output.clone()));
        self.notifier.toast(Toast::info(
            "Recording Complete",
            "Your recording has been saved and downloaded.",
        ));
        Ok(output)
    }

    pub async fn pause_recording(&mut self) -> StudioResult<()> {
        let result = self.coordinator.pause().await;
        result.map_err(|e| self.recorder_failure(e))?;
        self.notifier
            .toast(Toast::info("Recording Paused", "Recording has been paused."));
        self.changed();
        Ok(())
    }

    pub async fn resume_recording(&mut self) -> StudioResult<()> {
        let result = self.coordinator.resume().await;
        result.map_err(|e| self.recorder_failure(e))?;
        self.notifier
            .toast(Toast::info("Recording Resumed", "Recording has been resumed."));
        self.changed();
        Ok(())
    }

    /// Pause when recording, resume when paused, nothing when idle
    pub async fn toggle_pause(&mut self) -> StudioResult<RecordingState> {
        let before = self.coordinator.state();
        let result = self.coordinator.toggle_pause().await;
        let after = result.map_err(|e| self.recorder_failure(e))?;

        match (before, after) {
            (RecordingState::Recording, RecordingState::Paused) => self
                .notifier
                .toast(Toast::info("Recording Paused", "Recording has been paused.")),
            (RecordingState::Paused, RecordingState::Recording) => self
                .notifier
                .toast(Toast::info("Recording Resumed", "Recording has been resumed.")),
            _ => {}
        }
        if before != after {
            self.changed();
        }
        Ok(after)
    }

    // Settings and preview

    pub fn settings(&self) -> RecordingSettings {
        self.settings
    }

    /// Applies to the next recording
    pub fn update_settings(&mut self, settings: RecordingSettings) {
        tracing::info!(
            "Recording settings: {:?} {:?}",
            settings.resolution,
            settings.file_type
        );
        self.settings = settings;
        self.changed();
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn set_output_dir(&mut self, dir: PathBuf) {
        self.output_dir = dir;
    }

    pub fn preview(&self) -> PreviewState {
        match &self.current {
            Some(live) => PreviewState {
                has_signal: true,
                is_recording: self.coordinator.state() != RecordingState::Idle,
                source_name: Some(live.stream.label().to_string()),
            },
            None => PreviewState::no_signal(),
        }
    }
}

/// Shared handle used by commands and background tasks
#[derive(Clone)]
pub struct StudioHandle(Arc<Mutex<Studio>>);

impl StudioHandle {
    pub fn new(studio: Studio) -> Self {
        Self(Arc::new(Mutex::new(studio)))
    }

    pub async fn lock(&self) -> MutexGuard<'_, Studio> {
        self.0.lock().await
    }

    /// Add a source and clean up after it once the platform ends its stream
    pub async fn add_source(
        &self,
        kind: SourceKind,
        window_title: Option<String>,
    ) -> StudioResult<Source> {
        let (source, watch) = self.lock().await.add_source(kind, window_title).await?;

        let handle = self.clone();
        tokio::spawn(async move {
            let StreamWatch {
                source_id,
                stream_id,
                mut ended,
            } = watch;

            // Errors mean the stream was dropped without ending
            if ended.wait_for(|ended| *ended).await.is_ok() {
                handle
                    .lock()
                    .await
                    .handle_stream_ended(&source_id, &stream_id)
                    .await;
            }
        });

        Ok(source)
    }
}
