//! Recording coordinator
//!
//! Drives a media recorder through the recording lifecycle, buffers the
//! chunks it produces and writes them out when the recording stops.

use super::media::{Chunk, MediaRecorder, RecorderError, RecorderResult, RecorderState};
use super::mime::MimeType;
use super::output::{asset_url, write_recording, OutputTarget};
use super::state::{RecordingOutput, RecordingSegment, RecordingState};
use chrono::Utc;
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

/// Events emitted during recording
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum RecordingEvent {
    /// Recording started
    Started,
    /// Recording stopped and was written out
    Stopped,
    /// Recording paused
    Paused,
    /// Recording resumed
    Resumed,
    /// Error occurred
    Error(String),
}

/// Owns the active recorder and its chunk buffer
pub struct RecordingCoordinator {
    /// Current recording state
    state: Arc<RwLock<RecordingState>>,

    /// Recorder for the active session
    recorder: Option<Box<dyn MediaRecorder>>,

    /// Task buffering chunks until the recorder's sink closes
    collector: Option<JoinHandle<Vec<Chunk>>>,

    /// Segments (one per pause/resume cycle)
    segments: Vec<RecordingSegment>,

    /// Time when recording started
    start_time: Option<Instant>,

    /// Event broadcaster
    event_tx: broadcast::Sender<RecordingEvent>,
}

/// Buffer every non-empty chunk in arrival order
fn spawn_collector(mut rx: mpsc::UnboundedReceiver<Chunk>) -> JoinHandle<Vec<Chunk>> {
    tokio::spawn(async move {
        let mut chunks = Vec::new();
        while let Some(chunk) = rx.recv().await {
            if !chunk.is_empty() {
                chunks.push(chunk);
            }
        }
        chunks
    })
}

impl RecordingCoordinator {
    /// Create a new recording coordinator
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(100);
        Self {
            state: Arc::new(RwLock::new(RecordingState::Idle)),
            recorder: None,
            collector: None,
            segments: Vec::new(),
            start_time: None,
            event_tx,
        }
    }

    /// Get the current recording state
    pub fn state(&self) -> RecordingState {
        *self.state.read()
    }

    /// Format of the active recording
    pub fn mime_type(&self) -> Option<&MimeType> {
        self.recorder.as_ref().map(|r| r.mime_type())
    }

    /// Subscribe to recording events
    pub fn subscribe(&self) -> broadcast::Receiver<RecordingEvent> {
        self.event_tx.subscribe()
    }

    fn process_time_ms(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64() * 1000.0)
            .unwrap_or(0.0)
    }

    /// Start recording with a fresh recorder
    pub async fn start(&mut self, mut recorder: Box<dyn MediaRecorder>) -> RecorderResult<()> {
        if self.state() != RecordingState::Idle {
            return Err(RecorderError::AlreadyRecording);
        }

        tracing::info!("Starting recording as {}", recorder.mime_type());

        let (tx, rx) = mpsc::unbounded_channel();
        let collector = spawn_collector(rx);

        if let Err(e) = recorder.start(tx).await {
            collector.abort();
            let _ = self.event_tx.send(RecordingEvent::Error(e.to_string()));
            return Err(e);
        }

        self.start_time = Some(Instant::now());
        self.segments.clear();
        self.segments.push(RecordingSegment::new(0, 0.0));
        self.recorder = Some(recorder);
        self.collector = Some(collector);

        *self.state.write() = RecordingState::Recording;
        let _ = self.event_tx.send(RecordingEvent::Started);

        tracing::info!("Recording started");
        Ok(())
    }

    /// Stop recording and write the buffered chunks to `target`
    pub async fn stop(&mut self, target: &OutputTarget) -> RecorderResult<RecordingOutput> {
        if self.state() == RecordingState::Idle {
            return Err(RecorderError::NotRecording);
        }

        tracing::info!("Stopping recording");

        if self.state() == RecordingState::Recording {
            let end_time = self.process_time_ms();
            if let Some(segment) = self.segments.last_mut() {
                segment.end(end_time);
            }
        }

        let mut recorder = self.recorder.take().ok_or(RecorderError::NotRecording)?;
        if let Err(e) = recorder.stop().await {
            tracing::warn!("Recorder did not stop cleanly: {}", e);
        }

        let chunks = match self.collector.take() {
            Some(collector) => collector.await.unwrap_or_else(|e| {
                tracing::error!("Chunk collector failed: {}", e);
                Vec::new()
            }),
            None => Vec::new(),
        };

        let total_duration_ms: f64 = self.segments.iter().map(|s| s.duration_ms).sum();
        let segment_count = self.segments.len();
        let mime_type = recorder.mime_type().clone();

        self.start_time = None;
        self.segments.clear();
        *self.state.write() = RecordingState::Idle;

        if chunks.is_empty() {
            tracing::error!("Recording produced no data, nothing written");
            let error = RecorderError::EmptyRecording;
            let _ = self.event_tx.send(RecordingEvent::Error(error.to_string()));
            return Err(error);
        }

        let written = write_recording(&chunks, target, mime_type.extension(), Utc::now());
        let (path, size_bytes) = match written {
            Ok(written) => written,
            Err(e) => {
                let _ = self.event_tx.send(RecordingEvent::Error(e.to_string()));
                return Err(e.into());
            }
        };

        let output = RecordingOutput {
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            asset_url: asset_url(&path),
            path: path.to_string_lossy().to_string(),
            mime_type,
            size_bytes,
            chunk_count: chunks.len(),
            total_duration_ms,
            segment_count,
        };

        let _ = self.event_tx.send(RecordingEvent::Stopped);
        tracing::info!("Recording stopped. Duration: {}ms", total_duration_ms);
        Ok(output)
    }

    /// Pause recording
    pub async fn pause(&mut self) -> RecorderResult<()> {
        if self.state() != RecordingState::Recording {
            return Err(RecorderError::NotRecording);
        }

        let recorder = self.recorder.as_mut().ok_or(RecorderError::NotRecording)?;
        if recorder.state() != RecorderState::Recording {
            return Err(RecorderError::NotRecording);
        }

        tracing::info!("Pausing recording");
        recorder.pause().await?;

        let end_time = self.process_time_ms();
        if let Some(segment) = self.segments.last_mut() {
            segment.end(end_time);
        }

        *self.state.write() = RecordingState::Paused;
        let _ = self.event_tx.send(RecordingEvent::Paused);
        Ok(())
    }

    /// Resume recording
    pub async fn resume(&mut self) -> RecorderResult<()> {
        if self.state() != RecordingState::Paused {
            return Err(RecorderError::NotPaused);
        }

        let recorder = self.recorder.as_mut().ok_or(RecorderError::NotRecording)?;
        if recorder.state() != RecorderState::Paused {
            return Err(RecorderError::NotPaused);
        }

        tracing::info!("Resuming recording");
        recorder.resume().await?;

        let index = self.segments.len();
        let segment = RecordingSegment::new(index, self.process_time_ms());
        self.segments.push(segment);

        *self.state.write() = RecordingState::Recording;
        let _ = self.event_tx.send(RecordingEvent::Resumed);
        Ok(())
    }

    /// Pause when recording, resume when paused, nothing when idle
    pub async fn toggle_pause(&mut self) -> RecorderResult<RecordingState> {
        match self.state() {
            RecordingState::Recording => self.pause().await?,
            RecordingState::Paused => self.resume().await?,
            RecordingState::Idle => {}
        }
        Ok(self.state())
    }

    /// Get recording duration in milliseconds, excluding pauses
    pub fn duration_ms(&self) -> f64 {
        let completed: f64 = self
            .segments
            .iter()
            .take(self.segments.len().saturating_sub(1))
            .map(|s| s.duration_ms)
            .sum();

        let current = if self.state() == RecordingState::Recording {
            self.segments
                .last()
                .map(|s| self.process_time_ms() - s.process_time_start_ms)
                .unwrap_or(0.0)
        } else {
            self.segments.last().map(|s| s.duration_ms).unwrap_or(0.0)
        };

        completed + current
    }
}

impl Default for RecordingCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
