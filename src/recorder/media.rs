//! Media recorder abstraction
//!
//! A `MediaRecorder` encodes a capture stream and hands the encoded bytes back
//! as a sequence of chunks. The coordinator owns one recorder per session.

use super::mime::MimeType;
use crate::capture::CaptureStream;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

/// Recording errors
#[derive(Error, Debug)]
pub enum RecorderError {
    #[error("Recording already in progress")]
    AlreadyRecording,

    #[error("No recording in progress")]
    NotRecording,

    #[error("Recording is not paused")]
    NotPaused,

    #[error("Unsupported recording format: {0}")]
    UnsupportedType(String),

    #[error("Capture stream is no longer active")]
    StreamInactive,

    #[error("Encoder error: {0}")]
    Encoder(String),

    #[error("The recorder produced no data")]
    EmptyRecording,

    #[error("Operation not supported on this platform: {0}")]
    Unsupported(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type RecorderResult<T> = Result<T, RecorderError>;

/// An encoded piece of the recording
pub type Chunk = Vec<u8>;

/// Native state of a recorder object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecorderState {
    Inactive,
    Recording,
    Paused,
}

/// Encoder options derived from settings and the mixer
#[derive(Debug, Clone, PartialEq)]
pub struct RecorderOptions {
    pub mime_type: MimeType,
    /// Output is scaled down to fit inside this box
    pub max_width: u32,
    pub max_height: u32,
    /// Linear gain applied to the audio track (0.0 records silence)
    pub audio_gain: f32,
}

/// A recorder bound to one capture stream
#[async_trait]
pub trait MediaRecorder: Send + Sync {
    fn mime_type(&self) -> &MimeType;

    fn state(&self) -> RecorderState;

    /// Start encoding; chunks are sent to `sink` as they become available
    async fn start(&mut self, sink: mpsc::UnboundedSender<Chunk>) -> RecorderResult<()>;

    async fn pause(&mut self) -> RecorderResult<()>;

    async fn resume(&mut self) -> RecorderResult<()>;

    /// Stop encoding
    ///
    /// When this returns every remaining chunk has been sent and the sink
    /// has been dropped.
    async fn stop(&mut self) -> RecorderResult<()>;
}

/// Creates recorders and reports which formats they support
#[async_trait]
pub trait RecorderFactory: Send + Sync {
    async fn is_type_supported(&self, mime_type: &MimeType) -> bool;

    fn create(
        &self,
        stream: Arc<CaptureStream>,
        options: RecorderOptions,
    ) -> RecorderResult<Box<dyn MediaRecorder>>;
}
