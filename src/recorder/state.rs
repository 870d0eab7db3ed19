//! Recording state management
//!
//! Defines the recording state machine and segment tracking.

use super::mime::MimeType;
use serde::{Deserialize, Serialize};

/// Current state of the recording system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingState {
    /// No recording in progress
    #[default]
    Idle,
    /// Currently recording
    Recording,
    /// Recording is paused
    Paused,
}

/// One uninterrupted stretch of recording
///
/// A new segment starts each time recording is resumed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingSegment {
    /// Segment index (0, 1, 2, ...)
    pub index: usize,

    /// Duration of this segment in milliseconds
    pub duration_ms: f64,

    /// Process time when the segment started (relative to recording start)
    pub process_time_start_ms: f64,

    /// Process time when the segment ended
    pub process_time_end_ms: f64,
}

impl RecordingSegment {
    /// Create a segment starting at `process_time_ms`
    pub fn new(index: usize, process_time_ms: f64) -> Self {
        Self {
            index,
            duration_ms: 0.0,
            process_time_start_ms: process_time_ms,
            process_time_end_ms: process_time_ms,
        }
    }

    /// End the segment
    pub fn end(&mut self, process_time_ms: f64) {
        self.process_time_end_ms = process_time_ms;
        self.duration_ms = self.process_time_end_ms - self.process_time_start_ms;
    }
}

/// A finished recording written to disk
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingOutput {
    /// Absolute path of the written file
    pub path: String,

    /// File name offered to the user
    pub file_name: String,

    /// URL the webview can load the file from
    pub asset_url: String,

    /// Negotiated container and codecs
    pub mime_type: MimeType,

    /// Size of the file in bytes
    pub size_bytes: u64,

    /// Number of chunks the recording was assembled from
    pub chunk_count: usize,

    /// Recorded time in milliseconds, excluding pauses
    pub total_duration_ms: f64,

    /// Number of pause/resume segments
    pub segment_count: usize,
}
