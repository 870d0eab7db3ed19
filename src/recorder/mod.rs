//! Recording system module
//!
//! - `MediaRecorder` trait for encoders that produce chunks
//! - `RecordingCoordinator` to run the recording lifecycle
//! - MIME negotiation and output file handling

pub mod coordinator;
pub mod ffmpeg;
pub mod media;
pub mod mime;
pub mod output;
pub mod state;

pub use coordinator::{RecordingCoordinator, RecordingEvent};
pub use ffmpeg::FfmpegRecorderFactory;
pub use media::{MediaRecorder, RecorderError, RecorderFactory, RecorderOptions, RecorderResult};
pub use mime::{negotiate, MimeType};
pub use output::OutputTarget;
pub use state::{RecordingOutput, RecordingSegment, RecordingState};
