//! Error types and handling
//!
//! Common error types used across the application.

use crate::capture::CaptureError;
use crate::config::ConfigError;
use crate::recorder::RecorderError;
use crate::studio::notify::Toast;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum StudioError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    #[error("Recording error: {0}")]
    Recording(#[from] RecorderError),

    #[error("Please enter a scene name")]
    EmptyName,

    #[error("Scene not found: {0}")]
    SceneNotFound(String),

    #[error("Source not found: {0}")]
    SourceNotFound(String),

    #[error("The default scene cannot be deleted.")]
    DefaultSceneProtected,

    #[error("No capture source is active")]
    NoSource,
}

impl StudioError {
    /// The notification shown to the user for this failure
    pub fn toast(&self) -> Toast {
        match self {
            StudioError::DefaultSceneProtected => Toast::destructive(
                "Cannot delete default scene",
                "The default scene cannot be deleted.",
            ),
            StudioError::EmptyName => Toast::destructive("Error", "Please enter a scene name"),
            StudioError::NoSource => Toast::destructive(
                "No Source",
                "Please add a screen or window capture source first.",
            ),
            StudioError::Capture(_) => Toast::destructive(
                "Error",
                "Failed to access screen capture. Please check permissions.",
            ),
            StudioError::Recording(_) => Toast::destructive(
                "Recording Error",
                "Failed to start recording. Please try again.",
            ),
            other => Toast::destructive("Error", other.to_string()),
        }
    }
}

/// Error response for frontend
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<StudioError> for ErrorResponse {
    fn from(error: StudioError) -> Self {
        let code = match &error {
            StudioError::Io(_) => "IO_ERROR",
            StudioError::Config(_) => "CONFIG_ERROR",
            StudioError::Capture(CaptureError::PermissionDenied) => "PERMISSION_DENIED",
            StudioError::Capture(_) => "CAPTURE_ERROR",
            StudioError::Recording(_) => "RECORDING_ERROR",
            StudioError::EmptyName => "INVALID_NAME",
            StudioError::SceneNotFound(_) => "SCENE_NOT_FOUND",
            StudioError::SourceNotFound(_) => "SOURCE_NOT_FOUND",
            StudioError::DefaultSceneProtected => "DEFAULT_SCENE_PROTECTED",
            StudioError::NoSource => "NO_SOURCE",
        };

        ErrorResponse {
            code: code.to_string(),
            message: error.to_string(),
        }
    }
}

/// Result type alias using StudioError
pub type StudioResult<T> = Result<T, StudioError>;
