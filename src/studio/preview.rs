//! Preview pane state

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewState {
    /// A capture stream is live
    pub has_signal: bool,
    /// Show the REC badge
    pub is_recording: bool,
    /// Label of the live stream
    pub source_name: Option<String>,
}

impl PreviewState {
    pub fn no_signal() -> Self {
        Self {
            has_signal: false,
            is_recording: false,
            source_name: None,
        }
    }
}
