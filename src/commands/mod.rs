//! Tauri command handlers
//!
//! This module contains all the IPC command handlers that can be called
//! from the frontend via Tauri's invoke system.

pub mod events;
pub mod mixer;
pub mod recording;
pub mod studio;
pub mod system;

use crate::config::StudioConfig;
use crate::utils::{ErrorResponse, StudioError};
use parking_lot::Mutex;

/// Persisted configuration, updated by the settings commands
pub struct ConfigState {
    pub config: Mutex<StudioConfig>,
}

impl ConfigState {
    pub fn new(config: StudioConfig) -> Self {
        Self {
            config: Mutex::new(config),
        }
    }
}

/// Encode a failure as `{ code, message }` JSON for the frontend
pub(crate) fn command_error(error: StudioError) -> String {
    let response = ErrorResponse::from(error);
    serde_json::to_string(&response).unwrap_or(response.message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_error_is_json() {
        let encoded = command_error(StudioError::NoSource);
        let decoded: ErrorResponse = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.code, "NO_SOURCE");
        assert_eq!(decoded.message, "No capture source is active");
    }
}
