//! Studio profiles
//!
//! The studio ships in two flavours that share everything except a handful
//! of behaviours: whether the default scene is protected, how the capture
//! device and recording format are chosen, the file prefix, and how chatty
//! the scene/source lists are.

use crate::capture::CaptureConstraints;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    #[default]
    Babx,
    Obs,
}

/// Which scenes may be deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Everything except the default scene
    ProtectDefault,
    /// Any scene, including the last one
    AllowAny,
}

impl Profile {
    pub fn delete_policy(&self) -> DeletePolicy {
        match self {
            Profile::Babx => DeletePolicy::ProtectDefault,
            Profile::Obs => DeletePolicy::AllowAny,
        }
    }

    pub fn capture_constraints(&self) -> CaptureConstraints {
        match self {
            Profile::Babx => CaptureConstraints::detailed(),
            Profile::Obs => CaptureConstraints::platform_default(),
        }
    }

    /// Try the preferred codecs before the container default
    pub fn negotiates_codecs(&self) -> bool {
        matches!(self, Profile::Babx)
    }

    pub fn file_prefix(&self) -> &'static str {
        match self {
            Profile::Babx => "babxrec",
            Profile::Obs => "recording",
        }
    }

    /// Confirm successful scene and source edits with a toast
    pub fn confirms_edits(&self) -> bool {
        matches!(self, Profile::Obs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles_differ() {
        assert_eq!(Profile::Babx.delete_policy(), DeletePolicy::ProtectDefault);
        assert_eq!(Profile::Obs.delete_policy(), DeletePolicy::AllowAny);
        assert_eq!(Profile::Babx.file_prefix(), "babxrec");
        assert_eq!(Profile::Obs.file_prefix(), "recording");
        assert_eq!(
            Profile::Babx.capture_constraints().video.max_width,
            Some(1920)
        );
        assert_eq!(Profile::Obs.capture_constraints().video.max_width, None);
    }

    #[test]
    fn test_profile_from_toml_value() {
        #[derive(Deserialize)]
        struct Wrapper {
            profile: Profile,
        }
        let parsed: Wrapper = toml::from_str("profile = \"obs\"").unwrap();
        assert_eq!(parsed.profile, Profile::Obs);
    }
}
