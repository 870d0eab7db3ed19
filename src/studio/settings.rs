//! Recording settings
//!
//! Output quality and file format chosen in the settings dialog.

use crate::recorder::MimeType;
use serde::{Deserialize, Serialize};

/// Output resolution cap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "144p")]
    P144,
    #[serde(rename = "240p")]
    P240,
    #[serde(rename = "360p")]
    P360,
    #[serde(rename = "480p")]
    P480,
    #[serde(rename = "720p")]
    P720,
    #[default]
    #[serde(rename = "1080p")]
    P1080,
}

impl Resolution {
    pub const ALL: [Resolution; 6] = [
        Resolution::P144,
        Resolution::P240,
        Resolution::P360,
        Resolution::P480,
        Resolution::P720,
        Resolution::P1080,
    ];

    /// Width and height in pixels
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Resolution::P144 => (256, 144),
            Resolution::P240 => (426, 240),
            Resolution::P360 => (640, 360),
            Resolution::P480 => (854, 480),
            Resolution::P720 => (1280, 720),
            Resolution::P1080 => (1920, 1080),
        }
    }

    pub fn label(&self) -> String {
        let (w, h) = self.dimensions();
        format!("{}p ({}x{})", h, w, h)
    }
}

/// Output container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    #[default]
    Webm,
    Mp4,
    Mov,
    Avi,
}

impl FileType {
    pub const ALL: [FileType; 4] = [FileType::Webm, FileType::Mp4, FileType::Mov, FileType::Avi];

    pub fn label(&self) -> &'static str {
        match self {
            FileType::Webm => "WebM (Recommended)",
            FileType::Mp4 => "MP4",
            FileType::Mov => "MOV",
            FileType::Avi => "AVI",
        }
    }

    /// Container without codecs; the encoder picks its defaults
    pub fn container(&self) -> MimeType {
        match self {
            FileType::Webm => MimeType::new("video/webm", &[]),
            FileType::Mp4 => MimeType::new("video/mp4", &[]),
            FileType::Mov => MimeType::new("video/quicktime", &[]),
            FileType::Avi => MimeType::new("video/x-msvideo", &[]),
        }
    }

    /// Preferred formats, best first
    pub fn candidates(&self) -> Vec<MimeType> {
        match self {
            FileType::Webm => vec![
                MimeType::new("video/webm", &["vp9", "opus"]),
                MimeType::new("video/webm", &["vp8", "vorbis"]),
            ],
            FileType::Mp4 => vec![MimeType::new("video/mp4", &["h264", "aac"])],
            FileType::Mov => vec![MimeType::new("video/quicktime", &["h264", "aac"])],
            FileType::Avi => vec![MimeType::new("video/x-msvideo", &["mpeg4", "mp3"])],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingSettings {
    #[serde(default)]
    pub resolution: Resolution,
    #[serde(default)]
    pub file_type: FileType,
}

/// A selectable option for the settings dialog
#[derive(Debug, Clone, Serialize)]
pub struct SettingOption {
    pub value: String,
    pub label: String,
}

/// Options listed in the settings dialog
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsOptions {
    pub resolutions: Vec<SettingOption>,
    pub file_types: Vec<SettingOption>,
}

fn serialized_value<T: Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

impl SettingsOptions {
    pub fn all() -> Self {
        Self {
            resolutions: Resolution::ALL
                .iter()
                .map(|r| SettingOption {
                    value: serialized_value(r),
                    label: r.label(),
                })
                .collect(),
            file_types: FileType::ALL
                .iter()
                .map(|f| SettingOption {
                    value: serialized_value(f),
                    label: f.label().to_string(),
                })
                .collect(),
        }
    }
}
