//! Container/codec MIME types and codec negotiation
//!
//! A recording format is written as `video/webm;codecs=vp9,opus`. The
//! recorder picks the first candidate the encoder supports and falls back to
//! the bare container otherwise.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Container plus optional codec list
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MimeType {
    essence: String,
    codecs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid MIME type: {0}")]
pub struct MimeParseError(String);

impl MimeType {
    pub fn new(essence: &str, codecs: &[&str]) -> Self {
        Self {
            essence: essence.to_ascii_lowercase(),
            codecs: codecs.iter().map(|c| c.to_ascii_lowercase()).collect(),
        }
    }

    /// `type/subtype` without parameters
    pub fn essence(&self) -> &str {
        &self.essence
    }

    pub fn codecs(&self) -> &[String] {
        &self.codecs
    }

    /// Same container without the codec list
    pub fn container(&self) -> MimeType {
        Self {
            essence: self.essence.clone(),
            codecs: Vec::new(),
        }
    }

    /// File extension for the container
    pub fn extension(&self) -> &'static str {
        match self.essence.as_str() {
            "video/mp4" => "mp4",
            "video/quicktime" => "mov",
            "video/x-msvideo" => "avi",
            _ => "webm",
        }
    }

    /// FFmpeg muxer name
    pub fn muxer(&self) -> &'static str {
        match self.essence.as_str() {
            "video/mp4" => "mp4",
            "video/quicktime" => "mov",
            "video/x-msvideo" => "avi",
            _ => "webm",
        }
    }

    /// Video codec, explicit or the container default
    pub fn video_codec(&self) -> &str {
        self.codecs
            .iter()
            .map(String::as_str)
            .find(|c| is_video_codec(c))
            .unwrap_or(match self.essence.as_str() {
                "video/mp4" | "video/quicktime" => "h264",
                "video/x-msvideo" => "mpeg4",
                _ => "vp8",
            })
    }

    /// Audio codec, explicit or the container default
    pub fn audio_codec(&self) -> &str {
        self.codecs
            .iter()
            .map(String::as_str)
            .find(|c| !is_video_codec(c))
            .unwrap_or(match self.essence.as_str() {
                "video/mp4" | "video/quicktime" => "aac",
                "video/x-msvideo" => "mp3",
                _ => "opus",
            })
    }
}

fn is_video_codec(codec: &str) -> bool {
    matches!(
        codec,
        "vp8" | "vp9" | "av1" | "h264" | "avc1" | "hevc" | "h265" | "mpeg4"
    )
}

/// FFmpeg encoder for a codec name
pub fn ffmpeg_encoder(codec: &str) -> Option<&'static str> {
    Some(match codec {
        "vp8" => "libvpx",
        "vp9" => "libvpx-vp9",
        "av1" => "libaom-av1",
        "h264" | "avc1" => "libx264",
        "hevc" | "h265" => "libx265",
        "mpeg4" => "mpeg4",
        "opus" => "libopus",
        "vorbis" => "libvorbis",
        "aac" => "aac",
        "mp3" => "libmp3lame",
        _ => return None,
    })
}

impl FromStr for MimeType {
    type Err = MimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(';');
        let essence = parts.next().unwrap_or("").trim().to_ascii_lowercase();

        let valid = essence
            .split_once('/')
            .map(|(t, sub)| !t.is_empty() && !sub.is_empty() && !sub.contains('/'))
            .unwrap_or(false);
        if !valid {
            return Err(MimeParseError(s.to_string()));
        }

        let mut codecs = Vec::new();
        for param in parts {
            let Some((key, value)) = param.split_once('=') else {
                return Err(MimeParseError(s.to_string()));
            };
            if key.trim().eq_ignore_ascii_case("codecs") {
                codecs = value
                    .trim()
                    .trim_matches('"')
                    .split(',')
                    .map(|c| c.trim().to_ascii_lowercase())
                    .filter(|c| !c.is_empty())
                    .collect();
            }
        }

        Ok(Self { essence, codecs })
    }
}

impl TryFrom<String> for MimeType {
    type Error = MimeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MimeType> for String {
    fn from(value: MimeType) -> Self {
        value.to_string()
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.codecs.is_empty() {
            write!(f, "{}", self.essence)
        } else {
            write!(f, "{};codecs={}", self.essence, self.codecs.join(","))
        }
    }
}

/// Pick the first supported candidate
///
/// Returns `fallback` when nothing in the list is supported.
pub fn negotiate<F>(candidates: &[MimeType], fallback: &MimeType, is_supported: F) -> MimeType
where
    F: Fn(&MimeType) -> bool,
{
    for candidate in candidates {
        if is_supported(candidate) {
            tracing::debug!("Negotiated recording format {}", candidate);
            return candidate.clone();
        }
        tracing::debug!("Recording format {} not supported", candidate);
    }
    tracing::debug!("Falling back to {}", fallback);
    fallback.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_codecs() {
        let mime: MimeType = "video/webm;codecs=vp9,opus".parse().unwrap();
        assert_eq!(mime.essence(), "video/webm");
        assert_eq!(mime.codecs(), ["vp9", "opus"]);
        assert_eq!(mime.video_codec(), "vp9");
        assert_eq!(mime.audio_codec(), "opus");
        assert_eq!(mime.to_string(), "video/webm;codecs=vp9,opus");
    }

    #[test]
    fn test_parse_quoted_codecs() {
        let mime: MimeType = "video/mp4; codecs=\"avc1, aac\"".parse().unwrap();
        assert_eq!(mime.codecs(), ["avc1", "aac"]);
        assert_eq!(mime.extension(), "mp4");
        assert_eq!(ffmpeg_encoder(mime.video_codec()), Some("libx264"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("webm".parse::<MimeType>().is_err());
        assert!("video/".parse::<MimeType>().is_err());
        assert!("video/webm;codecs".parse::<MimeType>().is_err());
    }

    #[test]
    fn test_container_defaults() {
        let webm: MimeType = "video/webm".parse().unwrap();
        assert_eq!(webm.video_codec(), "vp8");
        assert_eq!(webm.audio_codec(), "opus");

        let avi: MimeType = "video/x-msvideo".parse().unwrap();
        assert_eq!(avi.extension(), "avi");
        assert_eq!(avi.audio_codec(), "mp3");
    }

    #[test]
    fn test_negotiate_falls_through() {
        let vp9 = MimeType::new("video/webm", &["vp9", "opus"]);
        let vp8 = MimeType::new("video/webm", &["vp8", "vorbis"]);
        let fallback = MimeType::new("video/webm", &[]);
        let candidates = vec![vp9.clone(), vp8.clone()];

        let picked = negotiate(&candidates, &fallback, |m| m == &vp8);
        assert_eq!(picked, vp8);

        let picked = negotiate(&candidates, &fallback, |_| false);
        assert_eq!(picked, fallback);

        let picked = negotiate(&candidates, &fallback, |_| true);
        assert_eq!(picked, vp9);
    }

    #[test]
    fn test_serde_as_string() {
        let mime = MimeType::new("video/webm", &["vp8", "vorbis"]);
        let json = serde_json::to_string(&mime).unwrap();
        assert_eq!(json, "\"video/webm;codecs=vp8,vorbis\"");
        let back: MimeType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mime);
    }
}
