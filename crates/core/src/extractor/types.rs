//! Types for the extractor module.

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Suffix of the media info sidecar written next to an item.
pub const MEDIA_INFO_SUFFIX: &str = ".mediainfo.json";
/// Suffix of the fingerprint sidecar written next to an item.
pub const FINGERPRINT_SUFFIX: &str = ".fingerprint";

/// What an extractor produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ExtractMode {
    /// Technical metadata via ffprobe.
    Probe,
    /// Chromaprint fingerprint of the first `minutes` of audio.
    Fingerprint { minutes: u32 },
}

impl ExtractMode {
    /// Sidecar suffix for this mode.
    pub fn sidecar_suffix(&self) -> &'static str {
        match self {
            ExtractMode::Probe => MEDIA_INFO_SUFFIX,
            ExtractMode::Fingerprint { .. } => FINGERPRINT_SUFFIX,
        }
    }
}

/// Returns `path` with `suffix` appended to its file name.
pub fn sidecar_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Technical metadata of a media source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Probed input (file path or stream URL).
    pub source: String,
    /// Size in bytes, when the container reports it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    /// Duration in seconds.
    pub duration_secs: f64,
    /// Container format (e.g. "matroska").
    pub format: String,
    /// Number of streams of any type.
    pub stream_count: usize,
    /// Number of subtitle streams.
    pub subtitle_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_codec: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_bitrate_kbps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_sample_rate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_channels: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_codec: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_fps: Option<f32>,
}

impl MediaInfo {
    /// Whether the source has at least one audio or video stream.
    pub fn has_media_stream(&self) -> bool {
        self.audio_codec.is_some() || self.video_codec.is_some()
    }
}
