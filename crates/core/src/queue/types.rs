//! Types for the item queues.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Kind of library item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Movie,
    Episode,
    Video,
    Audio,
    #[default]
    Other,
}

/// A reference to a library media item.
///
/// Carries identity and location only; queues attach no metadata to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaItem {
    /// Library item ID.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// File path (for `.strm` shortcuts, the path of the shortcut file).
    pub path: PathBuf,
    /// Item kind.
    #[serde(default)]
    pub kind: ItemKind,
    /// Whether the item is a `.strm` shortcut to a remote stream.
    #[serde(default)]
    pub is_shortcut: bool,
    /// Whether the item is an extra (trailer, featurette, ...).
    #[serde(default)]
    pub is_extra: bool,
}

impl MediaItem {
    /// Creates an item of kind [`ItemKind::Other`].
    pub fn new(id: i64, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let is_shortcut = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("strm"))
            .unwrap_or(false);

        Self {
            id,
            name: name.into(),
            path,
            kind: ItemKind::Other,
            is_shortcut,
            is_extra: false,
        }
    }

    /// Sets the item kind.
    pub fn with_kind(mut self, kind: ItemKind) -> Self {
        self.kind = kind;
        self
    }

    /// Marks the item as an extra.
    pub fn as_extra(mut self) -> Self {
        self.is_extra = true;
        self
    }
}

impl fmt::Display for MediaItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.name, self.path.display())
    }
}

/// Workload class served by a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueKind {
    /// Technical metadata probing.
    MediaInfo,
    /// Intro fingerprint computation.
    IntroFingerprint,
}

impl QueueKind {
    /// All queue kinds, in display order.
    pub const ALL: [QueueKind; 2] = [QueueKind::MediaInfo, QueueKind::IntroFingerprint];

    /// Stable identifier used in logs, metrics and URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueKind::MediaInfo => "media_info",
            QueueKind::IntroFingerprint => "intro_fingerprint",
        }
    }
}

impl fmt::Display for QueueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognised queue identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown queue: {0}")]
pub struct UnknownQueue(pub String);

impl FromStr for QueueKind {
    type Err = UnknownQueue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "media_info" => Ok(QueueKind::MediaInfo),
            "intro_fingerprint" => Ok(QueueKind::IntroFingerprint),
            other => Err(UnknownQueue(other.to_string())),
        }
    }
}

/// Queue depth report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueStatus {
    pub queue: QueueKind,
    pub depth: usize,
}
