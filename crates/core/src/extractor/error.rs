//! Error types for the extractor module.

use std::path::PathBuf;
use thiserror::Error;

use crate::drain::WorkerError;

/// Errors that can occur while extracting one item.
#[derive(Debug, Error)]
pub enum ExtractorError {
    /// FFmpeg binary not found.
    #[error("FFmpeg not found at path: {path}")]
    FfmpegNotFound { path: PathBuf },

    /// FFprobe binary not found.
    #[error("FFprobe not found at path: {path}")]
    FfprobeNotFound { path: PathBuf },

    /// Input file not found.
    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    /// A `.strm` shortcut holds no usable URL.
    #[error("Shortcut has no stream URL: {path}")]
    EmptyShortcut { path: PathBuf },

    /// ffprobe failed.
    #[error("Failed to probe media: {reason}")]
    ProbeFailed { reason: String },

    /// ffmpeg fingerprinting failed.
    #[error("Failed to fingerprint audio: {reason}")]
    FingerprintFailed { reason: String },

    /// The tool did not finish in time.
    #[error("Extraction timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// Failed to parse FFprobe output.
    #[error("Failed to parse media info: {reason}")]
    ParseError { reason: String },

    /// I/O error while running a tool or writing results.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Extraction was cancelled.
    #[error("Extraction cancelled")]
    Cancelled,
}

impl ExtractorError {
    /// Creates a probe failure.
    pub fn probe_failed(reason: impl Into<String>) -> Self {
        Self::ProbeFailed {
            reason: reason.into(),
        }
    }

    /// Creates a fingerprint failure.
    pub fn fingerprint_failed(reason: impl Into<String>) -> Self {
        Self::FingerprintFailed {
            reason: reason.into(),
        }
    }
}

impl From<ExtractorError> for WorkerError {
    fn from(err: ExtractorError) -> Self {
        match err {
            ExtractorError::Cancelled => WorkerError::Cancelled,
            other => WorkerError::failed(other.to_string()),
        }
    }
}
