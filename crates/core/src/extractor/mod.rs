//! FFmpeg-backed extraction workers.
//!
//! [`FfmpegExtractor`] is the [`ExtractionWorker`](crate::drain::ExtractionWorker)
//! used by both drains: in probe mode it stores ffprobe output as a
//! `<file>.mediainfo.json` sidecar, in fingerprint mode it stores a raw
//! chromaprint of the opening minutes as `<file>.fingerprint`.
//!
//! # Example
//!
//! ```ignore
//! use strmkit_core::extractor::{ExtractMode, FfmpegExtractor};
//!
//! let worker = FfmpegExtractor::new(ExtractMode::Probe, &config.extractor);
//! worker.extract(&item, &cancel).await?;
//! ```

mod error;
mod ffmpeg;
mod inspector;
mod types;

pub use error::ExtractorError;
pub use ffmpeg::FfmpegExtractor;
pub use inspector::SidecarInspector;
pub use types::{sidecar_path, ExtractMode, MediaInfo, FINGERPRINT_SUFFIX, MEDIA_INFO_SUFFIX};
