//! FFmpeg-based extraction worker.

use async_trait::async_trait;
use serde::Deserialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::ExtractorConfig;
use crate::drain::{ExtractionWorker, WorkerError};
use crate::queue::MediaItem;

use super::error::ExtractorError;
use super::types::{sidecar_path, ExtractMode, MediaInfo};

/// Runs ffprobe or ffmpeg on each item and stores the result as a sidecar file.
///
/// `.strm` shortcuts are resolved to the URL on their first non-comment line.
/// The child process is killed when the item is cancelled or times out.
pub struct FfmpegExtractor {
    mode: ExtractMode,
    ffmpeg_path: PathBuf,
    ffprobe_path: PathBuf,
    timeout_secs: u64,
}

impl FfmpegExtractor {
    /// Creates an extractor for `mode` using the configured tool paths.
    pub fn new(mode: ExtractMode, config: &ExtractorConfig) -> Self {
        Self {
            mode,
            ffmpeg_path: config.ffmpeg_path.clone(),
            ffprobe_path: config.ffprobe_path.clone(),
            timeout_secs: config.timeout_secs,
        }
    }

    /// Creates an ffprobe extractor with default tool paths.
    pub fn probe_with_defaults() -> Self {
        Self::new(ExtractMode::Probe, &ExtractorConfig::default())
    }

    pub fn mode(&self) -> ExtractMode {
        self.mode
    }

    /// Probes `item` and writes its media info sidecar.
    pub async fn probe(
        &self,
        item: &MediaItem,
        cancel: &CancellationToken,
    ) -> Result<MediaInfo, ExtractorError> {
        let input = resolve_input(item).await?;

        let mut args: Vec<OsString> = [
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ]
        .iter()
        .map(OsString::from)
        .collect();
        args.push(input.clone());

        let output = self.run_tool(&self.ffprobe_path, &args, cancel).await?;
        if !output.status.success() {
            return Err(ExtractorError::probe_failed(format!(
                "ffprobe exited with code {:?}: {}",
                output.status.code(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let info = parse_probe_output(&input.to_string_lossy(), &stdout)?;

        let json = serde_json::to_vec_pretty(&info).map_err(|e| ExtractorError::ParseError {
            reason: e.to_string(),
        })?;
        let sidecar = sidecar_path(&item.path, self.mode.sidecar_suffix());
        tokio::fs::write(&sidecar, json).await?;

        debug!(item_id = item.id, sidecar = %sidecar.display(), "Media info written");
        Ok(info)
    }

    /// Fingerprints the first `minutes` of audio and writes the raw fingerprint sidecar.
    pub async fn fingerprint(
        &self,
        item: &MediaItem,
        minutes: u32,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, ExtractorError> {
        let input = resolve_input(item).await?;
        let seconds = (u64::from(minutes) * 60).to_string();

        let mut args: Vec<OsString> = ["-hide_banner", "-loglevel", "error", "-t"]
            .iter()
            .map(OsString::from)
            .collect();
        args.push(OsString::from(seconds));
        args.push(OsString::from("-i"));
        args.push(input);
        args.extend(
            ["-ac", "1", "-f", "chromaprint", "-fp_format", "raw", "-"]
                .iter()
                .map(OsString::from),
        );

        let output = self.run_tool(&self.ffmpeg_path, &args, cancel).await?;
        if !output.status.success() {
            return Err(ExtractorError::fingerprint_failed(format!(
                "ffmpeg exited with code {:?}: {}",
                output.status.code(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        if output.stdout.is_empty() {
            return Err(ExtractorError::fingerprint_failed("no audio fingerprint produced"));
        }

        let sidecar = sidecar_path(&item.path, self.mode.sidecar_suffix());
        tokio::fs::write(&sidecar, &output.stdout).await?;

        debug!(
            item_id = item.id,
            bytes = output.stdout.len(),
            sidecar = %sidecar.display(),
            "Fingerprint written"
        );
        Ok(output.stdout)
    }

    /// Runs a tool to completion, honouring cancellation and the timeout.
    async fn run_tool(
        &self,
        program: &Path,
        args: &[OsString],
        cancel: &CancellationToken,
    ) -> Result<Output, ExtractorError> {
        if cancel.is_cancelled() {
            return Err(ExtractorError::Cancelled);
        }

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    match self.mode {
                        ExtractMode::Probe => ExtractorError::FfprobeNotFound {
                            path: program.to_path_buf(),
                        },
                        ExtractMode::Fingerprint { .. } => ExtractorError::FfmpegNotFound {
                            path: program.to_path_buf(),
                        },
                    }
                } else {
                    ExtractorError::Io(e)
                }
            })?;

        // Dropping the wait future drops the child, which kills it.
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ExtractorError::Cancelled),
            result = timeout(Duration::from_secs(self.timeout_secs), child.wait_with_output()) => {
                match result {
                    Ok(output) => Ok(output?),
                    Err(_) => Err(ExtractorError::Timeout {
                        timeout_secs: self.timeout_secs,
                    }),
                }
            }
        }
    }
}

#[async_trait]
impl ExtractionWorker for FfmpegExtractor {
    fn name(&self) -> &str {
        match self.mode {
            ExtractMode::Probe => "ffprobe",
            ExtractMode::Fingerprint { .. } => "ffmpeg-chromaprint",
        }
    }

    async fn extract(
        &self,
        item: &MediaItem,
        cancel: &CancellationToken,
    ) -> Result<(), WorkerError> {
        match self.mode {
            ExtractMode::Probe => {
                self.probe(item, cancel).await?;
            }
            ExtractMode::Fingerprint { minutes } => {
                self.fingerprint(item, minutes, cancel).await?;
            }
        }
        Ok(())
    }
}

/// Returns what to hand to ffmpeg for `item`: the file itself, or a shortcut's URL.
async fn resolve_input(item: &MediaItem) -> Result<OsString, ExtractorError> {
    if !item.is_shortcut {
        if !tokio::fs::try_exists(&item.path).await.unwrap_or(false) {
            return Err(ExtractorError::InputNotFound {
                path: item.path.clone(),
            });
        }
        return Ok(item.path.clone().into_os_string());
    }

    let contents = tokio::fs::read_to_string(&item.path)
        .await
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ExtractorError::InputNotFound {
                path: item.path.clone(),
            },
            _ => ExtractorError::Io(e),
        })?;

    shortcut_target(&contents)
        .map(OsString::from)
        .ok_or_else(|| ExtractorError::EmptyShortcut {
            path: item.path.clone(),
        })
}

/// First non-empty, non-comment line of a `.strm` file.
fn shortcut_target(contents: &str) -> Option<&str> {
    contents
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
}

/// Parses ffprobe JSON output into MediaInfo.
fn parse_probe_output(source: &str, output: &str) -> Result<MediaInfo, ExtractorError> {
    #[derive(Deserialize)]
    struct ProbeOutput {
        format: ProbeFormat,
        #[serde(default)]
        streams: Vec<ProbeStream>,
    }

    #[derive(Deserialize)]
    struct ProbeFormat {
        format_name: String,
        duration: Option<String>,
        size: Option<String>,
    }

    #[derive(Deserialize)]
    struct ProbeStream {
        codec_type: String,
        codec_name: Option<String>,
        bit_rate: Option<String>,
        sample_rate: Option<String>,
        channels: Option<u8>,
        width: Option<u32>,
        height: Option<u32>,
        r_frame_rate: Option<String>,
    }

    let probe: ProbeOutput =
        serde_json::from_str(output).map_err(|e| ExtractorError::ParseError {
            reason: format!("Failed to parse ffprobe output: {}", e),
        })?;

    let duration_secs = probe
        .format
        .duration
        .as_ref()
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);

    let size_bytes = probe
        .format
        .size
        .as_ref()
        .and_then(|s| s.parse::<u64>().ok());

    let audio_stream = probe.streams.iter().find(|s| s.codec_type == "audio");
    let video_stream = probe.streams.iter().find(|s| s.codec_type == "video");
    let subtitle_count = probe
        .streams
        .iter()
        .filter(|s| s.codec_type == "subtitle")
        .count();

    let format_name = probe
        .format
        .format_name
        .split(',')
        .next()
        .unwrap_or("unknown");

    Ok(MediaInfo {
        source: source.to_string(),
        size_bytes,
        duration_secs,
        format: format_name.to_string(),
        stream_count: probe.streams.len(),
        subtitle_count,
        audio_codec: audio_stream.and_then(|s| s.codec_name.clone()),
        audio_bitrate_kbps: audio_stream
            .and_then(|s| s.bit_rate.as_ref())
            .and_then(|b| b.parse::<u32>().ok())
            .map(|b| b / 1000),
        audio_sample_rate: audio_stream
            .and_then(|s| s.sample_rate.as_ref())
            .and_then(|r| r.parse::<u32>().ok()),
        audio_channels: audio_stream.and_then(|s| s.channels),
        video_codec: video_stream.and_then(|s| s.codec_name.clone()),
        video_width: video_stream.and_then(|s| s.width),
        video_height: video_stream.and_then(|s| s.height),
        video_fps: video_stream
            .and_then(|s| s.r_frame_rate.as_deref())
            .and_then(parse_frame_rate),
    })
}

/// Parses a frame rate like "24000/1001" or "25".
fn parse_frame_rate(rate: &str) -> Option<f32> {
    match rate.split_once('/') {
        Some((num, den)) => {
            let num = num.parse::<f32>().ok()?;
            let den = den.parse::<f32>().ok()?;
            (den > 0.0).then(|| num / den)
        }
        None => rate.parse::<f32>().ok(),
    }
}
