use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Lowest accepted `general.max_concurrent_count`.
pub const MIN_CONCURRENT_COUNT: usize = 1;
/// Highest accepted `general.max_concurrent_count`.
pub const MAX_CONCURRENT_COUNT: usize = 20;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub media_info: MediaInfoConfig,
    #[serde(default)]
    pub intro_skip: IntroSkipConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Settings shared by every workload.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Process-wide limit on concurrently running extraction jobs.
    #[serde(default = "default_max_concurrent_count")]
    pub max_concurrent_count: usize,
    /// Extract media info as soon as items are added or favorited.
    #[serde(default)]
    pub catchup_mode: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            max_concurrent_count: default_max_concurrent_count(),
            catchup_mode: false,
        }
    }
}

fn default_max_concurrent_count() -> usize {
    1
}

/// Media info extraction settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MediaInfoConfig {
    /// In catch-up mode, queue every new item instead of shortcuts only.
    #[serde(default)]
    pub exclusive_extract: bool,
    /// Also process extras.
    #[serde(default)]
    pub include_extra: bool,
}

/// Intro detection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IntroSkipConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Length of audio fingerprinted from the start of each episode.
    #[serde(default = "default_fingerprint_minutes")]
    pub fingerprint_minutes: u32,
    /// Library roots in scope for intro detection (empty: everything).
    #[serde(default)]
    pub library_paths: Vec<PathBuf>,
}

impl Default for IntroSkipConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            fingerprint_minutes: default_fingerprint_minutes(),
            library_paths: Vec::new(),
        }
    }
}

fn default_fingerprint_minutes() -> u32 {
    10
}

/// Scheduled drain settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SchedulerConfig {
    /// Seconds between automatic media info drains (0: on demand only).
    #[serde(default)]
    pub media_info_interval_secs: u64,
    /// Seconds between automatic fingerprint drains (0: on demand only).
    #[serde(default)]
    pub intro_fingerprint_interval_secs: u64,
    /// Task requested after a completed fingerprint drain.
    #[serde(default = "default_follow_up_task")]
    pub follow_up_task: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            media_info_interval_secs: 0,
            intro_fingerprint_interval_secs: 0,
            follow_up_task: default_follow_up_task(),
        }
    }
}

fn default_follow_up_task() -> String {
    "detect_episode_intros".to_string()
}

/// External tool settings for the extractor.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractorConfig {
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: PathBuf,
    /// Per-item timeout in seconds.
    #[serde(default = "default_extractor_timeout")]
    pub timeout_secs: u64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: default_ffprobe_path(),
            timeout_secs: default_extractor_timeout(),
        }
    }
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_ffprobe_path() -> PathBuf {
    PathBuf::from("ffprobe")
}

fn default_extractor_timeout() -> u64 {
    600
}

/// Config view for API responses (host tool paths hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub general: GeneralConfig,
    pub media_info: MediaInfoConfig,
    pub intro_skip: SanitizedIntroSkipConfig,
    pub scheduler: SchedulerConfig,
    pub extractor: SanitizedExtractorConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedIntroSkipConfig {
    pub enabled: bool,
    pub fingerprint_minutes: u32,
    pub library_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedExtractorConfig {
    pub timeout_secs: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            general: config.general.clone(),
            media_info: config.media_info.clone(),
            intro_skip: SanitizedIntroSkipConfig {
                enabled: config.intro_skip.enabled,
                fingerprint_minutes: config.intro_skip.fingerprint_minutes,
                library_count: config.intro_skip.library_paths.len(),
            },
            scheduler: config.scheduler.clone(),
            extractor: SanitizedExtractorConfig {
                timeout_secs: config.extractor.timeout_secs,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.general.max_concurrent_count, 1);
        assert!(!config.general.catchup_mode);
        assert_eq!(config.intro_skip.fingerprint_minutes, 10);
        assert_eq!(config.scheduler.follow_up_task, "detect_episode_intros");
        assert_eq!(config.extractor.timeout_secs, 600);
    }

    #[test]
    fn test_deserialize_full_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000

[general]
max_concurrent_count = 4
catchup_mode = true

[media_info]
exclusive_extract = true

[intro_skip]
enabled = true
fingerprint_minutes = 5
library_paths = ["/media/tv"]

[scheduler]
intro_fingerprint_interval_secs = 3600

[extractor]
ffprobe_path = "/usr/local/bin/ffprobe"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.host.to_string(), "127.0.0.1");
        assert_eq!(config.general.max_concurrent_count, 4);
        assert!(config.media_info.exclusive_extract);
        assert!(!config.media_info.include_extra);
        assert_eq!(config.intro_skip.library_paths, vec![PathBuf::from("/media/tv")]);
        assert_eq!(config.scheduler.intro_fingerprint_interval_secs, 3600);
        assert_eq!(config.scheduler.media_info_interval_secs, 0);
        assert_eq!(
            config.extractor.ffprobe_path,
            PathBuf::from("/usr/local/bin/ffprobe")
        );
        assert_eq!(config.extractor.ffmpeg_path, PathBuf::from("ffmpeg"));
    }

    #[test]
    fn test_sanitized_config_hides_paths() {
        let mut config = Config::default();
        config.intro_skip.library_paths = vec![PathBuf::from("/a"), PathBuf::from("/b")];

        let sanitized = SanitizedConfig::from(&config);
        assert_eq!(sanitized.intro_skip.library_count, 2);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("ffprobe"));
        assert!(json.contains("\"max_concurrent_count\":1"));
    }
}
