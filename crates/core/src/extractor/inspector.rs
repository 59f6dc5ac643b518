//! Filesystem-backed library inspector.

use std::path::{Path, PathBuf};

use crate::ingest::LibraryInspector;
use crate::queue::MediaItem;

use super::types::{sidecar_path, MEDIA_INFO_SUFFIX};

const EPISODE_EXTENSIONS: &[&str] = &["strm", "mkv", "mp4", "avi", "ts", "m2ts", "webm", "mov"];

/// Answers eligibility queries from the files next to each item.
///
/// - intro scope: the item lives under one of the configured library roots
///   (no roots means everything is in scope);
/// - media stream: a media info sidecar exists;
/// - intro credits: the season folder holds at least one other episode to
///   match the intro against.
#[derive(Debug, Clone, Default)]
pub struct SidecarInspector {
    intro_roots: Vec<PathBuf>,
}

impl SidecarInspector {
    pub fn new(intro_roots: Vec<PathBuf>) -> Self {
        Self { intro_roots }
    }
}

impl LibraryInspector for SidecarInspector {
    fn is_in_intro_scope(&self, item: &MediaItem) -> bool {
        self.intro_roots.is_empty() || self.intro_roots.iter().any(|root| item.path.starts_with(root))
    }

    fn has_media_stream(&self, item: &MediaItem) -> bool {
        sidecar_path(&item.path, MEDIA_INFO_SUFFIX).exists()
    }

    fn season_has_intro_credits(&self, item: &MediaItem) -> bool {
        let Some(season_dir) = item.path.parent() else {
            return false;
        };
        let Ok(entries) = std::fs::read_dir(season_dir) else {
            return false;
        };

        entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .any(|path| path != item.path && is_episode_file(&path))
    }
}

fn is_episode_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            EPISODE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}
