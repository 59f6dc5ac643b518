//! Testing utilities and mock implementations.
//!
//! This module provides mocks for the core's trait seams so drains, the
//! scheduler and event routing can be exercised without ffmpeg or a media
//! library.
//!
//! # Example
//!
//! ```rust,ignore
//! use strmkit_core::testing::{fixtures, MockWorker, RecordingProgress};
//!
//! let worker = Arc::new(MockWorker::new().fail_item(2, "probe failed"));
//! let progress = Arc::new(RecordingProgress::new());
//!
//! for item in fixtures::episodes(5) {
//!     queue.enqueue(item);
//! }
//! ```

mod mock_inspector;
mod mock_worker;
mod recording_progress;

pub use mock_inspector::MockInspector;
pub use mock_worker::MockWorker;
pub use recording_progress::RecordingProgress;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::queue::{ItemKind, MediaItem};

    /// A local movie file.
    pub fn movie(id: i64) -> MediaItem {
        MediaItem::new(
            id,
            format!("Movie {}", id),
            format!("/media/movies/Movie {}.mkv", id),
        )
        .with_kind(ItemKind::Movie)
    }

    /// A movie behind a `.strm` shortcut.
    pub fn shortcut(id: i64) -> MediaItem {
        MediaItem::new(
            id,
            format!("Movie {}", id),
            format!("/media/movies/Movie {}.strm", id),
        )
        .with_kind(ItemKind::Movie)
    }

    /// Episode `id` of season 1.
    pub fn episode(id: i64) -> MediaItem {
        MediaItem::new(
            id,
            format!("Episode {}", id),
            format!("/media/tv/Show/Season 1/S01E{:02}.strm", id),
        )
        .with_kind(ItemKind::Episode)
    }

    /// Episodes with IDs `1..=count`.
    pub fn episodes(count: usize) -> Vec<MediaItem> {
        (1..=count as i64).map(episode).collect()
    }
}
