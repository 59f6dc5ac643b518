//! Mock library inspector for testing.

use crate::ingest::LibraryInspector;
use crate::queue::MediaItem;

/// Mock implementation of the LibraryInspector trait with fixed answers.
///
/// Defaults: every item is in intro scope, has no media stream, and its
/// season has no intro credits.
#[derive(Debug, Clone)]
pub struct MockInspector {
    in_scope: bool,
    media_stream: bool,
    intro_credits: bool,
}

impl Default for MockInspector {
    fn default() -> Self {
        Self::new()
    }
}

impl MockInspector {
    pub fn new() -> Self {
        Self {
            in_scope: true,
            media_stream: false,
            intro_credits: false,
        }
    }

    pub fn with_scope(mut self, in_scope: bool) -> Self {
        self.in_scope = in_scope;
        self
    }

    pub fn with_media_stream(mut self, media_stream: bool) -> Self {
        self.media_stream = media_stream;
        self
    }

    pub fn with_intro_credits(mut self, intro_credits: bool) -> Self {
        self.intro_credits = intro_credits;
        self
    }
}

impl LibraryInspector for MockInspector {
    fn is_in_intro_scope(&self, _item: &MediaItem) -> bool {
        self.in_scope
    }

    fn has_media_stream(&self, _item: &MediaItem) -> bool {
        self.media_stream
    }

    fn season_has_intro_credits(&self, _item: &MediaItem) -> bool {
        self.intro_credits
    }
}
