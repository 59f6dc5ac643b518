//! Host eligibility queries.

use crate::queue::MediaItem;

/// Library queries used to decide where an item is routed.
///
/// Called synchronously from event callbacks; implementations must be cheap.
pub trait LibraryInspector: Send + Sync {
    /// Whether the item's library is configured for intro detection.
    fn is_in_intro_scope(&self, item: &MediaItem) -> bool;

    /// Whether technical metadata for the item is already known.
    fn has_media_stream(&self, item: &MediaItem) -> bool;

    /// Whether the item's season already has intro markers to fingerprint against.
    fn season_has_intro_credits(&self, item: &MediaItem) -> bool;
}
