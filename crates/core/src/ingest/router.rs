//! Event routing into the item queues.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::queue::{ItemKind, ItemQueue, MediaItem, QueueKind};

use super::traits::LibraryInspector;
use super::types::{IngestRules, LibraryEvent};

/// Decides eligibility for library events and enqueues matching items.
///
/// Handling an event only reads the rules and pushes onto queues, so it is
/// safe to call from any number of notification threads.
pub struct EventIngestion {
    media_info: Arc<ItemQueue>,
    intro_fingerprint: Arc<ItemQueue>,
    inspector: Arc<dyn LibraryInspector>,
    rules: RwLock<IngestRules>,
}

impl EventIngestion {
    pub fn new(
        media_info: Arc<ItemQueue>,
        intro_fingerprint: Arc<ItemQueue>,
        inspector: Arc<dyn LibraryInspector>,
        rules: IngestRules,
    ) -> Self {
        Self {
            media_info,
            intro_fingerprint,
            inspector,
            rules: RwLock::new(rules),
        }
    }

    /// Current rules.
    pub fn rules(&self) -> IngestRules {
        *self.rules.read()
    }

    /// Replaces the rules; later events see the new values.
    pub fn set_rules(&self, rules: IngestRules) {
        *self.rules.write() = rules;
    }

    /// Routes one event. Returns the queues the item was appended to, in order.
    pub fn handle(&self, event: &LibraryEvent) -> Vec<QueueKind> {
        let rules = self.rules();
        let item = event.item();

        if item.is_extra && !rules.include_extra {
            debug!(event = event.label(), item_id = item.id, "Ignoring extra");
            return Vec::new();
        }

        let routed = match event {
            LibraryEvent::ItemAdded { item } => self.route_added(item, &rules),
            LibraryEvent::UserDataSaved { item, is_favorite } => {
                if rules.catchup_mode && *is_favorite {
                    vec![QueueKind::MediaInfo]
                } else {
                    Vec::new()
                }
            }
            LibraryEvent::ItemUpdated { .. } => Vec::new(),
        };

        for kind in &routed {
            self.queue(*kind).enqueue(item.clone());
        }

        debug!(
            event = event.label(),
            item_id = item.id,
            queues = ?routed,
            "Event routed"
        );
        routed
    }

    fn route_added(&self, item: &MediaItem, rules: &IngestRules) -> Vec<QueueKind> {
        let mut routed = Vec::new();

        if rules.catchup_mode && (rules.exclusive_extract || item.is_shortcut) {
            routed.push(QueueKind::MediaInfo);
        }

        if rules.intro_skip_enabled && self.inspector.is_in_intro_scope(item) {
            if !self.inspector.has_media_stream(item) {
                routed.push(QueueKind::MediaInfo);
            } else if item.kind == ItemKind::Episode
                && self.inspector.season_has_intro_credits(item)
            {
                routed.push(QueueKind::IntroFingerprint);
            }
        }

        routed
    }

    fn queue(&self, kind: QueueKind) -> &ItemQueue {
        match kind {
            QueueKind::MediaInfo => &self.media_info,
            QueueKind::IntroFingerprint => &self.intro_fingerprint,
        }
    }
}
