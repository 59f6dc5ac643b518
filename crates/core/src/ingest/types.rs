//! Types for event ingestion.

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::queue::MediaItem;

/// A library or user-data change notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LibraryEvent {
    /// A new item was added to the library.
    ItemAdded { item: MediaItem },
    /// An existing item's metadata changed.
    ItemUpdated { item: MediaItem },
    /// A user's data for an item was saved.
    UserDataSaved {
        item: MediaItem,
        #[serde(default)]
        is_favorite: bool,
    },
}

impl LibraryEvent {
    /// The item the event refers to.
    pub fn item(&self) -> &MediaItem {
        match self {
            LibraryEvent::ItemAdded { item }
            | LibraryEvent::ItemUpdated { item }
            | LibraryEvent::UserDataSaved { item, .. } => item,
        }
    }

    /// Short event name for logs.
    pub fn label(&self) -> &'static str {
        match self {
            LibraryEvent::ItemAdded { .. } => "item_added",
            LibraryEvent::ItemUpdated { .. } => "item_updated",
            LibraryEvent::UserDataSaved { .. } => "user_data_saved",
        }
    }
}

/// Eligibility rules applied to incoming events. Mutable at runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestRules {
    /// Extract media info as items arrive or are favorited.
    pub catchup_mode: bool,
    /// In catch-up mode, extract every new item, not only shortcuts.
    pub exclusive_extract: bool,
    /// Queue intro fingerprinting for eligible episodes.
    pub intro_skip_enabled: bool,
    /// Also process extras (trailers, featurettes).
    pub include_extra: bool,
}

impl From<&Config> for IngestRules {
    fn from(config: &Config) -> Self {
        Self {
            catchup_mode: config.general.catchup_mode,
            exclusive_extract: config.media_info.exclusive_extract,
            intro_skip_enabled: config.intro_skip.enabled,
            include_extra: config.media_info.include_extra,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_deserialization() {
        let json = r#"{
            "type": "user_data_saved",
            "item": {"id": 7, "name": "Heat", "path": "/movies/Heat.strm", "kind": "movie"},
            "is_favorite": true
        }"#;

        let event: LibraryEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.label(), "user_data_saved");
        assert_eq!(event.item().id, 7);
        assert!(matches!(
            event,
            LibraryEvent::UserDataSaved {
                is_favorite: true,
                ..
            }
        ));
    }

    #[test]
    fn test_rules_from_config() {
        let mut config = Config::default();
        config.general.catchup_mode = true;
        config.intro_skip.enabled = true;

        let rules = IngestRules::from(&config);
        assert!(rules.catchup_mode);
        assert!(rules.intro_skip_enabled);
        assert!(!rules.exclusive_extract);
    }
}
