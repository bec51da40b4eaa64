//! Per-subscriber notification preferences.

use contest_core::{Platform, DEFAULT_OFFSETS};
use serde::{Deserialize, Serialize};

/// A subscriber's filter preferences.
///
/// Both fields are guaranteed non-empty: a subscriber without stored
/// settings, or with settings that no longer parse, gets the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriberSettings {
    /// Platforms the subscriber wants notifications for.
    pub platforms: Vec<Platform>,
    /// Reminder offsets in seconds before start, descending.
    pub offsets: Vec<i64>,
}

impl Default for SubscriberSettings {
    fn default() -> Self {
        Self {
            platforms: Platform::ALL.to_vec(),
            offsets: DEFAULT_OFFSETS.to_vec(),
        }
    }
}

impl SubscriberSettings {
    /// Whether this subscriber wants notifications for `platform`.
    pub fn wants(&self, platform: Platform) -> bool {
        self.platforms.contains(&platform)
    }
}
