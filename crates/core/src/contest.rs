//! Canonical contest record.

use crate::Platform;
use serde::{Deserialize, Serialize};

/// A single upcoming contest, normalized across platforms.
///
/// Rebuilt from the source APIs on every poll; only the `id` is persisted
/// (as the dedup key), so it must be stable across polls for the same
/// real-world contest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contest {
    /// Globally unique id: platform prefix + platform-native id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Start time, UTC epoch seconds.
    pub start_epoch: i64,
    /// Source platform.
    pub platform: Platform,
    /// Canonical link.
    pub url: String,
}

impl Contest {
    /// Seconds until the contest starts. Negative once it has started.
    pub fn remaining(&self, now: i64) -> i64 {
        self.start_epoch - now
    }
}
