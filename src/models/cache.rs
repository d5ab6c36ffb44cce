//! Persisted cache entry structure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Last observed state of one tracked app.
///
/// Exactly one entry exists per app id that has ever been successfully
/// probed; the entry is overwritten in place on version changes and never
/// deleted automatically.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheEntry {
    /// Last observed version string
    #[serde(default)]
    pub version: String,

    /// App display name at last observation
    #[serde(default = "defaults::display_name")]
    pub display_name: String,

    /// Region code the version was observed in
    #[serde(default = "defaults::region_code")]
    pub region_code: String,

    /// App icon URL
    #[serde(default)]
    pub icon_url: String,

    /// When the entry was last written
    #[serde(default = "defaults::last_checked_at")]
    pub last_checked_at: DateTime<Utc>,
}

mod defaults {
    use chrono::{DateTime, Utc};

    pub fn display_name() -> String {
        "Unknown".into()
    }
    pub fn region_code() -> String {
        "us".into()
    }
    pub fn last_checked_at() -> DateTime<Utc> {
        DateTime::UNIX_EPOCH
    }
}
