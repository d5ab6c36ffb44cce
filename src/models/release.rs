//! App release data structure.

/// Sentinel stored in [`AppRelease::notes`] when the store reports no
/// release notes for the current version.
pub const NO_NOTES: &str = "No release notes";

/// Sentinel stored in [`AppRelease::released_at`] when the store reports
/// no release timestamp.
pub const UNKNOWN_RELEASE_TIME: &str = "unknown";

/// Metadata for one app version, freshly probed from the lookup service.
///
/// Produced once per run per tracked app; never persisted directly. The
/// fields derived for the cache live in [`crate::models::CacheEntry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppRelease {
    /// Tracked app identifier (App Store track id)
    pub app_id: String,

    /// App display name
    pub name: String,

    /// Version string as reported by the store
    pub version: String,

    /// Region code the lookup answered from (e.g. "us")
    pub region: String,

    /// Human-readable region name
    pub region_name: String,

    /// App icon URL (empty when absent)
    pub icon_url: String,

    /// Release notes, or [`NO_NOTES`] when absent
    pub notes: String,

    /// Release timestamp as reported (ISO-8601), or [`UNKNOWN_RELEASE_TIME`]
    pub released_at: String,

    /// Store detail page URL (empty when absent)
    pub store_url: String,
}
