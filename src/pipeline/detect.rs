// src/pipeline/detect.rs

//! Change classification.
//!
//! Compares each probed release against the cached baseline and decides
//! whether it seeds the baseline (first run), updates it, or matches it.

use crate::models::AppRelease;
use crate::storage::VersionCache;

/// One detected change, carrying what the notification needs.
#[derive(Debug, Clone)]
pub struct ChangeRecord {
    pub release: AppRelease,
    /// Version stored before this run; empty when none was stored.
    pub previous_version: String,
}

/// Outcome of comparing a probed release against the cache.
#[derive(Debug, Clone)]
pub enum Change {
    /// First run: the release seeds the baseline.
    Init(ChangeRecord),
    /// The stored version differs, or the app is new to the cache.
    Updated(ChangeRecord),
    /// Stored and probed versions match.
    Unchanged,
}

/// Classifies probed releases against the loaded cache.
///
/// First-run mode is fixed at construction from the freshly loaded cache.
/// Records added to the cache mid-run never flip the classification of
/// apps processed later in the same run.
pub struct ChangeDetector {
    first_run: bool,
}

impl ChangeDetector {
    pub fn new(first_run: bool) -> Self {
        Self { first_run }
    }

    pub fn classify(&self, release: &AppRelease, cache: &VersionCache) -> Change {
        if self.first_run {
            return Change::Init(ChangeRecord {
                release: release.clone(),
                previous_version: String::new(),
            });
        }

        match cache.version_of(&release.app_id) {
            Some(stored) if stored == release.version => Change::Unchanged,
            stored => Change::Updated(ChangeRecord {
                release: release.clone(),
                previous_version: stored.unwrap_or_default().to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn make_release(app_id: &str, version: &str) -> AppRelease {
        AppRelease {
            app_id: app_id.to_string(),
            name: format!("App {}", app_id),
            version: version.to_string(),
            region: "us".to_string(),
            region_name: "United States".to_string(),
            icon_url: String::new(),
            notes: "Bug fixes".to_string(),
            released_at: "2026-03-01T00:00:00Z".to_string(),
            store_url: String::new(),
        }
    }

    async fn empty_cache() -> (TempDir, VersionCache) {
        let tmp = TempDir::new().unwrap();
        let cache = VersionCache::load(tmp.path().join("cache.json")).await;
        (tmp, cache)
    }

    #[tokio::test]
    async fn first_run_classifies_as_init() {
        let (_tmp, cache) = empty_cache().await;
        let detector = ChangeDetector::new(cache.is_first_run());

        let change = detector.classify(&make_release("100", "1.0"), &cache);
        assert!(matches!(change, Change::Init(r) if r.previous_version.is_empty()));
    }

    #[tokio::test]
    async fn matching_version_is_unchanged() {
        let (_tmp, mut cache) = empty_cache().await;
        cache.record(&make_release("100", "1.0"), Utc::now(), false);

        let detector = ChangeDetector::new(false);
        let change = detector.classify(&make_release("100", "1.0"), &cache);
        assert!(matches!(change, Change::Unchanged));
    }

    #[tokio::test]
    async fn differing_version_is_updated_with_previous() {
        let (_tmp, mut cache) = empty_cache().await;
        cache.record(&make_release("100", "1.0"), Utc::now(), false);

        let detector = ChangeDetector::new(false);
        match detector.classify(&make_release("100", "1.1"), &cache) {
            Change::Updated(record) => {
                assert_eq!(record.previous_version, "1.0");
                assert_eq!(record.release.version, "1.1");
            }
            other => panic!("expected Updated, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn unknown_app_is_updated_with_empty_previous() {
        let (_tmp, mut cache) = empty_cache().await;
        cache.record(&make_release("100", "1.0"), Utc::now(), false);

        let detector = ChangeDetector::new(false);
        let change = detector.classify(&make_release("200", "3.0"), &cache);
        assert!(matches!(change, Change::Updated(r) if r.previous_version.is_empty()));
    }

    #[tokio::test]
    async fn mid_run_records_keep_first_run_mode() {
        let (_tmp, mut cache) = empty_cache().await;
        let detector = ChangeDetector::new(cache.is_first_run());

        cache.record(&make_release("100", "1.0"), Utc::now(), true);

        let change = detector.classify(&make_release("100", "1.0"), &cache);
        assert!(matches!(change, Change::Init(_)));
    }
}
