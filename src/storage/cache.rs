//! Persisted version cache.
//!
//! A single JSON file mapping app id → [`CacheEntry`]. The cache is loaded
//! once at run start, mutated in memory through [`VersionCache::record`],
//! and written back at most once by [`VersionCache::flush`], only when
//! something actually changed. A run where every app is up to date leaves
//! the file untouched.
//!
//! A missing, unreadable, or structurally invalid file all degrade to an
//! empty cache; none of them abort the run.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::models::{AppRelease, CacheEntry};

/// In-memory view of the persisted version baseline.
#[derive(Debug)]
pub struct VersionCache {
    path: PathBuf,
    entries: HashMap<String, CacheEntry>,
    first_run: bool,
    dirty: bool,
}

impl VersionCache {
    /// Load the cache from disk.
    ///
    /// Never fails: problems reading or parsing the file are logged and the
    /// cache starts empty, which puts the run in first-run mode.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<HashMap<String, CacheEntry>>(&bytes) {
                Ok(map) => {
                    log::info!("Cache loaded: {} entr(ies) from {}", map.len(), path.display());
                    map
                }
                Err(e) => {
                    log::warn!(
                        "Cache file {} is not a valid entry map ({}), starting empty",
                        path.display(),
                        e
                    );
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("No cache file at {}, first run", path.display());
                HashMap::new()
            }
            Err(e) => {
                log::warn!("Failed to read cache {}: {}, starting empty", path.display(), e);
                HashMap::new()
            }
        };

        let first_run = entries.is_empty();
        Self {
            path,
            entries,
            first_run,
            dirty: false,
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the cache held zero entries at load time.
    ///
    /// This is a whole-run property: records added later in the run do not
    /// change it.
    pub fn is_first_run(&self) -> bool {
        self.first_run
    }

    /// Whether there are in-memory changes not yet flushed.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache currently holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The stored entry for an app id, if any.
    pub fn get(&self, app_id: &str) -> Option<&CacheEntry> {
        self.entries.get(app_id)
    }

    /// The stored version for an app id, if any.
    pub fn version_of(&self, app_id: &str) -> Option<&str> {
        self.entries.get(app_id).map(|e| e.version.as_str())
    }

    /// Iterate over all stored entries.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &CacheEntry)> {
        self.entries.iter()
    }

    /// Record a freshly probed release.
    ///
    /// Overwrites the entry and marks the cache dirty only when the stored
    /// version differs from the probed one (or no entry exists, or `force`
    /// is set). Returns whether the entry changed. An identical version
    /// without `force` touches nothing.
    pub fn record(&mut self, release: &AppRelease, now: DateTime<Utc>, force: bool) -> bool {
        let changed = force || self.version_of(&release.app_id) != Some(release.version.as_str());
        if !changed {
            return false;
        }

        self.entries.insert(
            release.app_id.clone(),
            CacheEntry {
                version: release.version.clone(),
                display_name: release.name.clone(),
                region_code: release.region.clone(),
                icon_url: release.icon_url.clone(),
                last_checked_at: now,
            },
        );
        self.dirty = true;
        true
    }

    /// Write the cache back to disk if anything changed.
    ///
    /// Returns whether a write occurred. The write is atomic (temp file,
    /// then rename) so a crash mid-flush never leaves a half-written cache.
    pub async fn flush(&mut self) -> Result<bool> {
        if !self.dirty {
            log::info!("Cache unchanged, skipping write");
            return Ok(false);
        }

        let bytes = serde_json::to_vec_pretty(&self.entries)?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;

        self.dirty = false;
        log::info!("Cache written: {} entr(ies) to {}", self.entries.len(), self.path.display());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_release(app_id: &str, version: &str) -> AppRelease {
        AppRelease {
            app_id: app_id.to_string(),
            name: format!("App {}", app_id),
            version: version.to_string(),
            region: "us".to_string(),
            region_name: "United States".to_string(),
            icon_url: format!("https://example.com/{}.png", app_id),
            notes: "Bug fixes".to_string(),
            released_at: "2026-03-01T00:00:00Z".to_string(),
            store_url: format!("https://example.com/app/{}", app_id),
        }
    }

    #[tokio::test]
    async fn missing_file_is_first_run() {
        let tmp = TempDir::new().unwrap();
        let cache = VersionCache::load(tmp.path().join("cache.json")).await;

        assert!(cache.is_first_run());
        assert!(cache.is_empty());
        assert!(!cache.is_dirty());
        assert_eq!(cache.path(), tmp.path().join("cache.json").as_path());
    }

    #[tokio::test]
    async fn invalid_json_starts_empty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cache.json");
        std::fs::write(&path, "{not json").unwrap();

        let cache = VersionCache::load(&path).await;
        assert!(cache.is_first_run());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn non_mapping_json_starts_empty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cache.json");
        std::fs::write(&path, r#"["not", "a", "map"]"#).unwrap();

        let cache = VersionCache::load(&path).await;
        assert!(cache.is_first_run());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn record_and_flush_round_trip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cache.json");

        let mut cache = VersionCache::load(&path).await;
        assert!(cache.record(&make_release("100", "1.0"), Utc::now(), false));
        assert!(cache.flush().await.unwrap());

        let reloaded = VersionCache::load(&path).await;
        assert!(!reloaded.is_first_run());
        let entry = reloaded.get("100").unwrap();
        assert_eq!(entry.version, "1.0");
        assert_eq!(entry.display_name, "App 100");
        assert_eq!(entry.region_code, "us");
    }

    #[tokio::test]
    async fn unchanged_version_is_not_rewritten() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cache.json");

        let mut cache = VersionCache::load(&path).await;
        assert!(cache.record(&make_release("100", "1.0"), Utc::now(), false));
        assert!(cache.flush().await.unwrap());

        let mut cache = VersionCache::load(&path).await;
        assert!(!cache.record(&make_release("100", "1.0"), Utc::now(), false));
        assert!(!cache.record(&make_release("100", "1.0"), Utc::now(), false));
        assert!(!cache.flush().await.unwrap());
    }

    #[tokio::test]
    async fn version_change_overwrites_entry() {
        let tmp = TempDir::new().unwrap();
        let mut cache = VersionCache::load(tmp.path().join("cache.json")).await;

        cache.record(&make_release("100", "1.0"), Utc::now(), false);
        assert!(cache.record(&make_release("100", "1.1"), Utc::now(), false));

        assert_eq!(cache.version_of("100"), Some("1.1"));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn force_overwrites_identical_version() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cache.json");

        let mut cache = VersionCache::load(&path).await;
        cache.record(&make_release("100", "1.0"), Utc::now(), false);
        cache.flush().await.unwrap();

        let mut cache = VersionCache::load(&path).await;
        assert!(cache.record(&make_release("100", "1.0"), Utc::now(), true));
        assert!(cache.flush().await.unwrap());
    }

    #[tokio::test]
    async fn flush_skips_when_clean() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cache.json");

        let mut cache = VersionCache::load(&path).await;
        assert!(!cache.flush().await.unwrap());
        assert!(!path.exists());

        cache.record(&make_release("100", "1.0"), Utc::now(), false);
        assert!(cache.flush().await.unwrap());
        assert!(!cache.flush().await.unwrap());
    }

    #[tokio::test]
    async fn non_ascii_text_round_trips() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cache.json");

        let mut release = make_release("100", "3.2");
        release.name = "微信".to_string();

        let mut cache = VersionCache::load(&path).await;
        cache.record(&release, Utc::now(), false);
        cache.flush().await.unwrap();

        let reloaded = VersionCache::load(&path).await;
        assert_eq!(reloaded.get("100").unwrap().display_name, "微信");
    }
}
