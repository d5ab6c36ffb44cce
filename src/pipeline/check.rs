// src/pipeline/check.rs

//! One monitoring run.
//!
//! Sequences the whole check: load the cache, probe each configured app in
//! order, classify against the baseline, batch the changes, deliver at most
//! one notification, then flush the cache. App ids are processed strictly
//! sequentially; the cache is owned by this function for the run's lifetime.

use chrono::Utc;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::pipeline::compose::{self, BatchKind};
use crate::pipeline::detect::{Change, ChangeDetector, ChangeRecord};
use crate::services::lookup::RegionProber;
use crate::services::notify::{Notification, NotificationSender};
use crate::storage::VersionCache;

/// Summary of a check run.
#[derive(Debug, Default)]
pub struct CheckOutcome {
    pub checked: usize,
    pub missing: usize,
    pub initialized: usize,
    pub updated: usize,
    pub unchanged: usize,
    /// Whether the delivery attempt succeeded; `None` when nothing was sent.
    pub delivered: Option<bool>,
    pub cache_written: bool,
}

/// Run one check over every configured app id.
///
/// Fails fast if no ids are configured; everything past that point is
/// recovered locally. Exactly zero or one notification goes out per run,
/// and the cache file is written at most once, after delivery.
pub async fn run_check(
    config: &Config,
    prober: &RegionProber,
    sender: &dyn NotificationSender,
) -> Result<CheckOutcome> {
    if config.app_ids.is_empty() {
        return Err(AppError::config("no app ids configured, nothing to check"));
    }

    let mut cache = VersionCache::load(&config.cache_file).await;
    let first_run = cache.is_first_run();
    let detector = ChangeDetector::new(first_run);

    log::info!(
        "Checking {} app(s) via {}{}",
        config.app_ids.len(),
        sender.name(),
        if first_run { " (first run)" } else { "" }
    );

    let mut outcome = CheckOutcome::default();
    let mut batch: Vec<ChangeRecord> = Vec::new();

    for (index, app_id) in config.app_ids.iter().enumerate() {
        log::info!("[{}/{}] {}", index + 1, config.app_ids.len(), app_id);
        outcome.checked += 1;

        let Some(release) = prober.probe(app_id).await else {
            outcome.missing += 1;
            continue;
        };

        match detector.classify(&release, &cache) {
            Change::Init(record) => {
                cache.record(&record.release, Utc::now(), true);
                log::info!(
                    "Tracking {} v{}",
                    record.release.name,
                    record.release.version
                );
                outcome.initialized += 1;
                batch.push(record);
            }
            Change::Updated(record) => {
                cache.record(&record.release, Utc::now(), false);
                log::info!(
                    "Update found: {} {} -> {}",
                    record.release.name,
                    if record.previous_version.is_empty() {
                        "none"
                    } else {
                        record.previous_version.as_str()
                    },
                    record.release.version
                );
                outcome.updated += 1;
                batch.push(record);
            }
            Change::Unchanged => {
                if config.force_refresh {
                    cache.record(&release, Utc::now(), true);
                }
                log::info!("{} is up to date (v{})", release.name, release.version);
                outcome.unchanged += 1;
            }
        }
    }

    if !batch.is_empty() {
        let kind = if first_run {
            BatchKind::Init
        } else {
            BatchKind::Update
        };
        let message = compose::compose(&batch, kind);
        // The first batch item supplies the representative link and icon.
        let note = Notification {
            title: message.title,
            body: message.body,
            url: batch[0].release.store_url.clone(),
            icon: batch[0].release.icon_url.clone(),
        };
        outcome.delivered = Some(sender.send(&note).await);
    }

    match cache.flush().await {
        Ok(written) => outcome.cache_written = written,
        Err(e) => log::error!("Cache write failed: {}", e),
    }

    log::info!(
        "Run complete: {} checked, {} initialized, {} updated, {} unchanged, {} missing",
        outcome.checked,
        outcome.initialized,
        outcome.updated,
        outcome.unchanged,
        outcome.missing
    );

    Ok(outcome)
}
