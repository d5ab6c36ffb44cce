// src/services/lookup.rs

//! App Store lookup client and region probing.
//!
//! The lookup API is partitioned by storefront: an app listed only in the
//! Chinese storefront is invisible to a `us` query. [`RegionProber`] walks
//! the configured region list in order and stops at the first storefront
//! that knows the app.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::{Config, LookupConfig};
use crate::error::Result;
use crate::models::region;
use crate::models::{AppRelease, NO_NOTES, UNKNOWN_RELEASE_TIME};
use crate::utils::http;

/// One storefront query for one app.
#[async_trait]
pub trait ReleaseLookup: Send + Sync {
    /// Fetch the current release of `app_id` from the given storefront.
    ///
    /// `Ok(None)` means the storefront does not list the app; errors are
    /// transport or decode failures and leave it to the caller whether to
    /// try elsewhere.
    async fn lookup(&self, app_id: &str, region: &str) -> Result<Option<AppRelease>>;
}

/// Raw lookup API response envelope.
#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(rename = "resultCount", default)]
    result_count: u32,
    #[serde(default)]
    results: Vec<LookupResult>,
}

/// The fields we read from a lookup result record.
///
/// Everything is optional on the wire; missing fields get placeholder
/// values so downstream formatting never deals with absent data.
#[derive(Debug, Deserialize)]
struct LookupResult {
    #[serde(rename = "trackName")]
    name: Option<String>,
    version: Option<String>,
    #[serde(rename = "artworkUrl100")]
    icon_url: Option<String>,
    #[serde(rename = "releaseNotes")]
    notes: Option<String>,
    #[serde(rename = "currentVersionReleaseDate")]
    released_at: Option<String>,
    #[serde(rename = "trackViewUrl")]
    store_url: Option<String>,
}

impl LookupResult {
    fn into_release(self, app_id: &str, region: &str) -> AppRelease {
        AppRelease {
            app_id: app_id.to_string(),
            name: self.name.unwrap_or_else(|| "Unknown".to_string()),
            version: self.version.unwrap_or_else(|| "0.0".to_string()),
            region: region.to_string(),
            region_name: region::display_name(region),
            icon_url: self.icon_url.unwrap_or_default(),
            notes: self.notes.unwrap_or_else(|| NO_NOTES.to_string()),
            released_at: self
                .released_at
                .filter(|raw| !raw.is_empty())
                .unwrap_or_else(|| UNKNOWN_RELEASE_TIME.to_string()),
            store_url: self.store_url.unwrap_or_default(),
        }
    }
}

/// HTTP client for the iTunes lookup API.
pub struct AppStoreClient {
    endpoint: String,
    client: reqwest::Client,
}

impl AppStoreClient {
    pub fn new(config: &LookupConfig) -> Result<Self> {
        let client = http::create_client(&config.user_agent, config.timeout_secs)?;
        Ok(Self {
            endpoint: config.endpoint.clone(),
            client,
        })
    }
}

#[async_trait]
impl ReleaseLookup for AppStoreClient {
    async fn lookup(&self, app_id: &str, region: &str) -> Result<Option<AppRelease>> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("id", app_id), ("country", region)])
            .send()
            .await?;

        if !response.status().is_success() {
            log::debug!("Lookup {} in {}: HTTP {}", app_id, region, response.status());
            return Ok(None);
        }

        let body: LookupResponse = response.json().await?;
        if body.result_count == 0 {
            return Ok(None);
        }

        // A positive count with an empty array still counts as a miss.
        Ok(body
            .results
            .into_iter()
            .next()
            .map(|r| r.into_release(app_id, region)))
    }
}

/// Walks storefronts in priority order until one answers.
pub struct RegionProber {
    source: Box<dyn ReleaseLookup>,
    regions: Vec<String>,
}

impl RegionProber {
    pub fn new(source: Box<dyn ReleaseLookup>, regions: Vec<String>) -> Self {
        Self { source, regions }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let client = AppStoreClient::new(&config.lookup)?;
        Ok(Self::new(
            Box::new(client),
            config.lookup.probe_regions().to_vec(),
        ))
    }

    /// Find the app in the first storefront that lists it.
    ///
    /// Transport errors in one region are logged and do not stop the walk;
    /// `None` means every probed region either missed or failed.
    pub async fn probe(&self, app_id: &str) -> Option<AppRelease> {
        for region in &self.regions {
            match self.source.lookup(app_id, region).await {
                Ok(Some(release)) => {
                    log::info!(
                        "App {} found in {}: {} v{}",
                        app_id,
                        release.region_name,
                        release.name,
                        release.version
                    );
                    return Some(release);
                }
                Ok(None) => continue,
                Err(e) => {
                    log::debug!("Lookup {} in {} failed: {}", app_id, region, e);
                    continue;
                }
            }
        }

        log::warn!("App {} not found in any probed region", app_id);
        None
    }
}
