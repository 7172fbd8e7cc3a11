//! Steam store API client.
//!
//! Two call shapes: the full app list (id + name for the whole known
//! catalog) and per-app detail. No API key is required. Payload fields
//! are treated as optional throughout; a malformed genre/category entry
//! is skipped rather than failing the app.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::ProviderConfig;
use crate::metrics::{PROVIDER_REQUESTS, PROVIDER_REQUEST_DURATION};

use super::types::{parse_release_date, AppDetail, AppEntry, LabelEntry, PlatformFlags};
use super::{CatalogProvider, ProviderError};

/// Steam store API client.
pub struct SteamProvider {
    client: Client,
    app_list_url: String,
    detail_url: String,
    list_timeout: Duration,
    detail_timeout: Duration,
}

impl SteamProvider {
    /// Create a new client from provider configuration.
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.list_timeout_secs.max(1)))
            .build()?;

        Ok(Self {
            client,
            app_list_url: config.app_list_url.clone(),
            detail_url: config.detail_url.clone(),
            list_timeout: Duration::from_secs(config.list_timeout_secs.max(1)),
            detail_timeout: Duration::from_secs(config.detail_timeout_secs.max(1)),
        })
    }

    fn record(operation: &str, ok: bool) {
        let status = if ok { "success" } else { "error" };
        PROVIDER_REQUESTS
            .with_label_values(&[operation, status])
            .inc();
    }
}

#[async_trait]
impl CatalogProvider for SteamProvider {
    async fn app_list(&self) -> Result<Vec<AppEntry>, ProviderError> {
        debug!(url = %self.app_list_url, "fetching full app list");
        let _timer = PROVIDER_REQUEST_DURATION
            .with_label_values(&["app_list"])
            .start_timer();

        let result = self.fetch_app_list().await;
        Self::record("app_list", result.is_ok());
        result
    }

    async fn app_detail(&self, app_id: i64) -> Result<Option<AppDetail>, ProviderError> {
        debug!(app_id, "fetching app detail");
        let _timer = PROVIDER_REQUEST_DURATION
            .with_label_values(&["app_detail"])
            .start_timer();

        let result = self.fetch_app_detail(app_id).await;
        Self::record("app_detail", result.is_ok());
        result
    }
}

impl SteamProvider {
    async fn fetch_app_list(&self) -> Result<Vec<AppEntry>, ProviderError> {
        let response = self
            .client
            .get(&self.app_list_url)
            .timeout(self.list_timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::UnexpectedStatus {
                status: status.as_u16(),
                message: body,
            });
        }

        let payload: WireAppList = response.json().await.map_err(|e| {
            ProviderError::Parse(format!("Failed to parse app list response: {}", e))
        })?;

        let entries: Vec<AppEntry> = payload
            .applist
            .apps
            .into_iter()
            .filter(|app| !app.name.trim().is_empty())
            .map(|app| AppEntry {
                id: app.appid,
                name: app.name,
            })
            .collect();

        debug!(count = entries.len(), "app list fetched");
        Ok(entries)
    }

    async fn fetch_app_detail(&self, app_id: i64) -> Result<Option<AppDetail>, ProviderError> {
        let response = self
            .client
            .get(&self.detail_url)
            .query(&[("appids", app_id.to_string())])
            .timeout(self.detail_timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::UnexpectedStatus {
                status: status.as_u16(),
                message: body,
            });
        }

        let mut payload: HashMap<String, WireDetailEnvelope> =
            response.json().await.map_err(|e| {
                ProviderError::Parse(format!("Failed to parse app detail response: {}", e))
            })?;

        let envelope = match payload.remove(&app_id.to_string()) {
            Some(envelope) => envelope,
            None => return Ok(None),
        };

        if !envelope.success {
            return Ok(None);
        }

        match envelope.data {
            Some(data) => Ok(Some(normalize_detail(app_id, data))),
            None => Ok(None),
        }
    }
}

// ============================================================================
// Steam API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct WireAppList {
    #[serde(default)]
    applist: WireAppListInner,
}

#[derive(Debug, Default, Deserialize)]
struct WireAppListInner {
    #[serde(default)]
    apps: Vec<WireApp>,
}

#[derive(Debug, Deserialize)]
struct WireApp {
    appid: i64,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct WireDetailEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<WireAppData>,
}

#[derive(Debug, Deserialize)]
struct WireAppData {
    #[serde(default)]
    name: String,
    #[serde(default)]
    steam_appid: Option<i64>,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    short_description: String,
    #[serde(default)]
    about_the_game: String,
    #[serde(default)]
    detailed_description: String,
    #[serde(default)]
    header_image: String,
    #[serde(default)]
    developers: Vec<String>,
    #[serde(default)]
    publishers: Vec<String>,
    #[serde(default)]
    required_age: Option<FlexId>,
    #[serde(default)]
    platforms: WirePlatforms,
    #[serde(default)]
    genres: Vec<WireLabel>,
    #[serde(default)]
    categories: Vec<WireLabel>,
    #[serde(default)]
    release_date: WireReleaseDate,
}

#[derive(Debug, Default, Deserialize)]
struct WirePlatforms {
    #[serde(default)]
    windows: bool,
    #[serde(default)]
    mac: bool,
    #[serde(default)]
    linux: bool,
}

/// Genre ids arrive as JSON strings while category ids are numbers;
/// both deserialize through this.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FlexId {
    Num(i64),
    Str(String),
}

impl FlexId {
    fn as_i64(&self) -> Option<i64> {
        match self {
            FlexId::Num(n) => Some(*n),
            FlexId::Str(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireLabel {
    #[serde(default)]
    id: Option<FlexId>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WireReleaseDate {
    #[serde(default)]
    coming_soon: bool,
    #[serde(default)]
    date: String,
}

// ============================================================================
// Conversions
// ============================================================================

/// Entries missing an id or description are dropped, not fatal.
fn normalize_labels(labels: Vec<WireLabel>) -> Vec<LabelEntry> {
    labels
        .into_iter()
        .filter_map(|label| {
            let id = label.id.as_ref().and_then(FlexId::as_i64)?;
            let name = label.description?;
            if name.trim().is_empty() {
                return None;
            }
            Some(LabelEntry { id, name })
        })
        .collect()
}

fn normalize_detail(requested_id: i64, data: WireAppData) -> AppDetail {
    let long_description = if !data.about_the_game.trim().is_empty() {
        data.about_the_game
    } else {
        data.detailed_description
    };

    let age_rating = match data.required_age.as_ref().and_then(FlexId::as_i64) {
        Some(0) | None => String::new(),
        Some(age) => age.to_string(),
    };

    AppDetail {
        id: data.steam_appid.unwrap_or(requested_id),
        name: data.name,
        kind: data.kind,
        short_description: data.short_description,
        long_description,
        header_image: data.header_image,
        developers: data.developers,
        publishers: data.publishers,
        age_rating,
        platforms: PlatformFlags {
            windows: data.platforms.windows,
            mac: data.platforms.mac,
            linux: data.platforms.linux,
        },
        genres: normalize_labels(data.genres),
        tags: normalize_labels(data.categories),
        release_date: parse_release_date(&data.release_date.date),
        release_date_raw: data.release_date.date,
        coming_soon: data.release_date.coming_soon,
    }
}
