//! Mock catalog provider for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::provider::{AppDetail, AppEntry, CatalogProvider, ProviderError};

/// A recorded provider call for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedProviderCall {
    AppList,
    AppDetail { app_id: i64 },
}

/// Mock implementation of the CatalogProvider trait.
///
/// Provides controllable behavior for testing:
/// - Return a configurable app list and per-app details
/// - Track calls for assertions
/// - Simulate outages per call shape
///
/// # Example
///
/// ```rust,ignore
/// use wishdeck_core::testing::{fixtures, MockProvider};
///
/// let provider = MockProvider::new();
/// provider.add_game(fixtures::app_detail(570, "Dota 2")).await;
///
/// let list = provider.app_list().await?;
/// assert_eq!(list.len(), 1);
/// ```
#[derive(Debug)]
pub struct MockProvider {
    /// Full catalog list, in insertion order.
    apps: Arc<RwLock<Vec<AppEntry>>>,
    /// Detail payloads by app id.
    details: Arc<RwLock<HashMap<i64, AppDetail>>>,
    /// Recorded calls.
    calls: Arc<RwLock<Vec<RecordedProviderCall>>>,
    /// When true, `app_list` fails with a 503.
    fail_app_list: Arc<RwLock<bool>>,
    /// When true, `app_detail` fails with a 503.
    fail_app_detail: Arc<RwLock<bool>>,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProvider {
    /// Create a new empty mock provider.
    pub fn new() -> Self {
        Self {
            apps: Arc::new(RwLock::new(Vec::new())),
            details: Arc::new(RwLock::new(HashMap::new())),
            calls: Arc::new(RwLock::new(Vec::new())),
            fail_app_list: Arc::new(RwLock::new(false)),
            fail_app_detail: Arc::new(RwLock::new(false)),
        }
    }

    // =========================================================================
    // Catalog Configuration
    // =========================================================================

    /// Add one app to the list without a detail payload.
    pub async fn add_app(&self, entry: AppEntry) {
        self.apps.write().await.push(entry);
    }

    /// Replace the full app list.
    pub async fn set_apps(&self, apps: Vec<AppEntry>) {
        *self.apps.write().await = apps;
    }

    /// Add a detail payload without a list entry.
    pub async fn add_detail(&self, detail: AppDetail) {
        self.details.write().await.insert(detail.id, detail);
    }

    /// Add a fully known game: one list entry plus its detail payload.
    pub async fn add_game(&self, detail: AppDetail) {
        self.apps.write().await.push(AppEntry {
            id: detail.id,
            name: detail.name.clone(),
        });
        self.details.write().await.insert(detail.id, detail);
    }

    // =========================================================================
    // Outage Simulation
    // =========================================================================

    /// Make every `app_list` call fail until cleared.
    pub async fn set_fail_app_list(&self, fail: bool) {
        *self.fail_app_list.write().await = fail;
    }

    /// Make every `app_detail` call fail until cleared.
    pub async fn set_fail_app_detail(&self, fail: bool) {
        *self.fail_app_detail.write().await = fail;
    }

    // =========================================================================
    // Call Recording
    // =========================================================================

    /// Get all recorded calls.
    pub async fn recorded_calls(&self) -> Vec<RecordedProviderCall> {
        self.calls.read().await.clone()
    }

    /// Total number of calls made.
    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    /// Number of `app_detail` calls made.
    pub async fn detail_call_count(&self) -> usize {
        self.calls
            .read()
            .await
            .iter()
            .filter(|c| matches!(c, RecordedProviderCall::AppDetail { .. }))
            .count()
    }

    /// Clear recorded calls.
    pub async fn clear_recorded(&self) {
        self.calls.write().await.clear();
    }
}

#[async_trait]
impl CatalogProvider for MockProvider {
    async fn app_list(&self) -> Result<Vec<AppEntry>, ProviderError> {
        self.calls.write().await.push(RecordedProviderCall::AppList);

        if *self.fail_app_list.read().await {
            return Err(ProviderError::UnexpectedStatus {
                status: 503,
                message: "mock app list outage".to_string(),
            });
        }

        Ok(self.apps.read().await.clone())
    }

    async fn app_detail(&self, app_id: i64) -> Result<Option<AppDetail>, ProviderError> {
        self.calls
            .write()
            .await
            .push(RecordedProviderCall::AppDetail { app_id });

        if *self.fail_app_detail.read().await {
            return Err(ProviderError::UnexpectedStatus {
                status: 503,
                message: "mock app detail outage".to_string(),
            });
        }

        Ok(self.details.read().await.get(&app_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[tokio::test]
    async fn test_add_game_serves_list_and_detail() {
        let provider = MockProvider::new();
        provider.add_game(fixtures::app_detail(570, "Dota 2")).await;

        let list = provider.app_list().await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, 570);

        let detail = provider.app_detail(570).await.unwrap().unwrap();
        assert_eq!(detail.name, "Dota 2");
        assert!(provider.app_detail(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_outage_switches() {
        let provider = MockProvider::new();
        provider.set_fail_app_list(true).await;

        assert!(provider.app_list().await.is_err());

        provider.set_fail_app_list(false).await;
        assert!(provider.app_list().await.is_ok());
    }

    #[tokio::test]
    async fn test_calls_are_recorded() {
        let provider = MockProvider::new();
        let _ = provider.app_list().await;
        let _ = provider.app_detail(570).await;
        let _ = provider.app_detail(440).await;

        assert_eq!(provider.call_count().await, 3);
        assert_eq!(provider.detail_call_count().await, 2);
        assert_eq!(
            provider.recorded_calls().await[1],
            RecordedProviderCall::AppDetail { app_id: 570 }
        );
    }
}
