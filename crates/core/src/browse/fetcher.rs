//! Bounded concurrent detail fetching.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use crate::cache::{keys, Cache};
use crate::metrics;
use crate::provider::{AppDetail, CatalogProvider, ProviderError};

/// Fetches per-app detail records in fixed-size concurrent batches,
/// reading and writing through the injected cache.
pub struct DetailFetcher {
    provider: Arc<dyn CatalogProvider>,
    cache: Arc<dyn Cache>,
    batch_size: usize,
    detail_ttl: Duration,
}

impl DetailFetcher {
    pub fn new(
        provider: Arc<dyn CatalogProvider>,
        cache: Arc<dyn Cache>,
        batch_size: usize,
        detail_ttl: Duration,
    ) -> Self {
        Self {
            provider,
            cache,
            batch_size: batch_size.max(1),
            detail_ttl,
        }
    }

    /// Detail for one app, from cache when fresh. `Ok(None)` means the
    /// provider answered but knows no such app.
    pub async fn fetch_one(&self, app_id: i64) -> Result<Option<AppDetail>, ProviderError> {
        let key = keys::app_detail(app_id);

        if let Some(detail) = self.cache.get_as::<AppDetail>(&key).await {
            metrics::CACHE_REQUESTS
                .with_label_values(&["app_detail", "hit"])
                .inc();
            return Ok(Some(detail));
        }
        metrics::CACHE_REQUESTS
            .with_label_values(&["app_detail", "miss"])
            .inc();

        let detail = self.provider.app_detail(app_id).await?;
        if let Some(ref detail) = detail {
            self.cache.put_as(&key, detail, self.detail_ttl).await;
        }
        Ok(detail)
    }

    /// Details for `app_ids`, preserving input order. Failed and unknown
    /// ids are dropped from the result.
    pub async fn fetch_many(&self, app_ids: &[i64]) -> Vec<AppDetail> {
        let mut details = Vec::with_capacity(app_ids.len());
        for chunk in app_ids.chunks(self.batch_size) {
            let batch = chunk.iter().map(|id| self.fetch_one(*id));
            for (app_id, result) in chunk.iter().zip(join_all(batch).await) {
                match result {
                    Ok(Some(detail)) => details.push(detail),
                    Ok(None) => {
                        tracing::debug!(app_id, "provider has no detail for app");
                    }
                    Err(e) => {
                        tracing::debug!(app_id, error = %e, "detail fetch failed, dropping candidate");
                    }
                }
            }
        }
        details
    }
}
