//! Merge-and-paginate listing engine.
//!
//! Answers "page N of games matching filters F" by combining
//! authoritative local catalog rows with supplementary records from the
//! external provider, without ever fetching detail for the whole remote
//! catalog. Local rows always come first; external candidates are only
//! detail-fetched until the page is full.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{keys, Cache};
use crate::catalog::{CatalogError, FilterOptions, GameFilter, GameStore};
use crate::config::{BrowseConfig, CacheConfig};
use crate::metrics;
use crate::provider::{AppDetail, AppEntry, CatalogProvider, ProviderError};

use super::suggest::rank_suggestions;
use super::types::{BrowsePage, BrowseQuery, GameCard, Suggestion};
use super::DetailFetcher;

/// Merged local/external game listing.
pub struct BrowseEngine {
    catalog: Arc<dyn GameStore>,
    provider: Arc<dyn CatalogProvider>,
    cache: Arc<dyn Cache>,
    fetcher: Arc<DetailFetcher>,
    config: BrowseConfig,
    app_list_ttl: Duration,
    filters_ttl: Duration,
}

impl BrowseEngine {
    pub fn new(
        catalog: Arc<dyn GameStore>,
        provider: Arc<dyn CatalogProvider>,
        cache: Arc<dyn Cache>,
        fetcher: Arc<DetailFetcher>,
        config: BrowseConfig,
        cache_config: &CacheConfig,
    ) -> Self {
        Self {
            catalog,
            provider,
            cache,
            fetcher,
            config,
            app_list_ttl: Duration::from_secs(cache_config.app_list_ttl_secs),
            filters_ttl: Duration::from_secs(cache_config.filters_ttl_secs),
        }
    }

    /// One page of merged results. Local rows are sliced DB-first; the
    /// external walk only runs when the page still has room. Provider
    /// failures degrade to local-only results with an advisory notice,
    /// never an error.
    pub async fn page(&self, query: &BrowseQuery) -> Result<BrowsePage, CatalogError> {
        let page = query.page.max(1) as u64;
        let page_size = self.config.page_size;
        let page_start = (page - 1) * page_size as u64;

        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let filter = GameFilter {
            search: search.map(String::from),
            genre_ids: query.genre_ids.clone(),
            tag_ids: query.tag_ids.clone(),
            platform: query.platform.clone(),
        };

        let db_count = self.catalog.count(&filter)?;
        let local = self.catalog.list(&filter, page_size as u32, page_start)?;
        let mut games: Vec<GameCard> = local.iter().map(GameCard::from_game).collect();

        let needed = page_size.saturating_sub(games.len());
        let mut pool_len = 0u64;
        let mut notice = None;

        if needed > 0 {
            let local_ids = self.catalog.ids()?;
            match self.cached_app_list().await {
                Ok(apps) => {
                    let pool = self.candidate_pool(apps, search, &local_ids);
                    pool_len = pool.len() as u64;

                    // Earlier pages consumed the head of the pool.
                    let raw_offset = page_start.saturating_sub(db_count) as usize;
                    let candidates: Vec<i64> =
                        pool.iter().skip(raw_offset).map(|app| app.id).collect();

                    let accepted = self.accept_candidates(&candidates, query, needed).await;
                    games.extend(accepted);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "app list unavailable, serving local-only page");
                    notice = Some(format!("Error fetching Steam app list: {}", e));
                }
            }
        }

        let estimated_total = db_count + pool_len;
        let has_more = page * (page_size as u64) < estimated_total;

        Ok(BrowsePage {
            games,
            page,
            page_size,
            estimated_total,
            has_more,
            notice,
        })
    }

    /// Name suggestions from the cached full catalog list: exact matches
    /// first, then shorter names, then alphabetical. Degrades to no
    /// suggestions when the provider is unreachable.
    pub async fn suggest(&self, query: &str) -> Vec<Suggestion> {
        let trimmed = query.trim();
        if trimmed.chars().count() < self.config.suggest_min_chars {
            return Vec::new();
        }

        match self.cached_app_list().await {
            Ok(apps) => rank_suggestions(&apps, trimmed, self.config.suggest_limit),
            Err(e) => {
                tracing::warn!(error = %e, "app list unavailable, no suggestions");
                Vec::new()
            }
        }
    }

    /// Detail for one app, through the cache. Used by the live detail
    /// view; unlike the listing path, failures surface to the caller.
    pub async fn game_detail(&self, app_id: i64) -> Result<Option<AppDetail>, ProviderError> {
        self.fetcher.fetch_one(app_id).await
    }

    /// Genre and tag dropdown options from the local catalog, memoized
    /// briefly since promotions change them rarely.
    pub async fn filter_options(&self) -> Result<FilterOptions, CatalogError> {
        if let Some(options) = self
            .cache
            .get_as::<FilterOptions>(keys::FILTER_OPTIONS)
            .await
        {
            metrics::CACHE_REQUESTS
                .with_label_values(&["filter_options", "hit"])
                .inc();
            return Ok(options);
        }
        metrics::CACHE_REQUESTS
            .with_label_values(&["filter_options", "miss"])
            .inc();

        let options = self.catalog.filter_options()?;
        self.cache
            .put_as(keys::FILTER_OPTIONS, &options, self.filters_ttl)
            .await;
        Ok(options)
    }

    /// The full provider catalog, through the cache.
    async fn cached_app_list(&self) -> Result<Vec<AppEntry>, ProviderError> {
        if let Some(apps) = self.cache.get_as::<Vec<AppEntry>>(keys::APP_LIST).await {
            metrics::CACHE_REQUESTS
                .with_label_values(&["app_list", "hit"])
                .inc();
            return Ok(apps);
        }
        metrics::CACHE_REQUESTS
            .with_label_values(&["app_list", "miss"])
            .inc();

        let apps = self.provider.app_list().await?;
        self.cache
            .put_as(keys::APP_LIST, &apps, self.app_list_ttl)
            .await;
        Ok(apps)
    }

    /// Name-filter, dedup against local ids, and cap the candidate pool.
    /// Search mode uses the tighter cap.
    fn candidate_pool(
        &self,
        apps: Vec<AppEntry>,
        search: Option<&str>,
        local_ids: &HashSet<i64>,
    ) -> Vec<AppEntry> {
        let needle = search.map(str::to_lowercase);
        let cap = if needle.is_some() {
            self.config.search_pool_cap
        } else {
            self.config.browse_pool_cap
        };

        apps.into_iter()
            .filter(|app| match &needle {
                Some(needle) => app.name.to_lowercase().contains(needle.as_str()),
                None => true,
            })
            .filter(|app| !local_ids.contains(&app.id))
            .take(cap)
            .collect()
    }

    /// Walk candidates in fetch-batch-sized steps, keeping records that
    /// pass the detail filters, until the page is full or the pool runs
    /// out. Fetch failures drop silently.
    async fn accept_candidates(
        &self,
        candidates: &[i64],
        query: &BrowseQuery,
        needed: usize,
    ) -> Vec<GameCard> {
        let mut accepted = Vec::with_capacity(needed);
        let mut fetched = 0usize;

        for chunk in candidates.chunks(self.config.fetch_batch_size) {
            if accepted.len() >= needed {
                break;
            }
            fetched += chunk.len();
            for detail in self.fetcher.fetch_many(chunk).await {
                if accepted.len() >= needed {
                    break;
                }
                if !self.matches_detail_filters(&detail, query) {
                    continue;
                }
                metrics::EXTERNAL_RESULTS_ACCEPTED.inc();
                accepted.push(GameCard::from_detail(&detail));
            }
        }

        metrics::LISTING_DETAIL_FETCHES.observe(fetched as f64);
        accepted
    }

    /// The step-1 filters applied to an external record's embedded data,
    /// plus the downloadable-content screen.
    fn matches_detail_filters(&self, detail: &AppDetail, query: &BrowseQuery) -> bool {
        if detail.is_dlc_like() {
            return false;
        }
        if !detail.has_all_genres(&query.genre_ids) {
            return false;
        }
        if !detail.has_all_tags(&query.tag_ids) {
            return false;
        }
        if let Some(platform) = &query.platform {
            if !detail.platforms.matches(platform) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::catalog::SqliteCatalog;
    use crate::testing::{fixtures, MockProvider};

    struct TestSetup {
        engine: BrowseEngine,
        provider: Arc<MockProvider>,
        catalog: Arc<SqliteCatalog>,
    }

    fn setup_with(config: BrowseConfig) -> TestSetup {
        let provider = Arc::new(MockProvider::new());
        let cache: Arc<dyn Cache> = Arc::new(MemoryCache::new());
        let catalog = Arc::new(SqliteCatalog::in_memory().unwrap());
        let fetcher = Arc::new(DetailFetcher::new(
            provider.clone(),
            cache.clone(),
            config.fetch_batch_size,
            Duration::from_secs(60),
        ));
        let engine = BrowseEngine::new(
            catalog.clone(),
            provider.clone(),
            cache,
            fetcher,
            config,
            &CacheConfig::default(),
        );
        TestSetup {
            engine,
            provider,
            catalog,
        }
    }

    fn setup() -> TestSetup {
        setup_with(BrowseConfig::default())
    }

    /// Promote a plain fixture game into the local catalog.
    fn local_game(setup: &TestSetup, id: i64, name: &str) {
        setup
            .catalog
            .promote(&fixtures::app_detail(id, name), "alice")
            .unwrap();
    }

    fn query(page: i64) -> BrowseQuery {
        BrowseQuery {
            page,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_full_local_page_makes_no_external_calls() {
        let setup = setup();
        for i in 1..=30 {
            local_game(&setup, i, &format!("Game {:02}", i));
        }

        let page = setup.engine.page(&query(1)).await.unwrap();

        assert_eq!(page.games.len(), 25);
        assert!(page.games.iter().all(|card| card.local));
        assert_eq!(page.estimated_total, 30);
        assert!(page.has_more);
        assert!(page.notice.is_none());
        assert_eq!(setup.provider.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_partial_local_page_tops_up_externally() {
        let setup = setup();
        for i in 1..=5 {
            local_game(&setup, i, &format!("Local {:02}", i));
        }
        for i in 1..=30 {
            setup
                .provider
                .add_game(fixtures::app_detail(100 + i, &format!("Remote {:02}", i)))
                .await;
        }

        let page = setup.engine.page(&query(1)).await.unwrap();

        assert_eq!(page.games.len(), 25);
        assert!(page.games[..5].iter().all(|card| card.local));
        assert!(page.games[5..].iter().all(|card| !card.local));
        assert_eq!(page.estimated_total, 5 + 30);
        assert!(page.has_more);

        // The walk stops once the page is full: 3 batches of 8, not all 30.
        assert_eq!(setup.provider.detail_call_count().await, 24);
    }

    #[tokio::test]
    async fn test_external_records_matching_local_ids_are_excluded() {
        let setup = setup();
        local_game(&setup, 10, "Alpha");
        setup.provider.add_game(fixtures::app_detail(10, "Alpha")).await;
        setup.provider.add_game(fixtures::app_detail(20, "Beta")).await;

        let page = setup.engine.page(&query(1)).await.unwrap();

        let ids: Vec<i64> = page.games.iter().map(|card| card.id).collect();
        assert_eq!(ids, vec![10, 20]);
        assert!(page.games[0].local);
        assert!(!page.games[1].local);
        assert_eq!(page.estimated_total, 2);
    }

    #[tokio::test]
    async fn test_provider_outage_degrades_to_local_with_notice() {
        let setup = setup();
        local_game(&setup, 1, "Alpha");
        local_game(&setup, 2, "Beta");
        setup.provider.set_fail_app_list(true).await;

        let page = setup.engine.page(&query(1)).await.unwrap();

        assert_eq!(page.games.len(), 2);
        assert!(page.games.iter().all(|card| card.local));
        assert_eq!(page.estimated_total, 2);
        assert!(!page.has_more);
        let notice = page.notice.unwrap();
        assert!(notice.starts_with("Error fetching Steam app list:"));
    }

    #[tokio::test]
    async fn test_outage_with_empty_catalog_is_empty_page_with_notice() {
        let setup = setup();
        setup.provider.set_fail_app_list(true).await;

        let page = setup.engine.page(&query(1)).await.unwrap();

        assert!(page.games.is_empty());
        assert_eq!(page.estimated_total, 0);
        assert!(page.notice.is_some());
    }

    #[tokio::test]
    async fn test_search_filters_both_sources_case_insensitively() {
        let setup = setup();
        local_game(&setup, 1, "Portal");
        local_game(&setup, 2, "Dota 2");
        setup.provider.add_game(fixtures::app_detail(3, "Portal 2")).await;
        setup.provider.add_game(fixtures::app_detail(4, "Half-Life")).await;

        let page = setup
            .engine
            .page(&BrowseQuery {
                search: Some("PORT".to_string()),
                page: 1,
                ..Default::default()
            })
            .await
            .unwrap();

        let titles: Vec<&str> = page.games.iter().map(|card| card.title.as_str()).collect();
        assert_eq!(titles, vec!["Portal", "Portal 2"]);
        assert_eq!(page.estimated_total, 2);
    }

    #[tokio::test]
    async fn test_search_pool_cap_limits_candidates() {
        let setup = setup_with(BrowseConfig {
            search_pool_cap: 2,
            ..Default::default()
        });
        for i in 1..=5 {
            setup
                .provider
                .add_game(fixtures::app_detail(i, &format!("Port {}", i)))
                .await;
        }

        let page = setup
            .engine
            .page(&BrowseQuery {
                search: Some("port".to_string()),
                page: 1,
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.games.len(), 2);
        assert_eq!(page.estimated_total, 2);
    }

    #[tokio::test]
    async fn test_genre_filter_requires_every_selected_genre() {
        let setup = setup();

        let both = AppDetail {
            genres: vec![fixtures::label(1, "Action"), fixtures::label(3, "RPG")],
            ..fixtures::app_detail(50, "Local Both")
        };
        setup.catalog.promote(&both, "alice").unwrap();
        let only_one = AppDetail {
            genres: vec![fixtures::label(1, "Action")],
            ..fixtures::app_detail(51, "Local One")
        };
        setup.catalog.promote(&only_one, "alice").unwrap();

        setup
            .provider
            .add_game(AppDetail {
                genres: vec![fixtures::label(1, "Action"), fixtures::label(3, "RPG")],
                ..fixtures::app_detail(60, "Remote Both")
            })
            .await;
        setup
            .provider
            .add_game(AppDetail {
                genres: vec![fixtures::label(3, "RPG")],
                ..fixtures::app_detail(61, "Remote One")
            })
            .await;

        let page = setup
            .engine
            .page(&BrowseQuery {
                genre_ids: vec![1, 3],
                page: 1,
                ..Default::default()
            })
            .await
            .unwrap();

        let titles: Vec<&str> = page.games.iter().map(|card| card.title.as_str()).collect();
        assert_eq!(titles, vec!["Local Both", "Remote Both"]);

        // The estimate counts unfetched candidates, so it may exceed the
        // real match count.
        assert_eq!(page.estimated_total, 1 + 2);
    }

    #[tokio::test]
    async fn test_tag_filter_requires_every_selected_tag() {
        let setup = setup();
        setup
            .provider
            .add_game(AppDetail {
                tags: vec![fixtures::label(1, "Multi-player"), fixtures::label(9, "Co-op")],
                ..fixtures::app_detail(70, "Remote Coop")
            })
            .await;
        setup
            .provider
            .add_game(AppDetail {
                tags: vec![fixtures::label(1, "Multi-player")],
                ..fixtures::app_detail(71, "Remote Solo")
            })
            .await;

        let page = setup
            .engine
            .page(&BrowseQuery {
                tag_ids: vec![1, 9],
                page: 1,
                ..Default::default()
            })
            .await
            .unwrap();

        let titles: Vec<&str> = page.games.iter().map(|card| card.title.as_str()).collect();
        assert_eq!(titles, vec!["Remote Coop"]);
    }

    #[tokio::test]
    async fn test_dlc_records_are_screened_from_external_results() {
        let setup = setup();
        setup
            .provider
            .add_game(AppDetail {
                kind: "dlc".to_string(),
                ..fixtures::app_detail(80, "Season Pass")
            })
            .await;
        setup
            .provider
            .add_game(fixtures::app_detail(81, "Base Game DLC Bundle"))
            .await;
        setup.provider.add_game(fixtures::app_detail(82, "Base Game")).await;

        let page = setup.engine.page(&query(1)).await.unwrap();

        let titles: Vec<&str> = page.games.iter().map(|card| card.title.as_str()).collect();
        assert_eq!(titles, vec!["Base Game"]);
    }

    #[tokio::test]
    async fn test_platform_filter_on_external_flags() {
        let setup = setup();
        setup
            .provider
            .add_game(AppDetail {
                platforms: crate::provider::PlatformFlags {
                    windows: true,
                    mac: false,
                    linux: true,
                },
                ..fixtures::app_detail(90, "Runs Everywhere")
            })
            .await;
        setup
            .provider
            .add_game(fixtures::app_detail(91, "Windows Only"))
            .await;

        let page = setup
            .engine
            .page(&BrowseQuery {
                platform: Some("linux".to_string()),
                page: 1,
                ..Default::default()
            })
            .await
            .unwrap();

        let titles: Vec<&str> = page.games.iter().map(|card| card.title.as_str()).collect();
        assert_eq!(titles, vec!["Runs Everywhere"]);
    }

    #[tokio::test]
    async fn test_deep_pages_continue_the_candidate_walk() {
        let setup = setup();
        for i in 1..=60 {
            setup
                .provider
                .add_game(fixtures::app_detail(i, &format!("Remote {:02}", i)))
                .await;
        }

        let first = setup.engine.page(&query(1)).await.unwrap();
        let second = setup.engine.page(&query(2)).await.unwrap();
        let third = setup.engine.page(&query(3)).await.unwrap();

        assert_eq!(first.games.len(), 25);
        assert_eq!(second.games.len(), 25);
        assert_eq!(third.games.len(), 10);

        assert_eq!(first.games[0].title, "Remote 01");
        assert_eq!(second.games[0].title, "Remote 26");
        assert_eq!(third.games[0].title, "Remote 51");
        assert!(!third.has_more);
    }

    #[tokio::test]
    async fn test_page_numbers_below_one_are_clamped() {
        let setup = setup();
        local_game(&setup, 1, "Alpha");

        let page = setup.engine.page(&query(-3)).await.unwrap();

        assert_eq!(page.page, 1);
        assert_eq!(page.games.len(), 1);
    }

    #[tokio::test]
    async fn test_app_list_is_cached_across_requests() {
        let setup = setup();
        setup.provider.add_game(fixtures::app_detail(1, "Alpha")).await;

        setup.engine.page(&query(1)).await.unwrap();
        setup.engine.page(&query(1)).await.unwrap();

        let list_calls = setup
            .provider
            .recorded_calls()
            .await
            .iter()
            .filter(|call| matches!(call, crate::testing::RecordedProviderCall::AppList))
            .count();
        assert_eq!(list_calls, 1);
    }

    #[tokio::test]
    async fn test_game_detail_passes_through_cache() {
        let setup = setup();
        setup.provider.add_detail(fixtures::app_detail(570, "Dota 2")).await;

        let detail = setup.engine.game_detail(570).await.unwrap().unwrap();
        assert_eq!(detail.name, "Dota 2");

        setup.engine.game_detail(570).await.unwrap();
        assert_eq!(setup.provider.detail_call_count().await, 1);
    }

    #[tokio::test]
    async fn test_filter_options_are_memoized() {
        let setup = setup();
        let detail = AppDetail {
            genres: vec![fixtures::label(1, "Action"), fixtures::label(4, "Puzzle")],
            tags: vec![fixtures::label(31, "Singleplayer")],
            ..fixtures::app_detail(1, "Alpha")
        };
        setup.catalog.promote(&detail, "alice").unwrap();

        let options = setup.engine.filter_options().await.unwrap();
        assert_eq!(options.genres.len(), 2);
        assert_eq!(options.tags.len(), 1);

        // A later promotion is invisible until the memoized copy expires.
        let newer = AppDetail {
            genres: vec![fixtures::label(7, "Strategy")],
            ..fixtures::app_detail(2, "Beta")
        };
        setup.catalog.promote(&newer, "alice").unwrap();

        let cached = setup.engine.filter_options().await.unwrap();
        assert_eq!(cached.genres.len(), 2);
    }

    #[tokio::test]
    async fn test_suggest_below_minimum_length_is_empty() {
        let setup = setup();
        setup.provider.add_game(fixtures::app_detail(1, "Portal")).await;

        let suggestions = setup.engine.suggest("p").await;

        assert!(suggestions.is_empty());
        assert_eq!(setup.provider.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_suggest_outage_degrades_to_empty() {
        let setup = setup();
        setup.provider.set_fail_app_list(true).await;

        assert!(setup.engine.suggest("portal").await.is_empty());
    }

    #[tokio::test]
    async fn test_suggest_uses_cached_app_list() {
        let setup = setup();
        setup.provider.add_game(fixtures::app_detail(400, "Portal")).await;

        let suggestions = setup.engine.suggest("portal").await;
        assert_eq!(
            suggestions,
            vec![Suggestion {
                id: 400,
                name: "Portal".to_string()
            }]
        );

        setup.engine.suggest("portal").await;
        assert_eq!(setup.provider.call_count().await, 1);
    }
}
