//! Common test utilities for E2E testing with mocks.
//!
//! Builds the full server stack in-process against a temp-file database
//! and a mock catalog provider, so tests exercise real routing, auth and
//! serialization without any network.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use wishdeck_core::testing::MockProvider;
use wishdeck_core::{
    AuthConfig, AuthMethod, Authenticator, BrowseConfig, BrowseEngine, Cache, CacheConfig,
    CatalogProvider, Config, DatabaseConfig, DetailFetcher, GameStore, HeaderAuthenticator,
    MemoryCache, NoneAuthenticator, ProviderConfig, ServerConfig, SqliteCatalog,
    SqliteWishlistStore, WishlistManager, WishlistStore,
};

/// Re-export fixtures for test convenience
pub use wishdeck_core::testing::fixtures;

/// Test fixture for E2E testing with a mock provider.
///
/// The provider handle controls the external catalog (app list, details,
/// simulated outages); the catalog handle allows seeding promoted games
/// directly when a test does not care about the promotion flow.
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock catalog provider
    pub provider: Arc<MockProvider>,
    /// Local game catalog (shared with the running stack)
    pub catalog: Arc<SqliteCatalog>,
    /// Temporary directory holding the test database
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Configuration for the test fixture.
#[derive(Debug, Clone)]
pub struct TestConfig {
    pub auth_method: AuthMethod,
    pub browse: BrowseConfig,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            auth_method: AuthMethod::Header,
            browse: BrowseConfig::default(),
        }
    }
}

impl TestConfig {
    /// Single-user mode: every request acts as the "local" user.
    #[allow(dead_code)]
    pub fn with_none_auth() -> Self {
        Self {
            auth_method: AuthMethod::None,
            ..Default::default()
        }
    }
}

impl TestFixture {
    /// Create a new test fixture with header auth and default browse
    /// settings.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let config = Config {
            auth: AuthConfig {
                method: test_config.auth_method.clone(),
                identity_header: "x-user-id".to_string(),
            },
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
            },
            database: DatabaseConfig {
                path: db_path.clone(),
            },
            cache: CacheConfig::default(),
            provider: ProviderConfig::default(),
            browse: test_config.browse,
        };

        let authenticator: Arc<dyn Authenticator> = match config.auth.method {
            AuthMethod::None => Arc::new(NoneAuthenticator::new()),
            AuthMethod::Header => {
                Arc::new(HeaderAuthenticator::new(config.auth.identity_header.clone()))
            }
        };

        let provider = Arc::new(MockProvider::new());
        let cache: Arc<dyn Cache> = Arc::new(MemoryCache::new());
        let catalog =
            Arc::new(SqliteCatalog::new(&db_path).expect("Failed to create game catalog"));
        let wishlist_store: Arc<dyn WishlistStore> = Arc::new(
            SqliteWishlistStore::new(&db_path).expect("Failed to create wishlist store"),
        );

        let fetcher = Arc::new(DetailFetcher::new(
            Arc::clone(&provider) as Arc<dyn CatalogProvider>,
            Arc::clone(&cache),
            config.browse.fetch_batch_size,
            Duration::from_secs(config.cache.detail_ttl_secs),
        ));

        let browse = Arc::new(BrowseEngine::new(
            Arc::clone(&catalog) as Arc<dyn GameStore>,
            Arc::clone(&provider) as Arc<dyn CatalogProvider>,
            cache,
            Arc::clone(&fetcher),
            config.browse.clone(),
            &config.cache,
        ));

        let wishlists = Arc::new(WishlistManager::new(
            Arc::clone(&wishlist_store),
            Arc::clone(&catalog) as Arc<dyn GameStore>,
            fetcher,
        ));

        let state = Arc::new(wishdeck_server::state::AppState::new(
            config,
            authenticator,
            Arc::clone(&catalog) as Arc<dyn GameStore>,
            wishlist_store,
            wishlists,
            browse,
        ));

        let router = wishdeck_server::api::create_router(state);

        Self {
            router,
            provider,
            catalog,
            temp_dir,
        }
    }

    /// Promote a plain fixture game straight into the local catalog.
    #[allow(dead_code)]
    pub fn seed_local_game(&self, id: i64, name: &str, owner: &str) {
        self.catalog
            .promote(&fixtures::app_detail(id, name), owner)
            .expect("Failed to seed local game");
    }

    /// Send an anonymous GET request.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None, None).await
    }

    /// Send a GET request with a caller identity.
    #[allow(dead_code)]
    pub async fn get_as(&self, user: &str, path: &str) -> TestResponse {
        self.request("GET", path, Some(user), None).await
    }

    /// Send an anonymous POST request with JSON body.
    #[allow(dead_code)]
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, None, Some(body)).await
    }

    /// Send a POST request with a caller identity and JSON body.
    #[allow(dead_code)]
    pub async fn post_as(&self, user: &str, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(user), Some(body)).await
    }

    /// Send a DELETE request with a caller identity.
    #[allow(dead_code)]
    pub async fn delete_as(&self, user: &str, path: &str) -> TestResponse {
        self.request("DELETE", path, Some(user), None).await
    }

    /// Send a GET request and return the raw text body.
    #[allow(dead_code)]
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        (status, String::from_utf8_lossy(&body_bytes).to_string())
    }

    /// Send a POST request with a raw string body (for malformed JSON).
    #[allow(dead_code)]
    pub async fn post_raw_as(&self, user: &str, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .header("x-user-id", user)
            .body(Body::from(body.to_string()))
            .unwrap();

        self.send(request).await
    }

    /// Send a request to the test server.
    async fn request(
        &self,
        method: &str,
        path: &str,
        user: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        if let Some(user) = user {
            request_builder = request_builder.header("x-user-id", user);
        }

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}
