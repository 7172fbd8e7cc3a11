//! Authentication and metrics middleware for API routes.

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{request::Parts, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use wishdeck_core::{AuthRequest, Identity};

use crate::metrics::{
    normalize_path, AUTH_FAILURES_TOTAL, HTTP_REQUESTS_IN_FLIGHT, HTTP_REQUESTS_TOTAL,
    HTTP_REQUEST_DURATION,
};
use crate::state::AppState;

/// Metrics middleware that tracks HTTP request duration and counts.
///
/// This middleware records:
/// - Request duration (histogram)
/// - Request count (counter)
/// - Requests in flight (gauge)
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = normalize_path(request.uri().path());

    HTTP_REQUESTS_IN_FLIGHT.inc();

    let response = next.run(request).await;

    HTTP_REQUESTS_IN_FLIGHT.dec();

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    HTTP_REQUEST_DURATION
        .with_label_values(&[&method, &path, &status])
        .observe(duration);
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, &status])
        .inc();

    response
}

/// Authentication middleware that resolves the caller identity.
///
/// With the "none" method every request acts as the fixed local user.
/// Otherwise credentials are extracted from request headers and checked
/// against the configured authenticator; failures return 401.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let authenticator = state.authenticator();

    if authenticator.method_name() == "none" {
        let mut request = request;
        request.extensions_mut().insert(Identity::local());
        return Ok(next.run(request).await);
    }

    // Extract headers into HashMap for AuthRequest
    let headers: HashMap<String, String> = request
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_lowercase(), v.to_string()))
        })
        .collect();

    // Get source IP (default to localhost if not available)
    let source_ip = request
        .extensions()
        .get::<std::net::SocketAddr>()
        .map(|addr| addr.ip())
        .unwrap_or_else(|| std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST));

    let auth_request = AuthRequest { headers, source_ip };

    match authenticator.authenticate(&auth_request).await {
        Ok(identity) => {
            let mut request = request;
            request.extensions_mut().insert(identity);
            Ok(next.run(request).await)
        }
        Err(wishdeck_core::AuthError::NotAuthenticated) => {
            AUTH_FAILURES_TOTAL
                .with_label_values(&["not_authenticated"])
                .inc();
            Err(StatusCode::UNAUTHORIZED)
        }
        Err(wishdeck_core::AuthError::InvalidCredentials(_)) => {
            AUTH_FAILURES_TOTAL
                .with_label_values(&["invalid_credentials"])
                .inc();
            Err(StatusCode::UNAUTHORIZED)
        }
        Err(_) => {
            AUTH_FAILURES_TOTAL
                .with_label_values(&["internal_error"])
                .inc();
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Extractor for the authenticated owner id.
///
/// Reads the Identity stored in request extensions by the auth
/// middleware. Falls back to the local single-user identity if no
/// identity is present (only possible on routes without the middleware).
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let user_id = parts
            .extensions
            .get::<Identity>()
            .map(|id| id.user_id.clone())
            .unwrap_or_else(|| Identity::local().user_id);
        std::future::ready(Ok(AuthUser(user_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, middleware, routing::get, Router};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;
    use wishdeck_core::testing::MockProvider;
    use wishdeck_core::{
        AuthConfig, AuthMethod, BrowseConfig, BrowseEngine, Cache, CacheConfig, CatalogProvider,
        Config, DatabaseConfig, DetailFetcher, GameStore, HeaderAuthenticator, MemoryCache,
        NoneAuthenticator, ProviderConfig, ServerConfig, SqliteCatalog, SqliteWishlistStore,
        WishlistManager, WishlistStore,
    };

    async fn dummy_handler() -> &'static str {
        "OK"
    }

    fn create_test_config(auth_config: AuthConfig) -> Config {
        Config {
            auth: auth_config,
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            cache: CacheConfig::default(),
            provider: ProviderConfig::default(),
            browse: BrowseConfig::default(),
        }
    }

    fn create_test_state(auth_config: AuthConfig) -> Arc<AppState> {
        let authenticator: Arc<dyn wishdeck_core::Authenticator> = match auth_config.method {
            AuthMethod::None => Arc::new(NoneAuthenticator::new()),
            AuthMethod::Header => {
                Arc::new(HeaderAuthenticator::new(auth_config.identity_header.clone()))
            }
        };

        let provider: Arc<dyn CatalogProvider> = Arc::new(MockProvider::new());
        let cache: Arc<dyn Cache> = Arc::new(MemoryCache::new());
        let catalog: Arc<dyn GameStore> = Arc::new(SqliteCatalog::in_memory().unwrap());
        let wishlist_store: Arc<dyn WishlistStore> =
            Arc::new(SqliteWishlistStore::in_memory().unwrap());

        let config = create_test_config(auth_config);
        let fetcher = Arc::new(DetailFetcher::new(
            Arc::clone(&provider),
            Arc::clone(&cache),
            config.browse.fetch_batch_size,
            Duration::from_secs(60),
        ));
        let browse = Arc::new(BrowseEngine::new(
            Arc::clone(&catalog),
            provider,
            cache,
            Arc::clone(&fetcher),
            config.browse.clone(),
            &config.cache,
        ));
        let wishlists = Arc::new(WishlistManager::new(
            Arc::clone(&wishlist_store),
            Arc::clone(&catalog),
            fetcher,
        ));

        Arc::new(AppState::new(
            config,
            authenticator,
            catalog,
            wishlist_store,
            wishlists,
            browse,
        ))
    }

    fn header_auth_config() -> AuthConfig {
        AuthConfig {
            method: AuthMethod::Header,
            identity_header: "x-user-id".to_string(),
        }
    }

    fn test_app(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/test", get(dummy_handler))
            .layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            ))
            .with_state(state)
    }

    #[tokio::test]
    async fn test_none_auth_allows_all() {
        let state = create_test_state(AuthConfig {
            method: AuthMethod::None,
            identity_header: "x-user-id".to_string(),
        });
        let app = test_app(state);

        let request = Request::builder()
            .uri("/test")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_header_auth_valid() {
        let app = test_app(create_test_state(header_auth_config()));

        let request = Request::builder()
            .uri("/test")
            .header("x-user-id", "alice")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_header_auth_missing() {
        let app = test_app(create_test_state(header_auth_config()));

        let request = Request::builder()
            .uri("/test")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_header_auth_custom_header_name() {
        let app = test_app(create_test_state(AuthConfig {
            method: AuthMethod::Header,
            identity_header: "x-forwarded-user".to_string(),
        }));

        let request = Request::builder()
            .uri("/test")
            .header("x-forwarded-user", "bob")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_header_auth_rejects_oversized_user_id() {
        let app = test_app(create_test_state(header_auth_config()));

        let request = Request::builder()
            .uri("/test")
            .header("x-user-id", "a".repeat(200))
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_auth_user_extractor_with_header_auth() {
        use http_body_util::BodyExt;

        async fn user_handler(AuthUser(user_id): AuthUser) -> String {
            user_id
        }

        let state = create_test_state(header_auth_config());
        let app = Router::new()
            .route("/test", get(user_handler))
            .layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            ))
            .with_state(state);

        let request = Request::builder()
            .uri("/test")
            .header("x-user-id", "alice")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(String::from_utf8(body.to_vec()).unwrap(), "alice");
    }

    #[tokio::test]
    async fn test_auth_user_extractor_with_none_auth() {
        use http_body_util::BodyExt;

        async fn user_handler(AuthUser(user_id): AuthUser) -> String {
            user_id
        }

        let state = create_test_state(AuthConfig {
            method: AuthMethod::None,
            identity_header: "x-user-id".to_string(),
        });
        let app = Router::new()
            .route("/test", get(user_handler))
            .layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            ))
            .with_state(state);

        let request = Request::builder()
            .uri("/test")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(String::from_utf8(body.to_vec()).unwrap(), "local");
    }
}
