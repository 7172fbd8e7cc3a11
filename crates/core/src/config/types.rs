use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub auth: AuthConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub browse: BrowseConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8080
}

/// Authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub method: AuthMethod,
    /// Header carrying the caller identity when method = "header"
    #[serde(default = "default_identity_header")]
    pub identity_header: String,
}

fn default_identity_header() -> String {
    "x-user-id".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    /// Single-user deployments: every request acts as the "local" user
    None,
    /// Identity supplied by the fronting layer in a trusted header
    Header,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("wishdeck.db")
}

/// Cache TTL configuration (seconds)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Full provider app list (id + name pairs)
    #[serde(default = "default_app_list_ttl")]
    pub app_list_ttl_secs: u64,
    /// Per-app detail payloads
    #[serde(default = "default_detail_ttl")]
    pub detail_ttl_secs: u64,
    /// Locally computed genre/tag filter option lists
    #[serde(default = "default_filters_ttl")]
    pub filters_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            app_list_ttl_secs: default_app_list_ttl(),
            detail_ttl_secs: default_detail_ttl(),
            filters_ttl_secs: default_filters_ttl(),
        }
    }
}

fn default_app_list_ttl() -> u64 {
    6 * 60 * 60
}

fn default_detail_ttl() -> u64 {
    24 * 60 * 60
}

fn default_filters_ttl() -> u64 {
    10 * 60
}

/// External catalog provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// Full app list endpoint (id + name for the whole catalog)
    #[serde(default = "default_app_list_url")]
    pub app_list_url: String,
    /// App detail endpoint; the app id is appended as `?appids=<id>`
    #[serde(default = "default_detail_url")]
    pub detail_url: String,
    /// Timeout for the full list call (default: 10)
    #[serde(default = "default_list_timeout")]
    pub list_timeout_secs: u64,
    /// Timeout for per-app detail calls (default: 5)
    #[serde(default = "default_detail_timeout")]
    pub detail_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            app_list_url: default_app_list_url(),
            detail_url: default_detail_url(),
            list_timeout_secs: default_list_timeout(),
            detail_timeout_secs: default_detail_timeout(),
        }
    }
}

fn default_app_list_url() -> String {
    "https://api.steampowered.com/ISteamApps/GetAppList/v2/".to_string()
}

fn default_detail_url() -> String {
    "https://store.steampowered.com/api/appdetails".to_string()
}

fn default_list_timeout() -> u64 {
    10
}

fn default_detail_timeout() -> u64 {
    5
}

/// Merge-and-paginate engine configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BrowseConfig {
    /// Items per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Concurrent detail fetches per batch
    #[serde(default = "default_fetch_batch_size")]
    pub fetch_batch_size: usize,
    /// External candidate cap when a search string is present
    #[serde(default = "default_search_pool_cap")]
    pub search_pool_cap: usize,
    /// External candidate cap when browsing without a search string
    #[serde(default = "default_browse_pool_cap")]
    pub browse_pool_cap: usize,
    /// Maximum results returned by the suggestion lookup
    #[serde(default = "default_suggest_limit")]
    pub suggest_limit: usize,
    /// Minimum query length for the suggestion lookup
    #[serde(default = "default_suggest_min_chars")]
    pub suggest_min_chars: usize,
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            fetch_batch_size: default_fetch_batch_size(),
            search_pool_cap: default_search_pool_cap(),
            browse_pool_cap: default_browse_pool_cap(),
            suggest_limit: default_suggest_limit(),
            suggest_min_chars: default_suggest_min_chars(),
        }
    }
}

fn default_page_size() -> usize {
    25
}

fn default_fetch_batch_size() -> usize {
    8
}

fn default_search_pool_cap() -> usize {
    100
}

fn default_browse_pool_cap() -> usize {
    1000
}

fn default_suggest_limit() -> usize {
    8
}

fn default_suggest_min_chars() -> usize {
    2
}

/// Sanitized config for API responses
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub auth: SanitizedAuthConfig,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub provider: ProviderConfig,
    pub browse: BrowseConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAuthConfig {
    pub method: String,
    pub identity_header: String,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            auth: SanitizedAuthConfig {
                method: match config.auth.method {
                    AuthMethod::None => "none".to_string(),
                    AuthMethod::Header => "header".to_string(),
                },
                identity_header: config.auth.identity_header.clone(),
            },
            server: config.server.clone(),
            database: config.database.clone(),
            cache: config.cache.clone(),
            provider: config.provider.clone(),
            browse: config.browse.clone(),
        }
    }
}
