pub mod auth;
pub mod browse;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod metrics;
pub mod provider;
pub mod testing;
pub mod wishlist;

pub use auth::{
    create_authenticator, AuthError, AuthRequest, Authenticator, HeaderAuthenticator, Identity,
    NoneAuthenticator,
};
pub use browse::{
    BrowseEngine, BrowsePage, BrowseQuery, DetailFetcher, GameCard, Suggestion,
};
pub use cache::{Cache, CacheError, MemoryCache};
pub use catalog::{
    CatalogError, FilterOptions, Game, GameFilter, GameStore, Genre, SqliteCatalog, Tag,
};
pub use config::{
    load_config, load_config_from_str, validate_config, AuthConfig, AuthMethod, BrowseConfig,
    CacheConfig, Config, ConfigError, DatabaseConfig, ProviderConfig, SanitizedConfig,
    ServerConfig,
};
pub use provider::{
    AppDetail, AppEntry, CatalogProvider, LabelEntry, PlatformFlags, ProviderError, SteamProvider,
};
pub use wishlist::{
    AddOutcome, MoveDirection, MoveOutcome, ProfileStats, SiteStats, SqliteWishlistStore, TopGame,
    Wishlist, WishlistDetail, WishlistEntry, WishlistError, WishlistItem, WishlistManager,
    WishlistStore, WishlistSummary,
};
