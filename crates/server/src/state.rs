use std::sync::Arc;
use wishdeck_core::{
    Authenticator, BrowseEngine, Config, GameStore, SanitizedConfig, WishlistManager,
    WishlistStore,
};

/// Shared application state
pub struct AppState {
    config: Config,
    authenticator: Arc<dyn Authenticator>,
    catalog: Arc<dyn GameStore>,
    wishlist_store: Arc<dyn WishlistStore>,
    wishlists: Arc<WishlistManager>,
    browse: Arc<BrowseEngine>,
}

impl AppState {
    pub fn new(
        config: Config,
        authenticator: Arc<dyn Authenticator>,
        catalog: Arc<dyn GameStore>,
        wishlist_store: Arc<dyn WishlistStore>,
        wishlists: Arc<WishlistManager>,
        browse: Arc<BrowseEngine>,
    ) -> Self {
        Self {
            config,
            authenticator,
            catalog,
            wishlist_store,
            wishlists,
            browse,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn authenticator(&self) -> &dyn Authenticator {
        self.authenticator.as_ref()
    }

    pub fn catalog(&self) -> &dyn GameStore {
        self.catalog.as_ref()
    }

    /// Raw store access, used by the dynamic metrics collector.
    pub fn wishlist_store(&self) -> &dyn WishlistStore {
        self.wishlist_store.as_ref()
    }

    pub fn wishlists(&self) -> &WishlistManager {
        self.wishlists.as_ref()
    }

    pub fn browse(&self) -> &BrowseEngine {
        self.browse.as_ref()
    }
}
