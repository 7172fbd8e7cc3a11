use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{games, handlers, profile, wishlists};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Browsing and statistics need no identity
    let public_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Merged game listing
        .route("/games", get(games::list_games))
        .route("/games/suggest", get(games::suggest))
        .route("/games/filters", get(games::filter_options))
        .route("/games/{id}", get(games::get_game))
        .route("/genres/{id}/games", get(games::genre_games))
        // Site-wide stats
        .route("/stats", get(profile::site_stats));

    // Wish-lists and the profile are scoped to the caller identity
    let protected_routes = Router::new()
        .route("/wishlists", post(wishlists::create_wishlist))
        .route("/wishlists", get(wishlists::list_wishlists))
        .route("/wishlists/{id}", get(wishlists::get_wishlist))
        .route("/wishlists/{id}", delete(wishlists::delete_wishlist))
        .route("/wishlists/{id}/items", post(wishlists::add_item))
        .route(
            "/wishlists/{id}/items/{item_id}",
            delete(wishlists::remove_item),
        )
        .route(
            "/wishlists/{id}/items/{item_id}/move",
            post(wishlists::move_item),
        )
        .route("/profile", get(profile::get_profile))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            super::middleware::auth_middleware,
        ));

    let api_routes = public_routes.merge(protected_routes);

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::from_fn(super::middleware::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
