//! Profile and site statistics handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;
use wishdeck_core::{ProfileStats, SiteStats};

use super::middleware::AuthUser;
use crate::state::AppState;

/// Error response
#[derive(Debug, Serialize)]
pub struct StatsErrorResponse {
    pub error: String,
}

/// Usage statistics for the authenticated owner
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    AuthUser(owner): AuthUser,
) -> Result<Json<ProfileStats>, impl IntoResponse> {
    match state.wishlists().profile(&owner) {
        Ok(stats) => Ok(Json(stats)),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(StatsErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}

/// Site-wide wish-list statistics
pub async fn site_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SiteStats>, impl IntoResponse> {
    match state.wishlists().site_stats() {
        Ok(stats) => Ok(Json(stats)),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(StatsErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}
