//! Wish-list API handlers.
//!
//! Every route runs behind the auth middleware; the owner id comes from
//! the AuthUser extractor and scopes all store access. Missing and
//! foreign wish-lists produce the same 404.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use wishdeck_core::{
    AddOutcome, MoveDirection, MoveOutcome, Wishlist, WishlistDetail, WishlistError,
    WishlistSummary,
};

use super::middleware::AuthUser;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a wish-list
#[derive(Debug, Deserialize)]
pub struct CreateWishlistBody {
    pub name: String,
}

/// Request body for adding a game
#[derive(Debug, Deserialize)]
pub struct AddItemBody {
    /// Provider-assigned game id
    pub game_id: i64,
}

/// Request body for moving an item one step
#[derive(Debug, Deserialize)]
pub struct MoveItemBody {
    pub direction: MoveDirection,
}

/// Response for adding a game
#[derive(Debug, Serialize)]
pub struct AddItemResponse {
    pub outcome: AddOutcome,
}

/// Response for moving an item
#[derive(Debug, Serialize)]
pub struct MoveItemResponse {
    pub outcome: MoveOutcome,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct WishlistErrorResponse {
    pub error: String,
}

/// Map a wish-list error onto its response status.
fn error_response(e: WishlistError) -> (StatusCode, Json<WishlistErrorResponse>) {
    let status = match &e {
        WishlistError::NotFound | WishlistError::ItemNotFound => StatusCode::NOT_FOUND,
        WishlistError::NameTaken(_) => StatusCode::CONFLICT,
        WishlistError::Promotion(_) => StatusCode::BAD_GATEWAY,
        WishlistError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(WishlistErrorResponse {
            error: e.to_string(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// Create a new wish-list
pub async fn create_wishlist(
    State(state): State<Arc<AppState>>,
    AuthUser(owner): AuthUser,
    Json(body): Json<CreateWishlistBody>,
) -> Result<(StatusCode, Json<Wishlist>), impl IntoResponse> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(WishlistErrorResponse {
                error: "Wishlist name must not be empty.".to_string(),
            }),
        ));
    }

    match state.wishlists().create(&owner, name) {
        Ok(wishlist) => Ok((StatusCode::CREATED, Json(wishlist))),
        Err(e) => Err(error_response(e)),
    }
}

/// List the caller's wish-lists, most recently updated first
pub async fn list_wishlists(
    State(state): State<Arc<AppState>>,
    AuthUser(owner): AuthUser,
) -> Result<Json<Vec<WishlistSummary>>, impl IntoResponse> {
    match state.wishlists().lists(&owner) {
        Ok(lists) => Ok(Json(lists)),
        Err(e) => Err(error_response(e)),
    }
}

/// One wish-list with its ordered items
pub async fn get_wishlist(
    State(state): State<Arc<AppState>>,
    AuthUser(owner): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<WishlistDetail>, impl IntoResponse> {
    match state.wishlists().detail(&owner, &id) {
        Ok(detail) => Ok(Json(detail)),
        Err(e) => Err(error_response(e)),
    }
}

/// Delete a wish-list and its items
pub async fn delete_wishlist(
    State(state): State<Arc<AppState>>,
    AuthUser(owner): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, impl IntoResponse> {
    match state.wishlists().delete(&owner, &id) {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err(error_response(e)),
    }
}

/// Add a game to a wish-list, promoting it into the local catalog first
pub async fn add_item(
    State(state): State<Arc<AppState>>,
    AuthUser(owner): AuthUser,
    Path(id): Path<String>,
    Json(body): Json<AddItemBody>,
) -> Result<(StatusCode, Json<AddItemResponse>), impl IntoResponse> {
    match state.wishlists().add_item(&owner, &id, body.game_id).await {
        Ok(outcome @ AddOutcome::Added) => {
            Ok((StatusCode::CREATED, Json(AddItemResponse { outcome })))
        }
        Ok(outcome @ AddOutcome::AlreadyPresent) => {
            Ok((StatusCode::OK, Json(AddItemResponse { outcome })))
        }
        Err(e) => Err(error_response(e)),
    }
}

/// Remove an item from a wish-list
pub async fn remove_item(
    State(state): State<Arc<AppState>>,
    AuthUser(owner): AuthUser,
    Path((id, item_id)): Path<(String, String)>,
) -> Result<StatusCode, impl IntoResponse> {
    match state.wishlists().remove_item(&owner, &id, &item_id) {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err(error_response(e)),
    }
}

/// Move an item one step up or down
pub async fn move_item(
    State(state): State<Arc<AppState>>,
    AuthUser(owner): AuthUser,
    Path((id, item_id)): Path<(String, String)>,
    Json(body): Json<MoveItemBody>,
) -> Result<Json<MoveItemResponse>, impl IntoResponse> {
    match state
        .wishlists()
        .move_item(&owner, &id, &item_id, body.direction)
    {
        Ok(outcome) => Ok(Json(MoveItemResponse { outcome })),
        Err(e) => Err(error_response(e)),
    }
}
