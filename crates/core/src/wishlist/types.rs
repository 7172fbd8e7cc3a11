use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Game;

/// A named, ordered collection of games belonging to one owner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Wishlist {
    /// Unique identifier (UUID).
    pub id: String,
    /// Owner identity as supplied by the auth layer.
    pub owner: String,
    /// Display name, unique per owner.
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One game entry within a wish-list.
///
/// `order` is densely renumbered (0..n) after every successful move, so
/// gaps can only appear between moves (e.g. after a removal). Reads sort
/// by `(order, added_on)` which keeps the list stable across gaps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WishlistItem {
    /// Unique identifier (UUID).
    pub id: String,
    pub wishlist_id: String,
    /// Promoted game id (provider-assigned).
    pub game_id: i64,
    pub order: i64,
    pub added_on: DateTime<Utc>,
}

/// Direction for a single-step item move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveDirection {
    Up,
    Down,
}

/// Outcome of adding a game to a wish-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddOutcome {
    /// A new entry was appended at the end of the list.
    Added,
    /// The game was already on the list, nothing changed.
    AlreadyPresent,
}

/// Outcome of a move request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveOutcome {
    /// The item swapped places with its neighbour.
    Moved,
    /// The item was already at the edge of the list, nothing was written.
    AtEdge,
}

/// A wish-list together with its item count, for listing views.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WishlistSummary {
    pub id: String,
    pub name: String,
    pub item_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An item joined with its promoted game record, for detail views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WishlistEntry {
    /// Item id, used for remove and move requests.
    pub id: String,
    pub game: Game,
    pub order: i64,
    pub added_on: DateTime<Utc>,
}

/// A wish-list with its full, ordered contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WishlistDetail {
    pub wishlist: Wishlist,
    pub items: Vec<WishlistEntry>,
}

/// Per-owner usage statistics for the profile view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileStats {
    pub owner: String,
    pub wishlist_count: u64,
    /// Distinct games across all of the owner's wish-lists.
    pub distinct_game_count: u64,
    /// Creation time of the owner's earliest wish-list, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_since: Option<DateTime<Utc>>,
    /// Whole days since `member_since`, 0 when the owner has no wish-lists.
    pub days_active: i64,
    /// Most recently updated wish-lists, newest first.
    pub recent_wishlists: Vec<WishlistSummary>,
}

/// Site-wide wish-list statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteStats {
    pub total_wishlists: u64,
    /// Wish-lists created since UTC midnight.
    pub created_today: u64,
    pub created_last_7_days: u64,
    pub created_last_30_days: u64,
    pub owners_with_wishlists: u64,
    /// Total wish-lists divided by owners with at least one, 0 when empty.
    pub avg_wishlists_per_owner: f64,
    /// Most-wishlisted games, highest count first.
    pub top_games: Vec<TopGame>,
}

/// A most-wishlisted game and how many lists carry it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopGame {
    pub game_id: i64,
    pub title: String,
    pub count: u64,
}

/// Errors returned by wish-list operations.
///
/// `NotFound` and `ItemNotFound` deliberately cover both "does not exist"
/// and "owned by someone else", so responses never reveal whether another
/// user's record exists.
#[derive(Debug, Error)]
pub enum WishlistError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("That wishlist could not be found or you do not have permission to view it.")]
    NotFound,

    #[error("That game could not be found or you do not have permission to remove it.")]
    ItemNotFound,

    #[error("You already have a wishlist named \"{0}\".")]
    NameTaken(String),

    #[error("Could not fetch game details from the catalog provider: {0}")]
    Promotion(String),
}
