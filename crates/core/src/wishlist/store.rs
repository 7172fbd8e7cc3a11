use chrono::{DateTime, Utc};

use super::{Wishlist, WishlistError, WishlistItem, WishlistSummary};

/// Storage backend for wish-lists and their items.
///
/// The store is deliberately unaware of ownership rules: it persists and
/// queries rows, while [`super::WishlistManager`] decides who may touch
/// them. The one constraint the store itself enforces is name uniqueness
/// per owner, surfaced as [`WishlistError::NameTaken`] on insert rather
/// than pre-checked.
pub trait WishlistStore: Send + Sync {
    /// Create a wish-list. Fails with `NameTaken` if the owner already
    /// has one with the same name.
    fn create(&self, owner: &str, name: &str) -> Result<Wishlist, WishlistError>;

    /// A wish-list by id, regardless of owner.
    fn get(&self, id: &str) -> Result<Option<Wishlist>, WishlistError>;

    /// Delete a wish-list and, via cascade, all of its items.
    fn delete(&self, id: &str) -> Result<(), WishlistError>;

    /// Bump a wish-list's `updated_at` to now.
    fn touch(&self, id: &str) -> Result<(), WishlistError>;

    /// All wish-lists of one owner with item counts, most recently
    /// updated first.
    fn list_for_owner(&self, owner: &str) -> Result<Vec<WishlistSummary>, WishlistError>;

    /// Items of a wish-list ordered by `(order, added_on)`.
    fn items(&self, wishlist_id: &str) -> Result<Vec<WishlistItem>, WishlistError>;

    /// An item by id, regardless of which list it belongs to.
    fn get_item(&self, item_id: &str) -> Result<Option<WishlistItem>, WishlistError>;

    /// Append an item with the given position.
    fn insert_item(
        &self,
        wishlist_id: &str,
        game_id: i64,
        order: i64,
    ) -> Result<WishlistItem, WishlistError>;

    fn delete_item(&self, item_id: &str) -> Result<(), WishlistError>;

    /// Rewrite a single item's position.
    fn update_item_order(&self, item_id: &str, order: i64) -> Result<(), WishlistError>;

    /// Whether the wish-list already carries this game.
    fn contains_game(&self, wishlist_id: &str, game_id: i64) -> Result<bool, WishlistError>;

    fn item_count(&self, wishlist_id: &str) -> Result<i64, WishlistError>;

    // Aggregate queries for the stats views.

    fn count_all(&self) -> Result<u64, WishlistError>;

    fn count_created_since(&self, since: DateTime<Utc>) -> Result<u64, WishlistError>;

    fn distinct_owner_count(&self) -> Result<u64, WishlistError>;

    /// Game ids with how many wish-lists carry them, highest count first.
    fn top_games(&self, limit: u32) -> Result<Vec<(i64, u64)>, WishlistError>;

    fn count_for_owner(&self, owner: &str) -> Result<u64, WishlistError>;

    /// Distinct games across all of one owner's wish-lists.
    fn distinct_game_count_for_owner(&self, owner: &str) -> Result<u64, WishlistError>;

    /// Creation time of the owner's earliest wish-list.
    fn earliest_created_for_owner(
        &self,
        owner: &str,
    ) -> Result<Option<DateTime<Utc>>, WishlistError>;
}
