//! Wish-list operations and ownership enforcement.

use std::sync::Arc;

use chrono::{NaiveTime, Utc};

use crate::browse::DetailFetcher;
use crate::catalog::{CatalogError, GameStore};
use crate::metrics;

use super::{
    AddOutcome, MoveDirection, MoveOutcome, ProfileStats, SiteStats, TopGame, Wishlist,
    WishlistDetail, WishlistEntry, WishlistError, WishlistStore,
};

/// Wish-lists shown on the profile view.
const RECENT_WISHLISTS: usize = 5;
/// Games shown in the site-wide stats.
const TOP_GAMES: u32 = 5;

/// Coordinates wish-list operations over the store, the local catalog
/// and the external provider.
///
/// Every operation that names a wish-list goes through one ownership
/// guard: a list that does not exist and a list owned by someone else
/// are indistinguishable to the caller. Adding a game promotes it into
/// the local catalog first, so wish-list items only ever reference
/// locally persisted games.
pub struct WishlistManager {
    store: Arc<dyn WishlistStore>,
    catalog: Arc<dyn GameStore>,
    fetcher: Arc<DetailFetcher>,
}

impl WishlistManager {
    pub fn new(
        store: Arc<dyn WishlistStore>,
        catalog: Arc<dyn GameStore>,
        fetcher: Arc<DetailFetcher>,
    ) -> Self {
        Self {
            store,
            catalog,
            fetcher,
        }
    }

    /// The single ownership gate. Missing and foreign wish-lists fail
    /// identically so existence never leaks across owners.
    fn authorize(&self, owner: &str, wishlist_id: &str) -> Result<Wishlist, WishlistError> {
        match self.store.get(wishlist_id)? {
            Some(list) if list.owner == owner => Ok(list),
            _ => Err(WishlistError::NotFound),
        }
    }

    pub fn create(&self, owner: &str, name: &str) -> Result<Wishlist, WishlistError> {
        let list = self.store.create(owner, name)?;
        tracing::info!(wishlist_id = %list.id, owner, name, "created wishlist");
        Ok(list)
    }

    /// All wish-lists of one owner, most recently updated first.
    pub fn lists(&self, owner: &str) -> Result<Vec<super::WishlistSummary>, WishlistError> {
        self.store.list_for_owner(owner)
    }

    /// A wish-list with its ordered items, each joined to its promoted
    /// game record.
    pub fn detail(&self, owner: &str, wishlist_id: &str) -> Result<WishlistDetail, WishlistError> {
        let wishlist = self.authorize(owner, wishlist_id)?;

        let mut entries = Vec::new();
        for item in self.store.items(&wishlist.id)? {
            match self.catalog.get(item.game_id) {
                Ok(game) => entries.push(WishlistEntry {
                    id: item.id,
                    game,
                    order: item.order,
                    added_on: item.added_on,
                }),
                Err(CatalogError::NotFound(_)) => {
                    tracing::warn!(
                        wishlist_id = %wishlist.id,
                        game_id = item.game_id,
                        "wishlist item references a game missing from the catalog"
                    );
                }
                Err(e) => return Err(WishlistError::Database(e.to_string())),
            }
        }

        Ok(WishlistDetail {
            wishlist,
            items: entries,
        })
    }

    pub fn delete(&self, owner: &str, wishlist_id: &str) -> Result<(), WishlistError> {
        let list = self.authorize(owner, wishlist_id)?;
        self.store.delete(&list.id)?;
        tracing::info!(wishlist_id = %list.id, owner, "deleted wishlist");
        Ok(())
    }

    /// Add a game to a wish-list, promoting it into the local catalog
    /// first when it is not there yet. The new item lands at the end of
    /// the list.
    pub async fn add_item(
        &self,
        owner: &str,
        wishlist_id: &str,
        game_id: i64,
    ) -> Result<AddOutcome, WishlistError> {
        let list = self.authorize(owner, wishlist_id)?;

        if self.store.contains_game(&list.id, game_id)? {
            return Ok(AddOutcome::AlreadyPresent);
        }

        self.ensure_promoted(owner, game_id).await?;

        let order = self.store.item_count(&list.id)?;
        self.store.insert_item(&list.id, game_id, order)?;
        self.store.touch(&list.id)?;

        Ok(AddOutcome::Added)
    }

    /// Promote `game_id` into the local catalog if it is not there yet.
    /// A failed or empty detail fetch aborts without writing anything.
    async fn ensure_promoted(&self, owner: &str, game_id: i64) -> Result<(), WishlistError> {
        let exists = self
            .catalog
            .exists(game_id)
            .map_err(|e| WishlistError::Database(e.to_string()))?;
        if exists {
            return Ok(());
        }

        let detail = self
            .fetcher
            .fetch_one(game_id)
            .await
            .map_err(|e| WishlistError::Promotion(e.to_string()))?
            .ok_or_else(|| WishlistError::Promotion(format!("provider has no app {}", game_id)))?;

        self.catalog
            .promote(&detail, owner)
            .map_err(|e| WishlistError::Database(e.to_string()))?;

        metrics::GAMES_PROMOTED.inc();
        tracing::info!(game_id, owner, "promoted game into local catalog");
        Ok(())
    }

    pub fn remove_item(
        &self,
        owner: &str,
        wishlist_id: &str,
        item_id: &str,
    ) -> Result<(), WishlistError> {
        let list = self.authorize(owner, wishlist_id)?;

        let item = self
            .store
            .get_item(item_id)?
            .filter(|item| item.wishlist_id == list.id)
            .ok_or(WishlistError::ItemNotFound)?;

        self.store.delete_item(&item.id)?;
        self.store.touch(&list.id)?;
        Ok(())
    }

    /// Move an item one step up or down its list.
    ///
    /// A successful move renumbers every item of the list densely from
    /// zero. A move at the edge writes nothing at all.
    pub fn move_item(
        &self,
        owner: &str,
        wishlist_id: &str,
        item_id: &str,
        direction: MoveDirection,
    ) -> Result<MoveOutcome, WishlistError> {
        let list = self.authorize(owner, wishlist_id)?;

        let mut items = self.store.items(&list.id)?;
        let position = items
            .iter()
            .position(|item| item.id == item_id)
            .ok_or(WishlistError::ItemNotFound)?;

        let target = match direction {
            MoveDirection::Up if position > 0 => position - 1,
            MoveDirection::Down if position + 1 < items.len() => position + 1,
            _ => return Ok(MoveOutcome::AtEdge),
        };

        items.swap(position, target);
        for (index, item) in items.iter().enumerate() {
            self.store.update_item_order(&item.id, index as i64)?;
        }
        self.store.touch(&list.id)?;

        Ok(MoveOutcome::Moved)
    }

    /// Usage statistics for one owner.
    pub fn profile(&self, owner: &str) -> Result<ProfileStats, WishlistError> {
        let wishlist_count = self.store.count_for_owner(owner)?;
        let distinct_game_count = self.store.distinct_game_count_for_owner(owner)?;
        let member_since = self.store.earliest_created_for_owner(owner)?;
        let days_active = member_since
            .map(|since| (Utc::now() - since).num_days())
            .unwrap_or(0);

        let mut recent_wishlists = self.store.list_for_owner(owner)?;
        recent_wishlists.truncate(RECENT_WISHLISTS);

        Ok(ProfileStats {
            owner: owner.to_string(),
            wishlist_count,
            distinct_game_count,
            member_since,
            days_active,
            recent_wishlists,
        })
    }

    /// Site-wide wish-list statistics.
    pub fn site_stats(&self) -> Result<SiteStats, WishlistError> {
        let now = Utc::now();
        let midnight = now.date_naive().and_time(NaiveTime::MIN).and_utc();

        let total_wishlists = self.store.count_all()?;
        let created_today = self.store.count_created_since(midnight)?;
        let created_last_7_days = self
            .store
            .count_created_since(now - chrono::Duration::days(7))?;
        let created_last_30_days = self
            .store
            .count_created_since(now - chrono::Duration::days(30))?;
        let owners_with_wishlists = self.store.distinct_owner_count()?;
        let avg_wishlists_per_owner = if owners_with_wishlists == 0 {
            0.0
        } else {
            total_wishlists as f64 / owners_with_wishlists as f64
        };

        let mut top_games = Vec::new();
        for (game_id, count) in self.store.top_games(TOP_GAMES)? {
            match self.catalog.get(game_id) {
                Ok(game) => top_games.push(TopGame {
                    game_id,
                    title: game.title,
                    count,
                }),
                Err(CatalogError::NotFound(_)) => {
                    tracing::warn!(game_id, "wishlisted game missing from the catalog");
                }
                Err(e) => return Err(WishlistError::Database(e.to_string())),
            }
        }

        Ok(SiteStats {
            total_wishlists,
            created_today,
            created_last_7_days,
            created_last_30_days,
            owners_with_wishlists,
            avg_wishlists_per_owner,
            top_games,
        })
    }
}
