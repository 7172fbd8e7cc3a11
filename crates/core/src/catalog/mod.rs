//! Local catalog of promoted games.
//!
//! A game enters the catalog the first time a user wish-lists it: the
//! provider detail is fetched once, mapped, and stored together with
//! find-or-created tag and genre links. From then on the local row is
//! authoritative and is never refreshed from the provider.

mod sqlite;
mod types;

use std::collections::HashSet;

pub use sqlite::SqliteCatalog;
pub use types::*;

use crate::provider::AppDetail;

/// Store of locally promoted games and their tag/genre links.
pub trait GameStore: Send + Sync {
    /// Insert a game from provider detail, find-or-creating its tag and
    /// genre links.
    ///
    /// Idempotent: when the game is already present the stored row is
    /// returned unchanged and no links are duplicated.
    fn promote(&self, detail: &AppDetail, owner: &str) -> Result<Game, CatalogError>;

    /// Fetch a game with its tag/genre links.
    fn get(&self, id: i64) -> Result<Game, CatalogError>;

    /// Whether a game id has been promoted.
    fn exists(&self, id: i64) -> Result<bool, CatalogError>;

    /// Count games matching the filter.
    fn count(&self, filter: &GameFilter) -> Result<u64, CatalogError>;

    /// One page window of games matching the filter, ordered by title.
    fn list(&self, filter: &GameFilter, limit: u32, offset: u64)
        -> Result<Vec<Game>, CatalogError>;

    /// The ids of every promoted game.
    fn ids(&self) -> Result<HashSet<i64>, CatalogError>;

    /// Look up a genre by id.
    fn genre(&self, genre_id: i64) -> Result<Genre, CatalogError>;

    /// All games carrying the given genre, ordered by title.
    fn games_with_genre(&self, genre_id: i64) -> Result<Vec<Game>, CatalogError>;

    /// Genre and tag option lists, each ordered by name.
    fn filter_options(&self) -> Result<FilterOptions, CatalogError>;
}
