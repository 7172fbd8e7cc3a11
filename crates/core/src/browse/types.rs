use serde::{Deserialize, Serialize};

use crate::catalog::Game;
use crate::provider::{AppDetail, PlatformFlags};

/// Query parameters for a merged listing request.
#[derive(Debug, Clone, Default)]
pub struct BrowseQuery {
    /// Case-insensitive title substring.
    pub search: Option<String>,
    /// Genre ids a game must carry all of.
    pub genre_ids: Vec<i64>,
    /// Tag ids a game must carry all of.
    pub tag_ids: Vec<i64>,
    /// Platform word ("windows", "mac", "linux").
    pub platform: Option<String>,
    /// 1-based page number; values below 1 are clamped to 1.
    pub page: i64,
}

impl BrowseQuery {
    /// Whether any filter beyond pagination is active.
    pub fn is_filtered(&self) -> bool {
        self.search.is_some()
            || !self.genre_ids.is_empty()
            || !self.tag_ids.is_empty()
            || self.platform.is_some()
    }
}

/// One listing entry, normalized across local and external sources.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameCard {
    pub id: i64,
    pub title: String,
    pub image: String,
    pub short_description: String,
    pub developer: String,
    /// Availability triple; for local records it is derived by
    /// substring-testing the stored descriptor.
    pub platforms: PlatformFlags,
    pub genres: Vec<String>,
    pub tags: Vec<String>,
    /// True when the record came from the local catalog.
    pub local: bool,
}

impl GameCard {
    pub fn from_game(game: &Game) -> Self {
        Self {
            id: game.id,
            title: game.title.clone(),
            image: game.image.clone(),
            short_description: game.short_description.clone(),
            developer: game.developer.clone(),
            platforms: PlatformFlags::from_descriptor(&game.platforms),
            genres: game.genres.iter().map(|g| g.name.clone()).collect(),
            tags: game.tags.iter().map(|t| t.name.clone()).collect(),
            local: true,
        }
    }

    pub fn from_detail(detail: &AppDetail) -> Self {
        Self {
            id: detail.id,
            title: detail.name.clone(),
            image: detail.header_image.clone(),
            short_description: detail.short_description.clone(),
            developer: detail.developer(),
            platforms: detail.platforms,
            genres: detail.genres.iter().map(|g| g.name.clone()).collect(),
            tags: detail.tags.iter().map(|t| t.name.clone()).collect(),
            local: false,
        }
    }
}

/// One page of merged listing results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowsePage {
    /// Local matches first, then externally sourced cards.
    pub games: Vec<GameCard>,
    pub page: u64,
    pub page_size: usize,
    /// `db_count` plus the capped external candidate pool. An upper
    /// bound: external candidates are detail-filtered lazily, so the
    /// tail pages can hold fewer matches than this suggests.
    pub estimated_total: u64,
    pub has_more: bool,
    /// Advisory set when the provider was unreachable; the listing
    /// itself still succeeds with local-only results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

/// One suggestion lookup result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Suggestion {
    pub id: i64,
    pub name: String,
}
