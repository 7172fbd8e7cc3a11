//! Game browsing API handlers.
//!
//! The listing and suggestion endpoints merge the local catalog with the
//! external provider; provider trouble degrades those responses instead
//! of failing them. The single-game endpoint is the only browse surface
//! that reports provider failures to the caller.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use wishdeck_core::{
    AppDetail, BrowsePage, BrowseQuery, CatalogError, FilterOptions, Game, GameCard, Genre,
    PlatformFlags, Suggestion,
};

use crate::state::AppState;

/// Message shown when the provider cannot supply a game detail.
const DETAIL_UNAVAILABLE: &str = "Could not fetch game info from Steam.";

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for the game listing
#[derive(Debug, Deserialize)]
pub struct ListGamesParams {
    /// Case-insensitive title substring
    pub search: Option<String>,
    /// Comma-separated genre ids, all required
    pub genres: Option<String>,
    /// Comma-separated tag ids, all required
    pub tags: Option<String>,
    /// Platform token ("windows", "mac", "linux")
    pub platform: Option<String>,
    /// 1-based page number
    pub page: Option<i64>,
}

/// Query parameters for the suggestion lookup
#[derive(Debug, Deserialize)]
pub struct SuggestParams {
    pub q: Option<String>,
}

/// Full game detail, from either the local catalog or the live provider
#[derive(Debug, Serialize)]
pub struct GameDetailResponse {
    pub id: i64,
    pub title: String,
    pub image: String,
    pub short_description: String,
    pub long_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<NaiveDate>,
    pub developer: String,
    pub age_rating: String,
    pub platforms: PlatformFlags,
    pub genres: Vec<String>,
    pub tags: Vec<String>,
    /// Whether this record came from the local catalog
    pub local: bool,
}

impl From<Game> for GameDetailResponse {
    fn from(game: Game) -> Self {
        Self {
            id: game.id,
            title: game.title,
            image: game.image,
            short_description: game.short_description,
            long_description: game.long_description,
            release_date: game.release_date,
            developer: game.developer,
            age_rating: game.age_rating,
            platforms: PlatformFlags::from_descriptor(&game.platforms),
            genres: game.genres.into_iter().map(|g| g.name).collect(),
            tags: game.tags.into_iter().map(|t| t.name).collect(),
            local: true,
        }
    }
}

impl From<AppDetail> for GameDetailResponse {
    fn from(detail: AppDetail) -> Self {
        Self {
            id: detail.id,
            title: detail.name.clone(),
            image: detail.header_image.clone(),
            short_description: detail.short_description.clone(),
            long_description: detail.long_description.clone(),
            release_date: detail.release_date,
            developer: detail.developer(),
            age_rating: detail.age_rating,
            platforms: detail.platforms,
            genres: detail.genres.into_iter().map(|g| g.name).collect(),
            tags: detail.tags.into_iter().map(|t| t.name).collect(),
            local: false,
        }
    }
}

/// Response for the genre drill-down
#[derive(Debug, Serialize)]
pub struct GenreGamesResponse {
    pub genre: Genre,
    pub games: Vec<GameCard>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct GamesErrorResponse {
    pub error: String,
}

/// Parse a comma-separated id list, skipping malformed entries.
fn parse_id_list(raw: Option<&str>) -> Vec<i64> {
    raw.map(|s| {
        s.split(',')
            .filter_map(|part| part.trim().parse().ok())
            .collect()
    })
    .unwrap_or_default()
}

// ============================================================================
// Handlers
// ============================================================================

/// One page of merged local/external games
pub async fn list_games(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListGamesParams>,
) -> Result<Json<BrowsePage>, impl IntoResponse> {
    let query = BrowseQuery {
        search: params.search,
        genre_ids: parse_id_list(params.genres.as_deref()),
        tag_ids: parse_id_list(params.tags.as_deref()),
        platform: params.platform,
        page: params.page.unwrap_or(1),
    };

    match state.browse().page(&query).await {
        Ok(page) => Ok(Json(page)),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(GamesErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}

/// Name suggestions for the search box; always succeeds
pub async fn suggest(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SuggestParams>,
) -> Json<Vec<Suggestion>> {
    let q = params.q.unwrap_or_default();
    Json(state.browse().suggest(&q).await)
}

/// One game: the promoted local record when present, otherwise a live
/// provider lookup
pub async fn get_game(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<GameDetailResponse>, impl IntoResponse> {
    match state.catalog().get(id) {
        Ok(game) => return Ok(Json(GameDetailResponse::from(game))),
        Err(CatalogError::NotFound(_)) => {}
        Err(e) => {
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(GamesErrorResponse {
                    error: e.to_string(),
                }),
            ));
        }
    }

    match state.browse().game_detail(id).await {
        Ok(Some(detail)) => Ok(Json(GameDetailResponse::from(detail))),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(GamesErrorResponse {
                error: DETAIL_UNAVAILABLE.to_string(),
            }),
        )),
        Err(e) => {
            tracing::warn!(game_id = id, error = %e, "live game detail fetch failed");
            Err((
                StatusCode::BAD_GATEWAY,
                Json(GamesErrorResponse {
                    error: DETAIL_UNAVAILABLE.to_string(),
                }),
            ))
        }
    }
}

/// Genre and tag dropdown options
pub async fn filter_options(
    State(state): State<Arc<AppState>>,
) -> Result<Json<FilterOptions>, impl IntoResponse> {
    match state.browse().filter_options().await {
        Ok(options) => Ok(Json(options)),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(GamesErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}

/// All locally promoted games carrying one genre
pub async fn genre_games(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<GenreGamesResponse>, impl IntoResponse> {
    let genre = match state.catalog().genre(id) {
        Ok(genre) => genre,
        Err(CatalogError::NotFound(_)) => {
            return Err((
                StatusCode::NOT_FOUND,
                Json(GamesErrorResponse {
                    error: format!("Genre not found: {}", id),
                }),
            ));
        }
        Err(e) => {
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(GamesErrorResponse {
                    error: e.to_string(),
                }),
            ));
        }
    };

    match state.catalog().games_with_genre(id) {
        Ok(games) => Ok(Json(GenreGamesResponse {
            genre,
            games: games.iter().map(GameCard::from_game).collect(),
        })),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(GamesErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}
