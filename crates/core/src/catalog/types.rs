//! Types for the local game catalog.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A game promoted into the local catalog.
///
/// Rows are written once at promotion time and never refreshed from the
/// provider afterwards; the id is the provider's own identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    /// Provider-assigned id (primary key).
    pub id: i64,
    /// Display title.
    pub title: String,
    /// Header image URL.
    pub image: String,
    /// One-line description.
    pub short_description: String,
    /// Full description (may contain provider markup).
    pub long_description: String,
    /// Release date, when the provider's date string parsed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<NaiveDate>,
    /// Developer names, comma-joined.
    pub developer: String,
    /// Age rating as reported by the provider.
    pub age_rating: String,
    /// Free-text platform token list (e.g. "windows mac linux").
    pub platforms: String,
    /// Id of the user who promoted the game.
    pub submitted_by: String,
    /// Genres linked at promotion time.
    pub genres: Vec<Genre>,
    /// Tags linked at promotion time.
    pub tags: Vec<Tag>,
}

/// A genre attached to promoted games.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

/// A tag (provider "category") attached to promoted games.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

/// Filter predicates for querying promoted games.
///
/// All predicates combine with AND; the genre and tag lists each require
/// every listed id to be present on a matching game.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameFilter {
    /// Case-insensitive title-contains match.
    pub search: Option<String>,
    /// Required genre ids.
    pub genre_ids: Vec<i64>,
    /// Required tag ids.
    pub tag_ids: Vec<i64>,
    /// Substring match against the platform descriptor.
    pub platform: Option<String>,
}

/// Genre and tag option lists for filter dropdowns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterOptions {
    pub genres: Vec<Genre>,
    pub tags: Vec<Tag>,
}

/// Errors for catalog store operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),
}
