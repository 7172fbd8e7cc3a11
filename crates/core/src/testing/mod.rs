//! Testing utilities and mock implementations for E2E tests.
//!
//! This module provides a mock catalog provider and fixture builders,
//! allowing comprehensive E2E testing without real infrastructure.
//!
//! # Example
//!
//! ```rust,ignore
//! use wishdeck_core::testing::{fixtures, MockProvider};
//!
//! let provider = MockProvider::new();
//!
//! // Configure mock responses
//! provider.add_game(fixtures::app_detail(570, "Dota 2")).await;
//! provider.set_fail_app_list(true).await;
//!
//! // Use in AppState...
//! ```

mod mock_provider;

pub use mock_provider::{MockProvider, RecordedProviderCall};

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::NaiveDate;

    use crate::provider::{AppDetail, AppEntry, LabelEntry, PlatformFlags};

    /// Create a catalog list entry.
    pub fn app_entry(id: i64, name: &str) -> AppEntry {
        AppEntry {
            id,
            name: name.to_string(),
        }
    }

    /// Create a genre or tag label.
    pub fn label(id: i64, name: &str) -> LabelEntry {
        LabelEntry {
            id,
            name: name.to_string(),
        }
    }

    /// Create an app detail record with reasonable defaults: a released
    /// Windows game with one genre and one tag. Override fields with
    /// struct update syntax where a test needs something else.
    pub fn app_detail(id: i64, name: &str) -> AppDetail {
        AppDetail {
            id,
            name: name.to_string(),
            kind: "game".to_string(),
            short_description: format!("{} is a video game.", name),
            long_description: format!("{} is a video game. It is fun.", name),
            header_image: format!("https://cdn.example.com/apps/{}/header.jpg", id),
            developers: vec!["Mock Studios".to_string()],
            publishers: vec!["Mock Publishing".to_string()],
            age_rating: "0".to_string(),
            platforms: PlatformFlags {
                windows: true,
                mac: false,
                linux: false,
            },
            genres: vec![label(1, "Action")],
            tags: vec![label(31, "Singleplayer")],
            release_date: NaiveDate::from_ymd_opt(2020, 3, 15),
            release_date_raw: "15 Mar, 2020".to_string(),
            coming_soon: false,
        }
    }
}
