//! Merged local/external game browsing.
//!
//! The listing surface unifies two sources: the local catalog of
//! promoted games (authoritative, cheap to query) and the external
//! provider's full app list (names only; detail costs one HTTP call per
//! app). The [`BrowseEngine`] pages across both, the [`DetailFetcher`]
//! bounds and caches the per-app detail calls, and the suggestion
//! lookup ranks name matches from the cached list alone.

mod engine;
mod fetcher;
mod suggest;
mod types;

pub use engine::BrowseEngine;
pub use fetcher::DetailFetcher;
pub use types::*;
