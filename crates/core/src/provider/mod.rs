//! External catalog provider integration.
//!
//! The provider supplies two call shapes: the full id/name list of every
//! known app, and a per-app detail payload. Callers on the listing path
//! treat every failure as "no data", so errors here carry enough context
//! to log but are never fatal upstream.

mod steam;
mod types;

pub use steam::SteamProvider;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the external catalog provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// HTTP request failed (connect error, timeout, ...).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider answered with a non-success status.
    #[error("Provider returned status {status}: {message}")]
    UnexpectedStatus { status: u16, message: String },

    /// Failed to parse the response body.
    #[error("Failed to parse provider response: {0}")]
    Parse(String),
}

/// Client for the external app metadata service.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Fetch the full known catalog as (id, name) pairs.
    async fn app_list(&self) -> Result<Vec<AppEntry>, ProviderError>;

    /// Fetch detail for one app. `Ok(None)` means the provider answered
    /// but knows no such app (or flags it unsuccessful).
    async fn app_detail(&self, app_id: i64) -> Result<Option<AppDetail>, ProviderError>;
}
