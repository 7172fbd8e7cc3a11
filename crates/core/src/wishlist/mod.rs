//! Per-user ordered wish-lists.
//!
//! A wish-list belongs to exactly one owner and names games by local
//! catalog id. Adding a game that only exists upstream promotes it into
//! the catalog first, so items always reference persisted records. Items
//! keep a dense position order maintained by the move operation.

mod manager;
mod sqlite_store;
mod store;
mod types;

pub use manager::WishlistManager;
pub use sqlite_store::SqliteWishlistStore;
pub use store::WishlistStore;
pub use types::*;
