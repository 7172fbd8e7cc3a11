//! SQLite-backed wish-list store implementation.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::{Wishlist, WishlistError, WishlistItem, WishlistStore, WishlistSummary};

/// SQLite-backed wish-list store.
pub struct SqliteWishlistStore {
    conn: Mutex<Connection>,
}

impl SqliteWishlistStore {
    /// Create a new SQLite wish-list store, creating the database file and
    /// tables if needed.
    pub fn new(path: &Path) -> Result<Self, WishlistError> {
        let conn = Connection::open(path).map_err(|e| WishlistError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite wish-list store (useful for testing).
    pub fn in_memory() -> Result<Self, WishlistError> {
        let conn =
            Connection::open_in_memory().map_err(|e| WishlistError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), WishlistError> {
        // foreign_keys is off by default in SQLite; the item cascade on
        // wish-list deletion depends on it.
        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS wishlists (
                id TEXT PRIMARY KEY,
                owner TEXT NOT NULL,
                name TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE(owner, name)
            );

            CREATE INDEX IF NOT EXISTS idx_wishlists_owner ON wishlists(owner);
            CREATE INDEX IF NOT EXISTS idx_wishlists_updated_at ON wishlists(updated_at);

            CREATE TABLE IF NOT EXISTS wishlist_items (
                id TEXT PRIMARY KEY,
                wishlist_id TEXT NOT NULL REFERENCES wishlists(id) ON DELETE CASCADE,
                game_id INTEGER NOT NULL,
                sort_order INTEGER NOT NULL DEFAULT 0,
                added_on TEXT NOT NULL,
                UNIQUE(wishlist_id, game_id)
            );

            CREATE INDEX IF NOT EXISTS idx_wishlist_items_list ON wishlist_items(wishlist_id);
            CREATE INDEX IF NOT EXISTS idx_wishlist_items_game ON wishlist_items(game_id);
            "#,
        )
        .map_err(|e| WishlistError::Database(e.to_string()))?;

        Ok(())
    }

    fn row_to_wishlist(row: &rusqlite::Row) -> rusqlite::Result<Wishlist> {
        Ok(Wishlist {
            id: row.get(0)?,
            owner: row.get(1)?,
            name: row.get(2)?,
            created_at: parse_timestamp(&row.get::<_, String>(3)?),
            updated_at: parse_timestamp(&row.get::<_, String>(4)?),
        })
    }

    fn row_to_item(row: &rusqlite::Row) -> rusqlite::Result<WishlistItem> {
        Ok(WishlistItem {
            id: row.get(0)?,
            wishlist_id: row.get(1)?,
            game_id: row.get(2)?,
            order: row.get(3)?,
            added_on: parse_timestamp(&row.get::<_, String>(4)?),
        })
    }

    fn row_to_summary(row: &rusqlite::Row) -> rusqlite::Result<WishlistSummary> {
        let item_count: i64 = row.get(2)?;
        Ok(WishlistSummary {
            id: row.get(0)?,
            name: row.get(1)?,
            item_count: item_count.max(0) as u64,
            created_at: parse_timestamp(&row.get::<_, String>(3)?),
            updated_at: parse_timestamp(&row.get::<_, String>(4)?),
        })
    }
}

/// Parse a stored RFC 3339 timestamp, falling back to now on corrupt data.
fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

impl WishlistStore for SqliteWishlistStore {
    fn create(&self, owner: &str, name: &str) -> Result<Wishlist, WishlistError> {
        let conn = self.conn.lock().unwrap();

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();

        let result = conn.execute(
            "INSERT INTO wishlists (id, owner, name, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
            params![id, owner, name, now.to_rfc3339(), now.to_rfc3339()],
        );

        match result {
            Ok(_) => Ok(Wishlist {
                id,
                owner: owner.to_string(),
                name: name.to_string(),
                created_at: now,
                updated_at: now,
            }),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(WishlistError::NameTaken(name.to_string()))
            }
            Err(e) => Err(WishlistError::Database(e.to_string())),
        }
    }

    fn get(&self, id: &str) -> Result<Option<Wishlist>, WishlistError> {
        let conn = self.conn.lock().unwrap();

        let result = conn.query_row(
            "SELECT id, owner, name, created_at, updated_at FROM wishlists WHERE id = ?",
            params![id],
            Self::row_to_wishlist,
        );

        match result {
            Ok(wishlist) => Ok(Some(wishlist)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(WishlistError::Database(e.to_string())),
        }
    }

    fn delete(&self, id: &str) -> Result<(), WishlistError> {
        let conn = self.conn.lock().unwrap();

        conn.execute("DELETE FROM wishlists WHERE id = ?", params![id])
            .map_err(|e| WishlistError::Database(e.to_string()))?;

        Ok(())
    }

    fn touch(&self, id: &str) -> Result<(), WishlistError> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "UPDATE wishlists SET updated_at = ? WHERE id = ?",
            params![Utc::now().to_rfc3339(), id],
        )
        .map_err(|e| WishlistError::Database(e.to_string()))?;

        Ok(())
    }

    fn list_for_owner(&self, owner: &str) -> Result<Vec<WishlistSummary>, WishlistError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare(
                "SELECT w.id, w.name, COUNT(i.id), w.created_at, w.updated_at
                 FROM wishlists w
                 LEFT JOIN wishlist_items i ON i.wishlist_id = w.id
                 WHERE w.owner = ?
                 GROUP BY w.id
                 ORDER BY w.updated_at DESC",
            )
            .map_err(|e| WishlistError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![owner], Self::row_to_summary)
            .map_err(|e| WishlistError::Database(e.to_string()))?;

        let mut summaries = Vec::new();
        for row_result in rows {
            summaries.push(row_result.map_err(|e| WishlistError::Database(e.to_string()))?);
        }

        Ok(summaries)
    }

    fn items(&self, wishlist_id: &str) -> Result<Vec<WishlistItem>, WishlistError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare(
                "SELECT id, wishlist_id, game_id, sort_order, added_on
                 FROM wishlist_items
                 WHERE wishlist_id = ?
                 ORDER BY sort_order, added_on",
            )
            .map_err(|e| WishlistError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![wishlist_id], Self::row_to_item)
            .map_err(|e| WishlistError::Database(e.to_string()))?;

        let mut items = Vec::new();
        for row_result in rows {
            items.push(row_result.map_err(|e| WishlistError::Database(e.to_string()))?);
        }

        Ok(items)
    }

    fn get_item(&self, item_id: &str) -> Result<Option<WishlistItem>, WishlistError> {
        let conn = self.conn.lock().unwrap();

        let result = conn.query_row(
            "SELECT id, wishlist_id, game_id, sort_order, added_on FROM wishlist_items WHERE id = ?",
            params![item_id],
            Self::row_to_item,
        );

        match result {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(WishlistError::Database(e.to_string())),
        }
    }

    fn insert_item(
        &self,
        wishlist_id: &str,
        game_id: i64,
        order: i64,
    ) -> Result<WishlistItem, WishlistError> {
        let conn = self.conn.lock().unwrap();

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO wishlist_items (id, wishlist_id, game_id, sort_order, added_on) VALUES (?, ?, ?, ?, ?)",
            params![id, wishlist_id, game_id, order, now.to_rfc3339()],
        )
        .map_err(|e| WishlistError::Database(e.to_string()))?;

        Ok(WishlistItem {
            id,
            wishlist_id: wishlist_id.to_string(),
            game_id,
            order,
            added_on: now,
        })
    }

    fn delete_item(&self, item_id: &str) -> Result<(), WishlistError> {
        let conn = self.conn.lock().unwrap();

        conn.execute("DELETE FROM wishlist_items WHERE id = ?", params![item_id])
            .map_err(|e| WishlistError::Database(e.to_string()))?;

        Ok(())
    }

    fn update_item_order(&self, item_id: &str, order: i64) -> Result<(), WishlistError> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "UPDATE wishlist_items SET sort_order = ? WHERE id = ?",
            params![order, item_id],
        )
        .map_err(|e| WishlistError::Database(e.to_string()))?;

        Ok(())
    }

    fn contains_game(&self, wishlist_id: &str, game_id: i64) -> Result<bool, WishlistError> {
        let conn = self.conn.lock().unwrap();

        let found = conn
            .query_row(
                "SELECT 1 FROM wishlist_items WHERE wishlist_id = ? AND game_id = ?",
                params![wishlist_id, game_id],
                |_| Ok(()),
            )
            .optional()
            .map_err(|e| WishlistError::Database(e.to_string()))?;

        Ok(found.is_some())
    }

    fn item_count(&self, wishlist_id: &str) -> Result<i64, WishlistError> {
        let conn = self.conn.lock().unwrap();

        conn.query_row(
            "SELECT COUNT(*) FROM wishlist_items WHERE wishlist_id = ?",
            params![wishlist_id],
            |row| row.get(0),
        )
        .map_err(|e| WishlistError::Database(e.to_string()))
    }

    fn count_all(&self) -> Result<u64, WishlistError> {
        let conn = self.conn.lock().unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM wishlists", [], |row| row.get(0))
            .map_err(|e| WishlistError::Database(e.to_string()))?;

        Ok(count.max(0) as u64)
    }

    fn count_created_since(&self, since: DateTime<Utc>) -> Result<u64, WishlistError> {
        let conn = self.conn.lock().unwrap();

        // RFC 3339 strings with a fixed +00:00 offset compare
        // chronologically as text.
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM wishlists WHERE created_at >= ?",
                params![since.to_rfc3339()],
                |row| row.get(0),
            )
            .map_err(|e| WishlistError::Database(e.to_string()))?;

        Ok(count.max(0) as u64)
    }

    fn distinct_owner_count(&self) -> Result<u64, WishlistError> {
        let conn = self.conn.lock().unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(DISTINCT owner) FROM wishlists", [], |row| {
                row.get(0)
            })
            .map_err(|e| WishlistError::Database(e.to_string()))?;

        Ok(count.max(0) as u64)
    }

    fn top_games(&self, limit: u32) -> Result<Vec<(i64, u64)>, WishlistError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare(
                "SELECT game_id, COUNT(*) AS cnt
                 FROM wishlist_items
                 GROUP BY game_id
                 ORDER BY cnt DESC, game_id ASC
                 LIMIT ?",
            )
            .map_err(|e| WishlistError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![limit], |row| {
                let game_id: i64 = row.get(0)?;
                let count: i64 = row.get(1)?;
                Ok((game_id, count.max(0) as u64))
            })
            .map_err(|e| WishlistError::Database(e.to_string()))?;

        let mut games = Vec::new();
        for row_result in rows {
            games.push(row_result.map_err(|e| WishlistError::Database(e.to_string()))?);
        }

        Ok(games)
    }

    fn count_for_owner(&self, owner: &str) -> Result<u64, WishlistError> {
        let conn = self.conn.lock().unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM wishlists WHERE owner = ?",
                params![owner],
                |row| row.get(0),
            )
            .map_err(|e| WishlistError::Database(e.to_string()))?;

        Ok(count.max(0) as u64)
    }

    fn distinct_game_count_for_owner(&self, owner: &str) -> Result<u64, WishlistError> {
        let conn = self.conn.lock().unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(DISTINCT i.game_id)
                 FROM wishlist_items i
                 JOIN wishlists w ON w.id = i.wishlist_id
                 WHERE w.owner = ?",
                params![owner],
                |row| row.get(0),
            )
            .map_err(|e| WishlistError::Database(e.to_string()))?;

        Ok(count.max(0) as u64)
    }

    fn earliest_created_for_owner(
        &self,
        owner: &str,
    ) -> Result<Option<DateTime<Utc>>, WishlistError> {
        let conn = self.conn.lock().unwrap();

        let earliest: Option<String> = conn
            .query_row(
                "SELECT MIN(created_at) FROM wishlists WHERE owner = ?",
                params![owner],
                |row| row.get(0),
            )
            .map_err(|e| WishlistError::Database(e.to_string()))?;

        Ok(earliest.as_deref().map(parse_timestamp))
    }
}
