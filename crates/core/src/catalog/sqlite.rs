//! SQLite-backed game catalog implementation.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, params_from_iter, Connection, OptionalExtension, ToSql};

use super::{CatalogError, FilterOptions, Game, GameFilter, GameStore, Genre, Tag};
use crate::provider::AppDetail;

/// SQLite-backed game catalog.
pub struct SqliteCatalog {
    conn: Mutex<Connection>,
}

impl SqliteCatalog {
    /// Create a new SQLite catalog, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, CatalogError> {
        let conn = Connection::open(path).map_err(|e| CatalogError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite catalog (useful for testing).
    pub fn in_memory() -> Result<Self, CatalogError> {
        let conn =
            Connection::open_in_memory().map_err(|e| CatalogError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), CatalogError> {
        conn.execute_batch(
            r#"
            -- Promoted games (id is the provider's own identifier)
            CREATE TABLE IF NOT EXISTS games (
                id INTEGER PRIMARY KEY,
                title TEXT NOT NULL,
                image TEXT NOT NULL DEFAULT '',
                short_description TEXT NOT NULL DEFAULT '',
                long_description TEXT NOT NULL DEFAULT '',
                release_date TEXT,
                developer TEXT NOT NULL DEFAULT '',
                age_rating TEXT NOT NULL DEFAULT '',
                platforms TEXT NOT NULL DEFAULT '',
                submitted_by TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_games_title ON games(title);

            CREATE TABLE IF NOT EXISTS genres (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS tags (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS game_genres (
                game_id INTEGER NOT NULL REFERENCES games(id) ON DELETE CASCADE,
                genre_id INTEGER NOT NULL REFERENCES genres(id) ON DELETE CASCADE,
                PRIMARY KEY (game_id, genre_id)
            );

            CREATE INDEX IF NOT EXISTS idx_game_genres_genre ON game_genres(genre_id);

            CREATE TABLE IF NOT EXISTS game_tags (
                game_id INTEGER NOT NULL REFERENCES games(id) ON DELETE CASCADE,
                tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
                PRIMARY KEY (game_id, tag_id)
            );

            CREATE INDEX IF NOT EXISTS idx_game_tags_tag ON game_tags(tag_id);
            "#,
        )
        .map_err(|e| CatalogError::Database(e.to_string()))?;

        Ok(())
    }

    /// Find a tag/genre row by name, creating it if missing.
    ///
    /// Names are the unique key. The provider id is kept when free; an id
    /// already taken by a different name falls back to a fresh one.
    fn find_or_create_label(
        conn: &Connection,
        table: &str,
        id: i64,
        name: &str,
    ) -> Result<i64, CatalogError> {
        let select = format!("SELECT id FROM {} WHERE name = ?", table);

        if let Some(existing) = conn
            .query_row(&select, params![name], |row| row.get::<_, i64>(0))
            .optional()
            .map_err(|e| CatalogError::Database(e.to_string()))?
        {
            return Ok(existing);
        }

        let insert = format!("INSERT OR IGNORE INTO {} (id, name) VALUES (?, ?)", table);
        conn.execute(&insert, params![id, name])
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        if let Some(created) = conn
            .query_row(&select, params![name], |row| row.get::<_, i64>(0))
            .optional()
            .map_err(|e| CatalogError::Database(e.to_string()))?
        {
            return Ok(created);
        }

        let fallback = format!("INSERT INTO {} (name) VALUES (?)", table);
        conn.execute(&fallback, params![name])
            .map_err(|e| CatalogError::Database(e.to_string()))?;
        Ok(conn.last_insert_rowid())
    }

    /// Load genres linked to a game.
    fn load_genres(conn: &Connection, game_id: i64) -> Result<Vec<Genre>, CatalogError> {
        let mut stmt = conn
            .prepare(
                "SELECT g.id, g.name FROM genres g
                 JOIN game_genres gg ON gg.genre_id = g.id
                 WHERE gg.game_id = ? ORDER BY g.name",
            )
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![game_id], |row| {
                Ok(Genre {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let mut genres = Vec::new();
        for row in rows {
            genres.push(row.map_err(|e| CatalogError::Database(e.to_string()))?);
        }
        Ok(genres)
    }

    /// Load tags linked to a game.
    fn load_tags(conn: &Connection, game_id: i64) -> Result<Vec<Tag>, CatalogError> {
        let mut stmt = conn
            .prepare(
                "SELECT t.id, t.name FROM tags t
                 JOIN game_tags gt ON gt.tag_id = t.id
                 WHERE gt.game_id = ? ORDER BY t.name",
            )
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![game_id], |row| {
                Ok(Tag {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let mut tags = Vec::new();
        for row in rows {
            tags.push(row.map_err(|e| CatalogError::Database(e.to_string()))?);
        }
        Ok(tags)
    }

    /// Convert a row to Game (without tag/genre links).
    fn row_to_game(row: &rusqlite::Row) -> rusqlite::Result<Game> {
        let release_date: Option<String> = row.get(5)?;

        Ok(Game {
            id: row.get(0)?,
            title: row.get(1)?,
            image: row.get(2)?,
            short_description: row.get(3)?,
            long_description: row.get(4)?,
            release_date: release_date.and_then(|s| s.parse().ok()),
            developer: row.get(6)?,
            age_rating: row.get(7)?,
            platforms: row.get(8)?,
            submitted_by: row.get(9)?,
            genres: Vec::new(), // Will be loaded separately
            tags: Vec::new(),   // Will be loaded separately
        })
    }

    fn get_inner(conn: &Connection, id: i64) -> Result<Game, CatalogError> {
        let mut game = conn
            .query_row(
                "SELECT id, title, image, short_description, long_description,
                        release_date, developer, age_rating, platforms, submitted_by
                 FROM games WHERE id = ?",
                params![id],
                Self::row_to_game,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    CatalogError::NotFound(format!("game {}", id))
                }
                _ => CatalogError::Database(e.to_string()),
            })?;

        game.genres = Self::load_genres(conn, id)?;
        game.tags = Self::load_tags(conn, id)?;
        Ok(game)
    }

    /// Build the WHERE clause and bound parameters for a filter.
    fn filter_clauses(filter: &GameFilter) -> (String, Vec<Box<dyn ToSql>>) {
        let mut conditions: Vec<String> = Vec::new();
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(search) = filter.search.as_deref() {
            if !search.is_empty() {
                conditions.push("title LIKE ?".to_string());
                values.push(Box::new(format!("%{}%", search)));
            }
        }

        for genre_id in &filter.genre_ids {
            conditions.push(
                "EXISTS (SELECT 1 FROM game_genres gg
                         WHERE gg.game_id = games.id AND gg.genre_id = ?)"
                    .to_string(),
            );
            values.push(Box::new(*genre_id));
        }

        for tag_id in &filter.tag_ids {
            conditions.push(
                "EXISTS (SELECT 1 FROM game_tags gt
                         WHERE gt.game_id = games.id AND gt.tag_id = ?)"
                    .to_string(),
            );
            values.push(Box::new(*tag_id));
        }

        if let Some(platform) = filter.platform.as_deref() {
            if !platform.is_empty() {
                conditions.push("platforms LIKE ?".to_string());
                values.push(Box::new(format!("%{}%", platform.to_lowercase())));
            }
        }

        let clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        (clause, values)
    }
}

impl GameStore for SqliteCatalog {
    fn promote(&self, detail: &AppDetail, owner: &str) -> Result<Game, CatalogError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn
            .transaction()
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let already: Option<i64> = tx
            .query_row(
                "SELECT id FROM games WHERE id = ?",
                params![detail.id],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        if already.is_none() {
            tx.execute(
                "INSERT INTO games (id, title, image, short_description, long_description,
                                    release_date, developer, age_rating, platforms, submitted_by)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    detail.id,
                    &detail.name,
                    &detail.header_image,
                    &detail.short_description,
                    &detail.long_description,
                    detail.release_date.map(|d| d.to_string()),
                    detail.developer(),
                    &detail.age_rating,
                    detail.platforms.descriptor(),
                    owner,
                ],
            )
            .map_err(|e| CatalogError::Database(e.to_string()))?;

            for genre in &detail.genres {
                let genre_id = Self::find_or_create_label(&tx, "genres", genre.id, &genre.name)?;
                tx.execute(
                    "INSERT OR IGNORE INTO game_genres (game_id, genre_id) VALUES (?, ?)",
                    params![detail.id, genre_id],
                )
                .map_err(|e| CatalogError::Database(e.to_string()))?;
            }

            for tag in &detail.tags {
                let tag_id = Self::find_or_create_label(&tx, "tags", tag.id, &tag.name)?;
                tx.execute(
                    "INSERT OR IGNORE INTO game_tags (game_id, tag_id) VALUES (?, ?)",
                    params![detail.id, tag_id],
                )
                .map_err(|e| CatalogError::Database(e.to_string()))?;
            }
        }

        tx.commit()
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        Self::get_inner(&conn, detail.id)
    }

    fn get(&self, id: i64) -> Result<Game, CatalogError> {
        let conn = self.conn.lock().unwrap();
        Self::get_inner(&conn, id)
    }

    fn exists(&self, id: i64) -> Result<bool, CatalogError> {
        let conn = self.conn.lock().unwrap();

        let exists: bool = conn
            .query_row("SELECT 1 FROM games WHERE id = ?", params![id], |_| {
                Ok(true)
            })
            .unwrap_or(false);

        Ok(exists)
    }

    fn count(&self, filter: &GameFilter) -> Result<u64, CatalogError> {
        let conn = self.conn.lock().unwrap();
        let (clause, values) = Self::filter_clauses(filter);

        let sql = format!("SELECT COUNT(*) FROM games{}", clause);
        conn.query_row(&sql, params_from_iter(values.iter()), |row| row.get(0))
            .map_err(|e| CatalogError::Database(e.to_string()))
    }

    fn list(
        &self,
        filter: &GameFilter,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<Game>, CatalogError> {
        let conn = self.conn.lock().unwrap();
        let (clause, mut values) = Self::filter_clauses(filter);

        let sql = format!(
            "SELECT id, title, image, short_description, long_description,
                    release_date, developer, age_rating, platforms, submitted_by
             FROM games{}
             ORDER BY title COLLATE NOCASE, id
             LIMIT ? OFFSET ?",
            clause
        );
        values.push(Box::new(limit as i64));
        values.push(Box::new(offset as i64));

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params_from_iter(values.iter()), Self::row_to_game)
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let mut games = Vec::new();
        for row in rows {
            let mut game = row.map_err(|e| CatalogError::Database(e.to_string()))?;
            game.genres = Self::load_genres(&conn, game.id)?;
            game.tags = Self::load_tags(&conn, game.id)?;
            games.push(game);
        }

        Ok(games)
    }

    fn ids(&self) -> Result<HashSet<i64>, CatalogError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare("SELECT id FROM games")
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| row.get::<_, i64>(0))
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let mut ids = HashSet::new();
        for row in rows {
            ids.insert(row.map_err(|e| CatalogError::Database(e.to_string()))?);
        }
        Ok(ids)
    }

    fn genre(&self, genre_id: i64) -> Result<Genre, CatalogError> {
        let conn = self.conn.lock().unwrap();

        conn.query_row(
            "SELECT id, name FROM genres WHERE id = ?",
            params![genre_id],
            |row| {
                Ok(Genre {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => {
                CatalogError::NotFound(format!("genre {}", genre_id))
            }
            _ => CatalogError::Database(e.to_string()),
        })
    }

    fn games_with_genre(&self, genre_id: i64) -> Result<Vec<Game>, CatalogError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare(
                "SELECT g.id, g.title, g.image, g.short_description, g.long_description,
                        g.release_date, g.developer, g.age_rating, g.platforms, g.submitted_by
                 FROM games g
                 JOIN game_genres gg ON gg.game_id = g.id
                 WHERE gg.genre_id = ?
                 ORDER BY g.title COLLATE NOCASE, g.id",
            )
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![genre_id], Self::row_to_game)
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let mut games = Vec::new();
        for row in rows {
            let mut game = row.map_err(|e| CatalogError::Database(e.to_string()))?;
            game.genres = Self::load_genres(&conn, game.id)?;
            game.tags = Self::load_tags(&conn, game.id)?;
            games.push(game);
        }

        Ok(games)
    }

    fn filter_options(&self) -> Result<FilterOptions, CatalogError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare("SELECT id, name FROM genres ORDER BY name COLLATE NOCASE")
            .map_err(|e| CatalogError::Database(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Genre {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })
            .map_err(|e| CatalogError::Database(e.to_string()))?;
        let mut genres = Vec::new();
        for row in rows {
            genres.push(row.map_err(|e| CatalogError::Database(e.to_string()))?);
        }

        let mut stmt = conn
            .prepare("SELECT id, name FROM tags ORDER BY name COLLATE NOCASE")
            .map_err(|e| CatalogError::Database(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Tag {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })
            .map_err(|e| CatalogError::Database(e.to_string()))?;
        let mut tags = Vec::new();
        for row in rows {
            tags.push(row.map_err(|e| CatalogError::Database(e.to_string()))?);
        }

        Ok(FilterOptions { genres, tags })
    }
}
