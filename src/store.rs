/// The store module owns the SQLite database that persists the catalog. A `Store` is opened once
/// at startup and handed by reference to every operation that needs it.
///
/// Duplicate prevention is not a storage constraint: callers check `exists` before `insert`.
/// A legacy NULL artist is treated as the empty string everywhere.
use std::fs;
use std::path::Path;

use rusqlite::functions::FunctionFlags;
use rusqlite::{params, Connection, Row};
use tracing::debug;

use crate::common::{export_line, Filetype};
use crate::config::Config;
use crate::error::Result;

static STORE_SCHEMA: &str = include_str!("store.sql");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub id: i64,
    pub artist: String,
    pub title: String,
    pub filetype: Filetype,
}

impl Track {
    fn from_row(row: &Row) -> rusqlite::Result<Track> {
        Ok(Track {
            id: row.get("id")?,
            artist: row.get::<_, Option<String>>("artist")?.unwrap_or_default(),
            title: row.get("title")?,
            filetype: row.get("filetype")?,
        })
    }
}

impl std::fmt::Display for Track {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&export_line(&self.artist, &self.title, self.filetype))
    }
}

pub struct Store {
    conn: Connection,
}

/// Open a connection with our settings and SQL functions registered.
fn connect(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    configure(&conn)?;
    Ok(conn)
}

fn configure(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA busy_timeout = 15000;")?;
    // SQLite's LOWER() only folds ASCII; search must fold the same way Rust does.
    conn.create_scalar_function(
        "unicode_lower",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let s: Option<String> = ctx.get(0)?;
            Ok(s.map(|s| s.to_lowercase()))
        },
    )?;
    Ok(())
}

impl Store {
    pub fn open(c: &Config) -> Result<Store> {
        Store::open_path(&c.database_path)
    }

    /// Open (creating if needed) the database at `path` and ensure the schema exists.
    pub fn open_path(path: &Path) -> Result<Store> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        debug!("opening store at {}", path.display());
        let store = Store { conn: connect(path)? };
        store.ensure_schema()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Store> {
        let conn = Connection::open_in_memory()?;
        configure(&conn)?;
        let store = Store { conn };
        store.ensure_schema()?;
        Ok(store)
    }

    /// Idempotent.
    pub fn ensure_schema(&self) -> Result<()> {
        self.conn.execute_batch(STORE_SCHEMA)?;
        Ok(())
    }

    /// Exact, case-sensitive match on both fields.
    pub fn exists(&self, artist: &str, title: &str) -> Result<bool> {
        let mut stmt = self.conn.prepare_cached(
            "
            SELECT EXISTS(
                SELECT 1 FROM tracks
                WHERE (artist = ?1 OR (?1 = '' AND artist IS NULL)) AND title = ?2
            )
            ",
        )?;
        let exists = stmt.query_row(params![artist, title], |row| row.get::<_, bool>(0))?;
        Ok(exists)
    }

    pub fn insert(&self, artist: &str, title: &str, filetype: Filetype) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO tracks (artist, title, filetype) VALUES (?1, ?2, ?3)",
            params![artist, title, filetype],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!("inserted track {} ({:?}, {:?}, {})", id, artist, title, filetype);
        Ok(id)
    }

    /// Remove every row matching exactly and return how many were removed.
    pub fn delete(&self, artist: &str, title: &str) -> Result<usize> {
        let removed = self.conn.execute(
            "DELETE FROM tracks WHERE (artist = ?1 OR (?1 = '' AND artist IS NULL)) AND title = ?2",
            params![artist, title],
        )?;
        debug!("deleted {} rows for ({:?}, {:?})", removed, artist, title);
        Ok(removed)
    }

    /// All tracks ordered by (artist, title), byte-wise.
    pub fn list_all(&self) -> Result<Vec<Track>> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, artist, title, filetype FROM tracks
            ORDER BY IFNULL(artist, ''), title, id
            ",
        )?;
        let tracks = stmt
            .query_map([], Track::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(tracks)
    }

    /// Tracks whose artist or title contains `query`, case-insensitively, ordered by
    /// (artist, title). The query is a literal substring; an empty query matches everything.
    pub fn search(&self, query: &str) -> Result<Vec<Track>> {
        let needle = query.to_lowercase();
        let mut stmt = self.conn.prepare(
            "
            SELECT id, artist, title, filetype FROM tracks
            WHERE instr(unicode_lower(IFNULL(artist, '')), ?1) > 0
               OR instr(unicode_lower(title), ?1) > 0
            ORDER BY IFNULL(artist, ''), title, id
            ",
        )?;
        let tracks = stmt
            .query_map(params![needle], Track::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        debug!("search for {:?} matched {} tracks", query, tracks.len());
        Ok(tracks)
    }

    pub fn count(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM tracks", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Raw access for tests that need to plant rows the public API would refuse.
    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }
}
