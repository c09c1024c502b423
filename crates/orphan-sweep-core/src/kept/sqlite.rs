use super::KeptBackend;
use crate::error::Error;
use rusqlite::{params, Connection};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const SCHEMA_VERSION: i64 = 1;

pub struct SqliteKeptBackend {
    conn: Connection,
}

impl SqliteKeptBackend {
    pub fn open(path: &Path) -> Result<Self, Error> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let backend = SqliteKeptBackend { conn };
        backend.configure_pragmas()?;
        backend.migrate_schema()?;
        Ok(backend)
    }

    pub fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory()?;
        let backend = SqliteKeptBackend { conn };
        backend.configure_pragmas()?;
        backend.migrate_schema()?;
        Ok(backend)
    }

    fn configure_pragmas(&self) -> rusqlite::Result<()> {
        self.conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = 5000;",
        )?;
        debug!("SQLite pragmas configured (WAL mode)");
        Ok(())
    }

    fn migrate_schema(&self) -> rusqlite::Result<()> {
        let version: i64 = self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))?;

        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kept_folder (
                 path      TEXT PRIMARY KEY NOT NULL,
                 marked_at TEXT NOT NULL
             );",
        )?;
        if version < SCHEMA_VERSION {
            self.conn
                .execute_batch(&format!("PRAGMA user_version = {};", SCHEMA_VERSION))?;
            debug!("Kept store schema initialized (version {})", SCHEMA_VERSION);
        }
        Ok(())
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Kept paths with the time they were marked, oldest mark first.
    pub fn entries(&self) -> Result<Vec<(PathBuf, String)>, Error> {
        let mut stmt = self
            .conn
            .prepare("SELECT path, marked_at FROM kept_folder ORDER BY marked_at, path")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((PathBuf::from(row.get::<_, String>(0)?), row.get::<_, String>(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}

impl KeptBackend for SqliteKeptBackend {
    fn load(&mut self) -> Result<Vec<PathBuf>, Error> {
        let mut stmt = self
            .conn
            .prepare("SELECT path FROM kept_folder ORDER BY path")?;
        let paths = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .map(|row| row.map(PathBuf::from))
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(paths)
    }

    fn save(&mut self, path: &Path, kept: bool) -> Result<(), Error> {
        let key = path.to_string_lossy().into_owned();
        if kept {
            // re-marking keeps the original timestamp
            self.conn.execute(
                "INSERT OR IGNORE INTO kept_folder (path, marked_at) VALUES (?1, ?2)",
                params![key, chrono::Utc::now().to_rfc3339()],
            )?;
        } else {
            self.conn
                .execute("DELETE FROM kept_folder WHERE path = ?1", params![key])?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load() {
        let mut backend = SqliteKeptBackend::open_in_memory().unwrap();
        backend.save(Path::new("/home/alice/.b"), true).unwrap();
        backend.save(Path::new("/home/alice/.a"), true).unwrap();
        backend.save(Path::new("/home/alice/.a"), true).unwrap();
        assert_eq!(
            backend.load().unwrap(),
            vec![PathBuf::from("/home/alice/.a"), PathBuf::from("/home/alice/.b")]
        );

        backend.save(Path::new("/home/alice/.b"), false).unwrap();
        assert_eq!(backend.load().unwrap(), vec![PathBuf::from("/home/alice/.a")]);
        assert_eq!(backend.entries().unwrap().len(), 1);
    }

    #[test]
    fn test_schema_version_is_set() {
        let backend = SqliteKeptBackend::open_in_memory().unwrap();
        let version: i64 = backend
            .connection()
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }
}
