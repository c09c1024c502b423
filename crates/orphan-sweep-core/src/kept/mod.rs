//! User overrides that force a folder to be kept regardless of what the match
//! engine decided. Keyed by absolute folder path.

pub mod sqlite;
pub mod text;

use crate::config::{KeptBackendKind, KeptConfig};
use crate::error::Error;
use crate::paths;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub use sqlite::SqliteKeptBackend;
pub use text::TextKeptBackend;

/// Persisted form of the kept set.
pub trait KeptBackend: Send {
    fn load(&mut self) -> Result<Vec<PathBuf>, Error>;
    fn save(&mut self, path: &Path, kept: bool) -> Result<(), Error>;
}

/// Keeps nothing across process restarts.
#[derive(Debug, Default)]
pub struct MemoryKeptBackend;

impl KeptBackend for MemoryKeptBackend {
    fn load(&mut self) -> Result<Vec<PathBuf>, Error> {
        Ok(Vec::new())
    }

    fn save(&mut self, _path: &Path, _kept: bool) -> Result<(), Error> {
        Ok(())
    }
}

pub struct KeptStore {
    backend: Box<dyn KeptBackend>,
    kept: BTreeSet<PathBuf>,
    load_error: Option<String>,
}

impl KeptStore {
    /// Read the persisted set. A failing backend leaves the store empty and
    /// records the failure in [`load_error`](Self::load_error).
    pub fn open(mut backend: Box<dyn KeptBackend>) -> Self {
        let (kept, load_error) = match backend.load() {
            Ok(loaded) => (
                loaded.iter().map(|path| paths::absolutize(path)).collect(),
                None,
            ),
            Err(err) => {
                warn!("Kept folders unavailable, continuing without overrides: {}", err);
                (BTreeSet::new(), Some(err.to_string()))
            }
        };
        debug!("{} kept folders loaded", kept.len());
        Self {
            backend,
            kept,
            load_error,
        }
    }

    pub fn in_memory() -> Self {
        Self::open(Box::new(MemoryKeptBackend))
    }

    /// Open the configured backend. If it cannot even be opened the store
    /// falls back to memory only and reports the error like a failed load.
    pub fn from_config(config: &KeptConfig, home: Option<&Path>) -> Self {
        let path = paths::expand_home(&config.path, home);
        let backend: Result<Box<dyn KeptBackend>, Error> = match config.backend {
            KeptBackendKind::Sqlite => {
                SqliteKeptBackend::open(&path).map(|b| Box::new(b) as Box<dyn KeptBackend>)
            }
            KeptBackendKind::Text => Ok(Box::new(TextKeptBackend::new(path.clone()))),
        };

        match backend {
            Ok(backend) => Self::open(backend),
            Err(err) => {
                warn!("Cannot open kept store at {}: {}", path.display(), err);
                let mut store = Self::in_memory();
                store.load_error = Some(err.to_string());
                store
            }
        }
    }

    pub fn is_kept(&self, path: &Path) -> bool {
        self.kept.contains(&paths::absolutize(path))
    }

    /// Persist first; the in-memory set only changes if that succeeds.
    pub fn set_kept(&mut self, path: &Path, kept: bool) -> Result<(), Error> {
        let path = paths::absolutize(path);
        self.backend.save(&path, kept)?;
        if kept {
            self.kept.insert(path);
        } else {
            self.kept.remove(&path);
        }
        Ok(())
    }

    pub fn kept_paths(&self) -> impl Iterator<Item = &Path> {
        self.kept.iter().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.kept.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kept.is_empty()
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// Remove entries whose folder no longer exists. Returns the removed paths.
    pub fn purge_missing(&mut self) -> Result<Vec<PathBuf>, Error> {
        let missing: Vec<PathBuf> = self
            .kept
            .iter()
            .filter(|path| !path.is_dir())
            .cloned()
            .collect();
        for path in &missing {
            self.set_kept(path, false)?;
        }
        if !missing.is_empty() {
            debug!("Purged {} stale kept entries", missing.len());
        }
        Ok(missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    struct FailingBackend;

    impl KeptBackend for FailingBackend {
        fn load(&mut self) -> Result<Vec<PathBuf>, Error> {
            Err(Error::Other("disk on fire".to_string()))
        }

        fn save(&mut self, _path: &Path, _kept: bool) -> Result<(), Error> {
            Err(Error::Other("read-only".to_string()))
        }
    }

    #[test]
    fn test_failed_load_means_no_overrides() {
        let mut store = KeptStore::open(Box::new(FailingBackend));
        assert!(store.is_empty());
        assert_eq!(store.load_error(), Some("disk on fire"));
        assert!(store.set_kept(Path::new("/tmp/x"), true).is_err());
        assert!(!store.is_kept(Path::new("/tmp/x")));
    }

    #[test]
    fn test_set_and_clear() {
        let mut store = KeptStore::in_memory();
        store.set_kept(Path::new("/home/alice/.foo"), true).unwrap();
        assert!(store.is_kept(Path::new("/home/alice/.foo")));
        store.set_kept(Path::new("/home/alice/.foo/"), false).unwrap();
        assert!(!store.is_kept(Path::new("/home/alice/.foo")));
    }

    struct ListBackend(Vec<PathBuf>);

    impl KeptBackend for ListBackend {
        fn load(&mut self) -> Result<Vec<PathBuf>, Error> {
            Ok(self.0.clone())
        }

        fn save(&mut self, _path: &Path, _kept: bool) -> Result<(), Error> {
            Ok(())
        }
    }

    #[test]
    fn test_dotted_paths_match_either_way() {
        let store = KeptStore::open(Box::new(ListBackend(vec![PathBuf::from(
            "/home/alice/./.config/../.config/foo",
        )])));
        assert!(store.is_kept(Path::new("/home/alice/.config/foo")));
        assert!(store.is_kept(Path::new("/home/alice/.config/./foo")));
        assert!(!store.is_kept(Path::new("/home/alice/foo")));
        assert_eq!(
            store.kept_paths().collect::<Vec<_>>(),
            vec![Path::new("/home/alice/.config/foo")]
        );
    }

    #[test]
    fn test_purge_missing_keeps_existing() {
        let tmp = tempdir().unwrap();
        let present = tmp.path().join("present");
        fs::create_dir(&present).unwrap();
        let gone = tmp.path().join("gone");

        let mut store = KeptStore::in_memory();
        store.set_kept(&present, true).unwrap();
        store.set_kept(&gone, true).unwrap();

        let purged = store.purge_missing().unwrap();
        assert_eq!(purged, vec![gone.clone()]);
        assert!(store.is_kept(&present));
        assert!(!store.is_kept(&gone));
    }

    #[test]
    fn test_from_config_unopenable_sqlite_falls_back() {
        let tmp = tempdir().unwrap();
        // a directory where the database file should be
        let blocker = tmp.path().join("kept.db");
        fs::create_dir(&blocker).unwrap();
        let config = KeptConfig {
            backend: KeptBackendKind::Sqlite,
            path: blocker.to_string_lossy().into_owned(),
            ..KeptConfig::default()
        };
        let store = KeptStore::from_config(&config, None);
        assert!(store.is_empty());
        assert!(store.load_error().is_some());
    }
}
