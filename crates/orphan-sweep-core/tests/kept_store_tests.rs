use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

use orphan_sweep_core::config::{KeptBackendKind, KeptConfig, KeptRetention};
use orphan_sweep_core::kept::{KeptBackend, SqliteKeptBackend, TextKeptBackend};
use orphan_sweep_core::KeptStore;

fn config(backend: KeptBackendKind, path: PathBuf) -> KeptConfig {
    KeptConfig {
        backend,
        path: path.to_string_lossy().into_owned(),
        retention: KeptRetention::Retain,
    }
}

#[test]
fn test_sqlite_store_persists_across_reopen() {
    let tmp = tempdir().unwrap();
    let db_path = tmp.path().join("state/kept.db");
    let folder = tmp.path().join(".config/important");

    {
        let mut store = KeptStore::from_config(&config(KeptBackendKind::Sqlite, db_path.clone()), None);
        assert!(store.load_error().is_none());
        store.set_kept(&folder, true).unwrap();
    }

    let mut store = KeptStore::from_config(&config(KeptBackendKind::Sqlite, db_path.clone()), None);
    assert!(store.is_kept(&folder));
    assert_eq!(store.len(), 1);

    store.set_kept(&folder, false).unwrap();
    let reopened = KeptStore::from_config(&config(KeptBackendKind::Sqlite, db_path), None);
    assert!(reopened.is_empty());
}

#[test]
fn test_text_store_reads_existing_list() {
    let tmp = tempdir().unwrap();
    let list = tmp.path().join("kept_folders.txt");
    fs::write(&list, "/home/alice/.config/old-app\n/home/alice/.wine\n").unwrap();

    let mut store = KeptStore::from_config(&config(KeptBackendKind::Text, list.clone()), None);
    assert!(store.is_kept(&PathBuf::from("/home/alice/.wine")));
    assert_eq!(store.kept_paths().count(), 2);

    store
        .set_kept(&PathBuf::from("/home/alice/.config/old-app"), false)
        .unwrap();
    assert_eq!(fs::read_to_string(&list).unwrap(), "/home/alice/.wine\n");
}

#[test]
fn test_sqlite_backend_lists_marked_entries() {
    let tmp = tempdir().unwrap();
    let mut backend = SqliteKeptBackend::open(&tmp.path().join("kept.db")).unwrap();
    backend.save(&PathBuf::from("/home/alice/.a"), true).unwrap();

    let entries = backend.entries().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].0, PathBuf::from("/home/alice/.a"));
    assert!(!entries[0].1.is_empty());
}

#[test]
fn test_text_backend_missing_file_is_empty() {
    let tmp = tempdir().unwrap();
    let mut backend = TextKeptBackend::new(tmp.path().join("nothing.txt"));
    assert!(backend.load().unwrap().is_empty());
}
