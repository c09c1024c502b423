use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRoot {
    pub path: PathBuf,
    pub hidden_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderEntry {
    pub path: PathBuf,
    pub name: String,
}

/// Immediate subdirectories of `root`, sorted by name. No recursion.
///
/// A child that is itself one of `all_roots`, or an ancestor of one, is left
/// out: it gets scanned as a root of its own instead (`~/.config` and
/// `~/.local` seen from `~`). Symlinks to directories count as directories.
pub fn list_candidate_folders(root: &ScanRoot, all_roots: &[ScanRoot]) -> Vec<FolderEntry> {
    let entries = match fs::read_dir(&root.path) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!("Scan root {} does not exist", root.path.display());
            return Vec::new();
        }
        Err(err) => {
            warn!("Cannot read scan root {}: {}", root.path.display(), err);
            return Vec::new();
        }
    };

    let mut folders: Vec<FolderEntry> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            if root.hidden_only && !name.starts_with('.') {
                return None;
            }
            let path = entry.path();
            if !path.is_dir() || contains_other_root(&path, root, all_roots) {
                return None;
            }
            Some(FolderEntry { path, name })
        })
        .collect();

    folders.sort_by(|a, b| a.name.cmp(&b.name));
    folders
}

fn contains_other_root(path: &Path, current: &ScanRoot, all_roots: &[ScanRoot]) -> bool {
    all_roots
        .iter()
        .filter(|other| other.path != current.path)
        .any(|other| other.path.starts_with(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_lists_direct_children_only() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().join("config");
        fs::create_dir_all(root.join("beta/nested")).unwrap();
        fs::create_dir_all(root.join("alpha")).unwrap();
        fs::write(root.join("settings.ini"), "").unwrap();

        let scan_root = ScanRoot {
            path: root.clone(),
            hidden_only: false,
        };
        let folders = list_candidate_folders(&scan_root, std::slice::from_ref(&scan_root));
        let names: Vec<&str> = folders.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "beta"]);
        assert_eq!(folders[0].path, root.join("alpha"));
    }

    #[test]
    fn test_hidden_only_skips_nested_roots() {
        let tmp = tempdir().unwrap();
        let home = tmp.path().to_path_buf();
        fs::create_dir_all(home.join(".config/app")).unwrap();
        fs::create_dir_all(home.join(".local/share/app")).unwrap();
        fs::create_dir_all(home.join(".steam")).unwrap();
        fs::create_dir_all(home.join("Documents")).unwrap();

        let roots = vec![
            ScanRoot {
                path: home.join(".config"),
                hidden_only: false,
            },
            ScanRoot {
                path: home.join(".local/share"),
                hidden_only: false,
            },
            ScanRoot {
                path: home.clone(),
                hidden_only: true,
            },
        ];
        let folders = list_candidate_folders(&roots[2], &roots);
        let names: Vec<&str> = folders.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec![".steam"]);
    }

    #[test]
    fn test_missing_root_is_empty() {
        let tmp = tempdir().unwrap();
        let root = ScanRoot {
            path: tmp.path().join("absent"),
            hidden_only: false,
        };
        assert!(list_candidate_folders(&root, &[]).is_empty());
    }
}
