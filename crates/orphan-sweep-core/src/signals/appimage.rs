use super::{read_source_dir, SignalAdapter, SignalSource};
use crate::error::Error;
use crate::naming;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Portable AppImage files in the configured directories (non-recursive).
pub struct AppImageAdapter {
    dirs: Vec<PathBuf>,
}

impl AppImageAdapter {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }
}

fn is_appimage(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("appimage"))
}

impl SignalAdapter for AppImageAdapter {
    fn source(&self) -> SignalSource {
        SignalSource::AppImage
    }

    fn try_collect(&self) -> Result<BTreeSet<String>, Error> {
        let mut apps = BTreeSet::new();
        for dir in &self.dirs {
            let Some(entries) = read_source_dir(self.source(), dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if !path.is_file() || !is_appimage(&path) {
                    continue;
                }
                if let Some(id) = path
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .and_then(naming::appimage_identifier)
                {
                    apps.insert(id);
                }
            }
        }
        Ok(apps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_strips_version_and_arch() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("Obsidian-1.5.3-x86_64.AppImage"), "").unwrap();
        fs::write(tmp.path().join("krita.appimage"), "").unwrap();
        fs::write(tmp.path().join("notes.txt"), "").unwrap();
        fs::create_dir(tmp.path().join("Fake.AppImage")).unwrap();

        let adapter = AppImageAdapter::new(vec![tmp.path().to_path_buf()]);
        let apps = adapter.try_collect().unwrap();
        assert_eq!(apps.into_iter().collect::<Vec<_>>(), vec!["krita", "obsidian"]);
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let tmp = tempdir().unwrap();
        let adapter = AppImageAdapter::new(vec![tmp.path().join("Applications")]);
        assert!(adapter.try_collect().unwrap().is_empty());
    }
}
