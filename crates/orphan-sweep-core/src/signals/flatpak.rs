use super::{read_source_dir, SignalAdapter, SignalSource};
use crate::error::Error;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Installed Flatpak applications, read from the `app/` directory of each
/// Flatpak installation. Each subdirectory is named after an application id.
pub struct FlatpakAdapter {
    app_dirs: Vec<PathBuf>,
}

impl FlatpakAdapter {
    pub fn new(app_dirs: Vec<PathBuf>) -> Self {
        Self { app_dirs }
    }
}

impl SignalAdapter for FlatpakAdapter {
    fn source(&self) -> SignalSource {
        SignalSource::Flatpak
    }

    fn try_collect(&self) -> Result<BTreeSet<String>, Error> {
        let mut apps = BTreeSet::new();
        let mut any_installation = false;

        for dir in &self.app_dirs {
            let Some(entries) = read_source_dir(self.source(), dir) else {
                continue;
            };
            any_installation = true;
            for entry in entries.flatten() {
                if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                    apps.insert(entry.file_name().to_string_lossy().into_owned());
                }
            }
        }

        if !any_installation {
            return Err(Error::SourceUnavailable {
                signal: SignalSource::Flatpak,
                reason: "no Flatpak installation found".to_string(),
            });
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
    fn test_lists_application_ids() {
        let tmp = tempdir().unwrap();
        let system = tmp.path().join("system/app");
        let user = tmp.path().join("user/app");
        fs::create_dir_all(system.join("org.mozilla.firefox")).unwrap();
        fs::create_dir_all(user.join("md.obsidian.Obsidian")).unwrap();
        fs::write(user.join("stray-file"), "").unwrap();

        let adapter = FlatpakAdapter::new(vec![system, user, tmp.path().join("missing")]);
        let apps = adapter.try_collect().unwrap();
        assert_eq!(
            apps.into_iter().collect::<Vec<_>>(),
            vec!["md.obsidian.Obsidian", "org.mozilla.firefox"]
        );
    }

    #[test]
    fn test_no_installation_is_unavailable() {
        let tmp = tempdir().unwrap();
        let adapter = FlatpakAdapter::new(vec![tmp.path().join("nope")]);
        assert!(adapter.try_collect().is_err());
    }
}
