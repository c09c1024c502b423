use super::{read_source_dir, SignalAdapter, SignalSource};
use crate::error::Error;
use std::collections::BTreeSet;
use std::fs::Metadata;
use std::path::PathBuf;

/// Executable file names in every directory of the search path.
pub struct ExecutableAdapter {
    dirs: Vec<PathBuf>,
}

impl ExecutableAdapter {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    /// Use the directories listed in `$PATH`.
    pub fn from_env() -> Self {
        let dirs = std::env::var_os("PATH")
            .map(|path| std::env::split_paths(&path).collect())
            .unwrap_or_default();
        Self { dirs }
    }
}

#[cfg(unix)]
fn is_executable(metadata: &Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.is_file() && metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(metadata: &Metadata) -> bool {
    metadata.is_file()
}

impl SignalAdapter for ExecutableAdapter {
    fn source(&self) -> SignalSource {
        SignalSource::Executable
    }

    fn try_collect(&self) -> Result<BTreeSet<String>, Error> {
        if self.dirs.is_empty() {
            return Err(Error::SourceUnavailable {
                signal: SignalSource::Executable,
                reason: "search path is empty".to_string(),
            });
        }

        let mut commands = BTreeSet::new();
        for dir in &self.dirs {
            let Some(entries) = read_source_dir(self.source(), dir) else {
                continue;
            };
            for entry in entries.flatten() {
                // follow symlinks: most of /usr/bin on some distros is links
                let Ok(metadata) = std::fs::metadata(entry.path()) else {
                    continue;
                };
                if is_executable(&metadata) {
                    commands.insert(entry.file_name().to_string_lossy().into_owned());
                }
            }
        }
        Ok(commands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[cfg(unix)]
    #[test]
    fn test_only_executable_files() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempdir().unwrap();
        let bin = tmp.path().join("bin");
        fs::create_dir(&bin).unwrap();
        fs::write(bin.join("htop"), "#!/bin/sh\n").unwrap();
        fs::set_permissions(bin.join("htop"), fs::Permissions::from_mode(0o755)).unwrap();
        fs::write(bin.join("README"), "docs").unwrap();
        fs::set_permissions(bin.join("README"), fs::Permissions::from_mode(0o644)).unwrap();
        fs::create_dir(bin.join("subdir")).unwrap();

        let adapter = ExecutableAdapter::new(vec![bin, tmp.path().join("missing")]);
        let commands = adapter.try_collect().unwrap();
        assert_eq!(commands.into_iter().collect::<Vec<_>>(), vec!["htop"]);
    }

    #[test]
    fn test_empty_search_path_is_unavailable() {
        assert!(ExecutableAdapter::new(Vec::new()).try_collect().is_err());
    }
}
