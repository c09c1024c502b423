use directories::BaseDirs;
use std::path::{Component, Path, PathBuf};

pub fn home_dir() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf())
}

/// Expand a leading `~` against `home`. Paths without one are returned as-is.
pub fn expand_home(raw: &str, home: Option<&Path>) -> PathBuf {
    let Some(home) = home else {
        return PathBuf::from(raw);
    };
    if raw == "~" {
        return home.to_path_buf();
    }
    match raw.strip_prefix("~/") {
        Some(rest) => home.join(rest),
        None => PathBuf::from(raw),
    }
}

/// Make `path` absolute against the working directory and drop `.` components,
/// without touching the filesystem (symlinks are left alone so kept paths line
/// up with the paths the scanner enumerates).
pub fn absolutize(path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };

    let mut result = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                result.pop();
            }
            other => result.push(other.as_os_str()),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_home_prefix() {
        let home = Path::new("/home/alice");
        assert_eq!(
            expand_home("~/.config", Some(home)),
            PathBuf::from("/home/alice/.config")
        );
        assert_eq!(expand_home("~", Some(home)), PathBuf::from("/home/alice"));
        assert_eq!(expand_home("/opt/apps", Some(home)), PathBuf::from("/opt/apps"));
        // `~user` forms are not expanded
        assert_eq!(expand_home("~bob/x", Some(home)), PathBuf::from("~bob/x"));
    }

    #[test]
    fn test_expand_home_without_home() {
        assert_eq!(expand_home("~/.config", None), PathBuf::from("~/.config"));
    }

    #[test]
    fn test_absolutize_collapses_dots() {
        assert_eq!(
            absolutize(Path::new("/home/alice/./.config/../.local/share/")),
            PathBuf::from("/home/alice/.local/share")
        );
    }
}
