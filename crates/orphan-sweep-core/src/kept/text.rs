use super::KeptBackend;
use crate::error::Error;
use crate::paths;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// One absolute path per line; compatible with `~/.config/kept_folders.txt`
/// files written by earlier tools.
pub struct TextKeptBackend {
    path: PathBuf,
}

impl TextKeptBackend {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn read_set(&self) -> Result<BTreeSet<PathBuf>, Error> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(BTreeSet::new()),
            Err(err) => return Err(err.into()),
        };
        Ok(contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| paths::absolutize(Path::new(line)))
            .collect())
    }

    fn write_set(&self, set: &BTreeSet<PathBuf>) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut contents = String::new();
        for path in set {
            contents.push_str(&path.to_string_lossy());
            contents.push('\n');
        }
        // write-then-rename so a crash never leaves a truncated list
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeptBackend for TextKeptBackend {
    fn load(&mut self) -> Result<Vec<PathBuf>, Error> {
        Ok(self.read_set()?.into_iter().collect())
    }

    fn save(&mut self, path: &Path, kept: bool) -> Result<(), Error> {
        let mut set = self.read_set()?;
        let changed = if kept {
            set.insert(path.to_path_buf())
        } else {
            set.remove(path)
        };
        if changed {
            self.write_set(&set)?;
        }
        Ok(())
    }
}
