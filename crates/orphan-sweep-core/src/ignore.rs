use crate::config::IgnoreConfig;
use crate::error::Error;
use crate::paths;
use glob::{MatchOptions, Pattern};
use std::collections::HashSet;
use std::path::Path;

/// Directories that hold caches, trash, desktop plumbing or credentials rather
/// than one application's data.
pub const BUILTIN_IGNORED_NAMES: &[&str] = &[
    ".cache",
    ".thumbnails",
    ".npm",
    ".local",
    ".config",
    ".ssh",
    ".gnupg",
    ".pki",
    "applications",
    "autostart",
    "backgrounds",
    "dconf",
    "fonts",
    "gtk-2.0",
    "gtk-3.0",
    "gtk-4.0",
    "icons",
    "keyrings",
    "mime",
    "pulse",
    "sounds",
    "systemd",
];

pub const BUILTIN_IGNORED_PATTERNS: &[&str] = &["*cache", "trash*", ".trash-*"];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

fn is_glob(entry: &str) -> bool {
    entry.contains(['*', '?', '['])
}

#[derive(Debug, Clone, Default)]
pub struct IgnoreFilter {
    names: HashSet<String>,
    name_patterns: Vec<Pattern>,
    path_patterns: Vec<Pattern>,
}

impl IgnoreFilter {
    pub fn new(config: &IgnoreConfig, home: Option<&Path>) -> Result<Self, Error> {
        let mut filter = IgnoreFilter::default();

        if config.builtin {
            for name in BUILTIN_IGNORED_NAMES.iter().chain(BUILTIN_IGNORED_PATTERNS) {
                filter.add_name(name)?;
            }
        }
        for name in &config.names {
            filter.add_name(name)?;
        }
        for raw in &config.paths {
            let expanded = paths::expand_home(raw, home);
            let pattern = Pattern::new(&expanded.to_string_lossy())?;
            filter.path_patterns.push(pattern);
        }

        Ok(filter)
    }

    fn add_name(&mut self, entry: &str) -> Result<(), Error> {
        let entry = entry.trim();
        if entry.is_empty() {
            return Ok(());
        }
        if is_glob(entry) {
            self.name_patterns.push(Pattern::new(entry)?);
        } else {
            self.names.insert(entry.to_lowercase());
        }
        Ok(())
    }

    /// Case-insensitive exact or pattern match on the folder name alone.
    pub fn should_ignore(&self, folder_name: &str) -> bool {
        self.names.contains(&folder_name.to_lowercase())
            || self
                .name_patterns
                .iter()
                .any(|pattern| pattern.matches_with(folder_name, MATCH_OPTIONS))
    }

    /// Name rules plus path rules: a folder is ignored when it, or one of its
    /// ancestors, matches a configured path pattern.
    pub fn should_ignore_path(&self, path: &Path) -> bool {
        let name_ignored = path
            .file_name()
            .map(|name| self.should_ignore(&name.to_string_lossy()))
            .unwrap_or(false);

        name_ignored
            || path.ancestors().any(|ancestor| {
                self.path_patterns
                    .iter()
                    .any(|pattern| pattern.matches_path_with(ancestor, MATCH_OPTIONS))
            })
    }
}
