//! Signal sources: independent probes that each report which application
//! identifiers one ecosystem currently considers installed.
//!
//! All adapters are queried once per scan and folded into a [`SignalIndex`]
//! before any folder is classified.

pub mod appimage;
pub mod desktop;
pub mod executables;
pub mod flatpak;
pub mod package;

use crate::config::SourcesConfig;
use crate::error::Error;
use crate::model::ScanNote;
use crate::naming;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub use appimage::AppImageAdapter;
pub use desktop::DesktopEntryAdapter;
pub use executables::ExecutableAdapter;
pub use flatpak::FlatpakAdapter;
pub use package::PackageAdapter;

/// Which ecosystem reported an identifier. Variant order is the tie-break
/// priority when several sources report the same identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalSource {
    Package,
    Flatpak,
    DesktopEntry,
    AppImage,
    Executable,
}

impl SignalSource {
    pub const ALL: [SignalSource; 5] = [
        SignalSource::Package,
        SignalSource::Flatpak,
        SignalSource::DesktopEntry,
        SignalSource::AppImage,
        SignalSource::Executable,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SignalSource::Package => "package",
            SignalSource::Flatpak => "flatpak",
            SignalSource::DesktopEntry => "desktop entry",
            SignalSource::AppImage => "AppImage",
            SignalSource::Executable => "executable",
        }
    }
}

impl fmt::Display for SignalSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignalEntry {
    pub identifier: String,
    pub source: SignalSource,
}

pub trait SignalAdapter: Send + Sync {
    fn source(&self) -> SignalSource;

    /// Query the live system. `Err` means the source is unavailable.
    fn try_collect(&self) -> Result<BTreeSet<String>, Error>;

    /// Like [`try_collect`](Self::try_collect), but an unavailable source
    /// degrades to an empty set.
    fn collect(&self) -> BTreeSet<String> {
        match self.try_collect() {
            Ok(identifiers) => identifiers,
            Err(err) => {
                warn!("{}", err);
                BTreeSet::new()
            }
        }
    }
}

/// Fixed identifier list, for hosts that already know what is installed and
/// for tests.
#[derive(Debug, Clone)]
pub struct StaticAdapter {
    source: SignalSource,
    identifiers: BTreeSet<String>,
}

impl StaticAdapter {
    pub fn new<I, S>(source: SignalSource, identifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            source,
            identifiers: identifiers.into_iter().map(Into::into).collect(),
        }
    }
}

impl SignalAdapter for StaticAdapter {
    fn source(&self) -> SignalSource {
        self.source
    }

    fn try_collect(&self) -> Result<BTreeSet<String>, Error> {
        Ok(self.identifiers.clone())
    }
}

#[derive(Debug, Clone)]
struct IndexedEntry {
    key: String,
    entry: SignalEntry,
}

/// Immutable snapshot of every adapter's answer for one scan.
#[derive(Debug, Clone, Default)]
pub struct SignalIndex {
    entries: Vec<IndexedEntry>,
    by_key: HashMap<String, usize>,
}

impl SignalIndex {
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = SignalEntry>,
    {
        let mut indexed: Vec<IndexedEntry> = entries
            .into_iter()
            .filter_map(|entry| {
                let key = naming::normalize(&entry.identifier);
                (!key.is_empty()).then_some(IndexedEntry { key, entry })
            })
            .collect();

        indexed.sort_by(|a, b| {
            a.entry
                .source
                .cmp(&b.entry.source)
                .then_with(|| a.key.cmp(&b.key))
                .then_with(|| a.entry.identifier.cmp(&b.entry.identifier))
        });
        indexed.dedup_by(|a, b| a.key == b.key && a.entry.source == b.entry.source);

        let mut by_key = HashMap::with_capacity(indexed.len());
        for (position, item) in indexed.iter().enumerate() {
            by_key.entry(item.key.clone()).or_insert(position);
        }

        Self {
            entries: indexed,
            by_key,
        }
    }

    /// Query every adapter (in parallel) and wait for all of them before
    /// building the index. Unavailable sources contribute nothing and are
    /// reported as notes.
    pub fn collect(adapters: &[Box<dyn SignalAdapter>]) -> (Self, Vec<ScanNote>) {
        let results: Vec<(SignalSource, Result<BTreeSet<String>, Error>)> = adapters
            .par_iter()
            .map(|adapter| (adapter.source(), adapter.try_collect()))
            .collect();

        let mut entries = Vec::new();
        let mut notes = Vec::new();
        for (source, result) in results {
            match result {
                Ok(identifiers) => {
                    debug!("{} source reported {} identifiers", source, identifiers.len());
                    entries.extend(
                        identifiers
                            .into_iter()
                            .map(|identifier| SignalEntry { identifier, source }),
                    );
                }
                Err(err) => {
                    warn!("{}", err);
                    notes.push(ScanNote::SourceUnavailable {
                        source,
                        reason: err.to_string(),
                    });
                }
            }
        }

        (Self::from_entries(entries), notes)
    }

    /// Exact lookup by normalized key. When several sources report the same
    /// key the highest-priority source wins.
    pub fn lookup(&self, key: &str) -> Option<&SignalEntry> {
        self.by_key.get(key).map(|&position| &self.entries[position].entry)
    }

    /// Entries with their normalized keys, ordered by source priority then key.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SignalEntry)> {
        self.entries
            .iter()
            .map(|item| (item.key.as_str(), &item.entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count_by_source(&self, source: SignalSource) -> usize {
        self.entries
            .iter()
            .filter(|item| item.entry.source == source)
            .count()
    }
}

/// Build the adapters enabled by configuration, with `~` in their directory
/// settings expanded against `home`.
pub fn default_adapters(config: &SourcesConfig, home: Option<&Path>) -> Vec<Box<dyn SignalAdapter>> {
    let expand = |dirs: &[String]| -> Vec<PathBuf> {
        dirs.iter()
            .map(|dir| crate::paths::expand_home(dir, home))
            .collect()
    };

    let mut adapters: Vec<Box<dyn SignalAdapter>> = Vec::new();
    for source in SignalSource::ALL {
        if config.disabled.contains(&source) {
            debug!("{} source disabled by configuration", source);
            continue;
        }
        let adapter: Box<dyn SignalAdapter> = match source {
            SignalSource::Package => Box::new(PackageAdapter::new(config.package_commands.clone())),
            SignalSource::Flatpak => Box::new(FlatpakAdapter::new(expand(&config.flatpak_dirs))),
            SignalSource::DesktopEntry => {
                Box::new(DesktopEntryAdapter::new(expand(&config.desktop_dirs)))
            }
            SignalSource::AppImage => Box::new(AppImageAdapter::new(expand(&config.appimage_dirs))),
            SignalSource::Executable => {
                if config.path_dirs.is_empty() {
                    Box::new(ExecutableAdapter::from_env())
                } else {
                    Box::new(ExecutableAdapter::new(expand(&config.path_dirs)))
                }
            }
        };
        adapters.push(adapter);
    }
    adapters
}

/// Read a directory for an adapter. A missing directory is `Ok(None)`; other
/// failures are logged and also yield `None`, so one unreadable location does
/// not hide the rest.
pub(crate) fn read_source_dir(source: SignalSource, dir: &Path) -> Option<fs::ReadDir> {
    match fs::read_dir(dir) {
        Ok(entries) => Some(entries),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
        Err(err) => {
            warn!("{} source cannot read {}: {}", source, dir.display(), err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(identifier: &str, source: SignalSource) -> SignalEntry {
        SignalEntry {
            identifier: identifier.to_string(),
            source,
        }
    }

    #[test]
    fn test_lookup_prefers_higher_priority_source() {
        let index = SignalIndex::from_entries(vec![
            entry("firefox", SignalSource::Executable),
            entry("firefox", SignalSource::Package),
            entry("org.mozilla.firefox", SignalSource::Flatpak),
        ]);
        let hit = index.lookup("firefox").unwrap();
        assert_eq!(hit.source, SignalSource::Package);
        assert_eq!(index.lookup("org-mozilla-firefox").unwrap().identifier, "org.mozilla.firefox");
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_from_entries_drops_duplicates_and_empty_keys() {
        let index = SignalIndex::from_entries(vec![
            entry("Foo_Bar", SignalSource::DesktopEntry),
            entry("foo-bar", SignalSource::DesktopEntry),
            entry("...", SignalSource::DesktopEntry),
        ]);
        assert_eq!(index.len(), 1);
        assert_eq!(index.count_by_source(SignalSource::DesktopEntry), 1);
    }

    struct BrokenAdapter;

    impl SignalAdapter for BrokenAdapter {
        fn source(&self) -> SignalSource {
            SignalSource::Flatpak
        }

        fn try_collect(&self) -> Result<BTreeSet<String>, Error> {
            Err(Error::SourceUnavailable {
                signal: SignalSource::Flatpak,
                reason: "not installed".to_string(),
            })
        }
    }

    #[test]
    fn test_collect_degrades_unavailable_sources() {
        let adapters: Vec<Box<dyn SignalAdapter>> = vec![
            Box::new(BrokenAdapter),
            Box::new(StaticAdapter::new(SignalSource::Package, ["vim", "git"])),
        ];
        let (index, notes) = SignalIndex::collect(&adapters);
        assert_eq!(index.len(), 2);
        assert_eq!(notes.len(), 1);
        assert!(matches!(
            notes[0],
            ScanNote::SourceUnavailable {
                source: SignalSource::Flatpak,
                ..
            }
        ));
        assert!(BrokenAdapter.collect().is_empty());
    }

    #[test]
    fn test_default_adapters_skip_disabled_sources() {
        let config = SourcesConfig {
            disabled: vec![SignalSource::Package, SignalSource::Executable],
            ..SourcesConfig::default()
        };
        let adapters = default_adapters(&config, Some(Path::new("/home/alice")));
        let sources: Vec<SignalSource> = adapters.iter().map(|a| a.source()).collect();
        assert_eq!(
            sources,
            vec![
                SignalSource::Flatpak,
                SignalSource::DesktopEntry,
                SignalSource::AppImage
            ]
        );
    }
}
