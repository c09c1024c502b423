use crate::alias::{self, AliasRule};
use crate::naming;
use crate::paths;
use crate::scanner::ScanRoot;
use crate::signals::SignalSource;
use config::{Config, ConfigError, Environment, File as ConfigFile};
use std::collections::HashSet;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const APP_DIR_NAME: &str = "orphan-sweep";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub roots: Vec<RootConfig>,
    pub ignore: IgnoreConfig,
    /// Apply the built-in alias rules after `aliases`.
    pub builtin_aliases: bool,
    /// User alias rules. A rule for a folder that also has a built-in rule
    /// replaces the built-in one.
    pub aliases: Vec<AliasRule>,
    pub sources: SourcesConfig,
    pub matching: MatchConfig,
    pub kept: KeptConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootConfig {
    pub path: String,
    /// Only consider dot-directories of this root.
    #[serde(default)]
    pub hidden_only: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnoreConfig {
    pub builtin: bool,
    /// Folder names or glob patterns, matched case-insensitively.
    pub names: Vec<String>,
    /// Path globs; matching folders and everything below them are ignored.
    pub paths: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub package_commands: Vec<Vec<String>>,
    pub flatpak_dirs: Vec<String>,
    pub desktop_dirs: Vec<String>,
    pub appimage_dirs: Vec<String>,
    /// Empty means `$PATH`.
    pub path_dirs: Vec<String>,
    pub disabled: Vec<SignalSource>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub partial_min_len: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeptBackendKind {
    Sqlite,
    Text,
}

/// What to do with kept entries whose folder no longer exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeptRetention {
    Retain,
    PurgeMissing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeptConfig {
    pub backend: KeptBackendKind,
    pub path: String,
    pub retention: KeptRetention,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            roots: vec![
                RootConfig {
                    path: "~/.config".to_string(),
                    hidden_only: false,
                },
                RootConfig {
                    path: "~/.local/share".to_string(),
                    hidden_only: false,
                },
                RootConfig {
                    path: "~".to_string(),
                    hidden_only: true,
                },
            ],
            ignore: IgnoreConfig::default(),
            builtin_aliases: true,
            aliases: Vec::new(),
            sources: SourcesConfig::default(),
            matching: MatchConfig::default(),
            kept: KeptConfig::default(),
        }
    }
}

impl Default for IgnoreConfig {
    fn default() -> Self {
        Self {
            builtin: true,
            names: Vec::new(),
            paths: Vec::new(),
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            package_commands: vec![
                strings(&["pacman", "-Qq"]),
                strings(&["dpkg-query", "-W", "-f=${Package}\\n"]),
                strings(&["rpm", "-qa", "--qf", "%{NAME}\\n"]),
            ],
            flatpak_dirs: strings(&["/var/lib/flatpak/app", "~/.local/share/flatpak/app"]),
            desktop_dirs: strings(&[
                "/usr/share/applications",
                "/usr/local/share/applications",
                "~/.local/share/applications",
                "/var/lib/flatpak/exports/share/applications",
                "~/.local/share/flatpak/exports/share/applications",
                "/var/lib/snapd/desktop/applications",
            ]),
            appimage_dirs: strings(&["~/Applications", "~/AppImages", "~/.local/bin"]),
            path_dirs: Vec::new(),
            disabled: Vec::new(),
        }
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self { partial_min_len: 4 }
    }
}

impl Default for KeptConfig {
    fn default() -> Self {
        Self {
            backend: KeptBackendKind::Sqlite,
            path: format!("~/.local/share/{}/kept.db", APP_DIR_NAME),
            retention: KeptRetention::Retain,
        }
    }
}

impl AppConfig {
    pub fn scan_roots(&self, home: Option<&Path>) -> Vec<ScanRoot> {
        self.roots
            .iter()
            .map(|root| ScanRoot {
                path: paths::expand_home(&root.path, home),
                hidden_only: root.hidden_only,
            })
            .collect()
    }

    pub fn kept_path(&self, home: Option<&Path>) -> PathBuf {
        paths::expand_home(&self.kept.path, home)
    }

    /// User rules in configuration order, followed by the built-in rules for
    /// folders no user rule covers.
    pub fn alias_rules(&self) -> Vec<AliasRule> {
        let mut rules = self.aliases.clone();
        if self.builtin_aliases {
            let covered: HashSet<String> = self
                .aliases
                .iter()
                .map(|rule| naming::normalize(&rule.folder))
                .collect();
            rules.extend(
                alias::builtin_rules()
                    .into_iter()
                    .filter(|rule| !covered.contains(&naming::normalize(&rule.folder))),
            );
        }
        rules
    }
}

/// Environment keys that take a comma separated list.
const LIST_ENV_KEYS: &[&str] = &[
    "ignore.names",
    "ignore.paths",
    "sources.flatpak_dirs",
    "sources.desktop_dirs",
    "sources.appimage_dirs",
    "sources.path_dirs",
    "sources.disabled",
];

/// `ORPHAN_SWEEP__SECTION__KEY=value`; list keys split on `,`.
fn environment() -> Environment {
    LIST_ENV_KEYS.iter().fold(
        Environment::with_prefix("ORPHAN_SWEEP")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .list_separator(","),
        |env, key| env.with_list_parse_key(key),
    )
}

/// Load configuration: built-in defaults, then
/// `$XDG_CONFIG_HOME/orphan-sweep/Config.*`, then `./Config.*`, then an
/// explicit file if given, then `ORPHAN_SWEEP__*` environment variables.
pub fn load_configuration(explicit: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let user_config = directories::BaseDirs::new()
        .map(|dirs| dirs.config_dir().join(APP_DIR_NAME).join("Config"));
    load_from(user_config.as_deref(), explicit, environment())
}

fn load_from(
    user_config: Option<&Path>,
    explicit: Option<&Path>,
    env: Environment,
) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder().add_source(Config::try_from(&AppConfig::default())?);

    if let Some(user_config) = user_config {
        builder = builder
            .add_source(ConfigFile::with_name(&user_config.to_string_lossy()).required(false));
    }
    builder = builder.add_source(ConfigFile::with_name("Config").required(false));
    if let Some(explicit) = explicit {
        builder = builder.add_source(ConfigFile::from(explicit).required(true));
    }

    builder
        .add_source(env)
        .build()?
        .try_deserialize::<AppConfig>()
}
