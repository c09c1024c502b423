use crate::naming;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Maps a folder name to the identifiers of the application that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasRule {
    pub folder: String,
    /// Most specific first.
    pub candidates: Vec<String>,
}

impl AliasRule {
    pub fn new<I, S>(folder: &str, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            folder: folder.to_string(),
            candidates: candidates.into_iter().map(Into::into).collect(),
        }
    }
}

/// Folders whose owning application cannot be guessed from the name.
pub fn builtin_rules() -> Vec<AliasRule> {
    vec![
        AliasRule::new(".audacity-data", ["audacity"]),
        AliasRule::new(".SynologyDrive", ["synology-drive"]),
        AliasRule::new("Code - OSS", ["code-oss"]),
        AliasRule::new(".eID_klient", ["eidklient"]),
        AliasRule::new(".mozilla", ["mozilla"]),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateOrigin {
    Alias,
    Heuristic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    /// Normalized identifier.
    pub identifier: String,
    pub origin: CandidateOrigin,
}

/// Two rules targeting the same normalized folder name. The earlier rule
/// (by configuration order) is the one in effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AliasConflict {
    pub folder: String,
    pub kept_rule: usize,
    pub ignored_rule: usize,
}

#[derive(Debug, Clone, Default)]
pub struct AliasResolver {
    rules: HashMap<String, (usize, Vec<String>)>,
    conflicts: Vec<AliasConflict>,
}

impl AliasResolver {
    pub fn new(rules: &[AliasRule]) -> Self {
        let mut resolver = AliasResolver::default();

        for (position, rule) in rules.iter().enumerate() {
            let key = naming::normalize(&rule.folder);
            if key.is_empty() {
                warn!("Alias rule #{} has an empty folder name, skipping", position);
                continue;
            }

            if let Some((kept_rule, _)) = resolver.rules.get(&key) {
                warn!(
                    "Alias rule #{} for '{}' conflicts with rule #{}; keeping the earlier one",
                    position, rule.folder, kept_rule
                );
                resolver.conflicts.push(AliasConflict {
                    folder: rule.folder.clone(),
                    kept_rule: *kept_rule,
                    ignored_rule: position,
                });
                continue;
            }

            let candidates = rule
                .candidates
                .iter()
                .map(|candidate| naming::normalize(candidate))
                .filter(|candidate| !candidate.is_empty())
                .collect();
            resolver.rules.insert(key, (position, candidates));
        }

        resolver
    }

    pub fn conflicts(&self) -> &[AliasConflict] {
        &self.conflicts
    }

    /// Ordered candidate identifiers for a folder: alias hints first, then the
    /// normalized name and its stripped variants. No duplicates.
    pub fn resolve(&self, folder_name: &str) -> Vec<Candidate> {
        let normalized = naming::normalize(folder_name);
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        let mut push = |identifier: String, origin: CandidateOrigin| {
            if !identifier.is_empty() && seen.insert(identifier.clone()) {
                candidates.push(Candidate { identifier, origin });
            }
        };

        if let Some((_, aliases)) = self.rules.get(&normalized) {
            for alias in aliases {
                push(alias.clone(), CandidateOrigin::Alias);
            }
        }

        if normalized.is_empty() {
            return candidates;
        }

        let versionless = naming::strip_version_suffix(&normalized);
        let base = versionless.clone().unwrap_or_else(|| normalized.clone());
        let noiseless = naming::strip_noise_suffix(&base);

        push(normalized, CandidateOrigin::Heuristic);
        if let Some(versionless) = versionless {
            push(versionless, CandidateOrigin::Heuristic);
        }
        if let Some(noiseless) = noiseless {
            push(noiseless, CandidateOrigin::Heuristic);
        }

        candidates
    }
}
