use crate::alias::{Candidate, CandidateOrigin};
use crate::naming;
use crate::signals::{SignalIndex, SignalSource};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Installed,
    MaybeInstalled,
    Orphaned,
    Kept,
    Ignored,
}

impl Classification {
    pub const ALL: [Classification; 5] = [
        Classification::Installed,
        Classification::MaybeInstalled,
        Classification::Orphaned,
        Classification::Kept,
        Classification::Ignored,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Classification::Installed => "Installed",
            Classification::MaybeInstalled => "Maybe Installed",
            Classification::Orphaned => "Orphaned",
            Classification::Kept => "Kept",
            Classification::Ignored => "Ignored",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of matching one folder against the signal snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub classification: Classification,
    pub matched_identifier: Option<String>,
    pub match_source: Option<SignalSource>,
    pub candidate_origin: Option<CandidateOrigin>,
}

impl Verdict {
    fn orphaned() -> Self {
        Self {
            classification: Classification::Orphaned,
            matched_identifier: None,
            match_source: None,
            candidate_origin: None,
        }
    }
}

pub struct MatchEngine<'a> {
    index: &'a SignalIndex,
    partial_min_len: usize,
}

impl<'a> MatchEngine<'a> {
    pub fn new(index: &'a SignalIndex, partial_min_len: usize) -> Self {
        Self {
            index,
            partial_min_len,
        }
    }

    /// Two passes over the candidates, in order: exact membership first
    /// (Installed), then containment (MaybeInstalled). First hit wins in each
    /// pass; no hit at all is Orphaned.
    pub fn classify(&self, folder_name: &str, candidates: &[Candidate]) -> Verdict {
        for candidate in candidates {
            if let Some(entry) = self.index.lookup(&candidate.identifier) {
                debug!(
                    "{}: exact match '{}' ({})",
                    folder_name, entry.identifier, entry.source
                );
                return Verdict {
                    classification: Classification::Installed,
                    matched_identifier: Some(entry.identifier.clone()),
                    match_source: Some(entry.source),
                    candidate_origin: Some(candidate.origin),
                };
            }
        }

        for candidate in candidates {
            let hit = self.index.iter().find(|(key, _)| {
                naming::partial_match(&candidate.identifier, key, self.partial_min_len)
            });
            if let Some((_, entry)) = hit {
                debug!(
                    "{}: partial match '{}' ({}) via '{}'",
                    folder_name, entry.identifier, entry.source, candidate.identifier
                );
                return Verdict {
                    classification: Classification::MaybeInstalled,
                    matched_identifier: Some(entry.identifier.clone()),
                    match_source: Some(entry.source),
                    candidate_origin: Some(candidate.origin),
                };
            }
        }

        debug!("{}: no match", folder_name);
        Verdict::orphaned()
    }
}
