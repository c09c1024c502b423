use crate::alias::CandidateOrigin;
use crate::matcher::Classification;
use crate::signals::SignalSource;
use serde::Serialize;
use std::path::PathBuf;

/// One scanned folder. Created fresh on every scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderRecord {
    pub path: PathBuf,
    pub name: String,
    /// What to display: `computed`, unless the folder is marked Kept.
    pub classification: Classification,
    /// What the match engine decided before the Kept override.
    pub computed: Classification,
    pub matched_identifier: Option<String>,
    pub match_source: Option<SignalSource>,
    pub candidate_origin: Option<CandidateOrigin>,
}

/// Non-fatal conditions met during a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScanNote {
    SourceUnavailable { source: SignalSource, reason: String },
    ConfigConflict { folder: String, kept_rule: usize, ignored_rule: usize },
    Persistence { reason: String },
    KeptPurged { paths: Vec<PathBuf> },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    pub installed: usize,
    pub maybe_installed: usize,
    pub orphaned: usize,
    pub kept: usize,
    pub ignored: usize,
    pub total_scanned: usize,
    /// Folders that vanished or became unreadable mid-scan. Not part of
    /// `total_scanned`.
    pub skipped: usize,
    pub signal_entries: usize,
    pub notes: Vec<ScanNote>,
}

impl ScanSummary {
    pub(crate) fn record(&mut self, classification: Classification) {
        match classification {
            Classification::Installed => self.installed += 1,
            Classification::MaybeInstalled => self.maybe_installed += 1,
            Classification::Orphaned => self.orphaned += 1,
            Classification::Kept => self.kept += 1,
            Classification::Ignored => self.ignored += 1,
        }
        self.total_scanned += 1;
    }

    pub fn count(&self, classification: Classification) -> usize {
        match classification {
            Classification::Installed => self.installed,
            Classification::MaybeInstalled => self.maybe_installed,
            Classification::Orphaned => self.orphaned,
            Classification::Kept => self.kept,
            Classification::Ignored => self.ignored,
        }
    }

    /// Every scanned folder is in exactly one bucket.
    pub fn is_consistent(&self) -> bool {
        Classification::ALL
            .iter()
            .map(|classification| self.count(*classification))
            .sum::<usize>()
            == self.total_scanned
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub records: Vec<FolderRecord>,
    pub summary: ScanSummary,
}

impl ScanReport {
    pub fn in_category(&self, classification: Classification) -> impl Iterator<Item = &FolderRecord> {
        self.records
            .iter()
            .filter(move |record| record.classification == classification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts_stay_consistent() {
        let mut summary = ScanSummary::default();
        for classification in [
            Classification::Installed,
            Classification::Orphaned,
            Classification::Orphaned,
            Classification::Kept,
            Classification::Ignored,
        ] {
            summary.record(classification);
        }
        assert_eq!(summary.total_scanned, 5);
        assert_eq!(summary.count(Classification::Orphaned), 2);
        assert_eq!(summary.count(Classification::MaybeInstalled), 0);
        assert!(summary.is_consistent());
    }
}
