use crate::alias::{AliasResolver, Candidate};
use crate::config::{AppConfig, KeptRetention};
use crate::error::Error;
use crate::ignore::IgnoreFilter;
use crate::kept::KeptStore;
use crate::matcher::{Classification, MatchEngine, Verdict};
use crate::model::{FolderRecord, ScanNote, ScanReport, ScanSummary};
use crate::naming;
use crate::paths;
use crate::progress::ProgressReporter;
use crate::scanner::{self, ScanRoot};
use crate::signals::{self, SignalAdapter, SignalIndex};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

pub struct ScanEngine {
    config: AppConfig,
    home: Option<PathBuf>,
    adapters: Option<Vec<Box<dyn SignalAdapter>>>,
    cancel: Option<Arc<AtomicBool>>,
}

/// Why one folder name classifies the way it does.
#[derive(Debug, Clone, Serialize)]
pub struct Explanation {
    pub name: String,
    pub normalized: String,
    pub ignored: bool,
    pub candidates: Vec<Candidate>,
    pub verdict: Option<Verdict>,
}

impl ScanEngine {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            home: paths::home_dir(),
            adapters: None,
            cancel: None,
        }
    }

    /// Resolve `~` in configured paths against `home` instead of the user's
    /// real home directory.
    pub fn with_home(mut self, home: PathBuf) -> Self {
        self.home = Some(home);
        self
    }

    /// Replace the configured signal sources.
    pub fn with_adapters(mut self, adapters: Vec<Box<dyn SignalAdapter>>) -> Self {
        self.adapters = Some(adapters);
        self
    }

    /// Checked between folders; when set, the scan stops and delivers nothing.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn home(&self) -> Option<&std::path::Path> {
        self.home.as_deref()
    }

    pub fn roots(&self) -> Vec<ScanRoot> {
        self.config.scan_roots(self.home.as_deref())
    }

    /// Query every signal source once. The returned index is the immutable
    /// snapshot all folders of one scan are classified against.
    pub fn collect_signals(&self) -> (SignalIndex, Vec<ScanNote>) {
        match &self.adapters {
            Some(adapters) => SignalIndex::collect(adapters),
            None => {
                let adapters = signals::default_adapters(&self.config.sources, self.home.as_deref());
                SignalIndex::collect(&adapters)
            }
        }
    }

    /// Scan the configured roots.
    pub fn scan(
        &self,
        kept: &mut KeptStore,
        reporter: &dyn ProgressReporter,
    ) -> Result<ScanReport, Error> {
        self.scan_roots(&self.roots(), kept, reporter)
    }

    /// Classify every immediate subdirectory of `roots`:
    /// 1. Collect all signal sources (barrier before any classification)
    /// 2. Enumerate folders, apply the ignore filter
    /// 3. Alias resolution, matching, then the Kept override per folder
    pub fn scan_roots(
        &self,
        roots: &[ScanRoot],
        kept: &mut KeptStore,
        reporter: &dyn ProgressReporter,
    ) -> Result<ScanReport, Error> {
        let scan_start = Instant::now();
        let resolver = AliasResolver::new(&self.config.alias_rules());
        let ignore = IgnoreFilter::new(&self.config.ignore, self.home.as_deref())?;

        let mut summary = ScanSummary::default();
        summary
            .notes
            .extend(resolver.conflicts().iter().map(|conflict| ScanNote::ConfigConflict {
                folder: conflict.folder.clone(),
                kept_rule: conflict.kept_rule,
                ignored_rule: conflict.ignored_rule,
            }));
        if let Some(reason) = kept.load_error() {
            summary.notes.push(ScanNote::Persistence {
                reason: reason.to_string(),
            });
        }

        // Phase 1: signals
        info!("Collecting installed software signals...");
        reporter.on_signals_start();
        let signals_start = Instant::now();
        let (index, source_notes) = self.collect_signals();
        summary.notes.extend(source_notes);
        summary.signal_entries = index.len();
        reporter.on_signals_complete(index.len(), signals_start.elapsed().as_secs_f64());
        debug!(
            "Signals collected in {:.2}s: {} entries",
            signals_start.elapsed().as_secs_f64(),
            index.len()
        );

        // Phase 2: classify
        let folders: Vec<_> = roots
            .iter()
            .flat_map(|root| scanner::list_candidate_folders(root, roots))
            .collect();
        let total = folders.len();
        info!("Classifying {} folders...", total);
        reporter.on_classify_start(total);

        let matcher = MatchEngine::new(&index, self.config.matching.partial_min_len);
        let mut records = Vec::with_capacity(total);

        for (position, folder) in folders.into_iter().enumerate() {
            if self
                .cancel
                .as_ref()
                .is_some_and(|flag| flag.load(Ordering::Relaxed))
            {
                info!("Scan cancelled after {} of {} folders", position, total);
                return Err(Error::Cancelled);
            }

            if !folder.path.is_dir() {
                debug!("{} vanished during scan, skipping", folder.path.display());
                summary.skipped += 1;
                continue;
            }

            let record = if ignore.should_ignore_path(&folder.path) {
                debug!("{}: ignored", folder.name);
                FolderRecord {
                    path: folder.path,
                    name: folder.name,
                    classification: Classification::Ignored,
                    computed: Classification::Ignored,
                    matched_identifier: None,
                    match_source: None,
                    candidate_origin: None,
                }
            } else {
                let candidates = resolver.resolve(&folder.name);
                let verdict = matcher.classify(&folder.name, &candidates);
                let classification = if kept.is_kept(&folder.path) {
                    Classification::Kept
                } else {
                    verdict.classification
                };
                FolderRecord {
                    path: folder.path,
                    name: folder.name,
                    classification,
                    computed: verdict.classification,
                    matched_identifier: verdict.matched_identifier,
                    match_source: verdict.match_source,
                    candidate_origin: verdict.candidate_origin,
                }
            };

            summary.record(record.classification);
            reporter.on_folder_classified(position + 1, total, &record.path.to_string_lossy());
            records.push(record);
        }

        if self.config.kept.retention == KeptRetention::PurgeMissing {
            match kept.purge_missing() {
                Ok(paths) if !paths.is_empty() => {
                    info!("Removed {} kept entries for missing folders", paths.len());
                    summary.notes.push(ScanNote::KeptPurged { paths });
                }
                Ok(_) => {}
                Err(err) => {
                    warn!("Could not purge stale kept entries: {}", err);
                    summary.notes.push(ScanNote::Persistence {
                        reason: err.to_string(),
                    });
                }
            }
        }

        let duration = scan_start.elapsed().as_secs_f64();
        reporter.on_scan_complete(summary.total_scanned, duration);
        info!(
            "Scan complete in {:.2}s: {} installed, {} maybe, {} orphaned, {} kept, {} ignored",
            duration,
            summary.installed,
            summary.maybe_installed,
            summary.orphaned,
            summary.kept,
            summary.ignored,
        );

        Ok(ScanReport { records, summary })
    }

    /// Run one folder name through the ignore filter, alias resolver and
    /// match engine against `index`.
    pub fn explain(&self, folder_name: &str, index: &SignalIndex) -> Result<Explanation, Error> {
        let ignore = IgnoreFilter::new(&self.config.ignore, self.home.as_deref())?;
        let resolver = AliasResolver::new(&self.config.alias_rules());
        let candidates = resolver.resolve(folder_name);
        let ignored = ignore.should_ignore(folder_name);
        let verdict = (!ignored).then(|| {
            MatchEngine::new(index, self.config.matching.partial_min_len)
                .classify(folder_name, &candidates)
        });

        Ok(Explanation {
            name: folder_name.to_string(),
            normalized: naming::normalize(folder_name),
            ignored,
            candidates,
            verdict,
        })
    }
}
