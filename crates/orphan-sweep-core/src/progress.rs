/// Trait for reporting scan progress.
///
/// The CLI implements it with indicatif; library callers can pass
/// [`SilentReporter`]. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_signals_start(&self) {}
    fn on_signals_complete(&self, _entries: usize, _duration_secs: f64) {}
    fn on_classify_start(&self, _total_folders: usize) {}
    fn on_folder_classified(&self, _done: usize, _total: usize, _current_path: &str) {}
    fn on_scan_complete(&self, _total_scanned: usize, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
