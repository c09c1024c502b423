pub mod alias;
pub mod config;
pub mod engine;
pub mod error;
pub mod ignore;
pub mod kept;
pub mod matcher;
pub mod model;
pub mod naming;
pub mod paths;
pub mod progress;
pub mod scanner;
pub mod signals;

pub use alias::{AliasResolver, AliasRule, Candidate, CandidateOrigin};
pub use config::AppConfig;
pub use engine::{Explanation, ScanEngine};
pub use error::Error;
pub use ignore::IgnoreFilter;
pub use kept::KeptStore;
pub use matcher::{Classification, MatchEngine, Verdict};
pub use model::{FolderRecord, ScanNote, ScanReport, ScanSummary};
pub use progress::{ProgressReporter, SilentReporter};
pub use signals::{SignalAdapter, SignalIndex, SignalSource, StaticAdapter};
