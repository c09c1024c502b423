pub mod walk;

pub use walk::{list_candidate_folders, FolderEntry, ScanRoot};
