use clap::{Parser, Subcommand, ValueEnum};
use orphan_sweep_core::Classification;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "orphan-sweep")]
#[command(about = "Find config folders left behind by uninstalled applications", long_about = None)]
pub struct Cli {
    /// Additional configuration file (toml, yaml or json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan the configured folders and classify them
    Scan {
        /// Only list folders in this category
        #[arg(long, value_enum)]
        category: Option<CategoryArg>,
        /// Print records and summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show how a single folder name is matched
    Explain {
        name: String,
    },
    /// Mark a folder as kept so it is never reported as orphaned
    Keep {
        path: PathBuf,
    },
    /// Remove the kept mark from a folder
    Unkeep {
        path: PathBuf,
    },
    /// List kept folders
    Kept {
        /// Drop entries whose folder no longer exists
        #[arg(long)]
        purge_missing: bool,
    },
    /// Print configuration values
    PrintConfig,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CategoryArg {
    Installed,
    Maybe,
    Orphaned,
    Kept,
    Ignored,
}

impl From<CategoryArg> for Classification {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Installed => Classification::Installed,
            CategoryArg::Maybe => Classification::MaybeInstalled,
            CategoryArg::Orphaned => Classification::Orphaned,
            CategoryArg::Kept => Classification::Kept,
            CategoryArg::Ignored => Classification::Ignored,
        }
    }
}
