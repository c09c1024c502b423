mod commands;
mod logging;
mod progress;
mod report;

use std::process;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands};
use dotenv::dotenv;
use orphan_sweep_core::{AppConfig, KeptStore, ScanEngine};
use progress::CliReporter;
use tracing::error;

fn main() {
    dotenv().ok();

    let _guard = logging::init_logger();

    let args = Cli::parse();

    let config = match orphan_sweep_core::config::load_configuration(args.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let result = match args.command {
        Some(Commands::Scan { category, json }) => {
            run_scan(&config, category.map(Into::into), json)
        }
        Some(Commands::Explain { name }) => run_explain(&config, &name),
        Some(Commands::Keep { path }) => run_set_kept(&config, &path, true),
        Some(Commands::Unkeep { path }) => run_set_kept(&config, &path, false),
        Some(Commands::Kept { purge_missing }) => run_list_kept(&config, purge_missing),
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:#?}", config);
            Ok(())
        }
        None => {
            let _ = Cli::command().print_long_help();
            Ok(())
        }
    };

    if let Err(err) = result {
        error!("Error: {:#}", err);
        process::exit(1);
    }
}

fn open_kept_store(engine: &ScanEngine) -> KeptStore {
    KeptStore::from_config(&engine.config().kept, engine.home())
}

fn run_scan(
    config: &AppConfig,
    category: Option<orphan_sweep_core::Classification>,
    json: bool,
) -> anyhow::Result<()> {
    let engine = ScanEngine::new(config.clone());
    let mut kept = open_kept_store(&engine);

    let report = if json {
        engine.scan(&mut kept, &orphan_sweep_core::SilentReporter)?
    } else {
        engine.scan(&mut kept, &CliReporter::new())?
    };

    if json {
        let output = serde_json::to_string_pretty(&report).context("serializing scan report")?;
        println!("{}", output);
    } else {
        report::print_report(&report, category);
    }
    Ok(())
}

fn run_explain(config: &AppConfig, name: &str) -> anyhow::Result<()> {
    let engine = ScanEngine::new(config.clone());
    let (index, notes) = engine.collect_signals();
    for note in &notes {
        tracing::warn!("{:?}", note);
    }
    let explanation = engine.explain(name, &index)?;
    report::print_explanation(&explanation);
    Ok(())
}

fn run_set_kept(config: &AppConfig, path: &std::path::Path, kept: bool) -> anyhow::Result<()> {
    let engine = ScanEngine::new(config.clone());
    let mut store = open_kept_store(&engine);
    if let Some(reason) = store.load_error() {
        anyhow::bail!("kept store unavailable: {}", reason);
    }

    store
        .set_kept(path, kept)
        .with_context(|| format!("updating kept mark for {}", path.display()))?;

    let absolute = orphan_sweep_core::paths::absolutize(path);
    if kept {
        println!("{} {}", "Kept".blue().bold(), absolute.display());
    } else {
        println!("{} {}", "Unkept".bold(), absolute.display());
    }
    Ok(())
}

fn run_list_kept(config: &AppConfig, purge_missing: bool) -> anyhow::Result<()> {
    let engine = ScanEngine::new(config.clone());
    let mut store = open_kept_store(&engine);
    if let Some(reason) = store.load_error() {
        anyhow::bail!("kept store unavailable: {}", reason);
    }

    if purge_missing {
        let purged = store.purge_missing()?;
        for path in &purged {
            println!("{} {}", "Removed".red(), path.display());
        }
    }

    for path in store.kept_paths() {
        let marker = if path.is_dir() { "" } else { " (missing)" };
        println!("{}{}", path.display(), marker.dimmed());
    }
    println!("{} kept folders", store.len());
    Ok(())
}
