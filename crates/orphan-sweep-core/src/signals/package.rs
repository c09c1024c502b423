use super::{SignalAdapter, SignalSource};
use crate::error::Error;
use std::collections::BTreeSet;
use std::process::{Command, Stdio};
use tracing::debug;

/// Native package manager database, queried through its CLI. The configured
/// commands are tried in order; the first one that exits successfully wins.
pub struct PackageAdapter {
    commands: Vec<Vec<String>>,
}

impl PackageAdapter {
    pub fn new(commands: Vec<Vec<String>>) -> Self {
        Self { commands }
    }
}

impl SignalAdapter for PackageAdapter {
    fn source(&self) -> SignalSource {
        SignalSource::Package
    }

    fn try_collect(&self) -> Result<BTreeSet<String>, Error> {
        for argv in &self.commands {
            let Some((program, args)) = argv.split_first() else {
                continue;
            };

            let output = match Command::new(program)
                .args(args)
                .stdin(Stdio::null())
                .stderr(Stdio::null())
                .output()
            {
                Ok(output) => output,
                Err(err) => {
                    debug!("Package command '{}' not usable: {}", program, err);
                    continue;
                }
            };

            if !output.status.success() {
                debug!("Package command '{}' exited with {}", program, output.status);
                continue;
            }

            let packages = parse_package_list(&String::from_utf8_lossy(&output.stdout));
            debug!("Package command '{}' listed {} packages", program, packages.len());
            return Ok(packages);
        }

        Err(Error::SourceUnavailable {
            signal: SignalSource::Package,
            reason: "no package manager command succeeded".to_string(),
        })
    }
}

fn parse_package_list(stdout: &str) -> BTreeSet<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        // `pacman -Q` without -q prints "name version"
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect()
}
