use colored::*;
use orphan_sweep_core::{Classification, Explanation, FolderRecord, ScanNote, ScanReport};

/// Category colours: green, orange, red, blue, grey.
fn paint(text: &str, classification: Classification) -> ColoredString {
    match classification {
        Classification::Installed => text.truecolor(0x4c, 0xaf, 0x50),
        Classification::MaybeInstalled => text.truecolor(0xff, 0x98, 0x00),
        Classification::Orphaned => text.truecolor(0xf4, 0x43, 0x36),
        Classification::Kept => text.truecolor(0x21, 0x96, 0xf3),
        Classification::Ignored => text.dimmed(),
    }
}

fn describe(record: &FolderRecord) -> String {
    let mut detail = match (&record.matched_identifier, record.match_source) {
        (Some(identifier), Some(source)) => format!("{} ({})", identifier, source),
        _ => String::new(),
    };
    if record.classification == Classification::Kept && record.computed != Classification::Kept {
        if !detail.is_empty() {
            detail.push_str(", ");
        }
        detail.push_str(&format!("was {}", record.computed));
    }
    detail
}

pub fn print_report(report: &ScanReport, only: Option<Classification>) {
    let categories: Vec<Classification> = match only {
        Some(classification) => vec![classification],
        // ignored folders are only counted unless asked for
        None => Classification::ALL
            .into_iter()
            .filter(|c| *c != Classification::Ignored)
            .collect(),
    };

    for classification in categories {
        let count = report.summary.count(classification);
        println!(
            "\n{}",
            paint(&format!("{} ({})", classification, count), classification).bold()
        );
        for record in report.in_category(classification) {
            let detail = describe(record);
            if detail.is_empty() {
                println!("  {}", record.path.display());
            } else {
                println!("  {}  {}", record.path.display(), detail.dimmed());
            }
        }
    }

    print_summary(report);
}

fn print_summary(report: &ScanReport) {
    let summary = &report.summary;
    println!();
    println!(
        "{} scanned: {} installed, {} maybe, {} orphaned, {} kept, {} ignored",
        summary.total_scanned,
        paint(&summary.installed.to_string(), Classification::Installed),
        paint(&summary.maybe_installed.to_string(), Classification::MaybeInstalled),
        paint(&summary.orphaned.to_string(), Classification::Orphaned),
        paint(&summary.kept.to_string(), Classification::Kept),
        summary.ignored,
    );
    if summary.skipped > 0 {
        println!("{} folders vanished during the scan", summary.skipped);
    }

    for note in &summary.notes {
        let text = match note {
            ScanNote::SourceUnavailable { reason, .. } => reason.clone(),
            ScanNote::ConfigConflict {
                folder,
                kept_rule,
                ignored_rule,
            } => format!(
                "alias rule #{} for '{}' ignored, rule #{} takes precedence",
                ignored_rule, folder, kept_rule
            ),
            ScanNote::Persistence { reason } => format!("kept folders unavailable: {}", reason),
            ScanNote::KeptPurged { paths } => {
                format!("removed {} kept entries for missing folders", paths.len())
            }
        };
        println!("{} {}", "note:".yellow(), text);
    }

    println!(
        "{}",
        "Be careful deleting folders: matching is heuristic. Back up first.".red()
    );
}

pub fn print_explanation(explanation: &Explanation) {
    println!("{}  (normalized: {})", explanation.name.bold(), explanation.normalized);
    if explanation.ignored {
        println!("  {}", paint("ignored by filter", Classification::Ignored));
        return;
    }

    println!("  candidates, in order:");
    for candidate in &explanation.candidates {
        println!("    {} [{:?}]", candidate.identifier, candidate.origin);
    }

    if let Some(verdict) = &explanation.verdict {
        let label = paint(verdict.classification.label(), verdict.classification).bold();
        match (&verdict.matched_identifier, verdict.match_source) {
            (Some(identifier), Some(source)) => {
                println!("  => {} via '{}' ({})", label, identifier, source)
            }
            _ => println!("  => {}", label),
        }
    }
}
