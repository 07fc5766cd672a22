//! Command-line driver for the landscape core.
//!
//! # Responsibility
//! - Read JSON landscape descriptions, run them through one registry in the
//!   given order and print the committed result.
//! - Keep output deterministic for a given input and seed.

use clap::Parser;
use landscape_core::{
    default_log_level, init_logging, LandscapeDescription, LandscapeRegistry, LogLevel,
    ProcessOutcome,
};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "landscape")]
#[command(about = "Reconcile, lay out and search landscape descriptions")]
#[command(version)]
struct Args {
    /// JSON description files, applied in order
    #[arg(value_name = "FILE", required = true)]
    descriptions: Vec<PathBuf>,

    /// Search query evaluated against the last committed landscape
    #[arg(short, long)]
    query: Option<String>,

    /// trace|debug|info|warn|error
    #[arg(long)]
    log_level: Option<String>,

    /// Absolute directory for rotating log files; stderr when omitted
    #[arg(long)]
    log_dir: Option<String>,

    /// Overrides the layout seed of every description
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let level = args.log_level.as_deref().unwrap_or(default_log_level());
    if let Err(err) = init_logging(level, args.log_dir.as_deref()) {
        eprintln!("logging disabled: {err}");
    }

    match run(&args) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("event=cli_run module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<String, String> {
    let registry = LandscapeRegistry::new();
    let mut output = String::new();
    let mut last = None;

    for path in &args.descriptions {
        let mut description = read_description(path)?;
        if let Some(seed) = args.seed {
            description.config.layout.seed = Some(seed);
        }
        let outcome = registry
            .reconcile(description)
            .map_err(|err| format!("{}: {err}", path.display()))?;
        render_outcome(&mut output, &outcome);
        last = Some(outcome);
    }

    let Some(last) = last else {
        return Err("no description given".to_string());
    };
    render_layout(&mut output, &last);
    if let Some(query) = &args.query {
        let identifier = last.snapshot.landscape.identifier();
        let hits = registry.search(identifier, query);
        let _ = writeln!(output, "search {query:?}: {} hits", hits.len());
        for fqi in hits {
            let _ = writeln!(output, "  {fqi}");
        }
    }
    Ok(output)
}

fn read_description(path: &Path) -> Result<LandscapeDescription, String> {
    let raw = std::fs::read_to_string(path)
        .map_err(|err| format!("failed to read `{}`: {err}", path.display()))?;
    serde_json::from_str(&raw).map_err(|err| format!("invalid description `{}`: {err}", path.display()))
}

fn render_outcome(output: &mut String, outcome: &ProcessOutcome) {
    let landscape = &outcome.snapshot.landscape;
    let report = &outcome.report;
    let _ = writeln!(
        output,
        "landscape {}: {} items in {} groups (added {}, updated {}, unchanged {}, removed {})",
        landscape.identifier(),
        landscape.item_count(),
        landscape.group_count(),
        report.added.len(),
        report.updated.len(),
        report.unchanged.len(),
        report.removed.len()
    );
    for warning in outcome.log.entries() {
        if warning.level == LogLevel::Warn {
            let _ = writeln!(output, "  warning: {}", warning.message);
        }
    }
}

fn render_layout(output: &mut String, outcome: &ProcessOutcome) {
    let snapshot = &outcome.snapshot;
    let bounds = snapshot.layout.bounds();
    let _ = writeln!(output, "layout {:.1}x{:.1}", bounds.width, bounds.height);
    for (component, rect) in snapshot.layout.iter() {
        let _ = writeln!(
            output,
            "  {component} at ({:.1}, {:.1}) size {:.1}x{:.1}",
            rect.x, rect.y, rect.width, rect.height
        );
    }
}

#[cfg(test)]
mod tests {
    use super::{run, Args};
    use std::path::PathBuf;

    fn write(dir: &tempfile::TempDir, name: &str, json: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, json).unwrap();
        path
    }

    fn args(descriptions: Vec<PathBuf>, query: Option<&str>) -> Args {
        Args {
            descriptions,
            query: query.map(str::to_string),
            log_level: None,
            log_dir: None,
            seed: Some(7),
        }
    }

    #[test]
    fn runs_descriptions_in_order_and_searches_last_state() {
        let dir = tempfile::tempdir().unwrap();
        let first = write(
            &dir,
            "first.json",
            r#"{"identifier":"acme","items":[{"identifier":"web","name":"Arnold"},{"identifier":"db","group":"data"}]}"#,
        );
        let second = write(
            &dir,
            "second.json",
            r#"{"identifier":"acme","partial":true,"items":[{"identifier":"cache","group":"data"}]}"#,
        );

        let output = run(&args(vec![first, second], Some("arn"))).unwrap();

        assert!(output.contains("landscape acme: 2 items"));
        assert!(output.contains("landscape acme: 3 items"));
        assert!(output.contains("search \"arn\": 1 hits"));
        assert!(output.contains("acme/Common/web"));
    }

    #[test]
    fn same_seed_gives_same_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "landscape.json",
            r#"{"identifier":"acme","items":[{"identifier":"a","group":"x"},{"identifier":"b","group":"y","relations":[{"target":"a"}]}]}"#,
        );

        let first = run(&args(vec![path.clone()], None)).unwrap();
        let second = run(&args(vec![path], None)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn reports_unreadable_and_invalid_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(run(&args(vec![missing], None))
            .unwrap_err()
            .contains("failed to read"));

        let invalid = write(&dir, "invalid.json", "{not json");
        assert!(run(&args(vec![invalid], None))
            .unwrap_err()
            .contains("invalid description"));
    }
}
