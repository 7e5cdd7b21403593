//! i18n-check command line front end.
//!
//! Walks an input folder, dispatches every recognized source file to the
//! analysis engine, prints the tab-delimited report to stdout, and the
//! summary plus analysis log to stderr.

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use i18n_check_core::{
    reviewer_kind_for, BatchAnalyzer, IgnoreLists, ProgressHandler, ReviewOptions,
};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "i18n-check",
    version,
    about = "Internationalization/localization analysis system"
)]
struct Cli {
    /// The folder to analyze
    input: PathBuf,

    /// Folder(s) to ignore
    #[arg(short = 'i', long = "ignore", value_name = "FOLDER")]
    ignore: Vec<PathBuf>,
}

/// Exit code when the input path does not exist. Argument parse failures
/// exit with clap's usage error code (2).
const EXIT_MISSING_INPUT: i32 = 3;

/// Font faces commonly installed on end-user systems; registering them
/// keeps bare face-name strings out of the findings.
const COMMON_FONT_FACES: &[&str] = &[
    "Arial",
    "Helvetica",
    "Times New Roman",
    "Courier New",
    "Verdana",
    "Tahoma",
    "Calibri",
    "Cambria",
    "Consolas",
    "Georgia",
    "Comic Sans MS",
    "Impact",
    "Lucida Console",
    "Segoe UI",
    "MS Shell Dlg",
    "MS Shell Dlg 2",
];

struct ConsoleProgress {
    total: AtomicUsize,
}

impl ConsoleProgress {
    fn new() -> Self {
        Self {
            total: AtomicUsize::new(0),
        }
    }
}

impl ProgressHandler for ConsoleProgress {
    fn on_start(&self, total: usize) {
        self.total.store(total, Ordering::SeqCst);
    }

    fn on_progress(&self, index: usize, path: &Path) -> bool {
        let total = self.total.load(Ordering::SeqCst);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        eprintln!("Processed {index} of {total} files ({name})");
        true
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(error) => {
            eprintln!("{}", format!("error: {error:#}").red());
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    if !cli.input.exists() {
        eprintln!(
            "{}",
            format!("Input path does not exist: {}", cli.input.display()).red()
        );
        return Ok(EXIT_MISSING_INPUT);
    }

    eprintln!("Searching for files to analyze...");
    let files = gather_files(&cli.input, &cli.ignore)?;
    tracing::debug!(count = files.len(), "input files gathered");

    let options = ReviewOptions::default();
    let (mut lists, warnings) = IgnoreLists::build(&options);
    for warning in &warnings {
        tracing::warn!("{warning}");
    }
    lists.add_font_names(COMMON_FONT_FACES.iter().copied());

    let mut analyzer = BatchAnalyzer::new(options, Arc::new(lists));
    analyzer.analyze(&files, &ConsoleProgress::new());

    eprintln!("Reviewing strings...");
    print!("{}", analyzer.format_results(true));

    let summary = analyzer.format_summary(false);
    let mut summary_lines = summary.lines();
    if let Some(first) = summary_lines.next() {
        eprintln!("{}", first.bold());
    }
    for line in summary_lines {
        eprintln!("{line}");
    }
    for line in analyzer.get_log_report().lines() {
        tracing::debug!("{line}");
    }

    Ok(0)
}

/// Recursively collect analyzable files under `root`, pruning the subtrees
/// of every `--ignore` folder. The list is sorted so reports are stable
/// across runs and platforms.
fn gather_files(root: &Path, ignored: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let excluded: Vec<PathBuf> = ignored
        .iter()
        .map(|folder| {
            std::fs::canonicalize(folder)
                .with_context(|| format!("ignored folder not found: {}", folder.display()))
        })
        .collect::<Result<_>>()?;

    let mut files = Vec::new();
    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .filter_entry(move |entry| {
            if entry.file_type().is_some_and(|ft| ft.is_dir()) {
                let canonical = std::fs::canonicalize(entry.path())
                    .unwrap_or_else(|_| entry.path().to_path_buf());
                return !excluded.iter().any(|ex| canonical.starts_with(ex));
            }
            true
        })
        .build();

    for entry in walker.filter_map(|entry| entry.ok()) {
        let path = entry.path();
        if path.is_file() && reviewer_kind_for(path).is_some() {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}
