//! Batch analysis: fan input files out to the language reviewers,
//! aggregate their buckets, and render the report, summary, and log.

use crate::encoding;
use crate::error::AnalyzeError;
use crate::file_types::{reviewer_kind_for, ReviewerKind};
use crate::findings::StringInfo;
use crate::options::{IgnoreLists, ReviewOptions};
use crate::pseudo::{self, PseudoMethod};
use crate::reviewers::{
    make_reviewer, CppReviewer, CsharpReviewer, PoReviewer, RcReviewer, Reviewer,
};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Progress callbacks for a batch run.
///
/// `on_progress` returning `false` is a binding cancellation signal: the
/// analyzer stops reading new files and returns promptly with the results
/// accumulated so far marked partial. Callbacks are serialized with a lock,
/// so implementations never race with themselves.
pub trait ProgressHandler: Sync {
    fn on_start(&self, _total: usize) {}

    /// `index` is 1-based. Return `false` to cancel.
    fn on_progress(&self, _index: usize, _path: &Path) -> bool {
        true
    }
}

/// The silent default handler.
pub struct NoProgress;

impl ProgressHandler for NoProgress {}

enum FileOutcome {
    Reviewed {
        kind: ReviewerKind,
        core: crate::core::ReviewerCore,
        encoding_findings: Vec<StringInfo>,
    },
    Failed(PathBuf, String),
    Skipped(PathBuf),
}

/// Drives one analysis run: one reviewer per language family, plus the
/// file-level findings and failure log.
pub struct BatchAnalyzer {
    options: ReviewOptions,
    lists: Arc<IgnoreLists>,
    cpp: CppReviewer,
    csharp: CsharpReviewer,
    rc: RcReviewer,
    po: PoReviewer,
    file_findings: Vec<StringInfo>,
    failed_files: Vec<PathBuf>,
    log: Vec<String>,
    partial: bool,
}

impl BatchAnalyzer {
    pub fn new(options: ReviewOptions, lists: Arc<IgnoreLists>) -> Self {
        Self {
            cpp: CppReviewer::new(options.clone(), Arc::clone(&lists)),
            csharp: CsharpReviewer::new(options.clone(), Arc::clone(&lists)),
            rc: RcReviewer::new(options.clone(), Arc::clone(&lists)),
            po: PoReviewer::new(options.clone(), Arc::clone(&lists)),
            options,
            lists,
            file_findings: Vec::new(),
            failed_files: Vec::new(),
            log: Vec::new(),
            partial: false,
        }
    }

    pub fn cpp(&self) -> &CppReviewer {
        &self.cpp
    }

    pub fn csharp(&self) -> &CsharpReviewer {
        &self.csharp
    }

    pub fn rc(&self) -> &RcReviewer {
        &self.rc
    }

    pub fn po(&self) -> &PoReviewer {
        &self.po
    }

    /// Whether the last run was cancelled before completing.
    pub fn partial(&self) -> bool {
        self.partial
    }

    /// Analyze a list of files. Each file is processed by a fresh shadow
    /// reviewer on the worker pool; results are folded back in input-list
    /// order, so bucket ordering is deterministic regardless of scheduling.
    /// Returns `false` when the progress handler cancelled the run.
    pub fn analyze(&mut self, files: &[PathBuf], progress: &dyn ProgressHandler) -> bool {
        progress.on_start(files.len());

        let cancelled = AtomicBool::new(false);
        let progress_lock = Mutex::new(());
        let options = &self.options;
        let lists = &self.lists;

        let outcomes: Vec<Option<FileOutcome>> = files
            .par_iter()
            .enumerate()
            .map(|(idx, path)| {
                if cancelled.load(Ordering::SeqCst) {
                    return None;
                }
                {
                    let _guard = progress_lock.lock().expect("progress lock poisoned");
                    if cancelled.load(Ordering::SeqCst) {
                        return None;
                    }
                    if !progress.on_progress(idx + 1, path) {
                        cancelled.store(true, Ordering::SeqCst);
                        return None;
                    }
                }

                let Some(kind) = reviewer_kind_for(path) else {
                    return Some(FileOutcome::Skipped(path.clone()));
                };
                match encoding::read_source_file(path, kind, options.style) {
                    Ok(loaded) => {
                        let mut shadow = make_reviewer(kind, options.clone(), Arc::clone(lists));
                        shadow.process(&loaded.text, path);
                        Some(FileOutcome::Reviewed {
                            kind,
                            core: shadow.into_core(),
                            encoding_findings: loaded.findings,
                        })
                    }
                    Err(e) => Some(FileOutcome::Failed(path.clone(), e.to_string())),
                }
            })
            .collect();

        self.partial = cancelled.load(Ordering::SeqCst);

        for outcome in outcomes.into_iter().flatten() {
            match outcome {
                FileOutcome::Reviewed {
                    kind,
                    core,
                    encoding_findings,
                } => {
                    self.file_findings.extend(encoding_findings);
                    self.reviewer_mut(kind).core_mut().merge(core);
                }
                FileOutcome::Failed(path, error) => {
                    self.log
                        .push(format!("failed to read {}: {error}", path.display()));
                    self.failed_files.push(path);
                }
                FileOutcome::Skipped(path) => {
                    self.log
                        .push(format!("no reviewer for {}; skipped", path.display()));
                }
            }
        }

        let lists = Arc::clone(&self.lists);
        for core in self.reviewers_mut() {
            core.review_localizable_strings(&lists);
            core.run_diagnostics();
        }

        !self.partial
    }

    /// Replace every non-empty `msgstr` of the listed `.po` catalogs with a
    /// deterministic mangling and write the files back.
    /// Returns `false` when cancelled.
    pub fn pseudo_translate(
        &mut self,
        files: &[PathBuf],
        method: PseudoMethod,
        add_brackets: bool,
        width_increase_percent: u32,
        track_ids: bool,
        progress: &dyn ProgressHandler,
    ) -> bool {
        if method == PseudoMethod::None {
            return true;
        }
        let catalogs: Vec<&PathBuf> = files
            .iter()
            .filter(|path| reviewer_kind_for(path) == Some(ReviewerKind::Po))
            .collect();
        progress.on_start(catalogs.len());

        let mut counter = 0usize;
        for (idx, path) in catalogs.iter().enumerate() {
            if !progress.on_progress(idx + 1, path) {
                self.partial = true;
                return false;
            }
            if let Err(e) = pseudo::pseudo_translate_file(
                path,
                method,
                add_brackets,
                width_increase_percent,
                track_ids,
                &mut counter,
            ) {
                self.log_error(&e);
            }
        }
        true
    }

    fn log_error(&mut self, error: &AnalyzeError) {
        self.log.push(error.to_string());
    }

    fn reviewer_mut(&mut self, kind: ReviewerKind) -> &mut dyn Reviewer {
        match kind {
            ReviewerKind::Cpp => &mut self.cpp,
            ReviewerKind::Csharp => &mut self.csharp,
            ReviewerKind::Rc => &mut self.rc,
            ReviewerKind::Po => &mut self.po,
        }
    }

    fn reviewers(&self) -> [&dyn Reviewer; 4] {
        [&self.cpp, &self.csharp, &self.rc, &self.po]
    }

    fn reviewers_mut(&mut self) -> [&mut crate::core::ReviewerCore; 4] {
        [
            self.cpp.core_mut(),
            self.csharp.core_mut(),
            self.rc.core_mut(),
            self.po.core_mut(),
        ]
    }

    fn all_findings(&self) -> Vec<&StringInfo> {
        let mut findings: Vec<&StringInfo> = self
            .reviewers()
            .into_iter()
            .flat_map(|r| r.core().buckets().findings())
            .chain(self.file_findings.iter())
            .collect();
        findings.sort_by(|a, b| {
            a.file_name
                .cmp(&b.file_name)
                .then(a.line.cmp(&b.line))
                .then(a.column.cmp(&b.column))
        });
        findings
    }

    /// Tab-delimited results, one finding per line, sorted by
    /// (file, line, column). Fields never contain raw tabs or newlines.
    pub fn format_results(&self, include_summary_header: bool) -> String {
        let mut out = String::new();
        if include_summary_header {
            out.push_str("File\tLine\tColumn\tValue\tExplanation\tID\n");
        }
        for finding in self.all_findings() {
            let Some(warning) = finding.warning_id else {
                continue;
            };
            out.push_str(&format!(
                "{}\t{}\t{}\t{}\t{}\t{}\n",
                escape_field(&finding.file_name.display().to_string()),
                finding.line,
                finding.column,
                escape_field(&finding.string),
                escape_field(&finding.explanation),
                warning.tag()
            ));
        }
        out
    }

    /// Counts per warning id, and per file when `verbose`; ends with a
    /// line for any files that could not be read.
    pub fn format_summary(&self, verbose: bool) -> String {
        use std::collections::BTreeMap;

        let mut by_warning: BTreeMap<&'static str, usize> = BTreeMap::new();
        let mut by_file: BTreeMap<String, usize> = BTreeMap::new();
        for finding in self.all_findings() {
            let Some(warning) = finding.warning_id else {
                continue;
            };
            *by_warning.entry(warning.tag()).or_default() += 1;
            *by_file
                .entry(finding.file_name.display().to_string())
                .or_default() += 1;
        }

        let mut out = String::new();
        let total: usize = by_warning.values().sum();
        out.push_str(&format!("{total} issue(s) found.\n"));
        for (tag, count) in &by_warning {
            out.push_str(&format!("{tag}\t{count}\n"));
        }
        if verbose {
            for (file, count) in &by_file {
                out.push_str(&format!("{file}\t{count}\n"));
            }
        }
        if !self.failed_files.is_empty() {
            let paths: Vec<String> = self
                .failed_files
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            out.push_str(&format!(
                "{} file(s) could not be read: {}\n",
                paths.len(),
                paths.join(", ")
            ));
        }
        out
    }

    /// The concatenated per-reviewer log rings plus the analyzer's own log.
    pub fn get_log_report(&self) -> String {
        let mut out = String::new();
        for reviewer in self.reviewers() {
            for line in reviewer.core().log_lines() {
                out.push_str(line);
                out.push('\n');
            }
        }
        for line in &self.log {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

fn escape_field(field: &str) -> String {
    field
        .replace('\\', "\\\\")
        .replace('\t', "\\t")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}
