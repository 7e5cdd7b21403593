//! Shared reviewer state: finding buckets, the run log, and the
//! cross-string review passes.

use crate::findings::{Severity, StringInfo, UsageContext, WarningId};
use crate::options::{IgnoreLists, ReviewOptions};
use crate::review_style::ReviewStyle;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;

/// Widest acceptable source line, in characters.
pub const MAX_LINE_WIDTH: usize = 120;

/// Bound on the in-memory log ring.
const LOG_CAPACITY: usize = 512;

/// Ordered finding sequences, one per kind of result.
///
/// Within a bucket, entries are kept in (file path, byte offset) order once
/// [`ReviewerCore::review_localizable_strings`] has run.
#[derive(Debug, Clone, Default)]
pub struct Buckets {
    pub localizable_strings: Vec<StringInfo>,
    pub not_available_for_localization_strings: Vec<StringInfo>,
    pub unsafe_localizable_strings: Vec<StringInfo>,
    pub localizable_strings_in_internal_call: Vec<StringInfo>,
    pub marked_as_non_localizable_strings: Vec<StringInfo>,
    pub deprecated_macros: Vec<StringInfo>,
    pub printf_mismatches: Vec<StringInfo>,
    pub translation_inconsistencies: Vec<StringInfo>,
    pub bad_dialog_font_sizes: Vec<StringInfo>,
    pub non_system_dialog_fonts: Vec<StringInfo>,
    pub trailing_spaces: Vec<StringInfo>,
    pub tabs: Vec<StringInfo>,
    pub wide_lines: Vec<StringInfo>,
    pub comments_missing_space: Vec<StringInfo>,
    pub ids_assigned_number: Vec<StringInfo>,
    pub ids_with_duplicate_value: Vec<StringInfo>,
    pub malformed_strings: Vec<StringInfo>,
    pub unencoded_ext_ascii: Vec<StringInfo>,
}

impl Buckets {
    fn vecs_mut(&mut self) -> [&mut Vec<StringInfo>; 18] {
        [
            &mut self.localizable_strings,
            &mut self.not_available_for_localization_strings,
            &mut self.unsafe_localizable_strings,
            &mut self.localizable_strings_in_internal_call,
            &mut self.marked_as_non_localizable_strings,
            &mut self.deprecated_macros,
            &mut self.printf_mismatches,
            &mut self.translation_inconsistencies,
            &mut self.bad_dialog_font_sizes,
            &mut self.non_system_dialog_fonts,
            &mut self.trailing_spaces,
            &mut self.tabs,
            &mut self.wide_lines,
            &mut self.comments_missing_space,
            &mut self.ids_assigned_number,
            &mut self.ids_with_duplicate_value,
            &mut self.malformed_strings,
            &mut self.unencoded_ext_ascii,
        ]
    }

    fn vecs(&self) -> [&Vec<StringInfo>; 18] {
        [
            &self.localizable_strings,
            &self.not_available_for_localization_strings,
            &self.unsafe_localizable_strings,
            &self.localizable_strings_in_internal_call,
            &self.marked_as_non_localizable_strings,
            &self.deprecated_macros,
            &self.printf_mismatches,
            &self.translation_inconsistencies,
            &self.bad_dialog_font_sizes,
            &self.non_system_dialog_fonts,
            &self.trailing_spaces,
            &self.tabs,
            &self.wide_lines,
            &self.comments_missing_space,
            &self.ids_assigned_number,
            &self.ids_with_duplicate_value,
            &self.malformed_strings,
            &self.unencoded_ext_ascii,
        ]
    }

    /// Every entry that carries a warning id, across all buckets.
    pub fn findings(&self) -> impl Iterator<Item = &StringInfo> {
        self.vecs()
            .into_iter()
            .flatten()
            .filter(|info| info.warning_id.is_some())
    }

    pub fn total_len(&self) -> usize {
        self.vecs().iter().map(|v| v.len()).sum()
    }

    fn merge(&mut self, other: Buckets) {
        let mut other = other;
        for (dst, src) in self.vecs_mut().into_iter().zip(other.vecs_mut()) {
            dst.append(src);
        }
    }

    fn sort_all(&mut self) {
        for vec in self.vecs_mut() {
            vec.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        }
    }

    fn dedup_all(&mut self) {
        for vec in self.vecs_mut() {
            let mut seen = HashSet::new();
            vec.retain(|info| {
                seen.insert((
                    info.string.clone(),
                    info.file_name.clone(),
                    info.offset,
                    info.warning_id,
                ))
            });
        }
    }
}

/// A numeric value assigned to a resource-id-looking identifier. Kept apart
/// from the finding buckets so duplicate-value detection sees every
/// assignment even when the per-assignment check is disabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdAssignment {
    pub name: String,
    pub value: i64,
    pub file_name: std::path::PathBuf,
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

/// State shared by every language reviewer.
#[derive(Debug)]
pub struct ReviewerCore {
    options: ReviewOptions,
    buckets: Buckets,
    id_assignments: Vec<IdAssignment>,
    log: VecDeque<String>,
    files_reviewed: usize,
}

impl ReviewerCore {
    pub fn new(options: ReviewOptions) -> Self {
        Self {
            options,
            buckets: Buckets::default(),
            id_assignments: Vec::new(),
            log: VecDeque::new(),
            files_reviewed: 0,
        }
    }

    pub fn options(&self) -> &ReviewOptions {
        &self.options
    }

    pub fn style(&self) -> ReviewStyle {
        self.options.style
    }

    pub fn buckets(&self) -> &Buckets {
        &self.buckets
    }

    pub fn buckets_mut(&mut self) -> &mut Buckets {
        &mut self.buckets
    }

    pub fn files_reviewed(&self) -> usize {
        self.files_reviewed
    }

    pub fn note_file(&mut self) {
        self.files_reviewed += 1;
    }

    /// Append a line to the bounded log ring.
    pub fn log(&mut self, message: impl Into<String>) {
        if self.log.len() == LOG_CAPACITY {
            self.log.pop_front();
        }
        self.log.push_back(message.into());
    }

    pub fn log_lines(&self) -> impl Iterator<Item = &str> {
        self.log.iter().map(String::as_str)
    }

    /// Append to a bucket unless an identical literal at the same position
    /// is already present.
    pub fn push_dedup(vec: &mut Vec<StringInfo>, info: StringInfo) {
        if vec.iter().any(|existing| {
            existing.position_key() == info.position_key()
                && existing.warning_id == info.warning_id
        }) {
            return;
        }
        vec.push(info);
    }

    /// Record a numeric id assignment; emits a `[numberAssignedToId]`
    /// finding when that check is enabled.
    pub fn add_id_assignment(&mut self, assignment: IdAssignment) {
        if self.options.style.contains(ReviewStyle::CHECK_NUMBER_ASSIGNED_TO_ID) {
            Self::push_dedup(
                &mut self.buckets.ids_assigned_number,
                StringInfo::warning(
                    assignment.value.to_string(),
                    &assignment.file_name,
                    assignment.line,
                    assignment.column,
                    assignment.offset,
                    UsageContext::VariableAssignment(assignment.name.clone()),
                    WarningId::NumberAssignedToId,
                    format!(
                        "{} is assigned the hard-coded number {}; use an enumeration or generated header instead.",
                        assignment.name, assignment.value
                    ),
                ),
            );
        }
        self.id_assignments.push(assignment);
    }

    /// Fold a shadow core (one file's results) into this one.
    pub fn merge(&mut self, other: ReviewerCore) {
        self.buckets.merge(other.buckets);
        self.id_assignments.extend(other.id_assignments);
        for line in other.log {
            self.log(line);
        }
        self.files_reviewed += other.files_reviewed;
    }

    /// Cross-string review pass, run once after all files are processed:
    /// collapse duplicates, reclassify strings that are translated in one
    /// place and marked non-translatable in another, surface internal
    /// namespace leaks, and report duplicate id values.
    pub fn review_localizable_strings(&mut self, lists: &IgnoreLists) {
        self.buckets.dedup_all();

        let localizable_texts: HashSet<String> = self
            .buckets
            .localizable_strings
            .iter()
            .map(|info| info.string.clone())
            .collect();

        if self.options.style.contains(ReviewStyle::CHECK_SUSPECT_L10N_USAGE) {
            let (conflicted, kept): (Vec<_>, Vec<_>) = std::mem::take(
                &mut self.buckets.marked_as_non_localizable_strings,
            )
            .into_iter()
            .partition(|info| localizable_texts.contains(&info.string));
            self.buckets.marked_as_non_localizable_strings = kept;
            for info in conflicted {
                let explanation = format!(
                    "\"{}\" is translated elsewhere but marked non-translatable here.",
                    info.string
                );
                Self::push_dedup(
                    &mut self.buckets.localizable_strings_in_internal_call,
                    StringInfo {
                        warning_id: Some(WarningId::SuspectL10nUsage),
                        severity: Severity::Warning,
                        explanation,
                        ..info
                    },
                );
            }

            // Internal namespace leaks: translated strings whose call site
            // lives in an internal namespace.
            let (leaked, kept): (Vec<_>, Vec<_>) =
                std::mem::take(&mut self.buckets.localizable_strings)
                    .into_iter()
                    .partition(|info| {
                        info.usage
                            .name()
                            .is_some_and(|name| lists.is_internal_namespace(name))
                    });
            self.buckets.localizable_strings = kept;
            for info in leaked {
                let explanation = format!(
                    "Translation call reached through internal namespace ({}).",
                    info.usage.name().unwrap_or_default()
                );
                Self::push_dedup(
                    &mut self.buckets.localizable_strings_in_internal_call,
                    StringInfo {
                        warning_id: Some(WarningId::SuspectL10nUsage),
                        severity: Severity::Warning,
                        explanation,
                        ..info
                    },
                );
            }
        }

        if self
            .options
            .style
            .contains(ReviewStyle::CHECK_DUPLICATE_VALUE_ASSIGNED_TO_IDS)
        {
            let mut by_value: HashMap<i64, Vec<&IdAssignment>> = HashMap::new();
            for assignment in &self.id_assignments {
                by_value.entry(assignment.value).or_default().push(assignment);
            }
            let mut duplicates = Vec::new();
            for (value, group) in by_value {
                let names: HashSet<&str> =
                    group.iter().map(|a| a.name.as_str()).collect();
                if names.len() < 2 {
                    continue;
                }
                for assignment in group {
                    let mut others: Vec<&str> = names
                        .iter()
                        .copied()
                        .filter(|n| *n != assignment.name)
                        .collect();
                    others.sort_unstable();
                    duplicates.push(StringInfo::warning(
                        value.to_string(),
                        &assignment.file_name,
                        assignment.line,
                        assignment.column,
                        assignment.offset,
                        UsageContext::VariableAssignment(assignment.name.clone()),
                        WarningId::DupValAssignedToIds,
                        format!(
                            "{} shares the value {} with {}.",
                            assignment.name,
                            value,
                            others.join(", ")
                        ),
                    ));
                }
            }
            for info in duplicates {
                Self::push_dedup(&mut self.buckets.ids_with_duplicate_value, info);
            }
        }

        self.buckets.sort_all();
    }

    /// Append run counters to the log ring.
    pub fn run_diagnostics(&mut self) {
        let lines = [
            format!("files reviewed: {}", self.files_reviewed),
            format!(
                "localizable strings: {}",
                self.buckets.localizable_strings.len()
            ),
            format!(
                "strings not available for localization: {}",
                self.buckets.not_available_for_localization_strings.len()
            ),
            format!(
                "suspect localizable strings: {}",
                self.buckets.unsafe_localizable_strings.len()
            ),
            format!(
                "localizable strings in internal calls: {}",
                self.buckets.localizable_strings_in_internal_call.len()
            ),
            format!("total findings: {}", self.buckets.findings().count()),
        ];
        for line in lines {
            self.log(line);
        }
    }

    /// Line-level source checks: trailing whitespace, tabs, over-wide lines,
    /// and comment spacing. `line_comment` enables the comment-spacing check
    /// for languages with `//` comments.
    pub fn review_source_lines(&mut self, text: &str, file_name: &Path, line_comment: bool) {
        let style = self.options.style;
        let check_trailing = style.contains(ReviewStyle::CHECK_TRAILING_SPACES);
        let check_tabs = style.contains(ReviewStyle::CHECK_TABS);
        let check_width = style.contains(ReviewStyle::CHECK_LINE_WIDTH);
        let check_comment = line_comment && style.contains(ReviewStyle::CHECK_SPACE_AFTER_COMMENT);
        if !(check_trailing || check_tabs || check_width || check_comment) {
            return;
        }

        let mut offset = 0;
        for (line_no, line) in text.split('\n').enumerate() {
            let line_no = line_no + 1;
            let content = line.strip_suffix('\r').unwrap_or(line);

            if check_trailing {
                let trimmed = content.trim_end_matches([' ', '\t']);
                if trimmed.len() < content.len() && !trimmed.is_empty() {
                    let column = trimmed.len() + 1;
                    Self::push_dedup(
                        &mut self.buckets.trailing_spaces,
                        StringInfo::warning(
                            trimmed.trim_start(),
                            file_name,
                            line_no,
                            column,
                            offset + trimmed.len(),
                            UsageContext::Orphan(trimmed.trim_start().to_string()),
                            WarningId::TrailingSpaces,
                            "Line ends with trailing whitespace.",
                        ),
                    );
                }
            }

            if check_tabs {
                if let Some(tab_pos) = content.find('\t') {
                    Self::push_dedup(
                        &mut self.buckets.tabs,
                        StringInfo::warning(
                            content.trim(),
                            file_name,
                            line_no,
                            tab_pos + 1,
                            offset + tab_pos,
                            UsageContext::Orphan(content.trim().to_string()),
                            WarningId::Tabs,
                            "Line contains a tab character.",
                        ),
                    );
                }
            }

            if check_width {
                let width = content.chars().count();
                if width > MAX_LINE_WIDTH {
                    Self::push_dedup(
                        &mut self.buckets.wide_lines,
                        StringInfo::warning(
                            content.trim(),
                            file_name,
                            line_no,
                            MAX_LINE_WIDTH + 1,
                            offset,
                            UsageContext::Orphan(content.trim().to_string()),
                            WarningId::WideLine,
                            format!(
                                "Line is {width} characters wide ({MAX_LINE_WIDTH} is the limit)."
                            ),
                        ),
                    );
                }
            }

            if check_comment {
                if let Some(pos) = find_tight_comment(content) {
                    Self::push_dedup(
                        &mut self.buckets.comments_missing_space,
                        StringInfo::warning(
                            content.trim(),
                            file_name,
                            line_no,
                            pos + 1,
                            offset + pos,
                            UsageContext::Orphan(content.trim().to_string()),
                            WarningId::CommentMissingSpace,
                            "Comment text should be separated from // by a space.",
                        ),
                    );
                }
            }

            offset += line.len() + 1;
        }
    }
}

/// Find a `//` comment whose text starts immediately after the slashes.
/// Skips `://` (URLs) and `///`/`//!` documentation markers.
fn find_tight_comment(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    let mut i = 0;
    while i + 1 < bytes.len() {
        if bytes[i] == b'/' && bytes[i + 1] == b'/' {
            if i > 0 && bytes[i - 1] == b':' {
                i += 2;
                continue;
            }
            let after = bytes.get(i + 2);
            return match after {
                None => None,
                Some(b' ') | Some(b'\t') | Some(b'/') | Some(b'!') => None,
                Some(_) => Some(i),
            };
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn core_with(style: ReviewStyle) -> ReviewerCore {
        ReviewerCore::new(ReviewOptions {
            style,
            ..ReviewOptions::default()
        })
    }

    fn record(text: &str, file: &str, offset: usize) -> StringInfo {
        StringInfo::record(
            text,
            Path::new(file),
            1,
            offset + 1,
            offset,
            UsageContext::FunctionCall("_".into()),
        )
    }

    #[test]
    fn test_push_dedup_drops_same_position() {
        let mut vec = Vec::new();
        ReviewerCore::push_dedup(&mut vec, record("a", "f.cpp", 10));
        ReviewerCore::push_dedup(&mut vec, record("a", "f.cpp", 10));
        ReviewerCore::push_dedup(&mut vec, record("a", "f.cpp", 20));
        assert_eq!(vec.len(), 2);
    }

    #[test]
    fn test_log_ring_is_bounded() {
        let mut core = core_with(ReviewStyle::default());
        for i in 0..600 {
            core.log(format!("line {i}"));
        }
        let lines: Vec<_> = core.log_lines().collect();
        assert_eq!(lines.len(), 512);
        assert_eq!(lines[0], "line 88");
    }

    #[test]
    fn test_conflicting_strings_reclassified() {
        let mut core = core_with(ReviewStyle::default());
        core.buckets_mut()
            .localizable_strings
            .push(record("Save", "a.cpp", 5));
        core.buckets_mut()
            .marked_as_non_localizable_strings
            .push(record("Save", "b.cpp", 9));
        core.buckets_mut()
            .marked_as_non_localizable_strings
            .push(record("schema", "b.cpp", 30));

        core.review_localizable_strings(&IgnoreLists::default());

        assert_eq!(core.buckets().localizable_strings_in_internal_call.len(), 1);
        assert_eq!(
            core.buckets().localizable_strings_in_internal_call[0]
                .warning_id,
            Some(WarningId::SuspectL10nUsage)
        );
        assert_eq!(core.buckets().marked_as_non_localizable_strings.len(), 1);
    }

    #[test]
    fn test_duplicate_id_values_reported() {
        let mut core = core_with(ReviewStyle::default());
        for (name, value, offset) in
            [("IDS_A", 100, 0), ("IDS_B", 100, 40), ("IDS_C", 200, 80)]
        {
            core.add_id_assignment(IdAssignment {
                name: name.to_string(),
                value,
                file_name: PathBuf::from("resource.h"),
                line: 1,
                column: 1,
                offset,
            });
        }
        core.review_localizable_strings(&IgnoreLists::default());

        let dupes = &core.buckets().ids_with_duplicate_value;
        assert_eq!(dupes.len(), 2);
        assert!(dupes.iter().all(|d| d.string == "100"));
        assert!(
            dupes[0].explanation.contains("IDS_B") || dupes[0].explanation.contains("IDS_A")
        );
    }

    #[test]
    fn test_id_assignment_finding_respects_flag() {
        let mut core = core_with(ReviewStyle::empty());
        core.add_id_assignment(IdAssignment {
            name: "IDS_A".to_string(),
            value: 5,
            file_name: PathBuf::from("resource.h"),
            line: 1,
            column: 1,
            offset: 0,
        });
        assert!(core.buckets().ids_assigned_number.is_empty());
    }

    #[test]
    fn test_review_source_lines() {
        let style = ReviewStyle::CHECK_TRAILING_SPACES
            | ReviewStyle::CHECK_TABS
            | ReviewStyle::CHECK_LINE_WIDTH
            | ReviewStyle::CHECK_SPACE_AFTER_COMMENT;
        let mut core = core_with(style);
        let wide = "x".repeat(130);
        let text = format!("int a;   \n\tint b;\n{wide}\n//tight comment\n// fine comment\n");
        core.review_source_lines(&text, Path::new("a.cpp"), true);

        assert_eq!(core.buckets().trailing_spaces.len(), 1);
        assert_eq!(core.buckets().trailing_spaces[0].line, 1);
        assert_eq!(core.buckets().tabs.len(), 1);
        assert_eq!(core.buckets().tabs[0].line, 2);
        assert_eq!(core.buckets().wide_lines.len(), 1);
        assert_eq!(core.buckets().wide_lines[0].line, 3);
        assert_eq!(core.buckets().comments_missing_space.len(), 1);
        assert_eq!(core.buckets().comments_missing_space[0].line, 4);
    }

    #[test]
    fn test_review_source_lines_disabled_by_style() {
        let mut core = core_with(ReviewStyle::ALL_L10N_CHECKS);
        core.review_source_lines("int a;   \n\tb\n", Path::new("a.cpp"), true);
        assert_eq!(core.buckets().total_len(), 0);
    }

    #[test]
    fn test_find_tight_comment_skips_urls_and_doc_comments() {
        assert_eq!(find_tight_comment("//x"), Some(0));
        assert_eq!(find_tight_comment("int a; //no space"), Some(7));
        assert_eq!(find_tight_comment("// ok"), None);
        assert_eq!(find_tight_comment("/// doc"), None);
        assert_eq!(find_tight_comment("//! doc"), None);
        assert_eq!(find_tight_comment("see https://example.com"), None);
    }

    #[test]
    fn test_merge_accumulates() {
        let mut a = core_with(ReviewStyle::default());
        a.buckets_mut().localizable_strings.push(record("x", "a.cpp", 0));
        a.note_file();
        let mut b = core_with(ReviewStyle::default());
        b.buckets_mut().localizable_strings.push(record("y", "b.cpp", 0));
        b.note_file();
        b.log("processed b.cpp");
        a.merge(b);
        assert_eq!(a.buckets().localizable_strings.len(), 2);
        assert_eq!(a.files_reviewed(), 2);
        assert!(a.log_lines().any(|l| l == "processed b.cpp"));
    }

    #[test]
    fn test_run_diagnostics_logs_counters() {
        let mut core = core_with(ReviewStyle::default());
        core.note_file();
        core.run_diagnostics();
        assert!(core.log_lines().any(|l| l == "files reviewed: 1"));
    }
}
