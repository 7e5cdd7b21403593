//! # i18n-check-core
//!
//! Core analysis engine for i18n/l10n source review.
//!
//! Scans C/C++, C#, Windows resource scripts, and gettext catalogs for
//! localization defects: strings that should be translatable but are not
//! exposed, translatable strings that should not be, mismatched format
//! specifiers between source and translation, unsafe dialog fonts,
//! deprecated text macros, and encoding problems.
//!
//! The building blocks:
//! - [`reviewers`] -- streaming per-language scanners that classify every
//!   string literal into buckets on a shared [`ReviewerCore`];
//! - [`classify`] -- the pure classification rules;
//! - [`format_spec`] -- printf/brace placeholder parsing and comparison;
//! - [`analyze::BatchAnalyzer`] -- fans files across reviewers, aggregates
//!   findings, renders the tab-delimited report, and drives
//!   pseudo-translation.

/// Batch analysis, report rendering, and progress callbacks.
pub mod analyze;
/// String classification rules (pure functions).
pub mod classify;
/// Shared reviewer state: buckets, log ring, cross-string passes.
pub mod core;
/// Input decoding and file-level encoding checks.
pub mod encoding;
/// Error and configuration-warning types.
pub mod error;
/// Extension-based reviewer dispatch.
pub mod file_types;
/// Finding types: warning ids, usage contexts, extracted strings.
pub mod findings;
/// Format-string parsing and compatibility.
pub mod format_spec;
/// Byte-level lexing helpers shared by the reviewers.
pub mod lex;
/// Review options and frozen ignore lists.
pub mod options;
/// Deterministic pseudo-translation of gettext catalogs.
pub mod pseudo;
/// The review-style bit-set.
pub mod review_style;
/// Language reviewers.
pub mod reviewers;

pub use analyze::{BatchAnalyzer, NoProgress, ProgressHandler};
pub use crate::core::{Buckets, IdAssignment, ReviewerCore, MAX_LINE_WIDTH};
pub use error::{AnalyzeError, AnalyzeResult, ConfigWarning};
pub use file_types::{reviewer_kind_for, ReviewerKind};
pub use findings::{Severity, StringInfo, UsageContext, WarningId};
pub use options::{IgnoreLists, ReviewOptions};
pub use pseudo::PseudoMethod;
pub use review_style::ReviewStyle;
pub use reviewers::{
    make_reviewer, CppReviewer, CsharpReviewer, PoReviewer, RcReviewer, Reviewer,
};
