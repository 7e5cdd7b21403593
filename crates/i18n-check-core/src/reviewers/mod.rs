//! Language reviewers.

pub mod cpp;
pub mod csharp;
pub mod po;
pub mod rc;

use crate::classify::{self, Decision};
use crate::core::ReviewerCore;
use crate::file_types::ReviewerKind;
use crate::findings::{StringInfo, UsageContext, WarningId};
use crate::options::{IgnoreLists, ReviewOptions};
use crate::review_style::ReviewStyle;
use std::path::Path;
use std::sync::Arc;

pub use cpp::CppReviewer;
pub use csharp::CsharpReviewer;
pub use po::PoReviewer;
pub use rc::RcReviewer;

/// A streaming source reviewer for one language family.
///
/// A reviewer is created with a fixed [`ReviewOptions`] and shared
/// [`IgnoreLists`]; it is invoked once per input file and appends findings
/// to its core's buckets. After all files, run
/// [`ReviewerCore::review_localizable_strings`] and
/// [`ReviewerCore::run_diagnostics`] on the core; the instance is read-only
/// from then on.
pub trait Reviewer {
    /// Scan one file's text, appending findings to the core.
    fn process(&mut self, text: &str, file_name: &Path);

    fn core(&self) -> &ReviewerCore;

    fn core_mut(&mut self) -> &mut ReviewerCore;

    /// Consume the reviewer, yielding its accumulated core. Used to fold a
    /// per-file shadow reviewer into the long-lived one for its language.
    fn into_core(self: Box<Self>) -> ReviewerCore;
}

/// Construct the reviewer for a language family.
pub fn make_reviewer(
    kind: ReviewerKind,
    options: ReviewOptions,
    lists: Arc<IgnoreLists>,
) -> Box<dyn Reviewer + Send> {
    match kind {
        ReviewerKind::Cpp => Box::new(CppReviewer::new(options, lists)),
        ReviewerKind::Csharp => Box::new(CsharpReviewer::new(options, lists)),
        ReviewerKind::Rc => Box::new(RcReviewer::new(options, lists)),
        ReviewerKind::Po => Box::new(PoReviewer::new(options, lists)),
    }
}

fn suspicious_explanation(warning: WarningId, usage: &UsageContext) -> String {
    let reason = match warning {
        WarningId::UrlInL10nString => "Translatable string contains a URL or email address",
        WarningId::SpacesAroundL10nString => "Translatable string has surrounding whitespace",
        WarningId::PrintfSingleNumber => {
            "Format string wraps only a number; format the value directly instead"
        }
        _ => "String does not appear to be natural language",
    };
    format!("{}. {}", reason, usage.explain())
}

/// Put one classified literal into the bucket its decision selects.
///
/// `raw` is the un-decoded literal body, used for the extended-ASCII check
/// (escaped characters are already encoded and do not count).
#[allow(clippy::too_many_arguments)]
pub(crate) fn route_literal(
    core: &mut ReviewerCore,
    lists: &IgnoreLists,
    decoded: &str,
    raw: &str,
    file_name: &Path,
    line: usize,
    column: usize,
    offset: usize,
    usage: UsageContext,
) {
    let decision = classify::classify(decoded, &usage, lists, core.options());
    let style = core.style();

    match decision {
        Decision::Translatable => {
            ReviewerCore::push_dedup(
                &mut core.buckets_mut().localizable_strings,
                StringInfo::record(decoded, file_name, line, column, offset, usage.clone()),
            );
        }
        Decision::Suspicious(warning) => {
            if style.enables(warning) {
                let explanation = suspicious_explanation(warning, &usage);
                ReviewerCore::push_dedup(
                    &mut core.buckets_mut().unsafe_localizable_strings,
                    StringInfo::warning(
                        decoded,
                        file_name,
                        line,
                        column,
                        offset,
                        usage.clone(),
                        warning,
                        explanation,
                    ),
                );
            } else {
                ReviewerCore::push_dedup(
                    &mut core.buckets_mut().localizable_strings,
                    StringInfo::record(decoded, file_name, line, column, offset, usage.clone()),
                );
            }
        }
        Decision::NotTranslatable => {}
        Decision::MarkedNonLocalizable => {
            ReviewerCore::push_dedup(
                &mut core.buckets_mut().marked_as_non_localizable_strings,
                StringInfo::record(decoded, file_name, line, column, offset, usage.clone()),
            );
        }
        Decision::InternalCallWithTranslatable => {
            if style.contains(ReviewStyle::CHECK_SUSPECT_L10N_USAGE) {
                let explanation = format!(
                    "Translatable text passed to a non-localizable call. {}",
                    usage.explain()
                );
                ReviewerCore::push_dedup(
                    &mut core.buckets_mut().localizable_strings_in_internal_call,
                    StringInfo::warning(
                        decoded,
                        file_name,
                        line,
                        column,
                        offset,
                        usage.clone(),
                        WarningId::SuspectL10nUsage,
                        explanation,
                    ),
                );
            }
        }
        Decision::ShouldBeTranslatable => {
            if style.contains(ReviewStyle::CHECK_NOT_AVAILABLE_FOR_L10N) {
                let explanation = format!(
                    "String not available for translation. {}",
                    usage.explain()
                );
                ReviewerCore::push_dedup(
                    &mut core.buckets_mut().not_available_for_localization_strings,
                    StringInfo::warning(
                        decoded,
                        file_name,
                        line,
                        column,
                        offset,
                        usage.clone(),
                        WarningId::NotL10nAvailable,
                        explanation,
                    ),
                );
            }
        }
    }

    if matches!(
        decision,
        Decision::Translatable | Decision::Suspicious(_) | Decision::ShouldBeTranslatable
    ) && style.contains(ReviewStyle::CHECK_UNENCODED_EXT_ASCII)
        && classify::has_unencoded_ext_ascii(raw)
    {
        ReviewerCore::push_dedup(
            &mut core.buckets_mut().unencoded_ext_ascii,
            StringInfo::warning(
                decoded,
                file_name,
                line,
                column,
                offset,
                usage,
                WarningId::UnencodedExtAscii,
                "String contains unescaped extended-ASCII characters; use escapes for a portable encoding.",
            ),
        );
    }
}

/// Record a literal truncated at end of input and reset to top level.
pub(crate) fn record_malformed(
    core: &mut ReviewerCore,
    text: &str,
    file_name: &Path,
    index: &crate::lex::LineIndex,
    first_quote: usize,
) -> usize {
    if core.style().contains(ReviewStyle::CHECK_MALFORMED_STRINGS) {
        let (line, column) = index.location(first_quote);
        let fragment: String = text[first_quote..].chars().take(40).collect();
        ReviewerCore::push_dedup(
            &mut core.buckets_mut().malformed_strings,
            StringInfo::warning(
                fragment,
                file_name,
                line,
                column,
                first_quote,
                UsageContext::Orphan(crate::lex::surrounding_text(text, first_quote)),
                WarningId::MalformedString,
                "String literal is not terminated before the end of the file.",
            ),
        );
    }
    text.len()
}

/// Usage context of a literal from its lexical neighborhood.
pub(crate) fn determine_usage(text: &str, pos: usize) -> UsageContext {
    if let Some(name) = crate::lex::find_enclosing_function_name(text, pos) {
        return UsageContext::FunctionCall(name);
    }
    if let Some(name) = crate::lex::find_lhs_assignment_target(text, pos) {
        return UsageContext::VariableAssignment(name);
    }
    UsageContext::Orphan(crate::lex::surrounding_text(text, pos))
}
