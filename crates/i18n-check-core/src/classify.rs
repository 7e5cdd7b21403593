//! String classification: decide whether a literal is translatable given its
//! content and usage context.
//!
//! The classifier is a pure function over the literal, its usage, and
//! borrowed views of the configuration; it performs no I/O and keeps no
//! state. Rules apply in order and the first match wins.

use crate::findings::{UsageContext, WarningId};
use crate::options::{IgnoreLists, ReviewOptions};
use regex::Regex;
use std::sync::LazyLock;

/// Outcome of classifying one literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Inside a translation call and content looks sane.
    Translatable,
    /// Inside a translation call but the content is suspect; carries the
    /// warning that describes why.
    Suspicious(WarningId),
    /// Not translatable and nothing to report.
    NotTranslatable,
    /// Explicitly marked as do-not-translate (`_DT(...)` and friends).
    MarkedNonLocalizable,
    /// Passed to an internal (log/assert/identifier) call although the
    /// content itself looks translatable.
    InternalCallWithTranslatable,
    /// A plain string that should be made available for translation.
    ShouldBeTranslatable,
}

static WINDOWS_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]:[\\/][^\n]*$").unwrap());
static UNIX_PATH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(/[^/\s]+){2,}/?$").unwrap());
static URL_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:(?:https?|ftp)://\S+|mailto:\S+)$").unwrap());
static URL_ANYWHERE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:https?|ftp)://\S+|mailto:\S+").unwrap());
static GUID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\{?[0-9A-Fa-f]{8}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{12}\}?$",
    )
    .unwrap()
});
static HEX_BLOB: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:0[xX][0-9A-Fa-f]+|[01]{8,})$").unwrap());
static PRINTF_SINGLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^%[-+ #0]*\d*(?:\.\d+)?(?:hh|h|ll|l|L|q|j|z|t|w)?[diouxXeEfFgGaAcspn]$").unwrap()
});
static BRACE_SINGLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\{(?:\d+|[A-Za-z_][A-Za-z0-9_]*)(?::[^{}]*)?\}$").unwrap());
static POSITIONAL_SINGLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^%\d$").unwrap());
static TAG_ONLY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(?:</?[^<>]+>)+$").unwrap());
static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());
static NUMERIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[+-]?\d+(?:[.,]\d+)?$").unwrap());
static FILE_EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\*|[\w-]+(?:\.[\w-]+)*)\.[A-Za-z0-9]{1,4}$").unwrap());
static MIME_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]+/[a-z0-9.+-]+$").unwrap());
static SINGLE_NUMBER_FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\W{0,2}(?:%[-+ #0]*\d*(?:hh|h|ll|l|L|q|j|z|t)?[diouxX]|\{\d\})\W{0,2}$").unwrap()
});

/// Language keywords that sometimes end up quoted in generated code.
const SOURCE_KEYWORDS: &[&str] = &[
    "auto", "bool", "break", "case", "char", "class", "const", "continue", "default", "delete",
    "do", "double", "else", "enum", "extern", "false", "float", "for", "goto", "if", "inline",
    "int", "long", "namespace", "new", "nullptr", "operator", "private", "protected", "public",
    "return", "short", "signed", "sizeof", "static", "struct", "switch", "template", "this",
    "true", "typedef", "typename", "union", "unsigned", "virtual", "void", "volatile", "while",
    "abstract", "async", "await", "byte", "decimal", "foreach", "interface", "internal", "is",
    "object", "override", "readonly", "sealed", "string", "var",
];

/// Classify a decoded literal `s` used in context `usage`.
pub fn classify(
    s: &str,
    usage: &UsageContext,
    lists: &IgnoreLists,
    opts: &ReviewOptions,
) -> Decision {
    if let UsageContext::FunctionCall(name) = usage {
        if lists.is_do_not_translate(name) {
            return Decision::MarkedNonLocalizable;
        }
        if lists.is_translation_function(name, opts.log_messages_can_be_translatable) {
            return match suspicious_content(s, lists, opts) {
                Some(warning) => Decision::Suspicious(warning),
                None => Decision::Translatable,
            };
        }
        let internal = (lists.is_log_function(name) && !opts.log_messages_can_be_translatable)
            || (lists.is_exception_type(name) && !opts.exceptions_should_be_translatable)
            || lists.is_identifier_function(name);
        if internal {
            return if word_count(s) >= opts.min_words() {
                Decision::InternalCallWithTranslatable
            } else {
                Decision::NotTranslatable
            };
        }
    }

    if let UsageContext::VariableAssignment(name) | UsageContext::Parameter(name) = usage {
        if lists.is_internal_variable(name) {
            return Decision::NotTranslatable;
        }
    }

    if s.trim().is_empty() {
        return Decision::NotTranslatable;
    }

    if is_punctuation_only(s) && !opts.allow_translating_punctuation_only_strings {
        return Decision::NotTranslatable;
    }

    if looks_like_code(s, lists) {
        return Decision::NotTranslatable;
    }

    if SOURCE_KEYWORDS.contains(&s) {
        return Decision::NotTranslatable;
    }

    if word_count(s) >= opts.min_words() {
        return Decision::ShouldBeTranslatable;
    }

    Decision::NotTranslatable
}

/// Content tests applied to strings already classified translatable; any hit
/// downgrades the classification to suspicious. The first matching test
/// names the warning.
pub fn suspicious_content(
    s: &str,
    lists: &IgnoreLists,
    opts: &ReviewOptions,
) -> Option<WarningId> {
    if URL_ANYWHERE.is_match(s) {
        return Some(WarningId::UrlInL10nString);
    }
    if s != s.trim_matches([' ', '\t']) && !s.trim().is_empty() {
        return Some(WarningId::SpacesAroundL10nString);
    }
    if SINGLE_NUMBER_FORMAT.is_match(s.trim()) {
        return Some(WarningId::PrintfSingleNumber);
    }
    if looks_like_non_text(s, lists) || is_code_identifier(s) {
        return Some(WarningId::SuspectL10nString);
    }
    if s.contains('\t') {
        return Some(WarningId::SuspectL10nString);
    }
    if is_punctuation_only(s) && !s.trim().is_empty()
        && !opts.allow_translating_punctuation_only_strings
    {
        return Some(WarningId::SuspectL10nString);
    }
    None
}

/// Machine-value shapes that are never user-facing text: paths, URLs,
/// GUIDs, blobs, format specifiers, markup, file extensions, MIME types,
/// and registered font faces.
pub fn looks_like_non_text(s: &str, lists: &IgnoreLists) -> bool {
    WINDOWS_PATH.is_match(s)
        || UNIX_PATH.is_match(s)
        || URL_ONLY.is_match(s)
        || GUID.is_match(s)
        || HEX_BLOB.is_match(s)
        || PRINTF_SINGLE.is_match(s)
        || POSITIONAL_SINGLE.is_match(s)
        || BRACE_SINGLE.is_match(s)
        || TAG_ONLY.is_match(s)
        || FILE_EXTENSION.is_match(s)
        || MIME_TYPE.is_match(s)
        || lists.is_ignored_font(s)
}

/// The full non-text test used when classifying plain strings; also treats
/// bare identifiers and numeric literals as code (a lone word is not worth
/// translating on its own, so this is safe for the availability check but
/// too strict for the suspicious-content pass).
pub fn looks_like_code(s: &str, lists: &IgnoreLists) -> bool {
    looks_like_non_text(s, lists) || IDENTIFIER.is_match(s) || NUMERIC.is_match(s)
}

/// An identifier-shaped string that would read as code rather than a word:
/// snake_case, qualified names, or camelCase with no spaces.
fn is_code_identifier(s: &str) -> bool {
    if s.contains(char::is_whitespace) || s.is_empty() {
        return false;
    }
    if s.contains("::") || (s.contains('_') && IDENTIFIER.is_match(s)) {
        return true;
    }
    // camelCase: a lowercase letter directly followed by an uppercase one.
    let mut prev_lower = false;
    for c in s.chars() {
        if prev_lower && c.is_ascii_uppercase() {
            return true;
        }
        prev_lower = c.is_ascii_lowercase();
    }
    false
}

fn is_punctuation_only(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| !c.is_alphanumeric())
}

/// Count natural-language words: runs of Unicode letters separated by
/// whitespace or punctuation.
pub fn word_count(s: &str) -> usize {
    let mut count = 0;
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if !in_word {
                count += 1;
                in_word = true;
            }
        } else {
            in_word = false;
        }
    }
    count
}

/// All URLs and mail links appearing in `s`, in order.
pub fn extract_urls(s: &str) -> Vec<&str> {
    URL_ANYWHERE
        .find_iter(s)
        .map(|m| m.as_str().trim_end_matches(['.', ',', ')', ']']))
        .collect()
}

/// Characters above 0x7F but below 0x100 that are not letters; in raw source
/// text these are extended-ASCII symbols that should have been escaped.
pub fn has_unencoded_ext_ascii(raw: &str) -> bool {
    raw.chars()
        .any(|c| (0x80..0x100).contains(&(c as u32)) && !c.is_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> (IgnoreLists, ReviewOptions) {
        let opts = ReviewOptions::default();
        let (lists, _) = IgnoreLists::build(&opts);
        (lists, opts)
    }

    fn call(name: &str) -> UsageContext {
        UsageContext::FunctionCall(name.to_string())
    }

    fn assign(name: &str) -> UsageContext {
        UsageContext::VariableAssignment(name.to_string())
    }

    fn orphan() -> UsageContext {
        UsageContext::Orphan(String::new())
    }

    #[test]
    fn test_translation_call_is_translatable() {
        let (lists, opts) = defaults();
        assert_eq!(
            classify("Save your work", &call("_"), &lists, &opts),
            Decision::Translatable
        );
        assert_eq!(
            classify("Save your work", &call("tr"), &lists, &opts),
            Decision::Translatable
        );
    }

    #[test]
    fn test_translation_call_with_url_is_suspicious() {
        let (lists, opts) = defaults();
        assert_eq!(
            classify("See https://example.com", &call("_"), &lists, &opts),
            Decision::Suspicious(WarningId::UrlInL10nString)
        );
    }

    #[test]
    fn test_translation_call_with_surrounding_spaces() {
        let (lists, opts) = defaults();
        assert_eq!(
            classify("  padded label ", &call("gettext"), &lists, &opts),
            Decision::Suspicious(WarningId::SpacesAroundL10nString)
        );
    }

    #[test]
    fn test_single_word_in_translation_call_is_fine() {
        let (lists, opts) = defaults();
        assert_eq!(
            classify("Goodbye", &call("_"), &lists, &opts),
            Decision::Translatable
        );
    }

    #[test]
    fn test_translation_call_with_identifier_content() {
        let (lists, opts) = defaults();
        assert_eq!(
            classify("button_pressed", &call("_"), &lists, &opts),
            Decision::Suspicious(WarningId::SuspectL10nString)
        );
    }

    #[test]
    fn test_translation_call_with_single_number_format() {
        let (lists, opts) = defaults();
        assert_eq!(
            classify("%d", &call("_"), &lists, &opts),
            Decision::Suspicious(WarningId::PrintfSingleNumber)
        );
    }

    #[test]
    fn test_do_not_translate_marker() {
        let (lists, opts) = defaults();
        assert_eq!(
            classify("schema-version", &call("_DT"), &lists, &opts),
            Decision::MarkedNonLocalizable
        );
    }

    #[test]
    fn test_identifier_call_with_translatable_content() {
        let (lists, opts) = defaults();
        assert_eq!(
            classify("Recent Files", &call("SetName"), &lists, &opts),
            Decision::InternalCallWithTranslatable
        );
        assert_eq!(
            classify("main_window", &call("SetName"), &lists, &opts),
            Decision::NotTranslatable
        );
    }

    #[test]
    fn test_log_call_depends_on_option() {
        let (lists, mut opts) = defaults();
        // Default: log messages may be translated, so a wordy log argument
        // falls through to the availability check.
        assert_eq!(
            classify("could not open file", &call("wxLogError"), &lists, &opts),
            Decision::ShouldBeTranslatable
        );
        opts.log_messages_can_be_translatable = false;
        assert_eq!(
            classify("could not open file", &call("wxLogError"), &lists, &opts),
            Decision::InternalCallWithTranslatable
        );
    }

    #[test]
    fn test_exception_option() {
        let (lists, mut opts) = defaults();
        opts.exceptions_should_be_translatable = false;
        assert_eq!(
            classify("bad argument provided", &call("runtime_error"), &lists, &opts),
            Decision::InternalCallWithTranslatable
        );
    }

    #[test]
    fn test_internal_variable_assignment() {
        let (lists, opts) = defaults();
        assert_eq!(
            classify("button_pressed", &assign("k_tag"), &lists, &opts),
            Decision::NotTranslatable
        );
        assert_eq!(
            classify("Window title here", &assign("m_title"), &lists, &opts),
            Decision::NotTranslatable
        );
    }

    #[test]
    fn test_empty_and_punctuation() {
        let (lists, mut opts) = defaults();
        assert_eq!(
            classify("", &orphan(), &lists, &opts),
            Decision::NotTranslatable
        );
        assert_eq!(
            classify("   ", &orphan(), &lists, &opts),
            Decision::NotTranslatable
        );
        assert_eq!(
            classify("!!!", &orphan(), &lists, &opts),
            Decision::NotTranslatable
        );
        opts.allow_translating_punctuation_only_strings = true;
        // Punctuation-only is permitted but still below the word minimum.
        assert_eq!(
            classify("!!!", &orphan(), &lists, &opts),
            Decision::NotTranslatable
        );
    }

    #[test]
    fn test_code_shapes_are_not_translatable() {
        let (lists, opts) = defaults();
        for s in [
            r"C:\Program Files\App",
            "/usr/local/bin",
            "https://example.com/page",
            "mailto:someone@example.com",
            "{8D3CF2A1-9A4E-4F6B-B1C2-0D9E8F7A6B5C}",
            "0xDEADBEEF",
            "%s",
            "%1",
            "{0}",
            "{name}",
            "<br/>",
            "<b></b>",
            "identifier",
            "42",
            "3.14",
            "*.bmp",
            "image.bmp",
            "text/html",
            "while",
        ] {
            assert_eq!(
                classify(s, &orphan(), &lists, &opts),
                Decision::NotTranslatable,
                "expected {s:?} to classify as not translatable"
            );
        }
    }

    #[test]
    fn test_should_be_translatable_requires_min_words() {
        let (lists, mut opts) = defaults();
        assert_eq!(
            classify(
                "Please save your work before exiting.",
                &call("show"),
                &lists,
                &opts
            ),
            Decision::ShouldBeTranslatable
        );
        assert_eq!(
            classify("Hello", &orphan(), &lists, &opts),
            Decision::NotTranslatable
        );
        opts.min_words_for_classifying_unavailable_string = 7;
        assert_eq!(
            classify(
                "Please save your work before exiting.",
                &call("show"),
                &lists,
                &opts
            ),
            Decision::NotTranslatable
        );
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count("Please save your work before exiting."), 6);
        assert_eq!(word_count("Don't"), 2);
        assert_eq!(word_count("42"), 0);
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("na\u{EF}ve caf\u{E9}"), 2);
    }

    #[test]
    fn test_unencoded_ext_ascii() {
        assert!(has_unencoded_ext_ascii("Copyright \u{A9} 2001"));
        assert!(has_unencoded_ext_ascii("5\u{BC}-Inch"));
        // Accented letters belong to a recognized script.
        assert!(!has_unencoded_ext_ascii("na\u{EF}ve"));
        assert!(!has_unencoded_ext_ascii("plain ascii"));
        // Beyond Latin-1 is out of range for this check.
        assert!(!has_unencoded_ext_ascii("\u{2229}"));
    }

    #[test]
    fn test_font_face_in_ignore_set() {
        let (mut lists, opts) = defaults();
        lists.add_font_names(["Comic Sans"]);
        assert_eq!(
            classify("Comic Sans", &orphan(), &lists, &opts),
            Decision::NotTranslatable
        );
    }

    #[test]
    fn test_code_identifier_shapes() {
        assert!(is_code_identifier("button_pressed"));
        assert!(is_code_identifier("wxString::Format"));
        assert!(is_code_identifier("camelCaseName"));
        assert!(!is_code_identifier("Hello"));
        assert!(!is_code_identifier("Two words"));
    }
}
