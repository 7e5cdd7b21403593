//! Analysis configuration: the options record and the frozen ignore lists.

use crate::error::ConfigWarning;
use crate::review_style::ReviewStyle;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

fn default_true() -> bool {
    true
}

fn default_min_words() -> usize {
    2
}

fn default_min_cpp_version() -> u32 {
    14
}

/// Options for a review run.
///
/// This is the record the CLI (or an embedding UI) hands to the engine; it
/// carries only plain data so it can be persisted alongside a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewOptions {
    /// Which checks to run.
    #[serde(default)]
    pub style: ReviewStyle,

    /// Treat strings passed to logging functions as translatable.
    #[serde(default = "default_true")]
    pub log_messages_can_be_translatable: bool,

    /// Allow strings containing only punctuation to be translatable.
    #[serde(default)]
    pub allow_translating_punctuation_only_strings: bool,

    /// Treat strings passed to exception constructors as translatable.
    #[serde(default = "default_true")]
    pub exceptions_should_be_translatable: bool,

    /// Minimum number of natural-language words before a plain string is
    /// reported as not available for localization. Always at least 1.
    #[serde(default = "default_min_words")]
    pub min_words_for_classifying_unavailable_string: usize,

    /// Minimum C++ standard (year) assumed when scanning. Trigraphs are only
    /// recognized below C++17.
    #[serde(default = "default_min_cpp_version")]
    pub min_cpp_version: u32,

    /// Regex patterns for variable names whose assigned strings are ignored.
    /// Compiled once by [`IgnoreLists::build`]; invalid patterns are dropped
    /// with a [`ConfigWarning`].
    #[serde(default)]
    pub variable_name_patterns_to_ignore: Vec<String>,

    /// Review entries flagged fuzzy in `.po` catalogs.
    #[serde(default)]
    pub fuzzy_translations: bool,
}

impl Default for ReviewOptions {
    fn default() -> Self {
        Self {
            style: ReviewStyle::default(),
            log_messages_can_be_translatable: true,
            allow_translating_punctuation_only_strings: false,
            exceptions_should_be_translatable: true,
            min_words_for_classifying_unavailable_string: 2,
            min_cpp_version: 14,
            variable_name_patterns_to_ignore: Vec::new(),
            fuzzy_translations: false,
        }
    }
}

impl ReviewOptions {
    /// Clamped minimum word count (the option is meaningless at zero).
    pub fn min_words(&self) -> usize {
        self.min_words_for_classifying_unavailable_string.max(1)
    }
}

/// Functions whose string argument is intended for translation.
const TRANSLATION_FUNCTIONS: &[&str] = &[
    "_",
    "gettext",
    "dgettext",
    "ngettext",
    "pgettext",
    "dpgettext",
    "wxTRANSLATE",
    "wxPLURAL",
    "wxGetTranslation",
    "QT_TR_NOOP",
    "QT_TRANSLATE_NOOP",
    "tr",
    "trUtf8",
    "translate",
    "GetString",
];

/// Translation-adjacent helpers treated as translation calls only when log
/// messages are translatable (see `log_messages_can_be_translatable`).
const CONDITIONAL_TRANSLATION_FUNCTIONS: &[&str] = &["_T", "_TEXT"];

/// Logging and assertion functions. Their arguments are non-translatable
/// unless log messages are configured as translatable.
const LOG_FUNCTIONS: &[&str] = &[
    "wxLogMessage",
    "wxLogError",
    "wxLogWarning",
    "wxLogDebug",
    "wxLogTrace",
    "wxLogVerbose",
    "wxASSERT_MSG",
    "wxFAIL_MSG",
    "assert",
    "LogDebug",
    "LogTrace",
    "Debug",
    "Trace",
    "qDebug",
    "qWarning",
    "qCritical",
    "SDL_Log",
    "printf",
    "fprintf",
    "perror",
];

/// Functions that always take an identifier, path, or other machine value.
const IDENTIFIER_FUNCTIONS: &[&str] = &[
    "SetName",
    "GetName",
    "XRCID",
    "XRCCTRL",
    "FindWindow",
    "LoadLibrary",
    "GetProcAddress",
    "fopen",
    "open",
    "getenv",
    "setenv",
    "strcmp",
    "strncmp",
    "strstr",
    "wcscmp",
    "wcsncmp",
    "RegisterClass",
    "CreateEvent",
    "CreateMutex",
];

/// Exception constructors; translatable only when
/// `exceptions_should_be_translatable` is set.
const EXCEPTION_TYPES: &[&str] = &[
    "runtime_error",
    "logic_error",
    "invalid_argument",
    "out_of_range",
    "domain_error",
    "length_error",
    "range_error",
    "overflow_error",
    "underflow_error",
    "Exception",
    "ArgumentException",
    "InvalidOperationException",
    "NotSupportedException",
];

/// Markers for strings deliberately excluded from translation.
const DO_NOT_TRANSLATE_FUNCTIONS: &[&str] = &["_DT", "DONTTRANSLATE", "wxS"];

/// Variable-name prefixes that mark internal state.
const INTERNAL_PREFIXES: &[&str] = &["m_", "s_", "g_", "k"];

/// Dialog fonts that map cleanly across Windows versions.
const SYSTEM_FONTS: &[&str] = &["MS Shell Dlg", "MS Shell Dlg 2", "Segoe UI"];

/// Font faces that are also real words and must stay classifiable as text.
const FONT_NAMES_THAT_ARE_WORDS: &[&str] = &["Symbol", "Modern"];

/// Process-wide ignore lists, frozen after construction.
///
/// Built once at configuration time (before any reviewer touches a file) and
/// shared by reference; never mutated during analysis.
#[derive(Debug)]
pub struct IgnoreLists {
    translation_functions: HashSet<String>,
    conditional_translation_functions: HashSet<String>,
    log_functions: HashSet<String>,
    identifier_functions: HashSet<String>,
    exception_types: HashSet<String>,
    do_not_translate_functions: HashSet<String>,
    font_names: HashSet<String>,
    system_fonts: Vec<String>,
    internal_prefixes: Vec<String>,
    internal_namespaces: Vec<String>,
    variable_patterns: Vec<Regex>,
}

impl IgnoreLists {
    /// Build the lists from the options, compiling the variable-name
    /// patterns leniently: invalid regexes are dropped and reported.
    pub fn build(options: &ReviewOptions) -> (Self, Vec<ConfigWarning>) {
        let mut warnings = Vec::new();
        let variable_patterns = options
            .variable_name_patterns_to_ignore
            .iter()
            .filter_map(|pattern| match Regex::new(pattern) {
                Ok(re) => Some(re),
                Err(e) => {
                    warnings.push(ConfigWarning {
                        value: pattern.clone(),
                        message: e.to_string(),
                    });
                    None
                }
            })
            .collect();

        let to_set = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();

        let lists = Self {
            translation_functions: to_set(TRANSLATION_FUNCTIONS),
            conditional_translation_functions: to_set(CONDITIONAL_TRANSLATION_FUNCTIONS),
            log_functions: to_set(LOG_FUNCTIONS),
            identifier_functions: to_set(IDENTIFIER_FUNCTIONS),
            exception_types: to_set(EXCEPTION_TYPES),
            do_not_translate_functions: to_set(DO_NOT_TRANSLATE_FUNCTIONS),
            font_names: HashSet::new(),
            system_fonts: SYSTEM_FONTS.iter().map(|s| s.to_string()).collect(),
            internal_prefixes: INTERNAL_PREFIXES.iter().map(|s| s.to_string()).collect(),
            internal_namespaces: vec!["internal".to_string(), "detail".to_string()],
            variable_patterns,
        };
        (lists, warnings)
    }

    /// Register font face names to skip during classification. Faces that
    /// are also real words are not registered (they may legitimately appear
    /// in user-facing text).
    pub fn add_font_names<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            let name = name.as_ref();
            if FONT_NAMES_THAT_ARE_WORDS
                .iter()
                .any(|w| w.eq_ignore_ascii_case(name))
            {
                continue;
            }
            self.font_names.insert(name.to_lowercase());
        }
    }

    /// Register an extra function name to treat as a translation call.
    pub fn add_translator_helper(&mut self, name: impl Into<String>) {
        self.translation_functions.insert(name.into());
    }

    /// Register an extra function whose arguments are never translatable.
    pub fn add_non_translatable_function(&mut self, name: impl Into<String>) {
        self.identifier_functions.insert(name.into());
    }

    pub fn is_translation_function(&self, name: &str, log_translatable: bool) -> bool {
        self.translation_functions.contains(name)
            || (log_translatable && self.conditional_translation_functions.contains(name))
    }

    pub fn is_log_function(&self, name: &str) -> bool {
        self.log_functions.contains(name)
    }

    pub fn is_identifier_function(&self, name: &str) -> bool {
        self.identifier_functions.contains(name)
    }

    pub fn is_exception_type(&self, name: &str) -> bool {
        self.exception_types.contains(name)
    }

    pub fn is_do_not_translate(&self, name: &str) -> bool {
        self.do_not_translate_functions.contains(name)
    }

    pub fn is_ignored_font(&self, face: &str) -> bool {
        self.font_names.contains(&face.to_lowercase())
    }

    /// Recommended dialog font faces (the §4.6 policy list, parameterized).
    pub fn system_fonts(&self) -> &[String] {
        &self.system_fonts
    }

    pub fn is_system_font(&self, face: &str) -> bool {
        self.system_fonts.iter().any(|f| f.eq_ignore_ascii_case(face))
    }

    /// Whether a variable name marks internal state (`m_`, `s_`, `g_`, `k`
    /// prefixes or a configured pattern).
    pub fn is_internal_variable(&self, name: &str) -> bool {
        for prefix in &self.internal_prefixes {
            if prefix == "k" {
                // A bare `k` needs kCamelCase or k_snake to count as a prefix.
                if let Some(rest) = name.strip_prefix('k') {
                    if rest.starts_with(|c: char| c.is_ascii_uppercase()) || rest.starts_with('_')
                    {
                        return true;
                    }
                }
            } else if name.starts_with(prefix.as_str()) {
                return true;
            }
        }
        self.variable_patterns.iter().any(|re| re.is_match(name))
    }

    /// Whether a qualified name lives in an internal namespace.
    pub fn is_internal_namespace(&self, qualified: &str) -> bool {
        self.internal_namespaces
            .iter()
            .any(|ns| qualified.starts_with(ns.as_str()) || qualified.contains(&format!("{ns}::")))
    }
}

impl Default for IgnoreLists {
    fn default() -> Self {
        IgnoreLists::build(&ReviewOptions::default()).0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translation_function_lookup() {
        let lists = IgnoreLists::default();
        assert!(lists.is_translation_function("gettext", true));
        assert!(lists.is_translation_function("tr", false));
        assert!(lists.is_translation_function("_T", true));
        assert!(!lists.is_translation_function("_T", false));
        assert!(!lists.is_translation_function("strcmp", true));
    }

    #[test]
    fn test_internal_variable_prefixes() {
        let lists = IgnoreLists::default();
        assert!(lists.is_internal_variable("m_label"));
        assert!(lists.is_internal_variable("s_instance"));
        assert!(lists.is_internal_variable("g_state"));
        assert!(lists.is_internal_variable("kMaxItems"));
        assert!(lists.is_internal_variable("k_tag"));
        assert!(!lists.is_internal_variable("label"));
        assert!(!lists.is_internal_variable("kilometers"));
    }

    #[test]
    fn test_variable_pattern_compilation_is_lenient() {
        let options = ReviewOptions {
            variable_name_patterns_to_ignore: vec![
                "^tmp".to_string(),
                "[unclosed".to_string(),
            ],
            ..ReviewOptions::default()
        };
        let (lists, warnings) = IgnoreLists::build(&options);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].value, "[unclosed");
        assert!(lists.is_internal_variable("tmpBuffer"));
    }

    #[test]
    fn test_font_name_registration_skips_real_words() {
        let mut lists = IgnoreLists::default();
        lists.add_font_names(["Comic Sans", "Symbol", "Modern"]);
        assert!(lists.is_ignored_font("comic sans"));
        assert!(!lists.is_ignored_font("Symbol"));
        assert!(!lists.is_ignored_font("Modern"));
    }

    #[test]
    fn test_system_fonts_default() {
        let lists = IgnoreLists::default();
        assert!(lists.is_system_font("MS Shell Dlg"));
        assert!(lists.is_system_font("Segoe UI"));
        assert!(!lists.is_system_font("Comic Sans"));
    }

    #[test]
    fn test_min_words_clamps_to_one() {
        let options = ReviewOptions {
            min_words_for_classifying_unavailable_string: 0,
            ..ReviewOptions::default()
        };
        assert_eq!(options.min_words(), 1);
    }
}
