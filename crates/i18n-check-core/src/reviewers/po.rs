//! GNU gettext `.po`/`.pot` catalog reviewer.
//!
//! Streams entries (flags, references, `msgctxt`, `msgid`, `msgid_plural`,
//! `msgstr[n]`, multi-line continuations) and runs per-entry consistency
//! checks between source and translated strings.

use crate::classify;
use crate::core::ReviewerCore;
use crate::findings::{StringInfo, UsageContext, WarningId};
use crate::format_spec::{self, Dialect, FormatError};
use crate::lex;
use crate::options::{IgnoreLists, ReviewOptions};
use crate::review_style::ReviewStyle;
use crate::reviewers::Reviewer;
use std::path::Path;
use std::sync::Arc;

/// A value plus where its opening quote sits in the file.
#[derive(Debug, Clone, Default)]
struct PoValue {
    text: String,
    line: usize,
    column: usize,
    offset: usize,
}

#[derive(Debug, Clone, Default)]
struct PoEntry {
    flags: Vec<String>,
    msgctxt: Option<PoValue>,
    msgid: Option<PoValue>,
    msgid_plural: Option<PoValue>,
    msgstrs: Vec<PoValue>,
}

impl PoEntry {
    fn is_empty(&self) -> bool {
        self.msgid.is_none() && self.msgstrs.is_empty() && self.flags.is_empty()
    }

    fn has_flag(&self, name: &str) -> bool {
        self.flags.iter().any(|f| f == name)
    }
}

/// Which value the next continuation line appends to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    None,
    Msgctxt,
    Msgid,
    MsgidPlural,
    Msgstr,
}

pub struct PoReviewer {
    core: ReviewerCore,
    lists: Arc<IgnoreLists>,
}

impl PoReviewer {
    pub fn new(options: ReviewOptions, lists: Arc<IgnoreLists>) -> Self {
        Self {
            core: ReviewerCore::new(options),
            lists,
        }
    }
}

impl Reviewer for PoReviewer {
    fn process(&mut self, text: &str, file_name: &Path) {
        self.core.note_file();

        let mut entry = PoEntry::default();
        let mut field = Field::None;
        let mut offset = 0usize;

        for (line_idx, raw_line) in text.split('\n').enumerate() {
            let line_no = line_idx + 1;
            let line = raw_line.strip_suffix('\r').unwrap_or(raw_line);
            let trimmed = line.trim();

            if trimmed.is_empty() {
                self.finish_entry(std::mem::take(&mut entry), file_name);
                field = Field::None;
            } else if let Some(flag_list) = trimmed.strip_prefix("#,") {
                entry
                    .flags
                    .extend(flag_list.split(',').map(|f| f.trim().to_string()));
            } else if trimmed.starts_with('#') {
                // references (#:), translator and extracted comments
            } else if trimmed.starts_with("msgctxt") {
                entry.msgctxt = parse_value(line, line_no, offset);
                field = Field::Msgctxt;
            } else if trimmed.starts_with("msgid_plural") {
                entry.msgid_plural = parse_value(line, line_no, offset);
                field = Field::MsgidPlural;
            } else if trimmed.starts_with("msgid") {
                if entry.msgid.is_some() && !entry.msgstrs.is_empty() {
                    self.finish_entry(std::mem::take(&mut entry), file_name);
                }
                entry.msgid = parse_value(line, line_no, offset);
                field = Field::Msgid;
            } else if trimmed.starts_with("msgstr") {
                if let Some(value) = parse_value(line, line_no, offset) {
                    entry.msgstrs.push(value);
                }
                field = Field::Msgstr;
            } else if trimmed.starts_with('"') {
                let continuation = parse_value(line, line_no, offset);
                if let Some(cont) = continuation {
                    let target = match field {
                        Field::Msgctxt => entry.msgctxt.as_mut(),
                        Field::Msgid => entry.msgid.as_mut(),
                        Field::MsgidPlural => entry.msgid_plural.as_mut(),
                        Field::Msgstr => entry.msgstrs.last_mut(),
                        Field::None => None,
                    };
                    if let Some(value) = target {
                        value.text.push_str(&cont.text);
                    }
                }
            }

            offset += raw_line.len() + 1;
        }
        self.finish_entry(entry, file_name);
    }

    fn core(&self) -> &ReviewerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ReviewerCore {
        &mut self.core
    }

    fn into_core(self: Box<Self>) -> ReviewerCore {
        self.core
    }
}

/// Extract the quoted, escape-decoded value of a `msgid "..."`-style line.
fn parse_value(line: &str, line_no: usize, line_offset: usize) -> Option<PoValue> {
    let start = line.find('"')?;
    let end = line.rfind('"')?;
    if end <= start {
        return None;
    }
    Some(PoValue {
        text: lex::decode_escapes(&line[start + 1..end], false).text,
        line: line_no,
        column: start + 1,
        offset: line_offset + start,
    })
}

fn has_accelerator(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'&' {
            if bytes.get(i + 1) == Some(&b'&') {
                i += 2;
                continue;
            }
            if bytes.get(i + 1).is_some_and(|b| b.is_ascii_alphanumeric()) {
                return true;
            }
        }
        i += 1;
    }
    false
}

/// Terminal punctuation of a string, with `...` folded into the ellipsis.
fn end_punctuation(s: &str) -> Option<char> {
    let trimmed = s.trim_end();
    if trimmed.ends_with("...") {
        return Some('\u{2026}');
    }
    let last = trimmed.chars().last()?;
    matches!(last, '.' | '!' | '?' | ':' | '\u{2026}').then_some(last)
}

fn leading_whitespace(s: &str) -> &str {
    &s[..s.len() - s.trim_start().len()]
}

fn trailing_whitespace(s: &str) -> &str {
    &s[s.trim_end().len()..]
}

impl PoReviewer {
    fn push_inconsistency(
        &mut self,
        value: &PoValue,
        file_name: &Path,
        msgid: &str,
        explanation: String,
    ) {
        ReviewerCore::push_dedup(
            &mut self.core.buckets_mut().translation_inconsistencies,
            StringInfo::warning(
                value.text.clone(),
                file_name,
                value.line,
                value.column,
                value.offset,
                UsageContext::Orphan(format!("msgid \"{msgid}\"")),
                WarningId::TransInconsistency,
                explanation,
            ),
        );
    }

    fn finish_entry(&mut self, entry: PoEntry, file_name: &Path) {
        if entry.is_empty() {
            return;
        }
        let style = self.core.style();
        let options = self.core.options().clone();
        let Some(msgid) = entry.msgid.clone() else {
            return;
        };
        // The catalog header carries metadata, not a translation.
        if msgid.text.is_empty() {
            return;
        }

        let fuzzy = entry.has_flag("fuzzy");
        if fuzzy {
            if !options.fuzzy_translations {
                return;
            }
            if style.contains(ReviewStyle::CHECK_CONSISTENCY) {
                self.push_inconsistency(
                    &msgid,
                    file_name,
                    &msgid.text,
                    "Entry is flagged fuzzy; the translation needs review.".to_string(),
                );
            }
        }

        if style.contains(ReviewStyle::CHECK_NEEDING_CONTEXT)
            && entry.msgctxt.is_none()
            && classify::word_count(&msgid.text) < 3
            && !classify::looks_like_non_text(&msgid.text, &self.lists)
        {
            ReviewerCore::push_dedup(
                &mut self.core.buckets_mut().translation_inconsistencies,
                StringInfo::warning(
                    msgid.text.clone(),
                    file_name,
                    msgid.line,
                    msgid.column,
                    msgid.offset,
                    UsageContext::Orphan(format!("msgid \"{}\"", msgid.text)),
                    WarningId::L10nStringNeedsContext,
                    "Short source string has no msgctxt; translators may lack context.",
                ),
            );
        }

        let c_format = !entry.has_flag("no-c-format")
            && (entry.has_flag("c-format")
                || !format_spec::parse(&msgid.text, Dialect::Printf).0.is_empty());

        let plural = entry.msgid_plural.is_some();

        for msgstr in &entry.msgstrs {
            if msgstr.text.is_empty() {
                // Catalog in progress; an untranslated entry is not an error.
                continue;
            }

            if c_format {
                self.check_printf(&msgid, msgstr, file_name, plural);
            }

            if style.contains(ReviewStyle::CHECK_ACCELERATORS)
                && has_accelerator(&msgid.text) != has_accelerator(&msgstr.text)
            {
                ReviewerCore::push_dedup(
                    &mut self.core.buckets_mut().translation_inconsistencies,
                    StringInfo::warning(
                        msgstr.text.clone(),
                        file_name,
                        msgstr.line,
                        msgstr.column,
                        msgstr.offset,
                        UsageContext::Orphan(format!("msgid \"{}\"", msgid.text)),
                        WarningId::AcceleratorMismatch,
                        "Keyboard accelerator (&) appears on only one side of the translation pair.",
                    ),
                );
            }

            if style.contains(ReviewStyle::CHECK_CONSISTENCY) {
                if leading_whitespace(&msgid.text) != leading_whitespace(&msgstr.text)
                    || trailing_whitespace(&msgid.text) != trailing_whitespace(&msgstr.text)
                {
                    self.push_inconsistency(
                        msgstr,
                        file_name,
                        &msgid.text,
                        "Surrounding whitespace differs between msgid and msgstr.".to_string(),
                    );
                } else if end_punctuation(&msgid.text) != end_punctuation(&msgstr.text) {
                    self.push_inconsistency(
                        msgstr,
                        file_name,
                        &msgid.text,
                        "Terminal punctuation differs between msgid and msgstr.".to_string(),
                    );
                }

                let source_urls = classify::extract_urls(&msgid.text);
                if !source_urls.is_empty() {
                    let translated_urls = classify::extract_urls(&msgstr.text);
                    if !translated_urls.is_empty() && translated_urls != source_urls {
                        self.push_inconsistency(
                            msgstr,
                            file_name,
                            &msgid.text,
                            format!(
                                "URL changed in translation: {} vs {}.",
                                source_urls.join(", "),
                                translated_urls.join(", ")
                            ),
                        );
                    }
                }
            }
        }
    }

    fn check_printf(&mut self, msgid: &PoValue, msgstr: &PoValue, file_name: &Path, plural: bool) {
        let style = self.core.style();
        let (source, source_errors) = format_spec::parse(&msgid.text, Dialect::Printf);
        let (translated, translated_errors) = format_spec::parse(&msgstr.text, Dialect::Printf);

        let mixed = |errors: &[FormatError]| {
            errors.iter().any(|e| matches!(e, FormatError::MixedIndexing))
        };
        if mixed(&source_errors) || mixed(&translated_errors) {
            if style.contains(ReviewStyle::CHECK_MALFORMED_STRINGS) {
                let place = if mixed(&translated_errors) { msgstr } else { msgid };
                ReviewerCore::push_dedup(
                    &mut self.core.buckets_mut().malformed_strings,
                    StringInfo::warning(
                        place.text.clone(),
                        file_name,
                        place.line,
                        place.column,
                        place.offset,
                        UsageContext::Orphan(format!("msgid \"{}\"", msgid.text)),
                        WarningId::MalformedString,
                        "Format string mixes positional and sequential specifiers.",
                    ),
                );
            }
            return;
        }

        // Plural source strings legitimately drop the count specifier in
        // some languages; only compare exact counts for non-plural entries.
        if plural && translated.len() < source.len() {
            return;
        }

        if style.contains(ReviewStyle::CHECK_MISMATCHING_PRINTF_COMMANDS)
            && !format_spec::compatible(&source, &translated)
        {
            let explanation = format!(
                "printf specifiers differ: msgid \"{}\" vs msgstr \"{}\".",
                msgid.text, msgstr.text
            );
            ReviewerCore::push_dedup(
                &mut self.core.buckets_mut().printf_mismatches,
                StringInfo::warning(
                    msgstr.text.clone(),
                    file_name,
                    msgstr.line,
                    msgstr.column,
                    msgstr.offset,
                    UsageContext::Orphan(format!("msgid \"{}\"", msgid.text)),
                    WarningId::PrintfMismatch,
                    explanation,
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ReviewOptions;

    fn review(text: &str) -> PoReviewer {
        review_with(text, ReviewOptions::default())
    }

    fn review_with(text: &str, options: ReviewOptions) -> PoReviewer {
        let (lists, _) = IgnoreLists::build(&options);
        let mut reviewer = PoReviewer::new(options, Arc::new(lists));
        reviewer.process(text, Path::new("fr.po"));
        reviewer
    }

    #[test]
    fn test_printf_mismatch_references_msgstr_line() {
        let text = "#, c-format\nmsgid \"%d files\"\nmsgstr \"%s fichiers\"\n";
        let r = review(text);
        let bucket = &r.core().buckets().printf_mismatches;
        assert_eq!(bucket.len(), 1);
        assert_eq!(bucket[0].warning_id, Some(WarningId::PrintfMismatch));
        assert_eq!(bucket[0].line, 3);
        assert_eq!(bucket[0].string, "%s fichiers");
    }

    #[test]
    fn test_c_format_auto_detected() {
        let text = "msgid \"%d files\"\nmsgstr \"%s fichiers\"\n";
        let r = review(text);
        assert_eq!(r.core().buckets().printf_mismatches.len(), 1);
    }

    #[test]
    fn test_no_c_format_flag_suppresses() {
        let text = "#, no-c-format\nmsgid \"%d files\"\nmsgstr \"%s fichiers\"\n";
        let r = review(text);
        assert!(r.core().buckets().printf_mismatches.is_empty());
    }

    #[test]
    fn test_compatible_formats_pass() {
        let text = "#, c-format\nmsgid \"%d of %s\"\nmsgstr \"%d sur %s\"\n";
        let r = review(text);
        assert!(r.core().buckets().printf_mismatches.is_empty());
    }

    #[test]
    fn test_fuzzy_entries() {
        let text = "#, fuzzy\nmsgid \"Save the file\"\nmsgstr \"Enregistrer\"\n";
        // Fuzzy entries are skipped unless their review is requested.
        let r = review(text);
        assert!(r.core().buckets().findings().next().is_none());

        let options = ReviewOptions {
            fuzzy_translations: true,
            ..ReviewOptions::default()
        };
        let r = review_with(text, options);
        let bucket = &r.core().buckets().translation_inconsistencies;
        assert!(bucket
            .iter()
            .any(|f| f.warning_id == Some(WarningId::TransInconsistency)));
    }

    #[test]
    fn test_accelerator_mismatch() {
        let text = "msgid \"&Open a file\"\nmsgstr \"Ouvrir un fichier\"\n";
        let r = review(text);
        let bucket = &r.core().buckets().translation_inconsistencies;
        assert_eq!(bucket.len(), 1);
        assert_eq!(bucket[0].warning_id, Some(WarningId::AcceleratorMismatch));
    }

    #[test]
    fn test_double_ampersand_is_not_an_accelerator() {
        let text = "msgid \"Drag && drop the files\"\nmsgstr \"Glisser && deposer les fichiers\"\n";
        let r = review(text);
        assert!(r.core().buckets().translation_inconsistencies.is_empty());
    }

    #[test]
    fn test_whitespace_inconsistency() {
        let text = "msgid \"Print the page \"\nmsgstr \"Imprimer la page\"\n";
        let r = review(text);
        let bucket = &r.core().buckets().translation_inconsistencies;
        assert_eq!(bucket.len(), 1);
        assert!(bucket[0].explanation.contains("whitespace"));
    }

    #[test]
    fn test_punctuation_inconsistency() {
        let text = "msgid \"Save the changes now.\"\nmsgstr \"Enregistrer les modifications\"\n";
        let r = review(text);
        let bucket = &r.core().buckets().translation_inconsistencies;
        assert_eq!(bucket.len(), 1);
        assert!(bucket[0].explanation.contains("punctuation"));
    }

    #[test]
    fn test_ellipsis_forms_are_equivalent() {
        let text = "msgid \"Loading the data...\"\nmsgstr \"Chargement\u{2026}\"\n";
        let r = review(text);
        assert!(r.core().buckets().translation_inconsistencies.is_empty());
    }

    #[test]
    fn test_url_changed_in_translation() {
        let text = "msgid \"See https://example.com/help for details\"\nmsgstr \"Voir https://autre.example/aide pour details\"\n";
        let r = review(text);
        let bucket = &r.core().buckets().translation_inconsistencies;
        assert_eq!(bucket.len(), 1);
        assert!(bucket[0].explanation.contains("URL"));
    }

    #[test]
    fn test_needs_context_for_short_strings() {
        let options = ReviewOptions {
            style: ReviewStyle::default() | ReviewStyle::CHECK_NEEDING_CONTEXT,
            ..ReviewOptions::default()
        };
        let text = "msgid \"Open\"\nmsgstr \"Ouvrir\"\n\nmsgctxt \"menu\"\nmsgid \"Close\"\nmsgstr \"Fermer\"\n";
        let r = review_with(text, options);
        let bucket = &r.core().buckets().translation_inconsistencies;
        let context_findings: Vec<_> = bucket
            .iter()
            .filter(|f| f.warning_id == Some(WarningId::L10nStringNeedsContext))
            .collect();
        assert_eq!(context_findings.len(), 1);
        assert_eq!(context_findings[0].string, "Open");
    }

    #[test]
    fn test_empty_msgstr_is_not_an_error() {
        let text = "msgid \"Save the file now.\"\nmsgstr \"\"\n";
        let r = review(text);
        assert!(r.core().buckets().findings().next().is_none());
    }

    #[test]
    fn test_header_entry_skipped() {
        let text = "msgid \"\"\nmsgstr \"\"\n\"Project-Id-Version: demo 1.0\\n\"\n\"Content-Type: text/plain; charset=UTF-8\\n\"\n";
        let r = review(text);
        assert!(r.core().buckets().findings().next().is_none());
    }

    #[test]
    fn test_multi_line_values_concatenated() {
        let text = concat!(
            "#, c-format\n",
            "msgid \"\"\n\"Found %d files \"\n\"in the folder.\"\n",
            "msgstr \"\"\n\"%s fichiers \"\n\"dans le dossier.\"\n",
        );
        let r = review(text);
        let bucket = &r.core().buckets().printf_mismatches;
        assert_eq!(bucket.len(), 1);
        assert_eq!(bucket[0].string, "%s fichiers dans le dossier.");
    }

    #[test]
    fn test_plural_entries_compared_leniently() {
        let text = concat!(
            "#, c-format\n",
            "msgid \"%d file\"\n",
            "msgid_plural \"%d files\"\n",
            "msgstr[0] \"jeden soubor\"\n",
            "msgstr[1] \"%d soubory\"\n",
        );
        let r = review(text);
        assert!(r.core().buckets().printf_mismatches.is_empty());
    }

    #[test]
    fn test_mixed_positional_is_malformed() {
        let text = "#, c-format\nmsgid \"%1$s %d\"\nmsgstr \"%1$s %d\"\n";
        let r = review(text);
        let bucket = &r.core().buckets().malformed_strings;
        assert!(!bucket.is_empty());
        assert_eq!(bucket[0].warning_id, Some(WarningId::MalformedString));
    }
}
