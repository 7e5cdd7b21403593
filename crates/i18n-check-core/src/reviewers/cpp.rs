//! C/C++/Objective-C source reviewer.
//!
//! A single forward pass over the text drives a small state machine: code,
//! comments, preprocessor directives, string/char literals, raw strings, and
//! inline assembly. Every completed logical string literal (adjacent
//! segments concatenated) is classified and routed into a bucket.

use crate::core::{IdAssignment, ReviewerCore};
use crate::findings::{StringInfo, UsageContext, WarningId};
use crate::lex::{self, LineIndex};
use crate::options::{IgnoreLists, ReviewOptions};
use crate::review_style::ReviewStyle;
use crate::reviewers::{determine_usage, record_malformed, route_literal, Reviewer};
use std::path::Path;
use std::sync::Arc;

/// Text macros superseded since wxWidgets 3.0 / the TCHAR era.
const DEPRECATED_TEXT_MACROS: &[(&str, &str)] = &[
    (
        "wxT",
        "wxT() has been unnecessary since wxWidgets 3.0; use a plain string literal.",
    ),
    (
        "wxT_2",
        "wxT_2() has been unnecessary since wxWidgets 3.0; use a plain string literal.",
    ),
    (
        "_TEXT",
        "TCHAR-era text macro; use an explicit wide or UTF-8 literal.",
    ),
    (
        "__TEXT",
        "TCHAR-era text macro; use an explicit wide or UTF-8 literal.",
    ),
];

pub struct CppReviewer {
    core: ReviewerCore,
    lists: Arc<IgnoreLists>,
}

impl CppReviewer {
    pub fn new(options: ReviewOptions, lists: Arc<IgnoreLists>) -> Self {
        Self {
            core: ReviewerCore::new(options),
            lists,
        }
    }
}

impl Reviewer for CppReviewer {
    fn process(&mut self, text: &str, file_name: &Path) {
        self.core.note_file();
        self.core.review_source_lines(text, file_name, true);
        let lists = Arc::clone(&self.lists);
        scan(&mut self.core, &lists, text, file_name);
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

/// Prefix of a string literal: (raw, wide).
fn string_prefix(ident: &str) -> Option<(bool, bool)> {
    match ident {
        "L" | "u" | "U" => Some((false, true)),
        "u8" => Some((false, false)),
        "R" => Some((true, false)),
        "LR" | "uR" | "UR" => Some((true, true)),
        "u8R" => Some((true, false)),
        _ => None,
    }
}

fn looks_like_resource_id(name: &str) -> bool {
    (name.len() > 2
        && name.starts_with("ID")
        && name
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_'))
        || name.ends_with("_ID")
}

/// Parse a decimal or hex integer literal at `pos`; returns (value, end).
fn parse_int_literal(text: &str, pos: usize) -> Option<(i64, usize)> {
    let bytes = text.as_bytes();
    let mut i = pos;
    let hex = text[i..].starts_with("0x") || text[i..].starts_with("0X");
    if hex {
        i += 2;
    }
    let start = i;
    while i < bytes.len()
        && (bytes[i].is_ascii_digit() || (hex && bytes[i].is_ascii_hexdigit()) || bytes[i] == b'\'')
    {
        i += 1;
    }
    if i == start {
        return None;
    }
    // A following identifier character means this is not a plain number.
    if i < bytes.len() && lex::is_ident_byte(bytes[i]) {
        return None;
    }
    let digits: String = text[start..i].chars().filter(|c| *c != '\'').collect();
    let value = if hex {
        i64::from_str_radix(&digits, 16).ok()?
    } else {
        digits.parse().ok()?
    };
    Some((value, i))
}

fn at_logical_line_start(bytes: &[u8], pos: usize) -> bool {
    let mut i = pos;
    while i > 0 {
        i -= 1;
        match bytes[i] {
            b' ' | b'\t' | b'\r' => {}
            b'\n' => return true,
            _ => return false,
        }
    }
    true
}

fn read_identifier_end(bytes: &[u8], start: usize) -> usize {
    let mut i = start;
    while i < bytes.len() && lex::is_ident_byte(bytes[i]) {
        i += 1;
    }
    i
}

fn skip_whitespace(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

/// Skip an inline assembly body. The keyword has already been consumed; the
/// body is braces, parentheses, or a single statement line, and no strings
/// are extracted from it.
fn skip_assembly_block(bytes: &[u8], after_keyword: usize) -> usize {
    let mut i = skip_whitespace(bytes, after_keyword);
    match bytes.get(i) {
        Some(b'{') => {
            let mut depth = 1u32;
            i += 1;
            while i < bytes.len() && depth > 0 {
                match bytes[i] {
                    b'{' => depth += 1,
                    b'}' => depth -= 1,
                    _ => {}
                }
                i += 1;
            }
            i
        }
        Some(b'(') => {
            let mut depth = 1u32;
            i += 1;
            while i < bytes.len() && depth > 0 {
                match bytes[i] {
                    b'(' => depth += 1,
                    b')' => depth -= 1,
                    _ => {}
                }
                i += 1;
            }
            i
        }
        _ => {
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
            i
        }
    }
}

fn skip_char_literal(bytes: &[u8], pos: usize) -> usize {
    // Digit separators inside numeric literals are not character literals.
    if pos > 0
        && bytes[pos - 1].is_ascii_alphanumeric()
        && bytes.get(pos + 1).is_some_and(|b| b.is_ascii_alphanumeric())
    {
        return pos + 1;
    }
    let mut i = pos + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\'' => return i + 1,
            b'\n' => return i,
            _ => i += 1,
        }
    }
    bytes.len()
}

fn scan(core: &mut ReviewerCore, lists: &IgnoreLists, text: &str, file_name: &Path) {
    let index = LineIndex::new(text);
    let bytes = text.as_bytes();
    let trigraphs = core.options().min_cpp_version < 17;
    let check_deprecated = core.style().contains(ReviewStyle::CHECK_DEPRECATED_MACROS);

    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                i = lex::skip_line_comment(text, i);
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = lex::skip_block_comment(text, i);
            }
            b'#' if at_logical_line_start(bytes, i) => {
                i = process_preprocessor(core, lists, text, file_name, &index, i);
            }
            b'?' if trigraphs
                && text[i..].starts_with("??=")
                && at_logical_line_start(bytes, i) =>
            {
                i = process_preprocessor(core, lists, text, file_name, &index, i + 2);
            }
            b'"' => {
                i = process_logical_string(
                    core, lists, text, file_name, &index, i, i, false, false, None,
                );
            }
            b'\'' => {
                i = skip_char_literal(bytes, i);
            }
            b if lex::is_ident_start(b) => {
                let end = read_identifier_end(bytes, i);
                let ident = &text[i..end];

                if matches!(ident, "asm" | "__asm" | "__asm__")
                    && bytes
                        .get(end)
                        .is_some_and(|b| b.is_ascii_whitespace() || *b == b'(')
                {
                    i = skip_assembly_block(bytes, end);
                    continue;
                }

                if let Some((raw, wide)) = string_prefix(ident) {
                    if bytes.get(end) == Some(&b'"') {
                        i = process_logical_string(
                            core, lists, text, file_name, &index, i, end, raw, wide, None,
                        );
                        continue;
                    }
                }

                if check_deprecated {
                    if let Some((_, message)) = DEPRECATED_TEXT_MACROS
                        .iter()
                        .find(|(name, _)| *name == ident)
                    {
                        if bytes.get(skip_whitespace(bytes, end)) == Some(&b'(') {
                            let (line, column) = index.location(i);
                            ReviewerCore::push_dedup(
                                &mut core.buckets_mut().deprecated_macros,
                                StringInfo::warning(
                                    ident,
                                    file_name,
                                    line,
                                    column,
                                    i,
                                    UsageContext::FunctionCall(ident.to_string()),
                                    WarningId::DeprecatedMacro,
                                    *message,
                                ),
                            );
                        }
                    }
                }

                if looks_like_resource_id(ident) {
                    if let Some(next) = try_id_assignment(core, text, file_name, &index, i, end) {
                        i = next;
                        continue;
                    }
                }

                i = end;
            }
            _ => i += 1,
        }
    }
}

/// `IDENT = <number>` at statement level records an id assignment.
fn try_id_assignment(
    core: &mut ReviewerCore,
    text: &str,
    file_name: &Path,
    index: &LineIndex,
    ident_start: usize,
    ident_end: usize,
) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut i = skip_whitespace(bytes, ident_end);
    if bytes.get(i) != Some(&b'=') || bytes.get(i + 1) == Some(&b'=') {
        return None;
    }
    i = skip_whitespace(bytes, i + 1);
    let (value, end) = parse_int_literal(text, i)?;
    let (line, column) = index.location(ident_start);
    core.add_id_assignment(IdAssignment {
        name: text[ident_start..ident_end].to_string(),
        value,
        file_name: file_name.to_path_buf(),
        line,
        column,
        offset: ident_start,
    });
    Some(end)
}

/// Process one logical string literal starting at `first_quote` (with its
/// prefix, if any, at `token_start`). Adjacent literals separated only by
/// whitespace are concatenated; escapes are decoded segment by segment; raw
/// segments are taken verbatim. Returns the scan position after the last
/// segment.
#[allow(clippy::too_many_arguments)]
fn process_logical_string(
    core: &mut ReviewerCore,
    lists: &IgnoreLists,
    text: &str,
    file_name: &Path,
    index: &LineIndex,
    token_start: usize,
    first_quote: usize,
    raw: bool,
    wide: bool,
    usage_override: Option<UsageContext>,
) -> usize {
    let bytes = text.as_bytes();
    let trigraphs = core.options().min_cpp_version < 17;
    let mut decoded = String::new();
    let mut raw_body = String::new();
    let mut seg_raw = raw;
    let mut seg_wide = wide;
    let mut i = first_quote;

    loop {
        if seg_raw {
            // R"delim( ... )delim" -- no escapes inside.
            let open = text[i + 1..]
                .char_indices()
                .take(18)
                .find(|(_, c)| *c == '(')
                .map(|(off, _)| i + 1 + off);
            let Some(open) = open else {
                return record_malformed(core, text, file_name, index, first_quote);
            };
            let delim = &text[i + 1..open];
            let closer = format!("){delim}\"");
            let Some(rel) = text[open + 1..].find(&closer) else {
                return record_malformed(core, text, file_name, index, first_quote);
            };
            let body = &text[open + 1..open + 1 + rel];
            decoded.push_str(body);
            raw_body.push_str(body);
            i = open + 1 + rel + closer.len();
        } else {
            let mut j = i + 1;
            let close = loop {
                if j >= bytes.len() {
                    break None;
                }
                match bytes[j] {
                    b'\\' => j += 2,
                    b'?' if trigraphs && text[j..].starts_with("??/") => j += 4,
                    b'"' => break Some(j),
                    _ => j += 1,
                }
            };
            let Some(close) = close else {
                return record_malformed(core, text, file_name, index, first_quote);
            };
            let body = &text[i + 1..close];
            decoded.push_str(&lex::decode_escapes(body, seg_wide).text);
            raw_body.push_str(body);
            i = close + 1;
        }

        // Adjacent literals separated only by whitespace concatenate.
        let mut j = i;
        loop {
            if j < bytes.len() && bytes[j].is_ascii_whitespace() {
                j += 1;
            } else if j + 1 < bytes.len()
                && bytes[j] == b'\\'
                && (bytes[j + 1] == b'\n' || bytes[j + 1] == b'\r')
            {
                j += 2;
            } else {
                break;
            }
        }
        if bytes.get(j) == Some(&b'"') {
            seg_raw = false;
            seg_wide = false;
            i = j;
            continue;
        }
        if j < bytes.len() && lex::is_ident_start(bytes[j]) {
            let end = read_identifier_end(bytes, j);
            if let Some((r, w)) = string_prefix(&text[j..end]) {
                if bytes.get(end) == Some(&b'"') {
                    seg_raw = r;
                    seg_wide = w;
                    i = end;
                    continue;
                }
            }
        }
        break;
    }

    let usage = usage_override.unwrap_or_else(|| determine_usage(text, token_start));
    let (line, column) = index.location(first_quote);
    route_literal(
        core,
        lists,
        &decoded,
        &raw_body,
        file_name,
        line,
        column,
        first_quote,
        usage,
    );
    i
}

/// Scan a preprocessor directive. `#define NAME "text"` classifies the
/// string with the macro name as its context; numeric defines of
/// resource-id names are recorded; `#include` paths are skipped.
fn process_preprocessor(
    core: &mut ReviewerCore,
    lists: &IgnoreLists,
    text: &str,
    file_name: &Path,
    index: &LineIndex,
    hash_pos: usize,
) -> usize {
    let end = lex::logical_line_end(text, hash_pos);
    let bytes = text.as_bytes();

    let mut i = hash_pos + 1;
    while i < end && (bytes[i] == b' ' || bytes[i] == b'\t') {
        i += 1;
    }
    let keyword_end = read_identifier_end(bytes, i);
    let keyword = &text[i..keyword_end];
    i = keyword_end;

    if keyword == "include" {
        return end;
    }

    let mut usage_override = None;
    if keyword == "define" {
        i = skip_whitespace(bytes, i).min(end);
        let name_end = read_identifier_end(bytes, i);
        if name_end > i {
            let name = &text[i..name_end];
            usage_override = Some(UsageContext::Parameter(name.to_string()));
            let mut j = name_end;
            // Function-like macros: skip the parameter list.
            if bytes.get(j) == Some(&b'(') {
                while j < end && bytes[j] != b')' {
                    j += 1;
                }
                j = (j + 1).min(end);
            }
            let j = skip_whitespace(bytes, j).min(end);
            if looks_like_resource_id(name) {
                if let Some((value, _)) = parse_int_literal(text, j) {
                    let (line, column) = index.location(i);
                    core.add_id_assignment(IdAssignment {
                        name: name.to_string(),
                        value,
                        file_name: file_name.to_path_buf(),
                        line,
                        column,
                        offset: i,
                    });
                }
            }
            i = name_end;
        }
    }

    // Extract string literals from the directive body.
    let mut last = end;
    while i < end {
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'/') => break,
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = lex::skip_block_comment(text, i);
            }
            b'\'' => {
                i = skip_char_literal(bytes, i);
            }
            b'"' => {
                let next = process_logical_string(
                    core,
                    lists,
                    text,
                    file_name,
                    index,
                    i,
                    i,
                    false,
                    false,
                    usage_override.clone(),
                );
                last = last.max(next);
                i = next;
            }
            b if lex::is_ident_start(b) => {
                let ident_end = read_identifier_end(bytes, i);
                if let Some((raw, wide)) = string_prefix(&text[i..ident_end]) {
                    if bytes.get(ident_end) == Some(&b'"') {
                        let next = process_logical_string(
                            core,
                            lists,
                            text,
                            file_name,
                            index,
                            i,
                            ident_end,
                            raw,
                            wide,
                            usage_override.clone(),
                        );
                        last = last.max(next);
                        i = next;
                        continue;
                    }
                }
                i = ident_end;
            }
            _ => i += 1,
        }
    }
    last.max(end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ReviewOptions;

    fn review(text: &str) -> CppReviewer {
        review_with(text, ReviewOptions::default())
    }

    fn review_with(text: &str, options: ReviewOptions) -> CppReviewer {
        let (lists, _) = IgnoreLists::build(&options);
        let mut reviewer = CppReviewer::new(options, Arc::new(lists));
        reviewer.process(text, Path::new("test.cpp"));
        reviewer
    }

    #[test]
    fn test_translation_call_is_collected() {
        let r = review(r#"auto label = _("Save file");"#);
        let localizable = &r.core().buckets().localizable_strings;
        assert_eq!(localizable.len(), 1);
        assert_eq!(localizable[0].string, "Save file");
        assert_eq!(
            localizable[0].usage,
            UsageContext::FunctionCall("_".to_string())
        );
    }

    #[test]
    fn test_internal_assignment_produces_no_finding() {
        let r = review(r#"const char* k_tag = "button_pressed";"#);
        assert!(r.core().buckets().findings().next().is_none());
    }

    #[test]
    fn test_should_be_translatable_position() {
        let text = r#"void f(){ show("Please save your work before exiting."); }"#;
        let r = review(text);
        let bucket = &r.core().buckets().not_available_for_localization_strings;
        assert_eq!(bucket.len(), 1);
        let finding = &bucket[0];
        assert_eq!(finding.string, "Please save your work before exiting.");
        assert_eq!(finding.warning_id, Some(WarningId::NotL10nAvailable));
        assert_eq!(finding.line, 1);
        assert_eq!(finding.column, text.find('"').unwrap() + 1);
    }

    #[test]
    fn test_strings_in_comments_are_ignored() {
        let r = review(
            "// _(\"not real\")\n/* _(\"also not real\") */\nauto s = _(\"real string here\");\n",
        );
        let localizable = &r.core().buckets().localizable_strings;
        assert_eq!(localizable.len(), 1);
        assert_eq!(localizable[0].string, "real string here");
    }

    #[test]
    fn test_adjacent_literals_concatenate() {
        let r = review("show(\"Please save \"\n      \"your work now.\");");
        let bucket = &r.core().buckets().not_available_for_localization_strings;
        assert_eq!(bucket.len(), 1);
        assert_eq!(bucket[0].string, "Please save your work now.");
        assert_eq!(bucket[0].line, 1);
    }

    #[test]
    fn test_wide_prefix_and_escapes() {
        let r = review(r#"auto s = _(L"Don’t panic about this");"#);
        let localizable = &r.core().buckets().localizable_strings;
        assert_eq!(localizable.len(), 1);
        assert!(localizable[0].string.starts_with("Don\u{2019}t"));
    }

    #[test]
    fn test_raw_string_not_decoded() {
        let r = review(r###"auto s = _(R"(two words\n)");"###);
        let localizable = &r.core().buckets().localizable_strings;
        assert_eq!(localizable.len(), 1);
        assert_eq!(localizable[0].string, r"two words\n");
    }

    #[test]
    fn test_raw_string_with_delimiter() {
        let r = review(r###"auto s = _(R"xy(keep (this) text)xy");"###);
        let localizable = &r.core().buckets().localizable_strings;
        assert_eq!(localizable[0].string, "keep (this) text");
    }

    #[test]
    fn test_char_literals_skipped() {
        let r = review("char c = 'a'; int n = 1'000'000; show(\"Two words here\");");
        let bucket = &r.core().buckets().not_available_for_localization_strings;
        assert_eq!(bucket.len(), 1);
        assert_eq!(bucket[0].string, "Two words here");
    }

    #[test]
    fn test_assembly_blocks_skipped() {
        let r = review(
            "__asm { mov eax, 1 }\nasm (\"mov %eax, %ebx\");\nauto s = _(\"visible string\");",
        );
        let localizable = &r.core().buckets().localizable_strings;
        assert_eq!(localizable.len(), 1);
        assert_eq!(localizable[0].string, "visible string");
    }

    #[test]
    fn test_define_string_uses_macro_name_context() {
        let r = review("#define GREETING \"Hello there friend\"\n");
        let bucket = &r.core().buckets().not_available_for_localization_strings;
        assert_eq!(bucket.len(), 1);
        assert_eq!(
            bucket[0].usage,
            UsageContext::Parameter("GREETING".to_string())
        );
    }

    #[test]
    fn test_include_paths_skipped() {
        let r = review("#include \"my/header.h\"\n#include <string>\n");
        assert_eq!(r.core().buckets().total_len(), 0);
    }

    #[test]
    fn test_define_id_number_recorded() {
        let mut r = review("#define IDS_HELLO 101\n#define IDS_BYE 101\n");
        let lists = IgnoreLists::default();
        r.core_mut().review_localizable_strings(&lists);
        assert_eq!(r.core().buckets().ids_assigned_number.len(), 2);
        assert_eq!(r.core().buckets().ids_with_duplicate_value.len(), 2);
    }

    #[test]
    fn test_inline_id_assignment_recorded() {
        let r = review("const int IDD_ABOUT = 0x80;\n");
        let bucket = &r.core().buckets().ids_assigned_number;
        assert_eq!(bucket.len(), 1);
        assert_eq!(bucket[0].string, "128");
    }

    #[test]
    fn test_deprecated_macro_reported() {
        let r = review("auto s = wxT(\"Old style text\");\n");
        let bucket = &r.core().buckets().deprecated_macros;
        assert_eq!(bucket.len(), 1);
        assert_eq!(bucket[0].string, "wxT");
        assert_eq!(bucket[0].warning_id, Some(WarningId::DeprecatedMacro));
    }

    #[test]
    fn test_malformed_string_at_eof() {
        let r = review("auto s = \"never closed");
        let bucket = &r.core().buckets().malformed_strings;
        assert_eq!(bucket.len(), 1);
        assert_eq!(bucket[0].warning_id, Some(WarningId::MalformedString));
    }

    #[test]
    fn test_suspicious_translation_content() {
        let r = review(r#"auto s = _("https://example.com/help");"#);
        let bucket = &r.core().buckets().unsafe_localizable_strings;
        assert_eq!(bucket.len(), 1);
        assert_eq!(bucket[0].warning_id, Some(WarningId::UrlInL10nString));
    }

    #[test]
    fn test_findings_not_emitted_when_bits_unset() {
        let options = ReviewOptions {
            style: ReviewStyle::empty(),
            ..ReviewOptions::default()
        };
        let r = review_with(
            "#define IDS_A 1\nshow(\"Please save your work.\");\nauto u = _(\"https://x.y\");\nwxT(\"a\");\nauto s = \"never closed",
            options,
        );
        assert!(r.core().buckets().findings().next().is_none());
    }

    #[test]
    fn test_trigraph_directive_recognized_below_cpp17() {
        let options = ReviewOptions {
            min_cpp_version: 14,
            ..ReviewOptions::default()
        };
        let r = review_with("??=define IDS_X 5\n", options);
        assert_eq!(r.core().buckets().ids_assigned_number.len(), 1);

        let options = ReviewOptions {
            min_cpp_version: 17,
            ..ReviewOptions::default()
        };
        let r = review_with("??=define IDS_X 5\n", options);
        assert!(r.core().buckets().ids_assigned_number.is_empty());
    }

    #[test]
    fn test_multiline_string_merged() {
        let text = "show(\"Please save \\\nyour work today.\");";
        let r = review(text);
        let bucket = &r.core().buckets().not_available_for_localization_strings;
        assert_eq!(bucket.len(), 1);
        assert_eq!(bucket[0].string, "Please save your work today.");
        assert_eq!(bucket[0].line, 1);
        assert_eq!(bucket[0].column, text.find('"').unwrap() + 1);
    }
}
