//! C# source reviewer.
//!
//! Shares the C-family lexing helpers but understands verbatim strings
//! (`@"..."`, doubled-quote escape only), interpolated strings (`$"..."`,
//! literal segments classified independently), and attribute declarations
//! (`[...]`, whose strings are not translatable). Preprocessor lines carry
//! no strings.

use crate::core::ReviewerCore;
use crate::lex::{self, LineIndex};
use crate::options::{IgnoreLists, ReviewOptions};
use crate::reviewers::{determine_usage, record_malformed, route_literal, Reviewer};
use std::path::Path;
use std::sync::Arc;

pub struct CsharpReviewer {
    core: ReviewerCore,
    lists: Arc<IgnoreLists>,
}

impl CsharpReviewer {
    pub fn new(options: ReviewOptions, lists: Arc<IgnoreLists>) -> Self {
        Self {
            core: ReviewerCore::new(options),
            lists,
        }
    }
}

impl Reviewer for CsharpReviewer {
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

fn at_line_start(bytes: &[u8], pos: usize) -> bool {
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

fn skip_char_literal(bytes: &[u8], pos: usize) -> usize {
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

/// Skip an attribute block `[...]`, including any strings inside it.
fn skip_attribute(text: &str, pos: usize) -> usize {
    let bytes = text.as_bytes();
    let mut depth = 1u32;
    let mut i = pos + 1;
    while i < bytes.len() && depth > 0 {
        match bytes[i] {
            b'[' => {
                depth += 1;
                i += 1;
            }
            b']' => {
                depth -= 1;
                i += 1;
            }
            b'"' => {
                i = lex::skip_string_literal(text, i, b'"').unwrap_or(bytes.len());
            }
            b'\'' => {
                i = skip_char_literal(bytes, i);
            }
            _ => i += 1,
        }
    }
    i
}

fn scan(core: &mut ReviewerCore, lists: &IgnoreLists, text: &str, file_name: &Path) {
    let index = LineIndex::new(text);
    let bytes = text.as_bytes();

    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                i = lex::skip_line_comment(text, i);
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = lex::skip_block_comment(text, i);
            }
            b'#' if at_line_start(bytes, i) => {
                // C# directives (#region, #if, ...) carry no extractable strings.
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'[' if at_line_start(bytes, i) => {
                i = skip_attribute(text, i);
            }
            b'@' => {
                if bytes.get(i + 1) == Some(&b'"') {
                    i = process_verbatim(core, lists, text, file_name, &index, i, i + 1);
                } else if bytes.get(i + 1) == Some(&b'$') && bytes.get(i + 2) == Some(&b'"') {
                    i = process_interpolated(core, lists, text, file_name, &index, i, i + 2, true);
                } else {
                    // @identifier (escaped keyword)
                    i += 1;
                }
            }
            b'$' => {
                if bytes.get(i + 1) == Some(&b'"') {
                    i = process_interpolated(core, lists, text, file_name, &index, i, i + 1, false);
                } else if bytes.get(i + 1) == Some(&b'@') && bytes.get(i + 2) == Some(&b'"') {
                    i = process_interpolated(core, lists, text, file_name, &index, i, i + 2, true);
                } else {
                    i += 1;
                }
            }
            b'"' => {
                i = process_regular(core, lists, text, file_name, &index, i, i);
            }
            b'\'' => {
                i = skip_char_literal(bytes, i);
            }
            b if lex::is_ident_start(b) => {
                let mut end = i;
                while end < bytes.len() && lex::is_ident_byte(bytes[end]) {
                    end += 1;
                }
                i = end;
            }
            _ => i += 1,
        }
    }
}

/// Regular `"..."` literal with backslash escapes.
fn process_regular(
    core: &mut ReviewerCore,
    lists: &IgnoreLists,
    text: &str,
    file_name: &Path,
    index: &LineIndex,
    token_start: usize,
    quote: usize,
) -> usize {
    let Some(close) = lex::skip_string_literal(text, quote, b'"') else {
        return record_malformed(core, text, file_name, index, quote);
    };
    let body = &text[quote + 1..close - 1];
    let decoded = lex::decode_escapes(body, true);
    let usage = determine_usage(text, token_start);
    let (line, column) = index.location(quote);
    route_literal(
        core,
        lists,
        &decoded.text,
        body,
        file_name,
        line,
        column,
        quote,
        usage,
    );
    close
}

/// Verbatim `@"..."` literal: the doubled quote is the only escape.
fn process_verbatim(
    core: &mut ReviewerCore,
    lists: &IgnoreLists,
    text: &str,
    file_name: &Path,
    index: &LineIndex,
    token_start: usize,
    quote: usize,
) -> usize {
    let bytes = text.as_bytes();
    let mut body = String::new();
    let mut i = quote + 1;
    loop {
        if i >= bytes.len() {
            return record_malformed(core, text, file_name, index, quote);
        }
        if bytes[i] == b'"' {
            if bytes.get(i + 1) == Some(&b'"') {
                body.push('"');
                i += 2;
                continue;
            }
            i += 1;
            break;
        }
        let c = text[i..].chars().next().expect("offset on char boundary");
        body.push(c);
        i += c.len_utf8();
    }
    let usage = determine_usage(text, token_start);
    let (line, column) = index.location(quote);
    route_literal(
        core, lists, &body, &body, file_name, line, column, quote, usage,
    );
    i
}

/// Interpolated `$"..."`: literal segments are classified independently,
/// expression segments are skipped.
#[allow(clippy::too_many_arguments)]
fn process_interpolated(
    core: &mut ReviewerCore,
    lists: &IgnoreLists,
    text: &str,
    file_name: &Path,
    index: &LineIndex,
    token_start: usize,
    quote: usize,
    verbatim: bool,
) -> usize {
    let bytes = text.as_bytes();
    let usage = determine_usage(text, token_start);
    let mut segment = String::new();
    let mut segment_start = quote + 1;
    let mut i = quote + 1;

    let flush = |core: &mut ReviewerCore, segment: &mut String, start: usize| {
        if segment.is_empty() {
            return;
        }
        let decoded = if verbatim {
            segment.clone()
        } else {
            lex::decode_escapes(segment, true).text
        };
        let (line, column) = index.location(start);
        route_literal(
            core,
            lists,
            &decoded,
            segment,
            file_name,
            line,
            column,
            start,
            usage.clone(),
        );
        segment.clear();
    };

    loop {
        if i >= bytes.len() {
            return record_malformed(core, text, file_name, index, quote);
        }
        match bytes[i] {
            b'"' => {
                if verbatim && bytes.get(i + 1) == Some(&b'"') {
                    segment.push('"');
                    i += 2;
                    continue;
                }
                flush(core, &mut segment, segment_start);
                return i + 1;
            }
            b'\\' if !verbatim => {
                segment.push('\\');
                if let Some(next) = text[i + 1..].chars().next() {
                    segment.push(next);
                    i += 1 + next.len_utf8();
                } else {
                    i += 1;
                }
            }
            b'{' => {
                if bytes.get(i + 1) == Some(&b'{') {
                    segment.push('{');
                    i += 2;
                    continue;
                }
                flush(core, &mut segment, segment_start);
                // Skip the expression, balancing braces and skipping strings.
                let mut depth = 1u32;
                i += 1;
                while i < bytes.len() && depth > 0 {
                    match bytes[i] {
                        b'{' => {
                            depth += 1;
                            i += 1;
                        }
                        b'}' => {
                            depth -= 1;
                            i += 1;
                        }
                        b'"' => {
                            i = lex::skip_string_literal(text, i, b'"')
                                .unwrap_or(bytes.len());
                        }
                        _ => i += 1,
                    }
                }
                segment_start = i;
            }
            b'}' => {
                if bytes.get(i + 1) == Some(&b'}') {
                    segment.push('}');
                    i += 2;
                } else {
                    i += 1;
                }
            }
            _ => {
                let c = text[i..].chars().next().expect("offset on char boundary");
                segment.push(c);
                i += c.len_utf8();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::findings::{UsageContext, WarningId};
    use crate::options::ReviewOptions;

    fn review(text: &str) -> CsharpReviewer {
        let options = ReviewOptions::default();
        let (lists, _) = IgnoreLists::build(&options);
        let mut reviewer = CsharpReviewer::new(options, Arc::new(lists));
        reviewer.process(text, Path::new("Program.cs"));
        reviewer
    }

    #[test]
    fn test_plain_string_not_available() {
        let r = review(r#"Console.WriteLine("Please save your work.");"#);
        let bucket = &r.core().buckets().not_available_for_localization_strings;
        assert_eq!(bucket.len(), 1);
        assert_eq!(bucket[0].string, "Please save your work.");
    }

    #[test]
    fn test_translation_call_collected() {
        let r = review(r#"var s = GetString("Recent files list");"#);
        let localizable = &r.core().buckets().localizable_strings;
        assert_eq!(localizable.len(), 1);
        assert_eq!(
            localizable[0].usage,
            UsageContext::FunctionCall("GetString".to_string())
        );
    }

    #[test]
    fn test_verbatim_string_double_quote_escape() {
        let r = review(r#"var s = @"He said ""save your work"" today";"#);
        let bucket = &r.core().buckets().not_available_for_localization_strings;
        assert_eq!(bucket.len(), 1);
        assert_eq!(bucket[0].string, r#"He said "save your work" today"#);
    }

    #[test]
    fn test_verbatim_backslashes_kept() {
        let r = review(r#"var p = @"C:\Users\Default";"#);
        // A path is not translatable and produces no finding.
        assert!(r.core().buckets().findings().next().is_none());
    }

    #[test]
    fn test_interpolated_segments_classified_independently() {
        let r = review(r#"var s = $"Found {count} matching files in {dir}";"#);
        // "Found " is a single word and stays below the word minimum; the
        // middle segment is reported on its own.
        let bucket = &r.core().buckets().not_available_for_localization_strings;
        assert_eq!(bucket.len(), 1);
        assert_eq!(bucket[0].string, " matching files in ");
    }

    #[test]
    fn test_interpolated_doubled_braces_are_literals() {
        let r = review(r#"var s = $"Use {{braces}} around the value";"#);
        let bucket = &r.core().buckets().not_available_for_localization_strings;
        assert_eq!(bucket.len(), 1);
        assert_eq!(bucket[0].string, "Use {braces} around the value");
    }

    #[test]
    fn test_attribute_strings_ignored() {
        let r = review(
            "[Obsolete(\"Use the new api instead\")]\nvoid f() { g(\"Keep this finding here\"); }\n",
        );
        let bucket = &r.core().buckets().not_available_for_localization_strings;
        assert_eq!(bucket.len(), 1);
        assert_eq!(bucket[0].string, "Keep this finding here");
    }

    #[test]
    fn test_preprocessor_lines_skipped() {
        let r = review("#region \"Not a real string\"\n#endregion\n");
        assert_eq!(r.core().buckets().total_len(), 0);
    }

    #[test]
    fn test_unterminated_verbatim_is_malformed() {
        let r = review("var s = @\"never closed");
        let bucket = &r.core().buckets().malformed_strings;
        assert_eq!(bucket.len(), 1);
        assert_eq!(bucket[0].warning_id, Some(WarningId::MalformedString));
    }

    #[test]
    fn test_comments_ignored() {
        let r = review("// g(\"not here\")\n/* g(\"nor here\") */\ng(\"But these words count\");\n");
        let bucket = &r.core().buckets().not_available_for_localization_strings;
        assert_eq!(bucket.len(), 1);
    }
}
