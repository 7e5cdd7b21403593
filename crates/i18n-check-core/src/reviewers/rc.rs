//! Windows resource-compiler (`.rc`) reviewer.
//!
//! Line-oriented parse of `STRINGTABLE`, `DIALOG`/`DIALOGEX`, `MENU`, and
//! `ACCELERATORS` blocks. Every string inside a recognized block is
//! translatable by default; the suspicious-content tests decide which ones
//! are additionally recorded as unsafe. Dialog `FONT` statements get their
//! own size and face checks.

use crate::classify;
use crate::core::ReviewerCore;
use crate::findings::{StringInfo, UsageContext, WarningId};
use crate::lex;
use crate::options::{IgnoreLists, ReviewOptions};
use crate::review_style::ReviewStyle;
use crate::reviewers::Reviewer;
use regex::Regex;
use std::path::Path;
use std::sync::{Arc, LazyLock};

static FONT_STATEMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^FONT\s+(\d+)\s*,\s*"([^"]*)""#).unwrap());
static CODE_PAGE_PRAGMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"code_page\(\s*(\d+)\s*\)").unwrap());

/// Dialog font sizes that render consistently.
const STANDARD_FONT_SIZES: &[u32] = &[8, 9];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    StringTable,
    Dialog,
    Menu,
    Accelerators,
}

pub struct RcReviewer {
    core: ReviewerCore,
    lists: Arc<IgnoreLists>,
    /// Code page declared by the last `#pragma code_page(N)` seen.
    code_page: Option<u32>,
}

impl RcReviewer {
    pub fn new(options: ReviewOptions, lists: Arc<IgnoreLists>) -> Self {
        Self {
            core: ReviewerCore::new(options),
            lists,
            code_page: None,
        }
    }

    /// The declared code page of the most recently processed file, noted
    /// for later save-encoding decisions.
    pub fn code_page(&self) -> Option<u32> {
        self.code_page
    }

    fn check_font(&mut self, line: &str, file_name: &Path, line_no: usize, offset: usize) {
        if !self.core.style().contains(ReviewStyle::CHECK_FONTS) {
            return;
        }
        let Some(caps) = FONT_STATEMENT.captures(line) else {
            return;
        };
        let size: u32 = caps[1].parse().unwrap_or(0);
        let face = caps[2].to_string();

        if !STANDARD_FONT_SIZES.contains(&size) {
            let message = format!(
                "FONT {size}, \"{face}\": font size {size} is non-standard (8 is recommended)."
            );
            ReviewerCore::push_dedup(
                &mut self.core.buckets_mut().bad_dialog_font_sizes,
                StringInfo::warning(
                    message.clone(),
                    file_name,
                    line_no,
                    1,
                    offset,
                    UsageContext::Orphan(line.trim().to_string()),
                    WarningId::FontIssue,
                    message,
                ),
            );
        }

        if !self.lists.is_system_font(&face) {
            let message = format!(
                "FONT {size}, \"{face}\": font name '{face}' may not map well on some systems (MS Shell Dlg is recommended)."
            );
            ReviewerCore::push_dedup(
                &mut self.core.buckets_mut().non_system_dialog_fonts,
                StringInfo::warning(
                    message.clone(),
                    file_name,
                    line_no,
                    1,
                    offset,
                    UsageContext::Orphan(line.trim().to_string()),
                    WarningId::FontIssue,
                    message,
                ),
            );
        }
    }
}

impl Reviewer for RcReviewer {
    fn process(&mut self, text: &str, file_name: &Path) {
        self.core.note_file();
        self.core.review_source_lines(text, file_name, true);

        let mut context: Option<BlockKind> = None;
        let mut depth = 0usize;
        let mut offset = 0usize;

        for (line_idx, raw_line) in text.split('\n').enumerate() {
            let line_no = line_idx + 1;
            let line = raw_line.strip_suffix('\r').unwrap_or(raw_line);
            let code = strip_line_comment(line);
            let trimmed = code.trim();

            if trimmed.starts_with('#') {
                if trimmed.contains("pragma") {
                    if let Some(caps) = CODE_PAGE_PRAGMA.captures(trimmed) {
                        if let Ok(page) = caps[1].parse::<u32>() {
                            self.code_page = Some(page);
                            self.core
                                .log(format!("{}: code page {page}", file_name.display()));
                        }
                    }
                }
                offset += raw_line.len() + 1;
                continue;
            }

            if let Some(kind) = block_header(trimmed) {
                context = Some(kind);
                depth = 0;
            }

            let is_font_line = trimmed.starts_with("FONT");
            if context == Some(BlockKind::Dialog) && is_font_line {
                self.check_font(trimmed, file_name, line_no, offset);
            }

            let extract = context.is_some()
                && context != Some(BlockKind::Accelerators)
                && !is_font_line;
            if extract {
                self.extract_strings(code, file_name, line_no, offset);
            }

            // Track block delimiters after extraction so a closing line's
            // strings still belong to the block.
            let (opens, closes) = scan_delimiters(code);
            depth += opens;
            for _ in 0..closes {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    context = None;
                }
            }

            offset += raw_line.len() + 1;
        }
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

impl RcReviewer {
    /// Pull every string literal out of one line; each is recorded as
    /// localizable, and suspect content is additionally recorded as unsafe.
    fn extract_strings(&mut self, code: &str, file_name: &Path, line_no: usize, line_offset: usize) {
        let bytes = code.as_bytes();
        let first_token = tokens(code).next().unwrap_or("");
        let usage = if !first_token.is_empty()
            && first_token
                .bytes()
                .all(|b| lex::is_ident_byte(b) || b == b',')
        {
            UsageContext::Parameter(first_token.trim_end_matches(',').to_string())
        } else {
            UsageContext::Orphan(code.trim().to_string())
        };

        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] != b'"' {
                i += 1;
                continue;
            }
            let wide = i > 0 && bytes[i - 1] == b'L';
            let Some(close) = lex::skip_string_literal(code, i, b'"') else {
                break;
            };
            let body = &code[i + 1..close - 1];
            let decoded = lex::decode_escapes(body, wide).text;
            let column = i + 1;
            let offset = line_offset + i;

            ReviewerCore::push_dedup(
                &mut self.core.buckets_mut().localizable_strings,
                StringInfo::record(
                    decoded.clone(),
                    file_name,
                    line_no,
                    column,
                    offset,
                    usage.clone(),
                ),
            );

            let suspicious =
                classify::suspicious_content(&decoded, &self.lists, self.core.options());
            if let Some(warning) = suspicious {
                if self.core.style().enables(warning) {
                    let explanation = format!(
                        "Resource string looks like a non-translatable value. {}",
                        usage.explain()
                    );
                    ReviewerCore::push_dedup(
                        &mut self.core.buckets_mut().unsafe_localizable_strings,
                        StringInfo::warning(
                            decoded.clone(),
                            file_name,
                            line_no,
                            column,
                            offset,
                            usage.clone(),
                            warning,
                            explanation,
                        ),
                    );
                }
            }

            if self
                .core
                .style()
                .contains(ReviewStyle::CHECK_UNENCODED_EXT_ASCII)
                && classify::has_unencoded_ext_ascii(body)
            {
                ReviewerCore::push_dedup(
                    &mut self.core.buckets_mut().unencoded_ext_ascii,
                    StringInfo::warning(
                        decoded,
                        file_name,
                        line_no,
                        column,
                        offset,
                        usage.clone(),
                        WarningId::UnencodedExtAscii,
                        "Resource string contains unescaped extended-ASCII characters.",
                    ),
                );
            }

            i = close;
        }
    }
}

/// Drop a trailing `//` comment, honoring strings.
fn strip_line_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    let mut in_string = false;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if in_string => i += 1,
            b'"' => in_string = !in_string,
            b'/' if !in_string && bytes.get(i + 1) == Some(&b'/') => {
                return &line[..i];
            }
            _ => {}
        }
        i += 1;
    }
    line
}

fn tokens(line: &str) -> impl Iterator<Item = &str> {
    line.split_whitespace()
}

/// Count `BEGIN`/`{` and `END`/`}` delimiters outside string literals.
fn scan_delimiters(code: &str) -> (usize, usize) {
    let bytes = code.as_bytes();
    let mut opens = 0;
    let mut closes = 0;
    let mut in_string = false;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if in_string {
            match b {
                b'\\' => i += 2,
                b'"' => {
                    in_string = false;
                    i += 1;
                }
                _ => i += 1,
            }
            continue;
        }
        match b {
            b'"' => {
                in_string = true;
                i += 1;
            }
            b'{' => {
                opens += 1;
                i += 1;
            }
            b'}' => {
                closes += 1;
                i += 1;
            }
            b if lex::is_ident_start(b) => {
                let mut end = i;
                while end < bytes.len() && lex::is_ident_byte(bytes[end]) {
                    end += 1;
                }
                match &code[i..end] {
                    "BEGIN" => opens += 1,
                    "END" => closes += 1,
                    _ => {}
                }
                i = end;
            }
            _ => i += 1,
        }
    }
    (opens, closes)
}

/// Recognized top-level block headers.
fn block_header(trimmed: &str) -> Option<BlockKind> {
    let mut kind = None;
    let mut in_string = false;
    for token in tokens(trimmed) {
        if token.contains('"') {
            in_string = !in_string;
            continue;
        }
        if in_string {
            continue;
        }
        kind = match token {
            "STRINGTABLE" => Some(BlockKind::StringTable),
            "DIALOG" | "DIALOGEX" => Some(BlockKind::Dialog),
            "MENU" | "MENUEX" => Some(BlockKind::Menu),
            "ACCELERATORS" => Some(BlockKind::Accelerators),
            _ => kind,
        };
        if kind.is_some() {
            break;
        }
    }
    kind
}
