//! Input decoding and file-level encoding checks.

use crate::error::{AnalyzeError, AnalyzeResult};
use crate::file_types::ReviewerKind;
use crate::findings::{StringInfo, UsageContext, WarningId};
use crate::review_style::ReviewStyle;
use encoding_rs::Encoding;
use std::path::Path;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// A decoded input file plus any encoding findings raised while reading it.
#[derive(Debug)]
pub struct LoadedFile {
    pub text: String,
    pub findings: Vec<StringInfo>,
}

/// Read and decode a source file. Invalid UTF-8 does not fail the read: the
/// file is reported (when the check is enabled) and decoded with its
/// declared code page (`.rc`) or latin-1 so analysis can continue.
pub fn read_source_file(
    path: &Path,
    kind: ReviewerKind,
    style: ReviewStyle,
) -> AnalyzeResult<LoadedFile> {
    let bytes = std::fs::read(path).map_err(|source| AnalyzeError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(decode_source(&bytes, path, kind, style))
}

/// Decode raw bytes, collecting BOM and UTF-8 findings.
pub fn decode_source(bytes: &[u8], path: &Path, kind: ReviewerKind, style: ReviewStyle) -> LoadedFile {
    let mut findings = Vec::new();
    let mut data = bytes;

    if data.starts_with(UTF8_BOM) {
        if style.contains(ReviewStyle::CHECK_UTF8_WITH_SIGNATURE) {
            findings.push(StringInfo::warning(
                "\u{FEFF}",
                path,
                1,
                1,
                0,
                UsageContext::Orphan(String::new()),
                WarningId::Utf8FileWithBom,
                "File begins with a UTF-8 byte-order mark; save it without a signature.",
            ));
        }
        data = &data[UTF8_BOM.len()..];
    }

    match std::str::from_utf8(data) {
        Ok(text) => LoadedFile {
            text: text.to_string(),
            findings,
        },
        Err(_) => {
            if style.contains(ReviewStyle::CHECK_UTF8_ENCODED) {
                findings.push(StringInfo::warning(
                    "",
                    path,
                    1,
                    1,
                    0,
                    UsageContext::Orphan(String::new()),
                    WarningId::NonUtf8File,
                    "File is not valid UTF-8; analyzed through a legacy code page.",
                ));
            }
            let text = match kind {
                ReviewerKind::Rc => decode_with_declared_code_page(data),
                _ => decode_latin1(data),
            };
            LoadedFile { text, findings }
        }
    }
}

/// One byte per character, 0x00-0xFF mapped straight to code points.
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Resource scripts may declare their own code page with
/// `#pragma code_page(N)`; honor it when the file is not UTF-8.
fn decode_with_declared_code_page(bytes: &[u8]) -> String {
    if let Some(page) = find_declared_code_page(bytes) {
        if let Some(encoding) = encoding_for_code_page(page) {
            return encoding.decode(bytes).0.into_owned();
        }
    }
    decode_latin1(bytes)
}

fn find_declared_code_page(bytes: &[u8]) -> Option<u32> {
    const NEEDLE: &[u8] = b"code_page(";
    let at = bytes
        .windows(NEEDLE.len())
        .position(|window| window == NEEDLE)?;
    let mut value = 0u32;
    let mut any = false;
    for &b in &bytes[at + NEEDLE.len()..] {
        match b {
            b'0'..=b'9' => {
                value = value.checked_mul(10)?.checked_add((b - b'0') as u32)?;
                any = true;
            }
            b' ' | b'\t' if !any => {}
            _ => break,
        }
    }
    any.then_some(value)
}

fn encoding_for_code_page(page: u32) -> Option<&'static Encoding> {
    // 65001 is UTF-8 itself; anything else resolves by windows-NNNN label.
    if page == 65001 {
        return Some(encoding_rs::UTF_8);
    }
    let label = format!("windows-{page}");
    Encoding::for_label(label.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(bytes: &[u8], kind: ReviewerKind) -> LoadedFile {
        decode_source(bytes, Path::new("input"), kind, ReviewStyle::default())
    }

    #[test]
    fn test_plain_utf8_has_no_findings() {
        let loaded = decode("int x;\n".as_bytes(), ReviewerKind::Cpp);
        assert_eq!(loaded.text, "int x;\n");
        assert!(loaded.findings.is_empty());
    }

    #[test]
    fn test_bom_is_reported_and_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"int x;\n");
        let loaded = decode(&bytes, ReviewerKind::Cpp);
        assert_eq!(loaded.text, "int x;\n");
        assert_eq!(loaded.findings.len(), 1);
        assert_eq!(
            loaded.findings[0].warning_id,
            Some(WarningId::Utf8FileWithBom)
        );
    }

    #[test]
    fn test_invalid_utf8_falls_back_to_latin1() {
        let bytes = b"char* s = \"caf\xE9\";\n";
        let loaded = decode(bytes, ReviewerKind::Cpp);
        assert!(loaded.text.contains("caf\u{E9}"));
        assert_eq!(loaded.findings.len(), 1);
        assert_eq!(loaded.findings[0].warning_id, Some(WarningId::NonUtf8File));
    }

    #[test]
    fn test_rc_declared_code_page_honored() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"#pragma code_page(1251)\nIDS_X \"\xC4\xEE\xEC\"\n");
        let loaded = decode(&bytes, ReviewerKind::Rc);
        // windows-1251 maps these bytes to Cyrillic letters.
        assert!(loaded.text.contains("\u{414}\u{43E}\u{43C}"));
    }

    #[test]
    fn test_checks_disabled_by_style() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"x \xE9\n");
        let loaded = decode_source(
            &bytes,
            Path::new("input"),
            ReviewerKind::Cpp,
            ReviewStyle::empty(),
        );
        assert!(loaded.findings.is_empty());
        assert!(loaded.text.contains('\u{E9}'));
    }

    #[test]
    fn test_read_missing_file_is_an_error() {
        let err = read_source_file(
            Path::new("/nonexistent/i18n-check/input.cpp"),
            ReviewerKind::Cpp,
            ReviewStyle::default(),
        );
        assert!(matches!(err, Err(AnalyzeError::FileRead { .. })));
    }
}
