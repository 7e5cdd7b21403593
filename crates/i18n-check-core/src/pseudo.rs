//! Deterministic pseudo-translation of gettext catalogs.
//!
//! Pseudo-translation mangles every non-empty `msgstr` so layout and
//! encoding bugs show up without a real translation: decorated Latin or
//! Cherokee homoglyphs keep the text readable while exercising non-ASCII
//! paths, width padding simulates longer languages, brackets expose
//! truncation, and tracking ids tie a rendered string back to its entry.

use crate::error::{AnalyzeError, AnalyzeResult};
use crate::lex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PseudoMethod {
    #[default]
    None,
    UpperCase,
    EuropeanAccents,
    Cherokee,
    Fill,
}

/// ASCII letter to decorated Latin homoglyph.
fn european_accent(c: char) -> char {
    match c {
        'a' => '\u{E0}',
        'b' => '\u{180}',
        'c' => '\u{E7}',
        'd' => '\u{111}',
        'e' => '\u{E9}',
        'f' => '\u{192}',
        'g' => '\u{11F}',
        'h' => '\u{125}',
        'i' => '\u{EC}',
        'j' => '\u{135}',
        'k' => '\u{137}',
        'l' => '\u{13C}',
        'm' => '\u{271}',
        'n' => '\u{F1}',
        'o' => '\u{F6}',
        'p' => '\u{1A5}',
        'q' => '\u{24B}',
        'r' => '\u{155}',
        's' => '\u{161}',
        't' => '\u{163}',
        'u' => '\u{FC}',
        'v' => '\u{28B}',
        'w' => '\u{175}',
        'x' => '\u{1E8B}',
        'y' => '\u{FD}',
        'z' => '\u{17E}',
        'A' => '\u{C0}',
        'B' => '\u{181}',
        'C' => '\u{C7}',
        'D' => '\u{110}',
        'E' => '\u{C9}',
        'F' => '\u{191}',
        'G' => '\u{11E}',
        'H' => '\u{124}',
        'I' => '\u{CC}',
        'J' => '\u{134}',
        'K' => '\u{136}',
        'L' => '\u{13B}',
        'M' => '\u{1E40}',
        'N' => '\u{D1}',
        'O' => '\u{D6}',
        'P' => '\u{1A4}',
        'Q' => '\u{24A}',
        'R' => '\u{154}',
        'S' => '\u{160}',
        'T' => '\u{162}',
        'U' => '\u{DC}',
        'V' => '\u{28A}',
        'W' => '\u{174}',
        'X' => '\u{1E8A}',
        'Y' => '\u{DD}',
        'Z' => '\u{17D}',
        other => other,
    }
}

/// ASCII letter to a Cherokee syllable with a similar silhouette.
fn cherokee(c: char) -> char {
    match c.to_ascii_uppercase() {
        'A' => '\u{13AA}',
        'B' => '\u{13F4}',
        'C' => '\u{13DF}',
        'D' => '\u{13A0}',
        'E' => '\u{13AC}',
        'F' => '\u{13AB}',
        'G' => '\u{13C3}',
        'H' => '\u{13BB}',
        'I' => '\u{13C6}',
        'J' => '\u{13AB}',
        'K' => '\u{13E6}',
        'L' => '\u{13DE}',
        'M' => '\u{13B7}',
        'N' => '\u{13C0}',
        'O' => '\u{13A4}',
        'P' => '\u{13E2}',
        'Q' => '\u{13A4}',
        'R' => '\u{13A1}',
        'S' => '\u{13DA}',
        'T' => '\u{13A2}',
        'U' => '\u{13EC}',
        'V' => '\u{13D9}',
        'W' => '\u{13B3}',
        'X' => '\u{13E7}',
        'Y' => '\u{13BD}',
        'Z' => '\u{13C3}',
        other => other,
    }
}

/// Apply the selected character mangling.
pub fn mangle(text: &str, method: PseudoMethod) -> String {
    match method {
        PseudoMethod::None => text.to_string(),
        PseudoMethod::UpperCase => text.to_uppercase(),
        PseudoMethod::EuropeanAccents => text.chars().map(european_accent).collect(),
        PseudoMethod::Cherokee => text
            .chars()
            .map(|c| if c.is_ascii_alphabetic() { cherokee(c) } else { c })
            .collect(),
        PseudoMethod::Fill => text.chars().map(|_| 'X').collect(),
    }
}

/// Full pseudo-translation of one value: mangle, pad to the requested
/// width, wrap in brackets, and prefix the tracking id.
pub fn transform(
    text: &str,
    method: PseudoMethod,
    add_brackets: bool,
    width_increase_percent: u32,
    track_id: Option<usize>,
) -> String {
    let mut out = mangle(text, method);
    if width_increase_percent > 0 {
        let original = text.chars().count();
        let target = (original * (100 + width_increase_percent as usize)).div_ceil(100);
        let pad = out.chars().last().unwrap_or('X');
        while out.chars().count() < target {
            out.push(pad);
        }
    }
    if add_brackets {
        out = format!("[{out}]");
    }
    if let Some(id) = track_id {
        out = format!("{id:04}:{out}");
    }
    out
}

/// Escape a value for embedding in a PO string.
fn encode_po_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

/// Rewrite every non-empty `msgstr` in a catalog. Multi-line values are
/// folded onto the `msgstr` line; comments, flags, and ids are untouched.
/// `counter` numbers entries across the whole run for tracking ids.
pub fn rewrite_catalog(
    text: &str,
    method: PseudoMethod,
    add_brackets: bool,
    width_increase_percent: u32,
    track_ids: bool,
    counter: &mut usize,
) -> String {
    let mut out = String::with_capacity(text.len());
    let mut lines = text.split_inclusive('\n').peekable();
    let mut in_msgstr = false;

    while let Some(line) = lines.next() {
        let content = line.trim_end_matches(['\n', '\r']);
        let trimmed = content.trim_start();

        if trimmed.starts_with("msgstr") {
            in_msgstr = true;
            let Some(quote) = content.find('"') else {
                out.push_str(line);
                continue;
            };
            let keyword = content[..quote].trim_end();
            let mut raw_value = quoted_body(content).unwrap_or_default().to_string();
            // Fold continuation lines into the value.
            while let Some(next) = lines.peek() {
                let next_trimmed = next.trim_start().trim_end_matches(['\n', '\r']);
                if next_trimmed.starts_with('"') {
                    raw_value.push_str(quoted_body(next_trimmed).unwrap_or_default());
                    lines.next();
                } else {
                    break;
                }
            }
            let decoded = lex::decode_escapes(&raw_value, false).text;
            if decoded.is_empty() {
                out.push_str(keyword);
                out.push_str(" \"\"\n");
                continue;
            }
            *counter += 1;
            let track_id = track_ids.then_some(*counter);
            let mangled = transform(
                &decoded,
                method,
                add_brackets,
                width_increase_percent,
                track_id,
            );
            out.push_str(keyword);
            out.push_str(" \"");
            out.push_str(&encode_po_string(&mangled));
            out.push_str("\"\n");
        } else if in_msgstr && trimmed.starts_with('"') {
            // Stray continuation (already folded); drop it.
        } else {
            in_msgstr = false;
            out.push_str(line);
        }
    }
    out
}

fn quoted_body(line: &str) -> Option<&str> {
    let start = line.find('"')?;
    let end = line.rfind('"')?;
    (end > start).then(|| &line[start + 1..end])
}

/// Pseudo-translate one `.po` file in place.
pub fn pseudo_translate_file(
    path: &Path,
    method: PseudoMethod,
    add_brackets: bool,
    width_increase_percent: u32,
    track_ids: bool,
    counter: &mut usize,
) -> AnalyzeResult<()> {
    let bytes = std::fs::read(path).map_err(|source| AnalyzeError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8_lossy(&bytes);
    let rewritten = rewrite_catalog(
        &text,
        method,
        add_brackets,
        width_increase_percent,
        track_ids,
        counter,
    );
    std::fs::write(path, rewritten).map_err(|source| AnalyzeError::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}
