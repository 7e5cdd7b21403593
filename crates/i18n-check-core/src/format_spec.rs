//! Format-string parsing: printf-family and brace placeholders.
//!
//! Used to compare a source string against its translation; two strings are
//! compatible when their placeholder shapes match, ignoring width and
//! precision.

/// Placeholder dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// `%[position$][flags][width][.precision][length]conversion`
    Printf,
    /// `{index[:format]}` / `{name[:format]}`, with `{{` and `}}` literals.
    Brace,
}

/// Width or precision field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    Star,
    Fixed(u32),
}

/// One parsed placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placeholder {
    Printf {
        /// `%2$s`-style explicit position (1-based).
        position: Option<usize>,
        flags: String,
        width: Option<Width>,
        precision: Option<Width>,
        length: String,
        conversion: char,
    },
    Brace {
        index: Option<usize>,
        name: Option<String>,
        format: Option<String>,
    },
}

/// Parse errors; parsing recovers and continues after each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// A specifier was cut off by the end of the string.
    Truncated { offset: usize },
    /// `%` followed by a character that is not a conversion.
    UnknownConversion { conversion: char, offset: usize },
    /// Positional (`%1$s`) and sequential (`%s`) specifiers in one string.
    MixedIndexing,
}

const CONVERSIONS: &[char] = &[
    'd', 'i', 'o', 'u', 'x', 'X', 'e', 'E', 'f', 'F', 'g', 'G', 'a', 'A', 'c', 's', 'p', 'n',
];

const LENGTHS: &[&str] = &["hh", "ll", "h", "l", "L", "q", "j", "z", "t", "w"];

/// Parse `text` into an ordered list of placeholders plus any errors.
pub fn parse(text: &str, dialect: Dialect) -> (Vec<Placeholder>, Vec<FormatError>) {
    match dialect {
        Dialect::Printf => parse_printf(text),
        Dialect::Brace => parse_brace(text),
    }
}

fn parse_printf(text: &str) -> (Vec<Placeholder>, Vec<FormatError>) {
    let bytes = text.as_bytes();
    let mut placeholders = Vec::new();
    let mut errors = Vec::new();
    let mut saw_positional = false;
    let mut saw_sequential = false;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'%' {
            i += 1;
            continue;
        }
        let start = i;
        i += 1;
        if i >= bytes.len() {
            errors.push(FormatError::Truncated { offset: start });
            break;
        }
        if bytes[i] == b'%' {
            i += 1;
            continue;
        }

        // position
        let mut j = i;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        let mut position = None;
        if j > i && j < bytes.len() && bytes[j] == b'$' {
            position = text[i..j].parse::<usize>().ok();
            i = j + 1;
        }

        // flags
        let mut flags = String::new();
        while i < bytes.len() && matches!(bytes[i], b'-' | b'+' | b' ' | b'#' | b'0' | b'\'') {
            flags.push(bytes[i] as char);
            i += 1;
        }

        // width
        let width = if i < bytes.len() && bytes[i] == b'*' {
            i += 1;
            Some(Width::Star)
        } else {
            let w = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            if i > w {
                text[w..i].parse::<u32>().ok().map(Width::Fixed)
            } else {
                None
            }
        };

        // precision
        let mut precision = None;
        if i < bytes.len() && bytes[i] == b'.' {
            i += 1;
            if i < bytes.len() && bytes[i] == b'*' {
                i += 1;
                precision = Some(Width::Star);
            } else {
                let p = i;
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
                let digits = &text[p..i];
                precision = Some(Width::Fixed(digits.parse().unwrap_or(0)));
            }
        }

        // length modifier
        let mut length = String::new();
        for candidate in LENGTHS {
            if text[i..].starts_with(candidate) {
                length = candidate.to_string();
                i += candidate.len();
                break;
            }
        }

        if i >= bytes.len() {
            errors.push(FormatError::Truncated { offset: start });
            break;
        }
        let conversion = bytes[i] as char;
        if !CONVERSIONS.contains(&conversion) {
            errors.push(FormatError::UnknownConversion {
                conversion,
                offset: i,
            });
            i += 1;
            continue;
        }
        i += 1;
        if position.is_some() {
            saw_positional = true;
        } else {
            saw_sequential = true;
        }
        placeholders.push(Placeholder::Printf {
            position,
            flags,
            width,
            precision,
            length,
            conversion,
        });
    }
    if saw_positional && saw_sequential {
        errors.push(FormatError::MixedIndexing);
    }
    (placeholders, errors)
}

fn parse_brace(text: &str) -> (Vec<Placeholder>, Vec<FormatError>) {
    let bytes = text.as_bytes();
    let mut placeholders = Vec::new();
    let mut errors = Vec::new();
    let mut saw_indexed = false;
    let mut saw_sequential = false;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => {
                if bytes.get(i + 1) == Some(&b'{') {
                    i += 2;
                    continue;
                }
                let Some(close) = text[i + 1..].find('}') else {
                    errors.push(FormatError::Truncated { offset: i });
                    break;
                };
                let content = &text[i + 1..i + 1 + close];
                let (key, format) = match content.split_once(':') {
                    Some((k, f)) => (k, Some(f.to_string())),
                    None => (content, None),
                };
                if key.is_empty() {
                    saw_sequential = true;
                    placeholders.push(Placeholder::Brace {
                        index: None,
                        name: None,
                        format,
                    });
                } else if key.bytes().all(|b| b.is_ascii_digit()) {
                    saw_indexed = true;
                    placeholders.push(Placeholder::Brace {
                        index: key.parse().ok(),
                        name: None,
                        format,
                    });
                } else {
                    placeholders.push(Placeholder::Brace {
                        index: None,
                        name: Some(key.to_string()),
                        format,
                    });
                }
                i += close + 2;
            }
            b'}' => {
                // `}}` is a literal; a stray `}` is tolerated.
                if bytes.get(i + 1) == Some(&b'}') {
                    i += 2;
                } else {
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }
    if saw_indexed && saw_sequential {
        errors.push(FormatError::MixedIndexing);
    }
    (placeholders, errors)
}

/// The comparison shape of a placeholder: conversion identity with `%i`
/// folded into `%d` and length modifiers ignored (`%s` == `%ls`).
fn shape(p: &Placeholder) -> String {
    match p {
        Placeholder::Printf { conversion, .. } => {
            let c = if *conversion == 'i' { 'd' } else { *conversion };
            c.to_string()
        }
        Placeholder::Brace { index, name, .. } => match (index, name) {
            (Some(i), _) => format!("#{i}"),
            (_, Some(n)) => format!("@{n}"),
            _ => "#".to_string(),
        },
    }
}

/// Whether two placeholder sequences are compatible: same multiset of
/// shapes, preserving count and positional correspondence.
pub fn compatible(src: &[Placeholder], dst: &[Placeholder]) -> bool {
    if src.len() != dst.len() {
        return false;
    }
    let positional = |ps: &[Placeholder]| {
        ps.iter().any(|p| {
            matches!(
                p,
                Placeholder::Printf {
                    position: Some(_),
                    ..
                } | Placeholder::Brace { index: Some(_), .. }
            )
        })
    };
    if positional(src) || positional(dst) {
        // Order-independent: compare as sorted multisets of (position, shape).
        let key = |p: &Placeholder| match p {
            Placeholder::Printf { position, .. } => (position.unwrap_or(0), shape(p)),
            Placeholder::Brace { index, .. } => (index.unwrap_or(0), shape(p)),
        };
        let mut a: Vec<_> = src.iter().map(key).collect();
        let mut b: Vec<_> = dst.iter().map(key).collect();
        a.sort();
        b.sort();
        a == b
    } else {
        src.iter()
            .zip(dst.iter())
            .all(|(a, b)| shape(a) == shape(b))
    }
}

/// Render a placeholder list back to text. Inverse of [`parse`] for valid
/// lists.
pub fn serialize(placeholders: &[Placeholder]) -> String {
    let mut out = String::new();
    for p in placeholders {
        match p {
            Placeholder::Printf {
                position,
                flags,
                width,
                precision,
                length,
                conversion,
            } => {
                out.push('%');
                if let Some(pos) = position {
                    out.push_str(&format!("{pos}$"));
                }
                out.push_str(flags);
                match width {
                    Some(Width::Star) => out.push('*'),
                    Some(Width::Fixed(n)) => out.push_str(&n.to_string()),
                    None => {}
                }
                match precision {
                    Some(Width::Star) => out.push_str(".*"),
                    Some(Width::Fixed(n)) => out.push_str(&format!(".{n}")),
                    None => {}
                }
                out.push_str(length);
                out.push(*conversion);
            }
            Placeholder::Brace {
                index,
                name,
                format,
            } => {
                out.push('{');
                if let Some(i) = index {
                    out.push_str(&i.to_string());
                } else if let Some(n) = name {
                    out.push_str(n);
                }
                if let Some(f) = format {
                    out.push(':');
                    out.push_str(f);
                }
                out.push('}');
            }
        }
    }
    out
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn printf_placeholder() -> impl Strategy<Value = Placeholder> {
        let conversion = proptest::sample::select(CONVERSIONS.to_vec());
        let length = proptest::sample::select(
            std::iter::once(String::new())
                .chain(LENGTHS.iter().map(|s| s.to_string()))
                .collect::<Vec<_>>(),
        );
        let width = proptest::option::of(prop_oneof![
            Just(Width::Star),
            (1u32..1000).prop_map(Width::Fixed),
        ]);
        let precision = proptest::option::of(prop_oneof![
            Just(Width::Star),
            (0u32..1000).prop_map(Width::Fixed),
        ]);
        let flags = proptest::sample::select(vec![
            String::new(),
            "-".to_string(),
            "+".to_string(),
            "0".to_string(),
            "-0".to_string(),
            "#".to_string(),
        ]);
        (flags, width, precision, length, conversion).prop_map(
            |(flags, width, precision, length, conversion)| Placeholder::Printf {
                position: None,
                flags,
                width,
                precision,
                length,
                conversion,
            },
        )
    }

    proptest! {
        #[test]
        fn parse_serialize_round_trip(ps in proptest::collection::vec(printf_placeholder(), 0..6)) {
            let text = serialize(&ps);
            let (reparsed, errors) = parse(&text, Dialect::Printf);
            prop_assert!(errors.is_empty(), "serialized text must parse cleanly: {text}");
            prop_assert_eq!(reparsed, ps);
        }
    }
}
