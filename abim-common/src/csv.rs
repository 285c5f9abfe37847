//! CSV parsing with quote and embedded-newline handling.
//!
//! The parser neutralizes quoted spans before any line splitting: doubled
//! quote escapes (`""`) collapse to a sentinel, then the contents of each
//! quoted span are percent-encoded into a single opaque token. After that a
//! field can no longer contain a live delimiter or newline, so rows split
//! cleanly; each field is decoded at the end.

use once_cell::sync::Lazy;
use regex::Regex;

/// Placeholder for a doubled quote escape inside a quoted field.
const QUOTE_SENTINEL: &str = "!!Q!!";

/// One quoted span, non-greedy, dot matches newline.
static QUOTED_SPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)"(.*?)""#).expect("valid quoted-span regex"));

/// Runs of whitespace-padded newline sequences collapse to one separator.
static LINES_SKIP_TRIM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?: *(?:\r\n|[\n\x0B\x0C\r\x{85}\x{2028}\x{2029}]))+")
        .expect("valid line-split regex")
});

/// Runs of newline sequences collapse to one separator.
static LINES_SKIP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\r\n|[\n\x0B\x0C\r\x{85}\x{2028}\x{2029}])+").expect("valid line-split regex")
});

/// Every newline sequence separates, empty lines survive as empty rows.
static LINES_ALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\r\n|[\n\x0B\x0C\r\x{85}\x{2028}\x{2029}]").expect("valid line-split regex")
});

/// Parse CSV text with the default options: comma delimiter, empty lines
/// skipped, fields trimmed. No header row is assumed.
pub fn parse_csv(text: &str) -> Vec<Vec<String>> {
    parse_csv_opts(text, ',', true, true)
}

/// Parse CSV text into rows of fields.
///
/// A quoted field may contain the delimiter, newlines, and doubled-quote
/// escapes (`""` for a literal `"`). A trailing delimiter yields a trailing
/// empty field; it is never dropped.
pub fn parse_csv_opts(
    text: &str,
    delimiter: char,
    skip_empty_lines: bool,
    trim_fields: bool,
) -> Vec<Vec<String>> {
    let collapsed = collapse_quote_escapes(text);
    let encoded = QUOTED_SPAN
        .replace_all(&collapsed, |caps: &regex::Captures| percent_encode(&caps[1]))
        .into_owned();

    let splitter: &Regex = if skip_empty_lines {
        if trim_fields {
            &LINES_SKIP_TRIM
        } else {
            &LINES_SKIP
        }
    } else {
        &LINES_ALL
    };

    splitter
        .split(&encoded)
        .map(|line| {
            line.split(delimiter)
                .map(|field| {
                    let field = if trim_fields { field.trim() } else { field };
                    percent_decode(field).replace(QUOTE_SENTINEL, "\"")
                })
                .collect()
        })
        .collect()
}

/// Collapse `""` pairs not preceded by a further quote to the sentinel.
///
/// Scans left to right over the input text, so `""""` becomes one
/// sentinel followed by the remaining `""` (the second pair is preceded by
/// a quote and left alone).
fn collapse_quote_escapes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev: Option<char> = None;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '"' && chars.peek() == Some(&'"') && prev != Some('"') {
            chars.next();
            out.push_str(QUOTE_SENTINEL);
            prev = Some('"');
        } else {
            out.push(c);
            prev = Some(c);
        }
    }
    out
}

/// Percent-encode a quoted span's contents into one opaque token.
///
/// Alphanumerics and `-_.` pass through, space becomes `+`, everything else
/// (delimiters and newlines included) becomes `%XX` — so the token contains
/// nothing the line or field splitters react to, and nothing `trim` eats.
fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for &b in input.as_bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' => out.push(b as char),
            b' ' => out.push('+'),
            _ => {
                out.push_str(&format!("%{:02X}", b));
            }
        }
    }
    out
}

/// Reverse [`percent_encode`]. Stray `%` sequences pass through untouched.
fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                match (hex_val(bytes[i + 1]), hex_val(bytes[i + 2])) {
                    (Some(hi), Some(lo)) => {
                        out.push(hi * 16 + lo);
                        i += 3;
                    }
                    _ => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_val(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
