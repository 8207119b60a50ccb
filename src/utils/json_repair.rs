//! Text-level fixes for JSON that language models commonly get slightly wrong.
//!
//! Each rule is a standalone transform; [`repair_json`] runs them in order.
//! Structural rules only touch text outside double-quoted string literals,
//! so well-formed JSON passes through unchanged.

use regex::Regex;
use std::sync::OnceLock;

fn string_literal() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?s)"(?:[^"\\]|\\.)*""#).expect("string literal pattern"))
}

fn bare_key() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([{,]\s*)([A-Za-z0-9_]+)(\s*:)").expect("bare key pattern"))
}

fn trailing_comma() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r",(\s*[}\]])").expect("trailing comma pattern"))
}

pub fn repair_json(text: &str) -> String {
    let text = normalize_quotes(text);
    let text = quote_bare_keys(&text);
    strip_trailing_commas(&text)
}

/// Replaces typographic quotes with their ASCII counterparts.
pub fn normalize_quotes(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' | '\u{2033}' => '"',
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' | '\u{2032}' => '\'',
            other => other,
        })
        .collect()
}

/// `{question: "..."}` becomes `{"question": "..."}`.
pub fn quote_bare_keys(text: &str) -> String {
    outside_strings(text, |segment| {
        bare_key()
            .replace_all(segment, r#"${1}"${2}"${3}"#)
            .into_owned()
    })
}

/// `[1, 2,]` becomes `[1, 2]`.
pub fn strip_trailing_commas(text: &str) -> String {
    outside_strings(text, |segment| {
        trailing_comma().replace_all(segment, "$1").into_owned()
    })
}

fn outside_strings(text: &str, fix: impl Fn(&str) -> String) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut last = 0;
    for literal in string_literal().find_iter(text) {
        out.push_str(&fix(&text[last..literal.start()]));
        out.push_str(literal.as_str());
        last = literal.end();
    }
    out.push_str(&fix(&text[last..]));
    out
}
