// src/config/escapes.rs

//! `\uXXXX` / `\UXXXXXXXX` escapes in label, prefix and suffix text.
//!
//! TOML basic strings already understand these, but literal strings
//! (`'...'`) do not, and icon fonts are usually configured that way.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

static UNICODE_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\\\|\\u([0-9A-Fa-f]{4})|\\U([0-9A-Fa-f]{8})")
        .expect("unicode escape regex is valid")
});

/// Decode unicode escapes. `\\` becomes a single backslash; escapes naming
/// an invalid code point are left untouched.
pub fn decode_unicode_escapes(text: &str) -> Cow<'_, str> {
    if !text.contains('\\') {
        return Cow::Borrowed(text);
    }

    UNICODE_ESCAPE.replace_all(text, |caps: &Captures<'_>| {
        let hex = caps.get(1).or_else(|| caps.get(2));
        match hex {
            None => "\\".to_string(),
            Some(hex) => u32::from_str_radix(hex.as_str(), 16)
                .ok()
                .and_then(char::from_u32)
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string()),
        }
    })
}

pub(crate) fn decode_in_place(value: &mut Option<String>) {
    let Some(text) = value.as_mut() else {
        return;
    };
    let decoded = match decode_unicode_escapes(text) {
        Cow::Borrowed(_) => return,
        Cow::Owned(decoded) => decoded,
    };
    *text = decoded;
}
