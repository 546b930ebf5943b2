//! Input normalization.

use crate::models::TextCase;

/// Capitalize the first letter of every word and lowercase the rest.
///
/// A word is a run of alphabetic characters, so "doble propósito" becomes
/// "Doble Propósito" and "1-5" is left alone.
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_word = false;
    for c in value.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

pub fn apply_case(value: &str, case: TextCase) -> String {
    match case {
        TextCase::Preserve => value.to_string(),
        TextCase::Upper => value.to_uppercase(),
        TextCase::Title => title_case(value),
    }
}

/// Trim, then apply the casing policy.
pub fn normalize_text(value: &str, case: TextCase) -> String {
    apply_case(value.trim(), case)
}

/// Like [`normalize_text`], but blank input becomes `None`.
pub fn normalize_optional(value: Option<&str>, case: TextCase) -> Option<String> {
    value
        .map(|v| normalize_text(v, case))
        .filter(|v| !v.is_empty())
}
