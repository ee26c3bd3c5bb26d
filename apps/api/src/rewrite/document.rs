//! Document checks applied to generated markup before it is sent to a paid
//! rendering service.

use crate::llm_client::strip_code_fences;

const DEFAULT_FILENAME: &str = "rewritten_cv.pdf";

/// Strips wrapping code fences and surrounding whitespace from model output.
pub fn clean_markup(raw: &str) -> String {
    strip_code_fences(raw).to_string()
}

/// True when the markup is a complete HTML document: a doctype declaration
/// plus an `<html>` start tag with a non-empty `lang` attribute. Fences and
/// surrounding whitespace are ignored.
pub fn is_valid_document(markup: &str) -> bool {
    let lower = strip_code_fences(markup).to_ascii_lowercase();
    lower.contains("<!doctype html") && has_language_tagged_root(&lower)
}

/// Expects lowercased input.
fn has_language_tagged_root(lower: &str) -> bool {
    let mut rest = lower;
    while let Some(start) = rest.find("<html") {
        let after = &rest[start + "<html".len()..];
        let Some(end) = tag_end(after) else {
            return false;
        };
        let attributes = &after[..end];
        // `<html>` or `<html lang=...>`, not `<htmlfoo>`.
        let is_html_tag = attributes.is_empty() || attributes.starts_with(char::is_whitespace);
        if is_html_tag && has_non_empty_lang(attributes) {
            return true;
        }
        rest = &after[end..];
    }
    false
}

/// Index of the `>` closing a start tag, ignoring any inside quoted values.
fn tag_end(tag: &str) -> Option<usize> {
    let mut quote = None;
    for (i, b) in tag.bytes().enumerate() {
        match (quote, b) {
            (None, b'>') => return Some(i),
            (None, b'"' | b'\'') => quote = Some(b),
            (Some(q), _) if q == b => quote = None,
            _ => {}
        }
    }
    None
}

fn has_non_empty_lang(attributes: &str) -> bool {
    parse_attributes(attributes).into_iter().any(|(name, value)| {
        name == "lang"
            && value
                .and_then(|v| v.trim_start().chars().next())
                .is_some_and(|c| c.is_ascii_alphabetic())
    })
}

/// Splits a start tag's attribute text into `(name, value)` pairs. Quoted
/// values are taken whole, so their contents never read as attributes.
fn parse_attributes(text: &str) -> Vec<(&str, Option<&str>)> {
    let bytes = text.as_bytes();
    let len = bytes.len();
    let skip_whitespace = |mut i: usize| {
        while i < len && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        i
    };

    let mut attributes = Vec::new();
    let mut i = skip_whitespace(0);
    while i < len {
        let name_start = i;
        while i < len && !bytes[i].is_ascii_whitespace() && bytes[i] != b'=' {
            i += 1;
        }
        let name = &text[name_start..i];

        let after_name = skip_whitespace(i);
        if after_name < len && bytes[after_name] == b'=' {
            let value_start = skip_whitespace(after_name + 1);
            let value = match bytes.get(value_start) {
                Some(&quote @ (b'"' | b'\'')) => {
                    let inner = value_start + 1;
                    let close = text[inner..]
                        .find(quote as char)
                        .map_or(len, |offset| inner + offset);
                    i = (close + 1).min(len);
                    &text[inner..close]
                }
                _ => {
                    i = value_start;
                    while i < len && !bytes[i].is_ascii_whitespace() {
                        i += 1;
                    }
                    &text[value_start..i]
                }
            };
            attributes.push((name, Some(value)));
        } else {
            attributes.push((name, None));
        }
        i = skip_whitespace(i);
    }
    attributes
}

/// Download filename derived from the role, e.g. `backend_engineer_cv.pdf`.
pub fn suggested_filename(role: &str) -> String {
    let slug = role
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("_");

    if slug.is_empty() {
        DEFAULT_FILENAME.to_string()
    } else {
        format!("{slug}_cv.pdf")
    }
}
