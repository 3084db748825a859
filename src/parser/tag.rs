//! Tag body decomposition.
//!
//! A tag body is the text between `<` and its `>`. [`split_tag`] separates
//! the element name from the raw attribute text, and [`extract_attributes`]
//! turns that raw text into key/value pairs without ever failing: malformed
//! attribute text yields fewer attributes, never an error.

use crate::tree::Attributes;

/// A tag body split into its name and the raw text that follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TagParts<'a> {
    pub name: &'a str,
    pub attributes: &'a str,
}

/// Splits a tag body into name and attribute text.
///
/// Leading whitespace and the `/` of a closing tag are skipped. The name
/// runs to the next whitespace; a `/` glued to the end of the body
/// (`br/`) is not part of it.
pub(crate) fn split_tag(body: &str) -> TagParts<'_> {
    let body = body.trim_start_matches(|c: char| c.is_whitespace() || c == '/');
    match body.find(char::is_whitespace) {
        Some(end) => TagParts {
            name: &body[..end],
            attributes: &body[end..],
        },
        None => TagParts {
            name: body.strip_suffix('/').unwrap_or(body),
            attributes: "",
        },
    }
}

/// Returns `true` if the tag body ends in `/`, ignoring trailing whitespace.
pub(crate) fn is_self_closing(body: &str) -> bool {
    body.trim_end().ends_with('/')
}

/// Result of scanning raw attribute text.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct AttributeScan {
    pub attributes: Attributes,
    /// A trailing key whose value never started or never ended.
    pub dangling_key: Option<String>,
    /// Keys seen again after their first occurrence, in order.
    pub duplicates: Vec<String>,
}

/// Extracts `key="value"` pairs from raw attribute text.
///
/// Values may be wrapped in `"` or `'`; the other quote character is literal
/// inside them. Scanning stops at the first `=` not followed by a quote, or
/// at a quote that is never closed, keeping the pairs found so far. Such a
/// trailing key is reported in `dangling_key` and dropped, unless `strict`
/// is set, in which case the tag gets no attributes at all.
///
/// The first value of a repeated key wins.
pub(crate) fn extract_attributes(raw: &str, normalize: bool, strict: bool) -> AttributeScan {
    let mut scan = AttributeScan::default();
    let mut rest = raw;

    while let Some(eq) = rest.find('=') {
        let key = rest[..eq].trim_matches(|c: char| c.is_whitespace() || c == '=');
        let after = rest[eq + 1..].trim_start();

        let Some(quote) = after.chars().next().filter(|c| matches!(c, '"' | '\'')) else {
            scan.dangling_key = Some(key.to_string());
            break;
        };
        let body = &after[1..];
        let Some(close) = body.find(quote) else {
            scan.dangling_key = Some(key.to_string());
            break;
        };

        let value = clean_value(&body[..close], normalize);
        if scan.attributes.contains_key(key) {
            scan.duplicates.push(key.to_string());
        } else {
            scan.attributes.insert(key.to_string(), value);
        }
        rest = &body[close + 1..];
    }

    if strict && scan.dangling_key.is_some() {
        scan.attributes.clear();
    }
    scan
}

fn clean_value(value: &str, normalize: bool) -> String {
    if normalize {
        value.split_whitespace().collect::<Vec<_>>().join(" ")
    } else {
        value.trim().to_string()
    }
}
