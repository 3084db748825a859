//! Error-tolerant markup parser.
//!
//! A hand-rolled single-pass scanner that builds a [`Document`] from
//! XML-like markup. It accepts input a conforming XML parser would reject
//! (overlapping tags, stray closing tags, unterminated constructs) and
//! repairs it locally, unless [`ParseOptions::abort_on_error`] asks for the
//! first problem to fail the parse instead.
//!
//! There is no entity decoding, no namespace handling and no DTD support:
//! text and attribute values are kept exactly as written.

pub(crate) mod input;
pub(crate) mod scanner;
pub(crate) mod tag;

use crate::encoding;
use crate::error::ParseError;
use crate::tree::{Document, NodeOptions};
use crate::serial::RenderOptions;

use scanner::{ScanOutcome, Scanner};

/// Parse options controlling recovery behavior.
///
/// All options default to `false`, the most lenient configuration. Use the
/// builder methods to configure them:
///
/// ```
/// use quasixml::parser::ParseOptions;
///
/// let opts = ParseOptions::new()
///     .normalize_attribute_whitespace(true)
///     .abort_on_error(true);
/// assert!(!opts.auto_close_open_tags);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ParseOptions {
    /// Collapse whitespace runs inside attribute values to one space.
    pub normalize_attribute_whitespace: bool,
    /// Keep elements still open at end of input instead of dropping them.
    pub auto_close_open_tags: bool,
    /// Fail on the first malformed construct instead of repairing it.
    pub abort_on_error: bool,
}

impl ParseOptions {
    /// Creates the default (fully lenient) options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables attribute whitespace normalization.
    #[must_use]
    pub fn normalize_attribute_whitespace(mut self, yes: bool) -> Self {
        self.normalize_attribute_whitespace = yes;
        self
    }

    /// Enables or disables closing of unclosed elements at end of input.
    #[must_use]
    pub fn auto_close_open_tags(mut self, yes: bool) -> Self {
        self.auto_close_open_tags = yes;
        self
    }

    /// Enables or disables strict mode.
    #[must_use]
    pub fn abort_on_error(mut self, yes: bool) -> Self {
        self.abort_on_error = yes;
        self
    }
}

/// Parses a markup string with default options.
///
/// # Errors
///
/// Returns `ParseError` only if the scan could not make progress.
pub fn parse_str(input: &str) -> Result<Document, ParseError> {
    parse_str_with_options(input, &ParseOptions::default())
}

/// Parses a markup string with the given options.
///
/// A leading byte order mark is ignored. Recovered problems are listed in
/// [`Document::diagnostics`].
///
/// # Errors
///
/// With `abort_on_error`, returns the first malformed construct as a
/// `ParseError` carrying its source line.
pub fn parse_str_with_options(input: &str, options: &ParseOptions) -> Result<Document, ParseError> {
    let input = input.strip_prefix('\u{FEFF}').unwrap_or(input);
    let mut doc = Document::with_options(options.clone(), RenderOptions::default());
    let node_options = doc.default_options();
    let outcome = parse_fragment(&mut doc, input, &node_options)?;
    doc.set_parsed_root(outcome.root);
    doc.diagnostics = outcome.diagnostics;
    Ok(doc)
}

/// Decodes raw bytes to UTF-8 and parses them with default options.
///
/// # Errors
///
/// Returns `ParseError` if the bytes cannot be decoded or the scan could not
/// make progress.
pub fn parse_bytes(input: &[u8]) -> Result<Document, ParseError> {
    parse_bytes_with_options(input, &ParseOptions::default())
}

/// Decodes raw bytes to UTF-8 and parses them with the given options.
///
/// The encoding comes from a byte order mark, or from the `encoding` of a
/// leading `<?xml ...?>` declaration, and defaults to UTF-8.
///
/// # Errors
///
/// Returns `ParseError` if the bytes cannot be decoded, or as
/// [`parse_str_with_options`] does.
pub fn parse_bytes_with_options(input: &[u8], options: &ParseOptions) -> Result<Document, ParseError> {
    let text = encoding::decode_to_utf8(input).map_err(|e| ParseError::new(e.to_string()))?;
    parse_str_with_options(&text, options)
}

/// Scans `markup` into new nodes of `doc` without touching its root.
pub(crate) fn parse_fragment(
    doc: &mut Document,
    markup: &str,
    options: &NodeOptions,
) -> Result<ScanOutcome, ParseError> {
    Scanner::new(markup, options.clone()).run(doc)
}
