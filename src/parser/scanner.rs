//! The markup scan loop.
//!
//! A single forward pass over the input, written as an explicit state
//! machine. [`ScanState::ScanningText`] locates the next `<`, hands the text
//! gap before it to the innermost open element, and classifies the construct
//! that starts there. Each other state consumes exactly one construct and
//! returns to `ScanningText`, until no `<` is left.
//!
//! Every malformed construct has two outcomes. With `abort_on_error` the scan
//! stops with a [`ParseError`]; otherwise the construct is repaired locally
//! and a diagnostic is recorded.

use tracing::{debug, trace};

use super::input::MarkupInput;
use super::tag;
use crate::error::{ErrorSeverity, ParseDiagnostic, ParseError};
use crate::tree::{Document, NodeId, NodeKind, NodeOptions};

const COMMENT_OPEN: &str = "<!--";
const COMMENT_CLOSE: &str = "-->";
const CDATA_OPEN: &str = "<![CDATA[";
const CDATA_CLOSE: &str = "]]>";

/// Tag names that are skipped, not built, before the root element.
const DECLARATION_MARKERS: [&str; 2] = ["?xml", "!DOCTYPE"];

pub(crate) const MISSING_TAG_END: &str = "Missing tag end token.";
pub(crate) const MISSING_END_TAG: &str = "Missing end tag.";
pub(crate) const MISSING_COMMENT_END: &str = "Missing comment end token.";
pub(crate) const MISSING_CDATA_END: &str = "Missing CDATA end token.";
pub(crate) const MISSING_ROOT: &str = "Missing root element.";
pub(crate) const PARSER_ERROR: &str = "Parser error.";

/// Where the scan loop is. Offsets are byte positions in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScanState {
    ScanningText,
    /// `<name ...>` from `start` (the `<`) to `end` (the `>`, or the input
    /// length for a truncated final tag).
    OpeningTag { start: usize, end: usize },
    /// `</name>`, delimited like `OpeningTag`.
    ClosingTag { start: usize, end: usize },
    Comment { start: usize },
    CData { start: usize },
    Done,
}

/// An element whose closing tag has not been seen yet.
#[derive(Debug, Clone, Copy)]
struct OpenElement {
    id: NodeId,
    /// Offset of the `>` of its opening tag.
    tag_end: usize,
}

/// What a completed scan produced.
#[derive(Debug)]
pub(crate) struct ScanOutcome {
    /// The root element, detached from any parent.
    pub root: Option<NodeId>,
    pub diagnostics: Vec<ParseDiagnostic>,
}

pub(crate) struct Scanner<'a> {
    input: MarkupInput<'a>,
    /// Stamped onto every node the scan creates.
    options: NodeOptions,
    search_pos: usize,
    /// Start of the text not yet handed to a node.
    text_start: usize,
    /// Root first, innermost last.
    open: Vec<OpenElement>,
    root: Option<NodeId>,
    last_search_pos: Option<usize>,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str, options: NodeOptions) -> Self {
        Self {
            input: MarkupInput::new(text),
            options,
            search_pos: 0,
            text_start: 0,
            open: Vec::new(),
            root: None,
            last_search_pos: None,
        }
    }

    fn abort_on_error(&self) -> bool {
        self.options.parse.abort_on_error
    }

    /// Runs the scan to completion, allocating nodes in `doc`.
    ///
    /// The returned root is not installed as the document root; the caller
    /// decides where it goes.
    pub fn run(mut self, doc: &mut Document) -> Result<ScanOutcome, ParseError> {
        let mut state = ScanState::ScanningText;
        loop {
            trace!(?state, search_pos = self.search_pos, "scan step");
            state = match state {
                ScanState::ScanningText => self.scan_text(doc)?,
                ScanState::OpeningTag { start, end } => self.opening_tag(doc, start, end)?,
                ScanState::ClosingTag { start, end } => self.closing_tag(doc, start, end)?,
                ScanState::Comment { start } => self.comment(doc, start)?,
                ScanState::CData { start } => self.cdata(doc, start)?,
                ScanState::Done => break,
            };
        }
        self.finish(doc)
    }

    /// Finds the next `<`, flushes the text before it and classifies it.
    fn scan_text(&mut self, doc: &mut Document) -> Result<ScanState, ParseError> {
        if self.last_search_pos == Some(self.search_pos) {
            return Err(self.input.fatal(PARSER_ERROR, self.search_pos));
        }
        self.last_search_pos = Some(self.search_pos);

        let Some(lt) = self.input.find_byte(b'<', self.search_pos) else {
            return Ok(ScanState::Done);
        };
        self.flush_text(doc, lt);

        if self.input.starts_with_at(lt, COMMENT_OPEN) {
            return Ok(ScanState::Comment { start: lt });
        }
        if self.input.starts_with_at(lt, CDATA_OPEN) {
            return Ok(ScanState::CData { start: lt });
        }

        let gt = self.input.find_byte(b'>', lt + 1);
        let next_lt = self.input.find_byte(b'<', lt + 1);
        let end = match (gt, next_lt) {
            (Some(gt), Some(next)) if next < gt => return self.skip_malformed(lt, next),
            (None, Some(next)) => return self.skip_malformed(lt, next),
            (Some(gt), _) => gt,
            (None, None) => {
                if self.abort_on_error() {
                    return Err(self.input.fatal(MISSING_TAG_END, lt));
                }
                self.input
                    .push_diagnostic(ErrorSeverity::Error, MISSING_TAG_END, lt);
                self.input.len()
            }
        };

        if self.input.starts_with_at(lt + 1, "/") {
            Ok(ScanState::ClosingTag { start: lt, end })
        } else {
            Ok(ScanState::OpeningTag { start: lt, end })
        }
    }

    /// A `<` whose tag runs into another `<`: drop the tag text.
    fn skip_malformed(&mut self, lt: usize, next: usize) -> Result<ScanState, ParseError> {
        if self.abort_on_error() {
            return Err(self.input.fatal(MISSING_TAG_END, lt));
        }
        self.input
            .push_diagnostic(ErrorSeverity::Error, MISSING_TAG_END, lt);
        self.advance_to(next);
        Ok(ScanState::ScanningText)
    }

    fn opening_tag(
        &mut self,
        doc: &mut Document,
        start: usize,
        end: usize,
    ) -> Result<ScanState, ParseError> {
        let body = self.input.slice(start + 1, end);
        let parts = tag::split_tag(body);
        let self_closing = tag::is_self_closing(body);
        self.advance_to(end + 1);

        let parent = match (self.root, self.open.last()) {
            (None, _) if is_declaration(parts.name) => {
                trace!(name = parts.name, "skipping declaration");
                return Ok(ScanState::ScanningText);
            }
            (None, _) => None,
            (Some(_), Some(open)) => Some(open.id),
            (Some(_), None) => {
                if self.abort_on_error() {
                    return Err(self.input.fatal(PARSER_ERROR, start));
                }
                self.input
                    .push_diagnostic(ErrorSeverity::Error, PARSER_ERROR, start);
                return Ok(ScanState::ScanningText);
            }
        };

        let parse_options = &self.options.parse;
        let scan = tag::extract_attributes(
            parts.attributes,
            parse_options.normalize_attribute_whitespace,
            parse_options.abort_on_error,
        );
        if let Some(key) = &scan.dangling_key {
            if !self.abort_on_error() {
                self.input.push_diagnostic(
                    ErrorSeverity::Warning,
                    format!("Attribute '{key}' has no value."),
                    start,
                );
            }
        }
        for key in &scan.duplicates {
            let message = format!("Duplicate attribute '{key}'.");
            if self.abort_on_error() {
                return Err(self.input.fatal(message, start));
            }
            self.input
                .push_diagnostic(ErrorSeverity::Error, message, start);
        }

        let id = doc.create_node_with(
            NodeKind::Element {
                name: parts.name.to_string(),
                attributes: scan.attributes,
                self_closing,
            },
            self.options.clone(),
        );
        match parent {
            Some(parent) => doc.link_last(parent, id),
            None => self.root = Some(id),
        }
        if !self_closing {
            self.open.push(OpenElement { id, tag_end: end });
        }
        Ok(ScanState::ScanningText)
    }

    /// Closes the nearest open element with a matching name.
    fn closing_tag(
        &mut self,
        doc: &Document,
        start: usize,
        end: usize,
    ) -> Result<ScanState, ParseError> {
        let name = tag::split_tag(self.input.slice(start + 1, end)).name;
        self.advance_to(end + 1);

        let matching = self
            .open
            .iter()
            .rposition(|open| doc.node_name(open.id) == Some(name));
        if let Some(index) = matching {
            self.open.remove(index);
        } else {
            let message = format!("Missing open '{name}' tag to close.");
            if self.abort_on_error() {
                return Err(self.input.fatal(message, start));
            }
            self.input
                .push_diagnostic(ErrorSeverity::Error, message, start);
        }
        Ok(ScanState::ScanningText)
    }

    fn comment(&mut self, doc: &mut Document, start: usize) -> Result<ScanState, ParseError> {
        let body_start = start + COMMENT_OPEN.len();
        match self.input.find_str(COMMENT_CLOSE, body_start) {
            Some(close) => {
                let value = self.input.slice(body_start, close).to_string();
                self.append_to_open(doc, NodeKind::Comment { value });
                self.advance_to(close + COMMENT_CLOSE.len());
            }
            None => self.unterminated(MISSING_COMMENT_END, start, body_start)?,
        }
        Ok(ScanState::ScanningText)
    }

    fn cdata(&mut self, doc: &mut Document, start: usize) -> Result<ScanState, ParseError> {
        let body_start = start + CDATA_OPEN.len();
        match self.input.find_str(CDATA_CLOSE, body_start) {
            Some(close) => {
                let value = self.input.slice(body_start, close).to_string();
                self.append_to_open(doc, NodeKind::CData { value });
                self.advance_to(close + CDATA_CLOSE.len());
            }
            None => self.unterminated(MISSING_CDATA_END, start, body_start)?,
        }
        Ok(ScanState::ScanningText)
    }

    /// Drops an opening delimiter that is never closed; its body is then
    /// scanned as ordinary text.
    fn unterminated(
        &mut self,
        message: &str,
        start: usize,
        body_start: usize,
    ) -> Result<(), ParseError> {
        if self.abort_on_error() {
            return Err(self.input.fatal(message, start));
        }
        self.input
            .push_diagnostic(ErrorSeverity::Error, message, start);
        self.advance_to(body_start);
        Ok(())
    }

    fn finish(mut self, doc: &mut Document) -> Result<ScanOutcome, ParseError> {
        if let Some(innermost) = self.open.last() {
            if self.abort_on_error() {
                return Err(self.input.fatal(MISSING_END_TAG, innermost.tag_end));
            }
            let auto_close = self.options.parse.auto_close_open_tags;
            for open in self.open.iter().rev() {
                if auto_close {
                    debug!(name = doc.node_name(open.id), "closing open element at end of input");
                    self.input
                        .push_diagnostic(ErrorSeverity::Warning, MISSING_END_TAG, open.tag_end);
                } else {
                    self.input
                        .push_diagnostic(ErrorSeverity::Error, MISSING_END_TAG, open.tag_end);
                    if doc.parent(open.id).is_some() {
                        doc.remove_node(open.id);
                    }
                }
            }
        }

        if self.root.is_none() {
            if self.abort_on_error() {
                let mut err = ParseError::new(MISSING_ROOT);
                err.diagnostics = self.input.diagnostics;
                return Err(err);
            }
            let len = self.input.len();
            self.input
                .push_diagnostic(ErrorSeverity::Error, MISSING_ROOT, len);
        }

        debug!(
            nodes = doc.node_count(),
            diagnostics = self.input.diagnostics.len(),
            "scan complete"
        );
        Ok(ScanOutcome {
            root: self.root,
            diagnostics: self.input.diagnostics,
        })
    }

    /// Hands the text between the previous construct and `lt` to the
    /// innermost open element. Whitespace-only gaps are dropped.
    fn flush_text(&mut self, doc: &mut Document, lt: usize) {
        let text = self.input.slice(self.text_start, lt);
        if !text.trim().is_empty() {
            self.append_to_open(doc, NodeKind::text(text));
        }
    }

    fn append_to_open(&mut self, doc: &mut Document, kind: NodeKind) {
        let Some(open) = self.open.last() else {
            trace!(%kind, "dropping content outside the root element");
            return;
        };
        let id = doc.create_node_with(kind, self.options.clone());
        doc.link_last(open.id, id);
    }

    fn advance_to(&mut self, pos: usize) {
        let pos = pos.min(self.input.len());
        self.search_pos = pos;
        self.text_start = pos;
    }
}

fn is_declaration(name: &str) -> bool {
    DECLARATION_MARKERS
        .iter()
        .any(|marker| name.eq_ignore_ascii_case(marker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_str_with_options, ParseOptions};
    use pretty_assertions::assert_eq;

    fn recover(input: &str) -> Document {
        match parse_str_with_options(input, &ParseOptions::new()) {
            Ok(doc) => doc,
            Err(e) => panic!("recovery parse failed for {input:?}: {e}"),
        }
    }

    fn abort(input: &str) -> ParseError {
        match parse_str_with_options(input, &ParseOptions::new().abort_on_error(true)) {
            Ok(_) => panic!("abort parse unexpectedly succeeded for {input:?}"),
            Err(e) => e,
        }
    }

    fn root_of(doc: &Document) -> NodeId {
        let Some(root) = doc.root_element() else {
            panic!("document has no root element");
        };
        root
    }

    fn kinds(doc: &Document, id: NodeId) -> Vec<String> {
        doc.children(id)
            .map(|child| doc.node(child).kind.to_string())
            .collect()
    }

    #[test]
    fn test_elements_text_and_self_closing() {
        let doc = recover("<root><a>hello</a><b x=\"1\" /></root>");
        let root = root_of(&doc);
        assert_eq!(
            kinds(&doc, root),
            vec!["Element, Name=\"a\"", "Element, Name=\"b\""]
        );
        let Some(b) = doc.child_element(root, "b") else {
            panic!("missing b");
        };
        assert!(doc.is_self_closing(b));
        assert_eq!(doc.attribute(b, "x"), Some("1"));
        assert!(doc.diagnostics.is_empty());
    }

    #[test]
    fn test_whitespace_only_gaps_dropped() {
        let doc = recover("<root>\n  <a> </a>\n</root>");
        let root = root_of(&doc);
        assert_eq!(doc.child_count(root), 1);
        let Some(a) = doc.first_child(root) else {
            panic!("missing a");
        };
        assert_eq!(doc.child_count(a), 0);
    }

    #[test]
    fn test_comment_captured_verbatim() {
        let doc = recover(
            "<root><element>text<!-- <commentelement attribute=\"attributedata\" />commented out text -->tail<x/></element></root>",
        );
        let root = root_of(&doc);
        let Some(element) = doc.child_element(root, "element") else {
            panic!("missing element");
        };
        assert_eq!(doc.child_count(element), 4);
        let Some(comment) = doc.child_at(element, 1) else {
            panic!("missing comment");
        };
        assert_eq!(
            doc.node_value(comment),
            Some(" <commentelement attribute=\"attributedata\" />commented out text ")
        );
    }

    #[test]
    fn test_cdata_captured_verbatim() {
        let doc = recover("<root><![CDATA[<not> & markup]]>after<x/></root>");
        let root = root_of(&doc);
        assert_eq!(doc.child_count(root), 3);
        assert_eq!(
            kinds(&doc, root),
            vec![
                "CData, Value=\"<not> & markup\"",
                "Text, Value=\"after\"",
                "Element, Name=\"x\"",
            ]
        );
    }

    #[test]
    fn test_extra_closing_tag() {
        let input = "<root><one><two></two></two></one></root>";
        let doc = recover(input);
        let root = root_of(&doc);
        let Some(one) = doc.child_element(root, "one") else {
            panic!("missing one");
        };
        assert_eq!(doc.child_count(one), 1);
        assert_eq!(doc.diagnostics.len(), 1);
        assert_eq!(doc.diagnostics[0].message, "Missing open 'two' tag to close.");

        let err = abort(input);
        assert_eq!(err.message, "Missing open 'two' tag to close.");
        assert_eq!(err.line_number(), Some(1));
    }

    #[test]
    fn test_overlapping_tags_close_nearest_match() {
        let doc = recover("<root><a><b></a>text</b></root>");
        let root = root_of(&doc);
        let Some(a) = doc.child_element(root, "a") else {
            panic!("missing a");
        };
        let Some(b) = doc.child_element(a, "b") else {
            panic!("missing b");
        };
        assert_eq!(doc.inner_text(b), "text");
        assert!(doc.diagnostics.is_empty());
    }

    #[test]
    fn test_malformed_tag_skipped() {
        let input = "<root><one></one</root>";
        let doc = recover(input);
        let root = root_of(&doc);
        assert_eq!(doc.child_count(root), 0);

        let err = abort(input);
        assert_eq!(err.message, MISSING_TAG_END);
    }

    #[test]
    fn test_missing_end_tag() {
        let input = "<root>\n<element>\n<sub>text</sub>\n</root>";
        let doc = recover(input);
        let root = root_of(&doc);
        assert_eq!(doc.child_count(root), 0);

        let err = abort(input);
        assert_eq!(err.to_string(), "Missing end tag. Source line number: 2");
    }

    #[test]
    fn test_auto_close_keeps_content() {
        let options = ParseOptions::new().auto_close_open_tags(true);
        let Ok(doc) = parse_str_with_options("<root><a>one<b>two", &options) else {
            panic!("auto-close parse failed");
        };
        let root = root_of(&doc);
        let Some(a) = doc.child_element(root, "a") else {
            panic!("missing a");
        };
        assert_eq!(doc.inner_text(a), "one");
        assert!(doc.child_element(a, "b").is_some());
        assert!(doc
            .diagnostics
            .iter()
            .all(|d| d.severity == ErrorSeverity::Warning));
    }

    #[test]
    fn test_unterminated_comment_becomes_text() {
        let input = "<root><one><!-- this is a comment --</one></root>";
        let doc = recover(input);
        let root = root_of(&doc);
        assert_eq!(doc.child_count(root), 1);
        let Some(one) = doc.first_child(root) else {
            panic!("missing one");
        };
        assert_eq!(kinds(&doc, one), vec!["Text, Value=\" this is a comment --\""]);

        assert_eq!(abort(input).message, MISSING_COMMENT_END);
    }

    #[test]
    fn test_unterminated_cdata_becomes_text() {
        let input = "<root><one><![CDATA[cdata content]]</one></root>";
        let doc = recover(input);
        let root = root_of(&doc);
        assert_eq!(doc.child_count(root), 1);
        let Some(one) = doc.first_child(root) else {
            panic!("missing one");
        };
        assert_eq!(kinds(&doc, one), vec!["Text, Value=\"cdata content]]\""]);

        assert_eq!(abort(input).message, MISSING_CDATA_END);
    }

    #[test]
    fn test_truncated_final_tag() {
        let doc = recover("<root><a></a></root");
        let root = root_of(&doc);
        assert_eq!(doc.child_count(root), 1);
        assert_eq!(doc.diagnostics.len(), 1);

        assert_eq!(abort("<root></root").message, MISSING_TAG_END);
    }

    #[test]
    fn test_declarations_skipped_before_root() {
        let doc = recover("<?xml version=\"1.0\"?>\n<!doctype html>\n<root/>");
        assert_eq!(doc.node_name(root_of(&doc)), Some("root"));
        assert!(doc.diagnostics.is_empty());
    }

    #[test]
    fn test_content_after_root_dropped() {
        let input = "<root/><second>text</second>";
        let doc = recover(input);
        let root = root_of(&doc);
        assert_eq!(doc.node_name(root), Some("root"));
        assert_eq!(doc.child_count(root), 0);

        assert_eq!(abort(input).message, PARSER_ERROR);
    }

    #[test]
    fn test_no_root_element() {
        let doc = recover("just text");
        assert_eq!(doc.root_element(), None);
        assert_eq!(doc.diagnostics.len(), 1);

        let err = abort("just text");
        assert_eq!(err.message, MISSING_ROOT);
        assert_eq!(err.line_number(), None);
    }

    #[test]
    fn test_duplicate_attribute() {
        let input = "<root a=\"1\" a=\"2\"/>";
        let doc = recover(input);
        assert_eq!(doc.attribute(root_of(&doc), "a"), Some("1"));

        assert_eq!(abort(input).message, "Duplicate attribute 'a'.");
    }

    #[test]
    fn test_dangling_attribute_in_abort_mode_drops_all() {
        let input = "<root a=\"1\" b=\"2 />";
        let doc = recover(input);
        let root = root_of(&doc);
        assert_eq!(doc.attribute(root, "a"), Some("1"));
        assert_eq!(doc.attribute(root, "b"), None);

        let options = ParseOptions::new().abort_on_error(true);
        let Ok(strict) = parse_str_with_options(input, &options) else {
            panic!("dangling attribute must not fail the parse");
        };
        let Some(attrs) = strict.attributes(root_of(&strict)) else {
            panic!("root has no attribute map");
        };
        assert!(attrs.is_empty());
    }

    #[test]
    fn test_declaration_marker_match() {
        assert!(is_declaration("?xml"));
        assert!(is_declaration("?XML"));
        assert!(is_declaration("!DocType"));
        assert!(!is_declaration("xml"));
    }
}
