//! Markup renderer.
//!
//! Turns a node, or the children of a node, back into markup text. Without
//! indentation the output reproduces the scanned input token for token;
//! with [`RenderOptions::auto_indent`] every element starts on its own line.
//! Text, attribute values, comments and CDATA are written verbatim, with no
//! escaping.
//!
//! The walk keeps its own stack, so nesting depth is bounded only by memory.

use crate::tree::{Document, NodeId, NodeKind};

const LINE_END: &str = "\n";

/// Options controlling markup rendering.
///
/// # Examples
///
/// ```
/// use quasixml::Document;
/// use quasixml::serial::{render, RenderOptions};
///
/// let doc = Document::parse_str("<root><child>Hello</child></root>").unwrap();
/// let root = doc.root_element().unwrap();
/// let opts = RenderOptions::new().auto_indent(true).indent_char(' ').indent_width(2);
/// assert_eq!(render(&doc, root, &opts), "<root>\n  <child>\n    Hello\n  </child>\n</root>");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderOptions {
    /// Put each element on its own indented line. Defaults to `false`.
    pub auto_indent: bool,
    /// The character repeated for each indent step. Defaults to a tab.
    pub indent_char: char,
    /// How many `indent_char`s make one nesting level. Defaults to 1.
    pub indent_width: usize,
    /// Render childless elements as `<name />`. Defaults to `false`.
    pub render_empty_as_self_closing: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            auto_indent: false,
            indent_char: '\t',
            indent_width: 1,
            render_empty_as_self_closing: false,
        }
    }
}

impl RenderOptions {
    /// Creates the default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables indented output.
    #[must_use]
    pub fn auto_indent(mut self, yes: bool) -> Self {
        self.auto_indent = yes;
        self
    }

    /// Sets the indent character.
    #[must_use]
    pub fn indent_char(mut self, c: char) -> Self {
        self.indent_char = c;
        self
    }

    /// Sets how many indent characters make one level.
    #[must_use]
    pub fn indent_width(mut self, width: usize) -> Self {
        self.indent_width = width;
        self
    }

    /// Enables or disables rendering empty elements as self-closing.
    #[must_use]
    pub fn render_empty_as_self_closing(mut self, yes: bool) -> Self {
        self.render_empty_as_self_closing = yes;
        self
    }

    fn line_end(&self) -> &'static str {
        if self.auto_indent {
            LINE_END
        } else {
            ""
        }
    }

    fn indent(&self, depth: usize) -> String {
        if self.auto_indent {
            std::iter::repeat(self.indent_char)
                .take(self.indent_width * depth)
                .collect()
        } else {
            String::new()
        }
    }
}

/// Renders `id` and its subtree.
#[must_use]
pub fn render(doc: &Document, id: NodeId, options: &RenderOptions) -> String {
    let mut session = RenderSession::new(doc, options);
    session.walk(id, 0);
    session.finish()
}

/// Renders the children of `id`, without the node's own tags.
#[must_use]
pub fn render_inner(doc: &Document, id: NodeId, options: &RenderOptions) -> String {
    let mut session = RenderSession::new(doc, options);
    for child in doc.children(id) {
        session.walk(child, 1);
    }
    session.finish()
}

/// Renders the root element with its own render options.
///
/// Returns an empty string for a document without a root.
#[must_use]
pub fn render_document(doc: &Document) -> String {
    doc.root_element()
        .map(|root| render(doc, root, &doc.node(root).options.render))
        .unwrap_or_default()
}

/// One unit of work in [`RenderSession::walk`].
#[derive(Clone, Copy)]
enum Step {
    Open(NodeId, usize),
    Close(NodeId, usize),
}

/// State for one top-level render call.
struct RenderSession<'a> {
    doc: &'a Document,
    options: &'a RenderOptions,
    out: String,
    /// Whether the last token written already started an indented line.
    line_already_indented: bool,
}

impl<'a> RenderSession<'a> {
    fn new(doc: &'a Document, options: &'a RenderOptions) -> Self {
        Self {
            doc,
            options,
            out: String::new(),
            line_already_indented: false,
        }
    }

    fn finish(self) -> String {
        let len = self.out.trim_end().len();
        let mut out = self.out;
        out.truncate(len);
        out
    }

    /// Starts a tag: a fresh line if something is already on this one.
    fn begin_tag(&mut self, indent: &str) {
        if self.line_already_indented {
            self.out.push_str(self.options.line_end());
        } else {
            self.line_already_indented = true;
        }
        self.out.push_str(indent);
    }

    /// Indents before inline content unless the line is already indented.
    fn begin_inline(&mut self, indent: &str) {
        if !self.line_already_indented {
            self.out.push_str(indent);
            self.line_already_indented = true;
        }
    }

    /// Renders `top` and its subtree, `top` sitting at `depth`.
    fn walk(&mut self, top: NodeId, depth: usize) {
        let mut pending = vec![Step::Open(top, depth)];
        while let Some(step) = pending.pop() {
            match step {
                Step::Open(id, depth) => {
                    if self.open(id, depth) {
                        pending.push(Step::Close(id, depth));
                        let mut child = self.doc.last_child(id);
                        while let Some(current) = child {
                            pending.push(Step::Open(current, depth + 1));
                            child = self.doc.prev_sibling(current);
                        }
                    }
                }
                Step::Close(id, depth) => self.close(id, depth),
            }
        }
    }

    /// Writes a node's opening token, or the whole node if it has no
    /// content. Returns whether an end tag is still owed.
    fn open(&mut self, id: NodeId, depth: usize) -> bool {
        let doc = self.doc;
        let indent = self.options.indent(depth);
        match &doc.node(id).kind {
            NodeKind::Element {
                name,
                attributes,
                self_closing,
            } => {
                self.begin_tag(&indent);
                self.out.push('<');
                self.out.push_str(name);
                for (key, value) in attributes {
                    self.out.push(' ');
                    self.out.push_str(key);
                    self.out.push_str("=\"");
                    self.out.push_str(value);
                    self.out.push('"');
                }

                if *self_closing
                    || (self.options.render_empty_as_self_closing && self.is_empty(id))
                {
                    self.out.push_str(" />");
                    self.out.push_str(self.options.line_end());
                    self.line_already_indented = false;
                    return false;
                }

                self.out.push('>');
                if !self.first_child_breaks_line(id) {
                    self.out.push_str(self.options.line_end());
                }
                self.line_already_indented = false;
                true
            }
            NodeKind::Text { value } => {
                self.text(value.as_deref(), &indent);
                false
            }
            NodeKind::Comment { value } => {
                self.begin_inline(&indent);
                self.out.push_str("<!--");
                self.out.push_str(value);
                self.out.push_str("-->");
                false
            }
            NodeKind::CData { value } => {
                self.begin_inline(&indent);
                self.out.push_str("<![CDATA[");
                self.out.push_str(value);
                self.out.push_str("]]>");
                false
            }
        }
    }

    fn close(&mut self, id: NodeId, depth: usize) {
        let doc = self.doc;
        let Some(name) = doc.node_name(id) else {
            return;
        };
        let indent = self.options.indent(depth);
        self.begin_tag(&indent);
        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push('>');
        self.out.push_str(self.options.line_end());
        self.line_already_indented = false;
    }

    /// Writes a text value. A value that already starts with a line break
    /// and this depth's indent supplies its own indentation.
    fn text(&mut self, value: Option<&str>, indent: &str) {
        let mut value = value.unwrap_or("");
        if !self.line_already_indented {
            let line_end = self.options.line_end();
            let self_indented = self.options.auto_indent
                && value
                    .strip_prefix(line_end)
                    .is_some_and(|rest| rest.starts_with(indent));
            if self_indented {
                let indent_char = self.options.indent_char;
                value = value.trim_end_matches(|c: char| {
                    c == '\n' || (!indent.is_empty() && c == indent_char)
                });
            } else {
                self.out.push_str(indent);
            }
            self.line_already_indented = true;
        }
        self.out.push_str(value);
    }

    /// No children, or a single null text child.
    fn is_empty(&self, id: NodeId) -> bool {
        let mut children = self.doc.children(id);
        match (children.next(), children.next()) {
            (None, _) => true,
            (Some(only), None) => matches!(self.doc.node(only).kind, NodeKind::Text { value: None }),
            _ => false,
        }
    }

    fn first_child_breaks_line(&self, id: NodeId) -> bool {
        let Some(first) = self.doc.first_child(id) else {
            return false;
        };
        match &self.doc.node(first).kind {
            NodeKind::Text { value: None } => true,
            NodeKind::Text { value: Some(v) } => v.starts_with(self.options.line_end()),
            _ => false,
        }
    }
}
