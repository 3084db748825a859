//! Arena-based markup tree.
//!
//! All nodes live in a contiguous `Vec<NodeData>` owned by the `Document`,
//! and are referenced by `NodeId`, a newtype over `NonZeroU32`. Parent,
//! child and sibling links are arena indices, so a parent back-reference is
//! a plain copyable handle and never an owning pointer.
//!
//! There is no synthetic document node. The root element produced by
//! parsing (or installed by the host) is the top of the tree and has no
//! parent.
//!
//! Detached nodes stay allocated and can be attached again. Removed nodes
//! (`remove_node`, `clear_children`, and the children replaced by the markup
//! setters) release their slots for reuse, so a `NodeId` of a removed node
//! must not be used afterwards.

mod node;

pub use node::{Attributes, NodeKind};

use std::num::NonZeroU32;
use std::sync::Arc;

use crate::error::{MarkupError, ParseDiagnostic, ParseError, TreeError};
use crate::parser::scanner::ScanOutcome;
use crate::parser::{self, ParseOptions};
use crate::serial::{self, RenderOptions};

/// A typed index into the document's node arena.
///
/// `Option<NodeId>` has the same size as `NodeId` (niche optimization).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NodeId(NonZeroU32);

impl NodeId {
    /// Creates a `NodeId` from an arena index. Index 0 is the placeholder
    /// and has no id, as has any index beyond `u32::MAX`.
    fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index).ok().and_then(NonZeroU32::new).map(Self)
    }

    fn as_index(self) -> usize {
        self.0.get() as usize
    }
}

/// Parse and render settings attached to a node.
///
/// Both halves are shared: every node produced by one parse points at the
/// same `Arc`s, so a large tree carries two pointers per node rather than two
/// copies of the settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeOptions {
    /// Settings used when markup is parsed into this node.
    pub parse: Arc<ParseOptions>,
    /// Settings used when this node's markup is rendered.
    pub render: Arc<RenderOptions>,
}

/// Storage for a single node in the document arena.
#[derive(Debug, Clone)]
pub struct NodeData {
    /// What kind of node this is, and its payload.
    pub kind: NodeKind,
    /// Parent node. The root element, and detached nodes, have none.
    pub parent: Option<NodeId>,
    /// First child node.
    pub first_child: Option<NodeId>,
    /// Last child node (for O(1) append).
    pub last_child: Option<NodeId>,
    /// Next sibling.
    pub next_sibling: Option<NodeId>,
    /// Previous sibling.
    pub prev_sibling: Option<NodeId>,
    /// The options this node was created with.
    pub options: NodeOptions,
    /// Cleared when the slot is released for reuse.
    live: bool,
}

impl NodeData {
    fn new(kind: NodeKind, options: NodeOptions) -> Self {
        Self {
            kind,
            parent: None,
            first_child: None,
            last_child: None,
            next_sibling: None,
            prev_sibling: None,
            options,
            live: true,
        }
    }
}

/// A markup document.
///
/// The `Document` owns every node in an arena and provides navigation
/// through `&Document` and mutation through `&mut Document`.
///
/// # Examples
///
/// ```
/// use quasixml::Document;
///
/// let doc = Document::parse_str("<root><child/></root>").unwrap();
/// let root = doc.root_element().unwrap();
/// assert_eq!(doc.node_name(root), Some("root"));
/// assert_eq!(doc.child_count(root), 1);
/// ```
#[derive(Debug)]
pub struct Document {
    /// The node arena. Index 0 is unused (placeholder for `NonZeroU32`).
    nodes: Vec<NodeData>,
    /// Released slots, reused before the arena grows.
    free: Vec<NodeId>,
    root: Option<NodeId>,
    parse_options: Arc<ParseOptions>,
    render_options: Arc<RenderOptions>,
    /// Conditions the most recent parse recovered from.
    pub diagnostics: Vec<ParseDiagnostic>,
}

impl Document {
    /// Creates an empty document with default options and no root.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(ParseOptions::default(), RenderOptions::default())
    }

    /// Creates an empty document whose new nodes carry the given options.
    #[must_use]
    pub fn with_options(parse_options: ParseOptions, render_options: RenderOptions) -> Self {
        let parse_options = Arc::new(parse_options);
        let render_options = Arc::new(render_options);
        let placeholder = NodeData::new(
            NodeKind::Text { value: None },
            NodeOptions {
                parse: Arc::clone(&parse_options),
                render: Arc::clone(&render_options),
            },
        );
        let mut nodes = Vec::with_capacity(64);
        nodes.push(placeholder);
        Self {
            nodes,
            free: Vec::new(),
            root: None,
            parse_options,
            render_options,
            diagnostics: Vec::new(),
        }
    }

    /// Parses a markup string with default (recovering) options.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` only if the scanner could not make progress.
    /// Malformed markup is repaired and reported in
    /// [`diagnostics`](Document::diagnostics).
    pub fn parse_str(input: &str) -> Result<Self, ParseError> {
        parser::parse_str(input)
    }

    /// Decodes raw bytes to UTF-8 and parses them with default options.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the bytes cannot be decoded or the scanner
    /// could not make progress.
    pub fn parse_bytes(input: &[u8]) -> Result<Self, ParseError> {
        parser::parse_bytes(input)
    }

    /// The options nodes created through this document's API receive.
    #[must_use]
    pub fn default_options(&self) -> NodeOptions {
        NodeOptions {
            parse: Arc::clone(&self.parse_options),
            render: Arc::clone(&self.render_options),
        }
    }

    /// Returns the root element, if the document has one.
    #[must_use]
    pub fn root_element(&self) -> Option<NodeId> {
        self.root
    }

    /// Installs `id` as the root element, detaching it from any parent.
    pub fn set_root(&mut self, id: NodeId) {
        self.detach(id);
        self.root = Some(id);
    }

    /// Returns a reference to the `NodeData` for the given node.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this document.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.as_index()]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.as_index()]
    }

    /// Mutable access to a node's payload. Links are not reachable this way.
    pub fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.node_mut(id).kind
    }

    /// Returns the options attached to a node.
    #[must_use]
    pub fn node_options(&self, id: NodeId) -> &NodeOptions {
        &self.node(id).options
    }

    /// Replaces the render options used when `id` is rendered.
    pub fn set_render_options(&mut self, id: NodeId, options: RenderOptions) {
        self.node_mut(id).options.render = Arc::new(options);
    }

    /// Replaces the parse options used when markup is parsed into `id`.
    pub fn set_parse_options(&mut self, id: NodeId, options: ParseOptions) {
        self.node_mut(id).options.parse = Arc::new(options);
    }

    // --- Payload ---

    /// Returns the name of an element node.
    #[must_use]
    pub fn node_name(&self, id: NodeId) -> Option<&str> {
        self.node(id).kind.name()
    }

    /// Returns the value of a text, comment, or CDATA node.
    #[must_use]
    pub fn node_value(&self, id: NodeId) -> Option<&str> {
        self.node(id).kind.value()
    }

    /// Replaces the value of a text, comment, or CDATA node.
    ///
    /// For comments and CDATA a `None` value is stored as an empty string.
    /// Returns `false`, and changes nothing, for elements.
    pub fn set_value(&mut self, id: NodeId, value: Option<String>) -> bool {
        match &mut self.node_mut(id).kind {
            NodeKind::Text { value: slot } => *slot = value,
            NodeKind::Comment { value: slot } | NodeKind::CData { value: slot } => {
                *slot = value.unwrap_or_default();
            }
            NodeKind::Element { .. } => return false,
        }
        true
    }

    /// Returns the attributes of an element node.
    #[must_use]
    pub fn attributes(&self, id: NodeId) -> Option<&Attributes> {
        match &self.node(id).kind {
            NodeKind::Element { attributes, .. } => Some(attributes),
            _ => None,
        }
    }

    /// Mutable access to the attributes of an element node.
    pub fn attributes_mut(&mut self, id: NodeId) -> Option<&mut Attributes> {
        match &mut self.node_mut(id).kind {
            NodeKind::Element { attributes, .. } => Some(attributes),
            _ => None,
        }
    }

    /// Returns the value of an attribute on an element node.
    #[must_use]
    pub fn attribute(&self, id: NodeId, key: &str) -> Option<&str> {
        self.attributes(id)?.get(key).map(String::as_str)
    }

    /// Sets an attribute, keeping the original position of an existing key.
    ///
    /// Returns the previous value. Non-element nodes are left unchanged and
    /// return `None`.
    pub fn set_attribute(
        &mut self,
        id: NodeId,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Option<String> {
        self.attributes_mut(id)?.insert(key.into(), value.into())
    }

    /// Returns whether an element renders as `<name ... />`.
    #[must_use]
    pub fn is_self_closing(&self, id: NodeId) -> bool {
        matches!(
            self.node(id).kind,
            NodeKind::Element {
                self_closing: true,
                ..
            }
        )
    }

    /// Sets the self-closing flag of an element. Other kinds are unchanged.
    pub fn set_self_closing(&mut self, id: NodeId, flag: bool) {
        if let NodeKind::Element { self_closing, .. } = &mut self.node_mut(id).kind {
            *self_closing = flag;
        }
    }

    // --- Navigation ---

    /// Returns the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Returns the first child of a node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).first_child
    }

    /// Returns the last child of a node.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).last_child
    }

    /// Returns the next sibling of a node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).next_sibling
    }

    /// Returns the previous sibling of a node.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).prev_sibling
    }

    /// Returns an iterator over the children of a node.
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            doc: self,
            next: self.node(id).first_child,
        }
    }

    /// Returns the child at `index`, counting every node kind.
    #[must_use]
    pub fn child_at(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).nth(index)
    }

    /// Returns the number of direct children.
    #[must_use]
    pub fn child_count(&self, id: NodeId) -> usize {
        self.children(id).count()
    }

    /// Returns the first child element named exactly `name`.
    #[must_use]
    pub fn child_element(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.children(id)
            .find(|&child| self.node_name(child) == Some(name))
    }

    /// Returns an iterator over the parent chain, nearest first.
    ///
    /// The node itself is not included.
    pub fn ascendants(&self, id: NodeId) -> Ascendants<'_> {
        Ascendants {
            doc: self,
            next: self.node(id).parent,
        }
    }

    /// Returns an iterator over all descendants of a node in pre-order.
    ///
    /// The node itself is not included.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            root: id,
            next: self.first_child(id),
        }
    }

    /// Number of ascendants of a node. The root element has depth 0.
    #[must_use]
    pub fn depth(&self, id: NodeId) -> usize {
        self.ascendants(id).count()
    }

    // --- Text and markup ---

    /// Concatenates the values of descendant text nodes.
    ///
    /// Recurses through elements only. Comments and CDATA do not contribute
    /// and null text values count as empty.
    #[must_use]
    pub fn inner_text(&self, id: NodeId) -> String {
        let mut result = String::new();
        let mut pending = Vec::new();
        self.push_children_reversed(id, &mut pending);
        while let Some(current) = pending.pop() {
            match &self.node(current).kind {
                NodeKind::Text { value } => result.push_str(value.as_deref().unwrap_or("")),
                NodeKind::Element { .. } => self.push_children_reversed(current, &mut pending),
                NodeKind::Comment { .. } | NodeKind::CData { .. } => {}
            }
        }
        result
    }

    fn push_children_reversed(&self, id: NodeId, stack: &mut Vec<NodeId>) {
        let mut child = self.last_child(id);
        while let Some(current) = child {
            stack.push(current);
            child = self.prev_sibling(current);
        }
    }

    /// Replaces all children of `id` with a single text node.
    ///
    /// # Errors
    ///
    /// Returns `TreeError::NotAnElement` if `id` is not an element.
    pub fn set_inner_text(
        &mut self,
        id: NodeId,
        value: impl Into<String>,
    ) -> Result<(), TreeError> {
        self.require_element(id)?;
        self.clear_children(id);
        let options = self.node(id).options.clone();
        let text = self.create_node_with(NodeKind::text(value), options);
        self.link_last(id, text);
        Ok(())
    }

    /// Renders the children of `id` with the node's render options.
    #[must_use]
    pub fn inner_markup(&self, id: NodeId) -> String {
        serial::render_inner(self, id, &self.node(id).options.render)
    }

    /// Renders `id` and its subtree with the node's render options.
    #[must_use]
    pub fn outer_markup(&self, id: NodeId) -> String {
        serial::render(self, id, &self.node(id).options.render)
    }

    /// Replaces the children of `id` with the nodes parsed from `markup`.
    ///
    /// The markup is parsed as the content of a wrapper element, using the
    /// node's parse options. New nodes inherit the node's options.
    ///
    /// # Errors
    ///
    /// Returns `MarkupError::Tree` if `id` is not an element, and
    /// `MarkupError::Parse` for a failed parse. The node is then left
    /// untouched.
    pub fn set_inner_markup(&mut self, id: NodeId, markup: &str) -> Result<(), MarkupError> {
        self.require_element(id)?;
        let wrapped = format!("<root>{markup}</root>");
        let (mut scratch, outcome) = self.parse_detached(id, &wrapped)?;
        self.diagnostics = outcome.diagnostics;
        self.clear_children(id);
        if let Some(wrapper) = outcome.root {
            self.graft_children(&mut scratch, wrapper, id);
        }
        Ok(())
    }

    /// Turns `id` into the root element parsed from `markup`.
    ///
    /// The node keeps its identity and position in the tree; its payload and
    /// children are replaced. A recovering parse that finds no element leaves
    /// the node unchanged.
    ///
    /// # Errors
    ///
    /// Returns the `ParseError` of a failed parse; the node is then left
    /// untouched.
    pub fn set_outer_markup(&mut self, id: NodeId, markup: &str) -> Result<(), ParseError> {
        let (mut scratch, outcome) = self.parse_detached(id, markup)?;
        self.diagnostics = outcome.diagnostics;
        let Some(parsed) = outcome.root else {
            return Ok(());
        };
        let kind = std::mem::replace(
            &mut scratch.node_mut(parsed).kind,
            NodeKind::Text { value: None },
        );
        self.node_mut(id).kind = kind;
        self.clear_children(id);
        self.graft_children(&mut scratch, parsed, id);
        Ok(())
    }

    /// Parses `markup` with the options of `id` into a scratch document, so a
    /// failed parse leaves nothing behind in this one.
    fn parse_detached(
        &self,
        id: NodeId,
        markup: &str,
    ) -> Result<(Document, ScanOutcome), ParseError> {
        let options = self.node(id).options.clone();
        let mut scratch = Document::new();
        let outcome = parser::parse_fragment(&mut scratch, markup, &options)?;
        Ok((scratch, outcome))
    }

    /// Moves the subtrees under `from` in `scratch` to the end of the
    /// children of `to`, in document order.
    fn graft_children(&mut self, scratch: &mut Document, from: NodeId, to: NodeId) {
        let mut pending = Vec::new();
        let mut child = scratch.last_child(from);
        while let Some(current) = child {
            pending.push((current, to));
            child = scratch.prev_sibling(current);
        }
        while let Some((source, parent)) = pending.pop() {
            let data = scratch.node_mut(source);
            let kind = std::mem::replace(&mut data.kind, NodeKind::Text { value: None });
            let options = data.options.clone();
            let copy = self.create_node_with(kind, options);
            self.link_last(parent, copy);

            let mut child = scratch.last_child(source);
            while let Some(current) = child {
                pending.push((current, copy));
                child = scratch.prev_sibling(current);
            }
        }
    }

    // --- Mutation ---

    /// Allocates a new detached node carrying the document's default options.
    pub fn create_node(&mut self, kind: NodeKind) -> NodeId {
        let options = self.default_options();
        self.create_node_with(kind, options)
    }

    /// Allocates a new detached node carrying `options`.
    ///
    /// Slots released by removed nodes are reused first.
    ///
    /// # Panics
    ///
    /// Panics if the arena would need more than `u32::MAX` slots.
    pub fn create_node_with(&mut self, kind: NodeKind, options: NodeOptions) -> NodeId {
        let data = NodeData::new(kind, options);
        if let Some(id) = self.free.pop() {
            self.nodes[id.as_index()] = data;
            return id;
        }
        let Some(id) = NodeId::from_index(self.nodes.len()) else {
            panic!("node arena is full: at most {} nodes per document", u32::MAX);
        };
        self.nodes.push(data);
        id
    }

    /// Allocates a detached element with no attributes.
    pub fn create_element(&mut self, name: impl Into<String>) -> NodeId {
        self.create_node(NodeKind::element(name))
    }

    /// Allocates a detached text node.
    pub fn create_text(&mut self, value: impl Into<String>) -> NodeId {
        self.create_node(NodeKind::text(value))
    }

    /// Allocates a detached comment node.
    pub fn create_comment(&mut self, value: impl Into<String>) -> NodeId {
        self.create_node(NodeKind::Comment {
            value: value.into(),
        })
    }

    /// Allocates a detached CDATA node.
    pub fn create_cdata(&mut self, value: impl Into<String>) -> NodeId {
        self.create_node(NodeKind::CData {
            value: value.into(),
        })
    }

    /// Appends `child` as the last child of `parent`.
    ///
    /// A child that is already attached elsewhere is moved.
    ///
    /// # Errors
    ///
    /// Returns `TreeError::NotAnElement` if `parent` is not an element, and
    /// `TreeError::WouldCycle` if `child` is `parent` or one of its
    /// ascendants.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.require_element(parent)?;
        self.check_acyclic(parent, child)?;
        self.detach(child);
        self.link_last(parent, child);
        self.follow_moved_root(child);
        Ok(())
    }

    /// Inserts `new_child` before `reference` in the reference's parent.
    ///
    /// # Errors
    ///
    /// Returns `TreeError::Orphan` if `reference` has no parent,
    /// `TreeError::NotAnElement` if that parent is not an element, and
    /// `TreeError::WouldCycle` if `new_child` is an ascendant of it.
    pub fn insert_before(&mut self, reference: NodeId, new_child: NodeId) -> Result<(), TreeError> {
        if reference == new_child {
            return Ok(());
        }
        let parent = self
            .node(reference)
            .parent
            .ok_or(TreeError::Orphan(reference))?;
        self.require_element(parent)?;
        self.check_acyclic(parent, new_child)?;
        self.detach(new_child);

        self.node_mut(new_child).parent = Some(parent);
        if let Some(prev) = self.node(reference).prev_sibling {
            self.node_mut(prev).next_sibling = Some(new_child);
            self.node_mut(new_child).prev_sibling = Some(prev);
        } else {
            self.node_mut(parent).first_child = Some(new_child);
        }
        self.node_mut(new_child).next_sibling = Some(reference);
        self.node_mut(reference).prev_sibling = Some(new_child);

        self.follow_moved_root(new_child);
        Ok(())
    }

    /// Inserts `child` as the first child of `parent`.
    ///
    /// # Errors
    ///
    /// As [`append_child`](Document::append_child).
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.require_element(parent)?;
        match self.first_child(parent) {
            Some(first) if first != child => self.insert_before(first, child),
            Some(_) => Ok(()),
            None => self.append_child(parent, child),
        }
    }

    /// Detaches a node from its parent. The subtree stays intact.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.node(id).parent else {
            return;
        };

        let prev = self.node(id).prev_sibling;
        let next = self.node(id).next_sibling;

        match prev {
            Some(p) => self.node_mut(p).next_sibling = next,
            None => self.node_mut(parent).first_child = next,
        }
        match next {
            Some(n) => self.node_mut(n).prev_sibling = prev,
            None => self.node_mut(parent).last_child = prev,
        }

        let data = self.node_mut(id);
        data.parent = None;
        data.prev_sibling = None;
        data.next_sibling = None;
    }

    /// Removes a node and its subtree from the tree and releases their
    /// slots. The removed ids must not be used afterwards.
    ///
    /// Removing the root element leaves the document without a root.
    pub fn remove_node(&mut self, id: NodeId) {
        if !self.node(id).live {
            return;
        }
        self.detach(id);
        if self.root == Some(id) {
            self.root = None;
        }
        let released: Vec<NodeId> = std::iter::once(id).chain(self.descendants(id)).collect();
        for slot in released {
            self.release(slot);
        }
    }

    /// Removes every child of `id`, as [`remove_node`](Document::remove_node).
    pub fn clear_children(&mut self, id: NodeId) {
        while let Some(child) = self.first_child(id) {
            self.remove_node(child);
        }
    }

    /// Returns the number of allocated nodes, detached ones included and
    /// removed ones excluded.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len() - 1 - self.free.len()
    }

    // --- Internal linking ---

    /// Links a detached node as the last child of `parent` without checks.
    pub(crate) fn link_last(&mut self, parent: NodeId, child: NodeId) {
        self.node_mut(child).parent = Some(parent);
        if let Some(last) = self.node(parent).last_child {
            self.node_mut(last).next_sibling = Some(child);
            self.node_mut(child).prev_sibling = Some(last);
        } else {
            self.node_mut(parent).first_child = Some(child);
        }
        self.node_mut(parent).last_child = Some(child);
    }

    pub(crate) fn set_parsed_root(&mut self, root: Option<NodeId>) {
        self.root = root;
    }

    fn release(&mut self, id: NodeId) {
        let mut data = NodeData::new(NodeKind::Text { value: None }, self.default_options());
        data.live = false;
        self.nodes[id.as_index()] = data;
        self.free.push(id);
    }

    fn require_element(&self, id: NodeId) -> Result<(), TreeError> {
        if self.node(id).kind.is_element() {
            Ok(())
        } else {
            Err(TreeError::NotAnElement(id))
        }
    }

    fn check_acyclic(&self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        if parent == child || self.ascendants(parent).any(|a| a == child) {
            return Err(TreeError::WouldCycle { parent, child });
        }
        Ok(())
    }

    /// Keeps `root` pointing at the top of the tree when the root element is
    /// attached under another node.
    fn follow_moved_root(&mut self, moved: NodeId) {
        if self.root == Some(moved) {
            self.root = self.ascendants(moved).last();
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

// --- Iterators ---

/// Iterator over the children of a node.
pub struct Children<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.doc.node(current).next_sibling;
        Some(current)
    }
}

/// Iterator over the parent chain of a node, nearest first.
pub struct Ascendants<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ascendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.doc.node(current).parent;
        Some(current)
    }
}

/// Pre-order iterator over the descendants of a node.
pub struct Descendants<'a> {
    doc: &'a Document,
    root: NodeId,
    next: Option<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;

        if let Some(child) = self.doc.first_child(current) {
            self.next = Some(child);
            return Some(current);
        }
        if let Some(sibling) = self.doc.next_sibling(current) {
            self.next = Some(sibling);
            return Some(current);
        }

        // Climb until an ancestor below the subtree root has a next sibling.
        let mut ancestor = self.doc.parent(current);
        while let Some(anc) = ancestor {
            if anc == self.root {
                break;
            }
            if let Some(sibling) = self.doc.next_sibling(anc) {
                self.next = Some(sibling);
                return Some(current);
            }
            ancestor = self.doc.parent(anc);
        }

        self.next = None;
        Some(current)
    }
}
