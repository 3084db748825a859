//! Error types and diagnostics for markup parsing.
//!
//! Parsing is bimodal. With `abort_on_error` set, the first malformed
//! construct stops the scan with a [`ParseError`]. Otherwise the scanner
//! repairs the problem locally and records a [`ParseDiagnostic`] on the
//! resulting [`Document`](crate::Document) instead.

use std::fmt;

use thiserror::Error;

use crate::tree::NodeId;

/// Severity level for a parse diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorSeverity {
    /// Something unusual that did not change the resulting tree.
    Warning,
    /// A malformed construct that was repaired by dropping or ignoring input.
    Error,
    /// An unrecoverable error; parsing stopped.
    Fatal,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
            Self::Fatal => write!(f, "fatal error"),
        }
    }
}

/// Source location within a markup string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    /// 1-based line number.
    pub line: u32,
    /// 0-based byte offset from the start of the input.
    pub byte_offset: usize,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}", self.line)
    }
}

/// A condition the scanner recovered from.
///
/// Collected on [`Document::diagnostics`](crate::Document::diagnostics) when
/// parsing in recovery mode, so hosts can tell a clean parse from a lossy one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDiagnostic {
    /// The severity of this diagnostic.
    pub severity: ErrorSeverity,
    /// Human-readable message. Matches the `ParseError` message abort mode
    /// raises for the same condition, where it raises one.
    pub message: String,
    /// Where in the source the condition was found.
    pub location: SourceLocation,
}

impl fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} at {}", self.severity, self.message, self.location)
    }
}

/// The single error kind surfaced by the parser.
///
/// Failures are told apart by their message, not by type: a missing tag end
/// token, a missing end tag, a closing tag with nothing to close, an
/// unterminated comment or CDATA section, or a generic `Parser error.` for a
/// scan that could not make progress.
#[derive(Debug, Clone, Error)]
#[error("{}", render_parse_error(.message, .location))]
pub struct ParseError {
    /// The primary error message.
    pub message: String,
    /// Where in the source the error occurred, when known.
    pub location: Option<SourceLocation>,
    /// Diagnostics recorded before the failure.
    pub diagnostics: Vec<ParseDiagnostic>,
}

#[allow(clippy::ref_option)]
fn render_parse_error(message: &str, location: &Option<SourceLocation>) -> String {
    match location {
        Some(loc) => format!("{message} Source line number: {}", loc.line),
        None => message.to_string(),
    }
}

impl ParseError {
    /// Creates an error without a source location.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
            diagnostics: Vec::new(),
        }
    }

    /// Returns the 1-based source line of the error, if known.
    #[must_use]
    pub fn line_number(&self) -> Option<u32> {
        self.location.map(|loc| loc.line)
    }
}

/// Errors from structural tree mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The requested parent is the node itself or one of its descendants.
    #[error("attaching node {child:?} under {parent:?} would create a cycle")]
    WouldCycle {
        /// The node that would have become the parent.
        parent: NodeId,
        /// The node being attached.
        child: NodeId,
    },

    /// The reference node for an insertion has no parent.
    #[error("node {0:?} has no parent to insert beside")]
    Orphan(NodeId),

    /// Only elements can hold children.
    #[error("node {0:?} is not an element and cannot have children")]
    NotAnElement(NodeId),
}

/// Errors from replacing a node's content with parsed markup.
#[derive(Debug, Clone, Error)]
pub enum MarkupError {
    /// The markup failed to parse.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The node cannot take the parsed content.
    #[error(transparent)]
    Tree(#[from] TreeError),
}
