//! # quasixml
//!
//! An error-tolerant scanner for XML-like markup and a renderer that writes
//! the resulting node tree back out.
//!
//! Input does not have to be well-formed. Overlapping tags, stray closing
//! tags, unterminated comments and truncated tags are repaired locally and
//! reported as diagnostics, or, with
//! [`ParseOptions::abort_on_error`](parser::ParseOptions::abort_on_error),
//! rejected with a [`ParseError`] naming the source line.
//!
//! ## Quick Start
//!
//! ```
//! use quasixml::Document;
//!
//! let doc = Document::parse_str("<root><child a='1'>Hello</child></root>").unwrap();
//! let root = doc.root_element().unwrap();
//! let child = doc.child_element(root, "child").unwrap();
//! assert_eq!(doc.attribute(child, "a"), Some("1"));
//! assert_eq!(doc.inner_text(root), "Hello");
//! assert_eq!(doc.outer_markup(root), "<root><child a=\"1\">Hello</child></root>");
//! ```
//!
//! ## Recovery
//!
//! ```
//! use quasixml::Document;
//! use quasixml::parser::{parse_str_with_options, ParseOptions};
//!
//! let markup = "<root><one><two></two></two></one></root>";
//!
//! let doc = Document::parse_str(markup).unwrap();
//! assert_eq!(doc.diagnostics.len(), 1);
//!
//! let strict = ParseOptions::new().abort_on_error(true);
//! let err = parse_str_with_options(markup, &strict).unwrap_err();
//! assert_eq!(err.to_string(), "Missing open 'two' tag to close. Source line number: 1");
//! ```

pub mod encoding;
pub mod error;
pub mod parser;
pub mod serial;
pub mod tree;

// Re-export primary types at the crate root for convenience.
pub use error::{MarkupError, ParseDiagnostic, ParseError, TreeError};
pub use parser::ParseOptions;
pub use serial::RenderOptions;
pub use tree::{Attributes, Document, NodeId, NodeKind};
