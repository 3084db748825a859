//! Node type definitions.
//!
//! `NodeKind` is the payload half of a node: which of the four constructs it
//! is, and the data that construct carries. Navigation links (parent,
//! children, siblings) are stored in `NodeData`, not here.

use std::fmt;

use indexmap::IndexMap;

/// Attribute mapping of an element: unique keys in insertion order.
pub type Attributes = IndexMap<String, String>;

/// The kind of a markup node and its associated data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// An element, e.g. `<div class="x">` or `<br />`.
    Element {
        /// The tag name, exactly as written.
        name: String,
        /// Attributes in source order.
        attributes: Attributes,
        /// Whether the element was written (and renders) as `<name ... />`.
        self_closing: bool,
    },

    /// Character data between tags.
    ///
    /// A `None` value is distinct from an empty string: it renders nothing
    /// and lets an otherwise empty element render as self-closing.
    Text {
        /// The raw text, entity references left untouched.
        value: Option<String>,
    },

    /// A comment, e.g. `<!-- ... -->`.
    Comment {
        /// The text between `<!--` and `-->`.
        value: String,
    },

    /// A CDATA section, e.g. `<![CDATA[...]]>`.
    CData {
        /// The text between `<![CDATA[` and `]]>`.
        value: String,
    },
}

impl NodeKind {
    /// An element with no attributes that is not self-closing.
    pub fn element(name: impl Into<String>) -> Self {
        Self::Element {
            name: name.into(),
            attributes: Attributes::new(),
            self_closing: false,
        }
    }

    /// A text node holding `value`.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text {
            value: Some(value.into()),
        }
    }

    /// Returns `true` for element nodes.
    #[must_use]
    pub fn is_element(&self) -> bool {
        matches!(self, Self::Element { .. })
    }

    /// Returns the element name, or `None` for the value-carrying kinds.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Returns the value of a text, comment, or CDATA node.
    ///
    /// Elements and null text values return `None`.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Text { value } => value.as_deref(),
            Self::Comment { value } | Self::CData { value } => Some(value),
            Self::Element { .. } => None,
        }
    }
}

/// One-line summary, e.g. `Element, Name="root"` or `Text, Value="hi"`.
impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element { name, .. } => write!(f, "Element, Name=\"{name}\""),
            Self::Text { value } => {
                write!(f, "Text, Value=\"{}\"", value.as_deref().unwrap_or(""))
            }
            Self::Comment { value } => write!(f, "Comment, Value=\"{value}\""),
            Self::CData { value } => write!(f, "CData, Value=\"{value}\""),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_display_summaries() {
        assert_eq!(NodeKind::element("root").to_string(), "Element, Name=\"root\"");
        assert_eq!(NodeKind::text("hi").to_string(), "Text, Value=\"hi\"");
        assert_eq!(NodeKind::Text { value: None }.to_string(), "Text, Value=\"\"");
        assert_eq!(
            NodeKind::Comment {
                value: " note ".to_string()
            }
            .to_string(),
            "Comment, Value=\" note \""
        );
        assert_eq!(
            NodeKind::CData {
                value: "<raw>".to_string()
            }
            .to_string(),
            "CData, Value=\"<raw>\""
        );
    }

    #[test]
    fn test_name_and_value_are_exclusive() {
        let elem = NodeKind::element("a");
        assert_eq!(elem.name(), Some("a"));
        assert_eq!(elem.value(), None);

        let text = NodeKind::text("body");
        assert_eq!(text.name(), None);
        assert_eq!(text.value(), Some("body"));
        assert_eq!(NodeKind::Text { value: None }.value(), None);
    }
}
