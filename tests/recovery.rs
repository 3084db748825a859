//! Scanner behavior on well-formed and damaged markup, in both recovery and
//! abort mode.

#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;

use quasixml::error::ErrorSeverity;
use quasixml::parser::{parse_str_with_options, ParseOptions};
use quasixml::{Document, NodeId, NodeKind, ParseError};

fn recover(markup: &str) -> (Document, NodeId) {
    let doc = parse_str_with_options(markup, &ParseOptions::new()).unwrap();
    let root = doc.root_element().unwrap();
    (doc, root)
}

fn abort(markup: &str) -> ParseError {
    let strict = ParseOptions::new().abort_on_error(true);
    match parse_str_with_options(markup, &strict) {
        Ok(_) => panic!("expected {markup:?} to be rejected"),
        Err(e) => e,
    }
}

fn is_text(doc: &Document, id: NodeId) -> bool {
    matches!(doc.node(id).kind, NodeKind::Text { .. })
}

#[test]
fn test_parse_element() {
    let (doc, root) = recover(
        r"<root>
                <element>content <subelement>text</subelement></element>
            </root>",
    );
    assert_eq!(doc.child_count(root), 1);
    let element = doc.child_element(root, "element").unwrap();
    assert_eq!(doc.child_count(element), 2);
    assert_eq!(doc.node_name(doc.first_child(root).unwrap()), Some("element"));
    assert_eq!(doc.inner_text(element), "content text");
}

#[test]
fn test_parse_attributes() {
    let markup = "<root>
                <element attribute=\"abc123='\" attribute2 ='abc123=\"' attribute3= \"abc\t 123=\" />
            </root>";

    let (doc, root) = recover(markup);
    let element = doc.child_element(root, "element").unwrap();
    assert_eq!(doc.attribute(element, "attribute"), Some("abc123='"));
    assert_eq!(doc.attribute(element, "attribute2"), Some("abc123=\""));
    assert_eq!(doc.attribute(element, "attribute3"), Some("abc\t 123="));

    let normalizing = ParseOptions::new().normalize_attribute_whitespace(true);
    let doc = parse_str_with_options(markup, &normalizing).unwrap();
    let root = doc.root_element().unwrap();
    let element = doc.child_element(root, "element").unwrap();
    assert_eq!(doc.attribute(element, "attribute3"), Some("abc 123="));
}

#[test]
fn test_unclosed_attribute_value_swallows_next_key() {
    let (doc, root) = recover(
        r#"<root>
                <element attribute="attributedata" attribute2=" attribute3="attrubutedata3" />
            </root>"#,
    );
    let element = doc.child_element(root, "element").unwrap();
    assert_eq!(doc.attribute(element, "attribute2"), Some("attribute3="));
}

#[test]
fn test_parse_self_closing_tag() {
    let (doc, root) = recover(
        r#"<root>
                <element attribute="attributedata" attribute2="attributedata2" />
            </root>"#,
    );
    assert_eq!(doc.child_count(root), 1);
    let element = doc.child_element(root, "element").unwrap();
    assert!(doc.node(element).kind.is_element());
    assert!(doc.is_self_closing(element));
    assert_eq!(doc.attributes(element).unwrap().len(), 2);
    assert_eq!(doc.attribute(element, "attribute"), Some("attributedata"));
    assert_eq!(doc.attribute(element, "attribute2"), Some("attributedata2"));
}

#[test]
fn test_self_closing_root() {
    let (doc, root) = recover(r#"<root attribute="attributedata" attribute2="attributedata2" />"#);
    assert_eq!(doc.child_count(root), 0);
    assert_eq!(doc.node_name(root), Some("root"));
    assert_eq!(doc.attributes(root).unwrap().len(), 2);
    assert_eq!(doc.attribute(root, "attribute"), Some("attributedata"));
    assert_eq!(doc.attribute(root, "attribute2"), Some("attributedata2"));
}

#[test]
fn test_parse_comment() {
    let (doc, root) = recover(
        r#"<root>
                <element attribute="attributedata" attribute2="attributedata2">
                    <!-- <commentelement attribute="attributedata" />commented out text -->live text
                    <subelement attribute="attributedata" />more live text
                </element>
            </root>"#,
    );
    assert_eq!(doc.child_count(root), 1);
    let element = doc.child_element(root, "element").unwrap();
    assert_eq!(doc.child_count(element), 4);
    let comment = doc.first_child(element).unwrap();
    assert!(matches!(doc.node(comment).kind, NodeKind::Comment { .. }));
    assert_eq!(
        doc.node_value(comment),
        Some(r#" <commentelement attribute="attributedata" />commented out text "#)
    );
}

#[test]
fn test_parse_cdata() {
    let (doc, root) = recover(
        r#"<root>
                <element attribute="elementattribute" attribute2="elementattribute2">
                    <![CDATA[cdata content </>"']]>text
                    <subelement attribute="elementattribute" />
                </element>
            </root>"#,
    );
    let element = doc.child_element(root, "element").unwrap();
    assert_eq!(doc.child_count(element), 3);
    let cdata = doc.child_at(element, 0).unwrap();
    assert!(matches!(doc.node(cdata).kind, NodeKind::CData { .. }));
    assert!(is_text(&doc, doc.child_at(element, 1).unwrap()));
    assert!(doc.node(doc.child_at(element, 2).unwrap()).kind.is_element());
    assert_eq!(doc.node_value(cdata), Some(r#"cdata content </>"'"#));
}

const MISSING_END_TAG: &str = r#"<root>
                <element attribute="attributedata" attribute2="attributedata2">
            </root>"#;

#[test]
fn test_missing_end_tag() {
    let err = abort(MISSING_END_TAG);
    assert_eq!(err.message, "Missing end tag.");
    assert_eq!(err.line_number(), Some(2));

    let (doc, root) = recover(MISSING_END_TAG);
    assert_eq!(doc.node_name(root), Some("root"));
    assert_eq!(doc.child_count(root), 0);
    assert_eq!(doc.diagnostics.len(), 1);
    assert_eq!(doc.diagnostics[0].severity, ErrorSeverity::Error);
}

#[test]
fn test_missing_end_tag_auto_closed() {
    let options = ParseOptions::new().auto_close_open_tags(true);
    let doc = parse_str_with_options(MISSING_END_TAG, &options).unwrap();
    let root = doc.root_element().unwrap();
    let element = doc.child_element(root, "element").unwrap();
    assert_eq!(doc.attribute(element, "attribute2"), Some("attributedata2"));
    assert_eq!(doc.diagnostics.len(), 1);
    assert_eq!(doc.diagnostics[0].severity, ErrorSeverity::Warning);
}

#[test]
fn test_missing_open_tag_to_close() {
    let markup = "<root><one><two></two></two></one></root>";
    assert_eq!(abort(markup).message, "Missing open 'two' tag to close.");

    let (doc, root) = recover(markup);
    let one = doc.child_element(root, "one").unwrap();
    assert!(doc.child_element(one, "two").is_some());
}

#[test]
fn test_missing_tag_end_token() {
    let markup = "<root><one></one</root>";
    assert_eq!(abort(markup).message, "Missing tag end token.");

    let (doc, root) = recover(markup);
    assert_eq!(doc.child_count(root), 0);
}

#[test]
fn test_missing_cdata_end_token() {
    let markup = "<root><one><![CDATA[cdata content]]</one></root>";
    assert_eq!(abort(markup).message, "Missing CDATA end token.");

    let (doc, root) = recover(markup);
    assert_eq!(doc.child_count(root), 1);
    let one = doc.first_child(root).unwrap();
    assert_eq!(doc.child_count(one), 1);
    assert!(is_text(&doc, doc.first_child(one).unwrap()));
}

#[test]
fn test_missing_comment_end_token() {
    let markup = "<root><one><!-- this is a comment --</one></root>";
    assert_eq!(abort(markup).message, "Missing comment end token.");

    let (doc, root) = recover(markup);
    assert_eq!(doc.child_count(root), 1);
    let one = doc.first_child(root).unwrap();
    assert_eq!(doc.child_count(one), 1);
    assert!(is_text(&doc, doc.first_child(one).unwrap()));
}

#[test]
fn test_error_display_names_line() {
    let err = abort("<root>\n\n<a></b>\n</root>");
    assert_eq!(
        err.to_string(),
        "Missing open 'b' tag to close. Source line number: 3"
    );
}

#[test]
fn test_each_repair_is_reported_with_its_line() {
    let (doc, _) = recover("<root>\n</x>\n<a></a\n<!--\n</root>");
    let reported: Vec<_> = doc
        .diagnostics
        .iter()
        .map(|d| (d.message.as_str(), d.location.line))
        .collect();
    assert_eq!(
        reported,
        vec![
            ("Missing open 'x' tag to close.", 2),
            ("Missing tag end token.", 3),
            ("Missing comment end token.", 4),
            ("Missing end tag.", 3),
        ]
    );
}
