//! FreeMind-style XML ingestion.
//!
//! Model replies embed `<map><node TEXT="..."/></map>` documents. This parser
//! produces the same node shape as JSON ingestion but applies a flat 15-char
//! truncation instead of the segmenter (labels here are already meant to be
//! short; anything longer keeps its full text in the note).

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::warn;

use crate::node::{Node, NodeData};

/// Default label for elements missing a `TEXT`/`text` attribute.
const FALLBACK_LABEL: &str = "节点";

/// Flat character cut applied to XML-sourced labels.
const XML_LABEL_LIMIT: usize = 15;

/// Generic element tree retained from the XML document.
#[derive(Debug)]
struct RawElement {
    name: String,
    text_attr: Option<String>,
    children: Vec<RawElement>,
}

/// Parse a FreeMind-style document into a tree.
///
/// Returns `None` (logged, not thrown) when the XML is malformed or no
/// `<node>` element exists. The root is the first `<node>` under `<map>`,
/// falling back to the first `<node>` anywhere.
pub fn parse_freemind(xml: &str) -> Option<Node> {
    let elements = match parse_elements(xml) {
        Ok(elements) => elements,
        Err(err) => {
            warn!(error = %err, "xml parse failed");
            return None;
        }
    };

    let root = find_root(&elements);
    let Some(root) = root else {
        warn!("no <node> element found in xml payload");
        return None;
    };
    Some(convert(root))
}

fn parse_elements(xml: &str) -> Result<Vec<RawElement>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut roots = Vec::new();
    let mut stack: Vec<RawElement> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => stack.push(element_from_start(&e)),
            Event::Empty(e) => attach(&mut stack, &mut roots, element_from_start(&e)),
            Event::End(_) => {
                if let Some(done) = stack.pop() {
                    attach(&mut stack, &mut roots, done);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    // Unclosed elements still count; quick-xml reports genuinely broken nesting.
    while let Some(done) = stack.pop() {
        attach(&mut stack, &mut roots, done);
    }
    Ok(roots)
}

fn element_from_start(e: &BytesStart<'_>) -> RawElement {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut text_attr = None;
    for attr in e.attributes().flatten() {
        if matches!(attr.key.as_ref(), b"TEXT" | b"text") {
            if let Ok(value) = attr.unescape_value() {
                text_attr = Some(value.into_owned());
                break;
            }
        }
    }
    RawElement {
        name,
        text_attr,
        children: Vec::new(),
    }
}

fn attach(stack: &mut [RawElement], roots: &mut Vec<RawElement>, element: RawElement) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => roots.push(element),
    }
}

/// First `<node>` under a `<map>` element, else the first `<node>` in
/// document order.
fn find_root(elements: &[RawElement]) -> Option<&RawElement> {
    fn under_map<'a>(element: &'a RawElement) -> Option<&'a RawElement> {
        if element.name == "map" {
            if let Some(node) = element.children.iter().find(|c| c.name == "node") {
                return Some(node);
            }
        }
        element.children.iter().find_map(under_map)
    }
    fn any_node<'a>(element: &'a RawElement) -> Option<&'a RawElement> {
        if element.name == "node" {
            return Some(element);
        }
        element.children.iter().find_map(any_node)
    }

    elements
        .iter()
        .find_map(under_map)
        .or_else(|| elements.iter().find_map(any_node))
}

/// Convert an element to a node: `TEXT`/`text` attribute as label (flat-cut
/// to 15 chars, full text in the note); direct child `<node>` elements only.
fn convert(element: &RawElement) -> Node {
    let text = element.text_attr.as_deref().unwrap_or(FALLBACK_LABEL);
    let over_limit = text.chars().count() > XML_LABEL_LIMIT;
    let label = if over_limit {
        text.chars().take(XML_LABEL_LIMIT).collect()
    } else {
        text.to_string()
    };

    Node {
        data: NodeData {
            text: label,
            note: over_limit.then(|| text.to_string()),
            ..NodeData::default()
        },
        children: element
            .children
            .iter()
            .filter(|c| c.name == "node")
            .map(convert)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_root_and_direct_children() {
        let xml = r#"<map><node TEXT="Root"><node TEXT="Child"/></node></map>"#;
        let tree = parse_freemind(xml).expect("tree");
        assert_eq!(tree.data.text, "Root");
        assert_eq!(tree.children.len(), 1);
        assert_eq!(tree.children[0].data.text, "Child");
        assert!(tree.children[0].children.is_empty());
    }

    #[test]
    fn lowercase_text_attribute_is_accepted() {
        let xml = r#"<map><node text="小写"/></map>"#;
        let tree = parse_freemind(xml).expect("tree");
        assert_eq!(tree.data.text, "小写");
    }

    #[test]
    fn missing_text_attribute_uses_fallback_label() {
        let tree = parse_freemind("<map><node/></map>").expect("tree");
        assert_eq!(tree.data.text, "节点");
        assert!(tree.data.note.is_none());
    }

    #[test]
    fn long_label_is_flat_truncated_with_full_text_in_note() {
        let long = "零一二三四五六七八九十壹贰叁肆伍陆";
        let xml = format!(r#"<map><node TEXT="{long}"/></map>"#);
        let tree = parse_freemind(&xml).expect("tree");
        assert_eq!(tree.data.text.chars().count(), 15);
        assert_eq!(tree.data.note.as_deref(), Some(long));
    }

    #[test]
    fn malformed_xml_returns_none() {
        assert!(parse_freemind("<map><node TEXT=\"a\"></map>").is_none());
        assert!(parse_freemind("no xml at all").is_none());
    }

    #[test]
    fn node_without_map_wrapper_is_found() {
        let tree = parse_freemind(r#"<node TEXT="bare"/>"#).expect("tree");
        assert_eq!(tree.data.text, "bare");
    }

    #[test]
    fn non_node_elements_are_not_children() {
        let xml = r#"<map><node TEXT="Root"><font NAME="x"/><node TEXT="Kid"/></node></map>"#;
        let tree = parse_freemind(xml).expect("tree");
        assert_eq!(tree.children.len(), 1);
        assert_eq!(tree.children[0].data.text, "Kid");
    }

    #[test]
    fn escaped_attribute_values_are_decoded() {
        let xml = r#"<map><node TEXT="A &amp; B"/></map>"#;
        let tree = parse_freemind(xml).expect("tree");
        assert_eq!(tree.data.text, "A & B");
    }
}
