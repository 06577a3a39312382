//! Serialization of normalized trees to portable formats.
//!
//! The XML dialect emitted here (`<mindmap>` with `text` attributes and
//! `<children>` wrappers) is deliberately distinct from the FreeMind dialect
//! accepted on ingestion; the two are separate schemas with the [`Node`]
//! type as the pivot.

use anyhow::{Context, Result};

use crate::node::Node;

/// Pretty-printed JSON (indent 2) with trailing newline.
///
/// Exact inverse of `serde_json::from_str` for any normalized tree.
pub fn to_json(node: &Node) -> Result<String> {
    let mut buf = serde_json::to_string_pretty(node).context("serialize mind map json")?;
    buf.push('\n');
    Ok(buf)
}

/// Recursive `<node text="...">` emission inside the `<mindmap>` envelope.
pub fn to_xml(node: &Node) -> String {
    let mut body = String::new();
    node_to_xml(node, "  ", &mut body);
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<mindmap>\n{body}</mindmap>")
}

fn node_to_xml(node: &Node, indent: &str, out: &mut String) {
    out.push_str(indent);
    out.push_str("<node text=\"");
    out.push_str(&escape_xml(&node.data.text));
    out.push_str("\">\n");

    if let Some(hyperlink) = &node.data.hyperlink {
        out.push_str(indent);
        out.push_str("  <hyperlink>");
        out.push_str(&escape_xml(hyperlink));
        out.push_str("</hyperlink>\n");
    }

    if let Some(note) = &node.data.note {
        out.push_str(indent);
        out.push_str("  <note>");
        out.push_str(&escape_xml(note));
        out.push_str("</note>\n");
    }

    if !node.children.is_empty() {
        out.push_str(indent);
        out.push_str("  <children>\n");
        let child_indent = format!("{indent}    ");
        for child in &node.children {
            node_to_xml(child, &child_indent, out);
        }
        out.push_str(indent);
        out.push_str("  </children>\n");
    }

    out.push_str(indent);
    out.push_str("</node>\n");
}

/// Escape the five XML reserved characters; `&` first to avoid
/// double-escaping.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
