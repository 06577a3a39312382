//! Defensive normalization of untrusted raw trees.
//!
//! Model output is attacker-influenced JSON: fields may be missing, null, or
//! the wrong type. [`normalize`] maps any shape to a well-formed [`Node`]
//! rather than validating and throwing.

use serde_json::Value;

use crate::core::segment::split_for_node;
use crate::node::{Node, NodeData};

/// Recursively normalize a raw tree into a render-ready node.
///
/// Total over any JSON value: missing `data`/`text` defaults to an empty
/// label, non-array `children` yields a leaf. Labels are split against the
/// budget and overflow is merged in front of any pre-existing note.
pub fn normalize(raw: &Value) -> Node {
    let data = raw.get("data");
    let raw_text = data
        .and_then(|d| d.get("text"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    let segmented = split_for_node(raw_text);

    let original_note = data
        .and_then(|d| d.get("note"))
        .and_then(Value::as_str)
        .map(str::to_string);
    let note = match (segmented.note, original_note) {
        (Some(overflow), Some(original)) => Some(format!("{overflow}\n\n{original}")),
        (Some(overflow), None) => Some(overflow),
        (None, original) => original,
    };

    let hyperlink = data
        .and_then(|d| d.get("hyperlink"))
        .and_then(Value::as_str)
        .map(str::to_string);

    let children = raw
        .get("children")
        .and_then(Value::as_array)
        .map(|raw_children| raw_children.iter().map(normalize).collect())
        .unwrap_or_default();

    Node {
        data: NodeData {
            text: segmented.label,
            note,
            hyperlink,
            expand: Some(true),
            is_active: Some(false),
        },
        children,
    }
}
