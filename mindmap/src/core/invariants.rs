//! Semantic invariants not expressible via JSON Schema.

use crate::core::segment::is_too_long;
use crate::node::Node;

/// Check semantic invariants of a normalized tree:
/// - Every label within the length budget
/// - No empty-string notes (absent notes must be omitted)
///
/// Returns one message per violation, tagged with the node path.
pub fn validate_invariants(root: &Node) -> Vec<String> {
    let mut errors = Vec::new();
    validate_node(root, &mut errors, &root.data.text);
    errors
}

fn validate_node(node: &Node, errors: &mut Vec<String>, path: &str) {
    if is_too_long(&node.data.text) {
        errors.push(format!("{}: label exceeds length budget", path));
    }

    if node.data.note.as_deref() == Some("") {
        errors.push(format!("{}: note must be absent, not empty", path));
    }

    for child in &node.children {
        let child_path = format!("{}/{}", path, child.data.text);
        validate_node(child, errors, &child_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    #[test]
    fn normalized_tree_passes() {
        let mut root = Node::leaf("root");
        root.children.push(Node::leaf("child"));
        assert!(validate_invariants(&root).is_empty());
    }

    #[test]
    fn over_budget_label_is_reported_with_path() {
        let mut root = Node::leaf("root");
        root.children.push(Node::leaf("字".repeat(16)));
        let errors = validate_invariants(&root);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("length budget"));
        assert!(errors[0].starts_with("root/"));
    }

    #[test]
    fn empty_note_is_reported() {
        let mut root = Node::leaf("root");
        root.data.note = Some(String::new());
        let errors = validate_invariants(&root);
        assert!(errors.iter().any(|e| e.contains("note must be absent")));
    }
}
