use serde::{Deserialize, Serialize};

/// One element of the mind-map tree.
///
/// Nodes produced by [`crate::core::normalize`] satisfy the label budget and
/// carry fresh-render flags; nodes deserialized from arbitrary files may not.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Node {
    pub data: NodeData,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

/// Payload of a single node: display label plus optional attachments.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeData {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hyperlink: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expand: Option<bool>,
    #[serde(
        default,
        rename = "isActive",
        skip_serializing_if = "Option::is_none"
    )]
    pub is_active: Option<bool>,
}

impl Node {
    /// Leaf node with the given label and no attachments.
    pub fn leaf(text: impl Into<String>) -> Self {
        Self {
            data: NodeData {
                text: text.into(),
                ..NodeData::default()
            },
            children: Vec::new(),
        }
    }

    /// Total number of nodes in this subtree, including self.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Node::count).sum::<usize>()
    }
}
