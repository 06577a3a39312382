//! Reply-to-tree orchestration.
//!
//! Composes the extractor, parsers, and normalizer to turn one model reply
//! into a usable tree. JSON and XML ingestion are deliberately separate
//! entry points: generation expects the JSON shape requested by the system
//! prompt, while [`detect_and_parse`] handles replies that volunteer
//! FreeMind XML. Neither path ever fails hard; the worst outcome is the
//! plain-text fallback tree.

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::core::extract::{extract_json_payload, extract_xml_payload};
use crate::core::freemind::parse_freemind;
use crate::core::normalize::normalize;
use crate::core::segment::split_for_node;
use crate::io::config::MindmapConfig;
use crate::io::prompt::build_system_prompt;
use crate::io::transport::{ChatMessage, ChatTransport};
use crate::node::{Node, NodeData};

/// Label used when the fallback tree has no usable text.
const FALLBACK_LABEL: &str = "AI 回复";

/// Ask the model for a mind map and parse its reply.
///
/// Transport failures propagate as errors. A reply without a parseable JSON
/// payload degrades to the plain-text fallback tree, never to an error.
pub fn generate_mind_map(
    transport: &dyn ChatTransport,
    config: &MindmapConfig,
    user_prompt: &str,
) -> Result<Node> {
    let messages = [
        ChatMessage::system(build_system_prompt()),
        ChatMessage::user(user_prompt),
    ];
    let reply = transport.send(&messages).context("chat transport send")?;
    debug!(reply_len = reply.text.len(), usage = ?reply.usage, "received model reply");

    match parse_json_reply(&reply.text) {
        Some(tree) => {
            info!(nodes = tree.count(), "parsed mind map from json reply");
            Ok(tree)
        }
        None => {
            warn!("no structured payload in reply, falling back to plain text");
            Ok(create_simple_mind_map(&reply.text, config.note_limit))
        }
    }
}

/// Extract and parse an embedded JSON tree, then normalize it.
///
/// Returns `None` (logged) when no payload is found or it fails to parse.
pub fn parse_json_reply(text: &str) -> Option<Node> {
    let payload = extract_json_payload(text)?;
    let raw: Value = match serde_json::from_str(payload) {
        Ok(raw) => raw,
        Err(err) => {
            warn!(error = %err, "embedded json payload failed to parse");
            return None;
        }
    };
    Some(normalize(&raw))
}

/// Detect and parse a FreeMind XML mind map embedded in a reply.
///
/// The JSON ingestion path is not chained here; callers wanting both must
/// compose them explicitly.
pub fn detect_and_parse(text: &str) -> Option<Node> {
    let payload = extract_xml_payload(text)?;
    let tree = parse_freemind(payload)?;
    info!(nodes = tree.count(), "parsed mind map from xml payload");
    Some(tree)
}

/// Wrap arbitrary reply text as a single root node.
///
/// The note is the segmenter overflow, or else the original text, truncated
/// to `note_limit` characters; an empty result is omitted.
pub fn create_simple_mind_map(text: &str, note_limit: usize) -> Node {
    let segmented = split_for_node(text);
    let label = if segmented.label.is_empty() {
        FALLBACK_LABEL.to_string()
    } else {
        segmented.label
    };
    let note = segmented
        .note
        .unwrap_or_else(|| text.to_string())
        .chars()
        .take(note_limit)
        .collect::<String>();

    Node {
        data: NodeData {
            text: label,
            note: (!note.is_empty()).then_some(note),
            hyperlink: None,
            expand: Some(true),
            is_active: Some(false),
        },
        children: Vec::new(),
    }
}
