//! Locating structured payloads embedded in free-form model replies.
//!
//! Replies usually wrap their tree in a fenced code block, but models also
//! emit bare JSON objects or raw FreeMind XML. Every miss is a `None`, never
//! an error: the caller decides whether to fall back to plain text.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

static FENCED_JSON_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```json\s*(.*?)\s*```").expect("fenced json regex"));

static BARE_JSON_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("bare json regex"));

static FENCED_XML_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?si)```xml\s*(.*?)```").expect("fenced xml regex"));

static BARE_XML_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?si)<(?:\?xml|map)[^>]*>.*</map>").expect("bare xml regex"));

/// Extract a JSON payload: fenced ```json block first, else the first
/// greedy `{...}` span.
pub fn extract_json_payload(text: &str) -> Option<&str> {
    if let Some(caps) = FENCED_JSON_RE.captures(text) {
        return Some(caps.get(1).expect("capture group").as_str());
    }
    BARE_JSON_RE.find(text).map(|m| m.as_str())
}

/// Extract an XML payload: fenced ```xml block (case-insensitive), else a
/// bare span from `<?xml` or `<map` to the final `</map>`.
///
/// An empty fenced block fails extraction outright; it does not fall through
/// to the bare match.
pub fn extract_xml_payload(text: &str) -> Option<&str> {
    if let Some(caps) = FENCED_XML_RE.captures(text) {
        let content = caps.get(1).expect("capture group").as_str().trim();
        if content.is_empty() {
            warn!("fenced xml block is empty");
            return None;
        }
        return Some(content);
    }
    BARE_XML_RE.find(text).map(|m| m.as_str())
}

/// True when the reply carries an XML mind-map payload.
pub fn contains_xml_mind_map(text: &str) -> bool {
    extract_xml_payload(text).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_json_block_is_preferred() {
        let reply = "Here you go:\n```json\n{\"data\":{\"text\":\"Root\"}}\n```\nDone.";
        assert_eq!(
            extract_json_payload(reply),
            Some("{\"data\":{\"text\":\"Root\"}}")
        );
    }

    #[test]
    fn bare_json_span_is_greedy() {
        let reply = "prefix {\"a\": {\"b\": 1}} suffix {\"c\": 2} tail";
        assert_eq!(
            extract_json_payload(reply),
            Some("{\"a\": {\"b\": 1}} suffix {\"c\": 2}")
        );
    }

    #[test]
    fn plain_text_yields_none() {
        assert_eq!(extract_json_payload("just a chat reply"), None);
        assert_eq!(extract_xml_payload("just a chat reply"), None);
        assert!(!contains_xml_mind_map("no markup here"));
    }

    #[test]
    fn fenced_xml_block_is_extracted_case_insensitively() {
        let reply = "```XML\n<map><node TEXT=\"Root\"/></map>\n```";
        assert_eq!(
            extract_xml_payload(reply),
            Some("<map><node TEXT=\"Root\"/></map>")
        );
    }

    /// An empty fenced xml block must not fall through to the bare matcher.
    #[test]
    fn empty_fenced_xml_block_fails_extraction() {
        let reply = "```xml\n\n```\n<map><node TEXT=\"Root\"/></map>";
        assert_eq!(extract_xml_payload(reply), None);
    }

    #[test]
    fn bare_xml_spans_declaration_to_closing_map() {
        let reply = "intro <?xml version=\"1.0\"?><map><node TEXT=\"a\"/></map> outro";
        assert_eq!(
            extract_xml_payload(reply),
            Some("<?xml version=\"1.0\"?><map><node TEXT=\"a\"/></map>")
        );
        let reply = "see: <map version=\"1.0\"><node TEXT=\"a\"/></map>";
        assert_eq!(
            extract_xml_payload(reply),
            Some("<map version=\"1.0\"><node TEXT=\"a\"/></map>")
        );
    }
}
