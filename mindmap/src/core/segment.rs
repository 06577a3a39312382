//! Text segmentation against the node label budget.
//!
//! A label may hold at most [`IDEOGRAPH_LIMIT`] ideographic characters or
//! [`WORD_LIMIT`] alphanumeric word tokens; overflow is relocated to the
//! node note, never dropped.

/// Maximum ideographic characters allowed in a node label.
pub const IDEOGRAPH_LIMIT: usize = 15;

/// Maximum alphanumeric word tokens allowed in a node label.
pub const WORD_LIMIT: usize = 10;

/// Result of splitting text against the label budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segmented {
    /// Display label, trimmed and within budget.
    pub label: String,
    /// Overflow text, trimmed; `None` when everything fit.
    pub note: Option<String>,
}

/// True for characters in the CJK Unified Ideographs block counted by the budget.
fn is_ideograph(c: char) -> bool {
    ('\u{4e00}'..='\u{9fa5}').contains(&c)
}

/// Sentence-terminal punctuation recognized for boundary splits (wide and ASCII forms).
fn is_sentence_terminal(c: char) -> bool {
    matches!(c, '。' | '！' | '？' | '.' | '!' | '?')
}

/// Count ideographic characters and maximal alphanumeric runs in `text`.
pub fn text_length(text: &str) -> (usize, usize) {
    let ideographs = text.chars().filter(|c| is_ideograph(*c)).count();
    let mut words = 0;
    let mut in_word = false;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if !in_word {
                words += 1;
                in_word = true;
            }
        } else {
            in_word = false;
        }
    }
    (ideographs, words)
}

/// True when either count alone exceeds its threshold.
pub fn is_too_long(text: &str) -> bool {
    let (ideographs, words) = text_length(text);
    ideographs > IDEOGRAPH_LIMIT || words > WORD_LIMIT
}

/// Split `text` into a budgeted label plus optional overflow note.
///
/// Prefers a sentence-boundary split; falls back to a hard cut at the
/// dominant limit when no boundary leaves a non-empty label.
pub fn split_for_node(text: &str) -> Segmented {
    if text.is_empty() {
        return Segmented {
            label: String::new(),
            note: None,
        };
    }

    let trimmed = text.trim();
    if !is_too_long(trimmed) {
        return Segmented {
            label: trimmed.to_string(),
            note: None,
        };
    }

    let (label, remaining) = sentence_split(trimmed)
        .unwrap_or_else(|| hard_split(trimmed));

    let remaining = remaining.trim();
    Segmented {
        label: label.trim().to_string(),
        note: (!remaining.is_empty()).then(|| remaining.to_string()),
    }
}

/// Accumulate sentence pieces until the next one would overflow the budget.
///
/// Returns `None` when even the first piece overflows (no usable boundary).
fn sentence_split(text: &str) -> Option<(String, String)> {
    let mut label = String::new();
    for (start, piece) in sentence_pieces(text) {
        let mut candidate = label.clone();
        candidate.push_str(piece);
        if is_too_long(&candidate) {
            if label.is_empty() {
                return None;
            }
            return Some((label, text[start..].to_string()));
        }
        label = candidate;
    }
    // Unreachable for text that is too long, but stay total.
    Some((label, String::new()))
}

/// Pieces of `text` where each sentence-terminal character is its own piece,
/// tagged with the byte offset where the piece starts.
fn sentence_pieces(text: &str) -> Vec<(usize, &str)> {
    let mut pieces = Vec::new();
    let mut piece_start = 0;
    for (idx, c) in text.char_indices() {
        if is_sentence_terminal(c) {
            if idx > piece_start {
                pieces.push((piece_start, &text[piece_start..idx]));
            }
            let end = idx + c.len_utf8();
            pieces.push((idx, &text[idx..end]));
            piece_start = end;
        }
    }
    if piece_start < text.len() {
        pieces.push((piece_start, &text[piece_start..]));
    }
    pieces
}

/// Cut at the dominant limit: first 15 ideographs (interleaved non-ideographs
/// preserved) or first 10 whitespace tokens.
fn hard_split(text: &str) -> (String, String) {
    let (ideographs, _) = text_length(text);
    if ideographs > IDEOGRAPH_LIMIT {
        let mut count = 0;
        let mut cut = 0;
        for (idx, c) in text.char_indices() {
            if is_ideograph(c) {
                count += 1;
                if count > IDEOGRAPH_LIMIT {
                    break;
                }
            }
            cut = idx + c.len_utf8();
        }
        (text[..cut].to_string(), text[cut..].to_string())
    } else {
        let words: Vec<&str> = text.split_whitespace().collect();
        let label = words[..WORD_LIMIT.min(words.len())].join(" ");
        let rest = words[WORD_LIMIT.min(words.len())..].join(" ");
        (label, rest)
    }
}
