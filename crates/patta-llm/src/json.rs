//! Recover JSON that a model embedded in a larger reply
//!
//! Models asked for "JSON only" still wrap it in prose or markdown fences.
//! [`parse_embedded`] tries progressively looser readings of the reply and
//! returns the first one that deserialises into the requested type:
//!
//! 1. the whole reply
//! 2. the body of a fenced code block
//! 3. the first balanced `{...}` or `[...]` span
//! 4. everything from the first opening to the last closing bracket

use serde::de::DeserializeOwned;
use thiserror::Error;

/// No reading of the reply produced the requested type
#[derive(Error, Debug, Clone, PartialEq)]
#[error("No JSON could be recovered: {reason}")]
pub struct EmbeddedJsonError {
    /// Parse error from the last candidate tried
    pub reason: String,
}

/// Deserialize the first recoverable JSON value in `content`
///
/// # Examples
///
/// ```
/// use patta_llm::json::parse_embedded;
/// use serde_json::Value;
///
/// let reply = "Sure! Here it is: {\"village\": \"Kanha\"} Let me know.";
/// let value: Value = parse_embedded(reply).unwrap();
/// assert_eq!(value["village"], "Kanha");
/// ```
pub fn parse_embedded<T: DeserializeOwned>(content: &str) -> Result<T, EmbeddedJsonError> {
    let mut reason = "reply is empty".to_string();

    for candidate in candidates(content) {
        match serde_json::from_str::<T>(candidate) {
            Ok(value) => return Ok(value),
            Err(e) => reason = e.to_string(),
        }
    }

    Err(EmbeddedJsonError { reason })
}

/// Candidate slices in the order they are tried
fn candidates(content: &str) -> Vec<&str> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let mut out = vec![trimmed];

    if let Some(fenced) = fenced_block(trimmed) {
        out.push(fenced);
    }

    let mut opens: Vec<usize> = ['{', '[']
        .iter()
        .filter_map(|&c| trimmed.find(c))
        .collect();
    opens.sort_unstable();

    for &start in &opens {
        if let Some(span) = balanced_span(trimmed, start) {
            out.push(span);
        }
    }

    for &start in &opens {
        let close = if trimmed.as_bytes()[start] == b'{' { '}' } else { ']' };
        if let Some(end) = trimmed.rfind(close) {
            if end > start {
                out.push(&trimmed[start..=end]);
            }
        }
    }

    out.dedup();
    out
}

/// Body of the first ``` fence, with an optional language tag skipped
fn fenced_block(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after = &text[open + 3..];
    let body_start = after.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &after[body_start..];
    let close = body.find("```")?;
    let inner = body[..close].trim();
    (!inner.is_empty()).then_some(inner)
}

/// Span from `start` to its matching close bracket
///
/// Brackets inside string literals are ignored, as are escaped quotes.
fn balanced_span(text: &str, start: usize) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, byte) in text.as_bytes()[start..].iter().enumerate() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'{' | b'[' => depth += 1,
            b'}' | b']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}
