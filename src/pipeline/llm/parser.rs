//! Two-stage repair of model replies: strict parse first, then salvage the
//! outermost JSON span from surrounding prose.

use serde::de::DeserializeOwned;

use super::LlmError;

/// Remove a wrapping markdown code fence: an opening ``` line (with or
/// without a language tag) and a closing ```. Fences inside the payload stay.
pub fn strip_code_fences(raw: &str) -> String {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```") {
        text = match rest.find('\n') {
            Some(end) => &rest[end + 1..],
            None => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
        };
        if let Some(body) = text.trim_end().strip_suffix("```") {
            text = body;
        }
    }
    text.trim().to_string()
}

/// Parse a JSON object reply, salvaging the outermost `{...}` span on failure.
pub fn parse_object<T: DeserializeOwned>(raw: &str) -> Result<T, LlmError> {
    parse_with_salvage(raw, '{', '}')
}

/// Parse a JSON array reply, salvaging the outermost `[...]` span on failure.
pub fn parse_array<T: DeserializeOwned>(raw: &str) -> Result<Vec<T>, LlmError> {
    parse_with_salvage(raw, '[', ']')
}

fn parse_with_salvage<T: DeserializeOwned>(raw: &str, open: char, close: char) -> Result<T, LlmError> {
    let cleaned = strip_code_fences(raw);
    let strict_err = match serde_json::from_str::<T>(&cleaned) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    tracing::debug!(error = %strict_err, "Strict parse failed, attempting salvage");

    let span = outermost_span(&cleaned, open, close)
        .ok_or_else(|| LlmError::JsonParsing(format!("no {open}...{close} span: {strict_err}")))?;

    serde_json::from_str(span).map_err(|e| LlmError::JsonParsing(e.to_string()))
}

/// Slice from the first `open` to the last `close`, inclusive.
fn outermost_span(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    if end < start {
        return None;
    }
    Some(&text[start..end + close.len_utf8()])
}
