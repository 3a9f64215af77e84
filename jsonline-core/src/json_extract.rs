use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Extract the inline JSON result from captured tool output.
///
/// Tools print human-readable progress and finish with one machine-readable
/// JSON line. Resolution order:
/// - the whole input, if it parses as a JSON object, is returned unchanged
/// - otherwise the last line whose trimmed content starts with `{`
///
/// The line fallback is a prefix heuristic: the returned line is not parsed.
/// Use [`extract_inline_value`] or [`decode_inline_json`] when the payload
/// must be valid.
///
/// Returns `None` if neither rule matches (including empty input).
pub fn extract_inline_json(text: &str) -> Option<&str> {
    if text.trim().is_empty() {
        return None;
    }

    if is_whole_json_object(text) {
        tracing::debug!(len = text.len(), "whole output is a JSON document");
        return Some(text);
    }

    let line = text
        .split('\n')
        .rev()
        .map(str::trim)
        .find(|ln| looks_like_json_object(ln));
    match line {
        Some(ln) => tracing::debug!(len = ln.len(), "found inline JSON line"),
        None => tracing::debug!("no inline JSON line in output"),
    }
    line
}

/// Like [`extract_inline_json`], but parsed. A heuristic match that fails to
/// parse yields `None`.
pub fn extract_inline_value(text: &str) -> Option<Value> {
    let line = extract_inline_json(text)?;
    serde_json::from_str::<Value>(line).ok()
}

/// Extract and deserialize the inline JSON result as `T`.
///
/// `Ok(None)` means the output carried no JSON-looking line at all; a line that
/// is present but does not decode as `T` is an error.
pub fn decode_inline_json<T: DeserializeOwned>(text: &str) -> Result<Option<T>> {
    let Some(line) = extract_inline_json(text) else {
        return Ok(None);
    };
    serde_json::from_str::<T>(line)
        .map(Some)
        .map_err(|e| Error::InvalidJson {
            line: line.trim().to_string(),
            message: e.to_string(),
        })
}

fn looks_like_json_object(s: &str) -> bool {
    s.starts_with('{')
}

fn is_whole_json_object(s: &str) -> bool {
    looks_like_json_object(s.trim()) && serde_json::from_str::<Value>(s).is_ok()
}
