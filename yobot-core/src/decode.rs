//! Turns the base64 `text` of a [`RawUpdate`](crate::RawUpdate) into message text.
//!
//! The decoded body is either a JSON envelope carrying the text at `content.content`, or plain
//! text. Decoding never fails: anything unparseable falls back to the decoded (or raw) string.

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use serde_json::Value;
use tracing::{debug, warn};

/// Base64-decodes `text`, trying the standard alphabet first, then unpadded and URL-safe variants.
/// ASCII whitespace anywhere in the input (line-wrapped base64) is ignored. Invalid UTF-8 is
/// replaced; if no alphabet accepts the input the raw text is returned.
pub fn decode_base64_text(text: &str) -> String {
    let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = [STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD]
        .iter()
        .find_map(|engine| engine.decode(&compact).ok());

    match bytes {
        Some(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        None => {
            warn!(len = text.len(), "update text is not valid base64, using it verbatim");
            text.to_string()
        }
    }
}

/// Extracts `content.content` from a decoded envelope.
///
/// Returns `None` when the body is not JSON or has no usable `content` field, so the caller can
/// fall back to the plain text.
pub fn envelope_content(decoded: &str) -> Option<String> {
    let value: Value = serde_json::from_str(decoded).ok()?;
    match value.get("content")? {
        Value::Null => None,
        Value::Object(inner) => Some(match inner.get("content") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }),
        _ => Some(String::new()),
    }
}

/// Full decode step: base64, then envelope, then plain-text fallback.
pub fn decode_content(text: &str) -> String {
    let decoded = decode_base64_text(text);
    match envelope_content(&decoded) {
        Some(content) => content,
        None => {
            debug!(content = %decoded, "Received plain text");
            decoded
        }
    }
}
