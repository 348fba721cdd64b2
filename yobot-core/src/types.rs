//! Core types: sender, raw update, and fetch response.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Recipient identity of an update. The id is opaque and is echoed back when replying.
///
/// Numeric ids are accepted and kept as their decimal text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(id) => Ok(id),
        Value::Number(id) => Ok(id.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "sender id must be a string or number, got {}",
            other
        ))),
    }
}

impl Sender {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// One inbound message event as delivered by the platform.
///
/// `text` is base64-encoded; fields the framework does not read are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawUpdate {
    #[serde(default)]
    pub text: String,
    pub sender: Sender,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawUpdate {
    /// Builds an update from an already base64-encoded body.
    pub fn new(text: impl Into<String>, sender: Sender) -> Self {
        Self {
            text: text.into(),
            sender,
            extra: Map::new(),
        }
    }
}

/// Result of one `getUpdates` call: HTTP status and the batch (empty unless status is 200).
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResponse {
    pub status: u16,
    pub updates: Vec<RawUpdate>,
}

impl FetchResponse {
    pub fn new(status: u16, updates: Vec<RawUpdate>) -> Self {
        Self { status, updates }
    }

    /// A response with no batch (204, 429, 5xx...).
    pub fn empty(status: u16) -> Self {
        Self::new(status, Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_update_keeps_unknown_fields() {
        let json = r#"{"text":"aGk=","sender":{"id":"u-1"},"messageId":"m-9","chatId":7}"#;
        let update: RawUpdate = serde_json::from_str(json).unwrap();

        assert_eq!(update.text, "aGk=");
        assert_eq!(update.sender.id, "u-1");
        assert_eq!(update.extra.get("messageId"), Some(&Value::from("m-9")));
        assert_eq!(update.extra.get("chatId"), Some(&Value::from(7)));
    }

    #[test]
    fn test_raw_update_missing_text_defaults_to_empty() {
        let update: RawUpdate = serde_json::from_str(r#"{"sender":{"id":"u-1"}}"#).unwrap();
        assert!(update.text.is_empty());
    }

    #[test]
    fn test_sender_id_accepts_numbers() {
        let update: RawUpdate =
            serde_json::from_str(r#"{"text":"aGk=","sender":{"id":42}}"#).unwrap();
        assert_eq!(update.sender.id, "42");

        let err = serde_json::from_str::<RawUpdate>(r#"{"text":"aGk=","sender":{"id":null}}"#);
        assert!(err.is_err());
    }
}
