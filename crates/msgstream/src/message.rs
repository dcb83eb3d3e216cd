//! Tagged result messages and the synthesized table group payload.
//!
//! A message travels as a JSON 2-array `[tag, payload]`. The tag is a
//! one-character classifier; the payload is opaque to everything except the
//! renderer.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// Message classifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Tag {
    /// `t`: table header.
    Table,
    /// `r`: table row.
    Row,
    /// `L`: log line.
    Log,
    /// `m`: metadata.
    Metadata,
    /// `x`: end of messages.
    EndOfMessages,
    /// Any tag this crate does not interpret.
    Other(String),
}

impl Tag {
    pub fn as_str(&self) -> &str {
        match self {
            Tag::Table => "t",
            Tag::Row => "r",
            Tag::Log => "L",
            Tag::Metadata => "m",
            Tag::EndOfMessages => "x",
            Tag::Other(tag) => tag,
        }
    }
}

impl From<&str> for Tag {
    fn from(value: &str) -> Self {
        match value {
            "t" => Tag::Table,
            "r" => Tag::Row,
            "L" => Tag::Log,
            "m" => Tag::Metadata,
            "x" => Tag::EndOfMessages,
            other => Tag::Other(other.to_string()),
        }
    }
}

impl From<String> for Tag {
    fn from(value: String) -> Self {
        match Tag::from(value.as_str()) {
            Tag::Other(_) => Tag::Other(value),
            known => known,
        }
    }
}

impl From<Tag> for String {
    fn from(tag: Tag) -> Self {
        match tag {
            Tag::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `[tag, payload]` element of a message stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message(pub Tag, pub Value);

impl Message {
    pub fn new(tag: impl Into<Tag>, payload: Value) -> Self {
        Self(tag.into(), payload)
    }

    pub fn tag(&self) -> &Tag {
        &self.0
    }

    pub fn payload(&self) -> &Value {
        &self.1
    }

    /// The message as the JSON 2-array it was decoded from.
    pub fn to_json(&self) -> Value {
        json!([self.0.as_str(), self.1])
    }
}

/// Parse a serialized message stream (`[]` or `[[tag, payload], ...]`).
pub fn parse_stream(stream: &str) -> Result<Vec<Message>, serde_json::Error> {
    serde_json::from_str(stream)
}

/// Payload of a `t` message after row stacking.
///
/// A group opened by stray rows has no header; the key is then omitted from
/// the serialized payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<Value>,
    #[serde(default)]
    pub rows: Vec<Value>,
}

impl TableGroup {
    pub fn with_header(header: Value) -> Self {
        Self {
            header: Some(header),
            rows: Vec::new(),
        }
    }

    pub fn headerless() -> Self {
        Self::default()
    }

    pub fn into_message(self) -> Message {
        let mut payload = serde_json::Map::new();
        if let Some(header) = self.header {
            payload.insert("header".to_string(), header);
        }
        payload.insert("rows".to_string(), Value::Array(self.rows));
        Message(Tag::Table, Value::Object(payload))
    }

    /// Reads a stacked `t` payload back. Returns `None` for payloads that
    /// were not produced by stacking.
    pub fn from_payload(payload: &Value) -> Option<Self> {
        let obj = payload.as_object()?;
        if !obj.contains_key("rows") {
            return None;
        }
        serde_json::from_value(payload.clone()).ok()
    }
}
