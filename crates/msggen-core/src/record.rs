use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key under which every generated record carries its text
pub const MESSAGE_FIELD: &str = "message";

/// Width the `"{index} of {count}"` label is centered in
pub const LABEL_WIDTH: usize = 20;

/// A single produced item, handed to a sink as a string-keyed mapping
///
/// Serializes transparently, so a record with one message looks like
/// `{"message":"..."}` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    /// Create a record holding only a message
    pub fn message(text: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert(MESSAGE_FIELD.to_string(), Value::String(text.into()));
        Self { fields }
    }

    /// Build the `index`-th record of a `count`-long sequence
    pub fn sequenced(prefix: &str, index: u64, count: u64) -> Self {
        let label = center(&format!("{} of {}", index, count), LABEL_WIDTH);
        Self::message(format!("{} {}", prefix, label))
    }

    /// Text stored under the message key
    pub fn text(&self) -> Option<&str> {
        self.fields.get(MESSAGE_FIELD).and_then(Value::as_str)
    }

    /// Look up any field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

/// Pad `text` with spaces on both sides to `width` characters
///
/// The odd space, if any, goes on the right. Text that is already
/// `width` characters or longer is returned unchanged.
pub fn center(text: &str, width: usize) -> String {
    format!("{:^width$}", text, width = width)
}
