use derive_deref::{Deref, DerefMut};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Component properties: a JSON object
///
/// Merging is shallow, one level: a key in the patch replaces the whole value
/// under that key.
#[derive(Debug, Clone, PartialEq, Default, Deref, DerefMut, Serialize, Deserialize)]
pub struct Props(pub Map<String, Value>);

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<V: Into<Value>>(mut self, key: &str, value: V) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// `{...self, ...patch}`
    pub fn merge(&mut self, patch: Props) {
        for (key, value) in patch.0 {
            self.0.insert(key, value);
        }
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    pub fn i64(&self, key: &str) -> Option<i64> {
        self.0.get(key).and_then(Value::as_i64)
    }
}

/// Non-object values give empty props
impl From<Value> for Props {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }
}

/// Attribute text for a prop value; `None` means "remove the attribute"
pub(crate) fn attribute_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}
