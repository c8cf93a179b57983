//! Field Bags
//!
//! A `FieldBag` is what one dialog hands over on submit: field name to value,
//! no schema, no type tag. It is built once per Save click and consumed once by
//! the dispatcher.
//!
//! A field is *present* when the bag holds the key, whatever the value.
//! `false`, `""` and `[]` are all present. JSON `null` members are dropped on
//! the way in, so a cleared optional field reads as absent.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Number, Value as JsonValue};
use std::collections::BTreeMap;

/// Errors turning submitted JSON into a `FieldBag`
#[derive(Debug, thiserror::Error)]
pub enum FieldBagError {
    #[error("Field bag must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("Unsupported value for field '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// A single submitted field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Checkbox / toggle
    Flag(bool),
    /// Numeric input
    Number(Number),
    /// Free text, select, date string
    Text(String),
    /// Multi-select or tag list
    List(Vec<String>),
    /// Nested group (e.g. an address or GP details block)
    Object(Map<String, JsonValue>),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map<String, JsonValue>> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// An empty list, used for list-field defaults
    pub fn empty_list() -> Self {
        Self::List(Vec::new())
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Flag(b) => JsonValue::Bool(*b),
            Self::Number(n) => JsonValue::Number(n.clone()),
            Self::Text(s) => JsonValue::String(s.clone()),
            Self::List(items) => {
                JsonValue::Array(items.iter().cloned().map(JsonValue::String).collect())
            }
            Self::Object(map) => JsonValue::Object(map.clone()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Flag(b)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(items: Vec<&str>) -> Self {
        Self::List(items.into_iter().map(str::to_string).collect())
    }
}

impl From<Map<String, JsonValue>> for FieldValue {
    fn from(map: Map<String, JsonValue>) -> Self {
        Self::Object(map)
    }
}

impl TryFrom<JsonValue> for FieldValue {
    type Error = String;

    fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
        match value {
            JsonValue::Bool(b) => Ok(Self::Flag(b)),
            JsonValue::Number(n) => Ok(Self::Number(n)),
            JsonValue::String(s) => Ok(Self::Text(s)),
            JsonValue::Object(map) => Ok(Self::Object(map)),
            JsonValue::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    JsonValue::String(s) => Ok(s),
                    other => Err(format!("list items must be strings, got {}", json_type(&other))),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Self::List),
            JsonValue::Null => Err("null is not a field value".to_string()),
        }
    }
}

/// Untyped field set submitted by one dialog
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, JsonValue>")]
pub struct FieldBag(BTreeMap<String, FieldValue>);

impl FieldBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a bag from a submitted JSON object, dropping `null` members
    pub fn from_json(value: JsonValue) -> Result<Self, FieldBagError> {
        match value {
            JsonValue::Object(map) => Self::try_from(map),
            other => Err(FieldBagError::NotAnObject(json_type(&other))),
        }
    }

    /// True when the key is present, regardless of its value
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key)
    }

    /// Insert or replace a field, returning the previous value
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Option<FieldValue> {
        self.0.insert(key.into(), value.into())
    }

    /// Insert only when the key is absent. Returns true if the default was applied.
    pub fn insert_if_absent(
        &mut self,
        key: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> bool {
        let key = key.into();
        if self.0.contains_key(&key) {
            return false;
        }
        self.0.insert(key, value.into());
        true
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        self.0.remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render as a JSON object for ports that speak JSON
    pub fn to_json(&self) -> JsonValue {
        JsonValue::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

impl TryFrom<Map<String, JsonValue>> for FieldBag {
    type Error = FieldBagError;

    fn try_from(map: Map<String, JsonValue>) -> Result<Self, Self::Error> {
        let mut fields = BTreeMap::new();
        for (field, value) in map {
            if value.is_null() {
                continue;
            }
            let value = FieldValue::try_from(value)
                .map_err(|reason| FieldBagError::InvalidValue { field: field.clone(), reason })?;
            fields.insert(field, value);
        }
        Ok(Self(fields))
    }
}

impl Serialize for FieldBag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter())
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for FieldBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

fn json_type(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

// =============================================================================
// Tests
// =============================================================================
