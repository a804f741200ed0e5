//! Values stored in chain nodes.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::{Number, Value};

use crate::predicate::{ChunkFilter, ChunkPolicy};

pub type ChainMap = IndexMap<String, ChainValue>;

/// A JSON-like value that can also hold a chunk-selection decision.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ChainValue {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<ChainValue>),
    Object(ChainMap),
    Chunks(ChunkFilter),
}

impl ChainValue {
    pub fn object() -> Self {
        ChainValue::Object(ChainMap::new())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ChainValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ChainValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ChainValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<ChainValue>> {
        match self {
            ChainValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ChainMap> {
        match self {
            ChainValue::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut ChainMap> {
        match self {
            ChainValue::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Interpret the value as a chunk-selection slot.
    ///
    /// Policy literals stored as strings are lifted so callers see one shape.
    pub fn as_chunk_filter(&self) -> Option<ChunkFilter> {
        match self {
            ChainValue::Chunks(filter) => Some(filter.clone()),
            ChainValue::String(s) => s.parse::<ChunkPolicy>().ok().map(ChunkFilter::Policy),
            _ => None,
        }
    }

    /// Object fields merge recursively; anything else is replaced.
    pub fn deep_merge(&mut self, update: ChainValue) {
        match (self, update) {
            (ChainValue::Object(target), ChainValue::Object(update)) => {
                for (key, value) in update {
                    match target.get_mut(&key) {
                        Some(existing) => existing.deep_merge(value),
                        None => {
                            target.insert(key, value);
                        }
                    }
                }
            }
            (slot, update) => *slot = update,
        }
    }

    /// Plain JSON projection; decision slots become their description string.
    pub fn to_json(&self) -> Value {
        match self {
            ChainValue::Null => Value::Null,
            ChainValue::Bool(b) => Value::Bool(*b),
            ChainValue::Number(n) => Value::Number(n.clone()),
            ChainValue::String(s) => Value::String(s.clone()),
            ChainValue::Array(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            ChainValue::Object(map) => Value::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
            ChainValue::Chunks(filter) => Value::String(filter.describe()),
        }
    }
}

impl Serialize for ChainValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ChainValue::Null => serializer.serialize_unit(),
            ChainValue::Bool(b) => serializer.serialize_bool(*b),
            ChainValue::Number(n) => n.serialize(serializer),
            ChainValue::String(s) => serializer.serialize_str(s),
            ChainValue::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            ChainValue::Object(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (key, value) in fields {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            ChainValue::Chunks(filter) => serializer.serialize_str(&filter.describe()),
        }
    }
}

impl From<Value> for ChainValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ChainValue::Null,
            Value::Bool(b) => ChainValue::Bool(b),
            Value::Number(n) => ChainValue::Number(n),
            Value::String(s) => ChainValue::String(s),
            Value::Array(items) => ChainValue::Array(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => {
                ChainValue::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<bool> for ChainValue {
    fn from(value: bool) -> Self {
        ChainValue::Bool(value)
    }
}

impl From<&str> for ChainValue {
    fn from(value: &str) -> Self {
        ChainValue::String(value.to_string())
    }
}

impl From<String> for ChainValue {
    fn from(value: String) -> Self {
        ChainValue::String(value)
    }
}

impl From<i64> for ChainValue {
    fn from(value: i64) -> Self {
        ChainValue::Number(value.into())
    }
}

impl From<u64> for ChainValue {
    fn from(value: u64) -> Self {
        ChainValue::Number(value.into())
    }
}

impl From<ChunkFilter> for ChainValue {
    fn from(value: ChunkFilter) -> Self {
        ChainValue::Chunks(value)
    }
}

impl From<ChunkPolicy> for ChainValue {
    fn from(value: ChunkPolicy) -> Self {
        ChainValue::Chunks(ChunkFilter::Policy(value))
    }
}

impl From<ChainMap> for ChainValue {
    fn from(value: ChainMap) -> Self {
        ChainValue::Object(value)
    }
}

impl<T: Into<ChainValue>> From<Vec<T>> for ChainValue {
    fn from(value: Vec<T>) -> Self {
        ChainValue::Array(value.into_iter().map(Into::into).collect())
    }
}
