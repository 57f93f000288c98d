//! JSON document adapter
//!
//! Owns a parsed JSON tree and hands out [`Node`] views into it. Object key
//! order is insertion order (serde_json `preserve_order`).

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::JsonError;
use crate::types::{Node, Scalar};

/// Immutable JSON document
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Value,
}

impl Document {
    /// Parse JSON text
    pub fn parse(text: &str) -> Result<Self, JsonError> {
        let root = serde_json::from_str(text)?;
        Ok(Self { root })
    }

    /// Parse a JSON body
    pub fn from_slice(bytes: &[u8]) -> Result<Self, JsonError> {
        let root = serde_json::from_slice(bytes)?;
        Ok(Self { root })
    }

    /// Convert any serializable value
    pub fn from_serializable<T: Serialize + ?Sized>(value: &T) -> Result<Self, JsonError> {
        let root = serde_json::to_value(value).map_err(JsonError::Encode)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> Node<'_> {
        Node::Present(&self.root)
    }

    /// Direct child of the root object
    pub fn get(&self, key: &str) -> Node<'_> {
        self.root().get(key)
    }

    /// Depth-first lookup from the root
    pub fn find_path(&self, key: &str) -> Node<'_> {
        self.root().find_path(key)
    }

    /// Compact JSON text
    pub fn to_text(&self) -> String {
        self.root.to_string()
    }

    pub fn as_value(&self) -> &Value {
        &self.root
    }

    pub fn into_value(self) -> Value {
        self.root
    }
}

impl From<Value> for Document {
    fn from(root: Value) -> Self {
        Self { root }
    }
}

impl std::fmt::Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.root)
    }
}

/// Build an object document from a flat mapping of scalars, keeping order
pub fn to_json<I, K, V>(entries: I) -> Document
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Scalar>,
{
    let map: Map<String, Value> = entries
        .into_iter()
        .map(|(k, v)| (k.into(), Value::from(v.into())))
        .collect();
    Document::from(Value::Object(map))
}

// =============================================================================
// TESTS
// =============================================================================
