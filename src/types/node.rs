//! Borrowed view over a JSON tree with a missing sentinel
//!
//! A [`Node`] is either a reference into a parsed document or `Missing`.
//! Navigation never fails; typed extraction does, and never coerces.

use serde_json::Value;

use crate::error::JsonError;

/// Kind of a JSON node, used in mismatch reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Object,
    Array,
    String,
    Integer,
    Float,
    Boolean,
    Null,
    Missing,
}

impl NodeKind {
    /// Kind of a concrete JSON value
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Object(_) => Self::Object,
            Value::Array(_) => Self::Array,
            Value::String(_) => Self::String,
            Value::Number(n) if n.is_f64() => Self::Float,
            Value::Number(_) => Self::Integer,
            Value::Bool(_) => Self::Boolean,
            Value::Null => Self::Null,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Array => "array",
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Null => "null",
            Self::Missing => "missing",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Node in a JSON document, or the missing sentinel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node<'a> {
    /// Path not found. Not the same as JSON `null`.
    Missing,
    Present(&'a Value),
}

impl<'a> Node<'a> {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Missing => NodeKind::Missing,
            Node::Present(value) => NodeKind::of(value),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Node::Missing)
    }

    /// True for JSON `null` only, never for `Missing`
    pub fn is_null(&self) -> bool {
        matches!(self, Node::Present(Value::Null))
    }

    /// Underlying value, if present
    pub fn value(&self) -> Option<&'a Value> {
        match *self {
            Node::Missing => None,
            Node::Present(value) => Some(value),
        }
    }

    /// Direct child of an object node
    pub fn get(&self, key: &str) -> Node<'a> {
        match *self {
            Node::Present(Value::Object(map)) => map.get(key).map_or(Node::Missing, Node::Present),
            _ => Node::Missing,
        }
    }

    /// Element of an array node
    pub fn at(&self, index: usize) -> Node<'a> {
        match *self {
            Node::Present(Value::Array(items)) => {
                items.get(index).map_or(Node::Missing, Node::Present)
            }
            _ => Node::Missing,
        }
    }

    /// Depth-first search for the first object entry named `key`.
    ///
    /// Each object entry is matched by name before its value is searched, and
    /// the search finishes that subtree before moving to the next entry.
    pub fn find_path(&self, key: &str) -> Node<'a> {
        match *self {
            Node::Present(value) => find_in(value, key),
            Node::Missing => Node::Missing,
        }
    }

    /// Array items, or object values in insertion order. Scalars yield nothing.
    pub fn elements(&self) -> impl Iterator<Item = Node<'a>> + 'a {
        let (items, values) = match *self {
            Node::Present(Value::Array(items)) => (Some(items.iter()), None),
            Node::Present(Value::Object(map)) => (None, Some(map.values())),
            _ => (None, None),
        };
        items
            .into_iter()
            .flatten()
            .chain(values.into_iter().flatten())
            .map(Node::Present)
    }

    /// Object entries in insertion order. Non-objects yield nothing.
    pub fn entries(&self) -> impl Iterator<Item = (&'a str, Node<'a>)> + 'a {
        let map = match *self {
            Node::Present(Value::Object(map)) => Some(map),
            _ => None,
        };
        map.into_iter()
            .flat_map(|map| map.iter())
            .map(|(k, v)| (k.as_str(), Node::Present(v)))
    }

    pub fn as_text(&self) -> Result<&'a str, JsonError> {
        match *self {
            Node::Present(Value::String(s)) => Ok(s.as_str()),
            _ => Err(self.mismatch(NodeKind::String)),
        }
    }

    /// Integer value. Floats and booleans are rejected.
    pub fn as_int(&self) -> Result<i64, JsonError> {
        match *self {
            Node::Present(Value::Number(n)) if !n.is_f64() => match n.as_i64() {
                Some(i) => Ok(i),
                None => Err(JsonError::IntegerOverflow(n.as_u64().unwrap_or(u64::MAX))),
            },
            _ => Err(self.mismatch(NodeKind::Integer)),
        }
    }

    pub fn as_bool(&self) -> Result<bool, JsonError> {
        match *self {
            Node::Present(Value::Bool(b)) => Ok(*b),
            _ => Err(self.mismatch(NodeKind::Boolean)),
        }
    }

    /// Any numeric node as f64
    pub fn as_f64(&self) -> Result<f64, JsonError> {
        match *self {
            Node::Present(Value::Number(n)) => {
                n.as_f64().ok_or_else(|| self.mismatch(NodeKind::Float))
            }
            _ => Err(self.mismatch(NodeKind::Float)),
        }
    }

    fn mismatch(&self, expected: NodeKind) -> JsonError {
        match self.kind() {
            NodeKind::Missing => JsonError::Missing { expected },
            found => JsonError::TypeMismatch { expected, found },
        }
    }
}

fn find_in<'a>(value: &'a Value, key: &str) -> Node<'a> {
    match value {
        Value::Object(map) => {
            for (name, child) in map {
                if name == key {
                    return Node::Present(child);
                }
                let found = find_in(child, key);
                if !found.is_missing() {
                    return found;
                }
            }
            Node::Missing
        }
        Value::Array(items) => items
            .iter()
            .map(|item| find_in(item, key))
            .find(|node| !node.is_missing())
            .unwrap_or(Node::Missing),
        _ => Node::Missing,
    }
}

/// Scalar accepted by the flat-mapping converter
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Int(i64),
    Bool(bool),
}

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Text(s) => Value::String(s),
            Scalar::Int(i) => Value::from(i),
            Scalar::Bool(b) => Value::Bool(b),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Text(s)
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Scalar::Int(i)
    }
}

impl From<i32> for Scalar {
    fn from(i: i32) -> Self {
        Scalar::Int(i64::from(i))
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

// =============================================================================
// TESTS
// =============================================================================
