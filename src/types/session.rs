//! Session: ordered string key/value state carried by the session cookie
//!
//! Sessions are values. `with` and `without` return a new session and leave
//! the receiver untouched, so a handle taken before an update keeps its view.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::sync::Arc;

/// Ordered key/value session state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Entries in insertion order, keys unique
    entries: Arc<Vec<(String, String)>>,
}

impl Session {
    /// Create an empty session
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a session where `key` maps to `value`.
    ///
    /// An existing key keeps its position and loses its old value. A new key
    /// is appended after all others.
    pub fn with(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();

        let mut next = self.clone();
        let entries = Arc::make_mut(&mut next.entries);
        match entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => entries.push((key, value)),
        }
        next
    }

    /// Return a session without `key`
    pub fn without(&self, key: &str) -> Self {
        if !self.contains_key(key) {
            return self.clone();
        }
        let mut next = self.clone();
        Arc::make_mut(&mut next.entries).retain(|(k, _)| k != key);
        next
    }

    /// Look up a key. `None` means absent, which is distinct from `Some("")`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl<K, V> FromIterator<(K, V)> for Session
where
    K: Into<String>,
    V: Into<String>,
{
    /// Later duplicates win, exactly as repeated `with` calls would.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Session::new(), |session, (k, v)| session.with(k, v))
    }
}

impl Serialize for Session {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

// =============================================================================
// TESTS
// =============================================================================
