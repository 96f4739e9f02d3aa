//! Document handling
//!
//! A document is a flat mapping from string keys to JSON values, persisted
//! as one unit. Values are dynamically typed (`serde_json::Value`); typed
//! access goes through serde, and a value of the wrong shape reads as absent
//! rather than failing.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

/// Errors that can occur while parsing a document
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Document root must be a JSON object, found {0}")]
    NotAnObject(&'static str),
}

/// A named unit of storage: string keys mapped to JSON values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    entries: Map<String, Value>,
}

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a document from its JSON text
    pub fn from_json(text: &str) -> Result<Self, DocumentError> {
        match serde_json::from_str::<Value>(text)? {
            Value::Object(entries) => Ok(Self { entries }),
            other => Err(DocumentError::NotAnObject(type_name(&other))),
        }
    }

    /// Serialize the document to JSON text
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.entries)
    }

    /// Get the raw JSON value stored under `key`
    pub fn get_raw(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Get the value under `key` converted to `T`
    ///
    /// Returns `None` when the key is missing or when the stored value does
    /// not have the shape `T` expects. The mismatch is logged.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.entries.get(key)?;
        match serde_json::from_value(value.clone()) {
            Ok(typed) => Some(typed),
            Err(e) => {
                warn!(
                    "Type mismatch for key '{}' (stored {}): {}",
                    key,
                    type_name(value),
                    e
                );
                None
            }
        }
    }

    /// Insert or overwrite `key`, returning the previous value
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.entries.insert(key.into(), value)
    }

    /// Insert `key` only if it is not already present
    ///
    /// Returns `true` if the value was inserted.
    pub fn insert_if_absent(&mut self, key: &str, value: Value) -> bool {
        if self.entries.contains_key(key) {
            return false;
        }
        self.entries.insert(key.to_string(), value);
        true
    }

    /// Remove `key`, returning its value if it was present
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterate over the document's keys
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl From<Map<String, Value>> for Document {
    fn from(entries: Map<String, Value>) -> Self {
        Self { entries }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_object() {
        let doc = Document::from_json(r#"{"name":"Ada","age":36}"#).unwrap();
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.get::<String>("name"), Some("Ada".to_string()));
        assert_eq!(doc.get::<u32>("age"), Some(36));
    }

    #[test]
    fn test_parse_rejects_non_object() {
        assert!(matches!(
            Document::from_json("[1, 2, 3]"),
            Err(DocumentError::NotAnObject("array"))
        ));
        assert!(matches!(
            Document::from_json("not json"),
            Err(DocumentError::Json(_))
        ));
    }

    #[test]
    fn test_type_mismatch_reads_as_absent() {
        let mut doc = Document::new();
        doc.insert("count", json!(3));

        assert_eq!(doc.get::<i64>("count"), Some(3));
        assert_eq!(doc.get::<String>("count"), None);
        assert_eq!(doc.get::<bool>("missing"), None);
    }

    #[test]
    fn test_nested_values() {
        let mut doc = Document::new();
        doc.insert("tags", json!(["a", "b"]));
        doc.insert("profile", json!({"theme": "dark"}));

        assert_eq!(
            doc.get::<Vec<String>>("tags"),
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(doc.get_raw("profile"), Some(&json!({"theme": "dark"})));
    }

    #[test]
    fn test_insert_if_absent() {
        let mut doc = Document::new();
        assert!(doc.insert_if_absent("k", json!("first")));
        assert!(!doc.insert_if_absent("k", json!("second")));
        assert_eq!(doc.get::<String>("k"), Some("first".to_string()));
    }

    #[test]
    fn test_json_round_trip() {
        let mut doc = Document::new();
        doc.insert("enabled", json!(true));
        doc.insert("ratio", json!(0.5));

        let text = doc.to_json().unwrap();
        let parsed = Document::from_json(&text).unwrap();
        assert_eq!(parsed, doc);
    }
}
