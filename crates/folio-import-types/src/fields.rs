//! Pending field mutations

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One flat input row: column name to value
pub type Row = Map<String, Value>;

/// Ordered field mutations plus the nested metadata mapping
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldSet {
    fields: Map<String, Value>,
    metadata: Map<String, Value>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `fields` in, last write wins
    pub fn set(&mut self, fields: Map<String, Value>) {
        for (key, value) in fields {
            self.fields.insert(key, value);
        }
    }

    pub fn set_field(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Merge entries into the metadata mapping, last write wins
    pub fn set_metadata(&mut self, metadata: Map<String, Value>) {
        for (key, value) in metadata {
            self.metadata.insert(key, value);
        }
    }

    /// Merge another set into this one
    pub fn merge(&mut self, other: FieldSet) {
        self.set(other.fields);
        self.set_metadata(other.metadata);
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.shift_remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Whether `key` holds a non-blank value
    pub fn is_filled(&self, key: &str) -> bool {
        self.fields.get(key).is_some_and(|value| !is_blank(value))
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    /// No fields and no metadata pending
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.metadata.is_empty()
    }
}

/// Blank means null, whitespace-only text, `false`, or an empty collection
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Number(_) => false,
    }
}

/// Textual form used when comparing against stored string values
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_merges_last_write_wins() {
        let mut fields = FieldSet::new();
        fields.set_field("title", "First");
        fields.set_field("body", "Text");

        let mut update = Map::new();
        update.insert("title".to_string(), json!("Second"));
        fields.set(update);

        assert_eq!(fields.get("title"), Some(&json!("Second")));
        assert_eq!(fields.get("body"), Some(&json!("Text")));
        let keys: Vec<_> = fields.fields().keys().collect();
        assert_eq!(keys, ["title", "body"]);
    }

    #[test]
    fn test_metadata_is_separate() {
        let mut fields = FieldSet::new();
        let mut meta = Map::new();
        meta.insert("color".to_string(), json!("blue"));
        fields.set_metadata(meta);

        assert!(fields.fields().is_empty());
        assert!(!fields.is_empty());
        assert_eq!(fields.metadata().get("color"), Some(&json!("blue")));
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(&json!(null)));
        assert!(is_blank(&json!("  ")));
        assert!(is_blank(&json!(false)));
        assert!(is_blank(&json!([])));
        assert!(!is_blank(&json!(0)));
        assert!(!is_blank(&json!("x")));
    }

    #[test]
    fn test_is_filled() {
        let mut fields = FieldSet::new();
        fields.set_field("title", " ");
        fields.set_field("author", 3);

        assert!(!fields.is_filled("title"));
        assert!(fields.is_filled("author"));
        assert!(!fields.is_filled("body"));
    }

    #[test]
    fn test_value_text() {
        assert_eq!(value_text(&json!("a")), "a");
        assert_eq!(value_text(&json!(12)), "12");
        assert_eq!(value_text(&json!(true)), "1");
        assert_eq!(value_text(&json!(null)), "");
        assert_eq!(value_text(&json!(["a", "b"])), "[\"a\",\"b\"]");
    }
}
