use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attached key-value metadata of a record or node
///
/// Values are arbitrary JSON; the mirror only ever reads and writes its two
/// pointer keys through [`Metadata::pointer`] and [`Metadata::set_pointer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Metadata {
    data: BTreeMap<String, serde_json::Value>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.data.insert(key.into(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        self.data.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Read an id pointer stored under `key`
    ///
    /// Only a positive integer (JSON number or numeric string) counts as a
    /// pointer. Zero, empty strings, booleans and null are absent.
    pub fn pointer(&self, key: &str) -> Option<u64> {
        parse_pointer(self.data.get(key)?)
    }

    /// Store an id pointer under `key` as a JSON number
    pub fn set_pointer(&mut self, key: impl Into<String>, id: u64) {
        self.set(key, serde_json::Value::from(id));
    }
}

/// Interpret a stored metadata value as an id pointer
pub fn parse_pointer(value: &serde_json::Value) -> Option<u64> {
    let id = match value {
        serde_json::Value::Number(n) => n.as_u64()?,
        serde_json::Value::String(s) => s.trim().parse::<u64>().ok()?,
        _ => return None,
    };
    (id > 0).then_some(id)
}

impl From<BTreeMap<String, serde_json::Value>> for Metadata {
    fn from(data: BTreeMap<String, serde_json::Value>) -> Self {
        Self { data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pointer_accepts_numbers_and_numeric_strings() {
        let mut meta = Metadata::new();
        meta.set("a", json!(42));
        meta.set("b", json!("17"));
        assert_eq!(meta.pointer("a"), Some(42));
        assert_eq!(meta.pointer("b"), Some(17));
    }

    #[test]
    fn test_falsy_values_are_absent() {
        let mut meta = Metadata::new();
        meta.set("zero", json!(0));
        meta.set("empty", json!(""));
        meta.set("false", json!(false));
        meta.set("null", serde_json::Value::Null);
        meta.set("neg", json!(-3));
        meta.set("word", json!("abc"));

        for key in ["zero", "empty", "false", "null", "neg", "word", "missing"] {
            assert_eq!(meta.pointer(key), None, "{} should be absent", key);
        }
    }

    #[test]
    fn test_set_pointer_overwrites() {
        let mut meta = Metadata::new();
        meta.set_pointer("k", 1);
        meta.set_pointer("k", 2);
        assert_eq!(meta.pointer("k"), Some(2));
        assert_eq!(meta.get("k"), Some(&json!(2)));
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let mut meta = Metadata::new();
        meta.set_pointer("shadow__actor_term_id", 9);
        let text = serde_json::to_string(&meta).unwrap();
        assert_eq!(text, r#"{"shadow__actor_term_id":9}"#);
    }
}
