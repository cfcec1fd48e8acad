use std::{path::PathBuf, time::SystemTime};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One placeholder definition from an `@key.placeholders` object.
///
/// Stored as the raw JSON object so fields the tool does not know about
/// (`format`, `optionalParameters`, ...) survive a save untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Placeholder(pub Map<String, Value>);

impl Placeholder {
    pub fn ty(&self) -> Option<&str> {
        self.0.get("type").and_then(Value::as_str)
    }

    pub fn example(&self) -> Option<&str> {
        self.0.get("example").and_then(Value::as_str)
    }

    pub fn description(&self) -> Option<&str> {
        self.0.get("description").and_then(Value::as_str)
    }
}

/// A single key's value within a [`Catalog`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Entry {
    pub key: String,
    pub value: String,
    pub description: Option<String>,
    pub placeholders: Option<IndexMap<String, Placeholder>>,
    /// Remaining `@key` fields, written back verbatim.
    pub metadata: Option<Map<String, Value>>,
}

impl Entry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// True if the entry needs an `@key` sibling when serialized.
    ///
    /// An empty metadata bag still counts: it means the file carried an
    /// `"@key": {}` object that must be written back.
    pub fn has_metadata(&self) -> bool {
        self.description.is_some() || self.placeholders.is_some() || self.metadata.is_some()
    }

    /// Names of the `{name}` tokens inside the value, in order of appearance.
    ///
    /// For ICU forms like `{count, plural, ...}` only the leading argument
    /// name is returned.
    pub fn value_placeholder_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        let mut depth = 0usize;
        let mut start = 0;
        for (i, c) in self.value.char_indices() {
            match c {
                '{' => {
                    if depth == 0 {
                        start = i + 1;
                    }
                    depth += 1;
                }
                '}' if depth > 0 => {
                    depth -= 1;
                    if depth == 0 {
                        let inner = &self.value[start..i];
                        let name = inner.split(',').next().unwrap_or(inner).trim();
                        if !name.is_empty() && !names.contains(&name) {
                            names.push(name);
                        }
                    }
                }
                _ => {}
            }
        }
        names
    }
}

/// One locale's resource file, loaded into memory.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    pub locale: String,
    pub source_path: PathBuf,
    pub entries: IndexMap<String, Entry>,
    /// `@@`-prefixed keys (e.g. `@@locale`). Never translatable.
    pub header: IndexMap<String, Value>,
    pub last_modified_at: SystemTime,
    pub is_template: bool,
}

impl Catalog {
    pub fn new(locale: impl Into<String>, source_path: impl Into<PathBuf>) -> Self {
        Self {
            locale: locale.into(),
            source_path: source_path.into(),
            entries: IndexMap::new(),
            header: IndexMap::new(),
            last_modified_at: SystemTime::now(),
            is_template: false,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reorders entries lexicographically by key.
    pub fn sort_entries(&mut self) {
        self.entries.sort_keys();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_placeholder_names() {
        let entry = Entry::new("greet", "Hello {name}, you have {count} messages");
        assert_eq!(entry.value_placeholder_names(), vec!["name", "count"]);
    }

    #[test]
    fn test_value_placeholder_names_unclosed() {
        let entry = Entry::new("broken", "Hello {name");
        assert!(entry.value_placeholder_names().is_empty());
    }

    #[test]
    fn test_value_placeholder_names_icu_plural() {
        let entry = Entry::new("items", "{count, plural, =0{none} other{some}}");
        assert_eq!(entry.value_placeholder_names(), vec!["count"]);
    }

    #[test]
    fn test_has_metadata() {
        assert!(!Entry::new("a", "b").has_metadata());
        assert!(Entry::new("a", "b").with_description("d").has_metadata());
        let empty_bag = Entry {
            metadata: Some(Map::new()),
            ..Entry::new("a", "b")
        };
        assert!(empty_bag.has_metadata());
    }

    #[test]
    fn test_sort_entries() {
        let mut catalog = Catalog::new("en", "app_en.arb");
        for key in ["zebra", "apple", "mango"] {
            catalog.entries.insert(key.to_string(), Entry::new(key, key));
        }
        catalog.sort_entries();
        let keys: Vec<_> = catalog.entries.keys().cloned().collect();
        assert_eq!(keys, vec!["apple", "mango", "zebra"]);
    }
}
