//! Utility types for inspection.

use std::collections::HashMap;

/// A set that performs case-insensitive lookups but preserves original names.
///
/// Used for matching plan field names against dataset columns.
#[derive(Debug, Clone, Default)]
pub struct CaseInsensitiveSet {
    /// Maps lowercase name -> original name
    inner: HashMap<String, String>,
}

impl CaseInsensitiveSet {
    pub fn new() -> Self {
        Self {
            inner: HashMap::new(),
        }
    }

    /// Create a set from an iterator of strings. The first spelling of a name wins.
    pub fn from_names<I, S>(iter: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for name in iter {
            set.insert(name);
        }
        set
    }

    pub fn insert(&mut self, value: impl AsRef<str>) {
        let s = value.as_ref();
        self.inner
            .entry(s.to_lowercase())
            .or_insert_with(|| s.to_string());
    }

    pub fn contains(&self, value: impl AsRef<str>) -> bool {
        self.inner.contains_key(&value.as_ref().to_lowercase())
    }

    /// Original spelling of a name (case-insensitive lookup).
    pub fn get(&self, value: impl AsRef<str>) -> Option<&str> {
        self.inner
            .get(&value.as_ref().to_lowercase())
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
