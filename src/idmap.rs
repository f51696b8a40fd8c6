//! Two-way lookup between canonical IDs and a display value.

use std::collections::HashMap;

/// A bidirectional `id <-> value` map.
///
/// Both directions are updated together, so `get_id(get_value(id)) == id`
/// holds for every id that is present. Re-pointing an id or a value drops
/// whatever it was previously paired with.
#[derive(Debug, Clone, Default)]
pub struct IdMap {
    values: HashMap<String, String>,
    ids: HashMap<String, String>,
}

impl IdMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty map with room for `capacity` pairs.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: HashMap::with_capacity(capacity),
            ids: HashMap::with_capacity(capacity),
        }
    }

    /// Pair `id` with `value`.
    pub fn set(&mut self, id: impl Into<String>, value: impl Into<String>) {
        let id = id.into();
        let value = value.into();

        if let Some(old_value) = self.values.remove(&id) {
            self.ids.remove(&old_value);
        }
        if let Some(old_id) = self.ids.remove(&value) {
            self.values.remove(&old_id);
        }

        self.values.insert(id.clone(), value.clone());
        self.ids.insert(value, id);
    }

    /// The value paired with `id`.
    pub fn get_value(&self, id: &str) -> Option<&str> {
        self.values.get(id).map(String::as_str)
    }

    /// The id paired with `value`.
    pub fn get_id(&self, value: &str) -> Option<&str> {
        self.ids.get(value).map(String::as_str)
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
