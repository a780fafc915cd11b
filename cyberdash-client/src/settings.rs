//! Shell settings.
//!
//! Everything process-wide the client remembers between runs goes through
//! [`Settings`]; nothing else reads or writes `csd:settings:v1`.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::store::{get_typed, KeyValueStore, StoreError, ANALYTICS_KEY, SETTINGS_KEY};

/// Last page size used by `/agents`.
pub const PAGE_SIZE: &str = "pageSize";
/// Last free-text agent query.
pub const LAST_QUERY: &str = "lastQuery";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    values: Map<String, Value>,
}

impl Settings {
    /// Load the persisted document. Unreadable data starts from empty.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match get_typed::<Map<String, Value>>(store, SETTINGS_KEY) {
            Ok(values) => Self {
                values: values.unwrap_or_default(),
            },
            Err(err) => {
                warn!(error = %err, "Failed to load settings");
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &dyn KeyValueStore) -> Result<(), StoreError> {
        store.set(SETTINGS_KEY, Value::Object(self.values.clone()))
    }

    /// Typed read; a value of the wrong shape reads as `None`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.values
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    pub fn set<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), StoreError> {
        self.values
            .insert(key.to_string(), serde_json::to_value(value)?);
        Ok(())
    }

    pub fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Whether the user opted in to analytics events. Defaults to off.
pub fn analytics_enabled(store: &dyn KeyValueStore) -> bool {
    match get_typed::<bool>(store, ANALYTICS_KEY) {
        Ok(flag) => flag.unwrap_or(false),
        Err(err) => {
            warn!(error = %err, "Failed to read analytics flag");
            false
        }
    }
}

pub fn set_analytics_enabled(store: &dyn KeyValueStore, enabled: bool) -> Result<(), StoreError> {
    store.set(ANALYTICS_KEY, Value::Bool(enabled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    #[test]
    fn test_roundtrip_through_store() {
        let store = MemoryStore::new();
        let mut settings = Settings::load(&store);
        assert!(settings.is_empty());

        settings.set(PAGE_SIZE, &12usize).unwrap();
        settings.set(LAST_QUERY, &"G1").unwrap();
        settings.save(&store).unwrap();

        let loaded = Settings::load(&store);
        assert_eq!(loaded.get::<usize>(PAGE_SIZE), Some(12));
        assert_eq!(loaded.get::<String>(LAST_QUERY).as_deref(), Some("G1"));
    }

    #[test]
    fn test_malformed_document_loads_empty() {
        let store = MemoryStore::new();
        store.set(SETTINGS_KEY, json!([1, 2, 3])).unwrap();
        assert!(Settings::load(&store).is_empty());
    }

    #[test]
    fn test_wrong_shape_reads_none() {
        let mut settings = Settings::default();
        settings.set(PAGE_SIZE, &"many").unwrap();
        assert_eq!(settings.get::<usize>(PAGE_SIZE), None);
        settings.remove(PAGE_SIZE);
        assert!(settings.is_empty());
    }

    #[test]
    fn test_analytics_flag_defaults_off() {
        let store = MemoryStore::new();
        assert!(!analytics_enabled(&store));
        set_analytics_enabled(&store, true).unwrap();
        assert!(analytics_enabled(&store));
    }
}
