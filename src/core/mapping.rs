//! Resolved generator configuration.

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Sentinel for an enabled boolean feature.
pub const ENABLED: &str = "ON";

/// Sentinel for a disabled boolean feature.
pub const DISABLED: &str = "OFF";

/// Sentinel for a disabled enum-valued feature.
pub const DISABLED_CHOICE: &str = "Disabled";

/// Convert a "disable" flag into a boolean sentinel.
pub fn disable_option(disabled: bool) -> &'static str {
    if disabled {
        DISABLED
    } else {
        ENABLED
    }
}

/// Ordered mapping of generator variables to values.
///
/// Keys are unique. Setting an existing key replaces its value but keeps
/// the position of the first insertion, so the output order depends only
/// on the order in which keys were first introduced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigurationMapping {
    entries: Vec<(String, String)>,
}

impl ConfigurationMapping {
    /// Create an empty mapping.
    pub fn new() -> Self {
        ConfigurationMapping::default()
    }

    /// Set a variable, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();

        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Get a variable's value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Check whether a variable is set.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the mapping is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over variables in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterate over variable names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Render as `-DKEY=VALUE` arguments.
    pub fn to_defines(&self) -> Vec<String> {
        self.iter().map(|(k, v)| format!("-D{}={}", k, v)).collect()
    }
}

impl fmt::Display for ConfigurationMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in self.iter() {
            writeln!(f, "{}={}", key, value)?;
        }
        Ok(())
    }
}

impl Serialize for ConfigurationMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces_in_place() {
        let mut mapping = ConfigurationMapping::new();
        mapping.set("A", "1");
        mapping.set("B", "2");
        mapping.set("A", "3");

        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.get("A"), Some("3"));
        assert_eq!(mapping.keys().collect::<Vec<_>>(), vec!["A", "B"]);
    }

    #[test]
    fn test_disable_option() {
        assert_eq!(disable_option(true), "OFF");
        assert_eq!(disable_option(false), "ON");
    }

    #[test]
    fn test_json_preserves_order() {
        let mut mapping = ConfigurationMapping::new();
        mapping.set("Z_FIRST", "1");
        mapping.set("A_SECOND", "2");

        let json = serde_json::to_string(&mapping).unwrap();
        assert_eq!(json, r#"{"Z_FIRST":"1","A_SECOND":"2"}"#);
    }

    #[test]
    fn test_defines() {
        let mut mapping = ConfigurationMapping::new();
        mapping.set("DC_USE_PCH", "ON");
        assert_eq!(mapping.to_defines(), vec!["-DDC_USE_PCH=ON"]);
        assert_eq!(mapping.to_string(), "DC_USE_PCH=ON\n");
    }
}
