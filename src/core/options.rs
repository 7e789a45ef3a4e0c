//! Parsed command options.
//!
//! An `OptionsRecord` is the flat, read-only view of everything the user
//! passed to a platform command. The CLI layer builds it once per invocation;
//! the resolver only ever reads from it.

use std::collections::BTreeMap;

/// A single option value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    /// Boolean switch (`--no-sound`)
    Flag(bool),
    /// Single string value (`--renderer opengl`, `--png /opt/png`)
    Text(String),
    /// Multi-valued option (`--codesign iPhone Developer`)
    List(Vec<String>),
}

/// Flat mapping from option name to value.
///
/// Names use the underscore form of the flag (`no_sound`, `prefix_path`).
/// Library path overrides are keyed by the lower-cased library name
/// (`png`, `jsoncpp`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionsRecord {
    values: BTreeMap<String, OptionValue>,
}

impl OptionsRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        OptionsRecord::default()
    }

    /// Set a value, returning the record for chaining.
    pub fn with(mut self, name: impl Into<String>, value: OptionValue) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a boolean flag.
    pub fn with_flag(self, name: impl Into<String>) -> Self {
        self.with(name, OptionValue::Flag(true))
    }

    /// Set a text value.
    pub fn with_text(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.with(name, OptionValue::Text(value.into()))
    }

    /// Set a list value.
    pub fn with_list<I, S>(self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with(
            name,
            OptionValue::List(values.into_iter().map(Into::into).collect()),
        )
    }

    /// Insert a value, replacing any previous one.
    pub fn insert(&mut self, name: impl Into<String>, value: OptionValue) {
        self.values.insert(name.into(), value);
    }

    /// Whether an option was supplied at all.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Get the raw value of an option.
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    /// Read a boolean flag; absent flags read as `false`.
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(OptionValue::Flag(true)))
    }

    /// Read a text value.
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(OptionValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Read a list value. A single text value reads as a one-element list.
    pub fn list(&self, name: &str) -> Option<Vec<&str>> {
        match self.values.get(name) {
            Some(OptionValue::List(items)) => Some(items.iter().map(String::as_str).collect()),
            Some(OptionValue::Text(s)) => Some(vec![s.as_str()]),
            _ => None,
        }
    }

    /// Iterate over all supplied options in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_flag_reads_false() {
        let options = OptionsRecord::new();
        assert!(!options.flag("no_sound"));
        assert!(!options.contains("no_sound"));
    }

    #[test]
    fn test_typed_accessors() {
        let options = OptionsRecord::new()
            .with_flag("no_tests")
            .with_text("renderer", "opengl")
            .with_list("codesign", ["iPhone", "Developer"]);

        assert!(options.flag("no_tests"));
        assert_eq!(options.text("renderer"), Some("opengl"));
        assert_eq!(options.list("codesign"), Some(vec!["iPhone", "Developer"]));

        // Mismatched kinds don't coerce into flags or text
        assert!(!options.flag("renderer"));
        assert_eq!(options.text("codesign"), None);
    }

    #[test]
    fn test_text_reads_as_single_item_list() {
        let options = OptionsRecord::new().with_text("codesign", "Developer");
        assert_eq!(options.list("codesign"), Some(vec!["Developer"]));
    }
}
