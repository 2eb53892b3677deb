use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Explicit list of fan-out targets
pub const TARGETS: &str = "targets";

/// Address the caller used to reach this node
pub const AUTHORITY: &str = ":authority";

/// Loop-guard marker stamped on proxied sub-calls
pub const PROXY_FROM: &str = "proxyfrom";

/// Multi-valued call metadata
///
/// Keys are case-insensitive and stored lowercase, including keys decoded
/// from the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, Vec<String>>",
    into = "BTreeMap<String, Vec<String>>"
)]
pub struct Metadata {
    entries: BTreeMap<String, Vec<String>>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// First value for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_all(key).first().map(String::as_str)
    }

    /// All values for `key`, empty if absent
    pub fn get_all(&self, key: &str) -> &[String] {
        self.entries
            .get(&key.to_ascii_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(&key.to_ascii_lowercase())
    }

    /// Replace every value of `key`
    pub fn set<I, V>(&mut self, key: &str, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        self.entries.insert(key.to_ascii_lowercase(), values);
    }

    /// Add a value to `key`, keeping the existing ones
    pub fn append(&mut self, key: &str, value: impl Into<String>) {
        self.entries
            .entry(key.to_ascii_lowercase())
            .or_default()
            .push(value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    /// Builder-style [`Metadata::set`]
    pub fn with<I, V>(mut self, key: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.set(key, values);
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Metadata {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut md = Metadata::new();
        for (key, value) in iter {
            md.append(&key.into(), value);
        }
        md
    }
}

impl From<BTreeMap<String, Vec<String>>> for Metadata {
    fn from(entries: BTreeMap<String, Vec<String>>) -> Self {
        let mut md = Metadata::new();
        for (key, values) in entries {
            md.entries
                .entry(key.to_ascii_lowercase())
                .or_default()
                .extend(values);
        }
        md
    }
}

impl From<Metadata> for BTreeMap<String, Vec<String>> {
    fn from(md: Metadata) -> Self {
        md.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_case_insensitive() {
        let mut md = Metadata::new();
        md.append("ProxyFrom", "10.0.0.1");

        assert!(md.contains_key(PROXY_FROM));
        assert_eq!(md.get("PROXYFROM"), Some("10.0.0.1"));
    }

    #[test]
    fn set_replaces_and_append_accumulates() {
        let mut md: Metadata = [(TARGETS, "a"), (TARGETS, "b")].into_iter().collect();
        assert_eq!(md.get_all(TARGETS), ["a", "b"]);

        md.set(TARGETS, ["c"]);
        assert_eq!(md.get_all(TARGETS), ["c"]);
        assert!(md.get_all(AUTHORITY).is_empty());
    }

    #[test]
    fn decoded_keys_are_lowercased() {
        let wire: BTreeMap<String, Vec<String>> = [
            ("ProxyFrom".to_string(), vec!["10.0.0.1".to_string()]),
            ("proxyfrom".to_string(), vec!["10.0.0.2".to_string()]),
            ("Targets".to_string(), Vec::new()),
        ]
        .into_iter()
        .collect();

        let md = Metadata::from(wire);

        assert_eq!(md.get_all(PROXY_FROM), ["10.0.0.1", "10.0.0.2"]);
        assert!(md.contains_key(TARGETS));
        assert!(md.iter().all(|(key, _)| key == PROXY_FROM || key == TARGETS));
    }
}
