//! Replacement mappings and parsing of `export KEY=VALUE` script output.

use std::collections::BTreeMap;

use derive_more::{Deref, DerefMut, From};

/// The prefix identifying the wallet variables printed by `wallets.sh`.
pub const DEFAULT_ASSIGNMENT_PREFIX: &str = "export GS_";

/// A key → replacement value table.
///
/// Keys are kept sorted so that logs and reports are stable between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref, DerefMut, From)]
pub struct Assignments(BTreeMap<String, String>);

impl Assignments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key/value pair, replacing any previous value for the key.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Iterate over the keys without exposing their values.
    pub fn key_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Parse the assignments out of a command's standard output.
    ///
    /// Every line starting with `prefix` is split on its first `=`. Key and
    /// value are trimmed, and the key keeps the prefix (so `export GS_X=1`
    /// yields the key `export GS_X`). A later duplicate overwrites an earlier
    /// one. Prefixed lines without `=` and all other lines are ignored.
    pub fn extract(text: &str, prefix: &str) -> Self {
        let mut assignments = Self::new();

        for line in text.lines() {
            if !line.starts_with(prefix) {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                tracing::debug!(prefix, "Skipping prefixed line without an assignment");
                continue;
            };

            assignments
                .0
                .insert(key.trim().to_string(), value.trim().to_string());
        }

        assignments
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Assignments {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
