//! Immutable selection of asset-type keys.
//!
//! Every operation returns a new selection and leaves the receiver intact.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetSelection(BTreeSet<String>);

impl AssetSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the key if absent, remove it if present.
    #[must_use]
    pub fn toggle(&self, key: &str) -> Self {
        let mut keys = self.0.clone();
        if !keys.remove(key) {
            keys.insert(key.to_string());
        }
        Self(keys)
    }

    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self(self.0.union(&other.0).cloned().collect())
    }

    #[must_use]
    pub fn subtract(&self, other: &Self) -> Self {
        Self(self.0.difference(&other.0).cloned().collect())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for AssetSelection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}
