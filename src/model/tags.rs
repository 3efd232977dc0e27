// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracksmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Key/value properties attached to every primitive. Keys are unique.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagMap {
    entries: BTreeMap<SmolStr, SmolStr>,
}

/// Both sides carry `key` with different values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("tag '{key}' differs ('{ours}' vs '{theirs}')")]
pub struct TagConflict {
    pub key: SmolStr,
    pub ours: SmolStr,
    pub theirs: SmolStr,
}

impl TagMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(SmolStr::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn insert(
        &mut self,
        key: impl Into<SmolStr>,
        value: impl Into<SmolStr>,
    ) -> Option<SmolStr> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<SmolStr> {
        self.entries.remove(key)
    }

    /// Sets `key` to `value`, or removes it when `value` is `None`.
    pub fn set(&mut self, key: impl Into<SmolStr>, value: Option<SmolStr>) {
        let key = key.into();
        match value {
            Some(value) => {
                self.entries.insert(key, value);
            }
            None => {
                self.entries.remove(&key);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// First key present in both maps with different values.
    pub fn first_conflict(&self, other: &TagMap) -> Option<TagConflict> {
        other.entries.iter().find_map(|(key, theirs)| {
            let ours = self.entries.get(key)?;
            (ours != theirs).then(|| TagConflict {
                key: key.clone(),
                ours: ours.clone(),
                theirs: theirs.clone(),
            })
        })
    }

    /// Union of both maps; fails on the first key whose values disagree.
    pub fn merge_strict(&self, other: &TagMap) -> Result<TagMap, TagConflict> {
        if let Some(conflict) = self.first_conflict(other) {
            return Err(conflict);
        }
        Ok(self.merge_preferring_self(other))
    }

    /// Union of both maps; on a key collision `self` keeps its value.
    pub fn merge_preferring_self(&self, other: &TagMap) -> TagMap {
        let mut merged = self.clone();
        for (key, value) in &other.entries {
            merged
                .entries
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
        merged
    }
}

impl<K: Into<SmolStr>, V: Into<SmolStr>> FromIterator<(K, V)> for TagMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TagMap;

    fn tags(pairs: &[(&str, &str)]) -> TagMap {
        pairs.iter().copied().collect()
    }

    #[test]
    fn set_none_removes_key() {
        let mut map = tags(&[("highway", "track")]);
        map.set("highway", None);
        assert!(map.is_empty());
        map.set("name", Some("Ridge".into()));
        assert_eq!(map.get("name"), Some("Ridge"));
    }

    #[test]
    fn strict_merge_rejects_conflicting_values() {
        let ours = tags(&[("a", "1")]);
        let conflict = ours.merge_strict(&tags(&[("a", "2")])).unwrap_err();
        assert_eq!(conflict.key, "a");
        assert_eq!(conflict.ours, "1");
        assert_eq!(conflict.theirs, "2");
    }

    #[test]
    fn strict_merge_accepts_equal_and_disjoint_keys() {
        let ours = tags(&[("a", "1"), ("c", "3")]);
        let merged = ours.merge_strict(&tags(&[("a", "1"), ("b", "2")])).unwrap();
        assert_eq!(merged, tags(&[("a", "1"), ("b", "2"), ("c", "3")]));
    }

    #[test]
    fn preferring_merge_keeps_destination_value() {
        let ours = tags(&[("a", "1")]);
        let merged = ours.merge_preferring_self(&tags(&[("a", "2"), ("b", "2")]));
        assert_eq!(merged, tags(&[("a", "1"), ("b", "2")]));
    }
}
