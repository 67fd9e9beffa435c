//! Edit state
//!
//! The client's record of what the user typed, keyed by composite key. An
//! explicit empty string is a real entry and differs from "never touched".

use crate::key::{BlockId, CompositeKey, KeyError, ParamId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Mapping from composite key to edited text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EditState(IndexMap<CompositeKey, String>);

impl EditState {
    /// Create empty edit state
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Edited text for key
    #[inline]
    #[must_use]
    pub fn get(&self, key: &CompositeKey) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Check if key has ever been set (including to `""`)
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &CompositeKey) -> bool {
        self.0.contains_key(key)
    }

    /// Non-empty edit for key
    ///
    /// Whitespace counts as content; only the exact empty string is blank.
    #[inline]
    #[must_use]
    pub fn non_empty(&self, key: &CompositeKey) -> Option<&str> {
        self.get(key).filter(|text| !text.is_empty())
    }

    /// Set edited text, returning the previous value
    #[inline]
    pub fn set(&mut self, key: CompositeKey, value: impl Into<String>) -> Option<String> {
        self.0.insert(key, value.into())
    }

    /// Insert only when the key is not yet present
    ///
    /// Returns `true` if the entry was inserted.
    #[inline]
    pub fn seed(&mut self, key: CompositeKey, value: impl Into<String>) -> bool {
        match self.0.entry(key) {
            indexmap::map::Entry::Occupied(_) => false,
            indexmap::map::Entry::Vacant(slot) => {
                slot.insert(value.into());
                true
            }
        }
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if no entries exist
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Drop every entry
    #[inline]
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Iterate entries in insertion order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&CompositeKey, &str)> {
        self.0.iter().map(|(key, value)| (key, value.as_str()))
    }

    /// Iterate entries with their keys split into block and param halves
    pub fn decoded(&self) -> impl Iterator<Item = Result<(BlockId, ParamId, &str), KeyError>> {
        self.0.iter().map(|(key, value)| {
            let (block, param) = key.decode()?;
            Ok((block, param, value.as_str()))
        })
    }
}

impl FromIterator<(CompositeKey, String)> for EditState {
    fn from_iter<I: IntoIterator<Item = (CompositeKey, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for EditState {
    type Item = (CompositeKey, String);
    type IntoIter = indexmap::map::IntoIter<CompositeKey, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl Extend<(CompositeKey, String)> for EditState {
    fn extend<I: IntoIterator<Item = (CompositeKey, String)>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}
