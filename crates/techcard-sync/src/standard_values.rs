//! Standard-values cache using moka
//!
//! Remembers, per composite key, the choice strings the server offered. A
//! later response for the same key may carry only the selected value, so the
//! cached list keeps the choice affordance alive. Each form session owns its
//! own cache instance.

use moka::sync::Cache;
use serde_json::Value;
use std::sync::Arc;
use techcard_model::order::order_dictionary_entries;
use techcard_model::value::{value_text, REFERENCE_NAME};
use techcard_model::{CompositeKey, Parameter, RawValue, Tree};

/// Per-key cache of choice display strings
#[derive(Debug, Clone)]
pub struct StandardValuesCache {
    inner: Cache<CompositeKey, Arc<Vec<String>>>,
}

impl StandardValuesCache {
    /// Create unbounded cache
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Cache::builder().build(),
        }
    }

    /// Create cache holding at most `max_capacity` keys
    #[inline]
    #[must_use]
    pub fn with_capacity(max_capacity: u64) -> Self {
        Self {
            inner: Cache::new(max_capacity),
        }
    }

    /// Store choices for key, replacing any previous entry
    #[inline]
    pub fn record(&self, key: CompositeKey, choices: Vec<String>) {
        self.inner.insert(key, Arc::new(choices));
    }

    /// Cached choices for key
    #[inline]
    #[must_use]
    pub fn get(&self, key: &CompositeKey) -> Option<Arc<Vec<String>>> {
        self.inner.get(key)
    }

    /// Record choices for every parameter in the tree that offers them
    ///
    /// Returns the number of keys written.
    pub fn cache_tree(&self, tree: &Tree) -> usize {
        let mut written = 0;
        for param in tree.flat_params() {
            if let Some(choices) = extract_choices(&param.value) {
                self.record(param.key(), choices);
                written += 1;
            }
        }
        written
    }

    /// Choices to display for a parameter
    ///
    /// Prefers a non-empty cached entry, then the parameter's own value, then
    /// an empty list.
    #[must_use]
    pub fn lookup(&self, param: &Parameter) -> Vec<String> {
        if let Some(cached) = self.get(&param.key()).filter(|choices| !choices.is_empty()) {
            return cached.as_ref().clone();
        }
        extract_choices(&param.value).unwrap_or_default()
    }

    /// Drop every entry
    #[inline]
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
        self.inner.run_pending_tasks();
    }

    /// Number of cached keys
    #[inline]
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.inner.run_pending_tasks();
        self.inner.entry_count()
    }
}

impl Default for StandardValuesCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Display strings offered by a choice value
///
/// Non-empty lists yield one string per item (reference items by `name`).
/// Dictionaries yield their labels in key order. Everything else, including
/// a selected `{id, name}` reference, yields `None`.
#[must_use]
pub fn extract_choices(value: &RawValue) -> Option<Vec<String>> {
    match value {
        RawValue::ChoiceList(items) if !items.is_empty() => {
            Some(items.iter().map(item_text).collect())
        }
        RawValue::ChoiceDict(entries) => {
            let mut pairs: Vec<(String, &Value)> = entries
                .iter()
                .map(|(id, label)| (id.clone(), label))
                .collect();
            order_dictionary_entries(&mut pairs);
            Some(pairs.into_iter().map(|(_, label)| value_text(label)).collect())
        }
        _ => None,
    }
}

fn item_text(item: &Value) -> String {
    match item.as_object().and_then(|map| map.get(REFERENCE_NAME)) {
        Some(name) if !name.is_null() => value_text(name),
        _ => value_text(item),
    }
}

/// Record the choices of every parameter in `tree`
pub fn cache_standard_values(cache: &StandardValuesCache, tree: &Tree) -> usize {
    cache.cache_tree(tree)
}

/// Choices to display for `param`
#[must_use]
pub fn lookup_standard_values(cache: &StandardValuesCache, param: &Parameter) -> Vec<String> {
    cache.lookup(param)
}
