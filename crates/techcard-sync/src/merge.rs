//! Reconciliation merge
//!
//! Folds a freshly decoded [`Tree`] into the current [`EditState`]. The
//! decision for each key depends only on whether the key is already present,
//! so any key the user touched (an explicit blank included) survives, and
//! merging the same tree twice changes nothing the second time.

use techcard_model::value::{value_text, REFERENCE_NAME};
use techcard_model::{EditState, RawValue, Tree};

/// Merge a tree into a copy of `prior`
#[must_use]
pub fn merge(prior: &EditState, tree: &Tree) -> EditState {
    let mut next = prior.clone();
    merge_in_place(&mut next, tree);
    next
}

/// Merge a tree into `edits`, returning how many keys were seeded
pub fn merge_in_place(edits: &mut EditState, tree: &Tree) -> usize {
    tree.flat_params()
        .filter(|param| edits.seed(param.key(), seed_value(&param.value)))
        .count()
}

/// Initial edit text for a value the user has not touched
///
/// Scalars seed their text. Any object with a non-null `name` seeds that
/// name, whether or not it also carries an `id`. Choice lists, other
/// dictionaries and empty values seed an empty string.
#[must_use]
pub fn seed_value(value: &RawValue) -> String {
    match value {
        RawValue::Scalar(scalar) => scalar.to_text(),
        RawValue::Reference(map) | RawValue::ChoiceDict(map) => match map.get(REFERENCE_NAME) {
            Some(name) if !name.is_null() => value_text(name),
            _ => String::new(),
        },
        RawValue::Absent | RawValue::Null | RawValue::ChoiceList(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::decode;
    use serde_json::json;
    use techcard_model::CompositeKey;

    fn key(text: &str) -> CompositeKey {
        text.parse().unwrap()
    }

    #[test]
    fn explicit_blank_wins() {
        let mut prior = EditState::new();
        prior.set(key("1.0"), "");
        let tree = decode(&json!({"params": {"1": {"name": "B", "params": {"0": {"name": "P", "val": "X"}}}}}));
        let next = merge(&prior, &tree);
        assert_eq!(next.get(&key("1.0")), Some(""));
    }

    #[test]
    fn seeds_by_value_shape() {
        let tree = decode(&json!({"params": {"1": {"name": "B", "params": {
            "0": {"name": "scalar", "val": 12.5},
            "1": {"name": "ref", "val": {"id": 4, "name": "Pipe"}},
            "2": {"name": "list", "val": ["a", "b"]},
            "3": {"name": "dict", "val": {"1": "A"}},
            "4": {"name": "null", "val": null},
            "5": {"name": "flag", "val": false},
            "6": {"name": "bare ref", "val": {"id": 9}},
            "7": {"name": "named", "val": {"name": "Plate"}}
        }}}}));
        let mut edits = EditState::new();
        assert_eq!(merge_in_place(&mut edits, &tree), 8);
        assert_eq!(edits.get(&key("1.0")), Some("12.5"));
        assert_eq!(edits.get(&key("1.1")), Some("Pipe"));
        assert_eq!(edits.get(&key("1.2")), Some(""));
        assert_eq!(edits.get(&key("1.3")), Some(""));
        assert_eq!(edits.get(&key("1.4")), Some(""));
        assert_eq!(edits.get(&key("1.5")), Some("false"));
        assert_eq!(edits.get(&key("1.6")), Some(""));
        assert_eq!(edits.get(&key("1.7")), Some("Plate"));
    }

    #[test]
    fn second_merge_seeds_nothing() {
        let tree = decode(&json!({"params": {"1": {"params": {"0": {"val": 1}}}}}));
        let mut edits = EditState::new();
        assert_eq!(merge_in_place(&mut edits, &tree), 1);
        assert_eq!(merge_in_place(&mut edits, &tree), 0);
    }

    #[test]
    fn keys_outside_the_tree_are_kept() {
        let mut prior = EditState::new();
        prior.set(key("9.9"), "kept");
        let next = merge(&prior, &Tree::empty());
        assert_eq!(next, prior);
    }
}
