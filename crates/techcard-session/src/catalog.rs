//! Catalog extraction
//!
//! Object types and elements (objects of control) arrive as id → name maps
//! embedded in ordinary responses. These helpers turn them into ordered
//! picker entries.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use techcard_model::order::order_dictionary_entries;
use techcard_model::value::{value_text, REFERENCE_ID};
use techcard_model::{BlockId, ParamId, RawValue, Tree};
use techcard_sync::transform::{PARAMS_KEY, TYPE_KEY};

/// One selectable catalog item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Identifier sent back to the server
    pub id: String,
    /// Display name
    pub name: String,
}

impl CatalogEntry {
    /// Create entry
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Location of the element choice inside an elements response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementLocator {
    /// Block holding the element choice
    pub block_id: BlockId,
    /// Parameter id of the element choice
    pub param_id: ParamId,
    /// Parameter name that also identifies the element choice
    pub param_name: String,
}

impl Default for ElementLocator {
    fn default() -> Self {
        Self {
            block_id: BlockId::from("1"),
            param_id: ParamId::from("0"),
            param_name: "Объект контроля".to_string(),
        }
    }
}

/// Decode an object-types response
///
/// Accepts `{type: {id: name, …}}` or a bare `{id: name, …}` map. The
/// `params` and `type` service keys are never entries.
#[must_use]
pub fn decode_object_types(wire: &Value) -> Vec<CatalogEntry> {
    let types = match wire.get(TYPE_KEY) {
        Some(inner) if is_truthy(inner) => inner,
        _ => wire,
    };
    let Some(map) = types.as_object() else {
        return Vec::new();
    };
    entries(map)
        .into_iter()
        .filter(|entry| entry.id != PARAMS_KEY && entry.id != TYPE_KEY)
        .collect()
}

/// Extract the element list from a decoded elements response
///
/// The list is the choice dictionary stored at the located parameter, or a
/// single entry when that parameter holds a selected `{id, name}` object.
#[must_use]
pub fn extract_elements(tree: &Tree, locator: &ElementLocator) -> Vec<CatalogEntry> {
    let Some(block) = tree.block(&locator.block_id) else {
        return Vec::new();
    };
    let Some(param) = block
        .params
        .iter()
        .find(|param| param.name == locator.param_name || param.id == locator.param_id)
    else {
        return Vec::new();
    };

    match &param.value {
        RawValue::Reference(map) => map
            .get(REFERENCE_ID)
            .zip(param.value.reference_label())
            .map(|(id, label)| vec![CatalogEntry::new(value_text(id), label)])
            .unwrap_or_default(),
        RawValue::ChoiceDict(map) => entries(map),
        _ => Vec::new(),
    }
}

fn entries(map: &Map<String, Value>) -> Vec<CatalogEntry> {
    let mut pairs: Vec<(String, &Value)> = map.iter().map(|(id, name)| (id.clone(), name)).collect();
    order_dictionary_entries(&mut pairs);
    pairs
        .into_iter()
        .map(|(id, name)| CatalogEntry::new(id, value_text(name)))
        .collect()
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use techcard_sync::decode;

    #[test]
    fn object_types_from_type_field() {
        let types = decode_object_types(&json!({"type": {"1": "Труба", "0": "Пластина"}, "params": {}}));
        assert_eq!(
            types,
            vec![CatalogEntry::new("0", "Пластина"), CatalogEntry::new("1", "Труба")]
        );
    }

    #[test]
    fn object_types_from_bare_map() {
        let types = decode_object_types(&json!({"0": "Plate", "params": {}, "type": null}));
        assert_eq!(types, vec![CatalogEntry::new("0", "Plate")]);
    }

    #[test]
    fn object_types_from_non_object() {
        assert!(decode_object_types(&json!("nope")).is_empty());
        assert!(decode_object_types(&json!({"type": "pipe"})).is_empty());
    }

    #[test]
    fn elements_from_choice_dictionary() {
        let tree = decode(&json!({"params": {"1": {"name": "Object", "params": {
            "0": {"name": "Объект контроля", "val": {"2": "Pipe B", "1": "Pipe A"}}
        }}}}));
        let elements = extract_elements(&tree, &ElementLocator::default());
        assert_eq!(
            elements,
            vec![CatalogEntry::new("1", "Pipe A"), CatalogEntry::new("2", "Pipe B")]
        );
    }

    #[test]
    fn elements_from_selected_reference() {
        let tree = decode(&json!({"params": {"1": {"params": {
            "0": {"name": "Object", "val": {"id": 7, "name": "Pipe"}}
        }}}}));
        let elements = extract_elements(&tree, &ElementLocator::default());
        assert_eq!(elements, vec![CatalogEntry::new("7", "Pipe")]);
    }

    #[test]
    fn elements_matched_by_name() {
        let tree = decode(&json!({"params": {"1": {"params": {
            "3": {"name": "Объект контроля", "val": {"5": "E"}}
        }}}}));
        assert_eq!(
            extract_elements(&tree, &ElementLocator::default()),
            vec![CatalogEntry::new("5", "E")]
        );
    }

    #[test]
    fn elements_missing_or_scalar() {
        let locator = ElementLocator::default();
        assert!(extract_elements(&Tree::empty(), &locator).is_empty());
        let tree = decode(&json!({"params": {"1": {"params": {"0": {"val": "x"}}}}}));
        assert!(extract_elements(&tree, &locator).is_empty());
    }
}
