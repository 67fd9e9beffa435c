//! Tree ⇄ wire transformer
//!
//! Wire shape: `{type, params: {blockId: {name, params: {paramId: {name, val}}}}}`.
//!
//! [`decode`] never fails. Structural problems degrade: a missing or
//! non-object `params` yields the empty tree, and malformed block or
//! parameter entries are skipped. [`encode`] is total.

use crate::infer::{infer_type, ValueType};
use serde::Serialize;
use serde_json::{Map, Value};
use techcard_model::key::KEY_SEPARATOR;
use techcard_model::value::value_text;
use techcard_model::{
    order_blocks, order_params, Block, BlockId, CompositeKey, EditState, ParamId, Parameter,
    RawValue, Tree,
};

/// Wire key of the object type
pub const TYPE_KEY: &str = "type";
/// Wire key of the block and parameter maps
pub const PARAMS_KEY: &str = "params";
/// Wire key of display names
pub const NAME_KEY: &str = "name";
/// Wire key of parameter values
pub const VALUE_KEY: &str = "val";

/// Labels used when the server omits a name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Prefix for synthesized block names
    pub block_label: String,
    /// Prefix for synthesized parameter names
    pub param_label: String,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            block_label: "Block".to_string(),
            param_label: "Parameter".to_string(),
        }
    }
}

impl DecodeOptions {
    /// Set block label
    #[inline]
    #[must_use]
    pub fn with_block_label(mut self, label: impl Into<String>) -> Self {
        self.block_label = label.into();
        self
    }

    /// Set parameter label
    #[inline]
    #[must_use]
    pub fn with_param_label(mut self, label: impl Into<String>) -> Self {
        self.param_label = label.into();
        self
    }
}

/// Decode a wire response with default labels
#[must_use]
pub fn decode(wire: &Value) -> Tree {
    decode_with(wire, &DecodeOptions::default())
}

/// Decode a wire response
#[must_use]
pub fn decode_with(wire: &Value, options: &DecodeOptions) -> Tree {
    let Some(root) = wire.as_object() else {
        tracing::debug!("wire response is not an object; decoding to empty tree");
        return Tree::empty();
    };
    let Some(blocks) = root.get(PARAMS_KEY).and_then(Value::as_object) else {
        return Tree::empty();
    };

    let mut decoded: Vec<Block> = blocks
        .iter()
        .filter_map(|(id, entry)| decode_block(id, entry, options))
        .collect();
    order_blocks(&mut decoded);

    Tree {
        object_type: root.get(TYPE_KEY).and_then(object_type),
        blocks: decoded,
    }
}

fn decode_block(id: &str, entry: &Value, options: &DecodeOptions) -> Option<Block> {
    if id.is_empty() || id.contains(KEY_SEPARATOR) {
        tracing::debug!(block = id, "skipping block with unaddressable id");
        return None;
    }
    let Some(fields) = entry.as_object() else {
        tracing::debug!(block = id, "skipping malformed block entry");
        return None;
    };

    let block_id = BlockId::from(id);
    let name = display_name(fields, &options.block_label, id);
    let mut block = Block::new(block_id, name);

    if let Some(params) = fields.get(PARAMS_KEY).and_then(Value::as_object) {
        block.params = params
            .iter()
            .filter_map(|(param_id, param)| decode_param(&block, param_id, param, options))
            .collect();
        order_params(&mut block.params);
    }
    Some(block)
}

fn decode_param(
    block: &Block,
    id: &str,
    entry: &Value,
    options: &DecodeOptions,
) -> Option<Parameter> {
    if id.is_empty() {
        tracing::debug!(block = %block.id, "skipping parameter with empty id");
        return None;
    }
    let Some(fields) = entry.as_object() else {
        tracing::debug!(block = %block.id, param = id, "skipping malformed parameter entry");
        return None;
    };
    Some(Parameter {
        id: ParamId::from(id),
        name: display_name(fields, &options.param_label, id),
        value: RawValue::from_wire(fields.get(VALUE_KEY)),
        block_id: block.id.clone(),
        block_name: block.name.clone(),
    })
}

fn display_name(fields: &Map<String, Value>, label: &str, id: &str) -> String {
    match fields.get(NAME_KEY) {
        Some(Value::String(name)) if !name.is_empty() => name.clone(),
        Some(value @ Value::Number(_)) => value_text(value),
        Some(Value::Bool(true)) => "true".to_string(),
        _ => format!("{label} {id}"),
    }
}

fn object_type(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(_) => Some(value_text(value)),
        _ => None,
    }
}

/// Encode a tree and edits back into the wire payload
///
/// Every block and parameter of `tree` is emitted. A non-empty edit is sent
/// as a string `val`; otherwise the parameter's original value is sent
/// verbatim (and an absent value stays absent).
#[must_use]
pub fn encode(object_type: Option<&str>, tree: &Tree, edits: &EditState) -> Value {
    let mut blocks = Map::new();
    for block in &tree.blocks {
        let mut params = Map::new();
        for param in &block.params {
            params.insert(param.id.to_string(), encode_param(param, edits));
        }

        let mut entry = Map::new();
        entry.insert(NAME_KEY.to_string(), Value::String(block.name.clone()));
        entry.insert(PARAMS_KEY.to_string(), Value::Object(params));
        blocks.insert(block.id.to_string(), Value::Object(entry));
    }

    let mut root = Map::new();
    root.insert(
        TYPE_KEY.to_string(),
        object_type.map_or(Value::Null, |ty| Value::String(ty.to_string())),
    );
    root.insert(PARAMS_KEY.to_string(), Value::Object(blocks));
    Value::Object(root)
}

fn encode_param(param: &Parameter, edits: &EditState) -> Value {
    let mut entry = Map::new();
    entry.insert(NAME_KEY.to_string(), Value::String(param.name.clone()));

    let value = match edits.non_empty(&param.key()) {
        Some(edited) => Some(Value::String(edited.to_string())),
        None => param.value.to_wire(),
    };
    if let Some(value) = value {
        entry.insert(VALUE_KEY.to_string(), value);
    }
    Value::Object(entry)
}

/// One row of the flat parameter view
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatParam {
    /// Composite key
    pub key: CompositeKey,
    /// Owning block id
    pub block_id: BlockId,
    /// Owning block name
    pub block_name: String,
    /// Parameter id
    pub param_id: ParamId,
    /// Parameter name
    pub name: String,
    /// Type inferred from the current value
    pub value_type: ValueType,
    /// Value as delivered
    pub value: RawValue,
}

impl From<&Parameter> for FlatParam {
    fn from(param: &Parameter) -> Self {
        Self {
            key: param.key(),
            block_id: param.block_id.clone(),
            block_name: param.block_name.clone(),
            param_id: param.id.clone(),
            name: param.name.clone(),
            value_type: infer_type(&param.value),
            value: param.value.clone(),
        }
    }
}

/// Flat, display-ordered view of every parameter
#[must_use]
pub fn flat_view(tree: &Tree) -> Vec<FlatParam> {
    tree.flat_params().map(FlatParam::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn pipe() -> Value {
        json!({
            "type": "pipe",
            "params": {
                "2": {"name": "Dims", "params": {
                    "10": {"name": "Thickness", "val": 8.5},
                    "1": {"name": "Diameter", "val": 273}
                }}
            }
        })
    }

    #[test]
    fn decodes_and_orders_numerically() {
        let tree = decode(&pipe());
        assert_eq!(tree.object_type.as_deref(), Some("pipe"));
        assert_eq!(tree.blocks.len(), 1);
        let ids: Vec<_> = tree.blocks[0].params.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "10"]);
        assert_eq!(tree.blocks[0].params[0].block_name, "Dims");
    }

    #[test]
    fn missing_params_is_empty_tree() {
        assert_eq!(decode(&json!({"type": "pipe"})), Tree::empty());
        assert_eq!(decode(&json!({"params": "oops"})), Tree::empty());
        assert_eq!(decode(&json!([1, 2])), Tree::empty());
        assert_eq!(decode(&Value::Null), Tree::empty());
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let tree = decode(&json!({
            "params": {
                "1": "not a block",
                "2": {"params": {"0": 5, "1": {"val": "ok"}}}
            }
        }));
        assert_eq!(tree.blocks.len(), 1);
        assert_eq!(tree.blocks[0].params.len(), 1);
        assert_eq!(tree.blocks[0].params[0].id.as_str(), "1");
    }

    #[test]
    fn unaddressable_ids_are_skipped() {
        let tree = decode(&json!({
            "params": {
                "": {"params": {"0": {"val": 1}}},
                "1.2": {"params": {"0": {"val": 2}}},
                "1": {"params": {"": {"val": 5}, "0": {"val": 6}}}
            }
        }));
        let keys: Vec<_> = tree.keys().map(|key| key.to_string()).collect();
        assert_eq!(keys, vec!["1.0"]);
        assert!(tree.keys().all(|key| tree.find(&key).is_some()));
    }

    #[test]
    fn synthesizes_missing_names() {
        let tree = decode(&json!({"params": {"3": {"params": {"1.2": {"val": 1}}}}}));
        assert_eq!(tree.blocks[0].name, "Block 3");
        assert_eq!(tree.blocks[0].params[0].name, "Parameter 1.2");

        let options = DecodeOptions::default()
            .with_block_label("Блок")
            .with_param_label("Параметр");
        let tree = decode_with(&json!({"params": {"3": {"name": "", "params": {}}}}), &options);
        assert_eq!(tree.blocks[0].name, "Блок 3");
    }

    #[test]
    fn encode_prefers_non_empty_edits() {
        let tree = decode(&pipe());
        let mut edits = EditState::new();
        edits.set("2.1".parse().unwrap(), "300");
        edits.set("2.10".parse().unwrap(), "");

        let wire = encode(Some("pipe"), &tree, &edits);
        assert_eq!(wire["params"]["2"]["params"]["1"]["val"], json!("300"));
        assert_eq!(wire["params"]["2"]["params"]["10"]["val"], json!(8.5));
        assert_eq!(wire["params"]["2"]["name"], json!("Dims"));
    }

    #[test]
    fn encode_empty_tree() {
        let wire = encode(Some("pipe"), &Tree::empty(), &EditState::new());
        assert_eq!(wire, json!({"type": "pipe", "params": {}}));
        let wire = encode(None, &Tree::empty(), &EditState::new());
        assert_eq!(wire, json!({"type": null, "params": {}}));
    }

    #[test]
    fn absent_value_stays_absent() {
        let tree = decode(&json!({"params": {"1": {"name": "B", "params": {"0": {"name": "P"}}}}}));
        let wire = encode(None, &tree, &EditState::new());
        assert_eq!(wire["params"]["1"]["params"]["0"], json!({"name": "P"}));
    }

    #[test]
    fn flat_view_carries_types() {
        let flat = flat_view(&decode(&pipe()));
        assert_eq!(flat.len(), 2);
        assert_eq!(flat[0].key.as_str(), "2.1");
        assert_eq!(flat[0].value_type, ValueType::Integer);
        assert_eq!(flat[1].value_type, ValueType::Real);
    }
}
