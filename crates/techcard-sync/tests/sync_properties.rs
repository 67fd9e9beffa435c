use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::{json, Map, Value};
use techcard_model::{BlockId, CompositeKey, EditState, ParamId, Tree};
use techcard_sync::{decode, encode, merge};

fn wire_value() -> impl Strategy<Value = Value> {
    let scalar = prop_oneof![
        any::<i32>().prop_map(|n| json!(n)),
        (-1.0e6f64..1.0e6).prop_map(|f| json!(f)),
        "[a-zA-Z0-9 ]{0,8}".prop_map(Value::String),
        any::<bool>().prop_map(Value::Bool),
        Just(Value::Null),
    ];
    prop_oneof![
        4 => scalar.clone(),
        1 => prop::collection::vec(scalar, 0..4).prop_map(Value::Array),
        1 => prop::collection::btree_map("[0-9]{1,2}", "[a-z]{1,4}", 0..4)
            .prop_map(|m| json!(m)),
        1 => ("[0-9]{1,3}", "[a-z]{1,6}").prop_map(|(id, name)| json!({"id": id, "name": name})),
    ]
}

fn param_id() -> impl Strategy<Value = String> {
    prop::collection::vec(0u32..12, 1..4).prop_map(|segments| {
        segments
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    })
}

fn wire_tree() -> impl Strategy<Value = Value> {
    let params = prop::collection::btree_map(param_id(), wire_value(), 0..6);
    prop::collection::btree_map(0u32..8, params, 0..4).prop_map(|blocks| {
        let mut encoded = Map::new();
        for (block_id, params) in blocks {
            let mut inner = Map::new();
            for (param_id, val) in params {
                inner.insert(param_id.clone(), json!({"name": format!("p{param_id}"), "val": val}));
            }
            encoded.insert(
                block_id.to_string(),
                json!({"name": format!("b{block_id}"), "params": inner}),
            );
        }
        json!({"type": "pipe", "params": encoded})
    })
}

fn edits_for(tree: &Tree) -> impl Strategy<Value = EditState> {
    let keys: Vec<CompositeKey> = tree.keys().collect();
    let pick = if keys.is_empty() {
        Just(CompositeKey::new(&BlockId::from("9"), &ParamId::from("9"))).boxed()
    } else {
        prop::sample::select(keys).boxed()
    };
    prop::collection::vec((pick, prop_oneof![Just(String::new()), "[a-z0-9]{1,5}"]), 0..6)
        .prop_map(|entries| entries.into_iter().collect())
}

fn tree_and_edits() -> impl Strategy<Value = (Tree, EditState)> {
    wire_tree()
        .prop_map(|wire| decode(&wire))
        .prop_flat_map(|tree| {
            let edits = edits_for(&tree);
            (Just(tree), edits)
        })
}

proptest! {
    #[test]
    fn prop_merge_is_idempotent((tree, prior) in tree_and_edits()) {
        let once = merge(&prior, &tree);
        let twice = merge(&once, &tree);
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn prop_explicit_blanks_survive_merge((tree, prior) in tree_and_edits()) {
        let next = merge(&prior, &tree);
        for (key, value) in prior.iter() {
            prop_assert_eq!(next.get(key), Some(value));
        }
        for key in tree.keys() {
            prop_assert!(next.contains(&key));
        }
    }

    #[test]
    fn prop_encode_prefers_non_empty_edits((tree, edits) in tree_and_edits()) {
        let wire = encode(Some("pipe"), &tree, &edits);
        for param in tree.flat_params() {
            let sent = &wire["params"][param.block_id.as_str()]["params"][param.id.as_str()];
            match edits.non_empty(&param.key()) {
                Some(edited) => prop_assert_eq!(sent.get("val").cloned(), Some(json!(edited))),
                None => prop_assert_eq!(sent.get("val").cloned(), param.value.to_wire()),
            }
        }
    }

    #[test]
    fn prop_round_trip_reproduces_values(wire in wire_tree()) {
        let tree = decode(&wire);
        let encoded = encode(Some("pipe"), &tree, &EditState::new());
        prop_assert_eq!(&encoded["type"], &wire["type"]);
        prop_assert_eq!(&encoded["params"], &wire["params"]);
        prop_assert_eq!(decode(&encoded), tree);
    }
}

#[test]
fn scenario_decode_orders_params_numerically() {
    let tree = decode(&json!({
        "type": "pipe",
        "params": {"2": {"name": "Dims", "params": {
            "1": {"name": "Diameter", "val": 273},
            "10": {"name": "Thickness", "val": 8.5}
        }}}
    }));
    assert_eq!(tree.blocks.len(), 1);
    assert_eq!(tree.blocks[0].id.as_str(), "2");
    let names: Vec<_> = tree.blocks[0].params.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Diameter", "Thickness"]);
}

#[test]
fn scenario_blank_edit_beats_server_value() {
    let mut prior = EditState::new();
    prior.set("1.0".parse().unwrap(), "");
    let tree = decode(&json!({"params": {"1": {"params": {"0": {"val": "X"}}}}}));
    let next = merge(&prior, &tree);
    assert_eq!(next.get(&"1.0".parse().unwrap()), Some(""));
}

#[test]
fn merge_then_encode_sends_server_values_for_untouched_fields() {
    let wire = json!({"type": "pipe", "params": {"1": {"name": "B", "params": {
        "0": {"name": "Object", "val": {"id": 4, "name": "Pipe"}},
        "1": {"name": "Grade", "val": ["A", "B"]}
    }}}});
    let tree = decode(&wire);
    let edits = merge(&EditState::new(), &tree);
    assert_eq!(encode(Some("pipe"), &tree, &edits)["params"]["1"]["params"]["1"]["val"], json!(["A", "B"]));
    assert_eq!(edits.get(&"1.0".parse().unwrap()), Some("Pipe"));
    // Seeded reference name is non-empty, so it is sent as text
    assert_eq!(
        encode(Some("pipe"), &tree, &edits)["params"]["1"]["params"]["0"]["val"],
        json!("Pipe")
    );
}
