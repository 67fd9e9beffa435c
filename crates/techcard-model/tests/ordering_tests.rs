use std::cmp::Ordering;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;
use techcard_model::{
    compare_param_ids, order_blocks, order_params, Block, BlockId, ParamId, Parameter, RawValue,
};

fn param(block: &str, id: &str, name: &str) -> Parameter {
    Parameter {
        id: ParamId::from(id),
        name: name.to_string(),
        value: RawValue::from(json!(null)),
        block_id: BlockId::from(block),
        block_name: String::new(),
    }
}

#[test]
fn test_dotted_ids_follow_hierarchy() {
    let mut params = vec![
        param("1", "1.10", "a"),
        param("1", "1.4.2", "b"),
        param("1", "1.4", "c"),
        param("1", "2", "d"),
        param("1", "1", "e"),
    ];
    order_params(&mut params);
    let ids: Vec<_> = params.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "1.4", "1.4.2", "1.10", "2"]);
}

#[test]
fn test_blocks_sort_numerically_not_lexically() {
    let mut blocks = vec![
        Block::new(BlockId::from("10"), "ten"),
        Block::new(BlockId::from("2"), "two"),
        Block::new(BlockId::from("1"), "one"),
    ];
    order_blocks(&mut blocks);
    let ids: Vec<_> = blocks.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "10"]);
}

#[test]
fn test_equal_ranks_keep_arrival_order() {
    let mut params = vec![
        param("1", "1.0", "first"),
        param("1", "x", "second"),
        param("1", "1", "third"),
        param("1", "0", "fourth"),
    ];
    order_params(&mut params);
    let names: Vec<_> = params.iter().map(|p| p.name.as_str()).collect();
    // "x" and "0" rank zero; "1.0" and "1" rank equal
    assert_eq!(names, vec!["second", "fourth", "first", "third"]);
}

fn param_id() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            (0u32..20).prop_map(|n| n.to_string()),
            Just("x".to_string()),
            Just(String::new()),
        ],
        1..4,
    )
    .prop_map(|segments| segments.join("."))
}

proptest! {
    #[test]
    fn prop_comparator_is_antisymmetric(a in param_id(), b in param_id()) {
        let ab = compare_param_ids(&ParamId::from(a.as_str()), &ParamId::from(b.as_str()));
        let ba = compare_param_ids(&ParamId::from(b.as_str()), &ParamId::from(a.as_str()));
        prop_assert_eq!(ab, ba.reverse());
    }

    #[test]
    fn prop_comparator_is_transitive(a in param_id(), b in param_id(), c in param_id()) {
        let (a, b, c) = (ParamId::from(a), ParamId::from(b), ParamId::from(c));
        if compare_param_ids(&a, &b) != Ordering::Greater
            && compare_param_ids(&b, &c) != Ordering::Greater
        {
            prop_assert_ne!(compare_param_ids(&a, &c), Ordering::Greater);
        }
    }

    #[test]
    fn prop_comparator_is_reflexive(a in param_id()) {
        let id = ParamId::from(a);
        prop_assert_eq!(compare_param_ids(&id, &id), Ordering::Equal);
    }

    #[test]
    fn prop_sort_is_stable_and_idempotent(ids in prop::collection::vec(param_id(), 0..16)) {
        let mut params: Vec<Parameter> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| param("1", id, &i.to_string()))
            .collect();
        order_params(&mut params);

        for pair in params.windows(2) {
            match compare_param_ids(&pair[0].id, &pair[1].id) {
                Ordering::Less => {}
                Ordering::Equal => {
                    let first: usize = pair[0].name.parse().unwrap();
                    let second: usize = pair[1].name.parse().unwrap();
                    prop_assert!(first < second);
                }
                Ordering::Greater => prop_assert!(false, "out of order"),
            }
        }

        let mut resorted = params.clone();
        order_params(&mut resorted);
        prop_assert_eq!(resorted, params);
    }
}
