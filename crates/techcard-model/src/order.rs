//! Ordering rule for block and parameter ids
//!
//! Blocks sort by the integer value of their id; parameters compare their
//! dot-separated segments numerically, left to right, with shorter ids
//! virtually zero-padded. Text that does not start with a number ranks as
//! zero. All sorts here are stable, so equal-ranked entries keep their
//! arrival order.

use crate::key::{BlockId, ParamId};
use crate::tree::{Block, Parameter};
use std::cmp::Ordering;

/// Leading integer of `text`, `0` when there is none
///
/// Leading whitespace and a single sign are accepted; trailing garbage is
/// ignored (`"12abc"` ranks as `12`). Overflow saturates.
#[must_use]
pub fn leading_int(text: &str) -> i64 {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0_i64, |acc, digit| {
            acc.saturating_mul(10).saturating_add(i64::from(digit - b'0'))
        });

    if negative {
        -magnitude
    } else {
        magnitude
    }
}

/// Rank of a block id
#[inline]
#[must_use]
pub fn block_rank(id: &BlockId) -> i64 {
    leading_int(id.as_str())
}

/// Segment ranks of a param id
#[must_use]
pub fn param_rank(id: &ParamId) -> ParamRank {
    ParamRank(id.segments().map(leading_int).collect())
}

/// Comparable rank of a dotted param id
///
/// `1.4 == 1.4.0`, `1.4 < 1.4.2 < 1.10`.
#[derive(Debug, Clone)]
pub struct ParamRank(Vec<i64>);

impl ParamRank {
    /// Segment values
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[i64] {
        &self.0
    }
}

impl Ord for ParamRank {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.0.len().max(other.0.len());
        (0..len)
            .map(|i| {
                let a = self.0.get(i).copied().unwrap_or(0);
                let b = other.0.get(i).copied().unwrap_or(0);
                a.cmp(&b)
            })
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for ParamRank {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ParamRank {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for ParamRank {}

/// Compare two block ids by numeric rank
#[inline]
#[must_use]
pub fn compare_block_ids(a: &BlockId, b: &BlockId) -> Ordering {
    block_rank(a).cmp(&block_rank(b))
}

/// Compare two param ids segment by segment
#[inline]
#[must_use]
pub fn compare_param_ids(a: &ParamId, b: &ParamId) -> Ordering {
    param_rank(a).cmp(&param_rank(b))
}

/// Sort blocks in place (stable)
pub fn order_blocks(blocks: &mut [Block]) {
    blocks.sort_by_cached_key(|block| block_rank(&block.id));
}

/// Sort parameters in place (stable)
pub fn order_params(params: &mut [Parameter]) {
    params.sort_by_cached_key(|param| param_rank(&param.id));
}

/// Sort dictionary entries into object-key order (stable)
///
/// Canonical array-index keys (`"0"`, `"7"`, not `"07"` or `"-1"`) come
/// first in ascending order; every other key follows in arrival order. Used
/// for choice dictionaries and catalog maps.
pub fn order_dictionary_entries<T>(entries: &mut [(String, T)]) {
    entries.sort_by_cached_key(|(id, _)| match array_index(id) {
        Some(index) => (false, index),
        None => (true, 0),
    });
}

/// Canonical array index of an object key
fn array_index(key: &str) -> Option<u32> {
    let index: u32 = key.parse().ok()?;
    (index < u32::MAX && index.to_string() == key).then_some(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(id: &str) -> ParamId {
        ParamId::from(id)
    }

    #[test]
    fn leading_int_parses_prefix() {
        assert_eq!(leading_int("12"), 12);
        assert_eq!(leading_int("12abc"), 12);
        assert_eq!(leading_int("  7"), 7);
        assert_eq!(leading_int("-3"), -3);
        assert_eq!(leading_int("abc"), 0);
        assert_eq!(leading_int(""), 0);
        assert_eq!(leading_int("-"), 0);
    }

    #[test]
    fn leading_int_saturates() {
        assert_eq!(leading_int("99999999999999999999999"), i64::MAX);
    }

    #[test]
    fn block_ids_compare_numerically() {
        assert_eq!(
            compare_block_ids(&BlockId::from("2"), &BlockId::from("10")),
            Ordering::Less
        );
        assert_eq!(
            compare_block_ids(&BlockId::from("x"), &BlockId::from("0")),
            Ordering::Equal
        );
    }

    #[test]
    fn dotted_ids_compare_by_segment() {
        assert_eq!(compare_param_ids(&p("1.4.2"), &p("1.4")), Ordering::Greater);
        assert_eq!(compare_param_ids(&p("1.4.2"), &p("1.10")), Ordering::Less);
        assert_eq!(compare_param_ids(&p("1"), &p("10")), Ordering::Less);
        assert_eq!(compare_param_ids(&p("2"), &p("10")), Ordering::Less);
    }

    #[test]
    fn shorter_ids_are_zero_padded() {
        assert_eq!(compare_param_ids(&p("1.4"), &p("1.4.0")), Ordering::Equal);
        assert_eq!(compare_param_ids(&p("1"), &p("1.0.0")), Ordering::Equal);
    }

    #[test]
    fn non_numeric_segments_rank_zero() {
        assert_eq!(compare_param_ids(&p("1.x"), &p("1.0")), Ordering::Equal);
        assert_eq!(compare_param_ids(&p("a"), &p("1")), Ordering::Less);
    }

    #[test]
    fn dictionary_entries_sort_numerically() {
        let mut entries = vec![
            ("10".to_string(), "c"),
            ("2".to_string(), "b"),
            ("1".to_string(), "a"),
        ];
        order_dictionary_entries(&mut entries);
        let values: Vec<_> = entries.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec!["a", "b", "c"]);
    }

    #[test]
    fn non_index_dictionary_keys_follow_in_arrival_order() {
        let mut entries = vec![
            ("name".to_string(), "n"),
            ("2".to_string(), "b"),
            ("07".to_string(), "z"),
            ("-1".to_string(), "m"),
            ("0".to_string(), "a"),
            ("4294967295".to_string(), "max"),
        ];
        order_dictionary_entries(&mut entries);
        let keys: Vec<_> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["0", "2", "name", "07", "-1", "4294967295"]);
    }
}
