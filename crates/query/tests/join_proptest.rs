//! Property-based tests for join composition.
//!
//! The hash composition must agree with a nested-loop reference join over
//! randomly keyed participants, and edits through the view must never reach
//! a non-owning participant.

use proptest::prelude::*;
use rowset::schema::MetaDataBuilder;
use rowset::{CachedRowSet, DataType, ResultSet, RowSet, Value};
use rowset_query::JoinView;

/// Keys drawn from a small range so that matches are common; `None` is null.
fn keys_strategy(max_rows: usize) -> impl Strategy<Value = Vec<Option<i64>>> {
    prop::collection::vec(prop::option::weighted(0.9, 0i64..6), 0..max_rows)
}

fn create_row_set(table: &str, keys: &[Option<i64>]) -> CachedRowSet {
    let meta = MetaDataBuilder::new(table)
        .unwrap()
        .add_column("key", DataType::Int64)
        .unwrap()
        .add_column("pos", DataType::Int64)
        .unwrap()
        .add_nullable(&["key"])
        .build()
        .unwrap();
    let rows = keys
        .iter()
        .enumerate()
        .map(|(i, k)| vec![k.map_or(Value::Null, Value::Int64), Value::Int64(i as i64)])
        .collect();
    let mut rs = CachedRowSet::new();
    rs.populate(ResultSet::new(meta, rows).unwrap(), 1).unwrap();
    rs
}

/// Nested-loop reference: (left position, right position) pairs in order.
fn reference_join(left: &[Option<i64>], right: &[Option<i64>]) -> Vec<(i64, i64)> {
    let mut out = Vec::new();
    for (i, l) in left.iter().enumerate() {
        for (j, r) in right.iter().enumerate() {
            if let (Some(l), Some(r)) = (l, r) {
                if l == r {
                    out.push((i as i64, j as i64));
                }
            }
        }
    }
    out
}

fn composed_positions(view: &mut JoinView) -> Vec<(i64, i64)> {
    let mut out = Vec::new();
    view.before_first().unwrap();
    while view.next().unwrap() {
        out.push((
            view.get_i64(2).unwrap().unwrap_or(-1),
            view.get_i64(4).unwrap().unwrap_or(-1),
        ));
    }
    out
}

proptest! {
    #[test]
    fn prop_hash_composition_matches_nested_loop(
        left in keys_strategy(12),
        right in keys_strategy(12),
    ) {
        let mut view = JoinView::new();
        view.add_row_set(create_row_set("l", &left), 1).unwrap();
        view.add_row_set(create_row_set("r", &right), 1).unwrap();

        let expected = reference_join(&left, &right);
        prop_assert_eq!(view.size(), expected.len());
        prop_assert_eq!(composed_positions(&mut view), expected);
    }

    #[test]
    fn prop_delete_never_reaches_siblings(
        left in keys_strategy(10),
        right in keys_strategy(10),
        pick in 1usize..20,
    ) {
        let mut view = JoinView::new();
        view.add_row_set(create_row_set("l", &left), 1).unwrap();
        view.add_row_set(create_row_set("r", &right), 1).unwrap();
        prop_assume!(view.size() > 0);

        let owner_before = view.row_set(0).unwrap().size();
        view.absolute((pick % view.size() + 1) as i64).unwrap();
        view.delete_row().unwrap();

        prop_assert_eq!(view.row_set(0).unwrap().size(), owner_before - 1);
        prop_assert_eq!(view.row_set(1).unwrap().size(), right.len());
        prop_assert!(!view.row_set(1).unwrap().has_changes());
    }
}
