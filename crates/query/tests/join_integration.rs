//! Integration tests for join views over cached row sets.

use rowset::schema::MetaDataBuilder;
use rowset::{CachedRowSet, DataSource, DataType, MemorySource, Query, ResultSet, RowSet, Value};
use rowset_query::JoinView;

/// Helper to create a populated row set of `(key, label)` rows.
fn create_row_set(table: &str, keys: &[Option<i64>]) -> CachedRowSet {
    let meta = MetaDataBuilder::new(table)
        .unwrap()
        .add_column("key", DataType::Int64)
        .unwrap()
        .add_column("label", DataType::String)
        .unwrap()
        .add_nullable(&["key"])
        .build()
        .unwrap();
    let rows = keys
        .iter()
        .enumerate()
        .map(|(i, key)| {
            vec![
                key.map_or(Value::Null, Value::Int64),
                Value::String(format!("{}{}", table, i)),
            ]
        })
        .collect();
    let mut rs = CachedRowSet::new();
    rs.populate(ResultSet::new(meta, rows).unwrap(), 1).unwrap();
    rs
}

fn some(keys: &[i64]) -> Vec<Option<i64>> {
    keys.iter().copied().map(Some).collect()
}

/// Labels of every composed row, owner label first.
fn labels(view: &mut JoinView) -> Vec<(String, String)> {
    let mut out = Vec::new();
    view.before_first().unwrap();
    while view.next().unwrap() {
        out.push((
            view.get_string(2).unwrap().unwrap_or_default(),
            view.get_string(4).unwrap().unwrap_or_default(),
        ));
    }
    out
}

#[test]
fn test_two_by_two_match() {
    let mut view = JoinView::new();
    view.add_row_set(create_row_set("a", &some(&[1, 1, 5, 6])), 1)
        .unwrap();
    view.add_row_set(create_row_set("b", &some(&[1, 1, 7, 8, 9, 10, 11])), 1)
        .unwrap();

    assert_eq!(view.size(), 4);
    let pairs = labels(&mut view);
    let expected: Vec<(String, String)> = [("a0", "b0"), ("a0", "b1"), ("a1", "b0"), ("a1", "b1")]
        .iter()
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .collect();
    assert_eq!(pairs, expected);
}

#[test]
fn test_delete_touches_owner_only() {
    let mut view = JoinView::new();
    view.add_row_set(create_row_set("a", &some(&[1, 1, 5, 6])), 1)
        .unwrap();
    view.add_row_set(create_row_set("b", &some(&[1, 1, 7, 8, 9, 10, 11])), 1)
        .unwrap();

    view.absolute(2).unwrap();
    view.delete_row().unwrap();

    assert_eq!(view.row_set(0).unwrap().size(), 3);
    assert_eq!(view.row_set(1).unwrap().size(), 7);
    assert!(!view.row_set(1).unwrap().has_changes());
    // Deleting a0 removes both of its compositions.
    assert_eq!(view.size(), 2);
    assert_eq!(view.row().unwrap(), 1);
    assert_eq!(view.get_string(2).unwrap().as_deref(), Some("a1"));
}

#[test]
fn test_nulls_never_match() {
    let mut view = JoinView::new();
    view.add_row_set(create_row_set("a", &[None, Some(2)]), 1)
        .unwrap();
    view.add_row_set(create_row_set("b", &[None, Some(2)]), 1)
        .unwrap();
    assert_eq!(view.size(), 1);
    view.first().unwrap();
    assert_eq!(view.get(1).unwrap(), &Value::Int64(2));
}

#[test]
fn test_numeric_match_across_types() {
    let meta = MetaDataBuilder::new("c")
        .unwrap()
        .add_column("key", DataType::Int32)
        .unwrap()
        .build()
        .unwrap();
    let mut narrow = CachedRowSet::new();
    narrow
        .populate(ResultSet::new(meta, vec![vec![Value::Int32(5)]]).unwrap(), 1)
        .unwrap();

    let mut view = JoinView::new();
    view.add_row_set(create_row_set("a", &some(&[5, 6])), 1)
        .unwrap();
    view.add_row_set(narrow, 1).unwrap();
    assert_eq!(view.size(), 1);
}

#[test]
fn test_three_way_join_order() {
    let mut view = JoinView::new();
    view.add_row_set(create_row_set("a", &some(&[2, 1])), 1)
        .unwrap();
    view.add_row_set(create_row_set("b", &some(&[1, 2, 2])), 1)
        .unwrap();
    view.add_row_set(create_row_set("c", &some(&[2, 1])), 1)
        .unwrap();

    // a0(2) x {b1, b2} x {c0}, then a1(1) x {b0} x {c1}
    assert_eq!(view.size(), 3);
    assert_eq!(view.metadata().unwrap().column_count(), 6);
    view.last().unwrap();
    assert_eq!(view.get_string(2).unwrap().as_deref(), Some("a1"));
    assert_eq!(view.get_string(4).unwrap().as_deref(), Some("b0"));
    assert_eq!(view.get_string(6).unwrap().as_deref(), Some("c1"));
}

#[test]
fn test_hidden_rows_do_not_join() {
    let mut owner = create_row_set("a", &some(&[1, 2]));
    owner.first().unwrap();
    owner.delete_row().unwrap();

    let mut view = JoinView::new();
    view.add_row_set(owner, 1).unwrap();
    view.add_row_set(create_row_set("b", &some(&[1, 2])), 1)
        .unwrap();
    assert_eq!(view.size(), 1);
}

#[test]
fn test_owner_changes_sync_after_join() {
    let meta = MetaDataBuilder::anonymous()
        .add_column("key", DataType::Int64)
        .unwrap()
        .add_column("label", DataType::String)
        .unwrap()
        .build()
        .unwrap();
    let mut source = MemorySource::new();
    source.create_table("a", meta, &["key"]).unwrap();
    for k in 1..=3 {
        source
            .insert("a", vec![Value::Int64(k), Value::String(format!("a{}", k))])
            .unwrap();
    }
    let mut owner = CachedRowSet::new();
    owner.set_command(Query::table("a"));
    owner.set_key_columns(&[1]).unwrap();
    owner.execute(&mut source).unwrap();

    let mut view = JoinView::new();
    view.add_designated(owner).unwrap();
    view.add_row_set(create_row_set("b", &some(&[2])), 1)
        .unwrap();
    view.first().unwrap();
    view.update(2, Value::String("renamed".into())).unwrap();
    view.update_row().unwrap();

    let mut row_sets = view.into_row_sets();
    row_sets[0].accept_changes(&mut source).unwrap();
    let result = source.query(&Query::table("a")).unwrap();
    assert_eq!(result.fetch(1, 1)[0][1], Value::String("renamed".into()));
}
