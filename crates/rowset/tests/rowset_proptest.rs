//! Property-based tests for a cached row set under random edits and navigation.

use proptest::prelude::*;
use rowset::schema::MetaDataBuilder;
use rowset::{CachedRowSet, CursorState, DataType, ResultSet, RowSet, RowStatus, Value};

#[derive(Clone, Debug)]
enum Op {
    Absolute(i64),
    Relative(i64),
    Next,
    Previous,
    Last,
    BeforeFirst,
    Update(i64),
    Delete,
    UndoDelete,
    UndoUpdate,
    Insert(i64),
    ShowDeleted(bool),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (-10i64..10).prop_map(Op::Absolute),
        (-4i64..4).prop_map(Op::Relative),
        Just(Op::Next),
        Just(Op::Previous),
        Just(Op::Last),
        Just(Op::BeforeFirst),
        any::<i64>().prop_map(Op::Update),
        Just(Op::Delete),
        Just(Op::UndoDelete),
        Just(Op::UndoUpdate),
        any::<i64>().prop_map(Op::Insert),
        any::<bool>().prop_map(Op::ShowDeleted),
    ]
}

fn populated(rows: i64) -> CachedRowSet {
    let meta = MetaDataBuilder::new("t")
        .unwrap()
        .add_column("id", DataType::Int64)
        .unwrap()
        .add_column("v", DataType::Int64)
        .unwrap()
        .build()
        .unwrap();
    let data = (0..rows)
        .map(|i| vec![Value::Int64(i), Value::Int64(i * 10)])
        .collect();
    let mut rs = CachedRowSet::new();
    rs.populate(ResultSet::new(meta, data).unwrap(), 1).unwrap();
    rs
}

fn apply(rs: &mut CachedRowSet, op: &Op) {
    // Rejected operations (off-row edits, strict relative moves) are expected;
    // only the resulting state is checked.
    let _ = match *op {
        Op::Absolute(n) => rs.absolute(n).map(|_| ()),
        Op::Relative(n) => rs.relative(n).map(|_| ()),
        Op::Next => rs.next().map(|_| ()),
        Op::Previous => rs.previous().map(|_| ()),
        Op::Last => rs.last().map(|_| ()),
        Op::BeforeFirst => rs.before_first(),
        Op::Update(v) => rs
            .update(2, Value::Int64(v))
            .and_then(|_| rs.update_row()),
        Op::Delete => rs.delete_row(),
        Op::UndoDelete => rs.undo_delete(),
        Op::UndoUpdate => rs.undo_update(),
        Op::Insert(v) => {
            let inserted = rs
                .move_to_insert_row()
                .and_then(|_| rs.update(1, Value::Int64(v)))
                .and_then(|_| rs.update(2, Value::Int64(v)))
                .and_then(|_| rs.insert_row());
            rs.move_to_current_row().and(inserted)
        }
        Op::ShowDeleted(show) => {
            rs.set_show_deleted(show);
            Ok(())
        }
    };
}

proptest! {
    #[test]
    fn prop_cursor_state_in_range(rows in 0i64..8, ops in prop::collection::vec(op(), 0..40)) {
        let mut rs = populated(rows);
        for op in &ops {
            apply(&mut rs, op);
            let size = rs.size();
            match rs.cursor_state() {
                CursorState::Positioned(n) => {
                    prop_assert!(n >= 1 && n <= size);
                    let row = rs.row().unwrap();
                    prop_assert!(row == 0 || row == n);
                }
                CursorState::BeforeFirst | CursorState::AfterLast => {}
                CursorState::InsertRow => prop_assert!(false, "left in the insert row"),
            }
        }
    }

    #[test]
    fn prop_status_agrees_with_values(rows in 1i64..8, ops in prop::collection::vec(op(), 0..40)) {
        let mut rs = populated(rows);
        for op in &ops {
            apply(&mut rs, op);
        }
        for row in rs.rows() {
            if row.status() == RowStatus::Unmodified {
                prop_assert_eq!(row.original(), row.current());
            }
        }
        let visible = rs.rows().iter().filter(|r| rs.show_deleted() || !r.is_deleted()).count();
        prop_assert_eq!(rs.size(), visible);
    }

    #[test]
    fn prop_restore_original_undoes_everything(rows in 1i64..8, ops in prop::collection::vec(op(), 0..40)) {
        let mut rs = populated(rows);
        let before: Vec<_> = rs.rows().iter().map(|r| r.current().to_vec()).collect();
        for op in &ops {
            apply(&mut rs, op);
        }
        rs.restore_original().unwrap();
        let after: Vec<_> = rs.rows().iter().map(|r| r.current().to_vec()).collect();
        prop_assert_eq!(after, before);
        prop_assert!(!rs.has_changes());
    }
}
