//! Row structure for cached row sets.
//!
//! A `Row` keeps the values last synchronized with the backing source
//! (`original`) next to the working values (`current`). Column edits are first
//! staged as pending changes and only become part of `current` when the row
//! update is committed.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Status tag of a buffered row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RowStatus {
    /// Same as the source as far as the cache knows.
    Unmodified,
    /// Created locally, not yet in the source.
    Inserted,
    /// Current values differ from the originals.
    Updated,
    /// Marked for deletion.
    Deleted,
}

/// A row held in a row buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    original: Vec<Value>,
    current: Vec<Value>,
    /// Staged column edits (0-based column -> value), not yet committed.
    pending: BTreeMap<usize, Value>,
    inserted: bool,
    updated: bool,
    deleted: bool,
}

impl Row {
    /// Creates an unmodified row fetched from the source.
    pub fn new(values: Vec<Value>) -> Self {
        Self {
            original: values.clone(),
            current: values,
            pending: BTreeMap::new(),
            inserted: false,
            updated: false,
            deleted: false,
        }
    }

    /// Creates a locally inserted row.
    pub fn inserted(values: Vec<Value>) -> Self {
        let mut row = Self::new(values);
        row.inserted = true;
        row
    }

    /// Rebuilds a row from its stored parts.
    ///
    /// Used when reading a serialized row set back; `original` is ignored for rows
    /// that are not updated.
    pub fn from_parts(
        original: Vec<Value>,
        current: Vec<Value>,
        inserted: bool,
        updated: bool,
        deleted: bool,
    ) -> Self {
        let original = if updated { original } else { current.clone() };
        Self {
            original,
            current,
            pending: BTreeMap::new(),
            inserted,
            updated,
            deleted,
        }
    }

    /// Returns the effective status.
    pub fn status(&self) -> RowStatus {
        if self.deleted {
            RowStatus::Deleted
        } else if self.inserted {
            RowStatus::Inserted
        } else if self.updated {
            RowStatus::Updated
        } else {
            RowStatus::Unmodified
        }
    }

    /// Returns true if the row was created locally.
    #[inline]
    pub fn is_inserted(&self) -> bool {
        self.inserted
    }

    /// Returns true if committed edits exist.
    #[inline]
    pub fn is_updated(&self) -> bool {
        self.updated
    }

    /// Returns true if the row is marked deleted.
    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Returns the original values.
    #[inline]
    pub fn original(&self) -> &[Value] {
        &self.original
    }

    /// Returns the committed current values.
    #[inline]
    pub fn current(&self) -> &[Value] {
        &self.current
    }

    /// Returns the number of values in this row.
    #[inline]
    pub fn len(&self) -> usize {
        self.current.len()
    }

    /// Returns true if this row has no values.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Gets the visible value at a 0-based column: a pending edit wins over the
    /// committed current value.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.pending.get(&index).or_else(|| self.current.get(index))
    }

    /// Stages an edit for a 0-based column. Returns false if out of range.
    pub fn stage(&mut self, index: usize, value: Value) -> bool {
        if index < self.current.len() {
            self.pending.insert(index, value);
            true
        } else {
            false
        }
    }

    /// Returns true if there are staged edits.
    #[inline]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Returns true if the column has a staged or committed change.
    pub fn column_changed(&self, index: usize) -> bool {
        self.pending.contains_key(&index)
            || (self.updated && self.current.get(index) != self.original.get(index))
    }

    /// Discards staged edits.
    pub fn discard_pending(&mut self) {
        self.pending.clear();
    }

    /// Folds staged edits into the current values.
    ///
    /// Marks the row updated unless it is a local insert. Returns true if
    /// anything was committed.
    pub fn commit_pending(&mut self) -> bool {
        if self.pending.is_empty() {
            return false;
        }
        for (index, value) in core::mem::take(&mut self.pending) {
            self.current[index] = value;
        }
        if !self.inserted {
            self.updated = true;
        }
        true
    }

    /// Marks the row deleted.
    pub fn mark_deleted(&mut self) {
        self.deleted = true;
    }

    /// Clears the deleted mark, keeping the pre-delete status.
    pub fn clear_deleted(&mut self) {
        self.deleted = false;
    }

    /// Restores `current` from `original` and clears the updated mark.
    pub fn revert(&mut self) {
        self.pending.clear();
        self.current = self.original.clone();
        self.updated = false;
    }

    /// Makes the current values the new originals and clears every mark.
    pub fn accept(&mut self) {
        self.pending.clear();
        self.original = self.current.clone();
        self.inserted = false;
        self.updated = false;
        self.deleted = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Row {
        Row::new(vec![Value::Int64(1), Value::String("Alice".into())])
    }

    #[test]
    fn test_row_new_is_unmodified() {
        let row = sample();
        assert_eq!(row.status(), RowStatus::Unmodified);
        assert_eq!(row.original(), row.current());
        assert_eq!(row.len(), 2);
    }

    #[test]
    fn test_stage_does_not_change_status() {
        let mut row = sample();
        assert!(row.stage(1, Value::String("Bob".into())));
        assert_eq!(row.status(), RowStatus::Unmodified);
        assert_eq!(row.get(1), Some(&Value::String("Bob".into())));
        assert_eq!(row.current()[1], Value::String("Alice".into()));
        assert!(!row.stage(5, Value::Null));
    }

    #[test]
    fn test_commit_pending_marks_updated() {
        let mut row = sample();
        row.stage(1, Value::String("Bob".into()));
        assert!(row.commit_pending());
        assert_eq!(row.status(), RowStatus::Updated);
        assert_eq!(row.original()[1], Value::String("Alice".into()));
        assert!(row.column_changed(1));
        assert!(!row.column_changed(0));
        assert!(!row.commit_pending());
    }

    #[test]
    fn test_inserted_row_stays_inserted_on_commit() {
        let mut row = Row::inserted(vec![Value::Int64(9)]);
        row.stage(0, Value::Int64(10));
        row.commit_pending();
        assert_eq!(row.status(), RowStatus::Inserted);
    }

    #[test]
    fn test_delete_and_restore_keeps_prior_status() {
        let mut row = sample();
        row.stage(0, Value::Int64(2));
        row.commit_pending();
        row.mark_deleted();
        assert_eq!(row.status(), RowStatus::Deleted);
        row.clear_deleted();
        assert_eq!(row.status(), RowStatus::Updated);
    }

    #[test]
    fn test_revert_and_accept() {
        let mut row = sample();
        row.stage(1, Value::String("Bob".into()));
        row.commit_pending();
        row.revert();
        assert_eq!(row.status(), RowStatus::Unmodified);
        assert_eq!(row.original(), row.current());

        row.stage(1, Value::String("Carol".into()));
        row.commit_pending();
        row.accept();
        assert_eq!(row.status(), RowStatus::Unmodified);
        assert_eq!(row.original()[1], Value::String("Carol".into()));
    }

    #[test]
    fn test_from_parts_ignores_original_unless_updated() {
        let row = Row::from_parts(
            vec![Value::Int64(1)],
            vec![Value::Int64(2)],
            false,
            false,
            false,
        );
        assert_eq!(row.original(), row.current());

        let row = Row::from_parts(
            vec![Value::Int64(1)],
            vec![Value::Int64(2)],
            false,
            true,
            true,
        );
        assert_eq!(row.status(), RowStatus::Deleted);
        assert_eq!(row.original(), &[Value::Int64(1)]);
    }
}
