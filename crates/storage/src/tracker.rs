//! Row status transitions.
//!
//! `ChangeTracker` is the single place that decides whether a status change is
//! legal for a row; the row set facade only resolves which row is current.

use rowset_core::{Error, Result, Row, RowStatus};

/// Counts of changed rows by effective status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChangeSummary {
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
}

impl ChangeSummary {
    /// Total number of rows that need synchronization.
    pub fn total(&self) -> usize {
        self.inserted + self.updated + self.deleted
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Enforces legal status transitions.
#[derive(Clone, Copy, Debug, Default)]
pub struct ChangeTracker;

impl ChangeTracker {
    /// Commits pending column edits.
    ///
    /// Returns true if anything changed. A deleted row cannot be updated.
    pub fn commit_update(row: &mut Row) -> Result<bool> {
        if row.is_deleted() {
            return Err(Error::invalid_operation("cannot update a deleted row"));
        }
        Ok(row.commit_pending())
    }

    /// Marks a row deleted. Returns false if it already was.
    pub fn delete(row: &mut Row) -> bool {
        if row.is_deleted() {
            return false;
        }
        row.discard_pending();
        row.mark_deleted();
        true
    }

    /// Checks that a row can be removed by `undo_insert`.
    pub fn check_undo_insert(row: &Row) -> Result<()> {
        if !row.is_inserted() {
            return Err(Error::invalid_operation(
                "undo_insert needs a row inserted locally",
            ));
        }
        Ok(())
    }

    /// Reverts committed edits of an updated row. No-op for any other status.
    pub fn undo_update(row: &mut Row) -> bool {
        if row.status() != RowStatus::Updated {
            return false;
        }
        row.revert();
        true
    }

    /// Restores a deleted row to its pre-delete status. No-op otherwise.
    pub fn undo_delete(row: &mut Row) -> bool {
        if !row.is_deleted() {
            return false;
        }
        row.clear_deleted();
        true
    }

    /// Counts rows by effective status.
    pub fn summarize<'a, I>(rows: I) -> ChangeSummary
    where
        I: IntoIterator<Item = &'a Row>,
    {
        rows.into_iter()
            .fold(ChangeSummary::default(), |mut acc, row| {
                match row.status() {
                    RowStatus::Inserted => acc.inserted += 1,
                    RowStatus::Updated => acc.updated += 1,
                    RowStatus::Deleted => acc.deleted += 1,
                    RowStatus::Unmodified => {}
                }
                acc
            })
    }

    /// Returns true if any row needs synchronization.
    pub fn has_changes<'a, I>(rows: I) -> bool
    where
        I: IntoIterator<Item = &'a Row>,
    {
        rows.into_iter()
            .any(|row| row.status() != RowStatus::Unmodified)
    }
}
