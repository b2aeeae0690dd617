//! Conflict report produced by a failed synchronization.
//!
//! The report is a narrow read-only view: it can step through its conflicts
//! and read the conflicting source values, but the general row-access surface
//! is refused.

use rowset_core::schema::RowSetMetaData;
use rowset_core::{Error, Result, Row, RowSet, Value};

/// Why a row could not be synchronized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConflictKind {
    /// The source refused the inserted row.
    Insert,
    /// The source row changed (or vanished) since it was read.
    Update,
    /// The source row changed (or vanished) before it could be deleted.
    Delete,
}

/// One unsynchronized row.
#[derive(Clone, Debug, PartialEq)]
pub struct Conflict {
    kind: ConflictKind,
    /// Snapshot of the buffered row at synchronization time.
    row: Row,
    /// 1-based physical position of the row in the buffer before synchronization.
    position: usize,
    /// Source values read for the row's key; `None` if the row is gone.
    source_values: Option<Vec<Value>>,
    /// Source error message for insert conflicts.
    reason: Option<String>,
}

impl Conflict {
    pub(crate) fn changed(
        kind: ConflictKind,
        row: Row,
        position: usize,
        source_values: Option<Vec<Value>>,
    ) -> Self {
        Self {
            kind,
            row,
            position,
            source_values,
            reason: None,
        }
    }

    pub(crate) fn rejected(row: Row, position: usize, reason: String) -> Self {
        Self {
            kind: ConflictKind::Insert,
            row,
            position,
            source_values: None,
            reason: Some(reason),
        }
    }

    #[inline]
    pub fn kind(&self) -> ConflictKind {
        self.kind
    }

    #[inline]
    pub fn row(&self) -> &Row {
        &self.row
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn source_values(&self) -> Option<&[Value]> {
        self.source_values.as_deref()
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }
}

/// Ordered conflicts with their own cursor.
#[derive(Clone, Debug, PartialEq)]
pub struct ConflictReport {
    metadata: RowSetMetaData,
    conflicts: Vec<Conflict>,
    /// 0 before the first conflict, `len + 1` after the last.
    cursor: usize,
}

impl ConflictReport {
    pub(crate) fn new(metadata: RowSetMetaData, conflicts: Vec<Conflict>) -> Self {
        Self {
            metadata,
            conflicts,
            cursor: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.conflicts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Returns every conflict in buffer order.
    #[inline]
    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    /// Advances to the next conflict. Returns false past the last one.
    pub fn next_conflict(&mut self) -> bool {
        if self.cursor <= self.conflicts.len() {
            self.cursor += 1;
        }
        self.cursor <= self.conflicts.len()
    }

    /// Steps back to the previous conflict. Returns false before the first one.
    pub fn previous_conflict(&mut self) -> bool {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
        self.cursor > 0
    }

    /// Returns the conflict under the report's cursor.
    pub fn current(&self) -> Result<&Conflict> {
        match self.cursor {
            0 => Err(Error::invalid_cursor("before the first conflict")),
            i if i > self.conflicts.len() => Err(Error::invalid_cursor("after the last conflict")),
            i => Ok(&self.conflicts[i - 1]),
        }
    }

    /// Kind of the current conflict.
    pub fn status(&self) -> Result<ConflictKind> {
        self.current().map(Conflict::kind)
    }

    /// Source value of a 1-based column for the current conflict.
    ///
    /// `None` when the source has no row for the key (or the conflict is an
    /// insert rejection).
    pub fn conflict_value(&self, column: usize) -> Result<Option<&Value>> {
        let index = self.metadata.check_index(column)?;
        let conflict = self.current()?;
        Ok(conflict.source_values().and_then(|v| v.get(index)))
    }

    pub fn conflict_value_by_name(&self, name: &str) -> Result<Option<&Value>> {
        let column = self.metadata.find_column(name)?;
        self.conflict_value(column)
    }

    /// Buffered row snapshot of the current conflict.
    pub fn conflict_row(&self) -> Result<&Row> {
        self.current().map(Conflict::row)
    }

    /// Original 1-based buffer position of the current conflict.
    pub fn original_position(&self) -> Result<usize> {
        self.current().map(Conflict::position)
    }

    /// Column metadata of the synchronized row set.
    pub fn columns(&self) -> &RowSetMetaData {
        &self.metadata
    }
}

fn refused<T>(operation: &str) -> Result<T> {
    Err(Error::unsupported(format!("{} on a conflict report", operation)))
}

impl RowSet for ConflictReport {
    fn metadata(&self) -> Result<&RowSetMetaData> {
        refused("metadata")
    }

    /// Number of conflicts; the only part of the row-access surface answered.
    fn size(&self) -> usize {
        self.conflicts.len()
    }

    fn absolute(&mut self, _row: i64) -> Result<bool> {
        refused("absolute")
    }

    fn relative(&mut self, _rows: i64) -> Result<bool> {
        refused("relative")
    }

    fn next(&mut self) -> Result<bool> {
        refused("next")
    }

    fn previous(&mut self) -> Result<bool> {
        refused("previous")
    }

    fn first(&mut self) -> Result<bool> {
        refused("first")
    }

    fn last(&mut self) -> Result<bool> {
        refused("last")
    }

    fn before_first(&mut self) -> Result<()> {
        refused("before_first")
    }

    fn after_last(&mut self) -> Result<()> {
        refused("after_last")
    }

    fn row(&self) -> Result<usize> {
        refused("row")
    }

    fn get(&self, _column: usize) -> Result<&Value> {
        refused("get")
    }

    fn update(&mut self, _column: usize, _value: Value) -> Result<()> {
        refused("update")
    }

    fn update_row(&mut self) -> Result<()> {
        refused("update_row")
    }

    fn cancel_row_updates(&mut self) -> Result<()> {
        refused("cancel_row_updates")
    }

    fn delete_row(&mut self) -> Result<()> {
        refused("delete_row")
    }

    fn insert_row(&mut self) -> Result<()> {
        refused("insert_row")
    }

    fn move_to_insert_row(&mut self) -> Result<()> {
        refused("move_to_insert_row")
    }

    fn move_to_current_row(&mut self) -> Result<()> {
        refused("move_to_current_row")
    }

    fn row_inserted(&self) -> Result<bool> {
        refused("row_inserted")
    }

    fn row_updated(&self) -> Result<bool> {
        refused("row_updated")
    }

    fn row_deleted(&self) -> Result<bool> {
        refused("row_deleted")
    }

    fn get_array(&self, _column: usize) -> Result<Vec<Value>> {
        refused("get_array")
    }

    fn get_row_id(&self, _column: usize) -> Result<Vec<u8>> {
        refused("get_row_id")
    }
}
