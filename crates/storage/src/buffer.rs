//! Row buffer: the ordered rows of a cached result plus their metadata.

use crate::cursor::Navigable;
use rowset_core::schema::RowSetMetaData;
use rowset_core::{Error, Result, Row, Value};

/// Ordered, mutable sequence of rows in fetch/insert order.
#[derive(Clone, Debug, Default)]
pub struct RowBuffer {
    /// Column metadata; `None` until the buffer is populated.
    metadata: Option<RowSetMetaData>,
    rows: Vec<Row>,
    /// Whether deleted rows take part in navigation.
    show_deleted: bool,
}

impl RowBuffer {
    /// Creates an empty, unpopulated buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty buffer with metadata.
    pub fn with_metadata(metadata: RowSetMetaData) -> Self {
        Self {
            metadata: Some(metadata),
            ..Self::default()
        }
    }

    /// Returns true once metadata is known.
    #[inline]
    pub fn is_populated(&self) -> bool {
        self.metadata.is_some()
    }

    pub fn metadata(&self) -> Option<&RowSetMetaData> {
        self.metadata.as_ref()
    }

    /// Returns the metadata or an invalid-operation error if never populated.
    pub fn require_metadata(&self) -> Result<&RowSetMetaData> {
        self.metadata
            .as_ref()
            .ok_or_else(|| Error::invalid_operation("row set has not been populated"))
    }

    pub fn set_metadata(&mut self, metadata: RowSetMetaData) {
        self.metadata = Some(metadata);
    }

    /// Returns the column count (0 when unpopulated).
    pub fn column_count(&self) -> usize {
        self.metadata.as_ref().map_or(0, RowSetMetaData::column_count)
    }

    #[inline]
    pub fn show_deleted(&self) -> bool {
        self.show_deleted
    }

    pub fn set_show_deleted(&mut self, show: bool) {
        self.show_deleted = show;
    }

    /// Returns the number of rows, hidden ones included.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the number of rows navigation can reach.
    pub fn visible_count(&self) -> usize {
        if self.show_deleted {
            self.rows.len()
        } else {
            self.rows.iter().filter(|r| !r.is_deleted()).count()
        }
    }

    #[inline]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[inline]
    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    #[inline]
    pub fn row_mut(&mut self, index: usize) -> Option<&mut Row> {
        self.rows.get_mut(index)
    }

    /// Iterates visible rows with their physical indices.
    pub fn iter_visible(&self) -> impl Iterator<Item = (usize, &Row)> + '_ {
        let show_deleted = self.show_deleted;
        self.rows
            .iter()
            .enumerate()
            .filter(move |(_, r)| show_deleted || !r.is_deleted())
    }

    /// Checks that a value vector matches the column count.
    pub fn check_width(&self, values: &[Value]) -> Result<()> {
        let expected = self.require_metadata()?.column_count();
        if values.len() != expected {
            return Err(Error::invalid_operation(format!(
                "row has {} values, expected {}",
                values.len(),
                expected
            )));
        }
        Ok(())
    }

    /// Appends a row.
    pub fn push(&mut self, row: Row) -> Result<()> {
        self.check_width(row.current())?;
        self.rows.push(row);
        Ok(())
    }

    /// Inserts a row at a physical index (clamped to the end).
    pub fn insert(&mut self, index: usize, row: Row) -> Result<usize> {
        self.check_width(row.current())?;
        let index = index.min(self.rows.len());
        self.rows.insert(index, row);
        Ok(index)
    }

    /// Removes and returns the row at a physical index.
    pub fn remove(&mut self, index: usize) -> Option<Row> {
        if index < self.rows.len() {
            Some(self.rows.remove(index))
        } else {
            None
        }
    }

    /// Replaces every row.
    pub fn replace_rows(&mut self, rows: Vec<Row>) -> Result<()> {
        for row in &rows {
            self.check_width(row.current())?;
        }
        self.rows = rows;
        Ok(())
    }

    /// Drops all rows, keeping metadata.
    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Keeps only rows matching the predicate.
    pub fn retain<F: FnMut(&Row) -> bool>(&mut self, f: F) {
        self.rows.retain(f);
    }
}

impl Navigable for RowBuffer {
    #[inline]
    fn physical_len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    fn is_visible(&self, index: usize) -> bool {
        self.rows
            .get(index)
            .is_some_and(|r| self.show_deleted || !r.is_deleted())
    }
}
