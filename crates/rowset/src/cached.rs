//! The cached row set: a disconnected, editable copy of a query result.

use crate::paging::PageState;
use crate::properties::{check_page_size, RowSetProperties, TransactionIsolation};
use crate::sync::{OptimisticSyncProvider, SyncContext, SyncError, SyncProvider};
use rowset_core::schema::RowSetMetaData;
use rowset_core::{Error, Result, Row, RowSet, Value};
use rowset_reactive::{ListenerId, ListenerRegistry, RowSetEvent, RowSetListener};
use rowset_storage::{
    ChangeSummary, ChangeTracker, Compatibility, Cursor, CursorState, DataSource, Navigable,
    Query, RowBuffer,
};
use std::rc::Rc;

/// A disconnected, mutable cache of a tabular query result.
///
/// Rows are populated from a [`DataSource`] (or a `ResultSet`), navigated and
/// edited offline, and written back with [`accept_changes`](Self::accept_changes).
pub struct CachedRowSet {
    pub(crate) properties: RowSetProperties,
    pub(crate) buffer: RowBuffer,
    pub(crate) cursor: Cursor,
    pub(crate) paging: PageState,
    listeners: ListenerRegistry,
    provider: Rc<dyn SyncProvider>,
    closed: bool,
}

impl Default for CachedRowSet {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CachedRowSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedRowSet")
            .field("properties", &self.properties)
            .field("rows", &self.buffer.len())
            .field("cursor", &self.cursor)
            .field("listeners", &self.listeners.len())
            .field("closed", &self.closed)
            .finish()
    }
}

impl CachedRowSet {
    /// Creates an empty row set with default properties.
    pub fn new() -> Self {
        Self::with_properties(RowSetProperties::default())
    }

    /// Creates an empty row set with the given configuration.
    pub fn with_properties(properties: RowSetProperties) -> Self {
        let mut buffer = RowBuffer::new();
        buffer.set_show_deleted(properties.show_deleted);
        Self {
            cursor: Cursor::new(properties.compatibility),
            properties,
            buffer,
            paging: PageState::default(),
            listeners: ListenerRegistry::new(),
            provider: Rc::new(OptimisticSyncProvider),
            closed: false,
        }
    }

    /// Replaces the synchronization strategy.
    pub fn set_sync_provider(&mut self, provider: Rc<dyn SyncProvider>) {
        self.provider = provider;
    }

    pub fn sync_provider(&self) -> &Rc<dyn SyncProvider> {
        &self.provider
    }

    // ---------------------------------------------------------------------
    // Properties
    // ---------------------------------------------------------------------

    #[inline]
    pub fn properties(&self) -> &RowSetProperties {
        &self.properties
    }

    pub fn set_command(&mut self, query: Query) {
        self.properties.command = Some(query);
    }

    pub fn set_table_name(&mut self, table: impl Into<String>) {
        self.properties.table_name = Some(table.into());
    }

    pub fn table_name(&self) -> Option<&str> {
        self.properties.table_name.as_deref()
    }

    /// Sets the 1-based key columns used to re-read rows during synchronization.
    pub fn set_key_columns(&mut self, columns: &[usize]) -> Result<()> {
        self.check_columns(columns)?;
        self.properties.key_columns = columns.to_vec();
        Ok(())
    }

    #[inline]
    pub fn key_columns(&self) -> &[usize] {
        &self.properties.key_columns
    }

    /// Sets the 1-based match columns used when this row set joins others.
    pub fn set_match_columns(&mut self, columns: &[usize]) -> Result<()> {
        self.check_columns(columns)?;
        self.properties.match_columns = columns.to_vec();
        Ok(())
    }

    #[inline]
    pub fn match_columns(&self) -> &[usize] {
        &self.properties.match_columns
    }

    /// Sets match columns by name.
    pub fn set_match_column_names(&mut self, names: &[&str]) -> Result<()> {
        if let Some(meta) = self.buffer.metadata() {
            for name in names {
                meta.find_column(name)?;
            }
        }
        self.properties.match_column_names = names.iter().map(|n| n.to_string()).collect();
        Ok(())
    }

    #[inline]
    pub fn match_column_names(&self) -> &[String] {
        &self.properties.match_column_names
    }

    /// Clears match columns (both index and name forms).
    pub fn unset_match_columns(&mut self) {
        self.properties.match_columns.clear();
        self.properties.match_column_names.clear();
    }

    fn check_columns(&self, columns: &[usize]) -> Result<()> {
        match self.buffer.metadata() {
            Some(meta) => columns.iter().try_for_each(|&c| meta.check_index(c).map(|_| ())),
            None => match columns.iter().find(|&&c| c == 0) {
                Some(_) => Err(Error::invalid_column(0, 0)),
                None => Ok(()),
            },
        }
    }

    #[inline]
    pub fn page_size(&self) -> usize {
        self.properties.page_size
    }

    /// Sets the page size; the change applies to the next page fetch.
    pub fn set_page_size(&mut self, size: usize) -> Result<()> {
        check_page_size(size, self.properties.max_rows)?;
        self.properties.page_size = size;
        Ok(())
    }

    #[inline]
    pub fn max_rows(&self) -> usize {
        self.properties.max_rows
    }

    pub fn set_max_rows(&mut self, rows: usize) -> Result<()> {
        check_page_size(self.properties.page_size, rows)?;
        self.properties.max_rows = rows;
        Ok(())
    }

    #[inline]
    pub fn show_deleted(&self) -> bool {
        self.properties.show_deleted
    }

    /// Makes deleted rows visible to navigation (or hides them again).
    pub fn set_show_deleted(&mut self, show: bool) {
        self.properties.show_deleted = show;
        self.buffer.set_show_deleted(show);
    }

    #[inline]
    pub fn is_read_only(&self) -> bool {
        self.properties.read_only
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.properties.read_only = read_only;
    }

    pub fn set_query_timeout_secs(&mut self, secs: u64) {
        self.properties.query_timeout_secs = secs;
    }

    pub fn set_isolation(&mut self, isolation: TransactionIsolation) {
        self.properties.isolation = isolation;
    }

    pub fn set_commit_on_accept(&mut self, commit: bool) {
        self.properties.commit_on_accept = commit;
    }

    pub fn set_compatibility(&mut self, compatibility: Compatibility) {
        self.properties.compatibility = compatibility;
        self.cursor.set_compatibility(compatibility);
    }

    // ---------------------------------------------------------------------
    // Listeners
    // ---------------------------------------------------------------------

    /// Registers a listener; events are delivered in registration order.
    pub fn add_listener(&mut self, listener: Rc<dyn RowSetListener>) -> ListenerId {
        self.listeners.add(listener)
    }

    /// Registers a closure receiving every event.
    pub fn add_listener_fn<F>(&mut self, callback: F) -> ListenerId
    where
        F: Fn(&RowSetEvent) + 'static,
    {
        self.listeners.add_callback(callback)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Shared handle to the listener registry.
    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    pub(crate) fn notify(&self, event: RowSetEvent) {
        self.listeners.notify(&event);
    }

    // ---------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------

    pub(crate) fn check_open(&self) -> Result<()> {
        if self.closed {
            return Err(Error::invalid_operation("row set is closed"));
        }
        Ok(())
    }

    fn check_updatable(&self) -> Result<()> {
        self.check_open()?;
        if self.properties.read_only {
            return Err(Error::invalid_operation("row set is read-only"));
        }
        Ok(())
    }

    /// Returns true once metadata is known.
    #[inline]
    pub fn is_populated(&self) -> bool {
        self.buffer.is_populated()
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Clears every row, keeping metadata, properties and listeners.
    pub fn release(&mut self) -> Result<()> {
        self.check_open()?;
        self.buffer.clear();
        self.cursor.reset();
        self.paging = PageState::default();
        tracing::debug!("row set released");
        self.notify(RowSetEvent::row_set_changed());
        Ok(())
    }

    /// Closes the row set. Rows and listeners are dropped; metadata survives.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.buffer.clear();
        self.cursor.reset();
        self.paging = PageState::default();
        self.listeners.clear();
        self.closed = true;
        tracing::debug!("row set closed");
    }

    /// Deep copy of properties, metadata and rows, with a fresh cursor and no
    /// listeners.
    pub fn create_copy(&self) -> Result<CachedRowSet> {
        self.check_open()?;
        let mut copy = CachedRowSet::with_properties(self.properties.clone());
        copy.buffer = self.buffer.clone();
        copy.provider = Rc::clone(&self.provider);
        Ok(copy)
    }

    /// Installs metadata and rows, replacing the buffer and resetting the cursor.
    pub(crate) fn load(&mut self, metadata: RowSetMetaData, rows: Vec<Row>) -> Result<()> {
        let mut buffer = RowBuffer::with_metadata(metadata);
        buffer.set_show_deleted(self.properties.show_deleted);
        buffer.replace_rows(rows)?;
        if self.properties.table_name.is_none() {
            self.properties.table_name = buffer
                .metadata()
                .and_then(RowSetMetaData::table_name)
                .map(String::from);
        }
        self.buffer = buffer;
        self.cursor.reset();
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Row access helpers
    // ---------------------------------------------------------------------

    /// Physical index of the current row; fails off-row or in the insert row.
    fn current_index(&self) -> Result<usize> {
        if self.cursor.in_insert_row() {
            return Err(Error::invalid_cursor("cursor is on the insert row"));
        }
        self.cursor
            .current_index()
            .ok_or_else(|| Error::invalid_cursor("cursor is not on a row"))
    }

    fn current_row(&self) -> Result<&Row> {
        let index = self.current_index()?;
        self.buffer
            .row(index)
            .ok_or_else(|| Error::invalid_cursor("current row no longer exists"))
    }

    fn current_row_mut(&mut self) -> Result<&mut Row> {
        let index = self.current_index()?;
        self.buffer
            .row_mut(index)
            .ok_or_else(|| Error::invalid_cursor("current row no longer exists"))
    }

    /// Runs a navigation step and fires `CursorMoved` unless it failed.
    ///
    /// A step that returns false (off the rows, or `first` on an empty set)
    /// still succeeded and fires.
    fn navigate<F>(&mut self, step: F) -> Result<bool>
    where
        F: FnOnce(&mut Cursor, &RowBuffer) -> Result<bool>,
    {
        self.check_open()?;
        let moved = step(&mut self.cursor, &self.buffer)?;
        self.notify(RowSetEvent::cursor_moved(self.cursor.row(&self.buffer)));
        Ok(moved)
    }

    /// Returns the observable cursor state.
    pub fn cursor_state(&self) -> CursorState {
        self.cursor.state(&self.buffer)
    }

    pub fn is_before_first(&self) -> bool {
        self.cursor.is_before_first(&self.buffer)
    }

    pub fn is_after_last(&self) -> bool {
        self.cursor.is_after_last(&self.buffer)
    }

    pub fn is_first(&self) -> bool {
        self.cursor.is_first(&self.buffer)
    }

    pub fn is_last(&self) -> bool {
        self.cursor.is_last(&self.buffer)
    }

    /// All buffered rows in physical order, hidden ones included.
    #[inline]
    pub fn rows(&self) -> &[Row] {
        self.buffer.rows()
    }

    /// Visible rows with their physical indices.
    pub fn visible_rows(&self) -> impl Iterator<Item = (usize, &Row)> + '_ {
        self.buffer.iter_visible()
    }

    /// 1-based visible position of a physical row, if it is visible.
    pub fn visible_rank(&self, index: usize) -> Option<usize> {
        if !self.buffer.is_visible(index) {
            return None;
        }
        Some((0..index).filter(|&i| self.buffer.is_visible(i)).count() + 1)
    }

    /// Original values of the current row.
    pub fn original_row(&self) -> Result<Vec<Value>> {
        self.check_open()?;
        Ok(self.current_row()?.original().to_vec())
    }

    /// Whether a 1-based column of the current row has a staged or committed change.
    pub fn column_updated(&self, column: usize) -> Result<bool> {
        self.check_open()?;
        let index = self.buffer.require_metadata()?.check_index(column)?;
        Ok(self.current_row()?.column_changed(index))
    }

    /// Changed-row counters over the whole buffer.
    pub fn changes(&self) -> ChangeSummary {
        ChangeTracker::summarize(self.buffer.rows())
    }

    pub fn has_changes(&self) -> bool {
        ChangeTracker::has_changes(self.buffer.rows())
    }

    // ---------------------------------------------------------------------
    // Undo and baseline operations
    // ---------------------------------------------------------------------

    /// Removes the current row, which must have been inserted locally.
    pub fn undo_insert(&mut self) -> Result<()> {
        self.check_updatable()?;
        let index = self.current_index()?;
        let row = self.current_row()?;
        ChangeTracker::check_undo_insert(row)?;
        let position = self.cursor.row(&self.buffer);
        self.buffer.remove(index);
        self.cursor.on_row_removed(&self.buffer, index);
        self.notify(RowSetEvent::row_changed(position));
        Ok(())
    }

    /// Reverts committed edits of the current row. No-op unless it is updated.
    pub fn undo_update(&mut self) -> Result<()> {
        self.check_updatable()?;
        if ChangeTracker::undo_update(self.current_row_mut()?) {
            self.notify(RowSetEvent::row_changed(self.cursor.row(&self.buffer)));
        }
        Ok(())
    }

    /// Restores the current row if it is marked deleted.
    pub fn undo_delete(&mut self) -> Result<()> {
        self.check_updatable()?;
        if ChangeTracker::undo_delete(self.current_row_mut()?) {
            self.notify(RowSetEvent::row_changed(self.cursor.row(&self.buffer)));
        }
        Ok(())
    }

    /// Makes the current row's values its new originals.
    ///
    /// A deleted row is dropped from the buffer instead.
    pub fn set_original_row(&mut self) -> Result<()> {
        self.check_open()?;
        let index = self.current_index()?;
        let position = self.cursor.row(&self.buffer);
        if self.current_row()?.is_deleted() {
            self.buffer.remove(index);
            self.cursor.on_row_removed(&self.buffer, index);
        } else {
            self.current_row_mut()?.accept();
        }
        self.notify(RowSetEvent::row_changed(position));
        Ok(())
    }

    /// Makes every row's values its new originals; deleted rows are dropped.
    pub fn set_original(&mut self) -> Result<()> {
        self.check_open()?;
        self.buffer.retain(|row| !row.is_deleted());
        for i in 0..self.buffer.len() {
            if let Some(row) = self.buffer.row_mut(i) {
                row.accept();
            }
        }
        self.cursor.reset();
        self.notify(RowSetEvent::row_set_changed());
        Ok(())
    }

    /// Undoes every change in the buffer.
    ///
    /// Inserted rows are removed, updated rows reverted and deleted rows restored.
    pub fn restore_original(&mut self) -> Result<()> {
        self.check_updatable()?;
        self.buffer.retain(|row| !row.is_inserted());
        for i in 0..self.buffer.len() {
            if let Some(row) = self.buffer.row_mut(i) {
                row.clear_deleted();
                row.revert();
            }
        }
        self.cursor.reset();
        self.notify(RowSetEvent::row_set_changed());
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Synchronization
    // ---------------------------------------------------------------------

    /// Writes buffered changes back to the source.
    ///
    /// Conflicting rows are left unapplied and reported through
    /// [`SyncError::Conflict`]; every other change stays applied.
    pub fn accept_changes(&mut self, source: &mut dyn DataSource) -> std::result::Result<(), SyncError> {
        self.check_updatable()?;
        if self.cursor.in_insert_row() {
            return Err(Error::invalid_cursor("cursor is on the insert row").into());
        }
        let metadata = self.buffer.require_metadata()?;
        let table = self
            .properties
            .table_name
            .clone()
            .ok_or_else(|| Error::invalid_operation("no table name set for synchronization"))?;
        let columns = metadata.columns().iter().map(|c| c.name().to_string()).collect();
        let key_columns = if self.properties.key_columns.is_empty() {
            (0..metadata.column_count()).collect()
        } else {
            self.properties
                .key_columns
                .iter()
                .map(|&c| metadata.check_index(c))
                .collect::<Result<Vec<_>>>()?
        };
        let context = SyncContext {
            table,
            columns,
            key_columns,
            commit_on_accept: self.properties.commit_on_accept,
        };

        let provider = Rc::clone(&self.provider);
        let result = provider.synchronize(&mut self.buffer, &context, source);
        self.cursor.reset();
        self.notify(RowSetEvent::row_set_changed());
        result
    }
}

impl RowSet for CachedRowSet {
    fn metadata(&self) -> Result<&RowSetMetaData> {
        self.buffer.require_metadata()
    }

    fn size(&self) -> usize {
        self.buffer.visible_count()
    }

    fn absolute(&mut self, row: i64) -> Result<bool> {
        self.navigate(|cursor, buffer| cursor.absolute(buffer, row))
    }

    fn relative(&mut self, rows: i64) -> Result<bool> {
        self.navigate(|cursor, buffer| cursor.relative(buffer, rows))
    }

    fn next(&mut self) -> Result<bool> {
        self.navigate(|cursor, buffer| cursor.next(buffer))
    }

    fn previous(&mut self) -> Result<bool> {
        self.navigate(|cursor, buffer| cursor.previous(buffer))
    }

    fn first(&mut self) -> Result<bool> {
        self.navigate(|cursor, buffer| cursor.first(buffer))
    }

    fn last(&mut self) -> Result<bool> {
        self.navigate(|cursor, buffer| cursor.last(buffer))
    }

    fn before_first(&mut self) -> Result<()> {
        self.navigate(|cursor, _| cursor.before_first().map(|_| false))
            .map(|_| ())
    }

    fn after_last(&mut self) -> Result<()> {
        self.navigate(|cursor, _| cursor.after_last().map(|_| false))
            .map(|_| ())
    }

    fn row(&self) -> Result<usize> {
        self.check_open()?;
        Ok(self.cursor.row(&self.buffer))
    }

    fn get(&self, column: usize) -> Result<&Value> {
        self.check_open()?;
        let index = self.buffer.require_metadata()?.check_index(column)?;
        if let Some(slot) = self.cursor.insert_slot() {
            return slot
                .get(index)
                .ok_or_else(|| Error::invalid_column(column, self.buffer.column_count()));
        }
        self.current_row()?
            .get(index)
            .ok_or_else(|| Error::invalid_column(column, self.buffer.column_count()))
    }

    fn update(&mut self, column: usize, value: Value) -> Result<()> {
        self.check_updatable()?;
        let meta = self.buffer.require_metadata()?;
        let index = meta.check_index(column)?;
        let value = value.convert_to(meta.column_type(column)?)?;
        if let Some(slot) = self.cursor.insert_slot_mut() {
            slot.set(index, value);
            return Ok(());
        }
        let row = self.current_row_mut()?;
        if row.is_deleted() {
            return Err(Error::invalid_operation("cannot update a deleted row"));
        }
        row.stage(index, value);
        Ok(())
    }

    fn update_row(&mut self) -> Result<()> {
        self.check_updatable()?;
        if ChangeTracker::commit_update(self.current_row_mut()?)? {
            self.notify(RowSetEvent::row_changed(self.cursor.row(&self.buffer)));
        }
        Ok(())
    }

    fn cancel_row_updates(&mut self) -> Result<()> {
        self.check_updatable()?;
        self.current_row_mut()?.discard_pending();
        Ok(())
    }

    fn delete_row(&mut self) -> Result<()> {
        self.check_updatable()?;
        let position = self.cursor.row(&self.buffer);
        if ChangeTracker::delete(self.current_row_mut()?) {
            self.notify(RowSetEvent::row_changed(position));
        }
        Ok(())
    }

    fn insert_row(&mut self) -> Result<()> {
        self.check_updatable()?;
        let meta = self.buffer.require_metadata()?;
        let slot = self
            .cursor
            .insert_slot()
            .ok_or_else(|| Error::invalid_cursor("insert_row needs the cursor on the insert row"))?;
        for (i, column) in meta.columns().iter().enumerate() {
            let missing = !slot.is_assigned(i) || slot.get(i).map_or(true, Value::is_null);
            if !column.is_nullable() && missing {
                return Err(Error::invalid_operation(format!(
                    "column {} must be set before insert",
                    column.name()
                )));
            }
        }
        let row = Row::inserted(slot.values().to_vec());
        let index = self.buffer.insert(slot.anchor(), row)?;
        if let Some(slot) = self.cursor.insert_slot_mut() {
            slot.advance();
        }
        tracing::trace!(index, "row inserted");
        let position = self.visible_rank(index).unwrap_or(0);
        self.notify(RowSetEvent::row_changed(position));
        Ok(())
    }

    fn move_to_insert_row(&mut self) -> Result<()> {
        self.check_updatable()?;
        let columns = self.buffer.require_metadata()?.column_count();
        self.cursor.move_to_insert_row(&self.buffer, columns);
        Ok(())
    }

    fn move_to_current_row(&mut self) -> Result<()> {
        self.check_open()?;
        self.cursor.move_to_current_row();
        Ok(())
    }

    fn row_inserted(&self) -> Result<bool> {
        self.check_open()?;
        Ok(self.current_row()?.is_inserted())
    }

    fn row_updated(&self) -> Result<bool> {
        self.check_open()?;
        Ok(self.current_row()?.is_updated())
    }

    fn row_deleted(&self) -> Result<bool> {
        self.check_open()?;
        Ok(self.current_row().map(Row::is_deleted).unwrap_or(false))
    }
}
