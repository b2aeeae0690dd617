//! Join view over independently tracked row sets.
//!
//! The view owns its participants. Composed rows are re-derived after every
//! change made through the view, and each composed row belongs to the row of
//! its first participant (the owner). Edits reach the owner only; sibling
//! participants are never touched, even when they share a match value.

mod hash;
mod kind;

pub use hash::{compose, Composition, JoinInput};
pub use kind::JoinKind;

use rowset::schema::RowSetMetaData;
use rowset::{CachedRowSet, CursorState, Error, ResultSet, Result, Row, RowSet, Value};
use rowset_storage::{Compatibility, Cursor, Navigable};

/// A row set taking part in a join, with its 1-based match column.
#[derive(Debug)]
pub struct Participant {
    row_set: CachedRowSet,
    match_column: usize,
}

impl Participant {
    #[inline]
    pub fn row_set(&self) -> &CachedRowSet {
        &self.row_set
    }

    #[inline]
    pub fn match_column(&self) -> usize {
        self.match_column
    }

    fn width(&self) -> usize {
        self.row_set.metadata().map_or(0, RowSetMetaData::column_count)
    }

    /// `table.column` form of the match column.
    fn qualified_match_column(&self) -> Result<String> {
        let table = self.row_set.table_name().ok_or_else(|| {
            Error::invalid_operation("participant has no table name for a where clause")
        })?;
        let column = self.row_set.metadata()?.column_name(self.match_column)?;
        Ok(format!("{}.{}", table, column))
    }
}

/// Composed rows; every entry is visible.
#[derive(Clone, Debug, Default)]
struct ComposedRows(Vec<Composition>);

impl Navigable for ComposedRows {
    fn physical_len(&self) -> usize {
        self.0.len()
    }

    fn is_visible(&self, index: usize) -> bool {
        index < self.0.len()
    }
}

/// A cursor over the inner equality join of several cached row sets.
#[derive(Debug, Default)]
pub struct JoinView {
    participants: Vec<Participant>,
    metadata: Option<RowSetMetaData>,
    rows: ComposedRows,
    cursor: Cursor,
    kind: JoinKind,
    /// Composed row the cursor left for the insert row.
    insert_origin: Option<Composition>,
}

impl JoinView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Follows `compatibility` for relative moves from the edges.
    pub fn with_compatibility(compatibility: Compatibility) -> Self {
        Self {
            cursor: Cursor::new(compatibility),
            ..Self::default()
        }
    }

    // ---------------------------------------------------------------------
    // Participants
    // ---------------------------------------------------------------------

    /// Adds a participant joined on its 1-based `column`.
    pub fn add_row_set(&mut self, row_set: CachedRowSet, column: usize) -> Result<()> {
        if !row_set.is_populated() {
            return Err(Error::invalid_operation(
                "a join participant must be populated",
            ));
        }
        let data_type = row_set.metadata()?.column_type(column)?;
        if !data_type.is_matchable() {
            return Err(Error::unsupported(format!(
                "joining on a {:?} column",
                data_type
            )));
        }
        self.participants.push(Participant {
            row_set,
            match_column: column,
        });
        self.metadata = self
            .participants
            .iter()
            .filter_map(|p| p.row_set.metadata().ok())
            .fold(None, |acc: Option<RowSetMetaData>, meta| match acc {
                Some(acc) => Some(acc.concat(meta)),
                None => Some(meta.clone()),
            });
        self.recompute();
        self.cursor.reset();
        tracing::debug!(
            participants = self.participants.len(),
            rows = self.rows.0.len(),
            "join participant added"
        );
        Ok(())
    }

    /// Adds a participant joined on the column called `name`.
    pub fn add_row_set_by_name(&mut self, row_set: CachedRowSet, name: &str) -> Result<()> {
        if !row_set.is_populated() {
            return Err(Error::invalid_operation(
                "a join participant must be populated",
            ));
        }
        let column = row_set.metadata()?.find_column(name)?;
        self.add_row_set(row_set, column)
    }

    /// Adds a participant joined on its own designated column: the first match
    /// column if any, else the first key column.
    pub fn add_designated(&mut self, row_set: CachedRowSet) -> Result<()> {
        if !row_set.is_populated() {
            return Err(Error::invalid_operation(
                "a join participant must be populated",
            ));
        }
        let column = match (
            row_set.match_columns().first(),
            row_set.match_column_names().first(),
            row_set.key_columns().first(),
        ) {
            (Some(&column), _, _) => column,
            (None, Some(name), _) => row_set.metadata()?.find_column(name)?,
            (None, None, Some(&column)) => column,
            (None, None, None) => {
                return Err(Error::invalid_operation(
                    "participant has no match or key column",
                ))
            }
        };
        self.add_row_set(row_set, column)
    }

    #[inline]
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn row_set(&self, index: usize) -> Option<&CachedRowSet> {
        self.participants.get(index).map(Participant::row_set)
    }

    /// Hands the participants back, in insertion order.
    pub fn into_row_sets(self) -> Vec<CachedRowSet> {
        self.participants.into_iter().map(|p| p.row_set).collect()
    }

    /// Table names of the participants, in insertion order.
    pub fn row_set_names(&self) -> Vec<Option<&str>> {
        self.participants
            .iter()
            .map(|p| p.row_set.table_name())
            .collect()
    }

    // ---------------------------------------------------------------------
    // Join kind
    // ---------------------------------------------------------------------

    #[inline]
    pub fn join_type(&self) -> JoinKind {
        self.kind
    }

    /// Selects the join kind. Only inner joins are provided.
    pub fn set_join_type(&mut self, kind: JoinKind) -> Result<()> {
        if !kind.is_supported() {
            return Err(Error::unsupported(kind.to_string()));
        }
        self.kind = kind;
        Ok(())
    }

    pub fn supports_inner_join(&self) -> bool {
        JoinKind::Inner.is_supported()
    }

    pub fn supports_left_outer_join(&self) -> bool {
        JoinKind::LeftOuter.is_supported()
    }

    pub fn supports_right_outer_join(&self) -> bool {
        JoinKind::RightOuter.is_supported()
    }

    pub fn supports_full_join(&self) -> bool {
        JoinKind::FullOuter.is_supported()
    }

    pub fn supports_cross_join(&self) -> bool {
        JoinKind::Cross.is_supported()
    }

    // ---------------------------------------------------------------------
    // Derived forms
    // ---------------------------------------------------------------------

    /// Describes the join as a where clause, e.g. `WHERE a.id = b.id`.
    ///
    /// Every participant is compared with the first one. Fails with fewer than
    /// two participants or when a participant has no table name.
    pub fn where_clause(&self) -> Result<String> {
        if self.participants.len() < 2 {
            return Err(Error::invalid_operation(
                "a where clause needs at least two participants",
            ));
        }
        let columns = self
            .participants
            .iter()
            .map(Participant::qualified_match_column)
            .collect::<Result<Vec<_>>>()?;
        let (owner, others) = match columns.split_first() {
            Some(split) => split,
            None => return Err(Error::invalid_operation("join view has no participants")),
        };
        let terms: Vec<String> = others
            .iter()
            .map(|other| format!("{} = {}", owner, other))
            .collect();
        Ok(format!("WHERE {}", terms.join(" AND ")))
    }

    /// Copies the composed rows into a new, unmodified cached row set.
    pub fn to_cached_row_set(&self) -> Result<CachedRowSet> {
        let metadata = self.metadata()?.clone();
        let rows = self
            .rows
            .0
            .iter()
            .map(|composition| self.composed_values(composition))
            .collect();
        let mut row_set = CachedRowSet::new();
        row_set.populate(ResultSet::new(metadata, rows)?, 1)?;
        Ok(row_set)
    }

    pub fn cursor_state(&self) -> CursorState {
        self.cursor.state(&self.rows)
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn recompute(&mut self) {
        let inputs: Vec<JoinInput<'_>> = self
            .participants
            .iter()
            .map(|p| JoinInput {
                row_set: &p.row_set,
                column: p.match_column - 1,
            })
            .collect();
        self.rows = ComposedRows(compose(&inputs));
        tracing::trace!(rows = self.rows.0.len(), "join recomputed");
    }

    fn composed_values(&self, composition: &[usize]) -> Vec<Value> {
        self.participants
            .iter()
            .zip(composition)
            .flat_map(|(p, &idx)| {
                p.row_set
                    .rows()
                    .get(idx)
                    .map(|row| row.current().to_vec())
                    .unwrap_or_default()
            })
            .collect()
    }

    fn current(&self) -> Result<&Composition> {
        if self.cursor.in_insert_row() {
            return Err(Error::invalid_cursor("cursor is on the insert row"));
        }
        self.cursor
            .current_index()
            .and_then(|i| self.rows.0.get(i))
            .ok_or_else(|| Error::invalid_cursor("cursor is not on a row"))
    }

    /// Owning participant's row under the cursor.
    fn owner_row(&self) -> Result<&Row> {
        let idx = self.current()?.first().copied();
        idx.and_then(|i| self.participants.first()?.row_set.rows().get(i))
            .ok_or_else(|| Error::invalid_cursor("composed row has no owner"))
    }

    fn owner_mut(&mut self) -> Result<&mut CachedRowSet> {
        self.participants
            .first_mut()
            .map(|p| &mut p.row_set)
            .ok_or_else(|| Error::invalid_operation("join view has no participants"))
    }

    /// Maps a 1-based view column to (participant, 1-based participant column).
    fn locate(&self, column: usize) -> Result<(usize, usize)> {
        let metadata = self.metadata()?;
        metadata.check_index(column)?;
        let count = metadata.column_count();
        let mut rest = column;
        for (i, participant) in self.participants.iter().enumerate() {
            let width = participant.width();
            if rest <= width {
                return Ok((i, rest));
            }
            rest -= width;
        }
        Err(Error::invalid_column(column, count))
    }

    fn check_owner_column(participant: usize) -> Result<()> {
        if participant != 0 {
            return Err(Error::unsupported(
                "updating a column of a non-owning join participant",
            ));
        }
        Ok(())
    }

    /// Puts the owner's cursor on the owning row of the current composed row.
    fn seek_owner(&mut self) -> Result<()> {
        let idx = self
            .current()?
            .first()
            .copied()
            .ok_or_else(|| Error::invalid_cursor("composed row has no owner"))?;
        let owner = self.owner_mut()?;
        let rank = owner
            .visible_rank(idx)
            .ok_or_else(|| Error::invalid_cursor("owning row is no longer visible"))?;
        owner.absolute(rank as i64)?;
        Ok(())
    }

    /// Moves to the 1-based composed position `row`, clamped to the size.
    fn reposition(&mut self, row: usize) -> Result<()> {
        match row.min(self.rows.0.len()) {
            0 => self.cursor.before_first(),
            n => self.cursor.absolute(&self.rows, n as i64).map(|_| ()),
        }
    }
}

impl RowSet for JoinView {
    fn metadata(&self) -> Result<&RowSetMetaData> {
        self.metadata
            .as_ref()
            .ok_or_else(|| Error::invalid_operation("join view has no participants"))
    }

    fn size(&self) -> usize {
        self.rows.0.len()
    }

    fn absolute(&mut self, row: i64) -> Result<bool> {
        self.cursor.absolute(&self.rows, row)
    }

    fn relative(&mut self, rows: i64) -> Result<bool> {
        self.cursor.relative(&self.rows, rows)
    }

    fn next(&mut self) -> Result<bool> {
        self.cursor.next(&self.rows)
    }

    fn previous(&mut self) -> Result<bool> {
        self.cursor.previous(&self.rows)
    }

    fn first(&mut self) -> Result<bool> {
        self.cursor.first(&self.rows)
    }

    fn last(&mut self) -> Result<bool> {
        self.cursor.last(&self.rows)
    }

    fn before_first(&mut self) -> Result<()> {
        self.cursor.before_first()
    }

    fn after_last(&mut self) -> Result<()> {
        self.cursor.after_last()
    }

    fn row(&self) -> Result<usize> {
        Ok(self.cursor.row(&self.rows))
    }

    fn get(&self, column: usize) -> Result<&Value> {
        let (participant, local) = self.locate(column)?;
        if self.cursor.in_insert_row() {
            Self::check_owner_column(participant)?;
            return self
                .participants
                .first()
                .ok_or_else(|| Error::invalid_operation("join view has no participants"))?
                .row_set
                .get(local);
        }
        let composition = self.current()?;
        composition
            .get(participant)
            .and_then(|&idx| self.participants.get(participant)?.row_set.rows().get(idx))
            .and_then(|row| row.get(local - 1))
            .ok_or_else(|| Error::invalid_cursor("composed row no longer exists"))
    }

    fn update(&mut self, column: usize, value: Value) -> Result<()> {
        let (participant, local) = self.locate(column)?;
        Self::check_owner_column(participant)?;
        if !self.cursor.in_insert_row() {
            self.seek_owner()?;
        }
        self.owner_mut()?.update(local, value)
    }

    fn update_row(&mut self) -> Result<()> {
        let position = self.cursor.row(&self.rows);
        self.seek_owner()?;
        self.owner_mut()?.update_row()?;
        // The match value may have changed.
        self.recompute();
        self.reposition(position)
    }

    fn cancel_row_updates(&mut self) -> Result<()> {
        self.seek_owner()?;
        self.owner_mut()?.cancel_row_updates()
    }

    fn delete_row(&mut self) -> Result<()> {
        let position = self.cursor.row(&self.rows);
        self.seek_owner()?;
        self.owner_mut()?.delete_row()?;
        let before = self.rows.0.len();
        self.recompute();
        tracing::debug!(
            before,
            after = self.rows.0.len(),
            "composed row deleted through owner"
        );
        if self.rows.0.len() < before {
            self.reposition(position.saturating_sub(1))
        } else {
            self.reposition(position)
        }
    }

    fn insert_row(&mut self) -> Result<()> {
        if !self.cursor.in_insert_row() {
            return Err(Error::invalid_cursor(
                "insert_row needs the cursor on the insert row",
            ));
        }
        self.owner_mut()?.insert_row()?;
        self.recompute();
        Ok(())
    }

    fn move_to_insert_row(&mut self) -> Result<()> {
        if self.cursor.in_insert_row() {
            return self.owner_mut()?.move_to_insert_row();
        }
        let origin = self.current().ok().cloned();
        if origin.is_some() {
            self.seek_owner()?;
        }
        self.owner_mut()?.move_to_insert_row()?;
        self.cursor.move_to_insert_row(&self.rows, 0);
        self.insert_origin = origin;
        Ok(())
    }

    fn move_to_current_row(&mut self) -> Result<()> {
        if !self.cursor.in_insert_row() {
            return Ok(());
        }
        self.owner_mut()?.move_to_current_row()?;
        self.cursor.move_to_current_row();
        // Inserted rows reorder the composition; find the row we left.
        if let Some(origin) = self.insert_origin.take() {
            let found = self
                .rows
                .0
                .iter()
                .position(|c| *c == origin)
                .or_else(|| self.rows.0.iter().position(|c| c.first() == origin.first()));
            match found {
                Some(idx) => {
                    self.cursor.absolute(&self.rows, idx as i64 + 1)?;
                }
                None => self.cursor.reset(),
            }
        }
        Ok(())
    }

    fn row_inserted(&self) -> Result<bool> {
        self.owner_row().map(Row::is_inserted)
    }

    fn row_updated(&self) -> Result<bool> {
        self.owner_row().map(Row::is_updated)
    }

    fn row_deleted(&self) -> Result<bool> {
        self.owner_row().map(Row::is_deleted)
    }
}
