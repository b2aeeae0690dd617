//! Cursor state machine over a row buffer.
//!
//! The cursor stores a *physical* index into the buffer and does all positional
//! arithmetic over the visible subsequence (rows hidden by the visibility
//! filter are skipped). Keeping the physical index means a row that becomes
//! hidden while the cursor is on it (a delete with `show_deleted == false`)
//! stays current for status queries until the cursor moves. Such a row is
//! reported at the rank of the visible row before it.
//!
//! While the insert row is active, every navigation call fails.

use rowset_core::{Error, Result, Value};
use serde::{Deserialize, Serialize};

/// Visibility view the cursor navigates over.
pub trait Navigable {
    /// Number of rows, hidden ones included.
    fn physical_len(&self) -> usize;

    /// Whether the row at a physical index takes part in positioning.
    fn is_visible(&self, index: usize) -> bool;
}

/// Which of two historical cursor/paging behaviors to follow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Compatibility {
    /// `relative` fails from before-first/after-last; the first `next_page`
    /// after populate reports the already loaded page.
    #[default]
    Strict,
    /// `relative` steps like `next`/`previous`; the first `next_page` advances.
    Lenient,
}

/// Physical cursor position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Position {
    BeforeFirst,
    At(usize),
    AfterLast,
}

/// Observable cursor state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CursorState {
    BeforeFirst,
    /// 1-based visible position.
    Positioned(usize),
    AfterLast,
    InsertRow,
}

/// The detached insert-row staging slot.
#[derive(Clone, Debug)]
pub struct InsertSlot {
    values: Vec<Value>,
    assigned: Vec<bool>,
    /// Position to restore on `move_to_current_row`.
    saved: Position,
    /// Physical index the next inserted row goes to.
    anchor: usize,
}

impl InsertSlot {
    fn new(column_count: usize, saved: Position, anchor: usize) -> Self {
        Self {
            values: vec![Value::Null; column_count],
            assigned: vec![false; column_count],
            saved,
            anchor,
        }
    }

    /// Returns the staged value of a 0-based column.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Stages a value for a 0-based column.
    pub fn set(&mut self, index: usize, value: Value) -> bool {
        match self.values.get_mut(index) {
            Some(slot) => {
                *slot = value;
                self.assigned[index] = true;
                true
            }
            None => false,
        }
    }

    /// Whether a 0-based column was assigned since the last insert.
    pub fn is_assigned(&self, index: usize) -> bool {
        self.assigned.get(index).copied().unwrap_or(false)
    }

    /// Returns the staged values.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Physical index the next insert lands at.
    pub fn anchor(&self) -> usize {
        self.anchor
    }

    /// Clears staged values after an insert and moves the anchor past it.
    pub fn advance(&mut self) {
        self.values.iter_mut().for_each(|v| *v = Value::Null);
        self.assigned.iter_mut().for_each(|a| *a = false);
        self.anchor += 1;
    }
}

/// Cursor over a [`Navigable`] buffer.
#[derive(Clone, Debug)]
pub struct Cursor {
    position: Position,
    insert: Option<InsertSlot>,
    compatibility: Compatibility,
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new(Compatibility::Strict)
    }
}

fn count_visible<N: Navigable + ?Sized>(nav: &N) -> usize {
    (0..nav.physical_len()).filter(|&i| nav.is_visible(i)).count()
}

/// Physical index of the k-th (1-based) visible row.
fn nth_visible<N: Navigable + ?Sized>(nav: &N, k: usize) -> Option<usize> {
    if k == 0 {
        return None;
    }
    (0..nav.physical_len()).filter(|&i| nav.is_visible(i)).nth(k - 1)
}

/// Number of visible rows strictly before a physical index.
fn visible_before<N: Navigable + ?Sized>(nav: &N, index: usize) -> usize {
    (0..index.min(nav.physical_len()))
        .filter(|&i| nav.is_visible(i))
        .count()
}

impl Cursor {
    /// Creates a cursor before the first row.
    pub fn new(compatibility: Compatibility) -> Self {
        Self {
            position: Position::BeforeFirst,
            insert: None,
            compatibility,
        }
    }

    /// Returns the compatibility mode.
    pub fn compatibility(&self) -> Compatibility {
        self.compatibility
    }

    /// Sets the compatibility mode.
    pub fn set_compatibility(&mut self, compatibility: Compatibility) {
        self.compatibility = compatibility;
    }

    /// Returns the physical position (the saved one while in the insert row).
    pub fn position(&self) -> Position {
        match &self.insert {
            Some(slot) => slot.saved,
            None => self.position,
        }
    }

    /// Returns the physical index of the current row, if on one.
    pub fn current_index(&self) -> Option<usize> {
        match (&self.insert, self.position) {
            (None, Position::At(i)) => Some(i),
            _ => None,
        }
    }

    /// Returns the observable state.
    pub fn state<N: Navigable + ?Sized>(&self, nav: &N) -> CursorState {
        if self.insert.is_some() {
            return CursorState::InsertRow;
        }
        match self.position {
            Position::BeforeFirst => CursorState::BeforeFirst,
            Position::AfterLast => CursorState::AfterLast,
            Position::At(i) if nav.is_visible(i) => {
                CursorState::Positioned(visible_before(nav, i) + 1)
            }
            Position::At(i) => match visible_before(nav, i) {
                0 => CursorState::BeforeFirst,
                rank => CursorState::Positioned(rank),
            },
        }
    }

    /// Returns the 1-based visible position, or 0 when not on a visible row.
    pub fn row<N: Navigable + ?Sized>(&self, nav: &N) -> usize {
        match self.current_index() {
            Some(i) if nav.is_visible(i) => visible_before(nav, i) + 1,
            _ => 0,
        }
    }

    /// Returns true while the insert row is active.
    #[inline]
    pub fn in_insert_row(&self) -> bool {
        self.insert.is_some()
    }

    pub fn insert_slot(&self) -> Option<&InsertSlot> {
        self.insert.as_ref()
    }

    pub fn insert_slot_mut(&mut self) -> Option<&mut InsertSlot> {
        self.insert.as_mut()
    }

    fn check_not_inserting(&self) -> Result<()> {
        if self.insert.is_some() {
            return Err(Error::invalid_cursor(
                "cursor is on the insert row; move to the current row first",
            ));
        }
        Ok(())
    }

    fn land<N: Navigable + ?Sized>(&mut self, nav: &N, target: i64) -> bool {
        let count = count_visible(nav) as i64;
        if target < 1 {
            self.position = Position::BeforeFirst;
            false
        } else if target > count {
            self.position = Position::AfterLast;
            false
        } else {
            match nth_visible(nav, target as usize) {
                Some(i) => {
                    self.position = Position::At(i);
                    true
                }
                None => {
                    self.position = Position::AfterLast;
                    false
                }
            }
        }
    }

    /// Moves to the n-th visible row; negative values count from the end.
    pub fn absolute<N: Navigable + ?Sized>(&mut self, nav: &N, row: i64) -> Result<bool> {
        self.check_not_inserting()?;
        if row == 0 {
            return Err(Error::invalid_cursor("absolute(0) is not a valid position"));
        }
        let count = count_visible(nav) as i64;
        if row > 0 {
            Ok(self.land(nav, row))
        } else {
            let target = (count + 1).saturating_add(row);
            if target < 1 {
                self.position = Position::BeforeFirst;
                return Ok(false);
            }
            Ok(self.land(nav, target))
        }
    }

    /// Moves by `rows` visible rows from the current row.
    pub fn relative<N: Navigable + ?Sized>(&mut self, nav: &N, rows: i64) -> Result<bool> {
        self.check_not_inserting()?;
        match self.position {
            Position::BeforeFirst | Position::AfterLast
                if self.compatibility == Compatibility::Strict =>
            {
                Err(Error::invalid_cursor(
                    "relative() needs a current row; cursor is before first or after last",
                ))
            }
            Position::BeforeFirst => {
                if rows > 0 {
                    Ok(self.land(nav, rows))
                } else {
                    Ok(false)
                }
            }
            Position::AfterLast => {
                if rows < 0 {
                    let count = count_visible(nav) as i64;
                    Ok(self.land(nav, (count + 1).saturating_add(rows)))
                } else {
                    Ok(false)
                }
            }
            Position::At(i) => {
                let before = visible_before(nav, i) as i64;
                let target = if nav.is_visible(i) {
                    if rows == 0 {
                        return Ok(true);
                    }
                    (before + 1).saturating_add(rows)
                } else if rows == 0 {
                    return Ok(false);
                } else if rows > 0 {
                    // A hidden row sits between its visible neighbours.
                    before.saturating_add(rows)
                } else {
                    (before + 1).saturating_add(rows)
                };
                Ok(self.land(nav, target))
            }
        }
    }

    /// Moves to the next visible row.
    pub fn next<N: Navigable + ?Sized>(&mut self, nav: &N) -> Result<bool> {
        self.check_not_inserting()?;
        let start = match self.position {
            Position::BeforeFirst => 0,
            Position::At(i) => i + 1,
            Position::AfterLast => return Ok(false),
        };
        match (start..nav.physical_len()).find(|&i| nav.is_visible(i)) {
            Some(i) => {
                self.position = Position::At(i);
                Ok(true)
            }
            None => {
                self.position = Position::AfterLast;
                Ok(false)
            }
        }
    }

    /// Moves to the previous visible row.
    pub fn previous<N: Navigable + ?Sized>(&mut self, nav: &N) -> Result<bool> {
        self.check_not_inserting()?;
        let end = match self.position {
            Position::BeforeFirst => return Ok(false),
            Position::At(i) => i,
            Position::AfterLast => nav.physical_len(),
        };
        match (0..end).rev().find(|&i| nav.is_visible(i)) {
            Some(i) => {
                self.position = Position::At(i);
                Ok(true)
            }
            None => {
                self.position = Position::BeforeFirst;
                Ok(false)
            }
        }
    }

    /// Moves to the first visible row; false (and no move) when there is none.
    pub fn first<N: Navigable + ?Sized>(&mut self, nav: &N) -> Result<bool> {
        self.check_not_inserting()?;
        match nth_visible(nav, 1) {
            Some(i) => {
                self.position = Position::At(i);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Moves to the last visible row; false (and no move) when there is none.
    pub fn last<N: Navigable + ?Sized>(&mut self, nav: &N) -> Result<bool> {
        self.check_not_inserting()?;
        match (0..nav.physical_len()).rev().find(|&i| nav.is_visible(i)) {
            Some(i) => {
                self.position = Position::At(i);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn before_first(&mut self) -> Result<()> {
        self.check_not_inserting()?;
        self.position = Position::BeforeFirst;
        Ok(())
    }

    pub fn after_last(&mut self) -> Result<()> {
        self.check_not_inserting()?;
        self.position = Position::AfterLast;
        Ok(())
    }

    /// True when before the first row of a non-empty buffer.
    pub fn is_before_first<N: Navigable + ?Sized>(&self, nav: &N) -> bool {
        self.state(nav) == CursorState::BeforeFirst && count_visible(nav) > 0
    }

    /// True when after the last row of a non-empty buffer.
    pub fn is_after_last<N: Navigable + ?Sized>(&self, nav: &N) -> bool {
        self.insert.is_none() && self.position == Position::AfterLast && count_visible(nav) > 0
    }

    pub fn is_first<N: Navigable + ?Sized>(&self, nav: &N) -> bool {
        self.row(nav) == 1
    }

    pub fn is_last<N: Navigable + ?Sized>(&self, nav: &N) -> bool {
        let row = self.row(nav);
        row != 0 && row == count_visible(nav)
    }

    /// Enters the insert row, remembering the current position.
    ///
    /// Re-entering while already there keeps the staged values.
    pub fn move_to_insert_row<N: Navigable + ?Sized>(&mut self, nav: &N, column_count: usize) {
        if self.insert.is_some() {
            return;
        }
        let anchor = match self.position {
            Position::BeforeFirst => 0,
            Position::At(i) => i + 1,
            Position::AfterLast => nav.physical_len(),
        };
        self.insert = Some(InsertSlot::new(column_count, self.position, anchor));
    }

    /// Leaves the insert row and restores the saved position.
    ///
    /// Returns false when the insert row was not active.
    pub fn move_to_current_row(&mut self) -> bool {
        match self.insert.take() {
            Some(slot) => {
                self.position = slot.saved;
                true
            }
            None => false,
        }
    }

    /// Adjusts the position after a row was removed from the buffer.
    ///
    /// When the current row itself is removed, the cursor falls back to the
    /// closest visible row before it (or before-first), so `next` continues
    /// with the row that followed.
    pub fn on_row_removed<N: Navigable + ?Sized>(&mut self, nav: &N, removed: usize) {
        let adjust = |pos: Position| match pos {
            Position::At(i) if i > removed => Position::At(i - 1),
            Position::At(i) if i == removed => (0..removed)
                .rev()
                .find(|&j| nav.is_visible(j))
                .map(Position::At)
                .unwrap_or(Position::BeforeFirst),
            other => other,
        };
        self.position = adjust(self.position);
        if let Some(slot) = self.insert.as_mut() {
            slot.saved = adjust(slot.saved);
            if slot.anchor > removed {
                slot.anchor -= 1;
            }
        }
    }

    /// Resets to before-first and drops any insert row.
    pub fn reset(&mut self) {
        self.position = Position::BeforeFirst;
        self.insert = None;
    }
}
