//! Population and paging.
//!
//! A populated row set keeps the source result it was filled from and moves a
//! window of `page_size` rows over it. `max_rows` bounds the window's reach,
//! counted from the row population started at. Switching pages is refused
//! while the buffer holds unsynchronized changes.

use crate::cached::CachedRowSet;
use rowset_core::{Error, Result, Row};
use rowset_reactive::RowSetEvent;
use rowset_storage::{Compatibility, DataSource, ResultSet};

/// Paging position over the retained result.
#[derive(Clone, Debug, Default)]
pub(crate) struct PageState {
    result: Option<ResultSet>,
    /// 0-based offset population started at.
    origin: usize,
    /// 0-based offset of the first buffered row.
    start: usize,
    /// Rows in the current page.
    len: usize,
    /// The next `next_page` reports the loaded page instead of advancing.
    report_loaded: bool,
}

impl CachedRowSet {
    /// Replaces the buffer with rows of `result`, starting at 1-based `start_row`.
    ///
    /// With paging enabled only the first page is loaded.
    pub fn populate(&mut self, result: ResultSet, start_row: usize) -> Result<()> {
        self.check_open()?;
        if start_row == 0 {
            return Err(Error::invalid_operation("start row is 1-based"));
        }
        let origin = start_row - 1;
        let limit = self.fetch_limit(origin, result.len());
        let end = match self.properties.page_size {
            0 => limit,
            size => origin.saturating_add(size).min(limit),
        };
        let rows: Vec<Row> = result
            .fetch(origin, end.saturating_sub(origin))
            .iter()
            .cloned()
            .map(Row::new)
            .collect();
        let len = rows.len();
        self.load(result.metadata().clone(), rows)?;
        self.paging = PageState {
            result: Some(result),
            origin,
            start: origin,
            len,
            report_loaded: self.properties.page_size > 0
                && self.properties.compatibility == Compatibility::Strict,
        };
        tracing::debug!(
            rows = len,
            start_row,
            page_size = self.properties.page_size,
            "row set populated"
        );
        self.notify(RowSetEvent::row_set_changed());
        Ok(())
    }

    /// Runs the configured command against `source` and populates from it.
    pub fn execute(&mut self, source: &mut dyn DataSource) -> Result<()> {
        self.check_open()?;
        let query = self
            .properties
            .command
            .clone()
            .ok_or_else(|| Error::invalid_operation("no command set"))?;
        if self.properties.table_name.is_none() {
            self.properties.table_name = Some(query.table.clone());
        }
        let result = source.query(&query)?;
        self.populate(result, 1)
    }

    /// Loads the next page.
    ///
    /// Returns false when paging is disabled or no rows remain within
    /// `max_rows`. In strict mode the first call after `populate` reports the
    /// already loaded page without advancing. Fails with an invalid-operation
    /// error, leaving the page as it was, while changes are pending.
    pub fn next_page(&mut self) -> Result<bool> {
        if !self.check_paging()? {
            return Ok(false);
        }
        if self.paging.report_loaded {
            self.paging.report_loaded = false;
            return Ok(self.paging.len > 0);
        }
        let total = self.paging.result.as_ref().map_or(0, ResultSet::len);
        let next = self.paging.start + self.paging.len;
        let limit = self.fetch_limit(self.paging.origin, total);
        if next >= limit {
            return Ok(false);
        }
        let end = next.saturating_add(self.properties.page_size).min(limit);
        self.show_page(next, end)
    }

    /// Loads the page before the current one. Returns false on the first page.
    ///
    /// Pending changes block the switch as for [`next_page`](Self::next_page).
    pub fn previous_page(&mut self) -> Result<bool> {
        if !self.check_paging()? {
            return Ok(false);
        }
        let start = self.paging.start;
        if start <= self.paging.origin {
            return Ok(false);
        }
        let new_start = start
            .saturating_sub(self.properties.page_size)
            .max(self.paging.origin);
        self.show_page(new_start, start)
    }

    /// 0-based source offset of the first buffered row.
    pub fn page_offset(&self) -> usize {
        self.paging.start
    }

    /// Fails if never populated; false if paging cannot move.
    fn check_paging(&self) -> Result<bool> {
        self.check_open()?;
        self.buffer.require_metadata()?;
        Ok(self.properties.page_size > 0 && self.paging.result.is_some())
    }

    fn fetch_limit(&self, origin: usize, total: usize) -> usize {
        match self.properties.max_rows {
            0 => total,
            max => origin.saturating_add(max).min(total),
        }
    }

    fn show_page(&mut self, start: usize, end: usize) -> Result<bool> {
        if self.has_changes() {
            tracing::warn!(
                changes = self.changes().total(),
                "page switch refused with unsynchronized changes"
            );
            return Err(Error::invalid_operation(
                "row set has unsynchronized changes; accept or undo them before changing page",
            ));
        }
        let rows: Vec<Row> = match &self.paging.result {
            Some(result) => result
                .fetch(start, end - start)
                .iter()
                .cloned()
                .map(Row::new)
                .collect(),
            None => return Ok(false),
        };
        let len = rows.len();
        self.buffer.replace_rows(rows)?;
        self.cursor.reset();
        self.paging.start = start;
        self.paging.len = len;
        self.paging.report_loaded = false;
        tracing::debug!(offset = start, rows = len, "page loaded");
        self.notify(RowSetEvent::row_set_changed());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::RowSetProperties;
    use rowset_core::schema::MetaDataBuilder;
    use rowset_core::{DataType, RowSet, Value};

    fn result(rows: i64) -> ResultSet {
        let meta = MetaDataBuilder::new("numbers")
            .unwrap()
            .add_column("n", DataType::Int64)
            .unwrap()
            .build()
            .unwrap();
        ResultSet::new(meta, (1..=rows).map(|i| vec![Value::Int64(i)]).collect()).unwrap()
    }

    fn ids(rs: &CachedRowSet) -> Vec<i64> {
        rs.rows()
            .iter()
            .filter_map(|r| r.current()[0].as_i64())
            .collect()
    }

    fn paged(page_size: usize, max_rows: usize, compatibility: Compatibility) -> CachedRowSet {
        CachedRowSet::with_properties(
            RowSetProperties::builder()
                .page_size(page_size)
                .max_rows(max_rows)
                .compatibility(compatibility)
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_strict_first_next_page_reports_loaded_page() {
        let mut rs = paged(3, 0, Compatibility::Strict);
        rs.populate(result(7), 1).unwrap();
        assert_eq!(ids(&rs), vec![1, 2, 3]);

        assert!(rs.next_page().unwrap());
        assert_eq!(ids(&rs), vec![1, 2, 3]);
        assert!(rs.next_page().unwrap());
        assert_eq!(ids(&rs), vec![4, 5, 6]);
        assert!(rs.next_page().unwrap());
        assert_eq!(ids(&rs), vec![7]);
        assert!(!rs.next_page().unwrap());
        assert_eq!(ids(&rs), vec![7]);
    }

    #[test]
    fn test_lenient_first_next_page_advances() {
        let mut rs = paged(3, 0, Compatibility::Lenient);
        rs.populate(result(7), 1).unwrap();
        assert!(rs.next_page().unwrap());
        assert_eq!(ids(&rs), vec![4, 5, 6]);
    }

    #[test]
    fn test_previous_page() {
        let mut rs = paged(3, 0, Compatibility::Lenient);
        rs.populate(result(7), 1).unwrap();
        assert!(!rs.previous_page().unwrap());
        rs.next_page().unwrap();
        rs.next_page().unwrap();
        assert!(rs.previous_page().unwrap());
        assert_eq!(ids(&rs), vec![4, 5, 6]);
        assert!(rs.previous_page().unwrap());
        assert_eq!(ids(&rs), vec![1, 2, 3]);
        assert!(!rs.previous_page().unwrap());
    }

    #[test]
    fn test_page_size_change_applies_to_next_fetch() {
        let mut rs = paged(2, 0, Compatibility::Lenient);
        rs.populate(result(10), 1).unwrap();
        rs.set_page_size(4).unwrap();
        assert_eq!(ids(&rs), vec![1, 2]);
        rs.next_page().unwrap();
        assert_eq!(ids(&rs), vec![3, 4, 5, 6]);
    }

    #[test]
    fn test_populate_start_row() {
        let mut rs = paged(0, 0, Compatibility::Strict);
        rs.populate(result(5), 3).unwrap();
        assert_eq!(ids(&rs), vec![3, 4, 5]);
        assert!(rs.populate(result(5), 0).is_err());
        rs.populate(result(5), 9).unwrap();
        assert_eq!(rs.size(), 0);
    }

    #[test]
    fn test_paging_disabled_returns_false() {
        let mut rs = CachedRowSet::new();
        rs.populate(result(5), 1).unwrap();
        assert_eq!(rs.size(), 5);
        assert!(!rs.next_page().unwrap());
        assert!(!rs.previous_page().unwrap());
    }

    #[test]
    fn test_paging_never_populated_fails() {
        let mut rs = paged(3, 0, Compatibility::Strict);
        assert!(matches!(rs.next_page(), Err(Error::InvalidOperation { .. })));
        assert!(rs.previous_page().is_err());
    }

    #[test]
    fn test_max_rows_without_paging() {
        let mut rs = paged(0, 4, Compatibility::Strict);
        rs.populate(result(10), 1).unwrap();
        assert_eq!(ids(&rs), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_execute_requires_command() {
        let mut rs = CachedRowSet::new();
        let mut source = rowset_storage::MemorySource::new();
        assert!(matches!(
            rs.execute(&mut source),
            Err(Error::InvalidOperation { .. })
        ));
    }
}
