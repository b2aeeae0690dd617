//! The row-access contract shared by cached row sets, join views and
//! conflict reports.
//!
//! Column indices are 1-based. Navigation methods return `Ok(true)` when the
//! cursor ends up on a real row.

use crate::decimal::Decimal;
use crate::error::{Error, Result};
use crate::schema::RowSetMetaData;
use crate::types::DataType;
use crate::value::Value;

/// Positional row access over a cached result.
pub trait RowSet {
    /// Returns the column metadata. Fails if the row set was never populated.
    fn metadata(&self) -> Result<&RowSetMetaData>;

    /// Returns the number of visible rows.
    fn size(&self) -> usize;

    /// Moves to the n-th visible row (negative counts from the end).
    fn absolute(&mut self, row: i64) -> Result<bool>;

    /// Moves `rows` visible rows from the current one.
    fn relative(&mut self, rows: i64) -> Result<bool>;

    /// Moves one row forward.
    fn next(&mut self) -> Result<bool>;

    /// Moves one row backward.
    fn previous(&mut self) -> Result<bool>;

    /// Moves to the first visible row.
    fn first(&mut self) -> Result<bool>;

    /// Moves to the last visible row.
    fn last(&mut self) -> Result<bool>;

    /// Moves before the first row.
    fn before_first(&mut self) -> Result<()>;

    /// Moves after the last row.
    fn after_last(&mut self) -> Result<()>;

    /// Returns the 1-based visible position, or 0 when not on a visible row.
    fn row(&self) -> Result<usize>;

    /// Reads a column of the current row.
    fn get(&self, column: usize) -> Result<&Value>;

    /// Stages a column edit on the current row or the insert row.
    fn update(&mut self, column: usize, value: Value) -> Result<()>;

    /// Commits staged edits of the current row.
    fn update_row(&mut self) -> Result<()>;

    /// Discards staged edits of the current row.
    fn cancel_row_updates(&mut self) -> Result<()>;

    /// Marks the current row deleted.
    fn delete_row(&mut self) -> Result<()>;

    /// Inserts the staged insert row.
    fn insert_row(&mut self) -> Result<()>;

    /// Enters the insert-row staging slot.
    fn move_to_insert_row(&mut self) -> Result<()>;

    /// Leaves the insert-row staging slot.
    fn move_to_current_row(&mut self) -> Result<()>;

    /// Whether the current row was inserted locally.
    fn row_inserted(&self) -> Result<bool>;

    /// Whether the current row has committed edits.
    fn row_updated(&self) -> Result<bool>;

    /// Whether the current row is marked deleted.
    fn row_deleted(&self) -> Result<bool>;

    /// Finds the 1-based index of a column by name.
    fn find_column(&self, name: &str) -> Result<usize> {
        self.metadata()?.find_column(name)
    }

    /// Reads a column of the current row by name.
    fn get_by_name(&self, name: &str) -> Result<&Value> {
        let column = self.find_column(name)?;
        self.get(column)
    }

    /// Stages a column edit by name.
    fn update_by_name(&mut self, name: &str, value: Value) -> Result<()> {
        let column = self.find_column(name)?;
        self.update(column, value)
    }

    /// Stages a null for a column.
    fn update_null(&mut self, column: usize) -> Result<()> {
        self.update(column, Value::Null)
    }

    fn get_bool(&self, column: usize) -> Result<Option<bool>> {
        Ok(self.get(column)?.convert_to(DataType::Boolean)?.as_bool())
    }

    fn get_i32(&self, column: usize) -> Result<Option<i32>> {
        Ok(self.get(column)?.convert_to(DataType::Int32)?.as_i32())
    }

    fn get_i64(&self, column: usize) -> Result<Option<i64>> {
        Ok(self.get(column)?.convert_to(DataType::Int64)?.as_i64())
    }

    fn get_f64(&self, column: usize) -> Result<Option<f64>> {
        Ok(self.get(column)?.convert_to(DataType::Float64)?.as_f64())
    }

    fn get_decimal(&self, column: usize) -> Result<Option<Decimal>> {
        Ok(self.get(column)?.convert_to(DataType::Decimal)?.as_decimal())
    }

    fn get_string(&self, column: usize) -> Result<Option<String>> {
        match self.get(column)? {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s.clone())),
            other => Ok(other.convert_to(DataType::String)?.as_str().map(String::from)),
        }
    }

    fn get_bytes(&self, column: usize) -> Result<Option<Vec<u8>>> {
        Ok(self.get(column)?.convert_to(DataType::Bytes)?.as_bytes().map(<[u8]>::to_vec))
    }

    fn get_datetime(&self, column: usize) -> Result<Option<i64>> {
        Ok(self.get(column)?.convert_to(DataType::DateTime)?.as_datetime())
    }

    /// Array columns are not a value kind of this implementation.
    fn get_array(&self, _column: usize) -> Result<Vec<Value>> {
        Err(Error::unsupported("array columns"))
    }

    /// Source row identifiers are not exposed yet.
    fn get_row_id(&self, _column: usize) -> Result<Vec<u8>> {
        Err(Error::feature_not_supported("row id columns"))
    }
}
