//! Backing source abstraction.
//!
//! A row set talks to its data store only through [`DataSource`]: row-shaped
//! query results, structured change statements and re-reads by key. No query
//! language is assumed.

mod memory;

pub use memory::{MemorySource, MemoryTable};

use rowset_core::schema::RowSetMetaData;
use rowset_core::{Error, Result, Value};
use serde::{Deserialize, Serialize};

/// Column name and value pairs identifying a source row.
pub type KeyValues = Vec<(String, Value)>;

/// Row filter evaluated by the source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    /// Column equals a value; nulls never match.
    Eq { column: String, value: Value },
    /// All inner predicates hold.
    And(Vec<Predicate>),
}

impl Predicate {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate::Eq {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Conjunction of column equalities for a key.
    pub fn key(key: &[(String, Value)]) -> Self {
        Predicate::And(
            key.iter()
                .map(|(column, value)| Predicate::eq(column.clone(), value.clone()))
                .collect(),
        )
    }

    /// Evaluates the predicate against a row described by `metadata`.
    pub fn evaluate(&self, metadata: &RowSetMetaData, values: &[Value]) -> Result<bool> {
        match self {
            Predicate::Eq { column, value } => {
                let index = metadata.find_column(column)? - 1;
                Ok(values.get(index).is_some_and(|v| v.matches(value)))
            }
            Predicate::And(inner) => {
                for p in inner {
                    if !p.evaluate(metadata, values)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }
}

/// A structured read request.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub table: String,
    /// Column names to project; empty selects every column.
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub predicate: Option<Predicate>,
}

impl Query {
    /// Selects every column of a table.
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicate = Some(predicate);
        self
    }
}

/// A structured change request.
#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    Insert {
        table: String,
        values: KeyValues,
    },
    Update {
        table: String,
        key: KeyValues,
        values: KeyValues,
    },
    Delete {
        table: String,
        key: KeyValues,
    },
}

impl Statement {
    pub fn table(&self) -> &str {
        match self {
            Statement::Insert { table, .. }
            | Statement::Update { table, .. }
            | Statement::Delete { table, .. } => table,
        }
    }
}

/// Ordered rows returned by a query, read in windows.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultSet {
    metadata: RowSetMetaData,
    rows: Vec<Vec<Value>>,
}

impl ResultSet {
    /// Creates a result set, checking every row has one value per column.
    pub fn new(metadata: RowSetMetaData, rows: Vec<Vec<Value>>) -> Result<Self> {
        let width = metadata.column_count();
        if let Some(bad) = rows.iter().find(|r| r.len() != width) {
            return Err(Error::source(format!(
                "result row has {} values, expected {}",
                bad.len(),
                width
            )));
        }
        Ok(Self { metadata, rows })
    }

    #[inline]
    pub fn metadata(&self) -> &RowSetMetaData {
        &self.metadata
    }

    /// Total number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns up to `count` rows starting at 0-based `start`.
    pub fn fetch(&self, start: usize, count: usize) -> &[Vec<Value>] {
        let start = start.min(self.rows.len());
        let end = start.saturating_add(count).min(self.rows.len());
        &self.rows[start..end]
    }

    pub fn into_rows(self) -> Vec<Vec<Value>> {
        self.rows
    }
}

/// The backing data store a row set populates from and synchronizes to.
pub trait DataSource {
    /// Runs a query and returns its rows in source order.
    fn query(&mut self, query: &Query) -> Result<ResultSet>;

    /// Applies a change and returns the number of affected rows.
    fn execute(&mut self, statement: &Statement) -> Result<usize>;

    fn begin_transaction(&mut self) -> Result<()>;

    fn commit(&mut self) -> Result<()>;

    fn rollback(&mut self) -> Result<()>;

    /// Re-reads the row identified by `key`, projected on `columns`.
    ///
    /// Returns `None` when no such row exists anymore.
    fn current_values(
        &mut self,
        table: &str,
        columns: &[String],
        key: &[(String, Value)],
    ) -> Result<Option<Vec<Value>>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowset_core::schema::MetaDataBuilder;
    use rowset_core::DataType;

    fn meta() -> RowSetMetaData {
        MetaDataBuilder::new("t")
            .unwrap()
            .add_column("id", DataType::Int32)
            .unwrap()
            .add_column("name", DataType::String)
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn test_predicate_eq_and_nulls() {
        let meta = meta();
        let row = vec![Value::Int32(1), Value::Null];
        assert!(Predicate::eq("id", 1i64).evaluate(&meta, &row).unwrap());
        assert!(!Predicate::eq("name", Value::Null).evaluate(&meta, &row).unwrap());
        assert!(Predicate::eq("missing", 1).evaluate(&meta, &row).is_err());
    }

    #[test]
    fn test_predicate_key_conjunction() {
        let meta = meta();
        let row = vec![Value::Int32(1), Value::String("a".into())];
        let key = vec![
            ("id".to_string(), Value::Int32(1)),
            ("name".to_string(), Value::String("b".into())),
        ];
        assert!(!Predicate::key(&key).evaluate(&meta, &row).unwrap());
        assert!(Predicate::key(&key[..1]).evaluate(&meta, &row).unwrap());
    }

    #[test]
    fn test_result_set_fetch_windows() {
        let rows = (0..10).map(|i| vec![Value::Int32(i), Value::Null]).collect();
        let rs = ResultSet::new(meta(), rows).unwrap();
        assert_eq!(rs.fetch(0, 3).len(), 3);
        assert_eq!(rs.fetch(8, 3).len(), 2);
        assert!(rs.fetch(12, 3).is_empty());
        assert_eq!(rs.fetch(3, usize::MAX).len(), 7);
        assert_eq!(rs.fetch(3, 1)[0][0], Value::Int32(3));
    }

    #[test]
    fn test_result_set_width_check() {
        assert!(ResultSet::new(meta(), vec![vec![Value::Null]]).is_err());
    }

    #[test]
    fn test_query_builder() {
        let q = Query::table("t")
            .columns(["id"])
            .filter(Predicate::eq("id", 1));
        assert_eq!(q.columns, vec!["id".to_string()]);
        assert!(q.predicate.is_some());
    }
}
