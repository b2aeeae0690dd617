//! In-memory data source with keyed tables and snapshot transactions.

use super::{DataSource, Query, ResultSet, Statement};
use rowset_core::schema::{ColumnMeta, RowSetMetaData};
use rowset_core::{Error, Result, Value};
use std::collections::BTreeMap;

/// A table of the in-memory source.
#[derive(Clone, Debug)]
pub struct MemoryTable {
    metadata: RowSetMetaData,
    /// 0-based key column positions; unique across rows.
    key: Vec<usize>,
    rows: Vec<Vec<Value>>,
}

impl MemoryTable {
    #[inline]
    pub fn metadata(&self) -> &RowSetMetaData {
        &self.metadata
    }

    #[inline]
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn key_of(&self, values: &[Value]) -> Vec<Value> {
        self.key.iter().map(|&i| values[i].clone()).collect()
    }

    fn check_unique(&self, values: &[Value], skip: Option<usize>) -> Result<()> {
        if self.key.is_empty() {
            return Ok(());
        }
        let key = self.key_of(values);
        let clash = self
            .rows
            .iter()
            .enumerate()
            .any(|(i, row)| Some(i) != skip && self.key_of(row) == key);
        if clash {
            return Err(Error::constraint_violation(format!(
                "duplicate key {:?}",
                key.iter().map(ToString::to_string).collect::<Vec<_>>()
            )));
        }
        Ok(())
    }

    /// Resolves named values to a full row, leaving unnamed columns null.
    fn resolve(&self, values: &[(String, Value)], base: Option<&[Value]>) -> Result<Vec<Value>> {
        let mut row = match base {
            Some(base) => base.to_vec(),
            None => vec![Value::Null; self.metadata.column_count()],
        };
        for (name, value) in values {
            let index = self.metadata.find_column(name)? - 1;
            row[index] = value.clone();
        }
        for (column, value) in self.metadata.columns().iter().zip(&row) {
            if value.is_null() && !column.is_nullable() {
                return Err(Error::constraint_violation(format!(
                    "column {} cannot be null",
                    column.name()
                )));
            }
        }
        Ok(row)
    }

    fn position(&self, key: &[(String, Value)]) -> Result<Vec<usize>> {
        let mut resolved = Vec::with_capacity(key.len());
        for (name, value) in key {
            resolved.push((self.metadata.find_column(name)? - 1, value));
        }
        Ok(self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| resolved.iter().all(|(i, v)| row[*i] == **v))
            .map(|(i, _)| i)
            .collect())
    }

    fn projection(&self, columns: &[String]) -> Result<Vec<usize>> {
        if columns.is_empty() {
            return Ok((0..self.metadata.column_count()).collect());
        }
        columns
            .iter()
            .map(|name| self.metadata.find_column(name).map(|i| i - 1))
            .collect()
    }
}

/// A [`DataSource`] over in-memory tables.
///
/// Transactions snapshot every table on `begin_transaction`; `rollback`
/// restores the snapshot.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    tables: BTreeMap<String, MemoryTable>,
    snapshot: Option<BTreeMap<String, MemoryTable>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table keyed on the named columns.
    pub fn create_table(
        &mut self,
        name: impl Into<String>,
        metadata: RowSetMetaData,
        key: &[&str],
    ) -> Result<()> {
        let name = name.into();
        if self.tables.contains_key(&name) {
            return Err(Error::invalid_operation(format!(
                "table already exists: {}",
                name
            )));
        }
        let key = key
            .iter()
            .map(|k| metadata.find_column(k).map(|i| i - 1))
            .collect::<Result<Vec<_>>>()?;
        // Result metadata always names the table, even when built anonymously.
        let columns = metadata
            .columns()
            .iter()
            .map(|c| {
                ColumnMeta::new(c.name(), c.data_type())
                    .nullable(c.is_nullable())
                    .table_name(name.clone())
            })
            .collect();
        self.tables.insert(
            name,
            MemoryTable {
                metadata: RowSetMetaData::new(columns),
                key,
                rows: Vec::new(),
            },
        );
        Ok(())
    }

    /// Appends a full row to a table.
    pub fn insert(&mut self, table: &str, values: Vec<Value>) -> Result<()> {
        let t = self.table_mut(table)?;
        if values.len() != t.metadata.column_count() {
            return Err(Error::invalid_operation(format!(
                "row has {} values, table {} has {} columns",
                values.len(),
                table,
                t.metadata.column_count()
            )));
        }
        t.check_unique(&values, None)?;
        t.rows.push(values);
        Ok(())
    }

    pub fn table(&self, name: &str) -> Option<&MemoryTable> {
        self.tables.get(name)
    }

    fn table_ref(&self, name: &str) -> Result<&MemoryTable> {
        self.tables
            .get(name)
            .ok_or_else(|| Error::source(format!("table not found: {}", name)))
    }

    fn table_mut(&mut self, name: &str) -> Result<&mut MemoryTable> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| Error::source(format!("table not found: {}", name)))
    }

    /// Returns true between `begin_transaction` and `commit`/`rollback`.
    pub fn in_transaction(&self) -> bool {
        self.snapshot.is_some()
    }
}

impl DataSource for MemorySource {
    fn query(&mut self, query: &Query) -> Result<ResultSet> {
        let table = self.table_ref(&query.table)?;
        let projection = table.projection(&query.columns)?;
        let metadata = RowSetMetaData::new(
            projection
                .iter()
                .map(|&i| table.metadata.columns()[i].clone())
                .collect(),
        );
        let mut rows = Vec::new();
        for row in &table.rows {
            if let Some(predicate) = &query.predicate {
                if !predicate.evaluate(&table.metadata, row)? {
                    continue;
                }
            }
            rows.push(projection.iter().map(|&i| row[i].clone()).collect());
        }
        tracing::trace!(table = %query.table, rows = rows.len(), "memory source query");
        ResultSet::new(metadata, rows)
    }

    fn execute(&mut self, statement: &Statement) -> Result<usize> {
        let table = self.table_mut(statement.table())?;
        let affected = match statement {
            Statement::Insert { values, .. } => {
                let row = table.resolve(values, None)?;
                table.check_unique(&row, None)?;
                table.rows.push(row);
                1
            }
            Statement::Update { key, values, .. } => {
                let targets = table.position(key)?;
                // Validate every target before touching any.
                let mut updated = Vec::with_capacity(targets.len());
                for &i in &targets {
                    let row = table.resolve(values, Some(&table.rows[i]))?;
                    table.check_unique(&row, Some(i))?;
                    updated.push((i, row));
                }
                for (i, row) in updated {
                    table.rows[i] = row;
                }
                targets.len()
            }
            Statement::Delete { key, .. } => {
                let targets = table.position(key)?;
                for &i in targets.iter().rev() {
                    table.rows.remove(i);
                }
                targets.len()
            }
        };
        tracing::trace!(table = %statement.table(), affected, "memory source execute");
        Ok(affected)
    }

    fn begin_transaction(&mut self) -> Result<()> {
        if self.snapshot.is_none() {
            self.snapshot = Some(self.tables.clone());
        }
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.snapshot = None;
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        if let Some(snapshot) = self.snapshot.take() {
            self.tables = snapshot;
        }
        Ok(())
    }

    fn current_values(
        &mut self,
        table: &str,
        columns: &[String],
        key: &[(String, Value)],
    ) -> Result<Option<Vec<Value>>> {
        let t = self.table_ref(table)?;
        let projection = t.projection(columns)?;
        Ok(t.position(key)?
            .first()
            .map(|&i| projection.iter().map(|&c| t.rows[i][c].clone()).collect()))
    }
}
