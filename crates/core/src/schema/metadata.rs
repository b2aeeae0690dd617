//! Row set metadata: the ordered column descriptors of a cached result.

use super::column::ColumnMeta;
use crate::error::{Error, Result};
use crate::types::DataType;
use hashbrown::HashMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Ordered column descriptors with case-insensitive name lookup.
///
/// Column indices in the public API are 1-based.
#[derive(Clone, Debug, Default)]
pub struct RowSetMetaData {
    columns: Vec<ColumnMeta>,
    /// Lowercased name -> 0-based position of the first column with that name.
    by_name: HashMap<String, usize>,
}

impl RowSetMetaData {
    /// Creates metadata from column descriptors.
    pub fn new(columns: Vec<ColumnMeta>) -> Self {
        let mut by_name = HashMap::with_capacity(columns.len());
        for (i, col) in columns.iter().enumerate() {
            by_name.entry(col.name().to_ascii_lowercase()).or_insert(i);
        }
        Self { columns, by_name }
    }

    /// Returns the number of columns.
    #[inline]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if no columns are defined.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns the column descriptors.
    #[inline]
    pub fn columns(&self) -> &[ColumnMeta] {
        &self.columns
    }

    /// Returns the descriptor of a 1-based column.
    pub fn column(&self, index: usize) -> Result<&ColumnMeta> {
        self.check_index(index)?;
        Ok(&self.columns[index - 1])
    }

    /// Validates a 1-based column index and returns the 0-based position.
    pub fn check_index(&self, index: usize) -> Result<usize> {
        if index == 0 || index > self.columns.len() {
            return Err(Error::invalid_column(index, self.columns.len()));
        }
        Ok(index - 1)
    }

    /// Finds the 1-based index of a column by name (case-insensitive).
    pub fn find_column(&self, name: &str) -> Result<usize> {
        self.by_name
            .get(&name.to_ascii_lowercase())
            .map(|i| i + 1)
            .ok_or_else(|| Error::column_not_found(name))
    }

    /// Returns the name of a 1-based column.
    pub fn column_name(&self, index: usize) -> Result<&str> {
        self.column(index).map(|c| c.name())
    }

    /// Returns the data type of a 1-based column.
    pub fn column_type(&self, index: usize) -> Result<DataType> {
        self.column(index).map(|c| c.data_type())
    }

    /// Returns the table name shared by the columns, if any column names one.
    pub fn table_name(&self) -> Option<&str> {
        self.columns.iter().find_map(|c| c.get_table_name())
    }

    /// Concatenates two metadata sets (used for composed join rows).
    pub fn concat(&self, other: &RowSetMetaData) -> RowSetMetaData {
        let mut columns = self.columns.clone();
        columns.extend(other.columns.iter().cloned());
        RowSetMetaData::new(columns)
    }
}

impl PartialEq for RowSetMetaData {
    fn eq(&self, other: &Self) -> bool {
        self.columns == other.columns
    }
}

impl Serialize for RowSetMetaData {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        self.columns.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RowSetMetaData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        Vec::<ColumnMeta>::deserialize(deserializer).map(RowSetMetaData::new)
    }
}

/// Builder for row set metadata.
pub struct MetaDataBuilder {
    table: Option<String>,
    columns: Vec<ColumnMeta>,
}

impl MetaDataBuilder {
    /// Creates a builder whose columns all belong to `table`.
    pub fn new(table: impl Into<String>) -> Result<Self> {
        let table = table.into();
        Self::check_naming_rules(&table)?;
        Ok(Self {
            table: Some(table),
            columns: Vec::new(),
        })
    }

    /// Creates a builder without a table name.
    pub fn anonymous() -> Self {
        Self {
            table: None,
            columns: Vec::new(),
        }
    }

    /// Validates a name follows naming rules.
    fn check_naming_rules(name: &str) -> Result<()> {
        let mut chars = name.chars();
        match chars.next() {
            None => return Err(Error::invalid_operation("name cannot be empty")),
            Some(first) if !first.is_ascii_alphabetic() && first != '_' => {
                return Err(Error::invalid_operation(format!(
                    "name must start with letter or underscore: {}",
                    name
                )))
            }
            Some(_) => {}
        }
        if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(Error::invalid_operation(format!(
                "name contains invalid characters: {}",
                name
            )));
        }
        Ok(())
    }

    /// Adds a column.
    pub fn add_column(mut self, name: impl Into<String>, data_type: DataType) -> Result<Self> {
        let name = name.into();
        Self::check_naming_rules(&name)?;
        if self
            .columns
            .iter()
            .any(|c| c.name().eq_ignore_ascii_case(&name))
        {
            return Err(Error::invalid_operation(format!(
                "column already exists: {}",
                name
            )));
        }
        let mut column = ColumnMeta::new(name, data_type);
        if let Some(table) = &self.table {
            column = column.table_name(table.clone());
        }
        self.columns.push(column);
        Ok(self)
    }

    /// Marks columns as nullable.
    pub fn add_nullable(mut self, columns: &[&str]) -> Self {
        for name in columns {
            if let Some(col) = self
                .columns
                .iter_mut()
                .find(|c| c.name().eq_ignore_ascii_case(name))
            {
                *col = col.clone().nullable(true);
            }
        }
        self
    }

    /// Builds the metadata.
    pub fn build(self) -> Result<RowSetMetaData> {
        if self.columns.is_empty() {
            return Err(Error::invalid_operation("metadata needs at least one column"));
        }
        Ok(RowSetMetaData::new(self.columns))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> RowSetMetaData {
        MetaDataBuilder::new("users")
            .unwrap()
            .add_column("id", DataType::Int64)
            .unwrap()
            .add_column("name", DataType::String)
            .unwrap()
            .add_nullable(&["name"])
            .build()
            .unwrap()
    }

    #[test]
    fn test_find_column_case_insensitive() {
        let meta = users();
        assert_eq!(meta.find_column("id").unwrap(), 1);
        assert_eq!(meta.find_column("NAME").unwrap(), 2);
        assert!(matches!(
            meta.find_column("missing"),
            Err(Error::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn test_check_index_bounds() {
        let meta = users();
        assert_eq!(meta.check_index(1).unwrap(), 0);
        assert!(matches!(
            meta.check_index(0),
            Err(Error::InvalidColumnIndex { index: 0, count: 2 })
        ));
        assert!(meta.check_index(3).is_err());
    }

    #[test]
    fn test_builder_rules() {
        assert!(MetaDataBuilder::new("").is_err());
        assert!(MetaDataBuilder::new("1abc").is_err());
        assert!(MetaDataBuilder::anonymous()
            .add_column("id", DataType::Int32)
            .unwrap()
            .add_column("ID", DataType::Int32)
            .is_err());
        assert!(MetaDataBuilder::anonymous().build().is_err());
    }

    #[test]
    fn test_table_name_and_nullable() {
        let meta = users();
        assert_eq!(meta.table_name(), Some("users"));
        assert!(meta.column(2).unwrap().is_nullable());
        assert!(!meta.column(1).unwrap().is_nullable());
    }

    #[test]
    fn test_concat_keeps_first_name_match() {
        let meta = users().concat(&users());
        assert_eq!(meta.column_count(), 4);
        assert_eq!(meta.find_column("id").unwrap(), 1);
    }

    #[test]
    fn test_serde_roundtrip() {
        let meta = users();
        let json = serde_json::to_string(&meta).unwrap();
        let back: RowSetMetaData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, meta);
        assert_eq!(back.find_column("name").unwrap(), 2);
    }
}
