//! Row set configuration.
//!
//! `RowSetProperties` carries everything a row set needs to know about its
//! source and its paging/visibility policy. It is serialized as the
//! `properties` section of a row set document and can be loaded from JSON.

use rowset_core::{Error, Result};
use rowset_storage::{Compatibility, Query};
use serde::{Deserialize, Serialize};

/// Transaction isolation requested from the backing source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionIsolation {
    None,
    ReadUncommitted,
    #[default]
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

fn default_commit_on_accept() -> bool {
    true
}

/// Configuration of a cached row set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RowSetProperties {
    /// Query run by `execute`.
    #[serde(default)]
    pub command: Option<Query>,
    /// Table synchronization writes to.
    #[serde(default)]
    pub table_name: Option<String>,
    /// 1-based key columns used to re-read rows. Empty means every column.
    #[serde(default)]
    pub key_columns: Vec<usize>,
    /// 1-based columns used when joining.
    #[serde(default)]
    pub match_columns: Vec<usize>,
    #[serde(default)]
    pub match_column_names: Vec<String>,
    /// Rows per page; 0 disables paging.
    #[serde(default)]
    pub page_size: usize,
    /// Cap on rows materialized from one population; 0 is unbounded.
    #[serde(default)]
    pub max_rows: usize,
    #[serde(default)]
    pub show_deleted: bool,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub query_timeout_secs: u64,
    #[serde(default)]
    pub isolation: TransactionIsolation,
    /// Commit the source transaction after a conflict-free synchronization.
    #[serde(default = "default_commit_on_accept")]
    pub commit_on_accept: bool,
    #[serde(default)]
    pub compatibility: Compatibility,
}

impl Default for RowSetProperties {
    fn default() -> Self {
        Self {
            command: None,
            table_name: None,
            key_columns: Vec::new(),
            match_columns: Vec::new(),
            match_column_names: Vec::new(),
            page_size: 0,
            max_rows: 0,
            show_deleted: false,
            read_only: false,
            query_timeout_secs: 0,
            isolation: TransactionIsolation::default(),
            commit_on_accept: default_commit_on_accept(),
            compatibility: Compatibility::default(),
        }
    }
}

impl RowSetProperties {
    pub fn builder() -> PropertiesBuilder {
        PropertiesBuilder::default()
    }

    /// Parses properties from JSON; absent fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let properties: Self =
            serde_json::from_str(json).map_err(|e| Error::serialization(e.to_string()))?;
        properties.validate()?;
        Ok(properties)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::serialization(e.to_string()))
    }

    /// Checks the settings are consistent with each other.
    pub fn validate(&self) -> Result<()> {
        check_page_size(self.page_size, self.max_rows)?;
        if self.key_columns.contains(&0) || self.match_columns.contains(&0) {
            return Err(Error::invalid_column(0, 0));
        }
        Ok(())
    }
}

/// Page size may not exceed a non-zero row cap.
pub(crate) fn check_page_size(page_size: usize, max_rows: usize) -> Result<()> {
    if max_rows > 0 && page_size > max_rows {
        return Err(Error::invalid_operation(format!(
            "page size {} exceeds max rows {}",
            page_size, max_rows
        )));
    }
    Ok(())
}

/// Builder for [`RowSetProperties`].
#[derive(Default)]
pub struct PropertiesBuilder {
    properties: RowSetProperties,
}

impl PropertiesBuilder {
    pub fn command(mut self, query: Query) -> Self {
        self.properties.command = Some(query);
        self
    }

    pub fn table_name(mut self, table: impl Into<String>) -> Self {
        self.properties.table_name = Some(table.into());
        self
    }

    pub fn key_columns(mut self, columns: impl IntoIterator<Item = usize>) -> Self {
        self.properties.key_columns = columns.into_iter().collect();
        self
    }

    pub fn match_columns(mut self, columns: impl IntoIterator<Item = usize>) -> Self {
        self.properties.match_columns = columns.into_iter().collect();
        self
    }

    pub fn match_column_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.properties.match_column_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn page_size(mut self, size: usize) -> Self {
        self.properties.page_size = size;
        self
    }

    pub fn max_rows(mut self, rows: usize) -> Self {
        self.properties.max_rows = rows;
        self
    }

    pub fn show_deleted(mut self, show: bool) -> Self {
        self.properties.show_deleted = show;
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.properties.read_only = read_only;
        self
    }

    pub fn query_timeout_secs(mut self, secs: u64) -> Self {
        self.properties.query_timeout_secs = secs;
        self
    }

    pub fn isolation(mut self, isolation: TransactionIsolation) -> Self {
        self.properties.isolation = isolation;
        self
    }

    pub fn commit_on_accept(mut self, commit: bool) -> Self {
        self.properties.commit_on_accept = commit;
        self
    }

    pub fn compatibility(mut self, compatibility: Compatibility) -> Self {
        self.properties.compatibility = compatibility;
        self
    }

    /// Builds the properties, validating them.
    pub fn build(self) -> Result<RowSetProperties> {
        self.properties.validate()?;
        Ok(self.properties)
    }
}
