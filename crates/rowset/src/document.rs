//! Structured row set document: properties, metadata and row data.
//!
//! The document captures committed row state. Staged column edits that were
//! never passed to `update_row` are not part of it.

use crate::cached::CachedRowSet;
use crate::properties::RowSetProperties;
use rowset_core::schema::RowSetMetaData;
use rowset_core::{Error, Result, Row, RowStatus, Value};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// One buffered row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RowEntry {
    /// Effective status; must agree with the flags.
    pub status: RowStatus,
    #[serde(default)]
    pub inserted: bool,
    #[serde(default)]
    pub updated: bool,
    #[serde(default)]
    pub deleted: bool,
    /// Current values.
    pub values: Vec<Value>,
    /// Original values, present for updated rows only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<Vec<Value>>,
}

impl RowEntry {
    fn from_row(row: &Row) -> Self {
        Self {
            status: row.status(),
            inserted: row.is_inserted(),
            updated: row.is_updated(),
            deleted: row.is_deleted(),
            values: row.current().to_vec(),
            original: row.is_updated().then(|| row.original().to_vec()),
        }
    }

    fn into_row(self, width: usize) -> Result<Row> {
        if self.values.len() != width {
            return Err(Error::serialization(format!(
                "row has {} values, metadata has {} columns",
                self.values.len(),
                width
            )));
        }
        let original = match (self.updated, self.original) {
            (true, Some(original)) if original.len() == width => original,
            (true, _) => {
                return Err(Error::serialization(
                    "updated row needs original values of full width",
                ))
            }
            (false, _) => self.values.clone(),
        };
        let row = Row::from_parts(
            original,
            self.values,
            self.inserted,
            self.updated,
            self.deleted,
        );
        if row.status() != self.status {
            return Err(Error::serialization(format!(
                "status {:?} disagrees with row flags ({:?})",
                self.status,
                row.status()
            )));
        }
        Ok(row)
    }
}

/// The serialized form of a cached row set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RowSetDocument {
    pub properties: RowSetProperties,
    pub metadata: RowSetMetaData,
    pub data: Vec<RowEntry>,
}

impl CachedRowSet {
    /// Captures properties, metadata and every buffered row (hidden ones included).
    pub fn to_document(&self) -> Result<RowSetDocument> {
        self.check_open()?;
        Ok(RowSetDocument {
            properties: self.properties.clone(),
            metadata: self.buffer.require_metadata()?.clone(),
            data: self.buffer.rows().iter().map(RowEntry::from_row).collect(),
        })
    }

    /// Rebuilds a row set from a document. The cursor starts before the first row.
    pub fn from_document(document: RowSetDocument) -> Result<CachedRowSet> {
        document.properties.validate()?;
        let width = document.metadata.column_count();
        let rows = document
            .data
            .into_iter()
            .map(|entry| entry.into_row(width))
            .collect::<Result<Vec<_>>>()?;
        let mut row_set = CachedRowSet::with_properties(document.properties);
        row_set.load(document.metadata, rows)?;
        Ok(row_set)
    }

    /// Writes the row set as a JSON document.
    pub fn write_json<W: Write>(&self, writer: W) -> Result<()> {
        let document = self.to_document()?;
        serde_json::to_writer_pretty(writer, &document)
            .map_err(|e| Error::serialization(e.to_string()))
    }

    /// Reads a row set from a JSON document.
    pub fn read_json<R: Read>(reader: R) -> Result<CachedRowSet> {
        let document: RowSetDocument =
            serde_json::from_reader(reader).map_err(|e| Error::serialization(e.to_string()))?;
        Self::from_document(document)
    }

    pub fn to_json_string(&self) -> Result<String> {
        let document = self.to_document()?;
        serde_json::to_string_pretty(&document).map_err(|e| Error::serialization(e.to_string()))
    }

    pub fn from_json_str(json: &str) -> Result<CachedRowSet> {
        Self::read_json(json.as_bytes())
    }
}
