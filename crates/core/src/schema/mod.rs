//! Column metadata for row sets.
//!
//! This module describes the shape of a cached result: the ordered column
//! descriptors and the lookup structures built over them.

mod column;
mod metadata;

pub use column::ColumnMeta;
pub use metadata::{MetaDataBuilder, RowSetMetaData};
