//! Rowset Core - value, row and metadata types for disconnected row sets.
//!
//! This crate provides the foundational types shared by every row set crate:
//!
//! - `DataType`: Supported column types (Boolean, Int32, Int64, Float64, Decimal, String, Bytes, DateTime)
//! - `Value`: Closed sum type of cell values with explicit conversion rules
//! - `Row`: A buffered row holding original and current values plus its status
//! - `schema`: Column metadata (`ColumnMeta`, `RowSetMetaData`)
//! - `RowSet`: The positional row-access contract
//! - `Error`: Error types for row set operations
//!
//! # Example
//!
//! ```rust
//! use rowset_core::{DataType, Row, RowStatus, Value};
//! use rowset_core::schema::MetaDataBuilder;
//!
//! let meta = MetaDataBuilder::new("users")
//!     .unwrap()
//!     .add_column("id", DataType::Int64)
//!     .unwrap()
//!     .add_column("name", DataType::String)
//!     .unwrap()
//!     .build()
//!     .unwrap();
//! assert_eq!(meta.find_column("name").unwrap(), 2);
//!
//! let mut row = Row::new(vec![Value::Int64(1), Value::String("Alice".into())]);
//! row.stage(1, Value::String("Bob".into()));
//! row.commit_pending();
//! assert_eq!(row.status(), RowStatus::Updated);
//! assert_eq!(row.original()[1], Value::String("Alice".into()));
//! ```

mod access;
mod decimal;
mod error;
mod row;
pub mod schema;
mod types;
mod value;

pub use access::RowSet;
pub use decimal::Decimal;
pub use error::{Error, Result};
pub use row::{Row, RowStatus};
pub use types::DataType;
pub use value::Value;
