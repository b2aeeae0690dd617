//! Rowset Storage - buffer, cursor and source layer for cached row sets.
//!
//! This crate provides the pieces a row set is assembled from:
//!
//! - `RowBuffer`: Ordered rows plus column metadata and the visibility filter
//! - `Cursor`: Navigation state machine with the insert-row staging slot
//! - `ChangeTracker`: Legal row status transitions and change counters
//! - `DataSource`: The backing store contract, with `MemorySource` as an in-memory implementation
//!
//! # Example
//!
//! ```rust
//! use rowset_core::schema::MetaDataBuilder;
//! use rowset_core::{DataType, Row, Value};
//! use rowset_storage::{ChangeTracker, Cursor, CursorState, RowBuffer};
//!
//! let meta = MetaDataBuilder::new("items")
//!     .unwrap()
//!     .add_column("id", DataType::Int32)
//!     .unwrap()
//!     .build()
//!     .unwrap();
//! let mut buffer = RowBuffer::with_metadata(meta);
//! for i in 1..=3 {
//!     buffer.push(Row::new(vec![Value::Int32(i)])).unwrap();
//! }
//!
//! let mut cursor = Cursor::default();
//! cursor.absolute(&buffer, 2).unwrap();
//! ChangeTracker::delete(buffer.row_mut(1).unwrap());
//!
//! // The deleted row is hidden; the next visible row is the third one.
//! assert!(cursor.next(&buffer).unwrap());
//! assert_eq!(cursor.state(&buffer), CursorState::Positioned(2));
//! ```

pub mod buffer;
pub mod cursor;
pub mod source;
pub mod tracker;

pub use buffer::RowBuffer;
pub use cursor::{Compatibility, Cursor, CursorState, InsertSlot, Navigable, Position};
pub use source::{DataSource, KeyValues, MemorySource, MemoryTable, Predicate, Query, ResultSet, Statement};
pub use tracker::{ChangeSummary, ChangeTracker};
