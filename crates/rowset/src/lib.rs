//! Rowset - disconnected, mutable caches of tabular query results.
//!
//! A `CachedRowSet` is populated once from a backing source, navigated and
//! edited offline, and later reconciled with the source using optimistic
//! concurrency.
//!
//! # Core Components
//!
//! - `CachedRowSet`: The row set itself (navigation, editing, undo, lifecycle)
//! - `RowSetProperties`: Configuration (paging, key columns, visibility, commit policy)
//! - `SyncProvider`: Synchronization strategy, `OptimisticSyncProvider` by default
//! - `ConflictReport`: Read-only report of rows a synchronization could not apply
//! - `RowSetDocument`: Structured serialization of properties, metadata and rows
//!
//! # Example
//!
//! ```rust
//! use rowset::schema::MetaDataBuilder;
//! use rowset::{
//!     CachedRowSet, DataSource, DataType, MemorySource, Query, RowSet, Statement, SyncError, Value,
//! };
//!
//! let meta = MetaDataBuilder::anonymous()
//!     .add_column("id", DataType::Int32)
//!     .unwrap()
//!     .add_column("qty", DataType::Int32)
//!     .unwrap()
//!     .build()
//!     .unwrap();
//! let mut source = MemorySource::new();
//! source.create_table("stock", meta, &["id"]).unwrap();
//! source.insert("stock", vec![Value::Int32(1), Value::Int32(10)]).unwrap();
//!
//! let mut rs = CachedRowSet::new();
//! rs.set_command(Query::table("stock"));
//! rs.set_key_columns(&[1]).unwrap();
//! rs.execute(&mut source).unwrap();
//!
//! rs.next().unwrap();
//! rs.update(2, Value::Int32(7)).unwrap();
//! rs.update_row().unwrap();
//!
//! // Someone else changes the row in the meantime.
//! source
//!     .execute(&Statement::Update {
//!         table: "stock".into(),
//!         key: vec![("id".into(), Value::Int32(1))],
//!         values: vec![("qty".into(), Value::Int32(9))],
//!     })
//!     .unwrap();
//!
//! match rs.accept_changes(&mut source) {
//!     Err(SyncError::Conflict(mut report)) => {
//!         assert!(report.next_conflict());
//!         assert_eq!(report.conflict_value(2).unwrap(), Some(&Value::Int32(9)));
//!     }
//!     other => panic!("expected a conflict, got {:?}", other),
//! }
//! ```

mod cached;
pub mod conflict;
pub mod document;
mod paging;
pub mod properties;
pub mod sync;

pub use cached::CachedRowSet;
pub use conflict::{Conflict, ConflictKind, ConflictReport};
pub use document::{RowEntry, RowSetDocument};
pub use properties::{PropertiesBuilder, RowSetProperties, TransactionIsolation};
pub use sync::{OptimisticSyncProvider, SyncContext, SyncError, SyncProvider};

pub use rowset_core::{schema, DataType, Decimal, Error, Result, Row, RowSet, RowStatus, Value};
pub use rowset_reactive::{CallbackListener, EventKind, ListenerId, RowSetEvent, RowSetListener};
pub use rowset_storage::{
    ChangeSummary, Compatibility, CursorState, DataSource, MemorySource, Predicate, Query,
    ResultSet, Statement,
};
