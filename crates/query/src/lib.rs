//! Rowset Query - join views over cached row sets.
//!
//! A `JoinView` owns several populated `CachedRowSet`s and presents the inner
//! equality join of their match columns through the ordinary `RowSet` cursor
//! surface. Composed rows are ordered by participant, then by row.
//!
//! # Example
//!
//! ```rust
//! use rowset::schema::MetaDataBuilder;
//! use rowset::{CachedRowSet, DataType, ResultSet, RowSet, Value};
//! use rowset_query::JoinView;
//!
//! fn load(table: &str, ids: &[i64]) -> CachedRowSet {
//!     let meta = MetaDataBuilder::new(table)
//!         .unwrap()
//!         .add_column("id", DataType::Int64)
//!         .unwrap()
//!         .build()
//!         .unwrap();
//!     let rows = ids.iter().map(|&id| vec![Value::Int64(id)]).collect();
//!     let mut rs = CachedRowSet::new();
//!     rs.populate(ResultSet::new(meta, rows).unwrap(), 1).unwrap();
//!     rs
//! }
//!
//! let mut view = JoinView::new();
//! view.add_row_set(load("orders", &[1, 2, 2]), 1).unwrap();
//! view.add_row_set_by_name(load("customers", &[2, 3]), "id").unwrap();
//!
//! assert_eq!(view.size(), 2);
//! assert_eq!(view.where_clause().unwrap(), "WHERE orders.id = customers.id");
//! ```

pub mod join;

pub use join::{JoinKind, JoinView, Participant};
