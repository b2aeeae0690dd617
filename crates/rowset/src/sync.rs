//! Optimistic synchronization of buffered changes.

use crate::conflict::{Conflict, ConflictKind, ConflictReport};
use rowset_core::{Error, Row, Value};
use rowset_storage::{DataSource, KeyValues, RowBuffer, Statement};

/// Failure of `accept_changes`.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Some rows could not be applied; every other change was.
    #[error("synchronization left {} conflicting row(s) unapplied", .0.len())]
    Conflict(ConflictReport),

    /// The row set refused the call or the source failed outright.
    #[error(transparent)]
    Core(#[from] Error),
}

impl SyncError {
    pub fn conflicts(&self) -> Option<&ConflictReport> {
        match self {
            SyncError::Conflict(report) => Some(report),
            SyncError::Core(_) => None,
        }
    }

    pub fn into_conflicts(self) -> Option<ConflictReport> {
        match self {
            SyncError::Conflict(report) => Some(report),
            SyncError::Core(_) => None,
        }
    }
}

/// What the engine needs to address the source.
#[derive(Clone, Debug)]
pub struct SyncContext {
    pub table: String,
    /// Column names in buffer order.
    pub columns: Vec<String>,
    /// 0-based key column positions.
    pub key_columns: Vec<usize>,
    pub commit_on_accept: bool,
}

impl SyncContext {
    fn key(&self, values: &[Value]) -> KeyValues {
        self.key_columns
            .iter()
            .filter_map(|&i| Some((self.columns.get(i)?.clone(), values.get(i)?.clone())))
            .collect()
    }

    fn named(&self, values: &[Value]) -> KeyValues {
        self.columns.iter().cloned().zip(values.iter().cloned()).collect()
    }
}

/// Strategy that writes a buffer's changes to a source.
pub trait SyncProvider {
    /// Applies every changed row of `buffer` to `source`.
    ///
    /// Applied rows become unmodified (deleted ones leave the buffer).
    fn synchronize(
        &self,
        buffer: &mut RowBuffer,
        context: &SyncContext,
        source: &mut dyn DataSource,
    ) -> Result<(), SyncError>;
}

/// Default strategy: re-read each updated or deleted row by its original key
/// and apply the change only if the source still holds the original values.
#[derive(Clone, Copy, Debug, Default)]
pub struct OptimisticSyncProvider;

enum Outcome {
    Applied,
    Removed,
    Conflict(Conflict),
}

impl OptimisticSyncProvider {
    /// Re-reads the source row and compares it with the row's originals.
    fn unchanged_at_source(
        row: &Row,
        context: &SyncContext,
        source: &mut dyn DataSource,
    ) -> Result<(bool, Option<Vec<Value>>), Error> {
        let key = context.key(row.original());
        let current = source.current_values(&context.table, &context.columns, &key)?;
        let unchanged = current.as_deref() == Some(row.original());
        Ok((unchanged, current))
    }

    fn sync_row(
        row: &Row,
        position: usize,
        context: &SyncContext,
        source: &mut dyn DataSource,
    ) -> Result<Outcome, Error> {
        if row.is_inserted() {
            if row.is_deleted() {
                tracing::trace!(position, "discarding row inserted and deleted locally");
                return Ok(Outcome::Removed);
            }
            let statement = Statement::Insert {
                table: context.table.clone(),
                values: context.named(row.current()),
            };
            return match source.execute(&statement) {
                Ok(_) => Ok(Outcome::Applied),
                Err(err @ Error::Source { .. }) => Err(err),
                Err(err) => Ok(Outcome::Conflict(Conflict::rejected(
                    row.clone(),
                    position,
                    err.to_string(),
                ))),
            };
        }

        let kind = if row.is_deleted() {
            ConflictKind::Delete
        } else {
            ConflictKind::Update
        };
        let (unchanged, current) = Self::unchanged_at_source(row, context, source)?;
        if !unchanged {
            return Ok(Outcome::Conflict(Conflict::changed(
                kind,
                row.clone(),
                position,
                current,
            )));
        }

        let key = context.key(row.original());
        let statement = match kind {
            ConflictKind::Delete => Statement::Delete {
                table: context.table.clone(),
                key,
            },
            _ => Statement::Update {
                table: context.table.clone(),
                key,
                values: context.named(row.current()),
            },
        };
        let affected = match source.execute(&statement) {
            Ok(n) => n,
            Err(err @ Error::Source { .. }) => return Err(err),
            Err(_) => 0,
        };
        if affected == 0 {
            return Ok(Outcome::Conflict(Conflict::changed(
                kind,
                row.clone(),
                position,
                current,
            )));
        }
        Ok(match kind {
            ConflictKind::Delete => Outcome::Removed,
            _ => Outcome::Applied,
        })
    }
}

impl SyncProvider for OptimisticSyncProvider {
    fn synchronize(
        &self,
        buffer: &mut RowBuffer,
        context: &SyncContext,
        source: &mut dyn DataSource,
    ) -> Result<(), SyncError> {
        let metadata = buffer.require_metadata()?.clone();
        let changes = rowset_storage::ChangeTracker::summarize(buffer.rows());
        tracing::debug!(
            table = %context.table,
            inserted = changes.inserted,
            updated = changes.updated,
            deleted = changes.deleted,
            "synchronization started"
        );
        source.begin_transaction()?;

        let mut conflicts = Vec::new();
        let mut index = 0;
        // 1-based position before synchronization; removals do not shift it.
        let mut position = 0;
        while index < buffer.len() {
            position += 1;
            let Some(row) = buffer.row(index) else { break };
            if !row.is_inserted() && !row.is_updated() && !row.is_deleted() {
                index += 1;
                continue;
            }
            match Self::sync_row(row, position, context, source)? {
                Outcome::Applied => {
                    tracing::trace!(position, "row applied");
                    if let Some(row) = buffer.row_mut(index) {
                        row.accept();
                    }
                    index += 1;
                }
                Outcome::Removed => {
                    tracing::trace!(position, "row removed");
                    buffer.remove(index);
                }
                Outcome::Conflict(conflict) => {
                    tracing::warn!(position, kind = ?conflict.kind(), "synchronization conflict");
                    conflicts.push(conflict);
                    index += 1;
                }
            }
        }

        if conflicts.is_empty() {
            if context.commit_on_accept {
                source.commit()?;
            }
            tracing::debug!(table = %context.table, "synchronization finished");
            Ok(())
        } else {
            tracing::debug!(
                table = %context.table,
                conflicts = conflicts.len(),
                "synchronization finished with conflicts"
            );
            Err(SyncError::Conflict(ConflictReport::new(metadata, conflicts)))
        }
    }
}
