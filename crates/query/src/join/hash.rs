//! Hash composition of participant rows.
//!
//! Build phase: each non-owner participant's visible rows are hashed on their
//! match key. Probe phase: every partial composition is extended with the rows
//! sharing the owner's match key. Output order is participant order, then row
//! order within each participant.

use hashbrown::HashMap;
use rowset::{CachedRowSet, Row, Value};

/// One composed row: a physical row index per participant, owner first.
pub type Composition = Vec<usize>;

/// A participant as seen by the composer.
pub struct JoinInput<'a> {
    pub row_set: &'a CachedRowSet,
    /// 0-based match column.
    pub column: usize,
}

impl JoinInput<'_> {
    /// Match key of a row; committed values only, nulls have none.
    fn key(&self, row: &Row) -> Option<Value> {
        row.current().get(self.column).and_then(Value::match_key)
    }
}

/// Composes the inner equality join of `inputs`, joined on the owner's key.
///
/// A single participant composes to its own visible rows.
pub fn compose(inputs: &[JoinInput<'_>]) -> Vec<Composition> {
    let Some((owner, others)) = inputs.split_first() else {
        return Vec::new();
    };

    let mut partial: Vec<(Option<Value>, Composition)> = owner
        .row_set
        .visible_rows()
        .map(|(idx, row)| (owner.key(row), vec![idx]))
        .collect();

    for input in others {
        // Build phase
        let mut table: HashMap<Value, Vec<usize>> = HashMap::new();
        for (idx, row) in input.row_set.visible_rows() {
            if let Some(key) = input.key(row) {
                table.entry(key).or_default().push(idx);
            }
        }

        // Probe phase
        let mut next = Vec::with_capacity(partial.len());
        for (key, composition) in partial {
            let Some(matches) = key.as_ref().and_then(|k| table.get(k)) else {
                continue;
            };
            for &idx in matches {
                let mut extended = Vec::with_capacity(composition.len() + 1);
                extended.extend_from_slice(&composition);
                extended.push(idx);
                next.push((key.clone(), extended));
            }
        }
        partial = next;
    }

    partial.into_iter().map(|(_, composition)| composition).collect()
}
