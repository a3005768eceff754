//! Position assignment for ordered collections.
//!
//! Every collection keeps a dense run of positions starting at its base.
//! Reordering is expressed against a filtered view of the collection, so the
//! assigner rebuilds the order of the whole collection in one pass: the
//! rearranged visible entries first, then the hidden entries in their
//! previous relative order.

use std::collections::HashSet;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// Anything that carries a stable identity inside a collection.
pub trait Identified {
    type Id: Clone + Eq + Hash;

    fn identity(&self) -> Self::Id;
}

impl<T: Identified> Identified for &T {
    type Id = T::Id;

    fn identity(&self) -> T::Id {
        (**self).identity()
    }
}

/// First position value of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionBase {
    Zero,
    One,
}

impl PositionBase {
    pub fn value(self) -> u32 {
        match self {
            PositionBase::Zero => 0,
            PositionBase::One => 1,
        }
    }

    /// Position of the entry at `index` in a dense ordering, `None` once
    /// positions no longer fit a `u32`.
    pub fn at(self, index: usize) -> Option<u32> {
        u32::try_from(index).ok()?.checked_add(self.value())
    }
}

/// New position for one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionUpdate<I> {
    pub id: I,
    pub position: u32,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ReorderError {
    #[error("source index {index} is out of range for a view of {len} entries")]
    SourceOutOfRange { index: usize, len: usize },

    #[error("destination index {index} is out of range for a view of {len} entries")]
    DestinationOutOfRange { index: usize, len: usize },

    #[error("filtered view contains an entry that is not part of the collection")]
    UnknownEntry,

    #[error("a collection of {len} entries has no free position left")]
    PositionsExhausted { len: usize },
}

fn assign<I>(
    index: usize,
    id: I,
    base: PositionBase,
    len: usize,
) -> Result<PositionUpdate<I>, ReorderError> {
    base.at(index)
        .map(|position| PositionUpdate { id, position })
        .ok_or(ReorderError::PositionsExhausted { len })
}

/// Computes the full position assignment after a drag-and-drop inside a
/// filtered view.
///
/// `filtered` is the view as it was before the drag, `all` the whole
/// collection in current position order. Indices are validated up front; a
/// drop onto the starting slot yields no updates. Otherwise the result holds
/// one update for every entry of `all`.
pub fn reorder_filtered<F, A>(
    filtered: &[F],
    all: &[A],
    source: usize,
    destination: usize,
    base: PositionBase,
) -> Result<Vec<PositionUpdate<F::Id>>, ReorderError>
where
    F: Identified,
    A: Identified<Id = F::Id>,
{
    let len = filtered.len();
    if source >= len {
        return Err(ReorderError::SourceOutOfRange { index: source, len });
    }
    if destination >= len {
        return Err(ReorderError::DestinationOutOfRange {
            index: destination,
            len,
        });
    }
    if source == destination {
        return Ok(Vec::new());
    }

    let all_ids: HashSet<F::Id> = all.iter().map(|entry| entry.identity()).collect();
    let mut reordered: Vec<F::Id> = filtered.iter().map(|entry| entry.identity()).collect();
    if reordered.iter().any(|id| !all_ids.contains(id)) {
        return Err(ReorderError::UnknownEntry);
    }

    let moved = reordered.remove(source);
    reordered.insert(destination, moved);

    let filtered_ids: HashSet<F::Id> = reordered.iter().cloned().collect();
    let hidden = all
        .iter()
        .map(|entry| entry.identity())
        .filter(|id| !filtered_ids.contains(id));

    reordered
        .into_iter()
        .chain(hidden)
        .enumerate()
        .map(|(index, id)| assign(index, id, base, all.len()))
        .collect()
}

/// Dense positions for the entries left after a removal, in their current
/// order.
pub fn repack<T: Identified>(
    remaining: &[T],
    base: PositionBase,
) -> Result<Vec<PositionUpdate<T::Id>>, ReorderError> {
    remaining
        .iter()
        .enumerate()
        .map(|(index, entry)| assign(index, entry.identity(), base, remaining.len()))
        .collect()
}

/// Position for an entry appended to a collection of `len` entries.
pub fn next_position(len: usize, base: PositionBase) -> Result<u32, ReorderError> {
    base.at(len).ok_or(ReorderError::PositionsExhausted { len })
}
