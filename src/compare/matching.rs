//! Correspondence between the pending changes of two shelvesets.
//!
//! Matching is identity first (`ItemId`, which survives renames), then exact
//! path. Only the first candidate in the second list is taken.

use crate::vcs::{ItemId, PendingChange};
use std::collections::BTreeSet;

/// What the matcher needs to know about a change
pub trait ChangeIdentity {
    fn item_id(&self) -> ItemId;

    /// Composite `"{folder}/{file_name}"` key
    fn path_key(&self) -> String;
}

impl ChangeIdentity for PendingChange {
    fn item_id(&self) -> ItemId {
        self.item_id
    }

    fn path_key(&self) -> String {
        self.server_path()
    }
}

/// A change from the first list and its counterpart in the second, if any.
/// Indices point into the lists given to [`correspond`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pairing {
    pub first: usize,
    pub second: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Correspondence {
    /// One pairing per change of the first list, in input order
    pub pairs: Vec<Pairing>,
    /// Changes of the second list that must appear on their own, in input order
    pub second_only: Vec<usize>,
}

/// First change in `second` with the same item id, else the first with the same path
pub fn find_counterpart<T: ChangeIdentity>(change: &T, second: &[T]) -> Option<usize> {
    let id = change.item_id();
    second.iter().position(|c| c.item_id() == id).or_else(|| {
        let key = change.path_key();
        second.iter().position(|c| c.path_key() == key)
    })
}

/// Compute the deterministic correspondence between two change lists.
///
/// A change of `second` is reported in `second_only` unless its path key is
/// already used by a first-side change or an earlier second-only change, or
/// its item id already appears on either side of an earlier entry.
pub fn correspond<T: ChangeIdentity>(first: &[T], second: &[T]) -> Correspondence {
    let pairs: Vec<Pairing> = first
        .iter()
        .enumerate()
        .map(|(i, change)| Pairing {
            first: i,
            second: find_counterpart(change, second),
        })
        .collect();

    let mut keys: BTreeSet<String> = first.iter().map(T::path_key).collect();
    let mut ids: BTreeSet<ItemId> = first.iter().map(T::item_id).collect();
    ids.extend(
        pairs
            .iter()
            .filter_map(|p| p.second)
            .map(|j| second[j].item_id()),
    );

    let mut second_only = Vec::new();
    for (j, change) in second.iter().enumerate() {
        let key = change.path_key();
        if keys.contains(&key) || ids.contains(&change.item_id()) {
            continue;
        }
        keys.insert(key);
        ids.insert(change.item_id());
        second_only.push(j);
    }

    Correspondence { pairs, second_only }
}
