//! Merging a fresh scan into the previously published list.

use std::collections::{HashMap, HashSet};

use super::port::{sort_by_port, PortKey, PortRecord};

/// Merge `fresh` into `previous`.
///
/// Records whose key survives keep their slot in `previous` but take the
/// field values from `fresh`. Keys only present in `fresh` are appended in
/// `fresh` order, keys that vanished are dropped, and the result is then
/// stably sorted by numeric port.
///
/// Returns `None` when the merged list equals `previous` field for field,
/// meaning nothing should be published.
pub fn reconcile(previous: &[PortRecord], fresh: &[PortRecord]) -> Option<Vec<PortRecord>> {
    let mut by_key: HashMap<PortKey, &PortRecord> = HashMap::with_capacity(fresh.len());
    for record in fresh {
        by_key.entry(record.key()).or_insert(record);
    }

    let mut merged = Vec::with_capacity(fresh.len());
    let mut placed: HashSet<PortKey> = HashSet::with_capacity(fresh.len());

    for old in previous {
        let key = old.key();
        if let Some(updated) = by_key.get(&key) {
            if placed.insert(key) {
                merged.push((*updated).clone());
            }
        }
    }

    for record in fresh {
        if placed.insert(record.key()) {
            merged.push(record.clone());
        }
    }

    sort_by_port(&mut merged);

    if merged.as_slice() == previous {
        None
    } else {
        Some(merged)
    }
}
