//! Second pass for extension methods: attach buffered methods to the records
//! of their receiver types once every type has been analyzed.

use crate::model::{MethodRecord, TypeRecord};
use std::collections::BTreeMap;
use tracing::debug;

/// Extension methods waiting for their receiver, keyed by the receiver's
/// simple type name. Buckets keep insertion order.
#[derive(Debug, Default, Clone)]
pub struct PendingExtensions {
    buckets: BTreeMap<String, Vec<MethodRecord>>,
}

impl PendingExtensions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, receiver: impl Into<String>, method: MethodRecord) {
        self.buckets.entry(receiver.into()).or_default().push(method);
    }

    pub fn extend(&mut self, staged: impl IntoIterator<Item = (String, MethodRecord)>) {
        for (receiver, method) in staged {
            self.push(receiver, method);
        }
    }

    /// Number of buffered methods across all buckets.
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    #[cfg(test)]
    fn bucket(&self, receiver: &str) -> Option<&[MethodRecord]> {
        self.buckets.get(receiver).map(Vec::as_slice)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Method copies appended to records.
    pub attached: usize,
    /// Buckets whose receiver is not among the records.
    pub unmatched_buckets: usize,
}

/// Append every bucket to each record with a matching simple name that owns a
/// method list. Unmatched buckets are dropped.
///
/// Matching ignores namespaces: two receivers called `Foo` in different
/// namespaces both receive the bucket.
pub fn merge_extensions(records: &mut [TypeRecord], pending: PendingExtensions) -> MergeStats {
    let mut stats = MergeStats::default();
    if pending.is_empty() {
        return stats;
    }

    let mut matched: Vec<bool> = vec![false; pending.buckets.len()];
    let keys: Vec<&String> = pending.buckets.keys().collect();

    for record in records.iter_mut() {
        let Ok(slot) = keys.binary_search(&&record.header().name) else {
            continue;
        };
        let Some(methods) = record.methods_mut() else {
            continue;
        };
        let bucket = &pending.buckets[keys[slot]];
        methods.extend(bucket.iter().cloned());
        stats.attached += bucket.len();
        matched[slot] = true;
    }

    stats.unmatched_buckets = matched.iter().filter(|m| !**m).count();
    debug!(
        attached = stats.attached,
        unmatched = stats.unmatched_buckets,
        "Merged extension methods"
    );
    stats
}
