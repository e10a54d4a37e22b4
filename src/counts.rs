use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::model::OpKind;

/// Counts of each operation kind, accumulated during a walk.
///
/// Every kind is always present (zero by default). All arithmetic saturates:
/// deeply nested default loops can push multipliers past `u64::MAX`, and the
/// contract is to clamp rather than wrap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationCount {
    counts: [u64; OpKind::COUNT],
}

impl OperationCount {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, kind: OpKind, n: u64) {
        let slot = &mut self.counts[kind.index()];
        *slot = slot.saturating_add(n);
    }

    pub fn get(&self, kind: OpKind) -> u64 {
        self.counts[kind.index()]
    }

    /// Pointwise addition of `other` into `self`.
    pub fn merge(&mut self, other: &OperationCount) {
        for (slot, &n) in self.counts.iter_mut().zip(other.counts.iter()) {
            *slot = slot.saturating_add(n);
        }
    }

    /// A new counter with every count multiplied by `factor`.
    ///
    /// Used to model recursion: the whole body is assumed to execute
    /// `factor` times.
    pub fn scale(&self, factor: u64) -> OperationCount {
        let mut scaled = OperationCount::new();
        for (kind, &n) in OpKind::all().iter().zip(self.counts.iter()) {
            scaled.counts[kind.index()] = n.saturating_mul(factor);
        }
        scaled
    }

    pub fn total_raw(&self) -> u64 {
        self.counts
            .iter()
            .fold(0u64, |acc, &n| acc.saturating_add(n))
    }

    /// Sum over kinds of count × weight.
    pub fn total_weighted(&self) -> u64 {
        OpKind::all()
            .iter()
            .fold(0u64, |acc, &kind| {
                acc.saturating_add(self.get(kind).saturating_mul(kind.weight()))
            })
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&n| n == 0)
    }

    /// Non-zero entries in declaration order.
    pub fn summary(&self) -> OperationSummary {
        OperationSummary(
            OpKind::all()
                .iter()
                .filter(|&&kind| self.get(kind) > 0)
                .map(|&kind| (kind, self.get(kind)))
                .collect(),
        )
    }
}

/// Non-zero operation counts, serialized as a `{ kind: count }` object in
/// `OpKind` declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationSummary(Vec<(OpKind, u64)>);

impl OperationSummary {
    pub fn entries(&self) -> &[(OpKind, u64)] {
        &self.0
    }
}

impl Serialize for OperationSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (kind, count) in &self.0 {
            map.serialize_entry(kind.name(), count)?;
        }
        map.end()
    }
}
