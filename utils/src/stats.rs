//! Per-operation outcome counters.

use std::collections::BTreeMap;

/// Counts accepted and rejected calls per operation name.
#[derive(Debug, Default)]
pub struct OutcomeCounter {
    counts: BTreeMap<&'static str, (u64, u64)>,
}

impl OutcomeCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, op: &'static str, accepted: bool) {
        let entry = self.counts.entry(op).or_default();
        if accepted {
            entry.0 += 1;
        } else {
            entry.1 += 1;
        }
    }

    pub fn accepted(&self, op: &str) -> u64 {
        self.counts.get(op).map(|c| c.0).unwrap_or(0)
    }

    pub fn rejected(&self, op: &str) -> u64 {
        self.counts.get(op).map(|c| c.1).unwrap_or(0)
    }

    pub fn total_rejected(&self) -> u64 {
        self.counts.values().map(|c| c.1).sum()
    }

    /// `(op, accepted, rejected)` rows in operation-name order.
    pub fn rows(&self) -> Vec<(&'static str, u64, u64)> {
        self.counts.iter().map(|(&op, &(a, r))| (op, a, r)).collect()
    }
}
