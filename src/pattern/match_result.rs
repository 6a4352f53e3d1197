// Mon Jan 19 2026 - Alex

use crate::memory::Address;
use parking_lot::Mutex;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MatchResult {
    pub region_base: Address,
    pub offset: u64,
}

impl MatchResult {
    pub fn new(region_base: Address, offset: u64) -> Self {
        Self { region_base, offset }
    }

    pub fn address(&self) -> Address {
        self.region_base + self.offset
    }
}

/// Lock-guarded collection every search task appends into.
///
/// The lock is held for one push at a time and never across a scan. Results
/// come out through [`into_results`](Self::into_results), which takes the
/// aggregator by value, so nothing can be appended once it has been drained.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    results: Mutex<Vec<MatchResult>>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, result: MatchResult) {
        self.results.lock().push(result);
    }

    pub fn len(&self) -> usize {
        self.results.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_results(self) -> Vec<MatchResult> {
        self.results.into_inner()
    }
}
