// Mon Jan 19 2026 - Alex

use crate::memory::{read_region, MemoryApi, MemoryError, PartialRead, ProcessHandle, RegionDescriptor};
use crate::pattern::{CancelToken, MatchResult, OverlapPolicy, ResultAggregator, SearchPattern};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Hook the engine calls from worker threads as each region finishes.
pub trait ScanObserver: Sync {
    fn region_scanned(&self, region: &RegionDescriptor, matches: usize);
}

/// Observer that ignores everything.
pub struct NoProgress;

impl ScanObserver for NoProgress {
    fn region_scanned(&self, _region: &RegionDescriptor, _matches: usize) {}
}

#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    pub matches: Vec<MatchResult>,
    pub regions_scanned: usize,
    pub partial_reads: Vec<PartialRead>,
    /// False when cancellation cut the search short.
    pub complete: bool,
}

/// Parallel search over a set of regions: one task per region, run on a
/// pool of `threads` workers, joined before any result is handed back.
pub struct PatternScanner {
    threads: usize,
    overlap: OverlapPolicy,
}

impl PatternScanner {
    pub fn new(threads: usize) -> Self {
        Self {
            threads: threads.max(1),
            overlap: OverlapPolicy::default(),
        }
    }

    pub fn with_overlap(mut self, overlap: OverlapPolicy) -> Self {
        self.overlap = overlap;
        self
    }

    fn build_pool(&self) -> Result<rayon::ThreadPool, MemoryError> {
        rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .thread_name(|i| format!("memfind-scan-{}", i))
            .build()
            .map_err(|e| MemoryError::ThreadPool(e.to_string()))
    }

    pub fn scan<A: MemoryApi>(
        &self,
        handle: &ProcessHandle<A>,
        regions: &[RegionDescriptor],
        pattern: &SearchPattern,
        cancel: &CancelToken,
        observer: &dyn ScanObserver,
    ) -> Result<SearchOutcome, MemoryError> {
        let pool = self.build_pool()?;
        let aggregator = ResultAggregator::new();
        let partial_reads = Mutex::new(Vec::new());
        let scanned = AtomicUsize::new(0);
        let interrupted = AtomicBool::new(false);
        let overlap = self.overlap;

        log::debug!(
            "Scanning {} regions for [{}] on {} threads ({})",
            regions.len(),
            pattern,
            self.threads,
            overlap
        );

        {
            let aggregator = &aggregator;
            let partial_reads = &partial_reads;
            let scanned = &scanned;
            let interrupted = &interrupted;

            pool.scope(|s| {
                for region in regions {
                    s.spawn(move |_| {
                        if cancel.is_cancelled() {
                            interrupted.store(true, Ordering::Relaxed);
                            return;
                        }

                        let buffer = read_region(handle, region);
                        if let Some(partial) = buffer.partial_read() {
                            partial_reads.lock().push(partial);
                        }

                        let hits = pattern.find_all_until(&buffer.data, overlap, || cancel.is_cancelled());
                        for &offset in &hits.offsets {
                            aggregator.append(MatchResult::new(region.base, offset as u64));
                        }

                        if hits.completed {
                            scanned.fetch_add(1, Ordering::Relaxed);
                        } else {
                            interrupted.store(true, Ordering::Relaxed);
                        }
                        observer.region_scanned(region, hits.offsets.len());
                    });
                }
            });
        }

        let outcome = SearchOutcome {
            matches: aggregator.into_results(),
            regions_scanned: scanned.into_inner(),
            partial_reads: partial_reads.into_inner(),
            complete: !interrupted.into_inner(),
        };

        if !outcome.complete {
            log::info!(
                "Search cancelled after {} of {} regions",
                outcome.regions_scanned,
                regions.len()
            );
        }

        Ok(outcome)
    }
}

impl Default for PatternScanner {
    fn default() -> Self {
        Self::new(num_cpus::get())
    }
}
