// Mon Jan 19 2026 - Alex

use crate::config::FinderConfig;
use crate::memory::{
    collect_regions, Address, MemoryApi, MemoryError, PartialRead, ProcessHandle, RegionDescriptor, RegionFilter,
    WalkSummary,
};
use crate::pattern::{CancelToken, MatchResult, NoProgress, OverlapPolicy, PatternScanner, ScanObserver, SearchPattern};
use indexmap::IndexMap;
use itertools::Itertools;
use serde::Serialize;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchRecord {
    pub region_base: Address,
    pub offset: u64,
    pub address: Address,
}

impl From<MatchResult> for MatchRecord {
    fn from(m: MatchResult) -> Self {
        Self {
            region_base: m.region_base,
            offset: m.offset,
            address: m.address(),
        }
    }
}

/// Structured result of one search over a session's regions.
#[derive(Debug, Clone, Serialize)]
pub struct FindReport {
    pub pid: u32,
    pub pattern: String,
    pub overlap: OverlapPolicy,
    pub interesting_regions: usize,
    pub regions_scanned: usize,
    pub walk: WalkSummary,
    /// Sorted by region base, then offset.
    pub matches: Vec<MatchRecord>,
    pub partial_reads: Vec<PartialRead>,
    pub complete: bool,
    pub elapsed_ms: u64,
}

impl FindReport {
    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    /// Offsets grouped under their region, regions in address order.
    pub fn matches_by_region(&self) -> IndexMap<Address, Vec<u64>> {
        let mut grouped: IndexMap<Address, Vec<u64>> = IndexMap::new();
        for m in &self.matches {
            grouped.entry(m.region_base).or_default().push(m.offset);
        }
        grouped
    }
}

/// A finished session: the search report plus how teardown went.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub value: u32,
    #[serde(flatten)]
    pub report: FindReport,
    pub close_error: Option<String>,
}

/// One scan session against one process.
///
/// Opening walks the address space once and keeps the interesting regions;
/// each `find` re-reads those regions and searches them in parallel.
pub struct Finder<A: MemoryApi> {
    handle: ProcessHandle<A>,
    regions: Vec<RegionDescriptor>,
    walk: WalkSummary,
    config: FinderConfig,
}

impl<A: MemoryApi> Finder<A> {
    pub fn open(api: A, pid: u32, config: FinderConfig) -> Result<Self, MemoryError> {
        config.validate().map_err(MemoryError::InvalidConfig)?;

        let handle = ProcessHandle::open(api, pid, config.access)?;
        let bounds = handle.bounds();
        log::debug!("Process {} address space {}", pid, bounds);

        let filter = RegionFilter::new().with_min_size(config.min_region_size);
        let (regions, walk) = collect_regions(&handle, bounds, &filter);
        log::info!(
            "Process {}: {} regions visited, {} interesting",
            pid,
            walk.visited,
            regions.len()
        );

        Ok(Self { handle, regions, walk, config })
    }

    pub fn pid(&self) -> u32 {
        self.handle.pid()
    }

    pub fn regions(&self) -> &[RegionDescriptor] {
        &self.regions
    }

    pub fn interesting_count(&self) -> usize {
        self.regions.len()
    }

    pub fn walk_summary(&self) -> WalkSummary {
        self.walk
    }

    /// Token honouring the configured timeout, if any.
    pub fn cancel_token(&self) -> CancelToken {
        match self.config.timeout() {
            Some(timeout) => CancelToken::with_timeout(timeout),
            None => CancelToken::new(),
        }
    }

    pub fn find_u32(&self, value: u32) -> Result<FindReport, MemoryError> {
        self.find(&SearchPattern::from_u32(value), &self.cancel_token(), &NoProgress)
    }

    pub fn find(
        &self,
        pattern: &SearchPattern,
        cancel: &CancelToken,
        observer: &dyn ScanObserver,
    ) -> Result<FindReport, MemoryError> {
        let started = Instant::now();
        let scanner = PatternScanner::new(self.config.threads).with_overlap(self.config.overlap);
        let outcome = scanner.scan(&self.handle, &self.regions, pattern, cancel, observer)?;

        let report = FindReport {
            pid: self.pid(),
            pattern: pattern.to_hex(),
            overlap: self.config.overlap,
            interesting_regions: self.regions.len(),
            regions_scanned: outcome.regions_scanned,
            walk: self.walk,
            matches: outcome.matches.into_iter().sorted().map(MatchRecord::from).collect(),
            partial_reads: outcome
                .partial_reads
                .into_iter()
                .sorted_by_key(|p| p.region_base)
                .collect(),
            complete: outcome.complete,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };

        log::info!(
            "Found {} matches for [{}] in {} regions ({} partial reads)",
            report.match_count(),
            report.pattern,
            report.regions_scanned,
            report.partial_reads.len()
        );
        Ok(report)
    }

    pub fn close(self) -> Result<(), MemoryError> {
        self.handle.close()
    }
}

/// Opens `pid`, searches it for `value` and closes it again.
///
/// Only a failure to open the session is an error; a failure to close is
/// recorded in the report next to the results already collected.
pub fn find_value<A: MemoryApi>(
    api: A,
    pid: u32,
    value: u32,
    config: FinderConfig,
    cancel: &CancelToken,
    observer: &dyn ScanObserver,
) -> Result<SessionReport, MemoryError> {
    let finder = Finder::open(api, pid, config)?;
    let searched = finder.find(&SearchPattern::from_u32(value), cancel, observer);

    let close_error = match finder.close() {
        Ok(()) => None,
        Err(e) => {
            log::error!("{}", e);
            Some(e.to_string())
        }
    };

    Ok(SessionReport {
        value,
        report: searched?,
        close_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{AccessRights, AddressSpaceBounds, PageProtection, SimulatedMemory};
    use std::sync::Arc;

    const PID: u32 = 4242;

    fn target() -> SimulatedMemory {
        let mut heap = vec![0u8; 0x100];
        heap[0x10..0x14].copy_from_slice(&1337u32.to_le_bytes());
        heap[0x80..0x84].copy_from_slice(&1337u32.to_le_bytes());

        let mut stack = vec![0u8; 0x100];
        stack[0x20..0x24].copy_from_slice(&1337u32.to_le_bytes());

        let mut rodata = vec![0u8; 0x100];
        rodata[0..4].copy_from_slice(&1337u32.to_le_bytes());

        SimulatedMemory::new(PID)
            .with_bounds(AddressSpaceBounds::new(Address::new(0x10000), Address::new(0x7fff_0000)))
            .with_region(RegionDescriptor::private_read_write(Address::new(0x20000), 0x100), heap)
            .with_region(
                RegionDescriptor::private_read_write(Address::new(0x30000), 0x100)
                    .with_protect(PageProtection::READONLY),
                rodata,
            )
            .with_region(RegionDescriptor::private_read_write(Address::new(0x40000), 0x100), stack)
            .with_zeroed_region(
                RegionDescriptor::private_read_write(Address::new(0x50000), 0x100)
                    .with_protect(PageProtection::READWRITE | PageProtection::GUARD),
            )
    }

    #[test]
    fn test_session_finds_values_in_interesting_regions() {
        let finder = Finder::open(target(), PID, FinderConfig::new().with_threads(2)).unwrap();
        assert_eq!(finder.interesting_count(), 2);

        let report = finder.find_u32(1337).unwrap();
        let addresses: Vec<u64> = report.matches.iter().map(|m| m.address.as_u64()).collect();

        assert_eq!(addresses, vec![0x20010, 0x20080, 0x40020]);
        assert!(report.complete);
        assert_eq!(report.regions_scanned, 2);
        assert_eq!(report.pattern, "39 05 00 00");

        let grouped = report.matches_by_region();
        assert_eq!(grouped[&Address::new(0x20000)], vec![0x10, 0x80]);
        assert_eq!(grouped[&Address::new(0x40000)], vec![0x20]);

        finder.close().unwrap();
    }

    #[test]
    fn test_open_access_denied_aborts() {
        let err = Finder::open(target().fail_open(5), PID, FinderConfig::new()).err().unwrap();
        assert!(matches!(err, MemoryError::AccessDenied { pid: PID, code: 5 }));
    }

    #[test]
    fn test_invalid_config_rejected_before_open() {
        let sim = Arc::new(target());
        let err = Finder::open(sim.clone(), PID, FinderConfig::new().with_threads(0)).err().unwrap();
        assert!(matches!(err, MemoryError::InvalidConfig(_)));
        assert_eq!(sim.open_handle_count(), 0);
    }

    #[test]
    fn test_close_failure_keeps_results() {
        let sim = Arc::new(target().fail_close(6));
        let session = find_value(
            sim.clone(),
            PID,
            1337,
            FinderConfig::new().with_threads(2),
            &CancelToken::new(),
            &NoProgress,
        )
        .unwrap();

        assert_eq!(session.report.match_count(), 3);
        assert!(session.close_error.is_some());
        assert_eq!(sim.close_calls(), 1);
    }

    #[test]
    fn test_session_closes_handle_once() {
        let sim = Arc::new(target());
        let session = find_value(
            sim.clone(),
            PID,
            7,
            FinderConfig::new(),
            &CancelToken::new(),
            &NoProgress,
        )
        .unwrap();

        assert_eq!(session.report.match_count(), 0);
        assert!(session.close_error.is_none());
        assert_eq!(sim.close_calls(), 1);
        assert_eq!(sim.open_handle_count(), 0);
    }

    #[test]
    fn test_report_serializes() {
        let finder = Finder::open(target(), PID, FinderConfig::new()).unwrap();
        let report = finder.find_u32(1337).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["interesting_regions"], 2);
        assert_eq!(json["overlap"], "overlapping");
        assert_eq!(json["matches"][0]["address"], 0x20010);
        assert_eq!(json["walk"]["end"]["reason"], "end_of_address_space");
    }

    #[test]
    fn test_default_session_requests_scan_rights() {
        let sim = Arc::new(target());
        let finder = Finder::open(sim.clone(), PID, FinderConfig::new()).unwrap();

        assert_eq!(sim.requested_access(), Some(AccessRights::SCAN));
        assert_eq!(sim.requested_access().map(|a| a.bits()), Some(0x438));
        finder.close().unwrap();
    }

    #[test]
    fn test_configured_access_reaches_open() {
        let sim = Arc::new(target());
        let mut config = FinderConfig::new();
        config.access = AccessRights::QUERY_INFORMATION | AccessRights::VM_READ;

        let finder = Finder::open(sim.clone(), PID, config).unwrap();
        assert_eq!(
            sim.requested_access(),
            Some(AccessRights::QUERY_INFORMATION | AccessRights::VM_READ)
        );
        finder.close().unwrap();
    }

    #[test]
    fn test_cancelled_session_reports_partial() {
        let sim = Arc::new(target());
        let cancel = CancelToken::new();
        cancel.cancel();

        let session = find_value(sim.clone(), PID, 1337, FinderConfig::new(), &cancel, &NoProgress).unwrap();

        assert!(!session.report.complete);
        assert_eq!(session.report.regions_scanned, 0);
        assert_eq!(session.report.interesting_regions, 2);
        assert!(session.report.matches.is_empty());
        assert!(session.close_error.is_none());
        assert_eq!(sim.read_calls(), 0);
        assert_eq!(sim.open_handle_count(), 0);
    }

    #[test]
    fn test_configured_timeout_arms_cancel_token() {
        let finder = Finder::open(target(), PID, FinderConfig::new().with_timeout(30)).unwrap();
        let token = finder.cancel_token();
        let left = token.remaining().unwrap();
        assert!(left > std::time::Duration::from_secs(29));

        let report = finder.find(&SearchPattern::from_u32(1337), &token, &NoProgress).unwrap();
        assert!(report.complete);
        assert_eq!(report.match_count(), 3);

        let unlimited = Finder::open(target(), PID, FinderConfig::new()).unwrap();
        assert_eq!(unlimited.cancel_token().remaining(), None);

        // a tripped deadline stops the session the same way
        let expired = CancelToken::with_timeout(std::time::Duration::ZERO);
        let report = unlimited.find(&SearchPattern::from_u32(1337), &expired, &NoProgress).unwrap();
        assert!(!report.complete);
        assert!(report.matches.is_empty());

        assert_eq!(unlimited.regions().len(), 2);
        assert!(unlimited.regions().iter().all(|r| r.permissions() == "rw-"));
    }
}
