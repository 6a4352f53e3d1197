// Mon Jan 19 2026 - Alex

use crate::memory::{Address, AddressSpaceBounds, MemoryApi, ProcessHandle, QueryError, RegionDescriptor, RegionFilter};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason", content = "code")]
pub enum WalkEnd {
    EmptyAddressSpace,
    EndOfAddressSpace,
    BoundsExceeded,
    QueryFailed(i64),
    Stalled,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct WalkSummary {
    pub visited: usize,
    pub interesting: usize,
    pub end: WalkEnd,
}

/// One pass over the address space, from the lower bound upwards.
///
/// Each step queries the region at the cursor and moves the cursor to the end
/// of that region. The cursor only ever moves forward, so the walk ends.
pub struct RegionWalker<'a, A: MemoryApi> {
    handle: &'a ProcessHandle<A>,
    bounds: AddressSpaceBounds,
    cursor: Address,
    visited: usize,
    end: Option<WalkEnd>,
}

impl<'a, A: MemoryApi> RegionWalker<'a, A> {
    pub fn new(handle: &'a ProcessHandle<A>, bounds: AddressSpaceBounds) -> Self {
        let end = if bounds.is_empty() {
            log::debug!("Address space bounds {} are empty, nothing to walk", bounds);
            Some(WalkEnd::EmptyAddressSpace)
        } else {
            None
        };

        Self {
            handle,
            bounds,
            cursor: bounds.minimum(),
            visited: 0,
            end,
        }
    }

    pub fn visited(&self) -> usize {
        self.visited
    }

    /// Why the walk stopped, once it has.
    pub fn end(&self) -> Option<WalkEnd> {
        self.end
    }

    fn stop(&mut self, end: WalkEnd) -> Option<RegionDescriptor> {
        self.end = Some(end);
        None
    }
}

impl<'a, A: MemoryApi> Iterator for RegionWalker<'a, A> {
    type Item = RegionDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        if self.end.is_some() {
            return None;
        }
        if self.cursor > self.bounds.maximum() {
            return self.stop(WalkEnd::BoundsExceeded);
        }

        let region = match self.handle.query(self.cursor) {
            Ok(region) => region,
            Err(QueryError::EndOfAddressSpace) => return self.stop(WalkEnd::EndOfAddressSpace),
            Err(QueryError::Failed(code)) => {
                log::warn!("Region query at {} failed (os error {}), ending walk", self.cursor, code);
                return self.stop(WalkEnd::QueryFailed(code));
            }
        };

        if region.size == 0 {
            log::warn!("Zero-sized region reported at {}, ending walk", self.cursor);
            return self.stop(WalkEnd::Stalled);
        }

        match region.end() {
            Some(next) if next > self.cursor => self.cursor = next,
            Some(_) => {
                log::warn!("Region {} does not advance past {}, ending walk", region, self.cursor);
                return self.stop(WalkEnd::Stalled);
            }
            None => self.end = Some(WalkEnd::EndOfAddressSpace),
        }

        self.visited += 1;
        Some(region)
    }
}

/// Walks the whole address space and keeps the regions `filter` accepts,
/// in address order.
pub fn collect_regions<A: MemoryApi>(
    handle: &ProcessHandle<A>,
    bounds: AddressSpaceBounds,
    filter: &RegionFilter,
) -> (Vec<RegionDescriptor>, WalkSummary) {
    let mut walker = RegionWalker::new(handle, bounds);
    let mut regions = Vec::new();

    for region in walker.by_ref() {
        if filter.accepts(&region) {
            log::trace!("Interesting region {}", region);
            regions.push(region);
        }
    }

    let summary = WalkSummary {
        visited: walker.visited(),
        interesting: regions.len(),
        end: walker.end().unwrap_or(WalkEnd::EndOfAddressSpace),
    };
    log::debug!(
        "Walk visited {} regions, {} interesting, ended with {:?}",
        summary.visited,
        summary.interesting,
        summary.end
    );

    (regions, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{AccessRights, MemoryState, MemoryType, PageProtection, SimulatedMemory};
    use std::sync::Arc;

    fn bounds() -> AddressSpaceBounds {
        AddressSpaceBounds::new(Address::new(0x10000), Address::new(0x20000))
    }

    fn tiled() -> SimulatedMemory {
        SimulatedMemory::new(1)
            .with_bounds(bounds())
            .with_zeroed_region(RegionDescriptor::private_read_write(Address::new(0x10000), 0x4000))
            .with_zeroed_region(
                RegionDescriptor::private_read_write(Address::new(0x14000), 0x4000)
                    .with_protect(PageProtection::READONLY),
            )
            .with_zeroed_region(RegionDescriptor::private_read_write(Address::new(0x18000), 0x8000))
    }

    #[test]
    fn test_tiled_range_visits_each_region_once() {
        let sim = Arc::new(tiled());
        let handle = ProcessHandle::open(sim.clone(), 1, AccessRights::SCAN).unwrap();

        let bases: Vec<u64> = RegionWalker::new(&handle, bounds()).map(|r| r.base.as_u64()).collect();

        assert_eq!(bases, vec![0x10000, 0x14000, 0x18000]);
        // three regions plus the query that finds nothing at 0x20000
        assert_eq!(sim.query_calls(), 4);
    }

    #[test]
    fn test_collect_keeps_interesting_in_order() {
        let sim = Arc::new(tiled());
        let handle = ProcessHandle::open(sim, 1, AccessRights::SCAN).unwrap();

        let (regions, summary) = collect_regions(&handle, bounds(), &RegionFilter::new());

        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].base, Address::new(0x10000));
        assert_eq!(regions[1].base, Address::new(0x18000));
        assert_eq!(summary.visited, 3);
        assert_eq!(summary.interesting, 2);
        assert_eq!(summary.end, WalkEnd::EndOfAddressSpace);
    }

    #[test]
    fn test_cursor_past_maximum_stops() {
        let sim = tiled().with_zeroed_region(RegionDescriptor::private_read_write(Address::new(0x20000), 0x1000));
        let handle = ProcessHandle::open(sim, 1, AccessRights::SCAN).unwrap();

        let mut walker = RegionWalker::new(&handle, bounds());
        assert_eq!(walker.by_ref().count(), 4);
        assert_eq!(walker.end(), Some(WalkEnd::BoundsExceeded));
    }

    #[test]
    fn test_gaps_are_visited_as_free_regions() {
        let sim = SimulatedMemory::new(1)
            .with_bounds(bounds())
            .with_zeroed_region(RegionDescriptor::private_read_write(Address::new(0x18000), 0x1000));
        let handle = ProcessHandle::open(sim, 1, AccessRights::SCAN).unwrap();

        let regions: Vec<_> = RegionWalker::new(&handle, bounds()).collect();

        assert_eq!(regions.len(), 2);
        assert!(regions[0].state.is_free());
        assert_eq!(regions[0].size, 0x8000);
        assert!(regions[1].state.is_committed());
    }

    #[test]
    fn test_empty_bounds_issue_no_queries() {
        let sim = Arc::new(tiled());
        let handle = ProcessHandle::open(sim.clone(), 1, AccessRights::SCAN).unwrap();

        let (regions, summary) = collect_regions(&handle, AddressSpaceBounds::empty(), &RegionFilter::new());

        assert!(regions.is_empty());
        assert_eq!(summary.end, WalkEnd::EmptyAddressSpace);
        assert_eq!(sim.query_calls(), 0);
    }

    #[test]
    fn test_query_failure_is_distinguished() {
        let sim = tiled().fail_query_at(Address::new(0x14000), 31);
        let handle = ProcessHandle::open(sim, 1, AccessRights::SCAN).unwrap();

        let (regions, summary) = collect_regions(&handle, bounds(), &RegionFilter::new());

        assert_eq!(regions.len(), 1);
        assert_eq!(summary.end, WalkEnd::QueryFailed(31));
    }

    #[test]
    fn test_region_ending_at_top_of_address_space() {
        let top = AddressSpaceBounds::new(Address::new(0xffff_ffff_ffff_e000), Address::new(u64::MAX));
        let sim = Arc::new(
            SimulatedMemory::new(1)
                .with_bounds(top)
                .with_zeroed_region(RegionDescriptor::private_read_write(Address::new(0xffff_ffff_ffff_e000), 0x1000))
                .with_zeroed_region(RegionDescriptor::private_read_write(Address::new(0xffff_ffff_ffff_f000), 0x1000)),
        );
        let handle = ProcessHandle::open(sim.clone(), 1, AccessRights::SCAN).unwrap();

        let (regions, summary) = collect_regions(&handle, top, &RegionFilter::new());

        assert_eq!(regions.len(), 2);
        assert_eq!(summary.visited, 2);
        assert_eq!(summary.end, WalkEnd::EndOfAddressSpace);
        assert_eq!(sim.query_calls(), 2);
    }

    #[test]
    fn test_zero_sized_region_stalls() {
        let sim = SimulatedMemory::new(1).with_bounds(bounds()).with_zeroed_region(
            RegionDescriptor::new(Address::new(0x10000), 0)
                .with_state(MemoryState::COMMIT)
                .with_kind(MemoryType::PRIVATE),
        );
        let handle = ProcessHandle::open(sim, 1, AccessRights::SCAN).unwrap();

        let mut walker = RegionWalker::new(&handle, bounds());
        assert_eq!(walker.by_ref().count(), 0);
        assert_eq!(walker.end(), Some(WalkEnd::Stalled));
    }
}
