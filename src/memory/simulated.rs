// Mon Jan 19 2026 - Alex

use crate::memory::{
    AccessRights, Address, AddressSpaceBounds, MemoryApi, MemoryError, QueryError, RawHandle, RegionDescriptor,
};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

const ERROR_ACCESS_DENIED: i64 = 5;
const ERROR_PARTIAL_COPY: i64 = 299;

struct SimulatedRegion {
    descriptor: RegionDescriptor,
    contents: Vec<u8>,
    readable: Option<usize>,
}

/// In-memory stand-in for a live process.
///
/// Regions are laid out explicitly; anything between them reads back as a
/// free gap, and queries past the last region report the end of the address
/// space. Failures can be injected for opening, closing, querying and reading.
pub struct SimulatedMemory {
    pid: u32,
    bounds: AddressSpaceBounds,
    regions: BTreeMap<u64, SimulatedRegion>,
    open_error: Option<i64>,
    close_error: Option<i64>,
    query_failures: HashMap<u64, i64>,
    handles: Mutex<HashSet<u64>>,
    requested_access: Mutex<Option<AccessRights>>,
    next_handle: AtomicU64,
    close_calls: AtomicUsize,
    query_calls: AtomicUsize,
    read_calls: AtomicUsize,
}

impl SimulatedMemory {
    pub fn new(pid: u32) -> Self {
        Self {
            pid,
            bounds: AddressSpaceBounds::new(Address::new(0x10000), Address::new(0x7fff_ffff_ffff)),
            regions: BTreeMap::new(),
            open_error: None,
            close_error: None,
            query_failures: HashMap::new(),
            handles: Mutex::new(HashSet::new()),
            requested_access: Mutex::new(None),
            next_handle: AtomicU64::new(0x100),
            close_calls: AtomicUsize::new(0),
            query_calls: AtomicUsize::new(0),
            read_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_bounds(mut self, bounds: AddressSpaceBounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// Maps a region whose bytes are `contents`, zero-padded or truncated to
    /// the descriptor size.
    pub fn with_region(mut self, descriptor: RegionDescriptor, mut contents: Vec<u8>) -> Self {
        contents.resize(descriptor.size as usize, 0);
        self.regions.insert(
            descriptor.base.as_u64(),
            SimulatedRegion { descriptor, contents, readable: None },
        );
        self
    }

    pub fn with_zeroed_region(self, descriptor: RegionDescriptor) -> Self {
        self.with_region(descriptor, Vec::new())
    }

    /// Reads of the region at `base` transfer at most `readable` bytes.
    pub fn with_short_read(mut self, base: Address, readable: usize) -> Self {
        if let Some(region) = self.regions.get_mut(&base.as_u64()) {
            region.readable = Some(readable);
        }
        self
    }

    pub fn fail_open(mut self, code: i64) -> Self {
        self.open_error = Some(code);
        self
    }

    pub fn fail_close(mut self, code: i64) -> Self {
        self.close_error = Some(code);
        self
    }

    pub fn fail_query_at(mut self, address: Address, code: i64) -> Self {
        self.query_failures.insert(address.as_u64(), code);
        self
    }

    pub fn open_handle_count(&self) -> usize {
        self.handles.lock().len()
    }

    /// Rights asked for by the most recent `open_process`.
    pub fn requested_access(&self) -> Option<AccessRights> {
        *self.requested_access.lock()
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    pub fn query_calls(&self) -> usize {
        self.query_calls.load(Ordering::SeqCst)
    }

    pub fn read_calls(&self) -> usize {
        self.read_calls.load(Ordering::SeqCst)
    }

    fn check_handle(&self, handle: RawHandle) -> bool {
        self.handles.lock().contains(&handle.0)
    }

    fn region_at(&self, address: u64) -> Option<&SimulatedRegion> {
        self.regions
            .range(..=address)
            .next_back()
            .map(|(_, region)| region)
            .filter(|region| region.descriptor.contains(Address::new(address)))
    }
}

impl MemoryApi for SimulatedMemory {
    fn open_process(&self, pid: u32, access: AccessRights) -> Result<RawHandle, MemoryError> {
        *self.requested_access.lock() = Some(access);
        if pid != self.pid {
            return Err(MemoryError::ProcessNotFound(pid));
        }
        if let Some(code) = self.open_error {
            return Err(MemoryError::AccessDenied { pid, code });
        }
        let raw = self.next_handle.fetch_add(4, Ordering::SeqCst);
        self.handles.lock().insert(raw);
        Ok(RawHandle(raw))
    }

    fn close_handle(&self, handle: RawHandle) -> Result<(), MemoryError> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        if !self.handles.lock().remove(&handle.0) {
            return Err(MemoryError::UnknownHandle(handle.0));
        }
        match self.close_error {
            Some(code) => Err(MemoryError::CloseFailure { handle: handle.0, code }),
            None => Ok(()),
        }
    }

    fn address_space_bounds(&self) -> AddressSpaceBounds {
        self.bounds
    }

    fn query_region(&self, handle: RawHandle, address: Address) -> Result<RegionDescriptor, QueryError> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        if !self.check_handle(handle) {
            return Err(QueryError::Failed(6));
        }
        if let Some(&code) = self.query_failures.get(&address.as_u64()) {
            return Err(QueryError::Failed(code));
        }
        if let Some(region) = self.region_at(address.as_u64()) {
            return Ok(region.descriptor);
        }

        match self.regions.range(address.as_u64()..).next() {
            Some((&next, _)) => Ok(RegionDescriptor::free(address, next - address.as_u64())),
            None => Err(QueryError::EndOfAddressSpace),
        }
    }

    fn read_memory(&self, handle: RawHandle, address: Address, buf: &mut [u8]) -> Result<usize, MemoryError> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        if !self.check_handle(handle) {
            return Err(MemoryError::UnknownHandle(handle.0));
        }

        let region = self.region_at(address.as_u64()).ok_or(MemoryError::ReadFailed {
            address: address.as_u64(),
            code: ERROR_ACCESS_DENIED,
        })?;

        let start = (address - region.descriptor.base) as usize;
        let limit = region.readable.unwrap_or(region.contents.len()).min(region.contents.len());
        let available = limit.saturating_sub(start).min(buf.len());
        if available == 0 && !buf.is_empty() {
            return Err(MemoryError::ReadFailed {
                address: address.as_u64(),
                code: ERROR_PARTIAL_COPY,
            });
        }

        buf[..available].copy_from_slice(&region.contents[start..start + available]);
        Ok(available)
    }
}
