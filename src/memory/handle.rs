// Mon Jan 19 2026 - Alex

use crate::memory::{
    AccessRights, Address, AddressSpaceBounds, MemoryApi, MemoryError, QueryError, RawHandle, RegionDescriptor,
};

/// Sole owner of an open process handle.
///
/// `close` consumes the handle, so it cannot be used or closed again
/// afterwards. A handle dropped without `close` is closed on drop and a
/// failure is only logged.
pub struct ProcessHandle<A: MemoryApi> {
    api: A,
    pid: u32,
    raw: Option<RawHandle>,
}

impl<A: MemoryApi> ProcessHandle<A> {
    pub fn open(api: A, pid: u32, access: AccessRights) -> Result<Self, MemoryError> {
        let raw = api.open_process(pid, access)?;
        log::debug!("Opened process {} as handle {} with rights {:?}", pid, raw, access);
        Ok(Self { api, pid, raw: Some(raw) })
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn raw(&self) -> RawHandle {
        // Only `close` and `drop` take the handle out, and both end the borrow.
        self.raw.unwrap_or(RawHandle(0))
    }

    pub fn bounds(&self) -> AddressSpaceBounds {
        self.api.address_space_bounds()
    }

    pub fn query(&self, address: Address) -> Result<RegionDescriptor, QueryError> {
        self.api.query_region(self.raw(), address)
    }

    pub fn read(&self, address: Address, buf: &mut [u8]) -> Result<usize, MemoryError> {
        self.api.read_memory(self.raw(), address, buf)
    }

    pub fn close(mut self) -> Result<(), MemoryError> {
        match self.raw.take() {
            Some(raw) => {
                log::debug!("Closing handle {} for process {}", raw, self.pid);
                self.api.close_handle(raw)
            }
            None => Ok(()),
        }
    }
}

impl<A: MemoryApi> Drop for ProcessHandle<A> {
    fn drop(&mut self) {
        if let Some(raw) = self.raw.take() {
            if let Err(e) = self.api.close_handle(raw) {
                log::error!("Dropping handle {} for process {}: {}", raw, self.pid, e);
            }
        }
    }
}
