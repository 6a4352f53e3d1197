// Mon Jan 19 2026 - Alex

use crate::memory::{AccessRights, Address, AddressSpaceBounds, MemoryError, QueryError, RegionDescriptor};
use std::fmt;

/// OS-issued token for an open process. Only meaningful to the backend that
/// produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawHandle(pub u64);

impl fmt::Display for RawHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// Everything the finder needs from the operating system.
///
/// Implementations are shared read-only across search threads, so every
/// method takes `&self`.
pub trait MemoryApi: Send + Sync {
    fn open_process(&self, pid: u32, access: AccessRights) -> Result<RawHandle, MemoryError>;

    fn close_handle(&self, handle: RawHandle) -> Result<(), MemoryError>;

    fn address_space_bounds(&self) -> AddressSpaceBounds;

    /// Describes the region containing `address`, or the first region after it.
    fn query_region(&self, handle: RawHandle, address: Address) -> Result<RegionDescriptor, QueryError>;

    /// Copies up to `buf.len()` bytes from `address`, returning how many
    /// arrived. A short count is not an error.
    fn read_memory(&self, handle: RawHandle, address: Address, buf: &mut [u8]) -> Result<usize, MemoryError>;
}

impl<T: MemoryApi + ?Sized> MemoryApi for std::sync::Arc<T> {
    fn open_process(&self, pid: u32, access: AccessRights) -> Result<RawHandle, MemoryError> {
        (**self).open_process(pid, access)
    }

    fn close_handle(&self, handle: RawHandle) -> Result<(), MemoryError> {
        (**self).close_handle(handle)
    }

    fn address_space_bounds(&self) -> AddressSpaceBounds {
        (**self).address_space_bounds()
    }

    fn query_region(&self, handle: RawHandle, address: Address) -> Result<RegionDescriptor, QueryError> {
        (**self).query_region(handle, address)
    }

    fn read_memory(&self, handle: RawHandle, address: Address, buf: &mut [u8]) -> Result<usize, MemoryError> {
        (**self).read_memory(handle, address, buf)
    }
}
