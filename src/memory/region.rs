// Mon Jan 19 2026 - Alex

use crate::memory::{Address, MemoryState, MemoryType, PageProtection};
use std::fmt;

/// Point-in-time snapshot of one contiguous virtual memory region.
///
/// The target keeps running while we look at it, so nothing here is
/// guaranteed to still hold by the time the region is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionDescriptor {
    pub base: Address,
    pub allocation_base: Address,
    pub allocation_protect: PageProtection,
    pub size: u64,
    pub state: MemoryState,
    pub protect: PageProtection,
    pub kind: MemoryType,
}

impl RegionDescriptor {
    pub fn new(base: Address, size: u64) -> Self {
        Self {
            base,
            allocation_base: base,
            allocation_protect: PageProtection::empty(),
            size,
            state: MemoryState::empty(),
            protect: PageProtection::empty(),
            kind: MemoryType::empty(),
        }
    }

    /// A committed private read-write region, the shape scanned for values.
    pub fn private_read_write(base: Address, size: u64) -> Self {
        Self::new(base, size)
            .with_state(MemoryState::COMMIT)
            .with_kind(MemoryType::PRIVATE)
            .with_protect(PageProtection::READWRITE)
    }

    /// Unmapped gap between two regions.
    pub fn free(base: Address, size: u64) -> Self {
        Self::new(base, size)
            .with_state(MemoryState::FREE)
            .with_protect(PageProtection::NOACCESS)
    }

    pub fn with_allocation(mut self, base: Address, protect: PageProtection) -> Self {
        self.allocation_base = base;
        self.allocation_protect = protect;
        self
    }

    pub fn with_state(mut self, state: MemoryState) -> Self {
        self.state = state;
        self
    }

    pub fn with_protect(mut self, protect: PageProtection) -> Self {
        self.protect = protect;
        if self.allocation_protect.is_empty() {
            self.allocation_protect = protect;
        }
        self
    }

    pub fn with_kind(mut self, kind: MemoryType) -> Self {
        self.kind = kind;
        self
    }

    /// First address past the region, or `None` if it would wrap.
    pub fn end(&self) -> Option<Address> {
        self.base.checked_add(self.size)
    }

    pub fn contains(&self, addr: Address) -> bool {
        match self.end() {
            Some(end) => addr.is_within_range(self.base, end),
            None => addr >= self.base,
        }
    }

    /// `rwx`-style summary of the current protection, e.g. `rw-`.
    pub fn permissions(&self) -> String {
        let mut perms = String::with_capacity(3);
        perms.push(if self.protect.is_readable() { 'r' } else { '-' });
        perms.push(if self.protect.is_writable() { 'w' } else { '-' });
        perms.push(if self.protect.is_executable() { 'x' } else { '-' });
        perms
    }
}

impl fmt::Display for RegionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} size=0x{:x} {} state=[{}] protect=[{}] type=[{}]",
            self.base,
            self.size,
            self.permissions(),
            self.state,
            self.protect,
            self.kind
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permissions_follow_protection() {
        let base = Address::new(0x10000);
        assert_eq!(RegionDescriptor::private_read_write(base, 0x1000).permissions(), "rw-");
        assert_eq!(
            RegionDescriptor::new(base, 0x1000).with_protect(PageProtection::EXECUTE_READ).permissions(),
            "r-x"
        );
        assert_eq!(RegionDescriptor::free(base, 0x1000).permissions(), "---");
    }

    #[test]
    fn test_display_includes_permissions() {
        let region = RegionDescriptor::private_read_write(Address::new(0x20000), 0x4000);
        assert_eq!(
            region.to_string(),
            "0x0000000000020000 size=0x4000 rw- state=[MEM_COMMIT] protect=[PAGE_READWRITE] type=[MEM_PRIVATE]"
        );
    }
}
