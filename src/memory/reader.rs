// Mon Jan 19 2026 - Alex

use crate::memory::{Address, MemoryApi, ProcessHandle, RegionDescriptor};
use serde::Serialize;

/// Local copy of one region.
///
/// `data` is always exactly as long as the region's declared size; when the
/// copy came up short the missing tail stays zeroed and `transferred` says how
/// much actually arrived.
#[derive(Debug, Clone)]
pub struct RegionBuffer {
    pub base: Address,
    pub data: Vec<u8>,
    pub transferred: usize,
}

impl RegionBuffer {
    pub fn declared_len(&self) -> usize {
        self.data.len()
    }

    pub fn is_partial(&self) -> bool {
        self.transferred < self.data.len()
    }

    pub fn partial_read(&self) -> Option<PartialRead> {
        if self.is_partial() {
            Some(PartialRead {
                region_base: self.base,
                requested: self.data.len() as u64,
                transferred: self.transferred as u64,
            })
        } else {
            None
        }
    }
}

/// A region copy that returned fewer bytes than requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PartialRead {
    pub region_base: Address,
    pub requested: u64,
    pub transferred: u64,
}

/// Copies `region` out of the target. Never fails: an unreadable region comes
/// back zero-filled with `transferred == 0`.
pub fn read_region<A: MemoryApi>(handle: &ProcessHandle<A>, region: &RegionDescriptor) -> RegionBuffer {
    let len = match usize::try_from(region.size) {
        Ok(len) => len,
        Err(_) => {
            log::warn!("Region {} is too large to copy on this platform", region.base);
            return RegionBuffer { base: region.base, data: Vec::new(), transferred: 0 };
        }
    };

    let mut data = vec![0u8; len];
    let transferred = match handle.read(region.base, &mut data) {
        Ok(n) => n.min(len),
        Err(e) => {
            log::warn!("Reading region {} failed: {}", region.base, e);
            0
        }
    };

    let buffer = RegionBuffer { base: region.base, data, transferred };
    if buffer.is_partial() {
        log::warn!(
            "Partial read of region {}: {} of {} bytes",
            region.base,
            transferred,
            len
        );
    }
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{AccessRights, SimulatedMemory};

    #[test]
    fn test_full_read() {
        let region = RegionDescriptor::private_read_write(Address::new(0x10000), 8);
        let sim = SimulatedMemory::new(3).with_region(region, vec![1, 2, 3, 4, 5, 6, 7, 8]);
        let handle = ProcessHandle::open(sim, 3, AccessRights::SCAN).unwrap();

        let buffer = read_region(&handle, &region);

        assert_eq!(buffer.data, vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert!(!buffer.is_partial());
        assert!(buffer.partial_read().is_none());
    }

    #[test]
    fn test_short_read_keeps_declared_length() {
        let region = RegionDescriptor::private_read_write(Address::new(0x10000), 16);
        let sim = SimulatedMemory::new(3)
            .with_region(region, vec![0xff; 16])
            .with_short_read(Address::new(0x10000), 8);
        let handle = ProcessHandle::open(sim, 3, AccessRights::SCAN).unwrap();

        let buffer = read_region(&handle, &region);

        assert_eq!(buffer.declared_len(), 16);
        assert_eq!(buffer.transferred, 8);
        assert_eq!(&buffer.data[..8], &[0xff; 8]);
        assert_eq!(&buffer.data[8..], &[0u8; 8]);
        assert_eq!(
            buffer.partial_read(),
            Some(PartialRead { region_base: Address::new(0x10000), requested: 16, transferred: 8 })
        );
    }

    #[test]
    fn test_unreadable_region_is_zero_filled() {
        let region = RegionDescriptor::private_read_write(Address::new(0x10000), 32);
        let sim = SimulatedMemory::new(3)
            .with_region(region, vec![0xaa; 32])
            .with_short_read(Address::new(0x10000), 0);
        let handle = ProcessHandle::open(sim, 3, AccessRights::SCAN).unwrap();

        let buffer = read_region(&handle, &region);

        assert_eq!(buffer.transferred, 0);
        assert_eq!(buffer.data, vec![0u8; 32]);
    }
}
