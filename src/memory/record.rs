// Mon Jan 19 2026 - Alex

//! Byte-level codec for the region records `VirtualQueryEx` fills in.
//!
//! The records are decoded field by field instead of being reinterpreted in
//! place, so the layout below is the whole contract. Every field is
//! little-endian.
//!
//! `Basic64` (48 bytes):
//!
//! | offset | width | field               |
//! |--------|-------|---------------------|
//! | 0      | 8     | base address        |
//! | 8      | 8     | allocation base     |
//! | 16     | 4     | allocation protect  |
//! | 20     | 2     | partition id        |
//! | 22     | 2     | padding             |
//! | 24     | 8     | region size         |
//! | 32     | 4     | state               |
//! | 36     | 4     | protect             |
//! | 40     | 4     | type                |
//! | 44     | 4     | padding             |
//!
//! `Basic32` (28 bytes): base, allocation base, allocation protect, region
//! size, state, protect, type, each 4 bytes in that order.

use crate::memory::{Address, MemoryError, MemoryState, MemoryType, PageProtection, QueryError, RegionDescriptor};
use bytes::{Buf, BufMut, BytesMut};

/// Win32 `ERROR_INVALID_DATA`.
pub const ERROR_INVALID_DATA: i64 = 13;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionRecordLayout {
    Basic64,
    Basic32,
}

impl RegionRecordLayout {
    pub const BASIC64_LEN: usize = 48;
    pub const BASIC32_LEN: usize = 28;

    /// Layout used by the current build target.
    pub fn native() -> Self {
        if cfg!(target_pointer_width = "64") {
            Self::Basic64
        } else {
            Self::Basic32
        }
    }

    pub fn len(self) -> usize {
        match self {
            Self::Basic64 => Self::BASIC64_LEN,
            Self::Basic32 => Self::BASIC32_LEN,
        }
    }

    pub fn decode(self, record: &[u8]) -> Result<RegionDescriptor, MemoryError> {
        if record.len() < self.len() {
            return Err(MemoryError::MalformedRecord {
                expected: self.len(),
                actual: record.len(),
            });
        }

        let mut buf = &record[..self.len()];
        let descriptor = match self {
            Self::Basic64 => {
                let base = buf.get_u64_le();
                let allocation_base = buf.get_u64_le();
                let allocation_protect = buf.get_u32_le();
                let _partition_id = buf.get_u16_le();
                buf.advance(2);
                let size = buf.get_u64_le();
                let state = buf.get_u32_le();
                let protect = buf.get_u32_le();
                let kind = buf.get_u32_le();
                build(base, allocation_base, allocation_protect, size, state, protect, kind)
            }
            Self::Basic32 => {
                let base = buf.get_u32_le() as u64;
                let allocation_base = buf.get_u32_le() as u64;
                let allocation_protect = buf.get_u32_le();
                let size = buf.get_u32_le() as u64;
                let state = buf.get_u32_le();
                let protect = buf.get_u32_le();
                let kind = buf.get_u32_le();
                build(base, allocation_base, allocation_protect, size, state, protect, kind)
            }
        };

        Ok(descriptor)
    }

    /// Decodes a record a region query just filled in. A record too short for
    /// the layout fails the query with `ERROR_INVALID_DATA`.
    pub fn decode_query(self, record: &[u8]) -> Result<RegionDescriptor, QueryError> {
        self.decode(record).map_err(|e| {
            log::warn!("Undecodable region record: {}", e);
            QueryError::Failed(ERROR_INVALID_DATA)
        })
    }

    /// Inverse of [`decode`](Self::decode). `Basic32` truncates addresses and
    /// sizes to 32 bits.
    pub fn encode(self, descriptor: &RegionDescriptor) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(self.len());
        match self {
            Self::Basic64 => {
                buf.put_u64_le(descriptor.base.as_u64());
                buf.put_u64_le(descriptor.allocation_base.as_u64());
                buf.put_u32_le(descriptor.allocation_protect.bits());
                buf.put_u16_le(0);
                buf.put_u16_le(0);
                buf.put_u64_le(descriptor.size);
                buf.put_u32_le(descriptor.state.bits());
                buf.put_u32_le(descriptor.protect.bits());
                buf.put_u32_le(descriptor.kind.bits());
                buf.put_u32_le(0);
            }
            Self::Basic32 => {
                buf.put_u32_le(descriptor.base.as_u64() as u32);
                buf.put_u32_le(descriptor.allocation_base.as_u64() as u32);
                buf.put_u32_le(descriptor.allocation_protect.bits());
                buf.put_u32_le(descriptor.size as u32);
                buf.put_u32_le(descriptor.state.bits());
                buf.put_u32_le(descriptor.protect.bits());
                buf.put_u32_le(descriptor.kind.bits());
            }
        }
        buf.to_vec()
    }
}

fn build(
    base: u64,
    allocation_base: u64,
    allocation_protect: u32,
    size: u64,
    state: u32,
    protect: u32,
    kind: u32,
) -> RegionDescriptor {
    RegionDescriptor {
        base: Address::new(base),
        allocation_base: Address::new(allocation_base),
        allocation_protect: PageProtection::from_bits_retain(allocation_protect),
        size,
        state: MemoryState::from_bits_retain(state),
        protect: PageProtection::from_bits_retain(protect),
        kind: MemoryType::from_bits_retain(kind),
    }
}
