// Mon Jan 19 2026 - Alex

use crate::memory::{
    AccessRights, Address, AddressSpaceBounds, MemoryApi, MemoryError, MemoryState, MemoryType, PageProtection,
    QueryError, RawHandle, RegionDescriptor,
};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::sync::atomic::{AtomicU64, Ordering};

static MAPS_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9a-f]+)-([0-9a-f]+)\s+([r-])([w-])([x-])([ps])\s+[0-9a-f]+\s+\S+\s+\d+\s*(.*)$")
        .expect("maps line pattern")
});

const DEFAULT_MMAP_MIN_ADDR: u64 = 0x10000;

#[cfg(target_arch = "aarch64")]
const USER_SPACE_MAX: u64 = 0xffff_ffff_ffff;
#[cfg(all(target_pointer_width = "64", not(target_arch = "aarch64")))]
const USER_SPACE_MAX: u64 = 0x7fff_ffff_ffff;
#[cfg(target_pointer_width = "32")]
const USER_SPACE_MAX: u64 = 0xbfff_ffff;

struct MapsSnapshot {
    pid: u32,
    regions: Vec<RegionDescriptor>,
}

/// `/proc` and `process_vm_readv` backend.
///
/// Opening a process snapshots its mappings; queries are answered from that
/// snapshot so one walk sees one consistent picture.
pub struct LinuxMemory {
    bounds: AddressSpaceBounds,
    snapshots: Mutex<HashMap<u64, MapsSnapshot>>,
    next_handle: AtomicU64,
}

impl LinuxMemory {
    pub fn new() -> Self {
        let minimum = fs::read_to_string("/proc/sys/vm/mmap_min_addr")
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|&min| min > 0)
            .unwrap_or(DEFAULT_MMAP_MIN_ADDR);

        Self {
            bounds: AddressSpaceBounds::new(Address::new(minimum), Address::new(USER_SPACE_MAX)),
            snapshots: Mutex::new(HashMap::new()),
            next_handle: AtomicU64::new(1),
        }
    }

    fn map_io_error(pid: u32, err: std::io::Error) -> MemoryError {
        match err.kind() {
            ErrorKind::NotFound => MemoryError::ProcessNotFound(pid),
            ErrorKind::PermissionDenied => MemoryError::AccessDenied {
                pid,
                code: err.raw_os_error().unwrap_or(libc::EACCES) as i64,
            },
            _ => MemoryError::Io(err),
        }
    }
}

impl Default for LinuxMemory {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses `/proc/<pid>/maps` text into descriptors, sorted by base address.
pub fn parse_maps(text: &str) -> Vec<RegionDescriptor> {
    let mut regions: Vec<RegionDescriptor> = text
        .lines()
        .filter_map(|line| {
            let caps = MAPS_LINE.captures(line)?;
            let start = u64::from_str_radix(&caps[1], 16).ok()?;
            let end = u64::from_str_radix(&caps[2], 16).ok()?;
            if end <= start {
                return None;
            }

            let protect = PageProtection::from_rwx(&caps[3] == "r", &caps[4] == "w", &caps[5] == "x");
            let path = caps[7].trim();
            let kind = if &caps[6] == "s" {
                MemoryType::MAPPED
            } else if path.starts_with('/') {
                MemoryType::IMAGE
            } else {
                MemoryType::PRIVATE
            };

            Some(
                RegionDescriptor::new(Address::new(start), end - start)
                    .with_state(MemoryState::COMMIT)
                    .with_protect(protect)
                    .with_kind(kind),
            )
        })
        .collect();

    regions.sort_by_key(|r| r.base);
    regions
}

impl MemoryApi for LinuxMemory {
    fn open_process(&self, pid: u32, access: AccessRights) -> Result<RawHandle, MemoryError> {
        let maps = fs::read_to_string(format!("/proc/{}/maps", pid)).map_err(|e| Self::map_io_error(pid, e))?;

        // Opening mem goes through the same ptrace check as process_vm_readv.
        if access.can_read() {
            fs::File::open(format!("/proc/{}/mem", pid)).map_err(|e| Self::map_io_error(pid, e))?;
        }

        let regions = parse_maps(&maps);
        let raw = self.next_handle.fetch_add(1, Ordering::SeqCst);
        log::debug!("Snapshotted {} mappings of process {}", regions.len(), pid);
        self.snapshots.lock().insert(raw, MapsSnapshot { pid, regions });
        Ok(RawHandle(raw))
    }

    fn close_handle(&self, handle: RawHandle) -> Result<(), MemoryError> {
        match self.snapshots.lock().remove(&handle.0) {
            Some(_) => Ok(()),
            None => Err(MemoryError::CloseFailure {
                handle: handle.0,
                code: libc::EBADF as i64,
            }),
        }
    }

    fn address_space_bounds(&self) -> AddressSpaceBounds {
        self.bounds
    }

    fn query_region(&self, handle: RawHandle, address: Address) -> Result<RegionDescriptor, QueryError> {
        let snapshots = self.snapshots.lock();
        let snapshot = snapshots.get(&handle.0).ok_or(QueryError::Failed(libc::EBADF as i64))?;

        let index = snapshot
            .regions
            .partition_point(|r| r.end().map_or(false, |end| end <= address));

        match snapshot.regions.get(index) {
            Some(region) if region.base <= address => Ok(*region),
            Some(region) => Ok(RegionDescriptor::free(address, region.base - address)),
            None if address <= self.bounds.maximum() => Ok(RegionDescriptor::free(
                address,
                self.bounds.maximum().as_u64() + 1 - address.as_u64(),
            )),
            None => Err(QueryError::EndOfAddressSpace),
        }
    }

    fn read_memory(&self, handle: RawHandle, address: Address, buf: &mut [u8]) -> Result<usize, MemoryError> {
        let pid = self
            .snapshots
            .lock()
            .get(&handle.0)
            .map(|s| s.pid)
            .ok_or(MemoryError::UnknownHandle(handle.0))?;

        if buf.is_empty() {
            return Ok(0);
        }

        let local = libc::iovec {
            iov_base: buf.as_mut_ptr() as *mut libc::c_void,
            iov_len: buf.len(),
        };
        let remote = libc::iovec {
            iov_base: address.as_usize() as *mut libc::c_void,
            iov_len: buf.len(),
        };

        let n = unsafe { libc::process_vm_readv(pid as libc::pid_t, &local, 1, &remote, 1, 0) };
        if n < 0 {
            let code = std::io::Error::last_os_error().raw_os_error().unwrap_or(0);
            return Err(MemoryError::ReadFailed {
                address: address.as_u64(),
                code: code as i64,
            });
        }

        Ok(n as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAPS: &str = "\
55d0c8a00000-55d0c8a21000 rw-p 00000000 00:00 0                          [heap]
7f2a1c000000-7f2a1c021000 rw-p 00000000 00:00 0
55d0c6e00000-55d0c6e02000 r--p 00000000 08:01 1311289                    /usr/bin/game
55d0c7000000-55d0c7001000 rw-p 00002000 08:01 1311289                    /usr/bin/game
7f2a1d000000-7f2a1d001000 rw-s 00000000 00:05 4                          /dev/shm/x
7ffc5a100000-7ffc5a121000 rw-p 00000000 00:00 0                          [stack]
7ffc5a000000-7ffc5a001000 ---p 00000000 00:00 0
";

    #[test]
    fn test_parse_maps_classifies_regions() {
        let regions = parse_maps(MAPS);
        assert_eq!(regions.len(), 7);

        let heap = regions.iter().find(|r| r.base == Address::new(0x55d0c8a00000)).unwrap();
        assert!(heap.kind.is_private());
        assert!(heap.protect.is_read_write());
        assert_eq!(heap.size, 0x21000);

        let data = regions.iter().find(|r| r.base == Address::new(0x55d0c7000000)).unwrap();
        assert!(data.kind.is_image());

        let shm = regions.iter().find(|r| r.base == Address::new(0x7f2a1d000000)).unwrap();
        assert!(shm.kind.is_mapped());

        let guard = regions.iter().find(|r| r.base == Address::new(0x7ffc5a000000)).unwrap();
        assert_eq!(guard.protect, PageProtection::NOACCESS);
    }

    #[test]
    fn test_parse_maps_sorts_and_skips_garbage() {
        let regions = parse_maps("not a mapping\n7f00-7e00 rw-p 0 00:00 0\n2000-3000 rw-p 00000000 00:00 0\n1000-2000 r--p 00000000 00:00 0\n");
        let bases: Vec<u64> = regions.iter().map(|r| r.base.as_u64()).collect();
        assert_eq!(bases, vec![0x1000, 0x2000]);
    }

    #[test]
    fn test_query_fills_gaps_from_snapshot() {
        let memory = LinuxMemory::new();
        memory.snapshots.lock().insert(
            9,
            MapsSnapshot {
                pid: 0,
                regions: parse_maps("20000-30000 rw-p 00000000 00:00 0\n"),
            },
        );

        let gap = memory.query_region(RawHandle(9), Address::new(0x10000)).unwrap();
        assert!(gap.state.is_free());
        assert_eq!(gap.size, 0x10000);

        let hit = memory.query_region(RawHandle(9), Address::new(0x24000)).unwrap();
        assert_eq!(hit.base, Address::new(0x20000));

        assert!(memory.query_region(RawHandle(9), Address::new(USER_SPACE_MAX + 1)).is_err());
        assert!(memory.close_handle(RawHandle(9)).is_ok());
        assert!(matches!(
            memory.close_handle(RawHandle(9)),
            Err(MemoryError::CloseFailure { .. })
        ));
    }

    #[test]
    fn test_open_self_and_read_own_memory() {
        let memory = LinuxMemory::new();
        let pid = std::process::id();
        let raw = memory.open_process(pid, AccessRights::SCAN).unwrap();

        let value: u32 = 0xdead_beef;
        let mut buf = [0u8; 4];
        let n = memory
            .read_memory(raw, Address::new(&value as *const u32 as u64), &mut buf)
            .unwrap();

        assert_eq!(n, 4);
        assert_eq!(u32::from_ne_bytes(buf), 0xdead_beef);
        memory.close_handle(raw).unwrap();
    }
}
