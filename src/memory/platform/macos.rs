// Mon Jan 19 2026 - Alex

use crate::memory::{
    AccessRights, Address, AddressSpaceBounds, MemoryApi, MemoryError, MemoryState, MemoryType, PageProtection,
    QueryError, RawHandle, RegionDescriptor,
};
use libc::{c_int, c_uint};

#[allow(non_camel_case_types)]
type mach_port_t = c_uint;
#[allow(non_camel_case_types)]
type kern_return_t = c_int;
#[allow(non_camel_case_types)]
type vm_address_t = u64;
#[allow(non_camel_case_types)]
type vm_size_t = u64;
#[allow(non_camel_case_types)]
type vm_prot_t = c_int;
#[allow(non_camel_case_types)]
type vm_region_flavor_t = c_int;
#[allow(non_camel_case_types)]
type vm_region_info_t = *mut c_int;

const KERN_SUCCESS: kern_return_t = 0;
const KERN_INVALID_ADDRESS: kern_return_t = 1;
const KERN_PROTECTION_FAILURE: kern_return_t = 2;
const VM_REGION_BASIC_INFO_64: vm_region_flavor_t = 9;
const VM_REGION_BASIC_INFO_COUNT_64: u32 = 9;

const VM_PROT_READ: vm_prot_t = 0x1;
const VM_PROT_WRITE: vm_prot_t = 0x2;
const VM_PROT_EXECUTE: vm_prot_t = 0x4;

const MACH_VM_MIN_ADDRESS: u64 = 0x1000;
#[cfg(target_arch = "aarch64")]
const MACH_VM_MAX_ADDRESS: u64 = 0x0000_000f_ffff_ffff;
#[cfg(not(target_arch = "aarch64"))]
const MACH_VM_MAX_ADDRESS: u64 = 0x0000_7fff_ffff_efff;

#[allow(non_camel_case_types)]
#[repr(C, packed(4))]
#[derive(Debug, Clone, Copy, Default)]
struct vm_region_basic_info_64 {
    protection: vm_prot_t,
    max_protection: vm_prot_t,
    inheritance: c_uint,
    shared: c_uint,
    reserved: c_uint,
    offset: u64,
    behavior: c_int,
    user_wired_count: u16,
}

extern "C" {
    fn mach_task_self() -> mach_port_t;
    fn task_for_pid(target_task: mach_port_t, pid: c_int, task: *mut mach_port_t) -> kern_return_t;
    fn mach_port_deallocate(task: mach_port_t, name: mach_port_t) -> kern_return_t;
    fn vm_read_overwrite(
        target_task: mach_port_t,
        address: vm_address_t,
        size: vm_size_t,
        data: vm_address_t,
        out_size: *mut vm_size_t,
    ) -> kern_return_t;
    fn mach_vm_region(
        target_task: mach_port_t,
        address: *mut vm_address_t,
        size: *mut vm_size_t,
        flavor: vm_region_flavor_t,
        info: vm_region_info_t,
        info_count: *mut u32,
        object_name: *mut mach_port_t,
    ) -> kern_return_t;
}

/// Mach task port backend. Needs root or the debugger entitlement.
#[derive(Debug, Default)]
pub struct MachMemory;

impl MachMemory {
    pub fn new() -> Self {
        Self
    }
}

fn protection_from_mach(prot: vm_prot_t) -> PageProtection {
    PageProtection::from_rwx(
        prot & VM_PROT_READ != 0,
        prot & VM_PROT_WRITE != 0,
        prot & VM_PROT_EXECUTE != 0,
    )
}

impl MemoryApi for MachMemory {
    fn open_process(&self, pid: u32, _access: AccessRights) -> Result<RawHandle, MemoryError> {
        let mut task: mach_port_t = 0;
        let result = unsafe { task_for_pid(mach_task_self(), pid as c_int, &mut task) };
        if result != KERN_SUCCESS {
            return Err(MemoryError::AccessDenied { pid, code: result as i64 });
        }
        Ok(RawHandle(task as u64))
    }

    fn close_handle(&self, handle: RawHandle) -> Result<(), MemoryError> {
        let result = unsafe { mach_port_deallocate(mach_task_self(), handle.0 as mach_port_t) };
        if result != KERN_SUCCESS {
            return Err(MemoryError::CloseFailure { handle: handle.0, code: result as i64 });
        }
        Ok(())
    }

    fn address_space_bounds(&self) -> AddressSpaceBounds {
        AddressSpaceBounds::new(Address::new(MACH_VM_MIN_ADDRESS), Address::new(MACH_VM_MAX_ADDRESS))
    }

    fn query_region(&self, handle: RawHandle, address: Address) -> Result<RegionDescriptor, QueryError> {
        let mut region_address: vm_address_t = address.as_u64();
        let mut size: vm_size_t = 0;
        let mut info: vm_region_basic_info_64 = Default::default();
        let mut info_count: u32 = VM_REGION_BASIC_INFO_COUNT_64;
        let mut object_name: mach_port_t = 0;

        let result = unsafe {
            mach_vm_region(
                handle.0 as mach_port_t,
                &mut region_address,
                &mut size,
                VM_REGION_BASIC_INFO_64,
                &mut info as *mut _ as vm_region_info_t,
                &mut info_count,
                &mut object_name,
            )
        };

        match result {
            KERN_SUCCESS => {}
            KERN_INVALID_ADDRESS => return Err(QueryError::EndOfAddressSpace),
            code => return Err(QueryError::Failed(code as i64)),
        }

        // mach_vm_region skips forward to the next mapping; report the hole first.
        if region_address > address.as_u64() {
            return Ok(RegionDescriptor::free(address, region_address - address.as_u64()));
        }

        let protection = info.protection;
        let max_protection = info.max_protection;
        let kind = if info.shared != 0 { MemoryType::MAPPED } else { MemoryType::PRIVATE };

        Ok(RegionDescriptor::new(Address::new(region_address), size)
            .with_allocation(Address::new(region_address), protection_from_mach(max_protection))
            .with_state(MemoryState::COMMIT)
            .with_protect(protection_from_mach(protection))
            .with_kind(kind))
    }

    fn read_memory(&self, handle: RawHandle, address: Address, buf: &mut [u8]) -> Result<usize, MemoryError> {
        let mut out_size: vm_size_t = 0;

        let result = unsafe {
            vm_read_overwrite(
                handle.0 as mach_port_t,
                address.as_u64(),
                buf.len() as vm_size_t,
                buf.as_mut_ptr() as vm_address_t,
                &mut out_size,
            )
        };

        match result {
            KERN_SUCCESS => Ok(out_size as usize),
            KERN_PROTECTION_FAILURE if out_size > 0 => Ok(out_size as usize),
            code => Err(MemoryError::ReadFailed {
                address: address.as_u64(),
                code: code as i64,
            }),
        }
    }
}
