// Mon Jan 19 2026 - Alex

use crate::memory::{
    AccessRights, Address, AddressSpaceBounds, MemoryApi, MemoryError, QueryError, RawHandle, RegionDescriptor,
    RegionRecordLayout,
};
use core::ffi::c_void;
use windows_sys::Win32::Foundation::{
    CloseHandle, GetLastError, ERROR_INVALID_PARAMETER, ERROR_PARTIAL_COPY, FALSE, HANDLE,
};
use windows_sys::Win32::System::Diagnostics::Debug::ReadProcessMemory;
use windows_sys::Win32::System::Memory::{VirtualQueryEx, MEMORY_BASIC_INFORMATION};
use windows_sys::Win32::System::SystemInformation::{GetSystemInfo, SYSTEM_INFO};
use windows_sys::Win32::System::Threading::OpenProcess;

#[repr(C, align(8))]
struct RecordBuffer([u8; RegionRecordLayout::BASIC64_LEN]);

/// Win32 backend: `OpenProcess`, `VirtualQueryEx` and `ReadProcessMemory`.
#[derive(Debug)]
pub struct WindowsMemory {
    layout: RegionRecordLayout,
}

impl WindowsMemory {
    pub fn new() -> Self {
        Self { layout: RegionRecordLayout::native() }
    }
}

impl Default for WindowsMemory {
    fn default() -> Self {
        Self::new()
    }
}

fn last_error() -> u32 {
    unsafe { GetLastError() }
}

impl MemoryApi for WindowsMemory {
    fn open_process(&self, pid: u32, access: AccessRights) -> Result<RawHandle, MemoryError> {
        let handle = unsafe { OpenProcess(access.bits(), FALSE, pid) };
        if handle == 0 {
            let code = last_error();
            if code == ERROR_INVALID_PARAMETER {
                return Err(MemoryError::ProcessNotFound(pid));
            }
            return Err(MemoryError::AccessDenied { pid, code: code as i64 });
        }
        Ok(RawHandle(handle as u64))
    }

    fn close_handle(&self, handle: RawHandle) -> Result<(), MemoryError> {
        if unsafe { CloseHandle(handle.0 as HANDLE) } == 0 {
            return Err(MemoryError::CloseFailure {
                handle: handle.0,
                code: last_error() as i64,
            });
        }
        Ok(())
    }

    fn address_space_bounds(&self) -> AddressSpaceBounds {
        let mut info: SYSTEM_INFO = unsafe { std::mem::zeroed() };
        unsafe { GetSystemInfo(&mut info) };
        AddressSpaceBounds::new(
            Address::new(info.lpMinimumApplicationAddress as usize as u64),
            Address::new(info.lpMaximumApplicationAddress as usize as u64),
        )
    }

    fn query_region(&self, handle: RawHandle, address: Address) -> Result<RegionDescriptor, QueryError> {
        let mut record = RecordBuffer([0u8; RegionRecordLayout::BASIC64_LEN]);
        let written = unsafe {
            VirtualQueryEx(
                handle.0 as HANDLE,
                address.as_usize() as *const c_void,
                record.0.as_mut_ptr() as *mut MEMORY_BASIC_INFORMATION,
                self.layout.len(),
            )
        };

        if written != self.layout.len() {
            let code = last_error();
            if code == ERROR_INVALID_PARAMETER {
                return Err(QueryError::EndOfAddressSpace);
            }
            return Err(QueryError::Failed(code as i64));
        }

        self.layout.decode_query(&record.0)
    }

    fn read_memory(&self, handle: RawHandle, address: Address, buf: &mut [u8]) -> Result<usize, MemoryError> {
        let mut transferred: usize = 0;
        let ok = unsafe {
            ReadProcessMemory(
                handle.0 as HANDLE,
                address.as_usize() as *const c_void,
                buf.as_mut_ptr() as *mut c_void,
                buf.len(),
                &mut transferred,
            )
        };

        if ok == 0 {
            let code = last_error();
            if code == ERROR_PARTIAL_COPY && transferred > 0 {
                return Ok(transferred);
            }
            return Err(MemoryError::ReadFailed {
                address: address.as_u64(),
                code: code as i64,
            });
        }

        Ok(transferred)
    }
}
