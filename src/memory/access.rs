// Mon Jan 19 2026 - Alex

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Rights requested when opening a target process (Win32 PROCESS_* values).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct AccessRights: u32 {
        const VM_OPERATION = 0x0008;
        const VM_READ = 0x0010;
        const VM_WRITE = 0x0020;
        const QUERY_INFORMATION = 0x0400;

        const SCAN = Self::QUERY_INFORMATION.bits()
            | Self::VM_READ.bits()
            | Self::VM_WRITE.bits()
            | Self::VM_OPERATION.bits();
    }
}

impl AccessRights {
    pub fn can_query(self) -> bool {
        self.contains(Self::QUERY_INFORMATION)
    }

    pub fn can_read(self) -> bool {
        self.contains(Self::VM_READ)
    }
}

impl Default for AccessRights {
    fn default() -> Self {
        Self::SCAN
    }
}
