// Mon Jan 19 2026 - Alex

use bitflags::bitflags;
use std::fmt;

// Bit values follow the Win32 MEM_* / PAGE_* constants; the other backends
// translate their native attributes into the same sets.

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MemoryState: u32 {
        const COMMIT = 0x1000;
        const RESERVE = 0x2000;
        const FREE = 0x10000;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MemoryType: u32 {
        const PRIVATE = 0x20000;
        const MAPPED = 0x40000;
        const IMAGE = 0x1000000;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PageProtection: u32 {
        const NOACCESS = 0x01;
        const READONLY = 0x02;
        const READWRITE = 0x04;
        const WRITECOPY = 0x08;
        const EXECUTE = 0x10;
        const EXECUTE_READ = 0x20;
        const EXECUTE_READWRITE = 0x40;
        const EXECUTE_WRITECOPY = 0x80;
        const GUARD = 0x100;
        const NOCACHE = 0x200;
        const WRITECOMBINE = 0x400;
        const TARGETS_NO_UPDATE = 0x4000_0000;
    }
}

impl MemoryState {
    pub fn is_committed(self) -> bool {
        self.contains(Self::COMMIT)
    }

    pub fn is_reserved(self) -> bool {
        self.contains(Self::RESERVE)
    }

    pub fn is_free(self) -> bool {
        self.contains(Self::FREE)
    }
}

impl MemoryType {
    pub fn is_private(self) -> bool {
        self.contains(Self::PRIVATE)
    }

    pub fn is_mapped(self) -> bool {
        self.contains(Self::MAPPED)
    }

    pub fn is_image(self) -> bool {
        self.contains(Self::IMAGE)
    }
}

impl PageProtection {
    /// Plain `PAGE_READWRITE`; executable or copy-on-write variants do not count.
    pub fn is_read_write(self) -> bool {
        self.contains(Self::READWRITE)
    }

    pub fn is_guarded(self) -> bool {
        self.contains(Self::GUARD)
    }

    pub fn is_readable(self) -> bool {
        self.intersects(
            Self::READONLY
                | Self::READWRITE
                | Self::WRITECOPY
                | Self::EXECUTE_READ
                | Self::EXECUTE_READWRITE
                | Self::EXECUTE_WRITECOPY,
        )
    }

    pub fn is_writable(self) -> bool {
        self.intersects(Self::READWRITE | Self::EXECUTE_READWRITE)
    }

    pub fn is_executable(self) -> bool {
        self.intersects(
            Self::EXECUTE | Self::EXECUTE_READ | Self::EXECUTE_READWRITE | Self::EXECUTE_WRITECOPY,
        )
    }

    pub fn from_rwx(read: bool, write: bool, execute: bool) -> Self {
        match (read, write, execute) {
            (false, false, false) => Self::NOACCESS,
            (true, false, false) => Self::READONLY,
            (_, true, false) => Self::READWRITE,
            (false, false, true) => Self::EXECUTE,
            (true, false, true) => Self::EXECUTE_READ,
            (_, true, true) => Self::EXECUTE_READWRITE,
        }
    }
}

fn write_names<I>(f: &mut fmt::Formatter<'_>, prefix: &str, names: I) -> fmt::Result
where
    I: Iterator<Item = &'static str>,
{
    let mut first = true;
    for name in names {
        if !first {
            f.write_str(" | ")?;
        }
        write!(f, "{}{}", prefix, name)?;
        first = false;
    }
    Ok(())
}

impl fmt::Display for MemoryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_names(f, "MEM_", self.iter_names().map(|(name, _)| name))
    }
}

impl fmt::Display for MemoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_names(f, "MEM_", self.iter_names().map(|(name, _)| name))
    }
}

impl fmt::Display for PageProtection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_names(f, "PAGE_", self.iter_names().map(|(name, _)| name))
    }
}
