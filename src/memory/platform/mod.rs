// Mon Jan 19 2026 - Alex

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use self::windows::WindowsMemory;
#[cfg(windows)]
pub type NativeMemory = WindowsMemory;

#[cfg(any(target_os = "linux", target_os = "android"))]
mod linux;
#[cfg(any(target_os = "linux", target_os = "android"))]
pub use self::linux::{parse_maps, LinuxMemory};
#[cfg(any(target_os = "linux", target_os = "android"))]
pub type NativeMemory = LinuxMemory;

#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "macos")]
pub use self::macos::MachMemory;
#[cfg(target_os = "macos")]
pub type NativeMemory = MachMemory;
