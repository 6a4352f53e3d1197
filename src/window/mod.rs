// Mon Jan 19 2026 - Alex

//! Finding a target process through its top-level window.

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use self::windows::Win32Locator;
#[cfg(windows)]
pub type NativeLocator = Win32Locator;
#[cfg(not(windows))]
pub type NativeLocator = UnsupportedLocator;

use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WindowError {
    #[error("No top-level window titled {0:?}")]
    NotFound(String),
    #[error("Window enumeration failed (os error {0})")]
    EnumerationFailed(i64),
    #[error("Window lookup is not supported on this platform")]
    Unsupported,
}

/// Screen rectangle in desktop coordinates; `right`/`bottom` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct WindowRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl WindowRect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }

    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left).max(0) as u32
    }

    pub fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top).max(0) as u32
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// File name a screen capture of this rectangle is saved under.
    pub fn capture_file_name(&self) -> String {
        format!("{}x{}.png", self.width(), self.height())
    }
}

impl fmt::Display for WindowRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}) - ({}, {}) [{}x{}]",
            self.left,
            self.top,
            self.right,
            self.bottom,
            self.width(),
            self.height()
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowInfo {
    pub process_id: u32,
    pub bounds: WindowRect,
}

pub trait WindowLocator {
    /// Finds the first top-level window whose title equals `title` exactly.
    fn locate(&self, title: &str, bring_to_front: bool) -> Result<WindowInfo, WindowError>;
}

/// Exact, case-sensitive title comparison; trailing NULs from fixed-size
/// text buffers are ignored.
pub fn title_matches(candidate: &str, wanted: &str) -> bool {
    candidate.trim_end_matches('\0') == wanted
}

/// Locator for platforms without a window enumeration backend.
#[derive(Debug, Default)]
pub struct UnsupportedLocator;

impl UnsupportedLocator {
    pub fn new() -> Self {
        Self
    }
}

impl WindowLocator for UnsupportedLocator {
    fn locate(&self, _title: &str, _bring_to_front: bool) -> Result<WindowInfo, WindowError> {
        Err(WindowError::Unsupported)
    }
}
