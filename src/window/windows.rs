// Mon Jan 19 2026 - Alex

use super::{title_matches, WindowError, WindowInfo, WindowLocator, WindowRect};
use core::ffi::c_void;
use windows_sys::Win32::Foundation::{GetLastError, BOOL, FALSE, HWND, LPARAM, RECT, TRUE};
use windows_sys::Win32::Graphics::Dwm::{DwmGetWindowAttribute, DWMWA_EXTENDED_FRAME_BOUNDS};
use windows_sys::Win32::UI::WindowsAndMessaging::{
    BringWindowToTop, EnumWindows, GetWindowRect, GetWindowTextLengthW, GetWindowTextW, GetWindowThreadProcessId,
    SetForegroundWindow,
};

/// Win32 locator: walks top-level windows with `EnumWindows`.
#[derive(Debug, Default)]
pub struct Win32Locator;

impl Win32Locator {
    pub fn new() -> Self {
        Self
    }
}

struct Search<'a> {
    title: &'a str,
    found: Option<HWND>,
}

fn window_title(hwnd: HWND) -> String {
    let len = unsafe { GetWindowTextLengthW(hwnd) };
    if len <= 0 {
        return String::new();
    }
    let mut buffer = vec![0u16; len as usize + 1];
    let copied = unsafe { GetWindowTextW(hwnd, buffer.as_mut_ptr(), buffer.len() as i32) };
    buffer.truncate(copied.max(0) as usize);
    String::from_utf16_lossy(&buffer)
}

unsafe extern "system" fn enum_proc(hwnd: HWND, lparam: LPARAM) -> BOOL {
    let search = &mut *(lparam as *mut Search<'_>);
    if title_matches(&window_title(hwnd), search.title) {
        search.found = Some(hwnd);
        return FALSE;
    }
    TRUE
}

fn from_rect(rect: &RECT) -> WindowRect {
    WindowRect::new(rect.left, rect.top, rect.right, rect.bottom)
}

fn window_bounds(hwnd: HWND) -> WindowRect {
    let mut frame = RECT { left: 0, top: 0, right: 0, bottom: 0 };
    let hr = unsafe {
        DwmGetWindowAttribute(
            hwnd,
            DWMWA_EXTENDED_FRAME_BOUNDS as _,
            &mut frame as *mut RECT as *mut c_void,
            std::mem::size_of::<RECT>() as u32,
        )
    };
    if hr == 0 {
        return from_rect(&frame);
    }

    log::debug!("DwmGetWindowAttribute failed (0x{:08x}), using GetWindowRect", hr);
    let mut rect = RECT { left: 0, top: 0, right: 0, bottom: 0 };
    if unsafe { GetWindowRect(hwnd, &mut rect) } == 0 {
        log::warn!("GetWindowRect failed (os error {})", unsafe { GetLastError() });
    }
    from_rect(&rect)
}

fn bring_to_front(hwnd: HWND) {
    if unsafe { SetForegroundWindow(hwnd) } == 0 {
        log::warn!("SetForegroundWindow failed");
    }
    if unsafe { BringWindowToTop(hwnd) } == 0 {
        log::warn!("BringWindowToTop failed (os error {})", unsafe { GetLastError() });
    }
}

impl WindowLocator for Win32Locator {
    fn locate(&self, title: &str, bring: bool) -> Result<WindowInfo, WindowError> {
        let mut search = Search { title, found: None };
        let finished = unsafe { EnumWindows(Some(enum_proc), &mut search as *mut Search<'_> as LPARAM) };

        let hwnd = match search.found {
            Some(hwnd) => hwnd,
            None if finished == 0 => {
                return Err(WindowError::EnumerationFailed(unsafe { GetLastError() } as i64));
            }
            None => return Err(WindowError::NotFound(title.to_string())),
        };

        if bring {
            bring_to_front(hwnd);
        }

        let mut process_id = 0u32;
        unsafe { GetWindowThreadProcessId(hwnd, &mut process_id) };
        let bounds = window_bounds(hwnd);
        log::debug!("Window {:?} belongs to process {} at {}", title, process_id, bounds);

        Ok(WindowInfo { process_id, bounds })
    }
}
