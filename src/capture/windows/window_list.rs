//! Top-level window enumeration using EnumWindows

use crate::capture::traits::WindowInfo;
use windows::Win32::Foundation::{BOOL, HWND, LPARAM};
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetWindowTextLengthW, GetWindowTextW, IsWindowVisible,
};

unsafe extern "system" fn enum_windows_callback(hwnd: HWND, lparam: LPARAM) -> BOOL {
    let windows = &mut *(lparam.0 as *mut Vec<WindowInfo>);

    if !IsWindowVisible(hwnd).as_bool() {
        return BOOL::from(true);
    }

    let len = GetWindowTextLengthW(hwnd);
    if len <= 0 {
        return BOOL::from(true);
    }

    let mut buffer = vec![0u16; len as usize + 1];
    let copied = GetWindowTextW(hwnd, &mut buffer);
    if copied > 0 {
        let title = String::from_utf16_lossy(&buffer[..copied as usize]);
        windows.push(WindowInfo {
            id: hwnd.0 as usize as u64,
            title,
        });
    }

    BOOL::from(true)
}

/// List visible top-level windows that have a title
pub fn list_windows() -> Vec<WindowInfo> {
    let mut windows: Vec<WindowInfo> = Vec::new();
    let windows_ptr = &mut windows as *mut Vec<WindowInfo>;

    unsafe {
        if let Err(e) = EnumWindows(Some(enum_windows_callback), LPARAM(windows_ptr as isize)) {
            tracing::warn!("EnumWindows failed: {}", e);
        }
    }

    windows
}
