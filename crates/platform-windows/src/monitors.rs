//! Win32 monitor enumeration.

use std::mem::size_of;

use primeshot_common::error::{CaptureError, CaptureResult};
use primeshot_platform_core::MonitorInfo;
use windows::Win32::Foundation::{BOOL, LPARAM, RECT};
use windows::Win32::Graphics::Gdi::{
    EnumDisplayMonitors, GetMonitorInfoW, HDC, HMONITOR, MONITORINFO, MONITORINFOEXW,
};

const MONITORINFOF_PRIMARY: u32 = 0x1;

/// Enumerate connected monitors in the order Windows reports them.
pub fn detect_monitors() -> CaptureResult<Vec<MonitorInfo>> {
    let mut handles: Vec<HMONITOR> = Vec::new();

    unsafe extern "system" fn collect(
        hmon: HMONITOR,
        _: HDC,
        _: *mut RECT,
        data: LPARAM,
    ) -> BOOL {
        let handles = data.0 as *mut Vec<HMONITOR>;
        unsafe { (*handles).push(hmon) };
        BOOL(1)
    }

    let ok = unsafe {
        EnumDisplayMonitors(
            HDC::default(),
            None,
            Some(collect),
            LPARAM(&mut handles as *mut _ as isize),
        )
    };
    if !ok.as_bool() {
        return Err(CaptureError::capture_item("EnumDisplayMonitors failed"));
    }

    let monitors: Vec<MonitorInfo> = handles.into_iter().filter_map(describe).collect();
    tracing::debug!(count = monitors.len(), "enumerated monitors");
    Ok(monitors)
}

fn describe(hmon: HMONITOR) -> Option<MonitorInfo> {
    let mut info = MONITORINFOEXW::default();
    info.monitorInfo.cbSize = size_of::<MONITORINFOEXW>() as u32;

    let ok = unsafe { GetMonitorInfoW(hmon, &mut info as *mut MONITORINFOEXW as *mut MONITORINFO) };
    if !ok.as_bool() {
        tracing::warn!("GetMonitorInfoW failed for {:?}", hmon);
        return None;
    }

    let rect = info.monitorInfo.rcMonitor;
    let name_len = info
        .szDevice
        .iter()
        .position(|&c| c == 0)
        .unwrap_or(info.szDevice.len());

    Some(MonitorInfo {
        name: String::from_utf16_lossy(&info.szDevice[..name_len]),
        width: (rect.right - rect.left).max(0) as u32,
        height: (rect.bottom - rect.top).max(0) as u32,
        x: rect.left,
        y: rect.top,
        primary: info.monitorInfo.dwFlags & MONITORINFOF_PRIMARY != 0,
    })
}
