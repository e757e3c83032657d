use windows::Win32::Foundation::HWND;
use windows::Win32::UI::WindowsAndMessaging::{
    DispatchMessageW, PeekMessageW, TranslateMessage, MSG, PM_REMOVE,
};

/// Drain and dispatch every message queued for the calling thread.
///
/// Returns the number of messages dispatched. This is thread-global, not
/// scoped to a capture request.
pub fn drain_message_queue() -> usize {
    let mut dispatched = 0;
    let mut msg = MSG::default();
    unsafe {
        while PeekMessageW(&mut msg, HWND::default(), 0, 0, PM_REMOVE).as_bool() {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
            dispatched += 1;
        }
    }
    dispatched
}
